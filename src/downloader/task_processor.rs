// src/downloader/task_processor.rs

use super::UP_TO_DATE;
use crate::{CrawlContext, error::*, models::*, utils};
use futures::StreamExt;
use log::{debug, error, warn};
use reqwest::StatusCode;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// Handles one file: decides whether it is needed and writes it in place.
pub struct TaskProcessor {
    context: CrawlContext,
}

impl TaskProcessor {
    pub fn new(context: CrawlContext) -> Self {
        Self { context }
    }

    /// Never fails; every problem ends up in the returned status.
    pub async fn process(&self, record: &FileRecord) -> DownloadResult {
        let attempt: AppResult<DownloadResult> = async {
            let dest = self.destination(record)?;
            if let DownloadAction::Skip(reason) = Self::prepare_download_action(&dest, record)? {
                return Ok(DownloadResult {
                    filename: record.name.clone(),
                    status: DownloadStatus::Skipped,
                    message: Some(reason),
                });
            }
            self.download(record, &dest).await
        }
        .await;

        attempt.unwrap_or_else(|e| {
            error!("Downloading '{}' from {} failed: {}", record.name, record.url, e);
            DownloadResult {
                filename: record.name.clone(),
                status: DownloadStatus::from(&e),
                message: Some(e.to_string()),
            }
        })
    }

    pub(super) fn destination(&self, record: &FileRecord) -> AppResult<PathBuf> {
        utils::secure_join_path(&self.context.config.download_path, &record.relative_path())
    }

    /// A local copy wins when it was modified after the portal's timestamp.
    pub(super) fn prepare_download_action(
        dest: &Path,
        record: &FileRecord,
    ) -> AppResult<DownloadAction> {
        if !dest.exists() {
            return Ok(DownloadAction::Download);
        }
        let local_mtime = fs::metadata(dest)?.modified()?;
        if local_mtime > utils::local_system_time(&record.mod_time) {
            Ok(DownloadAction::Skip(UP_TO_DATE.to_string()))
        } else {
            debug!("'{}' changed on the portal, downloading again", dest.display());
            Ok(DownloadAction::Download)
        }
    }

    /// Streams the body into a temporary file next to `dest` and moves it into
    /// place only once it is complete.
    async fn download(&self, record: &FileRecord, dest: &Path) -> AppResult<DownloadResult> {
        let res = self.context.http_client.get_stream(record.url.as_str()).await?;
        if res.status() != StatusCode::OK {
            warn!("Not downloading '{}': server answered {}", record.name, res.status());
            return Ok(DownloadResult {
                filename: record.name.clone(),
                status: DownloadStatus::Skipped,
                message: Some(format!("server answered {}", res.status())),
            });
        }

        let dir = dest.parent().ok_or_else(|| {
            AppError::Config(format!("'{}' has no parent directory", dest.display()))
        })?;
        let mut temp_file = NamedTempFile::new_in(dir)?;
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            temp_file.write_all(&chunk?)?;
        }
        temp_file.as_file().sync_all()?;
        temp_file.persist(dest)?;

        debug!("Wrote '{}'", dest.display());
        Ok(DownloadResult {
            filename: record.name.clone(),
            status: DownloadStatus::Success,
            message: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;
    use chrono::NaiveDate;
    use std::time::{Duration, SystemTime};

    fn record(mod_time: chrono::NaiveDateTime) -> FileRecord {
        FileRecord {
            course: "Course".into(),
            kind: ItemKind::File,
            name: "slides.pdf".into(),
            size_mb: 1.0,
            mod_time,
            url: "https://ilias.example.org/file".into(),
            path: PathBuf::from("Course"),
        }
    }

    #[test]
    fn test_missing_file_is_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let action = TaskProcessor::prepare_download_action(
            &dir.path().join("missing.pdf"),
            &record(constants::unknown_mod_time()),
        )
        .unwrap();
        assert_eq!(action, DownloadAction::Download);
    }

    #[test]
    fn test_newer_local_copy_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slides.pdf");
        fs::write(&path, b"old").unwrap();

        let long_ago = NaiveDate::from_ymd_opt(2020, 9, 17).unwrap().and_hms_opt(14, 59, 0).unwrap();
        assert!(matches!(
            TaskProcessor::prepare_download_action(&path, &record(long_ago)).unwrap(),
            DownloadAction::Skip(_)
        ));
        assert!(matches!(
            TaskProcessor::prepare_download_action(&path, &record(constants::unknown_mod_time()))
                .unwrap(),
            DownloadAction::Skip(_)
        ));
    }

    #[test]
    fn test_outdated_local_copy_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slides.pdf");
        fs::write(&path, b"old").unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000))
            .unwrap();

        let later = NaiveDate::from_ymd_opt(2020, 9, 17).unwrap().and_hms_opt(14, 59, 0).unwrap();
        assert_eq!(
            TaskProcessor::prepare_download_action(&path, &record(later)).unwrap(),
            DownloadAction::Download
        );
    }
}
