// src/crawler/background.rs

use crate::{
    CrawlContext,
    error::*,
    models::{FileRecord, Placeholder},
    portal::pages::{self, BackgroundJob},
    utils,
};
use futures::{StreamExt, stream};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Outcome of matching pending exports against the finished background tasks.
#[derive(Debug, Default)]
pub struct BackgroundResolution {
    pub files: Vec<FileRecord>,
    /// Removal links of the matched tasks, to be called after downloading.
    pub cleanup_urls: Vec<Url>,
    /// Exports that have not shown up (yet).
    pub unresolved: Vec<Placeholder>,
}

/// Pairs every job with the first placeholder of the same name. Umlauts are
/// folded on both sides since the task bar spells them as digraphs.
pub fn match_jobs(jobs: Vec<BackgroundJob>, placeholders: Vec<Placeholder>) -> BackgroundResolution {
    let mut pending = placeholders;
    let mut resolution = BackgroundResolution::default();

    for job in jobs {
        let key = utils::fold_umlauts(&job.name);
        let Some(index) = pending
            .iter()
            .position(|p| utils::fold_umlauts(&p.name) == key)
        else {
            debug!("Background task '{}' belongs to no pending export", job.name);
            continue;
        };
        let placeholder = pending.remove(index);
        resolution.files.push(placeholder.resolve(
            utils::sanitize_path_segment(&job.name),
            job.download_url.to_string(),
        ));
        resolution.cleanup_urls.push(job.cleanup_url);
    }

    resolution.unresolved = pending;
    resolution
}

/// Reads the background task bar once and resolves the pending exports.
pub async fn poll_and_resolve(
    context: &CrawlContext,
    placeholders: Vec<Placeholder>,
) -> AppResult<BackgroundResolution> {
    let config = &context.config;
    let desktop_url = config.desktop_url()?;
    let desktop = context.http_client.get_page(desktop_url.clone()).await?;
    let bar_url = pages::parse_background_bar_url(&desktop, &config.base_url).ok_or_else(|| {
        AppError::Markup {
            what: "background task bar",
            url: desktop_url.to_string(),
        }
    })?;

    let bar = context.http_client.get_page(bar_url).await?;
    let jobs = pages::parse_background_jobs(&bar, &config.base_url);
    info!("{} finished background tasks, {} pending exports", jobs.len(), placeholders.len());
    Ok(match_jobs(jobs, placeholders))
}

/// Removes finished tasks from the task bar. Failures are only logged.
pub async fn cleanup_jobs(context: &CrawlContext, urls: &[Url]) -> usize {
    let removed = AtomicUsize::new(0);
    let removed_ref = &removed;
    stream::iter(urls)
        .for_each_concurrent(context.config.download_workers, |url| async move {
            match context.http_client.get(url.clone()).await {
                Ok(_) => {
                    removed_ref.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => warn!("Could not remove background task {}: {}", url, e),
            }
        })
        .await;
    removed.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;
    use std::path::PathBuf;

    fn placeholder(name: &str) -> Placeholder {
        Placeholder {
            course: "Course".into(),
            name: name.into(),
            size_mb: f64::NAN,
            mod_time: constants::unknown_mod_time(),
            path: PathBuf::from("Course/Aufgaben/Blatt"),
        }
    }

    fn job(name: &str, id: u32) -> BackgroundJob {
        BackgroundJob {
            name: name.into(),
            download_url: Url::parse(&format!("https://ilias.example.org/dl/{}", id)).unwrap(),
            cleanup_url: Url::parse(&format!("https://ilias.example.org/rm/{}", id)).unwrap(),
        }
    }

    #[test]
    fn test_umlaut_placeholder_matches_digraph_job() {
        let resolution = match_jobs(
            vec![job("Uebungsblatt Groessen.zip", 1)],
            vec![placeholder("Übungsblatt Größen.zip")],
        );
        assert_eq!(resolution.files.len(), 1);
        assert_eq!(resolution.files[0].name, "Uebungsblatt Groessen.zip");
        assert_eq!(resolution.files[0].url, "https://ilias.example.org/dl/1");
        assert_eq!(resolution.files[0].path, PathBuf::from("Course/Aufgaben/Blatt"));
        assert_eq!(resolution.cleanup_urls.len(), 1);
        assert!(resolution.unresolved.is_empty());
    }

    #[test]
    fn test_each_placeholder_is_matched_once() {
        let resolution = match_jobs(
            vec![job("Blatt 1.zip", 1), job("Blatt 1.zip", 2), job("Other.zip", 3)],
            vec![placeholder("Blatt 1.zip"), placeholder("Blatt 2.zip")],
        );
        assert_eq!(resolution.files.len(), 1);
        assert_eq!(resolution.files[0].url, "https://ilias.example.org/dl/1");
        assert_eq!(resolution.cleanup_urls, vec![Url::parse("https://ilias.example.org/rm/1").unwrap()]);
        assert_eq!(resolution.unresolved.len(), 1);
        assert_eq!(resolution.unresolved[0].name, "Blatt 2.zip");
    }

    #[test]
    fn test_no_jobs_leaves_everything_unresolved() {
        let resolution = match_jobs(Vec::new(), vec![placeholder("A.zip")]);
        assert!(resolution.files.is_empty());
        assert_eq!(resolution.unresolved.len(), 1);
    }
}
