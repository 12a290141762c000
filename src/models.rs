// src/models.rs

use crate::{error::AppError, symbols};
use chrono::NaiveDateTime;
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Semantic kind of an entry in the portal hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    File,
    Link,
    Forum,
    Task,
    LearningMaterial,
    Folder,
}

impl ItemKind {
    /// Kinds that are fetched and expanded rather than downloaded.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ItemKind::Folder | ItemKind::Task | ItemKind::LearningMaterial
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub ref_id: u64,
    pub name: String,
    pub url: String,
}

/// A not yet expanded node of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub kind: ItemKind,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub course: String,
    pub kind: ItemKind,
    pub name: String,
    /// Size in megabytes, `NaN` when the portal does not tell.
    pub size_mb: f64,
    pub mod_time: NaiveDateTime,
    pub url: String,
    /// Destination directory relative to the download root, course first.
    pub path: PathBuf,
}

impl FileRecord {
    pub fn relative_path(&self) -> PathBuf {
        self.path.join(&self.name)
    }

    pub fn size_label(&self) -> String {
        if self.size_mb.is_nan() {
            "? MB".to_string()
        } else {
            format!("{:.1} MB", self.size_mb)
        }
    }
}

/// A file that only exists once a server side export job has finished.
#[derive(Debug, Clone)]
pub struct Placeholder {
    pub course: String,
    pub name: String,
    pub size_mb: f64,
    pub mod_time: NaiveDateTime,
    pub path: PathBuf,
}

impl Placeholder {
    pub fn resolve(self, name: String, url: String) -> FileRecord {
        FileRecord {
            course: self.course,
            kind: ItemKind::File,
            name,
            size_mb: self.size_mb,
            mod_time: self.mod_time,
            url,
            path: self.path,
        }
    }
}

/// Everything a container expansion can discover.
#[derive(Debug, Clone)]
pub enum Item {
    File(FileRecord),
    Container(ContainerRef),
    Placeholder(Placeholder),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DownloadStatus {
    Success,
    Skipped,
    HttpError,
    NetworkError,
    ConnectionError,
    TimeoutError,
    IoError,
    UnexpectedError,
}

impl DownloadStatus {
    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        &'static str,
    ) {
        match self {
            DownloadStatus::Success => (&symbols::OK, |s| s.green(), "downloaded"),
            DownloadStatus::Skipped => (&symbols::INFO, |s| s.cyan(), "up to date, skipped"),
            DownloadStatus::HttpError => (&symbols::ERROR, |s| s.red(), "server returned an error"),
            DownloadStatus::NetworkError => (&symbols::ERROR, |s| s.red(), "network request failed"),
            DownloadStatus::ConnectionError => (&symbols::ERROR, |s| s.red(), "could not connect"),
            DownloadStatus::TimeoutError => (&symbols::WARN, |s| s.yellow(), "network timeout"),
            DownloadStatus::IoError => (&symbols::ERROR, |s| s.red(), "local file error"),
            DownloadStatus::UnexpectedError => {
                (&symbols::ERROR, |s| s.red(), "unexpected error")
            }
        }
    }
}

impl From<&AppError> for DownloadStatus {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::Network(err)
            | AppError::NetworkMiddleware(reqwest_middleware::Error::Reqwest(err)) => {
                if err.is_timeout() {
                    DownloadStatus::TimeoutError
                } else if err.is_connect() {
                    DownloadStatus::ConnectionError
                } else if err.is_status() {
                    DownloadStatus::HttpError
                } else {
                    DownloadStatus::NetworkError
                }
            }
            AppError::NetworkMiddleware(_) => DownloadStatus::NetworkError,
            AppError::Io(_) | AppError::TempFilePersist(_) => DownloadStatus::IoError,
            _ => DownloadStatus::UnexpectedError,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub filename: String,
    pub status: DownloadStatus,
    pub message: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum DownloadAction {
    Skip(String),
    Download,
}
