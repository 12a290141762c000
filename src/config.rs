// src/config.rs

pub mod credentials;

use crate::{
    cli::Cli,
    constants,
    error::{AppError, AppResult},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub base_url: String,
    pub login_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.into(),
            login_url: constants::DEFAULT_LOGIN_URL.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkerConfig {
    pub scan: Option<usize>,
    pub download: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub workers: WorkerConfig,
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        Self {
            user: None,
            portal: PortalConfig::default(),
            network: NetworkConfig {
                connect_timeout_secs: Some(10),
                timeout_secs: Some(600),
                max_retries: Some(3),
            },
            workers: WorkerConfig {
                scan: Some(constants::DEFAULT_SCAN_WORKERS),
                download: Some(constants::DEFAULT_DOWNLOAD_WORKERS),
            },
        }
    }
}

/// Settings of one run. Built once at startup and never changed afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: Url,
    pub login_url: Url,
    pub scan_workers: usize,
    pub download_workers: usize,
    pub download_path: PathBuf,
    /// Enables submission exports through background tasks.
    pub tutor_mode: bool,
    pub verbose: bool,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl AppConfig {
    pub fn from_parts(args: &Cli, external_config: &ExternalConfig) -> AppResult<Self> {
        let config = Self {
            base_url: parse_base_url(&external_config.portal.base_url)?,
            login_url: Url::parse(&external_config.portal.login_url)?,
            scan_workers: args
                .scan_workers
                .or(external_config.workers.scan)
                .unwrap_or(constants::DEFAULT_SCAN_WORKERS),
            download_workers: args
                .download_workers
                .or(external_config.workers.download)
                .unwrap_or(constants::DEFAULT_DOWNLOAD_WORKERS),
            download_path: args.output.clone(),
            tutor_mode: args.tutor_mode,
            verbose: args.verbose,
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(
                external_config.network.connect_timeout_secs.unwrap_or(10),
            ),
            timeout: Duration::from_secs(external_config.network.timeout_secs.unwrap_or(600)),
            max_retries: external_config.network.max_retries.unwrap_or(3),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the crawler cannot work with instead of silently ignoring them.
    pub fn validate(&self) -> AppResult<()> {
        if self.scan_workers == 0 {
            return Err(AppError::Config("scan workers must be at least 1".into()));
        }
        if self.download_workers == 0 {
            return Err(AppError::Config("download workers must be at least 1".into()));
        }
        if !self.download_path.is_dir() {
            return Err(AppError::Config(format!(
                "download directory '{}' does not exist",
                self.download_path.display()
            )));
        }
        if self.base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "base url '{}' cannot be used to resolve links",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Resolves a (possibly relative) link found on a portal page.
    pub fn resolve(&self, href: &str) -> AppResult<Url> {
        Ok(self.base_url.join(href)?)
    }

    pub fn desktop_url(&self) -> AppResult<Url> {
        self.resolve(constants::portal::DESKTOP_QUERY)
    }

    pub fn course_url(&self, ref_id: u64) -> AppResult<Url> {
        self.resolve(
            &constants::portal::REPOSITORY_QUERY.replace("{ref_id}", &ref_id.to_string()),
        )
    }
}

/// `Url::join` drops the last path segment unless the base ends with a slash.
fn parse_base_url(raw: &str) -> AppResult<Url> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{}/", raw))?)
    }
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(constants::DEFAULT_BASE_URL).expect("valid default url"),
            login_url: Url::parse(constants::DEFAULT_LOGIN_URL).expect("valid default url"),
            scan_workers: constants::DEFAULT_SCAN_WORKERS,
            download_workers: constants::DEFAULT_DOWNLOAD_WORKERS,
            download_path: std::env::temp_dir(),
            tutor_mode: false,
            verbose: false,
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            max_retries: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Cli {
        let mut argv = vec!["ilias-dl", "--course", "1"];
        argv.extend_from_slice(extra);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_cli_values_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let mut external = ExternalConfig::default_app_config();
        external.workers.scan = Some(2);
        external.workers.download = Some(3);

        let config = AppConfig::from_parts(&args(&["-o", out, "--scan-workers", "7"]), &external)
            .unwrap();
        assert_eq!(config.scan_workers, 7);
        assert_eq!(config.download_workers, 3);
        assert!(!config.tutor_mode);
    }

    #[test]
    fn test_invalid_values_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let external = ExternalConfig::default_app_config();

        let zero_workers = AppConfig::from_parts(&args(&["-o", out, "-w", "0"]), &external);
        assert!(matches!(zero_workers, Err(AppError::Config(_))));

        let missing_dir = dir.path().join("missing");
        let missing = AppConfig::from_parts(
            &args(&["-o", missing_dir.to_str().unwrap()]),
            &external,
        );
        assert!(matches!(missing, Err(AppError::Config(_))));

        let mut bad_url = ExternalConfig::default_app_config();
        bad_url.portal.base_url = "not a url".into();
        assert!(AppConfig::from_parts(&args(&["-o", out]), &bad_url).is_err());
    }

    #[test]
    fn test_course_url_is_resolved_against_base() {
        let dir = tempfile::tempdir().unwrap();
        let mut external = ExternalConfig::default_app_config();
        external.portal.base_url = "https://ilias.example.org/sub".into();
        let config = AppConfig::from_parts(
            &args(&["-o", dir.path().to_str().unwrap()]),
            &external,
        )
        .unwrap();
        assert_eq!(
            config.course_url(1020946).unwrap().as_str(),
            "https://ilias.example.org/sub/ilias.php?ref_id=1020946&cmd=frameset&cmdClass=ilrepositorygui&cmdNode=vi&baseClass=ilrepositorygui"
        );
    }
}
