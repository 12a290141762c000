// src/config/credentials.rs

use crate::{
    config::ExternalConfig,
    constants,
    error::{AppError, AppResult},
    ui,
};
use anyhow::{Context, anyhow};
use log::{debug, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub fn get_config_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("Cannot determine the home directory")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME);
    Ok(path)
}

/// Reads the configuration file, writing the defaults first if it does not exist yet.
pub(crate) fn load_or_create_external_config(
    explicit_path: Option<&Path>,
) -> AppResult<ExternalConfig> {
    let config_path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => get_config_path()?,
    };
    if config_path.is_file() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file '{}'", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", config_path.display()))
            .map_err(AppError::from)
    } else {
        info!("Config file {:?} does not exist, writing defaults.", config_path);
        let config = ExternalConfig::default_app_config();

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json_content = serde_json::to_string_pretty(&config)?;
        fs::write(&config_path, json_content)?;

        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

pub fn resolve_user(cli_user: Option<&str>, external_config: &ExternalConfig) -> Option<(String, &'static str)> {
    if let Some(user) = cli_user && !user.is_empty() {
        debug!("Using user id from the command line");
        return Some((user.to_string(), "command line"));
    }
    if let Ok(user) = std::env::var("ILIAS_USER") && !user.is_empty() {
        debug!("Using user id from ILIAS_USER");
        return Some((user, "environment (ILIAS_USER)"));
    }
    if let Some(user) = external_config.user.as_deref() && !user.is_empty() {
        debug!("Using user id from the config file");
        return Some((user.to_string(), "config file"));
    }
    None
}

fn resolve_password(cli_password: Option<&str>, user: &str) -> AppResult<String> {
    if let Some(password) = cli_password && !password.is_empty() {
        return Ok(password.to_string());
    }
    if let Ok(password) = std::env::var("ILIAS_PASSWORD") && !password.is_empty() {
        debug!("Using password from ILIAS_PASSWORD");
        return Ok(password);
    }
    ui::prompt_hidden(&format!("Password for {}", user)).map_err(|_| AppError::UserInterrupt)
}

/// Collects the login data: command line first, then environment, then config file or prompt.
pub fn resolve_credentials(
    cli_user: Option<&str>,
    cli_password: Option<&str>,
    external_config: &ExternalConfig,
) -> AppResult<Credentials> {
    let (user, source) = resolve_user(cli_user, external_config).ok_or(AppError::UserMissing)?;
    info!("Logging in as '{}' (user id from {})", user, source);
    let password = resolve_password(cli_password, &user)?;
    Ok(Credentials { user, password })
}
