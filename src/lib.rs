// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod crawler;
pub mod downloader;
pub mod error;
pub mod models;
pub mod portal;
pub mod session;
pub mod symbols;
pub mod ui;
pub mod utils;
pub mod workflows;

use crate::{
    cli::Cli,
    client::RobustClient,
    config::{AppConfig, credentials},
    downloader::DownloadManager,
    error::{AppError, AppResult},
};
use colored::*;
use log::debug;
use std::{future::Future, sync::Arc};

/// Shared state of a run, cloned into every scan and download task.
#[derive(Clone)]
pub struct CrawlContext {
    pub manager: DownloadManager,
    pub config: Arc<AppConfig>,
    pub http_client: Arc<RobustClient>,
}

impl CrawlContext {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let config = Arc::new(config);
        let http_client = Arc::new(RobustClient::new(config.clone())?);
        Ok(Self {
            manager: DownloadManager::new(),
            config,
            http_client,
        })
    }
}

/// Entry point of the binary.
pub async fn run_from_cli(args: Arc<Cli>) -> AppResult<()> {
    debug!("CLI arguments: {:?}", args);
    if args.config_help {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => credentials::get_config_path()?,
        };
        let mut lines = vec![format!("Location: {}", path.display()), String::new()];
        lines.extend(constants::HELP_CONFIG_GUIDE.lines().map(str::to_string));
        ui::box_message(
            "Configuration file",
            &lines.iter().map(String::as_str).collect::<Vec<_>>(),
            |s| s.cyan(),
        );
        return Ok(());
    }

    let external_config = credentials::load_or_create_external_config(args.config.as_deref())?;
    let config = AppConfig::from_parts(&args, &external_config)?;
    debug!("Effective configuration: {:?}", config);

    let context = CrawlContext::new(config)?;
    workflows::run(context, &args, &external_config).await
}

/// Drives `run` until it finishes or `interrupt` fires. An interrupted run is
/// dropped in place, so unfinished downloads delete their temporary files.
pub async fn run_until_interrupted<R, I>(run: R, interrupt: I) -> AppResult<()>
where
    R: Future<Output = AppResult<()>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        result = run => result,
        _ = interrupt => Err(AppError::UserInterrupt),
    }
}
