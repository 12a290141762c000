// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use ilias_dl::{
    cli::{Cli, LogLevel},
    constants,
    error::AppError,
    run_from_cli, run_until_interrupted, symbols,
};
use log::warn;
use std::{env, sync::Arc};

#[tokio::main]
async fn main() {
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }
    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| clap::crate_name!().to_string());
    let after_help = format!(
        "Examples:\n  # Download two courses into ~/Uni\n  {bin} -c 1020946 965388 -o ~/Uni\n\n  # Every course of the current semester except one\n  {bin} --semester --exclude 988270\n\n  # Courses whose title matches a pattern\n  {bin} --semester \"\\(HWS 2020\\)\"\n\n  # Where the configuration file lives\n  {bin} --config-help",
        bin = bin_name
    );
    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };

    init_logger(args.log_level);

    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    match run_until_interrupted(run_from_cli(args), interrupt).await {
        Ok(()) => {}
        Err(AppError::UserInterrupt) => {
            println!("\n{} Interrupted, partially written files are discarded.", *symbols::CTRL_C);
            warn!("Run interrupted by user");
            std::process::exit(130);
        }
        Err(e) => {
            log::error!("Run failed: {}", e);
            eprintln!("\n{} {}", *symbols::ERROR, format!("Error: {}", e).red());
            std::process::exit(1);
        }
    }
}

fn init_logger(level: LogLevel) {
    if level == LogLevel::Off {
        return;
    }
    let app_name = clap::crate_name!();

    let log_file_path = match dirs::home_dir() {
        Some(home) => home.join(constants::CONFIG_DIR_NAME).join(constants::LOG_FILE_NAME),
        None => {
            eprintln!("Warning: no home directory, logging to the temp directory.");
            env::temp_dir().join(app_name).join(constants::LOG_FILE_NAME)
        }
    };

    if let Some(dir) = log_file_path.parent()
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("Warning: cannot create log directory {:?}: {}", dir, e);
    }

    let file_appender = match fern::log_file(&log_file_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "Warning: cannot open log file {:?}: {}. Trying a fallback file.",
                log_file_path, e
            );
            let fallback_path = env::temp_dir().join(format!(
                "{}-{}",
                app_name,
                constants::LOG_FALLBACK_FILE_NAME
            ));
            match fern::log_file(&fallback_path) {
                Ok(file) => {
                    warn!("Logging to fallback file {:?}", fallback_path);
                    file
                }
                Err(e_fb) => {
                    eprintln!(
                        "Error: cannot open fallback log file {:?}: {}. Logging is disabled.",
                        fallback_path, e_fb
                    );
                    return;
                }
            }
        }
    };

    let result = fern::Dispatch::new()
        .level(level.into())
        // HTML parsing is noisy at debug level.
        .level_for("html5ever", log::LevelFilter::Warn)
        .level_for("selectors", log::LevelFilter::Warn)
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] [{:<5}] [{}:{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.line().unwrap_or(0),
                message
            ))
        })
        .chain(file_appender)
        .apply();

    if let Err(e) = result {
        eprintln!("Warning: logger setup failed: {}", e);
    }
}
