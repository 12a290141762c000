// src/cli.rs

use crate::constants;
use clap::{Parser, ValueEnum, crate_version};
use std::path::PathBuf;

/// Log level written to the log file
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true,
)]
#[command(group(
    clap::ArgGroup::new("mode")
        .required(true)
        .multiple(true)
        .args(&["course", "semester", "config_help"]),
))]
pub struct Cli {
    // --- Mode ---
    /// Download the courses with these ILIAS ref ids
    #[arg(short, long, value_name = "REF_ID", num_args = 1.., help_heading = "Mode")]
    pub course: Vec<u64>,
    /// Download every course of a semester; the optional value is a regex matched
    /// against course titles (default: the current semester)
    #[arg(short, long, value_name = "PATTERN", num_args = 0..=1, default_missing_value = "", help_heading = "Mode")]
    pub semester: Option<String>,
    /// Show where the configuration file lives and what it contains, then exit
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub config_help: bool,

    // --- Options ---
    /// ILIAS user id (uni-id)
    #[arg(short, long, help_heading = "Options")]
    pub user: Option<String>,
    /// ILIAS password (prompted for when missing)
    #[arg(long, help_heading = "Options")]
    pub password: Option<String>,
    /// Ref ids to skip in semester mode
    #[arg(long, value_name = "REF_ID", num_args = 1.., help_heading = "Options")]
    pub exclude: Vec<u64>,
    /// Number of containers scanned concurrently
    #[arg(long, value_parser = clap::value_parser!(usize), help_heading = "Options")]
    pub scan_workers: Option<usize>,
    /// Number of concurrent downloads
    #[arg(short = 'w', long, value_parser = clap::value_parser!(usize), help_heading = "Options")]
    pub download_workers: Option<usize>,
    /// Trigger and download submission exports of finished tasks (tutors only)
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub tutor_mode: bool,
    /// Print every scanned folder and task
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub verbose: bool,
    /// Directory the course folders are created in
    #[arg(short, long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_SAVE_DIR), help_heading = "Options")]
    pub output: PathBuf,
    /// Use this configuration file instead of the one in the home directory
    #[arg(long, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    // --- General ---
    /// Print help and exit
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// Print version and exit
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// (hidden) Log file level, for debugging
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}
