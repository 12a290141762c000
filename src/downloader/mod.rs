// src/downloader/mod.rs

mod task_processor;
mod task_runner;

pub use task_runner::materialize;

use crate::{models::DownloadStatus, symbols, ui};
use colored::*;
use itertools::Itertools;
use log::info;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct DownloadStats {
    pub total: usize,
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Shared counters of one download batch. Clones report into the same stats.
#[derive(Clone)]
pub struct DownloadManager {
    stats: Arc<Mutex<DownloadStats>>,
    failed_downloads: Arc<Mutex<Vec<(String, String)>>>,
    skipped_downloads: Arc<Mutex<Vec<(String, String)>>>,
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadManager {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(Mutex::new(DownloadStats::default())),
            failed_downloads: Arc::new(Mutex::new(Vec::new())),
            skipped_downloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn start_batch(&self, total_tasks: usize) {
        info!("Starting download batch of {} files", total_tasks);
        let mut stats = self.stats.lock().unwrap();
        *stats = DownloadStats {
            total: total_tasks,
            ..Default::default()
        };
        self.failed_downloads.lock().unwrap().clear();
        self.skipped_downloads.lock().unwrap().clear();
    }

    pub fn record_success(&self) {
        self.stats.lock().unwrap().success += 1;
    }

    pub fn record_skip(&self, filename: &str, reason: &str) {
        info!("Skipped '{}': {}", filename, reason);
        self.stats.lock().unwrap().skipped += 1;
        self.skipped_downloads
            .lock()
            .unwrap()
            .push((filename.to_string(), reason.to_string()));
    }

    pub fn record_failure(&self, filename: &str, status: DownloadStatus) {
        log::error!("Download of '{}' failed with {:?}", filename, status);
        self.stats.lock().unwrap().failed += 1;
        let (_, _, msg) = status.get_display_info();
        self.failed_downloads
            .lock()
            .unwrap()
            .push((filename.to_string(), msg.to_string()));
    }

    pub fn get_stats(&self) -> DownloadStats {
        self.stats.lock().unwrap().clone()
    }

    pub fn did_all_succeed(&self) -> bool {
        self.stats.lock().unwrap().failed == 0
    }

    pub fn print_report(&self) {
        let stats = self.get_stats();
        let skipped = self.skipped_downloads.lock().unwrap();
        let failed = self.failed_downloads.lock().unwrap();
        info!(
            "Download report: total={}, success={}, skipped={}, failed={}",
            stats.total, stats.success, stats.skipped, stats.failed
        );

        if !failed.is_empty() || skipped.iter().any(|(_, reason)| !is_up_to_date(reason)) {
            ui::print_sub_header("Details");
            let notable: Vec<_> = skipped
                .iter()
                .filter(|(_, reason)| !is_up_to_date(reason))
                .cloned()
                .collect();
            if !notable.is_empty() {
                println!("\n{} Not downloaded ({}):", *symbols::INFO, notable.len());
                print_grouped_report(&notable, |s| s.cyan());
            }
            if !failed.is_empty() {
                println!("\n{} Failed ({}):", *symbols::ERROR, stats.failed);
                print_grouped_report(&failed, |s| s.red());
            }
        }
        ui::print_sub_header("Summary");
        if stats.total > 0 && stats.failed == 0 {
            println!(
                "{} All {} files are present ({} downloaded, {} already up to date or skipped).",
                *symbols::OK,
                stats.total,
                stats.success,
                stats.skipped
            );
        } else {
            let summary = format!(
                "{} | {} | {}",
                format!("Downloaded: {}", stats.success).green(),
                format!("Failed: {}", stats.failed).red(),
                format!("Skipped: {}", stats.skipped).yellow()
            );
            println!("{}", summary);
        }
    }
}

pub(crate) const UP_TO_DATE: &str = "local copy is up to date";

fn is_up_to_date(reason: &str) -> bool {
    reason == UP_TO_DATE
}

fn print_grouped_report(items: &[(String, String)], color_fn: fn(ColoredString) -> ColoredString) {
    let grouped = items
        .iter()
        .map(|(filename, reason)| (reason, filename))
        .into_group_map();
    for reason in grouped.keys().sorted() {
        println!("  - {}", color_fn(format!("Reason: {}", reason).into()));
        for filename in grouped[reason].iter().sorted() {
            println!("    - {}", filename);
        }
    }
}
