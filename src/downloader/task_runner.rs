// src/downloader/task_runner.rs

use super::task_processor::TaskProcessor;
use crate::{CrawlContext, models::*, ui, utils};
use futures::{StreamExt, stream};
use indicatif::ProgressBar;
use itertools::Itertools;
use log::{error, info};
use std::{cmp::min, fs};

/// Downloads `records` into the download directory and returns one result per
/// record. Directories are created up front so that workers only write files.
pub async fn materialize(context: &CrawlContext, records: &[FileRecord]) -> Vec<DownloadResult> {
    context.manager.start_batch(records.len());
    let max_workers = min(context.config.download_workers, records.len());
    if max_workers == 0 {
        return Vec::new();
    }

    create_directories(context, records);

    ui::plain("");
    ui::info(&format!(
        "Checking {} files with {} download workers...",
        records.len(),
        max_workers
    ));
    let pbar = ui::new_tasks_progress_bar(records.len() as u64, "Download");

    let results: Vec<DownloadResult> = stream::iter(records)
        .map(|record| run_single_task(record, context.clone(), pbar.clone()))
        .buffer_unordered(max_workers)
        .collect()
        .await;

    pbar.finish_and_clear();
    results
}

fn create_directories(context: &CrawlContext, records: &[FileRecord]) {
    for dir in records.iter().map(|r| &r.path).unique() {
        let result = utils::secure_join_path(&context.config.download_path, dir)
            .and_then(|full| Ok(fs::create_dir_all(full)?));
        if let Err(e) = result {
            error!("Could not create directory '{}': {}", dir.display(), e);
        }
    }
}

async fn run_single_task(record: &FileRecord, context: CrawlContext, pbar: ProgressBar) -> DownloadResult {
    let processor = TaskProcessor::new(context.clone());
    let result = processor.process(record).await;

    match result.status {
        DownloadStatus::Success => {
            context.manager.record_success();
            info!("Downloaded {}", record.relative_path().display());
            pbar.println(format!(
                "{} {}: {} ({})",
                result.status.get_display_info().0,
                record.course,
                utils::truncate_text(&record.name, crate::constants::FILENAME_TRUNCATE_LENGTH),
                record.size_label()
            ));
        }
        DownloadStatus::Skipped => context.manager.record_skip(
            &record.relative_path().display().to_string(),
            result.message.as_deref().unwrap_or(super::UP_TO_DATE),
        ),
        status => {
            context
                .manager
                .record_failure(&record.relative_path().display().to_string(), status);
            let (symbol, color_fn, default_msg) = status.get_display_info();
            pbar.println(format!(
                "{} {} {}",
                symbol,
                record.name,
                color_fn(
                    format!(
                        "{} ({})",
                        default_msg,
                        result.message.as_deref().unwrap_or("no details")
                    )
                    .into()
                )
            ));
        }
    }
    pbar.inc(1);
    result
}
