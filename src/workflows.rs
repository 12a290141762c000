// src/workflows.rs

use crate::{
    CrawlContext,
    cli::Cli,
    config::{ExternalConfig, credentials},
    crawler::{self, Crawler, ScanReport},
    downloader,
    error::AppResult,
    models::{FileRecord, Placeholder},
    portal::courses,
    session, symbols, ui,
};
use chrono::Local;
use colored::*;
use log::{info, warn};
use url::Url;

/// Logs in, registers the requested courses, scans them and downloads what is
/// new. Only a failed login or unusable settings end the run with an error.
pub async fn run(context: CrawlContext, args: &Cli, external_config: &ExternalConfig) -> AppResult<()> {
    let credentials = credentials::resolve_credentials(
        args.user.as_deref(),
        args.password.as_deref(),
        external_config,
    )?;

    ui::print_header("ILIAS download");
    let spinner = ui::new_spinner("Logging in...");
    let login = session::login(&context.http_client, &credentials).await;
    spinner.finish_and_clear();
    let start_page = login?;
    println!("{} Logged in as {}", *symbols::OK, credentials.user);

    let mut crawler = Crawler::new(context.clone());
    register_courses(&mut crawler, args, &start_page).await;
    if crawler.courses().is_empty() {
        ui::warn("No courses to download.");
        return Ok(());
    }
    ui::info(&format!(
        "{} courses registered: {}",
        crawler.courses().len(),
        crawler
            .courses()
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    let ScanReport {
        mut files,
        placeholders,
        failed_courses,
    } = crawler.scan().await;

    let mut cleanup_urls = Vec::new();
    if context.config.tutor_mode && !placeholders.is_empty() {
        let (resolved, cleanup) = resolve_exports(&context, placeholders).await;
        files.extend(resolved);
        cleanup_urls = cleanup;
    }

    download_files(&context, &files).await;

    if !cleanup_urls.is_empty() {
        let removed = crawler::cleanup_jobs(&context, &cleanup_urls).await;
        info!("Removed {} of {} background tasks", removed, cleanup_urls.len());
    }

    for (course, error) in &failed_courses {
        ui::error(&format!("'{}' was not scanned: {}", course, error));
    }
    Ok(())
}

async fn register_courses(crawler: &mut Crawler, args: &Cli, start_page: &str) {
    if !args.course.is_empty() {
        crawler.add_courses(&args.course).await;
    }
    if let Some(pattern) = &args.semester {
        let pattern = if pattern.is_empty() {
            courses::current_semester_pattern(Local::now().date_naive())
        } else {
            pattern.clone()
        };
        info!("Registering semester courses matching '{}'", pattern);
        if let Err(e) = crawler
            .add_all_semester_courses(start_page, &pattern, &args.exclude)
            .await
        {
            ui::error(&format!("Could not register semester courses: {}", e));
        }
    }
}

/// Reads the background task bar once. Exports that are not finished yet are
/// reported and picked up by a later run.
async fn resolve_exports(
    context: &CrawlContext,
    placeholders: Vec<Placeholder>,
) -> (Vec<FileRecord>, Vec<Url>) {
    match crawler::poll_and_resolve(context, placeholders).await {
        Ok(resolution) => {
            for pending in &resolution.unresolved {
                warn!("Export '{}' of '{}' is not ready", pending.name, pending.course);
                ui::warn(&format!(
                    "Export '{}' ({}) is not ready yet, run again later.",
                    pending.name, pending.course
                ));
            }
            (resolution.files, resolution.cleanup_urls)
        }
        Err(e) => {
            ui::warn(&format!("Could not read the background tasks: {}", e));
            (Vec::new(), Vec::new())
        }
    }
}

async fn download_files(context: &CrawlContext, files: &[FileRecord]) {
    if files.is_empty() {
        ui::info("Nothing to download.");
        return;
    }
    downloader::materialize(context, files).await;
    context.manager.print_report();
    if !context.manager.did_all_succeed() {
        println!(
            "\n{}",
            "Some files could not be downloaded, see above or the log file.".yellow()
        );
    }
}
