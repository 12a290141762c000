// src/crawler/expand.rs

use crate::{
    CrawlContext,
    constants::{self, portal::forms},
    error::*,
    models::{ContainerRef, FileRecord, Item, ItemKind, Placeholder},
    portal::{
        FileProperties,
        media::MediaItem,
        pages::{self, TaskPage},
    },
    symbols, ui, utils,
};
use chrono::{Local, NaiveDate};
use futures::future;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Fetches one container and lists what it holds.
pub(super) async fn expand(
    context: &CrawlContext,
    course: &str,
    container: &ContainerRef,
) -> AppResult<Vec<Item>> {
    match container.kind {
        ItemKind::Folder => expand_folder(context, course, container).await,
        ItemKind::Task => expand_task(context, course, container).await,
        ItemKind::LearningMaterial => expand_learning_material(context, container).await,
        kind => {
            debug!("{:?} '{}' has nothing to expand", kind, container.name);
            Ok(Vec::new())
        }
    }
}

fn report_scan(context: &CrawlContext, what: &str, path: &Path, url: &str) {
    if context.config.verbose {
        ui::plain(&format!("{} {} {}\n    {}", *symbols::SCAN, what, path.display(), url));
    }
}

async fn expand_folder(
    context: &CrawlContext,
    course: &str,
    container: &ContainerRef,
) -> AppResult<Vec<Item>> {
    let config = &context.config;
    let html = context.http_client.get_page(container.url.as_str()).await?;
    let page = pages::parse_folder_page(&html, &config.base_url, today());
    let path = utils::course_path(course, page.location.iter().map(String::as_str));
    report_scan(context, "Scanning folder", &path, &container.url);

    let mut items: Vec<Item> = future::join_all(
        page.media
            .into_iter()
            .map(|media| media_record(context, course, &path, media)),
    )
    .await
    .into_iter()
    .map(Item::File)
    .collect();

    for entry in page.entries {
        match entry.kind {
            ItemKind::File => {
                let properties = entry.properties.unwrap_or_else(FileProperties::unknown);
                items.push(Item::File(FileRecord {
                    course: course.to_string(),
                    kind: ItemKind::File,
                    name: utils::sanitize_path_segment(&format!(
                        "{}{}",
                        entry.name, properties.extension
                    )),
                    size_mb: properties.size_mb,
                    mod_time: properties.mod_time,
                    url: entry.url.to_string(),
                    path: path.clone(),
                }));
            }
            kind if kind.is_container() => items.push(Item::Container(ContainerRef {
                kind,
                name: entry.name,
                url: entry.url.to_string(),
            })),
            kind => debug!("Ignoring {:?} '{}'", kind, entry.name),
        }
    }
    Ok(items)
}

/// Videos carry no listing properties, so their size is asked from the server.
async fn media_record(
    context: &CrawlContext,
    course: &str,
    path: &Path,
    media: MediaItem,
) -> FileRecord {
    let size_mb = match context.http_client.content_length(media.url.clone()).await {
        Ok(Some(bytes)) => bytes as f64 / 1e6,
        Ok(None) => f64::NAN,
        Err(e) => {
            debug!("No size for video '{}': {}", media.name, e);
            f64::NAN
        }
    };
    FileRecord {
        course: course.to_string(),
        kind: ItemKind::File,
        name: utils::sanitize_path_segment(&media.name),
        size_mb,
        mod_time: constants::unknown_mod_time(),
        url: media.url.to_string(),
        path: path.to_path_buf(),
    }
}

async fn expand_task(
    context: &CrawlContext,
    course: &str,
    container: &ContainerRef,
) -> AppResult<Vec<Item>> {
    let config = &context.config;
    let html = context.http_client.get_page(container.url.as_str()).await?;
    let page = pages::parse_task_page(&html, &container.url, &config.base_url, today())?;
    let path = utils::course_path(course, [constants::TASKS_DIR, page.title.as_str()]);
    report_scan(context, "Scanning task", &path, &container.url);

    let mut items: Vec<Item> = page
        .files
        .iter()
        .map(|(name, url)| {
            Item::File(FileRecord {
                course: course.to_string(),
                kind: ItemKind::File,
                name: utils::sanitize_path_segment(name),
                size_mb: f64::NAN,
                mod_time: constants::unknown_mod_time(),
                url: url.to_string(),
                path: path.clone(),
            })
        })
        .collect();

    if config.tutor_mode {
        match request_submission_export(context, course, path, &page).await {
            Ok(Some(placeholder)) => items.push(Item::Placeholder(placeholder)),
            Ok(None) => {}
            Err(e) => warn!("Could not export submissions of '{}': {}", page.title, e),
        }
    }
    Ok(items)
}

/// Starts the server side export of all submissions once the deadline has
/// passed. The archive shows up later as a background task named after the
/// grades page.
async fn request_submission_export(
    context: &CrawlContext,
    course: &str,
    path: PathBuf,
    page: &TaskPage,
) -> AppResult<Option<Placeholder>> {
    let Some(deadline) = page.deadline else {
        debug!("Task '{}' has no deadline, nothing to export", page.title);
        return Ok(None);
    };
    if deadline >= Local::now().naive_local() {
        debug!("Task '{}' is still open until {}", page.title, deadline);
        return Ok(None);
    }
    let Some(grades_url) = &page.grades_url else {
        debug!("Task '{}' has no grades tab", page.title);
        return Ok(None);
    };

    let client = &context.http_client;
    let html = client.get_page(grades_url.clone()).await?;
    let grades = pages::parse_grades_page(&html, grades_url.as_str(), &context.config.base_url)?;
    client
        .post_form(
            grades.form_action,
            &[
                (forms::USER_LOGIN_KEY, ""),
                (forms::DOWNLOAD_SUBMISSIONS_KEY, forms::DOWNLOAD_SUBMISSIONS_VALUE),
            ],
        )
        .await?;
    info!("Requested submission export '{}'", grades.title);

    Ok(Some(Placeholder {
        course: course.to_string(),
        name: format!("{}.zip", grades.title),
        size_mb: f64::NAN,
        mod_time: deadline,
        path,
    }))
}

/// Learning modules are fetched so that broken links show up in the log,
/// but their pages hold nothing to download.
async fn expand_learning_material(
    context: &CrawlContext,
    container: &ContainerRef,
) -> AppResult<Vec<Item>> {
    context.http_client.get_page(container.url.as_str()).await?;
    debug!("Learning material '{}' yields no files", container.name);
    Ok(Vec::new())
}
