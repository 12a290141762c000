// src/crawler/traversal.rs

use super::{Frontier, expand::expand};
use crate::{
    CrawlContext,
    error::*,
    models::{ContainerRef, Course, FileRecord, Item, ItemKind, Placeholder},
};
use futures::{StreamExt, stream};
use log::{debug, info, warn};
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// Everything found below one course.
#[derive(Debug, Default)]
pub struct CrawlOutput {
    pub files: Vec<FileRecord>,
    pub placeholders: Vec<Placeholder>,
    /// Expansion rounds including the one for the course page itself.
    pub rounds: usize,
    /// Containers whose page could not be fetched or read.
    pub failed_expansions: usize,
}

#[derive(Default)]
struct Collector {
    files: Mutex<Vec<FileRecord>>,
    placeholders: Mutex<Vec<Placeholder>>,
}

impl Collector {
    fn route(&self, items: Vec<Item>, frontier: &Frontier) {
        for item in items {
            match item {
                Item::File(file) => self.files.lock().unwrap().push(file),
                Item::Placeholder(placeholder) => self.placeholders.lock().unwrap().push(placeholder),
                Item::Container(container) => frontier.push(container),
            }
        }
    }
}

/// Walks the hierarchy below `course` breadth first. Each round takes every
/// queued container and expands up to `scan_workers` of them at a time;
/// containers found during a round are expanded in the next one.
///
/// Only a failure of the course page itself is returned as an error. Any
/// deeper page that fails is logged and contributes nothing.
pub async fn crawl_course(context: &CrawlContext, course: &Course) -> AppResult<CrawlOutput> {
    let seed = ContainerRef {
        kind: ItemKind::Folder,
        name: course.name.clone(),
        url: course.url.clone(),
    };
    let collector = Collector::default();
    let frontier = Frontier::new();

    collector.route(expand(context, &course.name, &seed).await?, &frontier);
    let mut rounds = 1;
    let failed = AtomicUsize::new(0);

    while !frontier.is_empty() {
        let batch = frontier.take_all();
        rounds += 1;
        debug!("Round {} of '{}': {} containers", rounds, course.name, batch.len());

        let (frontier, collector, failed) = (&frontier, &collector, &failed);
        stream::iter(batch)
            .for_each_concurrent(context.config.scan_workers, |container| async move {
                match expand(context, &course.name, &container).await {
                    Ok(items) => collector.route(items, frontier),
                    Err(e) => {
                        warn!("Skipping {:?} '{}' ({}): {}", container.kind, container.name, container.url, e);
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
            .await;
    }

    let output = CrawlOutput {
        files: collector.files.into_inner().unwrap_or_default(),
        placeholders: collector.placeholders.into_inner().unwrap_or_default(),
        rounds,
        failed_expansions: failed.into_inner(),
    };
    info!(
        "Crawled '{}': {} files, {} placeholders, {} rounds, {} failed expansions",
        course.name,
        output.files.len(),
        output.placeholders.len(),
        output.rounds,
        output.failed_expansions
    );
    Ok(output)
}
