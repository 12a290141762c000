// src/crawler/mod.rs

mod background;
mod expand;
mod scrapers;
mod traversal;

pub use background::{BackgroundResolution, cleanup_jobs, match_jobs, poll_and_resolve};
pub use scrapers::ExternalScraper;
pub use traversal::{CrawlOutput, crawl_course};

use crate::{
    CrawlContext,
    error::*,
    models::{ContainerRef, Course, FileRecord, Placeholder},
    portal::courses,
    symbols, ui,
};
use colored::*;
use log::{error, info, warn};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// Containers that were discovered but not expanded yet. Workers of a round
/// push into it while the next round's batch is taken out in one go.
#[derive(Clone, Default)]
pub struct Frontier {
    queue: Arc<Mutex<VecDeque<ContainerRef>>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, container: ContainerRef) {
        self.queue.lock().unwrap().push_back(container);
    }

    /// Removes and returns every queued container.
    pub fn take_all(&self) -> Vec<ContainerRef> {
        self.queue.lock().unwrap().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

/// What scanning all registered courses produced.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub files: Vec<FileRecord>,
    pub placeholders: Vec<Placeholder>,
    /// Course name and error of every course whose top-level page failed.
    pub failed_courses: Vec<(String, String)>,
}

/// Registry of courses and external scrapers, scanned one course at a time.
pub struct Crawler {
    context: CrawlContext,
    courses: Vec<Course>,
    scrapers: Vec<Box<dyn ExternalScraper>>,
}

impl Crawler {
    pub fn new(context: CrawlContext) -> Self {
        Self {
            context,
            courses: Vec::new(),
            scrapers: Vec::new(),
        }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Registers a course unless one with the same ref id is known already.
    pub fn add_course(&mut self, course: Course) -> bool {
        if self.courses.iter().any(|c| c.ref_id == course.ref_id) {
            info!("Course {} is already registered", course.ref_id);
            return false;
        }
        self.courses.push(course);
        true
    }

    /// Registers courses by ref id and returns how many were new. A course
    /// whose page cannot be read is reported and left out.
    pub async fn add_courses(&mut self, ref_ids: &[u64]) -> usize {
        let mut added = 0;
        for &ref_id in ref_ids {
            match courses::resolve_course(&self.context.http_client, ref_id, None).await {
                Ok(Some(course)) => {
                    if self.add_course(course) {
                        added += 1;
                    }
                }
                Ok(None) => warn!("Course {} has no usable title, skipped", ref_id),
                Err(e) => {
                    error!("Could not register course {}: {}", ref_id, e);
                    ui::error(&format!("Could not register course {}: {}", ref_id, e));
                }
            }
        }
        added
    }

    /// Registers every desktop course whose title matches `pattern`.
    pub async fn add_all_semester_courses(
        &mut self,
        desktop_html: &str,
        pattern: &str,
        exclude_ids: &[u64],
    ) -> AppResult<usize> {
        let found = courses::semester_courses(
            &self.context.http_client,
            desktop_html,
            pattern,
            exclude_ids,
        )
        .await?;
        Ok(found
            .into_iter()
            .map(|course| self.add_course(course))
            .filter(|added| *added)
            .count())
    }

    pub fn add_external_scraper(&mut self, scraper: Box<dyn ExternalScraper>) {
        self.scrapers.push(scraper);
    }

    /// Crawls every registered course, then runs the external scrapers.
    /// Failures are contained to the course or scraper they happen in.
    pub async fn scan(&self) -> ScanReport {
        let mut report = ScanReport::default();

        for course in &self.courses {
            ui::print_sub_header(&course.name);
            let spinner = ui::new_spinner(&format!(
                "Scanning with {} workers...",
                self.context.config.scan_workers
            ));
            let result = crawl_course(&self.context, course).await;
            spinner.finish_and_clear();

            match result {
                Ok(output) => {
                    println!(
                        "{} {} files, {} pending exports ({} rounds{})",
                        *symbols::OK,
                        output.files.len(),
                        output.placeholders.len(),
                        output.rounds,
                        if output.failed_expansions > 0 {
                            format!(", {} failed pages", output.failed_expansions)
                                .yellow()
                                .to_string()
                        } else {
                            String::new()
                        }
                    );
                    report.files.extend(output.files);
                    report.placeholders.extend(output.placeholders);
                }
                Err(e) => {
                    error!("Scanning course '{}' failed: {}", course.name, e);
                    ui::error(&format!("Scanning '{}' failed: {}", course.name, e));
                    report.failed_courses.push((course.name.clone(), e.to_string()));
                }
            }
        }

        for scraper in &self.scrapers {
            ui::print_sub_header(scraper.name());
            match scraper.scrape(&self.context).await {
                Ok(files) => {
                    println!("{} {} files", *symbols::OK, files.len());
                    report.files.extend(files);
                }
                Err(e) => {
                    error!("External scraper '{}' failed: {}", scraper.name(), e);
                    ui::error(&format!("{} failed: {}", scraper.name(), e));
                }
            }
        }

        report
    }
}
