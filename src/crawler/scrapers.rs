// src/crawler/scrapers.rs

use crate::{CrawlContext, error::AppResult, models::FileRecord};
use async_trait::async_trait;

/// A source of files outside the ILIAS hierarchy, e.g. a lecturer's own web
/// page. Its records are downloaded together with the crawled ones and must
/// carry a course-prefixed `path`.
#[async_trait]
pub trait ExternalScraper: Send + Sync {
    fn name(&self) -> &str;

    async fn scrape(&self, context: &CrawlContext) -> AppResult<Vec<FileRecord>>;
}
