// src/portal/courses.rs

use crate::{client::RobustClient, error::*, models::Course, utils};
use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static COURSE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.il_ContainerItemTitle[href]").unwrap());
static COURSE_BREADCRUMB_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#mainscrolldiv > ol > li:nth-child(3) > a").unwrap());
static REF_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ref_id=(\d+)").unwrap());
static TAGS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*\] ").unwrap());

/// Title pattern of the semester `today` falls into. The spring semester
/// (FSS/ST) runs from February to July, everything else is the fall semester
/// (HWS/WT), which in January still carries the previous year.
pub fn current_semester_pattern(today: NaiveDate) -> String {
    match today.month() {
        2..=7 => format!(r"\((FSS|ST) {}\)", today.year()),
        1 => format!(r"\((HWS|WT) {}\)", today.year() - 1),
        _ => format!(r"\((HWS|WT) {}\)", today.year()),
    }
}

/// Removes bracketed tags such as "[V] [1. PG] " from a course title.
pub fn strip_course_tags(title: &str) -> String {
    TAGS_RE.replace_all(title.trim(), "").trim().to_string()
}

/// Lists the (ref id, title) pairs of the desktop's courses whose title matches
/// `semester_pattern`, leaving out `exclude_ids`.
pub fn parse_semester_courses(
    desktop_html: &str,
    semester_pattern: &str,
    exclude_ids: &[u64],
) -> AppResult<Vec<(u64, String)>> {
    let semester_re = Regex::new(semester_pattern)?;
    let doc = Html::parse_document(desktop_html);
    let courses = doc
        .select(&COURSE_LINK_SEL)
        .filter_map(|link| {
            let title = utils::clean_text(&link.text().collect::<String>());
            if !semester_re.is_match(&title) {
                return None;
            }
            let ref_id = REF_ID_RE
                .captures(link.value().attr("href")?)?
                .get(1)?
                .as_str()
                .parse::<u64>()
                .ok()?;
            if exclude_ids.contains(&ref_id) {
                debug!("Skipping excluded course {} ({})", ref_id, title);
                return None;
            }
            Some((ref_id, title))
        })
        .collect();
    Ok(courses)
}

/// Reads the course title from the breadcrumb of a course page.
pub fn parse_course_title(course_html: &str) -> Option<String> {
    let doc = Html::parse_document(course_html);
    doc.select(&COURSE_BREADCRUMB_SEL)
        .next()
        .map(|a| utils::clean_text(&a.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Builds the course for `ref_id`, fetching its page when no title is known.
/// Returns `None` when the title is empty after removing its tags.
pub async fn resolve_course(
    client: &RobustClient,
    ref_id: u64,
    title: Option<String>,
) -> AppResult<Option<Course>> {
    let url = client.config().course_url(ref_id)?;
    let title = match title {
        Some(title) => title,
        None => {
            let html = client.get_page(url.clone()).await?;
            parse_course_title(&html).ok_or_else(|| AppError::Markup {
                what: "course breadcrumb",
                url: url.to_string(),
            })?
        }
    };
    let name = strip_course_tags(&title);
    if name.is_empty() {
        return Ok(None);
    }
    info!("Registered course {} '{}'", ref_id, name);
    Ok(Some(Course {
        ref_id,
        name,
        url: url.to_string(),
    }))
}

/// Registers every course of the semester found on the desktop page.
pub async fn semester_courses(
    client: &RobustClient,
    desktop_html: &str,
    semester_pattern: &str,
    exclude_ids: &[u64],
) -> AppResult<Vec<Course>> {
    let mut courses = Vec::new();
    for (ref_id, title) in parse_semester_courses(desktop_html, semester_pattern, exclude_ids)? {
        if let Some(course) = resolve_course(client, ref_id, Some(title)).await? {
            courses.push(course);
        }
    }
    Ok(courses)
}
