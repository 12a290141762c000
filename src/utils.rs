// src/utils.rs

use crate::{constants, error::*};
use anyhow::Context;
use chrono::{Local, NaiveDateTime, TimeZone};
use regex::Regex;
use std::{
    path::{Component, Path, PathBuf},
    sync::LazyLock,
    time::SystemTime,
};

static ILLEGAL_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/*?"<>|]"#).unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Makes one directory or file name safe for every common file system.
/// Colons become " - " so that "Part 1: Intro" stays readable.
pub fn sanitize_path_segment(name: &str) -> String {
    let name = name.trim().replace(':', " - ");
    let name = ILLEGAL_CHARS_RE.replace_all(&name, " ");
    let name = WHITESPACE_RE.replace_all(&name, " ");
    let name = name.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if name.is_empty() {
        return "unnamed".to_string();
    }
    safe_truncate_utf8(name, constants::MAX_FILENAME_BYTES).to_string()
}

/// Joins sanitized segments below the course directory.
pub fn course_path<'a>(course: &str, segments: impl IntoIterator<Item = &'a str>) -> PathBuf {
    let mut path = PathBuf::from(sanitize_path_segment(course));
    for segment in segments {
        if !segment.trim().is_empty() {
            path.push(sanitize_path_segment(segment));
        }
    }
    path
}

fn safe_truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes { return s; }
    let mut i = max_bytes;
    while i > 0 && !s.is_char_boundary(i) { i -= 1; }
    &s[..i]
}

/// Replaces German umlauts and sharp s by their ASCII digraphs.
pub fn fold_umlauts(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'ä' => folded.push_str("ae"),
            'ö' => folded.push_str("oe"),
            'ü' => folded.push_str("ue"),
            'Ä' => folded.push_str("Ae"),
            'Ö' => folded.push_str("Oe"),
            'Ü' => folded.push_str("Ue"),
            'ß' => folded.push_str("ss"),
            _ => folded.push(c),
        }
    }
    folded
}

/// Collapses the whitespace of an element's text into single spaces.
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 { text.to_string() } else { format!("{}...", &text[..end_pos]) }
}

/// Interprets a portal timestamp as local time.
pub fn local_system_time(time: &NaiveDateTime) -> SystemTime {
    Local
        .from_local_datetime(time)
        .earliest()
        .map(SystemTime::from)
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

pub fn secure_join_path(base_dir: &Path, relative_path: &Path) -> AppResult<PathBuf> {
    let resolved_base = dunce::canonicalize(base_dir)
        .with_context(|| format!("Base directory '{:?}' does not exist or is not accessible", base_dir))?;
    let mut final_path = resolved_base.clone();
    for component in relative_path.components() {
        match component {
            Component::Normal(part) => final_path.push(part),
            Component::ParentDir => {
                return Err(AppError::Config(format!(
                    "path '{}' leaves the download directory",
                    relative_path.display()
                )));
            }
            _ => continue,
        }
    }
    Ok(final_path)
}
