// src/portal/properties.rs

use crate::{constants, utils};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, warn};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

static PROPERTY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.il_ItemProperty").unwrap());
static ABSOLUTE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\.?\s*([^\d\s.,:]+)\.?\s*(\d{4})(?:,?\s*(\d{1,2}):(\d{2}))?").unwrap()
});
static RELATIVE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(heute|today|gestern|yesterday|morgen|tomorrow),?\s*(?:(\d{1,2}):(\d{2}))?")
        .unwrap()
});

/// What a listing row tells about a file besides its title.
#[derive(Debug, Clone, PartialEq)]
pub struct FileProperties {
    /// Either empty or a leading dot followed by the extension.
    pub extension: String,
    /// Megabytes, `NaN` when unknown.
    pub size_mb: f64,
    pub mod_time: NaiveDateTime,
}

impl FileProperties {
    pub fn unknown() -> Self {
        Self {
            extension: String::new(),
            size_mb: f64::NAN,
            mod_time: constants::unknown_mod_time(),
        }
    }
}

/// Reads extension, size and modification time from the property spans of a
/// listing entry. Empty spans and version markers are dropped before the
/// remaining slots are read by position.
pub fn extract_file_properties(entry: ElementRef<'_>, today: NaiveDate) -> FileProperties {
    let slots: Vec<String> = entry
        .select(&PROPERTY_SEL)
        .map(|span| utils::clean_text(&span.text().collect::<String>()))
        .collect();
    parse_property_slots(&slots, today)
}

pub fn parse_property_slots(raw_slots: &[String], today: NaiveDate) -> FileProperties {
    let slots: Vec<&str> = raw_slots
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && !s.contains("Version"))
        .collect();

    let extension = match slots.first() {
        Some(first) => {
            let mut tokens = first.split_whitespace();
            match (tokens.next(), tokens.next()) {
                (Some(token), None) => format!(".{}", token),
                _ => String::new(),
            }
        }
        None => String::new(),
    };

    let size_mb = slots.get(1).map_or(f64::NAN, |s| parse_size_mb(s));

    let mod_time = slots
        .get(2)
        .map_or_else(constants::unknown_mod_time, |s| {
            parse_portal_date(s, today).unwrap_or_else(|| {
                warn!("Unrecognised date '{}', treating it as unknown", s);
                constants::unknown_mod_time()
            })
        });

    FileProperties { extension, size_mb, mod_time }
}

/// Parses sizes like "287,3 KB", "1.024,5 MB" or "739 Bytes" into megabytes.
/// Dots separate thousands and commas separate decimals.
pub fn parse_size_mb(text: &str) -> f64 {
    let normalized = text.to_lowercase().replace('.', "").replace(',', ".");
    let mut parts = normalized.split_whitespace();
    let Some(value) = parts.next().and_then(|v| v.parse::<f64>().ok()) else {
        debug!("No size in '{}'", text);
        return f64::NAN;
    };
    match parts.next() {
        Some("kb") => value * 1e-3,
        Some("bytes") => value * 1e-6,
        _ => value,
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let folded = utils::fold_umlauts(name).to_lowercase();
    let prefix: String = folded.chars().take(3).collect();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mae" | "mar" | "mrz" => 3,
        "apr" => 4,
        "mai" | "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "okt" | "oct" => 10,
        "nov" => 11,
        "dez" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn time_of(hour: Option<regex::Match<'_>>, minute: Option<regex::Match<'_>>) -> Option<NaiveTime> {
    match (hour, minute) {
        (Some(h), Some(m)) => NaiveTime::from_hms_opt(h.as_str().parse().ok()?, m.as_str().parse().ok()?, 0),
        _ => NaiveTime::from_hms_opt(0, 0, 0),
    }
}

/// Parses the dates ILIAS prints, e.g. "17. Sep 2020, 14:59", "Gestern, 12:31"
/// or "Heute, 09:05". Relative days are resolved against `today`.
pub fn parse_portal_date(text: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let text = utils::clean_text(text);

    if let Some(caps) = RELATIVE_DATE_RE.captures(&text) {
        let day = match caps[1].to_lowercase().as_str() {
            "heute" | "today" => today,
            "gestern" | "yesterday" => today - Duration::days(1),
            _ => today + Duration::days(1),
        };
        return Some(day.and_time(time_of(caps.get(2), caps.get(3))?));
    }

    let caps = ABSOLUTE_DATE_RE.captures(&text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_from_name(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_time(time_of(caps.get(4), caps.get(5))?))
}
