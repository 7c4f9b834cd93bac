/// Small string helpers for scraped text
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{CatalogError, Result};

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?:(\d*):)?(\d+):(\d+)").expect("valid duration regex"))
}

/// Collapse newlines to spaces and trim. Absent input yields an empty string.
pub fn tidy_string(input: Option<&str>) -> String {
    match input {
        Some(text) => text.replace(['\r', '\n'], " ").trim().to_string(),
        None => String::new(),
    }
}

/// Convert `hh:mm:ss`, `mm:ss` or a bare number of seconds to milliseconds
pub fn convert_duration(input: &str) -> Result<u64> {
    let input = input.trim();

    let seconds = if input.contains(':') {
        let captures = duration_pattern()
            .captures(input)
            .ok_or_else(|| CatalogError::parse("duration", input))?;

        let number = |index: usize| -> Result<u64> {
            match captures.get(index).map(|m| m.as_str()) {
                Some("") | None => Ok(0),
                Some(digits) => digits
                    .parse::<u64>()
                    .map_err(|_| CatalogError::parse("duration", input)),
            }
        };

        let (hours, minutes, seconds) = (number(1)?, number(2)?, number(3)?);
        hours
            .checked_mul(3600)
            .and_then(|total| total.checked_add(minutes.checked_mul(60)?))
            .and_then(|total| total.checked_add(seconds))
            .ok_or_else(|| CatalogError::parse("duration", input))?
    } else {
        input
            .parse::<u64>()
            .map_err(|_| CatalogError::parse("duration", input))?
    };

    seconds
        .checked_mul(1000)
        .ok_or_else(|| CatalogError::parse("duration", input))
}
