use crate::error::LineRejection;
use crate::lotto::game::{Game, classify};
use crate::lotto::record::{DrawResult, Source};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

const MIN_FIELDS: usize = 5;
const FIRST_NUMBER_FIELD: usize = 5;
const MIN_NUMBERS: usize = 2;
const MAX_DRAW_NUMBER: u64 = 99;
/// Archive years below this are on the regional calendar.
const REGIONAL_YEAR_CUTOFF: i32 = 1912;
const REGIONAL_YEAR_OFFSET: i32 = 1911;

static DATE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn date_pattern() -> &'static Regex {
    DATE_PATTERN.get_or_init(|| {
        Regex::new(r"(\d{1,4})[^\d](\d{1,2})[^\d](\d{1,2})").expect("date pattern compiles")
    })
}

pub fn parse_archive_date(field: &str) -> Option<NaiveDate> {
    let caps = date_pattern().captures(field)?;
    let mut year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    if year < REGIONAL_YEAR_CUTOFF {
        year += REGIONAL_YEAR_OFFSET;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn draw_number(token: &str) -> Option<u8> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = token.parse().ok()?;
    if value > MAX_DRAW_NUMBER {
        return None;
    }
    u8::try_from(value).ok()
}

pub fn normalize_line(line: &str, games: &[Game]) -> Result<DrawResult, LineRejection> {
    let cleaned = line.replace('\u{feff}', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(LineRejection::Blank);
    }

    let fields: Vec<String> = cleaned
        .split(',')
        .map(|field| field.trim().replace('"', ""))
        .collect();
    if fields.len() < MIN_FIELDS {
        return Err(LineRejection::TooFewFields(fields.len()));
    }

    let game = classify(fields[0].trim(), games).ok_or(LineRejection::UnknownGame)?;

    let date_field = fields[2].trim();
    let date =
        parse_archive_date(date_field).ok_or_else(|| LineRejection::BadDate(date_field.to_string()))?;

    let numbers: Vec<u8> = fields[FIRST_NUMBER_FIELD..]
        .iter()
        .filter_map(|field| draw_number(field.trim()))
        .collect();
    if numbers.len() < MIN_NUMBERS {
        return Err(LineRejection::TooFewNumbers(numbers.len()));
    }

    Ok(DrawResult {
        game,
        date,
        period: fields[1].trim().to_string(),
        numbers,
        source: Source::History,
    })
}
