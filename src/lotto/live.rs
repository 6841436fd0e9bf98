use crate::error::{FetchError, ItemSkip};
use crate::logging;
use crate::lotto::game::Game;
use crate::lotto::record::{Accumulator, DrawResult, IdentityKey, Source};
use crate::lotto::warn::{self, WarnEvent};
use chrono::{Datelike, Months, NaiveDate};
use serde_json::Value;
use std::fmt;
use std::thread;
use std::time::Duration;

const MAX_DRAW_NUMBER: u64 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: YearMonth,
    pub end: YearMonth,
}

impl MonthWindow {
    pub fn ending_at(today: NaiveDate, months: u32) -> Self {
        let back = months.saturating_sub(1);
        let start = today
            .with_day(1)
            .and_then(|first| first.checked_sub_months(Months::new(back)))
            .unwrap_or(today);
        Self {
            start: start.into(),
            end: today.into(),
        }
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

pub trait LiveSource {
    fn fetch(&self, game: Game, window: &MonthWindow) -> Result<Vec<Value>, FetchError>;
}

pub fn parse_live_envelope(game: Game, body: &Value) -> Result<Vec<Value>, FetchError> {
    if !body.is_object() {
        return Err(FetchError::Body("response is not a JSON object".to_string()));
    }
    let rt_code = body.get("rtCode").and_then(Value::as_i64).unwrap_or(-1);
    if rt_code != 0 {
        return Err(FetchError::Api(rt_code));
    }
    let items = body
        .get("content")
        .and_then(|content| content.get(game.response_key()))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    Ok(items)
}

fn item_date(item: &Value) -> Option<NaiveDate> {
    let raw = item.get("lotteryDate").and_then(Value::as_str)?;
    let day = raw.split('T').next().unwrap_or(raw).trim();
    if day.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn item_period(item: &Value) -> String {
    match item.get("period") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn whole_number(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(num) => match num.as_u64() {
            Some(n) => n,
            None => {
                let f = num.as_f64()?;
                if f < 0.0 || f.fract() != 0.0 || f > MAX_DRAW_NUMBER as f64 {
                    return None;
                }
                f as u64
            }
        },
        Value::String(s) => {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse::<u64>().ok()?
        }
        _ => return None,
    };
    if n > MAX_DRAW_NUMBER {
        return None;
    }
    u8::try_from(n).ok()
}

fn non_empty_list<'a>(item: &'a Value, field: &str) -> Option<&'a Vec<Value>> {
    item.get(field)
        .and_then(Value::as_array)
        .filter(|list| !list.is_empty())
}

pub fn live_item_to_record(game: Game, item: &Value) -> Result<DrawResult, ItemSkip> {
    let date = item_date(item).ok_or(ItemSkip::UnusableDate)?;
    let period = item_period(item);

    let chosen = non_empty_list(item, "drawNumberSize")
        .or_else(|| non_empty_list(item, "drawNumberAppear"));
    let numbers: Vec<u8> = chosen
        .map(|list| list.iter().filter_map(whole_number).collect())
        .unwrap_or_default();
    if numbers.is_empty() {
        return Err(ItemSkip::EmptyNumbers);
    }

    Ok(DrawResult {
        game,
        date,
        period,
        numbers,
        source: Source::Api,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameMergeOutcome {
    pub items: usize,
    pub admitted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Identity keys already in `acc` (archive records, or items admitted
/// earlier in this batch) are skipped.
pub fn merge_items(game: Game, items: &[Value], acc: &mut Accumulator) -> GameMergeOutcome {
    let mut outcome = GameMergeOutcome {
        items: items.len(),
        ..GameMergeOutcome::default()
    };
    for item in items {
        // Known keys are skipped before number coercion.
        let Some(date) = item_date(item) else {
            outcome.skipped += 1;
            continue;
        };
        let key = IdentityKey {
            date,
            period: item_period(item),
        };
        if acc.contains(game, &key) {
            outcome.duplicates += 1;
            continue;
        }
        match live_item_to_record(game, item) {
            Ok(record) => {
                if acc.admit(record) {
                    outcome.admitted += 1;
                } else {
                    outcome.duplicates += 1;
                }
            }
            Err(_) => outcome.skipped += 1,
        }
    }
    outcome
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub games_fetched: usize,
    pub games_failed: usize,
    pub items: usize,
    pub admitted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

pub fn merge_live(
    source: &dyn LiveSource,
    games: &[Game],
    window: &MonthWindow,
    pacing: Duration,
    acc: &mut Accumulator,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    logging::info("merge", format!("window={window}"));

    for (position, game) in games.iter().copied().enumerate() {
        if position > 0 && !pacing.is_zero() {
            thread::sleep(pacing);
        }
        logging::info(
            "merge",
            format!("game={} code={} known={}", game, game.api_code(), acc.records(game).len()),
        );

        let items = match source.fetch(game, window) {
            Ok(items) => items,
            Err(err) => {
                outcome.games_failed += 1;
                warn::emit(WarnEvent {
                    code: err.code(),
                    stage: "merge",
                    action: "skip_game",
                    target: game.api_code(),
                    reason: "fetch_failed",
                    err: &err.to_string(),
                });
                continue;
            }
        };

        outcome.games_fetched += 1;
        let merged = merge_items(game, &items, acc);
        outcome.items += merged.items;
        outcome.admitted += merged.admitted;
        outcome.duplicates += merged.duplicates;
        outcome.skipped += merged.skipped;
        if merged.admitted > 0 {
            logging::info(
                "merge",
                format!("game={} new_records={}", game, merged.admitted),
            );
        }
    }
    outcome
}
