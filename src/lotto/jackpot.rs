use crate::error::FetchError;
use crate::logging;
use crate::lotto::game::Game;
use crate::lotto::warn::{self, WarnEvent};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Shown while the operator has not published the next figure yet.
pub const IN_PROGRESS_MARKER: &str = "更新中";

static DIGIT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn digit_pattern() -> &'static Regex {
    DIGIT_PATTERN.get_or_init(|| {
        Regex::new(r#"class="amount-number"[^>]*>(\d)</div>"#).expect("digit pattern compiles")
    })
}

pub trait JackpotSource {
    fn fetch_page(&self, game: Game) -> Result<String, FetchError>;
}

pub fn format_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn extract_jackpot(html: &str) -> Option<String> {
    let digits: String = digit_pattern()
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect();
    if !digits.is_empty() {
        return digits.parse::<u128>().ok().map(format_thousands);
    }
    html.contains(IN_PROGRESS_MARKER)
        .then(|| IN_PROGRESS_MARKER.to_string())
}

pub fn collect_jackpots(source: &dyn JackpotSource, games: &[Game]) -> BTreeMap<Game, String> {
    let mut jackpots = BTreeMap::new();
    for game in games.iter().copied() {
        if game.jackpot_slug().is_none() {
            continue;
        }
        logging::info("jackpot", format!("scraping game={game}"));
        let page = match source.fetch_page(game) {
            Ok(page) => page,
            Err(err) => {
                warn::emit(WarnEvent {
                    code: err.code(),
                    stage: "jackpot",
                    action: "skip_game",
                    target: game.api_code(),
                    reason: "fetch_failed",
                    err: &err.to_string(),
                });
                continue;
            }
        };
        match extract_jackpot(&page) {
            Some(amount) => {
                jackpots.insert(game, amount);
            }
            None => warn::emit(WarnEvent {
                code: "jackpot_missing",
                stage: "jackpot",
                action: "skip_game",
                target: game.api_code(),
                reason: "no_figure_on_page",
                ..WarnEvent::default()
            }),
        }
    }
    jackpots
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PageFixture;

    impl JackpotSource for PageFixture {
        fn fetch_page(&self, game: Game) -> Result<String, FetchError> {
            match game {
                Game::Lotto649 => Ok(concat!(
                    r#"<div class="amount-number" data-v="1">3</div>"#,
                    r#"<div class="amount-number">1</div>"#,
                    r#"<div class="amount-number">0</div>"#,
                    r#"<div class="amount-number">0</div>"#,
                    r#"<div class="amount-number">0</div>"#,
                    r#"<div class="amount-number">0</div>"#,
                    r#"<div class="amount-number">0</div>"#,
                    r#"<div class="amount-number">0</div>"#,
                )
                .to_string()),
                Game::SuperLotto638 => Err(FetchError::Status(502)),
                _ => panic!("only jackpot games are scraped"),
            }
        }
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(310_000_000), "310,000,000");
    }

    #[test]
    fn digits_are_concatenated_and_grouped() {
        let html = r#"<div class="amount-number">0</div><div class="amount-number">1</div>
<div class="amount-number">2</div><div class="amount-number">3</div><div class="amount-number">4</div>"#;
        assert_eq!(extract_jackpot(html).as_deref(), Some("1,234"));
    }

    #[test]
    fn in_progress_marker_is_recognized() {
        let html = "<span class=\"amount\">更新中</span>";
        assert_eq!(extract_jackpot(html).as_deref(), Some(IN_PROGRESS_MARKER));
    }

    #[test]
    fn page_without_figure_yields_none() {
        assert_eq!(extract_jackpot("<html><body>maintenance</body></html>"), None);
    }

    #[test]
    fn only_eligible_games_are_scraped_and_failures_are_left_out() {
        let jackpots = collect_jackpots(&PageFixture, &Game::RANKED);
        assert_eq!(jackpots.len(), 1);
        assert_eq!(jackpots.get(&Game::Lotto649).map(String::as_str), Some("31,000,000"));
        assert!(!jackpots.contains_key(&Game::SuperLotto638));
    }
}
