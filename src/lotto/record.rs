use crate::lotto::game::Game;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    History,
    Api,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawResult {
    #[serde(skip)]
    pub game: Game,
    pub date: NaiveDate,
    pub period: String,
    pub numbers: Vec<u8>,
    pub source: Source,
}

impl DrawResult {
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            date: self.date,
            period: self.period.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub date: NaiveDate,
    pub period: String,
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*{}", self.date.format("%Y-%m-%d"), self.period)
    }
}

#[derive(Debug, Default)]
struct GameLedger {
    records: Vec<DrawResult>,
    keys: HashSet<IdentityKey>,
}

/// Records keep their admission order; the key index refuses a second
/// record with an identity key already present for that game.
#[derive(Debug)]
pub struct Accumulator {
    ledgers: BTreeMap<Game, GameLedger>,
}

impl Accumulator {
    pub fn new(games: &[Game]) -> Self {
        let ledgers = games
            .iter()
            .map(|game| (*game, GameLedger::default()))
            .collect();
        Self { ledgers }
    }

    pub fn admit(&mut self, record: DrawResult) -> bool {
        let Some(ledger) = self.ledgers.get_mut(&record.game) else {
            return false;
        };
        if !ledger.keys.insert(record.identity_key()) {
            return false;
        }
        ledger.records.push(record);
        true
    }

    pub fn contains(&self, game: Game, key: &IdentityKey) -> bool {
        self.ledgers
            .get(&game)
            .is_some_and(|ledger| ledger.keys.contains(key))
    }

    pub fn records(&self, game: Game) -> &[DrawResult] {
        self.ledgers
            .get(&game)
            .map(|ledger| ledger.records.as_slice())
            .unwrap_or_default()
    }

    pub fn games(&self) -> impl Iterator<Item = Game> + '_ {
        self.ledgers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.ledgers.values().map(|ledger| ledger.records.len()).sum()
    }

    pub fn into_collections(self) -> BTreeMap<Game, Vec<DrawResult>> {
        self.ledgers
            .into_iter()
            .map(|(game, ledger)| (game, ledger.records))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(game: Game, date: (i32, u32, u32), period: &str, source: Source) -> DrawResult {
        DrawResult {
            game,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("date"),
            period: period.to_string(),
            numbers: vec![1, 2, 3],
            source,
        }
    }

    #[test]
    fn identity_key_displays_date_star_period() {
        let record = draw(Game::Lotto649, (2024, 5, 3), "113000050", Source::Api);
        assert_eq!(record.identity_key().to_string(), "2024-05-03*113000050");
    }

    #[test]
    fn admit_refuses_duplicate_key_within_game() {
        let mut acc = Accumulator::new(&Game::RANKED);
        assert!(acc.admit(draw(Game::Lotto649, (2024, 1, 2), "1", Source::History)));
        assert!(!acc.admit(draw(Game::Lotto649, (2024, 1, 2), "1", Source::Api)));
        assert!(acc.admit(draw(Game::Daily539, (2024, 1, 2), "1", Source::Api)));
        assert_eq!(acc.records(Game::Lotto649).len(), 1);
        assert_eq!(acc.records(Game::Lotto649)[0].source, Source::History);
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn admit_ignores_untracked_games() {
        let mut acc = Accumulator::new(&[Game::Lotto649]);
        assert!(!acc.admit(draw(Game::FourStar, (2024, 1, 2), "1", Source::History)));
        assert!(acc.records(Game::FourStar).is_empty());
        assert_eq!(acc.games().collect::<Vec<_>>(), vec![Game::Lotto649]);
    }

    #[test]
    fn serializes_without_game_field() {
        let record = draw(Game::Lotto649, (2022, 1, 4), "111000001", Source::History);
        let json = serde_json::to_string(&record).expect("serialize");
        assert_eq!(
            json,
            r#"{"date":"2022-01-04","period":"111000001","numbers":[1,2,3],"source":"history"}"#
        );
    }
}
