use serde::{Serialize, Serializer};
use std::fmt;

/// Declaration order is the classification priority: when an archive line
/// names more than one game, the earliest variant wins. It is also the order
/// games appear in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Game {
    Lotto649,
    SuperLotto638,
    Daily539,
    Lotto1224,
    ThreeStar,
    FourStar,
}

impl Game {
    pub const RANKED: [Game; 6] = [
        Game::Lotto649,
        Game::SuperLotto638,
        Game::Daily539,
        Game::Lotto1224,
        Game::ThreeStar,
        Game::FourStar,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Game::Lotto649 => "大樂透",
            Game::SuperLotto638 => "威力彩",
            Game::Daily539 => "今彩539",
            Game::Lotto1224 => "雙贏彩",
            Game::ThreeStar => "3星彩",
            Game::FourStar => "4星彩",
        }
    }

    pub fn api_code(self) -> &'static str {
        match self {
            Game::Lotto649 => "Lotto649",
            Game::SuperLotto638 => "SuperLotto638",
            Game::Daily539 => "Daily539",
            Game::Lotto1224 => "Lotto1224",
            Game::ThreeStar => "3D",
            Game::FourStar => "4D",
        }
    }

    pub fn response_key(self) -> &'static str {
        match self {
            Game::Lotto649 => "lotto649Res",
            Game::SuperLotto638 => "superLotto638Res",
            Game::Daily539 => "daily539Res",
            Game::Lotto1224 => "lotto1224Res",
            Game::ThreeStar => "lotto3DRes",
            Game::FourStar => "lotto4DRes",
        }
    }

    pub fn jackpot_slug(self) -> Option<&'static str> {
        match self {
            Game::Lotto649 => Some("lotto649"),
            Game::SuperLotto638 => Some("super_lotto638"),
            _ => None,
        }
    }

    pub fn from_api_code(code: &str) -> Option<Game> {
        let wanted = code.trim();
        Self::RANKED
            .into_iter()
            .find(|game| game.api_code().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl Serialize for Game {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

pub fn classify(field: &str, ranked: &[Game]) -> Option<Game> {
    ranked
        .iter()
        .copied()
        .find(|game| field.contains(game.display_name()))
}
