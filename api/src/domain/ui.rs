use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Accent colour the client is themed with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Blue,
    Green,
    Orange,
    Purple,
    Red,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Blue,
        Theme::Green,
        Theme::Orange,
        Theme::Purple,
        Theme::Red,
    ];

    pub fn accent(&self) -> &'static str {
        match self {
            Theme::Blue => "#007acc",
            Theme::Green => "#4ec9b0",
            Theme::Orange => "#e6b450",
            Theme::Purple => "#c586c0",
            Theme::Red => "#f44747",
        }
    }
}
impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(s) || t.accent().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown theme {}", s))
    }
}
