use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Light or dark colour preference, persisted separately from tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// The literal stored in the theme entry
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Best-effort system preference from the terminal's `COLORFGBG`
    /// variable (`"fg;bg"`); a white background (7 or 15) means light.
    pub fn from_colorfgbg(value: &str) -> Option<Theme> {
        let bg = value.rsplit(';').next()?.trim().parse::<u8>().ok()?;
        match bg {
            7 | 15 => Some(Theme::Light),
            0..=6 | 8 => Some(Theme::Dark),
            _ => None,
        }
    }

    /// Read the system preference signal from the environment, if any
    pub fn system_preference() -> Option<Theme> {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|v| Theme::from_colorfgbg(&v))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("invalid theme: {} (expected light or dark)", other)),
        }
    }
}
