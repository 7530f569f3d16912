//! Persisted theme name.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::{LayoutError, LayoutResult};
use crate::storage::{Storage, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(LayoutError::Storage(format!("unknown theme: {other}"))),
        }
    }
}

/// Stored theme, or the default when absent or unrecognized.
pub fn load_theme(storage: &dyn Storage) -> Theme {
    match storage.get(THEME_KEY) {
        None => Theme::default(),
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring stored theme");
            Theme::default()
        }),
    }
}

pub fn save_theme(storage: &dyn Storage, theme: Theme) -> LayoutResult<()> {
    storage.set(THEME_KEY, &theme.to_string())
}
