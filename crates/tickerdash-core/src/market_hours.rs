//! Trading-hours window.
//!
//! The auto-updater only refreshes while the market is open when the
//! trading-hours gate is enabled. The window is a fixed wall-clock range in
//! the local timezone, Monday through Friday by default. Exchange holidays
//! are not modelled.

use chrono::{DateTime, Datelike, Local, NaiveTime, TimeZone, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Market-open window in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketHours {
    /// Opening time (inclusive).
    #[serde(default = "default_open")]
    pub open: NaiveTime,
    /// Closing time (exclusive).
    #[serde(default = "default_close")]
    pub close: NaiveTime,
    /// Treat Saturday and Sunday as closed.
    #[serde(default = "default_weekdays_only")]
    pub weekdays_only: bool,
}

fn default_open() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN)
}

fn default_close() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_weekdays_only() -> bool {
    true
}

impl Default for MarketHours {
    fn default() -> Self {
        Self {
            open: default_open(),
            close: default_close(),
            weekdays_only: default_weekdays_only(),
        }
    }
}

impl MarketHours {
    /// Build a window, rejecting empty or inverted ranges.
    pub fn new(open: NaiveTime, close: NaiveTime, weekdays_only: bool) -> crate::Result<Self> {
        let hours = Self {
            open,
            close,
            weekdays_only,
        };
        hours.validate()?;
        Ok(hours)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.open >= self.close {
            return Err(CoreError::InvalidConfig(format!(
                "market open {} must be before close {}",
                self.open, self.close
            )));
        }
        Ok(())
    }

    /// Check whether the market is open right now (local time).
    #[must_use]
    pub fn is_open_now(&self) -> bool {
        self.is_open_at(&Local::now())
    }

    /// Check whether the market is open at the given instant, evaluated in
    /// the instant's own timezone.
    #[must_use]
    pub fn is_open_at<Tz: TimeZone>(&self, dt: &DateTime<Tz>) -> bool {
        if self.weekdays_only && matches!(dt.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let time = dt.time();
        time >= self.open && time < self.close
    }
}
