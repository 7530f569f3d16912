//! Push channel events.
//!
//! Wire format: `{"event": "<name>", "data": {...}}`. `Connected` and
//! `Disconnected` never arrive on the wire; the connection manager
//! synthesizes them on lifecycle changes.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Job name used by the bot data update.
pub const JOB_BOT_UPDATE: &str = "bot_update";
/// Job name used by the drainer analysis.
pub const JOB_DRAINER: &str = "drainer";

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PushEvent {
    Connected,
    Disconnected {
        reason: String,
    },
    /// A data set on the backend changed; `topic` names it (e.g. `stocks`).
    DataRefresh {
        topic: String,
    },
    UpdateProgress {
        job: String,
        /// Percent complete, 0..=100.
        #[serde(default)]
        progress: f64,
        #[serde(default)]
        message: Option<String>,
    },
    UpdateComplete {
        job: String,
        #[serde(default = "default_success")]
        success: bool,
        #[serde(default)]
        message: Option<String>,
    },
    Error {
        message: String,
    },
}

impl PushEvent {
    /// Decode a text frame. Unknown events and malformed frames yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(text) {
            Ok(event @ (Self::Connected | Self::Disconnected { .. })) => {
                debug!(?event, "Ignoring lifecycle event sent by server");
                None
            }
            Ok(event) => Some(event),
            Err(e) => {
                debug!(error = %e, frame = %truncate(text, 120), "Ignoring unrecognized push frame");
                None
            }
        }
    }

    /// Event name, used as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected { .. } => "disconnected",
            Self::DataRefresh { .. } => "data_refresh",
            Self::UpdateProgress { .. } => "update_progress",
            Self::UpdateComplete { .. } => "update_complete",
            Self::Error { .. } => "error",
        }
    }

    /// Job name for progress/completion events.
    pub fn job(&self) -> Option<&str> {
        match self {
            Self::UpdateProgress { job, .. } | Self::UpdateComplete { job, .. } => Some(job),
            _ => None,
        }
    }

    pub fn is_refresh_of(&self, wanted: &str) -> bool {
        matches!(self, Self::DataRefresh { topic } if topic == wanted)
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
