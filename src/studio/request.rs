//! Single-slot generation request state

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::gemini::GenerationRequest;

/// State of the one generation slot
///
/// `Requesting` is the only state that blocks a new request; the terminal
/// states record how the last request ended.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    Requesting {
        ticket_id: String,
        started_at: DateTime<Utc>,
    },
    Succeeded {
        result_id: String,
    },
    Empty,
    Failed {
        error: String,
    },
}

impl RequestState {
    pub fn is_requesting(&self) -> bool {
        matches!(self, RequestState::Requesting { .. })
    }
}

/// A frozen generation request handed out while the slot is held
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationTicket {
    pub id: String,
    pub request: GenerationRequest,
    /// Selection snapshot for the history entry
    pub assets_used: Vec<String>,
}
