use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::time::format_countdown;

/// When crowd levels were last cleared and when they will be cleared next.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CrowdResetState {
    pub last_reset: Option<NaiveDateTime>,
    pub next_reset: Option<NaiveDateTime>,
}

impl CrowdResetState {
    pub fn record(&mut self, fired_at: NaiveDateTime, next_at: NaiveDateTime) {
        self.last_reset = Some(fired_at);
        self.next_reset = Some(next_at);
    }

    /// "m:ss" until the next reset, or `None` before the first firing.
    pub fn time_until_reset(&self, now: NaiveDateTime) -> Option<String> {
        self.next_reset.map(|next| format_countdown(now, next))
    }
}
