use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::MealPeriod;

/// A stored vote tally for one calendar day and meal period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub key: String,
    pub date: NaiveDate,
    pub meal: MealPeriod,
    /// Serialized `VotesState`; decoded by the caller so a bad payload is just a miss.
    pub payload: String,
    pub updated_at: DateTime<Utc>,
}
