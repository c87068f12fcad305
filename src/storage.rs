//! Local vote snapshots keyed by calendar day and meal period.
//!
//! Snapshots are a convenience for restarting the app mid-meal, not a source of
//! truth: every failure here is logged and treated as "nothing stored".

use chrono::NaiveDate;
use log::{debug, error, warn};

use crate::{
    db::Database,
    models::{MealPeriod, VotesState},
};

pub const STORAGE_KEY: &str = "csbsju-dining-votes";

/// `date` is the local calendar date, not UTC, so evening meals stay under their own day.
pub fn snapshot_key(date: NaiveDate, meal: MealPeriod) -> String {
    format!("{STORAGE_KEY}-{}-{}", date.format("%Y-%m-%d"), meal.as_str())
}

#[derive(Clone)]
pub struct SnapshotStore {
    db: Database,
}

impl SnapshotStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn save(&self, votes: &VotesState, date: NaiveDate, meal: MealPeriod) {
        let key = snapshot_key(date, meal);
        let payload = match serde_json::to_string(votes) {
            Ok(payload) => payload,
            Err(err) => {
                error!("Failed to serialize votes for {key}: {err}");
                return;
            }
        };

        match self.db.upsert_snapshot(&key, date, meal, payload).await {
            Ok(()) => debug!("Saved vote snapshot {key}"),
            Err(err) => error!("Failed to save votes under {key}: {err:?}"),
        }
    }

    pub async fn load(&self, date: NaiveDate, meal: MealPeriod) -> Option<VotesState> {
        let key = snapshot_key(date, meal);
        let record = match self.db.get_snapshot(&key).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(err) => {
                error!("Failed to load votes for {key}: {err:?}");
                return None;
            }
        };

        match serde_json::from_str::<VotesState>(&record.payload) {
            Ok(votes) => Some(votes),
            Err(err) => {
                warn!("Discarding unreadable vote snapshot {key}: {err}");
                None
            }
        }
    }

    pub async fn prune_before(&self, date: NaiveDate) {
        match self.db.prune_snapshots_before(date).await {
            Ok(0) => {}
            Ok(removed) => debug!("Pruned {removed} stale vote snapshots"),
            Err(err) => warn!("Failed to prune vote snapshots: {err:?}"),
        }
    }
}
