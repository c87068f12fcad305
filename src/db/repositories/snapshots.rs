use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::{
    db::{
        helpers::{parse_date, parse_datetime},
        models::SnapshotRecord,
        Database,
    },
    models::MealPeriod,
};

fn parse_meal(value: &str) -> Result<MealPeriod> {
    match value {
        "Breakfast" => Ok(MealPeriod::Breakfast),
        "Lunch" => Ok(MealPeriod::Lunch),
        "Dinner" => Ok(MealPeriod::Dinner),
        "Closed" => Ok(MealPeriod::Closed),
        other => Err(anyhow!("unknown meal period {other}")),
    }
}

fn row_to_snapshot(row: &Row) -> Result<SnapshotRecord> {
    let date: String = row.get("snapshot_date")?;
    let meal: String = row.get("meal")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(SnapshotRecord {
        key: row.get("key")?,
        date: parse_date(&date, "snapshot_date")?,
        meal: parse_meal(&meal)?,
        payload: row.get("payload")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    pub async fn upsert_snapshot(
        &self,
        key: &str,
        date: NaiveDate,
        meal: MealPeriod,
        payload: String,
    ) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO vote_snapshots (key, snapshot_date, meal, payload, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(key) DO UPDATE SET
                     payload = excluded.payload,
                     updated_at = excluded.updated_at",
                params![
                    key,
                    date.format("%Y-%m-%d").to_string(),
                    meal.as_str(),
                    payload,
                    Utc::now().to_rfc3339(),
                ],
            )
            .context("failed to upsert vote snapshot")?;
            Ok(())
        })
        .await
    }

    pub async fn get_snapshot(&self, key: &str) -> Result<Option<SnapshotRecord>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let row = conn
                .query_row(
                    "SELECT key, snapshot_date, meal, payload, updated_at
                     FROM vote_snapshots
                     WHERE key = ?1",
                    params![key],
                    |row| Ok(row_to_snapshot(row)),
                )
                .optional()
                .context("failed to query vote snapshot")?;
            row.transpose()
        })
        .await
    }

    /// Drops snapshots from days before `date`. Returns the number of rows removed.
    pub async fn prune_snapshots_before(&self, date: NaiveDate) -> Result<usize> {
        self.execute(move |conn| {
            let removed = conn
                .execute(
                    "DELETE FROM vote_snapshots WHERE snapshot_date < ?1",
                    params![date.format("%Y-%m-%d").to_string()],
                )
                .context("failed to prune vote snapshots")?;
            Ok(removed)
        })
        .await
    }
}
