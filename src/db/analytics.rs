//! Append-only analytics rows.

use super::{Database, now_ms};
use crate::types::{AnalyticsRecord, ProfileId};
use anyhow::Result;
use rusqlite::{Row, params};
use serde_json::Value;

fn parse_record_row(row: &Row) -> rusqlite::Result<AnalyticsRecord> {
    let details: Option<String> = row.get("details")?;
    Ok(AnalyticsRecord {
        id: row.get("id")?,
        user: row.get("user_profile_id")?,
        action: row.get("action")?,
        timestamp: row.get("timestamp")?,
        details: details.and_then(|s| serde_json::from_str(&s).ok()),
    })
}

impl Database {
    /// Append one record. The timestamp is assigned here and never changes.
    pub fn insert_analytics_record(
        &self,
        profile_id: ProfileId,
        action: &str,
        details: Option<&Value>,
    ) -> Result<AnalyticsRecord> {
        let now = now_ms();
        let details_json = details.map(serde_json::to_string).transpose()?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO analytics_records (user_profile_id, action, timestamp, details)
                 VALUES (?1, ?2, ?3, ?4)",
                params![profile_id, action, now, details_json],
            )?;

            Ok(AnalyticsRecord {
                id: conn.last_insert_rowid(),
                user: profile_id,
                action: action.to_string(),
                timestamp: now,
                details: details.cloned(),
            })
        })
    }

    /// Records emitted for a profile, newest first.
    pub fn analytics_for_profile(&self, profile_id: ProfileId) -> Result<Vec<AnalyticsRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM analytics_records WHERE user_profile_id = ?1
                 ORDER BY timestamp DESC, id DESC",
            )?;
            let records = stmt
                .query_map(params![profile_id], parse_record_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }

    /// Records of one action whose details reference a task id.
    pub fn analytics_for_task(&self, action: &str, task_id: i64) -> Result<Vec<AnalyticsRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM analytics_records
                 WHERE action = ?1 AND json_extract(details, '$.task_id') = ?2
                 ORDER BY id",
            )?;
            let records = stmt
                .query_map(params![action, task_id], parse_record_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }
}
