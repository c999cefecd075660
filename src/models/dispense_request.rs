//! Dispense request model
//!
//! A medicine handed to a subject during a clinic visit. Rows come from
//! free-form intake, so every descriptive field is optional.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Storage format for visit timestamps (local time, no offset)
pub const VISIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispenseRequest {
    pub id: i64,
    pub medicine: Option<String>,
    pub complaint: Option<String>,
    pub gender: Option<String>,
    pub date_visit: String,
}

/// Data for recording a new dispense request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispenseRequestCreate {
    pub medicine: Option<String>,
    pub complaint: Option<String>,
    pub gender: Option<String>,
    pub date_visit: Option<NaiveDateTime>,
}

impl DispenseRequest {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            medicine: row.get("medicine")?,
            complaint: row.get("complaint")?,
            gender: row.get("gender")?,
            date_visit: row.get("date_visit")?,
        })
    }

    /// Record a dispense request; the visit defaults to now
    pub fn create(conn: &Connection, data: &DispenseRequestCreate) -> DbResult<Self> {
        let date_visit = data
            .date_visit
            .unwrap_or_else(|| chrono::Local::now().naive_local())
            .format(VISIT_TIMESTAMP_FORMAT)
            .to_string();

        conn.execute(
            r#"
            INSERT INTO medicine_requests (medicine, complaint, gender, date_visit)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![data.medicine, data.complaint, data.gender, date_visit],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM medicine_requests WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(request) => Ok(Some(request)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List requests whose visit falls in the closed interval `[start, end]`.
    ///
    /// Rows come back in insertion order, which is the encounter order the
    /// aggregator uses to break count ties.
    pub fn list_by_visit_range(
        conn: &Connection,
        start: &NaiveDateTime,
        end: &NaiveDateTime,
    ) -> DbResult<Vec<Self>> {
        let start = start.format(VISIT_TIMESTAMP_FORMAT).to_string();
        let end = end.format(VISIT_TIMESTAMP_FORMAT).to_string();

        let mut stmt = conn.prepare(
            "SELECT * FROM medicine_requests WHERE date_visit >= ?1 AND date_visit <= ?2 ORDER BY id",
        )?;
        let requests = stmt
            .query_map(params![start, end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(requests)
    }
}
