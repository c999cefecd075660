//! Profile model
//!
//! Demographic record of an employee/patient, used for the age distribution.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub name: Option<String>,
    /// Date of birth as stored (YYYY-MM-DD, optionally followed by a time)
    pub dob: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileCreate {
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
}

impl Profile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            dob: row.get("dob")?,
            gender: row.get("gender")?,
        })
    }

    pub fn create(conn: &Connection, data: &ProfileCreate) -> DbResult<Self> {
        let dob = data.dob.map(|d| d.format("%Y-%m-%d").to_string());

        conn.execute(
            "INSERT INTO users (name, dob, gender) VALUES (?1, ?2, ?3)",
            params![data.name, dob, data.gender],
        )?;

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row)?)
    }

    /// List every profile, unfiltered
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users ORDER BY id")?;
        let profiles = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_all_keeps_incomplete_profiles() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::migrations::run_migrations(&conn).unwrap();

        Profile::create(
            &conn,
            &ProfileCreate {
                name: Some("Ana".to_string()),
                dob: NaiveDate::from_ymd_opt(1990, 2, 14),
                gender: Some("Female".to_string()),
            },
        )
        .unwrap();
        Profile::create(&conn, &ProfileCreate::default()).unwrap();

        let all = Profile::list_all(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].dob.as_deref(), Some("1990-02-14"));
        assert_eq!(all[1].dob, None);
        assert_eq!(all[1].gender, None);
    }
}
