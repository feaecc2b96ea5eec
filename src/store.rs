// Recent Valuations Store - SQLite-backed cache of completed valuations
// Plays the role the web frontend gives localStorage: the last few searches
// survive a restart and can be recalled by plate without re-fetching

use crate::merge::MergedVehicleDetails;
use crate::sources::EstimatedValue;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

// ============================================================================
// SAVED VALUATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct SavedValuation {
    /// Stable row identity
    pub id: String,
    /// Normalized plate (uppercase, no spaces) - the cache key
    pub vrm: String,
    pub mileage: Option<u32>,
    pub details: MergedVehicleDetails,
    pub estimated_value: Option<EstimatedValue>,
    pub saved_at: DateTime<Utc>,
}

impl SavedValuation {
    pub fn new(
        vrm: &str,
        mileage: Option<u32>,
        details: MergedVehicleDetails,
        estimated_value: Option<EstimatedValue>,
    ) -> Self {
        SavedValuation {
            id: uuid::Uuid::new_v4().to_string(),
            vrm: normalize_vrm(vrm),
            mileage,
            details,
            estimated_value,
            saved_at: Utc::now(),
        }
    }
}

/// Cache key form of a plate: uppercase with whitespace removed
pub fn normalize_vrm(vrm: &str) -> String {
    vrm.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

// ============================================================================
// DATABASE SETUP
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS valuations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT UNIQUE NOT NULL,
            vrm TEXT UNIQUE NOT NULL,
            mileage INTEGER,
            details TEXT NOT NULL,
            estimated_value TEXT,
            saved_at TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_valuations_vrm ON valuations(vrm)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_valuations_saved_at ON valuations(saved_at)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// STORE OPERATIONS
// ============================================================================

/// Save a valuation; a repeat search for the same plate replaces the
/// previous entry rather than duplicating it
pub fn save_valuation(conn: &Connection, valuation: &SavedValuation) -> Result<()> {
    let details_json = serde_json::to_string(&valuation.details)?;
    let estimated_json = valuation
        .estimated_value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO valuations (uuid, vrm, mileage, details, estimated_value, saved_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(vrm) DO UPDATE SET
             mileage = excluded.mileage,
             details = excluded.details,
             estimated_value = excluded.estimated_value,
             saved_at = excluded.saved_at",
        params![
            valuation.id,
            valuation.vrm,
            valuation.mileage,
            details_json,
            estimated_json,
            valuation.saved_at.to_rfc3339(),
        ],
    )?;

    Ok(())
}

/// Look up a cached valuation by plate
pub fn get_valuation(conn: &Connection, vrm: &str) -> Result<Option<SavedValuation>> {
    let mut stmt = conn.prepare(
        "SELECT uuid, vrm, mileage, details, estimated_value, saved_at
         FROM valuations
         WHERE vrm = ?1",
    )?;

    let valuation = stmt
        .query_row(params![normalize_vrm(vrm)], row_to_valuation)
        .optional()?;

    Ok(valuation)
}

/// The most recently saved valuations, newest first
pub fn recent_valuations(conn: &Connection, limit: usize) -> Result<Vec<SavedValuation>> {
    let mut stmt = conn.prepare(
        "SELECT uuid, vrm, mileage, details, estimated_value, saved_at
         FROM valuations
         ORDER BY saved_at DESC
         LIMIT ?1",
    )?;

    let valuations = stmt
        .query_map(params![limit as i64], row_to_valuation)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(valuations)
}

/// Remove a cached valuation; returns whether anything was deleted
pub fn delete_valuation(conn: &Connection, vrm: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM valuations WHERE vrm = ?1",
        params![normalize_vrm(vrm)],
    )?;
    Ok(deleted > 0)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM valuations", [], |row| row.get(0))?;
    Ok(count)
}

fn row_to_valuation(row: &rusqlite::Row<'_>) -> rusqlite::Result<SavedValuation> {
    let details_json: String = row.get(3)?;
    let estimated_json: Option<String> = row.get(4)?;
    let saved_at_str: String = row.get(5)?;

    let details = serde_json::from_str(&details_json)
        .map_err(|_| rusqlite::Error::InvalidQuery)?;
    let estimated_value = match estimated_json {
        Some(json) => {
            Some(serde_json::from_str(&json).map_err(|_| rusqlite::Error::InvalidQuery)?)
        }
        None => None,
    };
    let saved_at = DateTime::parse_from_rfc3339(&saved_at_str)
        .map_err(|_| rusqlite::Error::InvalidQuery)?
        .with_timezone(&Utc);

    Ok(SavedValuation {
        id: row.get(0)?,
        vrm: row.get(1)?,
        mileage: row.get(2)?,
        details,
        estimated_value,
        saved_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn bmw_details() -> MergedVehicleDetails {
        MergedVehicleDetails {
            make: "BMW".to_string(),
            model: "335i".to_string(),
            registration_number: "AB12 CDE".to_string(),
            fuel_type: "Petrol".to_string(),
            engine_capacity: Some(2998),
            transmission: "Automatic".to_string(),
            ..Default::default()
        }
    }

    fn bmw_valuation() -> SavedValuation {
        SavedValuation::new(
            "AB12 CDE",
            Some(42000),
            bmw_details(),
            Some(EstimatedValue {
                private: 11500,
                trade: 10200,
                retail: 12900,
            }),
        )
    }

    #[test]
    fn test_normalize_vrm() {
        assert_eq!(normalize_vrm("ab12 cde"), "AB12CDE");
        assert_eq!(normalize_vrm(" AB12CDE "), "AB12CDE");
    }

    #[test]
    fn test_save_and_get_round_trip() {
        let conn = test_conn();
        let valuation = bmw_valuation();
        save_valuation(&conn, &valuation).unwrap();

        let loaded = get_valuation(&conn, "ab12 cde").unwrap().unwrap();
        assert_eq!(loaded.vrm, "AB12CDE");
        assert_eq!(loaded.mileage, Some(42000));
        assert_eq!(loaded.details, bmw_details());
        assert_eq!(loaded.estimated_value.unwrap().retail, 12900);
    }

    #[test]
    fn test_get_missing_plate_returns_none() {
        let conn = test_conn();
        assert!(get_valuation(&conn, "ZZ99 ZZZ").unwrap().is_none());
    }

    #[test]
    fn test_repeat_search_replaces_entry() {
        let conn = test_conn();
        save_valuation(&conn, &bmw_valuation()).unwrap();

        let mut updated = bmw_valuation();
        updated.mileage = Some(45000);
        save_valuation(&conn, &updated).unwrap();

        assert_eq!(verify_count(&conn).unwrap(), 1);
        let loaded = get_valuation(&conn, "AB12CDE").unwrap().unwrap();
        assert_eq!(loaded.mileage, Some(45000));
    }

    #[test]
    fn test_recent_valuations_newest_first() {
        let conn = test_conn();

        let mut older = bmw_valuation();
        older.vrm = "CD34EFG".to_string();
        older.saved_at = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
        save_valuation(&conn, &older).unwrap();

        let mut newer = bmw_valuation();
        newer.saved_at = Utc.with_ymd_and_hms(2026, 2, 20, 9, 0, 0).unwrap();
        save_valuation(&conn, &newer).unwrap();

        let recent = recent_valuations(&conn, 10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].vrm, "AB12CDE");
        assert_eq!(recent[1].vrm, "CD34EFG");
    }

    #[test]
    fn test_recent_valuations_respects_limit() {
        let conn = test_conn();
        for (i, plate) in ["AA11AAA", "BB22BBB", "CC33CCC"].iter().enumerate() {
            let mut valuation = bmw_valuation();
            valuation.vrm = plate.to_string();
            valuation.saved_at = Utc.with_ymd_and_hms(2026, 3, 1 + i as u32, 9, 0, 0).unwrap();
            save_valuation(&conn, &valuation).unwrap();
        }

        let recent = recent_valuations(&conn, 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].vrm, "CC33CCC");
    }

    #[test]
    fn test_delete_valuation() {
        let conn = test_conn();
        save_valuation(&conn, &bmw_valuation()).unwrap();

        assert!(delete_valuation(&conn, "AB12 CDE").unwrap());
        assert!(!delete_valuation(&conn, "AB12 CDE").unwrap());
        assert_eq!(verify_count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_valuation_without_estimate_round_trips() {
        let conn = test_conn();
        let valuation = SavedValuation::new("CD34 EFG", None, bmw_details(), None);
        save_valuation(&conn, &valuation).unwrap();

        let loaded = get_valuation(&conn, "CD34EFG").unwrap().unwrap();
        assert!(loaded.estimated_value.is_none());
        assert!(loaded.mileage.is_none());
    }
}
