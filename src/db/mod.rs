//! Database module - SQLite cache for the user profile

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{Gender, User};

/// Single-row profile cache
pub struct ProfileStore {
    conn: Connection,
}

impl ProfileStore {
    /// Open or create the cache file
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("opening profile cache {path}"))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS profile (
                slot INTEGER PRIMARY KEY CHECK (slot = 1),
                id TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                age INTEGER NOT NULL,
                height REAL NOT NULL,
                weight REAL NOT NULL,
                gender TEXT NOT NULL,
                rest_day INTEGER,
                program_start_date TEXT
            )",
            [],
        )?;
        Ok(())
    }

    /// Replace the cached profile
    pub fn save_user(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO profile
                (slot, id, first_name, last_name, age, height, weight, gender, rest_day, program_start_date)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user.id,
                user.first_name,
                user.last_name,
                user.age,
                user.height,
                user.weight,
                gender_code(user.gender),
                user.rest_day,
                user.program_start_date.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Cached profile, if any
    pub fn load_user(&self) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, first_name, last_name, age, height, weight, gender, rest_day, program_start_date
                 FROM profile WHERE slot = 1",
                [],
                |row| {
                    let gender: String = row.get(6)?;
                    let start: Option<String> = row.get(8)?;
                    Ok(User {
                        id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        age: row.get(3)?,
                        height: row.get(4)?,
                        weight: row.get(5)?,
                        gender: Gender::parse(&gender).unwrap_or(Gender::Other),
                        rest_day: row.get(7)?,
                        program_start_date: start.and_then(|s| {
                            DateTime::parse_from_rfc3339(&s)
                                .map(|d| d.with_timezone(&Utc))
                                .ok()
                        }),
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Record the program start returned by the backend
    pub fn set_program_start(&self, start: DateTime<Utc>) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE profile SET program_start_date = ?1 WHERE slot = 1",
            params![start.to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    /// Forget the cached profile
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM profile", [])?;
        Ok(())
    }
}

fn gender_code(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "male",
        Gender::Female => "female",
        Gender::Other => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_user() -> User {
        User {
            id: "user-1".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Lee".to_string(),
            age: 28,
            height: 178.0,
            weight: 81.5,
            gender: Gender::Male,
            rest_day: Some(0),
            program_start_date: None,
        }
    }

    #[test]
    fn test_empty_store() {
        let store = ProfileStore::open_in_memory().unwrap();
        assert!(store.load_user().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let store = ProfileStore::open_in_memory().unwrap();
        let user = sample_user();
        store.save_user(&user).unwrap();
        assert_eq!(store.load_user().unwrap(), Some(user));
    }

    #[test]
    fn test_save_replaces_previous_profile() {
        let store = ProfileStore::open_in_memory().unwrap();
        store.save_user(&sample_user()).unwrap();

        let mut other = sample_user();
        other.id = "user-2".to_string();
        other.first_name = "Kim".to_string();
        store.save_user(&other).unwrap();

        let loaded = store.load_user().unwrap().unwrap();
        assert_eq!(loaded.id, "user-2");
        assert_eq!(loaded.first_name, "Kim");
    }

    #[test]
    fn test_set_program_start() {
        let store = ProfileStore::open_in_memory().unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 7, 30, 0).unwrap();
        assert!(!store.set_program_start(start).unwrap());

        store.save_user(&sample_user()).unwrap();
        assert!(store.set_program_start(start).unwrap());
        let loaded = store.load_user().unwrap().unwrap();
        assert_eq!(loaded.program_start_date, Some(start));
    }

    #[test]
    fn test_clear() {
        let store = ProfileStore::open_in_memory().unwrap();
        store.save_user(&sample_user()).unwrap();
        store.clear().unwrap();
        assert!(store.load_user().unwrap().is_none());
    }

    #[test]
    fn test_profile_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ppl.db");
        let path = path.to_str().unwrap();

        {
            let store = ProfileStore::open(path).unwrap();
            store.save_user(&sample_user()).unwrap();
        }

        let store = ProfileStore::open(path).unwrap();
        assert_eq!(store.load_user().unwrap(), Some(sample_user()));
    }

    #[test]
    fn test_schema_has_rest_day_column() {
        let store = ProfileStore::open_in_memory().unwrap();
        let columns: Vec<String> = store
            .conn
            .prepare("PRAGMA table_info(profile)")
            .unwrap()
            .query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert!(columns.iter().any(|c| c == "rest_day"));

        // Re-running the schema on an existing table is a no-op
        store.init_schema().unwrap();
        let mut user = sample_user();
        user.rest_day = None;
        store.save_user(&user).unwrap();
        assert_eq!(store.load_user().unwrap().unwrap().rest_day, None);
    }
}
