//! SQLite-based habit storage.
//!
//! Provides persistent storage for:
//! - Habits, scoped to an owner account
//! - Completion markers for each habit
//!
//! A habit's markers are always rewritten as a whole inside one transaction,
//! so a toggle either lands completely or not at all.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use super::migrations;
use crate::error::{DatabaseError, Result};
use crate::habit::Habit;

/// Fixed-width RFC 3339 so that string order matches time order in SQL.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(table: &'static str, id: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            DatabaseError::CorruptRow {
                table,
                id: id.to_string(),
                message: format!("invalid timestamp '{raw}': {e}"),
            }
            .into()
        })
}

/// SQLite database for habit storage.
pub struct HabitDb {
    conn: Connection,
}

impl HabitDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/habitline.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("habitline.db"))
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening habit database");
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests and tooling).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Insert a new habit together with any markers it already carries.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including a duplicate id).
    pub fn create_habit(&self, habit: &Habit) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO habits (id, owner_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                habit.id,
                habit.owner_id,
                habit.name,
                format_timestamp(&habit.created_at),
            ],
        )?;
        insert_completions(&tx, habit)?;
        tx.commit()?;
        tracing::info!(habit_id = %habit.id, owner_id = %habit.owner_id, "habit created");
        Ok(())
    }

    /// Fetch a habit and its full completion history.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored timestamp is corrupt.
    pub fn get_habit(&self, id: &str) -> Result<Option<Habit>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, owner_id, name, created_at FROM habits WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row)?)),
            None => Ok(None),
        }
    }

    /// All habits owned by `owner_id`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored timestamp is corrupt.
    pub fn list_habits(&self, owner_id: &str) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, name, created_at FROM habits
             WHERE owner_id = ?1
             ORDER BY created_at, rowid",
        )?;
        let rows = stmt
            .query_map(params![owner_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    /// Delete a habit and its markers. Returns `false` if it did not exist.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn delete_habit(&self, id: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM completions WHERE habit_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        tx.commit()?;
        if deleted > 0 {
            tracing::info!(habit_id = %id, "habit deleted");
        }
        Ok(deleted > 0)
    }

    /// Replace the stored markers of `habit` with its in-memory history.
    ///
    /// # Errors
    /// Returns [`DatabaseError::NotFound`] if the habit is not stored, or an
    /// error if the write fails. Nothing is changed on error.
    pub fn save_completions(&self, habit: &Habit) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let exists = tx
            .query_row(
                "SELECT 1 FROM habits WHERE id = ?1",
                params![habit.id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(DatabaseError::NotFound(habit.id.clone()).into());
        }

        tx.execute(
            "DELETE FROM completions WHERE habit_id = ?1",
            params![habit.id],
        )?;
        insert_completions(&tx, habit)?;
        tx.commit()?;
        tracing::info!(
            habit_id = %habit.id,
            markers = habit.completions.len(),
            "completions saved"
        );
        Ok(())
    }

    fn hydrate(&self, (id, owner_id, name, created_at): (String, String, String, String)) -> Result<Habit> {
        let created_at = parse_timestamp("habits", &id, &created_at)?;
        let completions = self.load_completions(&id)?;
        Ok(Habit {
            id,
            owner_id,
            name,
            created_at,
            completions,
        })
    }

    fn load_completions(&self, habit_id: &str) -> Result<Vec<DateTime<Utc>>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT completed_at FROM completions WHERE habit_id = ?1 ORDER BY id",
        )?;
        let raw = stmt
            .query_map(params![habit_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        raw.iter()
            .map(|s| parse_timestamp("completions", habit_id, s))
            .collect()
    }
}

fn insert_completions(conn: &Connection, habit: &Habit) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO completions (habit_id, completed_at) VALUES (?1, ?2)",
    )?;
    for ts in &habit.completions {
        stmt.execute(params![habit.id, format_timestamp(ts)])?;
    }
    Ok(())
}
