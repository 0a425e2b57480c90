use crate::error::AppError;
use chrono::DateTime;
use journal_archive::{EntryStore, GeoPoint, JournalEntry};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTRY_COLUMNS: &str = "id, text, photo_path, timestamp, latitude, longitude";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    let millis: i64 = row.get(3)?;
    let created_at = DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, millis))?;

    Ok(JournalEntry {
        id: Some(row.get(0)?),
        text: row.get(1)?,
        photo_ref: row.get(2)?,
        created_at,
        location: GeoPoint::from_pair(row.get(4)?, row.get(5)?),
    })
}

/// Inserts an entry and returns the new id; `entry.id` is ignored
pub fn insert_entry(conn: &Connection, entry: &JournalEntry) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO entries (text, photo_path, timestamp, latitude, longitude)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            &entry.text,
            &entry.photo_ref,
            entry.created_at.timestamp_millis(),
            entry.location.map(|p| p.latitude),
            entry.location.map(|p| p.longitude),
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Loads a single entry
#[allow(dead_code)]
pub fn get_entry(conn: &Connection, id: i64) -> Result<JournalEntry, AppError> {
    let sql = format!("SELECT {} FROM entries WHERE id = ?1", ENTRY_COLUMNS);
    conn.query_row(&sql, params![id], entry_from_row)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Entry {}", id)))
}

/// Loads all entries, newest first
pub fn list_entries_newest_first(conn: &Connection) -> Result<Vec<JournalEntry>, AppError> {
    let sql = format!(
        "SELECT {} FROM entries ORDER BY timestamp DESC, id DESC",
        ENTRY_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map([], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

/// Deletes every entry, returns how many were removed
pub fn clear_all_entries(conn: &Connection) -> Result<usize, AppError> {
    Ok(conn.execute("DELETE FROM entries", [])?)
}

/// Counts all entries
#[allow(dead_code)]
pub fn count_entries(conn: &Connection) -> Result<i64, AppError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
    Ok(count)
}

/// [`EntryStore`] over the SQLite `entries` table
pub struct SqliteEntryStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteEntryStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl EntryStore for SqliteEntryStore<'_> {
    type Error = AppError;

    fn list_all_newest_first(&self) -> Result<Vec<JournalEntry>, AppError> {
        list_entries_newest_first(self.conn)
    }

    fn insert(&mut self, entry: &JournalEntry) -> Result<i64, AppError> {
        insert_entry(self.conn, entry)
    }

    fn delete_all(&mut self) -> Result<(), AppError> {
        let removed = clear_all_entries(self.conn)?;
        log::debug!("Cleared {} entries", removed);
        Ok(())
    }
}
