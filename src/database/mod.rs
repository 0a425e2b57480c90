pub mod schema;

use crate::error::AppError;
use crate::filesystem::ensure_parent_dir;
use rusqlite::Connection;
use std::path::Path;

/// Opens (and if needed creates) the journal database with its schema
pub fn init_database(db_path: &Path) -> Result<Connection, AppError> {
    // Sicherstellen dass das Verzeichnis existiert
    ensure_parent_dir(db_path)?;

    let conn = Connection::open(db_path)?;
    schema::init_schema(&conn)?;

    Ok(conn)
}
