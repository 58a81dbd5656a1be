use std::path::Path;

use log::info;
use rusqlite::Connection;

pub fn open_db(path: &Path) -> rusqlite::Result<Connection> {
    if !path.exists() { info!("Creating new database {}", path.display()) }
    let conn = Connection::open(path)?;
    init(&conn)?;
    Ok(conn)
}

/// Create tables if needed and start the dry run save point
pub fn init(conn: &Connection) -> rusqlite::Result<()> {
    static SCHEMA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/db/schema.sql"));
    conn.execute_batch(SCHEMA)?;

    info!("Creating dry run save point");
    conn.execute("SAVEPOINT dry_run", [])?;
    Ok(())
}

/// Keep everything written since [init], or throw it away on a dry run
pub fn release_or_rollback(conn: &Connection, dry_run: bool) -> rusqlite::Result<()> {
    match dry_run {
        true => {
            info!("--dry-run set, rolling back database state");
            conn.execute("ROLLBACK TO dry_run", [])?;
            conn.execute("RELEASE dry_run", [])?;
        }
        false => {
            info!("--dry-run not set, releasing dry run save point");
            conn.execute("RELEASE dry_run", [])?;
        }
    }
    Ok(())
}
