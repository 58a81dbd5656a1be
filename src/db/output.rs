use chrono::Utc;
use log::{info, warn};
use rusqlite::Connection;

use crate::engine::OutputSink;

/// Store published outputs in the database
///
/// Publishing is fire-and-forget, so a failed insert is logged and otherwise ignored.
pub struct SqliteSink<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteSink<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteSink { conn }
    }
}

impl OutputSink for SqliteSink<'_> {
    fn publish(&mut self, individual: &str, key: &str, path: &str) {
        info!("Publishing {individual} {key} = {path}");
        let published_at = Utc::now().to_rfc3339();
        if let Err(err) = self.conn.execute(
            "INSERT INTO published_output (individual, key, path, published_at) VALUES (?1, ?2, ?3, ?4)",
            (individual, key, path, published_at),
        ) {
            warn!("Can't publish {key} for {individual}: {err}");
        }
    }
}
