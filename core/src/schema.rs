/// SQL schema for the memos table
pub const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS memos (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    category TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_memos_created_at ON memos(created_at);
CREATE INDEX IF NOT EXISTS idx_memos_category ON memos(category);

PRAGMA user_version = 1;
"#;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
pub fn get_schema_version(conn: &rusqlite::Connection) -> Result<i32, rusqlite::Error> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Run migrations to bring database to current schema version
pub fn migrate(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        tracing::debug!("Initializing memos schema");
        conn.execute_batch(SCHEMA_V1)?;
        return Ok(());
    }

    if version == SCHEMA_VERSION {
        Ok(())
    } else {
        // Written by a newer version of this crate
        Err(rusqlite::Error::InvalidQuery)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_migrate_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        // Second run is a no-op
        migrate(&conn).unwrap();
    }

    #[test]
    fn test_migrate_rejects_unknown_version() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", 99).unwrap();

        assert!(migrate(&conn).is_err());
    }
}
