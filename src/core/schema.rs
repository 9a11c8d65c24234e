//! SQLite layout for the single-slot content register.
//!
//! The layout version lives in `PRAGMA user_version`. A file written by a
//! newer build is refused rather than reinterpreted, and so is an unstamped
//! file whose `content_store` table has different columns.

use rusqlite::{params, Connection, OptionalExtension};

use super::error::StoreError;

/// Key of the one and only content record
pub const RECORD_ID: i64 = 1;

/// Layout version this build writes and understands
pub const SCHEMA_VERSION: u32 = 1;

const CREATE_SQL: &str = "CREATE TABLE IF NOT EXISTS content_store (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    content_text TEXT NOT NULL
);";

/// Create the register table if needed and stamp the layout version.
pub fn apply_schema(conn: &mut Connection) -> Result<(), StoreError> {
    let version = user_version(conn)?;

    if version > SCHEMA_VERSION {
        return Err(StoreError::unavailable(format!(
            "database schema version {} is newer than supported {}",
            version, SCHEMA_VERSION
        )));
    }

    if version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_SQL)?;
    check_layout(&tx)?;
    tx.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))?;
    tx.commit()?;

    Ok(())
}

/// Refuse a pre-existing register table that lacks the expected columns
fn check_layout(conn: &Connection) -> Result<(), StoreError> {
    conn.prepare("SELECT id, content_text FROM content_store LIMIT 0")
        .map(|_| ())
        .map_err(|err| {
            StoreError::unavailable(format!(
                "content_store table has an unsupported layout: {}",
                err
            ))
        })
}

/// Read the layout version recorded in the database file
pub fn user_version(conn: &Connection) -> Result<u32, StoreError> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Read the record text, `None` if the register was never written
pub fn read_record(conn: &Connection) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT content_text FROM content_store WHERE id = ?1",
        params![RECORD_ID],
        |row| row.get::<_, String>(0),
    )
    .optional()
}

/// Insert the record only if the register is empty. Returns whether a row was written.
pub fn insert_if_absent(conn: &Connection, text: &str) -> Result<bool, rusqlite::Error> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO content_store (id, content_text) VALUES (?1, ?2)",
        params![RECORD_ID, text],
    )?;
    Ok(inserted > 0)
}

/// Replace the record text, creating the row if it does not exist yet
pub fn write_record(conn: &Connection, text: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO content_store (id, content_text) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET content_text = excluded.content_text",
        params![RECORD_ID, text],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_schema(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_schema_stamps_version() {
        let conn = fresh();
        assert_eq!(user_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_apply_schema_twice_is_noop() {
        let mut conn = fresh();
        write_record(&conn, "kept").unwrap();
        apply_schema(&mut conn).unwrap();
        assert_eq!(read_record(&conn).unwrap(), Some("kept".to_string()));
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();

        let err = apply_schema(&mut conn).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn test_unstamped_table_with_other_columns_is_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE content_store (id INTEGER PRIMARY KEY, contentText TEXT);
             INSERT INTO content_store (id, contentText) VALUES (1, 'legacy');",
        )
        .unwrap();

        let err = apply_schema(&mut conn).unwrap_err();
        assert!(err.to_string().contains("unsupported layout"));

        // Nothing was stamped, so the file is left as it was found.
        assert_eq!(user_version(&conn).unwrap(), 0);
    }

    #[test]
    fn test_unstamped_table_with_matching_columns_is_adopted() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE content_store (id INTEGER PRIMARY KEY, content_text TEXT NOT NULL);
             INSERT INTO content_store (id, content_text) VALUES (1, 'kept');",
        )
        .unwrap();

        apply_schema(&mut conn).unwrap();
        assert_eq!(user_version(&conn).unwrap(), SCHEMA_VERSION);
        assert_eq!(read_record(&conn).unwrap(), Some("kept".to_string()));
    }

    #[test]
    fn test_insert_if_absent_keeps_existing() {
        let conn = fresh();
        assert!(insert_if_absent(&conn, "first").unwrap());
        assert!(!insert_if_absent(&conn, "second").unwrap());
        assert_eq!(read_record(&conn).unwrap(), Some("first".to_string()));
    }

    #[test]
    fn test_register_rejects_second_key() {
        let conn = fresh();
        let err = conn.execute(
            "INSERT INTO content_store (id, content_text) VALUES (2, 'x')",
            [],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_read_empty_register() {
        let conn = fresh();
        assert_eq!(read_record(&conn).unwrap(), None);
    }
}
