use crate::error::{Result, StoreError};
use rusqlite::Connection;

const CONTACTS_SQL: &str = include_str!("../sql/contacts.sql");

/// Creates the `contacts` table and its indexes when missing, then checks
/// that `phone` carries the unique index the upsert conflicts on.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CONTACTS_SQL)?;
    if !phone_is_unique(conn)? {
        return Err(StoreError::Schema(
            "contacts.phone has no unique index; the table predates this tool".to_string(),
        ));
    }
    Ok(())
}

/// True when some unique index on `contacts` covers exactly the `phone` column.
pub fn phone_is_unique(conn: &Connection) -> Result<bool> {
    let mut indexes = conn.prepare("SELECT name, \"unique\" FROM pragma_index_list('contacts')")?;
    let unique: Vec<String> = indexes
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .filter_map(|entry| match entry {
            Ok((name, 1)) => Some(Ok(name)),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
        .collect::<rusqlite::Result<_>>()?;

    let mut columns = conn.prepare("SELECT name FROM pragma_index_info(?1)")?;
    for index in unique {
        let covered: Vec<Option<String>> = columns
            .query_map([&index], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        if covered == [Some("phone".to_string())] {
            return Ok(true);
        }
    }
    Ok(false)
}
