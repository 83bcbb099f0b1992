use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Ingest workers each hold a connection and queue on the write lock for
/// up to this long per chunk.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens (creating if needed) the contact database. A newly created file is
/// readable by its owner only.
pub fn open(path: &Path) -> Result<Connection> {
    let created = !path.exists();
    let conn = Connection::open(path)?;
    // WAL keeps `list` and `count` readable while an ingest chunk commits.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    if created {
        owner_only(path)?;
    }
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    Ok(Connection::open_in_memory()?)
}

#[cfg(unix)]
fn owner_only(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn owner_only(_path: &Path) -> Result<()> {
    Ok(())
}
