pub mod db;
pub mod error;
pub mod paths;
pub mod query;
pub mod repo;
pub mod schema;
pub mod upsert;

use crate::error::Result;
use dialbook_core::Locale;
use rusqlite::Connection;
use std::path::Path;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = db::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn ensure_schema(&self) -> Result<()> {
        schema::ensure_schema(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn contacts(&self) -> repo::ContactsRepo<'_> {
        repo::ContactsRepo::new(&self.conn)
    }

    pub fn upsert_engine<'a>(&'a self, locale: &'a Locale) -> upsert::UpsertEngine<'a> {
        upsert::UpsertEngine::new(&self.conn, locale)
    }
}
