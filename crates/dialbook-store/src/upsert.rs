use crate::error::Result;
use crate::repo::contacts::{upsert_inner, UpsertOutcome};
use dialbook_core::{ContactRecord, Locale};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use std::ops::Range;
use tracing::{debug, warn};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkFailure {
    /// Zero-based positions of the chunk within the submitted records.
    pub rows: Range<usize>,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpsertReport {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
    pub failures: Vec<ChunkFailure>,
}

impl UpsertReport {
    pub fn inserted_or_updated(&self) -> usize {
        self.inserted + self.updated
    }

    pub fn absorb(&mut self, other: UpsertReport) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.failed += other.failed;
        self.failures.extend(other.failures);
    }
}

/// Writes records in fixed-size chunks, one transaction per chunk.
///
/// A chunk that fails is rolled back and reported with its row range; chunks
/// committed before it stay committed and the run moves on to the next chunk.
pub struct UpsertEngine<'a> {
    conn: &'a Connection,
    locale: &'a Locale,
    batch_size: usize,
}

impl<'a> UpsertEngine<'a> {
    pub fn new(conn: &'a Connection, locale: &'a Locale) -> Self {
        Self {
            conn,
            locale,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn run(&self, now_utc: i64, records: &[ContactRecord]) -> UpsertReport {
        let mut report = UpsertReport::default();

        for (index, chunk) in records.chunks(self.batch_size).enumerate() {
            let start = index * self.batch_size;
            let rows = start..start + chunk.len();
            match self.apply_chunk(now_utc, chunk) {
                Ok((inserted, updated)) => {
                    debug!(start = rows.start, end = rows.end, inserted, updated, "chunk committed");
                    report.inserted += inserted;
                    report.updated += updated;
                }
                Err(err) => {
                    warn!(start = rows.start, end = rows.end, error = %err, "chunk failed");
                    report.failed += chunk.len();
                    report.failures.push(ChunkFailure {
                        rows,
                        error: err.to_string(),
                    });
                }
            }
        }

        report
    }

    fn apply_chunk(&self, now_utc: i64, chunk: &[ContactRecord]) -> Result<(usize, usize)> {
        // Take the write lock up front: concurrent workers queue here.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut inserted = 0;
        let mut updated = 0;
        for record in chunk {
            match upsert_inner(&tx, now_utc, record.clone(), self.locale)? {
                UpsertOutcome::Inserted => inserted += 1,
                UpsertOutcome::Updated => updated += 1,
            }
        }
        tx.commit()?;
        Ok((inserted, updated))
    }
}
