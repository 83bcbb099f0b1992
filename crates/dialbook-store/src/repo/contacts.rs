use crate::error::{Result, StoreError};
use crate::query::{ContactQuery, CONTACT_COLUMNS};
use dialbook_core::time::{day_window_start, SECONDS_PER_DAY};
use dialbook_core::{classify, merge_into_existing, Contact, ContactRecord, GeographyBucket, Locale};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: GeographyBucket,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub day: String,
    pub count: i64,
}

pub struct ContactsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ContactsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts `record`, or merges it into the contact that already owns its
    /// phone.
    pub fn upsert(
        &self,
        now_utc: i64,
        record: ContactRecord,
        locale: &Locale,
    ) -> Result<UpsertOutcome> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let outcome = upsert_inner(&tx, now_utc, record, locale)?;
            tx.commit()?;
            Ok(outcome)
        } else {
            upsert_inner(self.conn, now_utc, record, locale)
        }
    }

    pub fn get_by_phone(&self, phone: &str) -> Result<Option<Contact>> {
        get_by_phone_inner(self.conn, phone)
    }

    pub fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_by_bucket(&self, bucket: GeographyBucket) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM contacts WHERE geography_bucket = ?1;",
            [bucket.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<Contact>> {
        let compiled = query.to_sql();
        let mut stmt = self.conn.prepare(&compiled.sql)?;
        let mut rows = stmt.query(params_from_iter(compiled.params))?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(contact_from_row(row)?);
        }
        Ok(contacts)
    }

    pub fn list_by_buckets(
        &self,
        buckets: &[GeographyBucket],
        limit: Option<i64>,
    ) -> Result<Vec<Contact>> {
        self.list_contacts(&ContactQuery::in_buckets(buckets).with_limit(limit))
    }

    pub fn list_all(&self) -> Result<Vec<Contact>> {
        self.list_contacts(&ContactQuery::all())
    }

    /// Contact count per geography bucket, including empty buckets.
    pub fn distribution(&self) -> Result<Vec<BucketCount>> {
        GeographyBucket::ALL
            .into_iter()
            .map(|bucket| {
                Ok(BucketCount {
                    bucket,
                    count: self.count_by_bucket(bucket)?,
                })
            })
            .collect()
    }

    /// Contacts first added on each UTC day of the last `days` days. Days
    /// without additions are omitted.
    pub fn daily_added(&self, now_utc: i64, days: i64) -> Result<Vec<DailyCount>> {
        let start = day_window_start(now_utc, days);
        let end = start + days.max(1) * SECONDS_PER_DAY;
        let mut stmt = self.conn.prepare(
            "SELECT date(created_at, 'unixepoch') AS day, COUNT(*)
             FROM contacts
             WHERE created_at >= ?1 AND created_at < ?2
             GROUP BY day
             ORDER BY day ASC;",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            Ok(DailyCount {
                day: row.get(0)?,
                count: row.get(1)?,
            })
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }
}

pub(crate) fn upsert_inner(
    conn: &Connection,
    now_utc: i64,
    incoming: ContactRecord,
    locale: &Locale,
) -> Result<UpsertOutcome> {
    incoming.validate()?;

    let (record, outcome) = match get_by_phone_inner(conn, &incoming.phone)? {
        Some(existing) => (
            merge_into_existing(&existing, incoming, locale),
            UpsertOutcome::Updated,
        ),
        None => {
            let mut record = incoming;
            let (_, bucket) = classify(record.city.as_deref(), record.state.as_deref(), locale);
            record.geography_bucket = bucket;
            (record, UpsertOutcome::Inserted)
        }
    };

    let other = serde_json::to_string(&record.other).map_err(|source| StoreError::InvalidJson {
        phone: record.phone.clone(),
        source,
    })?;

    conn.execute(
        "INSERT INTO contacts (phone, raw_phone, e164_phone, name, address, location_text, city, state, country, geography_bucket, other, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
         ON CONFLICT(phone) DO UPDATE SET
            raw_phone = excluded.raw_phone,
            e164_phone = excluded.e164_phone,
            name = excluded.name,
            address = excluded.address,
            location_text = excluded.location_text,
            city = excluded.city,
            state = excluded.state,
            country = excluded.country,
            geography_bucket = excluded.geography_bucket,
            other = excluded.other,
            updated_at = excluded.updated_at;",
        params![
            record.phone,
            record.raw_phone,
            record.e164_phone,
            record.name,
            record.address,
            record.location_text,
            record.city,
            record.state,
            record.country,
            record.geography_bucket.as_str(),
            other,
            now_utc,
        ],
    )?;

    Ok(outcome)
}

fn get_by_phone_inner(conn: &Connection, phone: &str) -> Result<Option<Contact>> {
    let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE phone = ?1;");
    let mut stmt = conn.prepare(&sql)?;
    let raw = stmt
        .query_row([phone], raw_contact_from_row)
        .optional()?;
    raw.map(RawContact::into_contact).transpose()
}

fn contact_from_row(row: &rusqlite::Row<'_>) -> Result<Contact> {
    raw_contact_from_row(row)?.into_contact()
}

struct RawContact {
    contact: Contact,
    bucket: String,
    other: String,
}

impl RawContact {
    fn into_contact(self) -> Result<Contact> {
        let mut contact = self.contact;
        contact.geography_bucket = GeographyBucket::from_str(&self.bucket)?;
        contact.other =
            serde_json::from_str(&self.other).map_err(|source| StoreError::InvalidJson {
                phone: contact.phone.clone(),
                source,
            })?;
        Ok(contact)
    }
}

fn raw_contact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawContact> {
    Ok(RawContact {
        contact: Contact {
            id: row.get(0)?,
            phone: row.get(1)?,
            raw_phone: row.get(2)?,
            e164_phone: row.get(3)?,
            name: row.get(4)?,
            address: row.get(5)?,
            location_text: row.get(6)?,
            city: row.get(7)?,
            state: row.get(8)?,
            country: row.get(9)?,
            geography_bucket: GeographyBucket::OtherState,
            other: Default::default(),
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        },
        bucket: row.get(10)?,
        other: row.get(11)?,
    })
}
