use crate::error::Result;
use dialbook_core::{Contact, ContactRecord, OtherFields};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RECORD_HEADERS: [&str; 11] = [
    "phone",
    "raw_phone",
    "e164_phone",
    "name",
    "address",
    "location_text",
    "city",
    "state",
    "country",
    "geography_bucket",
    "other",
];

const CONTACT_HEADERS: [&str; 14] = [
    "id",
    "phone",
    "raw_phone",
    "e164_phone",
    "name",
    "address",
    "location_text",
    "city",
    "state",
    "country",
    "geography_bucket",
    "other",
    "created_at",
    "updated_at",
];

#[derive(Serialize)]
struct RecordRow<'a> {
    phone: &'a str,
    raw_phone: &'a str,
    e164_phone: Option<&'a str>,
    name: Option<&'a str>,
    address: Option<&'a str>,
    location_text: Option<&'a str>,
    city: Option<&'a str>,
    state: Option<&'a str>,
    country: Option<&'a str>,
    geography_bucket: &'static str,
    other: String,
}

#[derive(Serialize)]
struct ContactRow<'a> {
    id: i64,
    phone: &'a str,
    raw_phone: &'a str,
    e164_phone: Option<&'a str>,
    name: Option<&'a str>,
    address: Option<&'a str>,
    location_text: Option<&'a str>,
    city: Option<&'a str>,
    state: Option<&'a str>,
    country: Option<&'a str>,
    geography_bucket: &'static str,
    other: String,
    created_at: i64,
    updated_at: i64,
}

/// Writes normalized records as CSV with `other` encoded as a JSON object.
/// The header row is written even when there are no records.
pub fn write_records<W: Write>(writer: W, records: &[ContactRecord]) -> Result<()> {
    let mut out = headed_writer(writer, &RECORD_HEADERS)?;
    for record in records {
        out.serialize(RecordRow {
            phone: &record.phone,
            raw_phone: &record.raw_phone,
            e164_phone: record.e164_phone.as_deref(),
            name: record.name.as_deref(),
            address: record.address.as_deref(),
            location_text: record.location_text.as_deref(),
            city: record.city.as_deref(),
            state: record.state.as_deref(),
            country: record.country.as_deref(),
            geography_bucket: record.geography_bucket.as_str(),
            other: other_json(&record.other)?,
        })?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_contacts<W: Write>(writer: W, contacts: &[Contact]) -> Result<()> {
    let mut out = headed_writer(writer, &CONTACT_HEADERS)?;
    for contact in contacts {
        out.serialize(ContactRow {
            id: contact.id,
            phone: &contact.phone,
            raw_phone: &contact.raw_phone,
            e164_phone: contact.e164_phone.as_deref(),
            name: contact.name.as_deref(),
            address: contact.address.as_deref(),
            location_text: contact.location_text.as_deref(),
            city: contact.city.as_deref(),
            state: contact.state.as_deref(),
            country: contact.country.as_deref(),
            geography_bucket: contact.geography_bucket.as_str(),
            other: other_json(&contact.other)?,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        })?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_records_file(path: &Path, records: &[ContactRecord]) -> Result<()> {
    write_records(File::create(path)?, records)
}

pub fn write_contacts_file(path: &Path, contacts: &[Contact]) -> Result<()> {
    write_contacts(File::create(path)?, contacts)
}

fn headed_writer<W: Write>(writer: W, headers: &[&str]) -> Result<csv::Writer<W>> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(headers)?;
    Ok(out)
}

fn other_json(other: &OtherFields) -> Result<String> {
    Ok(serde_json::to_string(other)?)
}
