use crate::mapping::{CanonicalField, ColumnMapping};
use crate::table::{RowView, SourceTable};
use dialbook_core::{
    classify, extract_city, extract_state_country, normalize_phone, ContactRecord, Locale,
    OtherFields,
};
use serde::Serialize;
use std::fmt;

const FALLBACK_PHONE_MIN_CHARS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RejectReason {
    MissingPhone,
    InvalidPhone(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingPhone => f.write_str("no phone value"),
            RejectReason::InvalidPhone(raw) => write!(f, "phone cannot be normalized: {raw}"),
        }
    }
}

/// A source row that produced no record, with every original cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub line: u64,
    pub reason: RejectReason,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct BuiltTable {
    pub records: Vec<ContactRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// First cell, in column order, that contains a digit and is at least six
/// characters long.
pub fn fallback_phone<'a>(row: &RowView<'a>) -> Option<&'a str> {
    row.fields().map(|(_, cell)| cell).find(|cell| {
        cell.chars().any(|ch| ch.is_ascii_digit())
            && cell.chars().count() >= FALLBACK_PHONE_MIN_CHARS
    })
}

pub fn build_record(
    row: &RowView<'_>,
    mapping: &ColumnMapping,
    locale: &Locale,
) -> Result<ContactRecord, RejectReason> {
    let cell = |field: CanonicalField| mapping.get(field).and_then(|header| row.get(header));

    // A bound phone column is authoritative even when blank.
    let raw_phone = match mapping.get(CanonicalField::Phone) {
        Some(header) => row.get(header).filter(|value| !value.trim().is_empty()),
        None => fallback_phone(row),
    }
    .ok_or(RejectReason::MissingPhone)?;

    let phone = normalize_phone(raw_phone, locale)
        .ok_or_else(|| RejectReason::InvalidPhone(raw_phone.to_string()))?;

    let address = cell(CanonicalField::Address);
    let location = cell(CanonicalField::Location);
    let area = cell(CanonicalField::State);

    let city = match non_blank(cell(CanonicalField::City)) {
        Some(value) => extract_city(Some(value.as_str()), None, None, locale).or(Some(value)),
        None => extract_city(address, location, area, locale),
    };
    let (state, country) = extract_state_country(area);
    let (_, geography_bucket) = classify(city.as_deref(), state.as_deref(), locale);

    let mut other = OtherFields::new();
    for (header, value) in row.fields() {
        if mapping.is_bound(header) || value.trim().is_empty() {
            continue;
        }
        other.insert(header.to_string(), value.into());
    }

    Ok(ContactRecord {
        phone: phone.national,
        raw_phone: raw_phone.to_string(),
        e164_phone: Some(phone.e164),
        name: non_blank(cell(CanonicalField::Name)),
        address: non_blank(address),
        location_text: non_blank(location),
        city,
        state,
        country,
        geography_bucket,
        other,
    })
}

/// Splits a table into normalized records and rejected rows, preserving row
/// order in both.
pub fn build_table(table: &SourceTable, mapping: &ColumnMapping, locale: &Locale) -> BuiltTable {
    let mut built = BuiltTable::default();
    for row in table.views() {
        match build_record(&row, mapping, locale) {
            Ok(record) => built.records.push(record),
            Err(reason) => built.rejected.push(RejectedRow {
                line: row.line(),
                reason,
                fields: row
                    .fields()
                    .map(|(header, value)| (header.to_string(), value.to_string()))
                    .collect(),
            }),
        }
    }
    built
}

fn non_blank(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
