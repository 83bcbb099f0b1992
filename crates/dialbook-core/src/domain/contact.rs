use crate::domain::phone::NATIONAL_DIGITS;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source columns that did not map onto a canonical field, keyed by their
/// original header.
pub type OtherFields = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeographyBucket {
    #[serde(rename = "Pune")]
    Pune,
    #[serde(rename = "Maharashtra_Other")]
    MaharashtraOther,
    #[serde(rename = "Other_State")]
    OtherState,
}

impl GeographyBucket {
    pub const ALL: [GeographyBucket; 3] = [
        GeographyBucket::Pune,
        GeographyBucket::MaharashtraOther,
        GeographyBucket::OtherState,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            GeographyBucket::Pune => "Pune",
            GeographyBucket::MaharashtraOther => "Maharashtra_Other",
            GeographyBucket::OtherState => "Other_State",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        GeographyBucket::ALL
            .into_iter()
            .find(|bucket| bucket.as_str().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for GeographyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for GeographyBucket {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeographyBucket::parse(s).ok_or_else(|| CoreError::InvalidGeographyBucket(s.to_string()))
    }
}

/// A normalized contact as produced from one source row, before it is
/// written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub phone: String,
    pub raw_phone: String,
    pub e164_phone: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub location_text: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub geography_bucket: GeographyBucket,
    pub other: OtherFields,
}

impl ContactRecord {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_national_phone(&self.phone)
    }
}

/// A contact as persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub phone: String,
    pub raw_phone: String,
    pub e164_phone: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub location_text: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub geography_bucket: GeographyBucket,
    pub other: OtherFields,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Contact {
    pub fn to_record(&self) -> ContactRecord {
        ContactRecord {
            phone: self.phone.clone(),
            raw_phone: self.raw_phone.clone(),
            e164_phone: self.e164_phone.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            location_text: self.location_text.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            geography_bucket: self.geography_bucket,
            other: self.other.clone(),
        }
    }
}

pub fn validate_national_phone(phone: &str) -> Result<(), CoreError> {
    if phone.len() != NATIONAL_DIGITS || !phone.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(CoreError::InvalidPhone(phone.to_string()));
    }
    Ok(())
}
