use crate::error::CoreError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNTRY_CODE: &str = "91";
pub const DEFAULT_PRIMARY_CITY: &str = "Pune";
pub const DEFAULT_PRIMARY_STATE: &str = "Maharashtra";
pub const DEFAULT_KNOWN_CITIES: [&str; 10] = [
    "Pune",
    "Mumbai",
    "Nashik",
    "Nagpur",
    "Solapur",
    "Kolhapur",
    "Satara",
    "Ahmednagar",
    "Jalgaon",
    "Thane",
];

/// Country and geography settings used by phone normalization and
/// classification.
///
/// `known_cities` is an ordered gazetteer: when several names occur in the
/// same text, the earliest entry wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub country_code: String,
    pub primary_city: String,
    pub primary_state: String,
    pub known_cities: Vec<String>,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            primary_city: DEFAULT_PRIMARY_CITY.to_string(),
            primary_state: DEFAULT_PRIMARY_STATE.to_string(),
            known_cities: DEFAULT_KNOWN_CITIES
                .iter()
                .map(|city| city.to_string())
                .collect(),
        }
    }
}

impl Locale {
    pub fn validate(&self) -> Result<(), CoreError> {
        let code = self.country_code.trim();
        if code.is_empty() || code.len() > 3 || !code.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(CoreError::InvalidCountryCode(self.country_code.clone()));
        }
        if self.primary_city.trim().is_empty() {
            return Err(CoreError::EmptyLocaleField("primary_city"));
        }
        if self.primary_state.trim().is_empty() {
            return Err(CoreError::EmptyLocaleField("primary_state"));
        }
        if self.known_cities.iter().any(|city| city.trim().is_empty()) {
            return Err(CoreError::EmptyLocaleField("known_cities"));
        }
        Ok(())
    }
}
