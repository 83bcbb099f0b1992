use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("phone must be exactly 10 digits: {0}")]
    InvalidPhone(String),
    #[error("unknown geography bucket: {0}")]
    InvalidGeographyBucket(String),
    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),
    #[error("locale field cannot be empty: {0}")]
    EmptyLocaleField(&'static str),
}
