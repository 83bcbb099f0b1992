use crate::domain::locale::Locale;
use serde::Serialize;

pub const NATIONAL_DIGITS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedPhone {
    pub national: String,
    pub e164: String,
}

/// Canonicalizes a free-form phone value into its 10-digit national form and
/// an international form.
///
/// Only the digits of `raw` are considered. Inputs with a country-code prefix
/// or a trunk `0` are accepted; any other input longer than 10 digits keeps
/// its last 10 digits as the national number. Inputs shorter than 10 digits
/// are rejected.
pub fn normalize_phone(raw: &str, locale: &Locale) -> Option<NormalizedPhone> {
    let digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.len() < NATIONAL_DIGITS {
        return None;
    }

    let country_code = locale.country_code.trim();
    let national = digits[digits.len() - NATIONAL_DIGITS..].to_string();

    let e164 = if digits.len() == NATIONAL_DIGITS {
        format!("+{country_code}{national}")
    } else if digits.len() == NATIONAL_DIGITS + country_code.len()
        && digits.starts_with(country_code)
    {
        format!("+{digits}")
    } else if digits.len() == NATIONAL_DIGITS + 1 && digits.starts_with('0') {
        format!("+{country_code}{national}")
    } else {
        format!("+{digits}")
    };

    Some(NormalizedPhone { national, e164 })
}

#[cfg(test)]
mod tests {
    use super::{normalize_phone, NormalizedPhone};
    use crate::domain::locale::Locale;

    fn normalize(raw: &str) -> Option<NormalizedPhone> {
        normalize_phone(raw, &Locale::default())
    }

    #[test]
    fn ten_digits_get_country_code() {
        for raw in ["9876543210", "0000000000", "1234567890"] {
            let phone = normalize(raw).unwrap();
            assert_eq!(phone.national, raw);
            assert_eq!(phone.e164, format!("+91{raw}"));
        }
    }

    #[test]
    fn formatting_is_stripped() {
        let phone = normalize("  (987) 654-3210 ").unwrap();
        assert_eq!(phone.national, "9876543210");
        assert_eq!(phone.e164, "+919876543210");
    }

    #[test]
    fn country_prefixed_twelve_digits_keep_all_digits() {
        let phone = normalize("+91 98765 43210").unwrap();
        assert_eq!(phone.national, "9876543210");
        assert_eq!(phone.e164, "+919876543210");

        let phone = normalize("911234567890").unwrap();
        assert_eq!(phone.national, "1234567890");
        assert_eq!(phone.e164, "+911234567890");
    }

    #[test]
    fn trunk_zero_is_replaced_by_country_code() {
        let phone = normalize("09876543210").unwrap();
        assert_eq!(phone.national, "9876543210");
        assert_eq!(phone.e164, "+919876543210");
    }

    #[test]
    fn longer_numbers_fall_back_to_last_ten_digits() {
        let phone = normalize("+44 20 7946 0958 12").unwrap();
        assert_eq!(phone.national, "7946095812");
        assert_eq!(phone.e164, "+44207946095812");

        let phone = normalize("001 415 555 1212").unwrap();
        assert_eq!(phone.national, "4155551212");
        assert_eq!(phone.e164, "+0014155551212");
    }

    #[test]
    fn short_or_empty_inputs_are_rejected() {
        assert!(normalize("").is_none());
        assert!(normalize("n/a").is_none());
        assert!(normalize("12345").is_none());
        assert!(normalize("900000000").is_none());
    }

    #[test]
    fn alternate_country_code_is_respected() {
        let locale = Locale {
            country_code: "1".to_string(),
            ..Locale::default()
        };
        let phone = normalize_phone("14155551212", &locale).unwrap();
        assert_eq!(phone.national, "4155551212");
        assert_eq!(phone.e164, "+14155551212");

        let phone = normalize_phone("4155551212", &locale).unwrap();
        assert_eq!(phone.e164, "+14155551212");
    }
}
