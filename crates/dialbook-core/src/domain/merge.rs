use crate::domain::contact::{Contact, ContactRecord};
use crate::domain::geography::classify;
use crate::domain::locale::Locale;

/// Folds an incoming record into the stored contact with the same phone.
///
/// Every column takes the incoming value when present and keeps the stored
/// value otherwise, so a blank never erases known data. `other` gains the
/// incoming keys and never loses existing ones. The geography bucket is
/// recomputed from the merged city and state.
pub fn merge_into_existing(
    existing: &Contact,
    incoming: ContactRecord,
    locale: &Locale,
) -> ContactRecord {
    let mut other = existing.other.clone();
    for (key, value) in incoming.other {
        if !value.is_null() {
            other.insert(key, value);
        }
    }

    let city = incoming.city.or_else(|| existing.city.clone());
    let state = incoming.state.or_else(|| existing.state.clone());
    let (_, geography_bucket) = classify(city.as_deref(), state.as_deref(), locale);

    ContactRecord {
        phone: existing.phone.clone(),
        raw_phone: incoming.raw_phone,
        e164_phone: incoming.e164_phone.or_else(|| existing.e164_phone.clone()),
        name: incoming.name.or_else(|| existing.name.clone()),
        address: incoming.address.or_else(|| existing.address.clone()),
        location_text: incoming
            .location_text
            .or_else(|| existing.location_text.clone()),
        city,
        state,
        country: incoming.country.or_else(|| existing.country.clone()),
        geography_bucket,
        other,
    }
}

#[cfg(test)]
mod tests {
    use super::merge_into_existing;
    use crate::domain::contact::{Contact, ContactRecord, GeographyBucket, OtherFields};
    use crate::domain::locale::Locale;
    use serde_json::json;

    fn stored() -> Contact {
        let mut other = OtherFields::new();
        other.insert("Operator".to_string(), json!("Jio"));
        Contact {
            id: 1,
            phone: "9876543210".to_string(),
            raw_phone: "98765 43210".to_string(),
            e164_phone: Some("+919876543210".to_string()),
            name: Some("Asha".to_string()),
            address: Some("FC Road".to_string()),
            location_text: None,
            city: Some("Pune".to_string()),
            state: Some("maharashtra".to_string()),
            country: Some("india".to_string()),
            geography_bucket: GeographyBucket::Pune,
            other,
            created_at: 100,
            updated_at: 100,
        }
    }

    fn incoming() -> ContactRecord {
        ContactRecord {
            phone: "9876543210".to_string(),
            raw_phone: "+91 98765 43210".to_string(),
            e164_phone: Some("+919876543210".to_string()),
            name: None,
            address: None,
            location_text: Some("Kothrud".to_string()),
            city: None,
            state: None,
            country: None,
            geography_bucket: GeographyBucket::OtherState,
            other: OtherFields::new(),
        }
    }

    #[test]
    fn blanks_keep_existing_values() {
        let merged = merge_into_existing(&stored(), incoming(), &Locale::default());
        assert_eq!(merged.name.as_deref(), Some("Asha"));
        assert_eq!(merged.address.as_deref(), Some("FC Road"));
        assert_eq!(merged.location_text.as_deref(), Some("Kothrud"));
        assert_eq!(merged.raw_phone, "+91 98765 43210");
        assert_eq!(merged.geography_bucket, GeographyBucket::Pune);
    }

    #[test]
    fn present_values_replace_existing_values() {
        let mut record = incoming();
        record.name = Some("Asha Patil".to_string());
        record.city = Some("Nagpur".to_string());
        let merged = merge_into_existing(&stored(), record, &Locale::default());
        assert_eq!(merged.name.as_deref(), Some("Asha Patil"));
        assert_eq!(merged.city.as_deref(), Some("Nagpur"));
        assert_eq!(merged.geography_bucket, GeographyBucket::MaharashtraOther);
    }

    #[test]
    fn other_only_gains_keys() {
        let mut record = incoming();
        record.other.insert("Circle".to_string(), json!("MH"));
        record.other.insert("Operator".to_string(), serde_json::Value::Null);
        let merged = merge_into_existing(&stored(), record, &Locale::default());
        assert_eq!(merged.other.get("Operator"), Some(&json!("Jio")));
        assert_eq!(merged.other.get("Circle"), Some(&json!("MH")));
        assert_eq!(merged.other.len(), 2);
    }
}
