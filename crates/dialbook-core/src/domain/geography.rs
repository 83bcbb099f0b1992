use crate::domain::contact::GeographyBucket;
use crate::domain::locale::Locale;

/// Lower-cases `value` and collapses runs of whitespace into single spaces.
pub fn normalize_text(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Splits a free-text area such as `"Maharashtra, India"` on its first comma
/// into a state and a country.
pub fn extract_state_country(belong_area: Option<&str>) -> (Option<String>, Option<String>) {
    let normalized = normalize_text(belong_area);
    if normalized.is_empty() {
        return (None, None);
    }

    let mut parts = normalized.splitn(2, ',');
    let state = parts.next().and_then(non_empty_segment);
    let country = parts.next().and_then(non_empty_segment);
    (state, country)
}

/// Returns the first gazetteer city, in gazetteer order, that appears anywhere
/// in the combined address, location, and area text.
pub fn extract_city(
    address: Option<&str>,
    result_loc: Option<&str>,
    belong_area: Option<&str>,
    locale: &Locale,
) -> Option<String> {
    let text = [
        normalize_text(address),
        normalize_text(result_loc),
        normalize_text(belong_area),
    ]
    .join(" ");

    locale
        .known_cities
        .iter()
        .find(|city| {
            let needle = normalize_text(Some(city));
            !needle.is_empty() && text.contains(&needle)
        })
        .map(|city| city.trim().to_string())
}

/// Assigns a geography bucket. The primary city wins over the primary state,
/// which wins over everything else.
pub fn classify(
    city: Option<&str>,
    state: Option<&str>,
    locale: &Locale,
) -> (bool, GeographyBucket) {
    let primary_city = normalize_text(Some(&locale.primary_city));
    if city.is_some_and(|city| normalize_text(Some(city)) == primary_city) {
        return (true, GeographyBucket::Pune);
    }

    let primary_state = normalize_text(Some(&locale.primary_state));
    if state.is_some_and(|state| normalize_text(Some(state)) == primary_state) {
        return (false, GeographyBucket::MaharashtraOther);
    }

    (false, GeographyBucket::OtherState)
}

fn non_empty_segment(segment: &str) -> Option<String> {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
