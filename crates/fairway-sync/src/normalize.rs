//! Record normalization
//!
//! Turns one raw [`SheetRow`] into a canonical [`LocationDraft`] or a skip
//! decision. Normalization is a pure function of its inputs: nothing here
//! touches the store, and no malformed value may abort a batch — bad rows
//! become [`RowOutcome::Skipped`] with a reason, bad optional fields become
//! `None`.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::models::{
    Hours, LocationDraft, SourceMetadata, StateCode, MAX_ADDRESS_LEN, MAX_CITY_LEN, MAX_NAME_LEN,
    MAX_PHONE_LEN, MAX_REVIEWS_LINK_LEN, MAX_WEBSITE_LEN, MAX_ZIP_LEN, RATING_RANGE,
};
use crate::row::SheetRow;

/// Per-row normalization outcome.
///
/// Storage failures are a separate class (`errored`, see
/// [`crate::store::StoreError`]); normalization itself only accepts or
/// skips.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(LocationDraft),
    Skipped(SkipReason),
}

/// Why a row was excluded from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Business name or address missing/blank
    MissingField,
    /// Address did not decompose as "<street>, <city>, <state> <zip>"
    InvalidAddress,
    /// State missing or not one of the recognized codes
    UnsupportedState,
    /// The CSV record itself failed to deserialize
    Malformed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingField => write!(f, "missing required field"),
            SkipReason::InvalidAddress => write!(f, "invalid address format"),
            SkipReason::UnsupportedState => write!(f, "unsupported state"),
            SkipReason::Malformed(detail) => write!(f, "malformed row: {}", detail),
        }
    }
}

/// Normalize one raw row.
///
/// `origin` labels the dataset the row came from and `synced_at` is the
/// run's normalization timestamp; both end up in the record's provenance
/// metadata.
pub fn normalize_row(row: &SheetRow, origin: &str, synced_at: DateTime<Utc>) -> RowOutcome {
    // 1. Required fields
    let Some(name) = clean(&row.name) else {
        return RowOutcome::Skipped(SkipReason::MissingField);
    };
    let Some(address) = clean(&row.full_address) else {
        return RowOutcome::Skipped(SkipReason::MissingField);
    };

    // 2. Address decomposition
    let Some(city) = extract_city(&address) else {
        return RowOutcome::Skipped(SkipReason::InvalidAddress);
    };
    let zip_code = extract_zip(&address).unwrap_or_default();

    // 3. State
    let Some(state) = parse_state(row.state.as_deref()) else {
        return RowOutcome::Skipped(SkipReason::UnsupportedState);
    };

    // 4. Numeric coercions
    let rating = row.rating.as_deref().and_then(parse_rating);
    let reviews_count = row.reviews.as_deref().and_then(parse_count);
    let (latitude, longitude) = parse_geo(row.latitude.as_deref(), row.longitude.as_deref());

    // 5. Hours
    let hours = row.working_hours.as_deref().and_then(parse_hours);

    // 6. Provenance metadata
    let metadata = SourceMetadata {
        source: origin.to_string(),
        place_id: clean(&row.place_id),
        google_id: clean(&row.google_id),
        category: clean(&row.category),
        subtypes: split_subtypes(row.subtypes.as_deref()),
        photos_count: row
            .photos_count
            .as_deref()
            .and_then(parse_count)
            .map(i64::from)
            .unwrap_or(0),
        synced_at,
    };

    // 7. Truncation to storage caps
    RowOutcome::Accepted(LocationDraft {
        business_name: capped(name, MAX_NAME_LEN),
        address: capped(address, MAX_ADDRESS_LEN),
        city: capped(city, MAX_CITY_LEN),
        state,
        zip_code: capped(zip_code, MAX_ZIP_LEN),
        phone: clean(&row.phone).map(|p| capped(p, MAX_PHONE_LEN)),
        website: clean(&row.site).map(|w| capped(w, MAX_WEBSITE_LEN)),
        description: clean(&row.description),
        hours,
        membership_info: clean(&row.membership_info),
        rating,
        reviews_count,
        reviews_link: clean(&row.reviews_link).map(|l| capped(l, MAX_REVIEWS_LINK_LEN)),
        latitude,
        longitude,
        metadata,
    })
}

/// Trimmed, non-empty text or nothing.
fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// City from an address shaped "<street>, <city>, <state> <zip>".
///
/// Takes the segment between the first and second comma, then only its
/// first whitespace-delimited token — trailing region text sometimes leaks
/// into the city segment. An address with no comma at all is not an
/// address (usually a description pasted into the wrong column).
fn extract_city(address: &str) -> Option<String> {
    let mut segments = address.splitn(3, ',');
    segments.next();
    let city_segment = segments.next()?;
    Some(
        city_segment
            .trim()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string(),
    )
}

/// First 5-digit (optionally +4) zip anywhere in the address.
fn extract_zip(address: &str) -> Option<String> {
    static ZIP_RE: OnceLock<Regex> = OnceLock::new();
    let re = ZIP_RE
        .get_or_init(|| Regex::new(r"\b\d{5}(?:-\d{4})?\b").expect("zip pattern is valid"));
    re.find(address).map(|m| m.as_str().to_string())
}

/// Uppercase, truncate to two characters, then require a recognized code.
fn parse_state(raw: Option<&str>) -> Option<StateCode> {
    let trimmed = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let code: String = trimmed.to_uppercase().chars().take(2).collect();
    code.parse().ok()
}

/// Rating as a finite decimal clamped to the valid range, or nothing.
fn parse_rating(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(*RATING_RANGE.start(), *RATING_RANGE.end()))
}

/// Non-negative integer count. Spreadsheet exports sometimes render counts
/// as floats ("120.0"), so a whole-valued float is accepted too.
fn parse_count(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return (n >= 0 && n <= i64::from(i32::MAX)).then_some(n as i32);
    }
    let f = trimmed.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(i32::MAX) {
        Some(f as i32)
    } else {
        None
    }
}

/// Coordinate pair, all-or-nothing: a half-coordinate is never stored.
fn parse_geo(lat: Option<&str>, lon: Option<&str>) -> (Option<f64>, Option<f64>) {
    let parse = |v: Option<&str>| {
        v.map(str::trim)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|c| c.is_finite())
    };
    match (parse(lat), parse(lon)) {
        (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
        _ => (None, None),
    }
}

/// Opening hours in either supported shape, else the raw text.
///
/// Supported shapes:
/// - JSON object: `{"Mon": "9-5", "Tue": "9-5"}`
/// - legacy pipe-delimited: `Mon:9-5|Tue:9-5`
fn parse_hours(raw: &str) -> Option<Hours> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('{') {
        if let Ok(map) = serde_json::from_str::<BTreeMap<String, String>>(trimmed) {
            return Some(Hours::Schedule(map));
        }
        return Some(Hours::Raw(trimmed.to_string()));
    }

    if let Some(map) = parse_legacy_hours(trimmed) {
        return Some(Hours::Schedule(map));
    }

    Some(Hours::Raw(trimmed.to_string()))
}

/// Legacy "Mon:9-5|Tue:9-5" shape. Every segment must split into a
/// whitespace-free day key and a non-empty interval, otherwise the text is
/// not the legacy shape (e.g. "Open daily: 9-5" stays opaque).
fn parse_legacy_hours(text: &str) -> Option<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for segment in text.split('|') {
        let (day, interval) = segment.split_once(':')?;
        let day = day.trim();
        let interval = interval.trim();
        if day.is_empty() || interval.is_empty() || day.contains(char::is_whitespace) {
            return None;
        }
        map.insert(day.to_string(), interval.to_string());
    }
    Some(map)
}

/// Comma-separated subtype list, trimmed, empties dropped.
fn split_subtypes(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Cap a string at `max` characters (chopped, never rejected).
pub(crate) fn capped(value: String, max: usize) -> String {
    if value.chars().count() <= max {
        value
    } else {
        value.chars().take(max).collect()
    }
}
