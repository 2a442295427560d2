//! Domain models for the location store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// Storage caps (column limits; longer values are truncated, never rejected)
// ============================================================================

pub const MAX_NAME_LEN: usize = 500;
pub const MAX_ADDRESS_LEN: usize = 500;
pub const MAX_CITY_LEN: usize = 200;
pub const MAX_ZIP_LEN: usize = 10;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_WEBSITE_LEN: usize = 500;
pub const MAX_SLUG_LEN: usize = 500;
pub const MAX_REVIEWS_LINK_LEN: usize = 1000;

/// Valid rating range (inclusive).
pub const RATING_RANGE: std::ops::RangeInclusive<f64> = 0.0..=5.0;

/// Recognized region codes. Rows from anywhere else are excluded from the
/// store rather than coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "state_code", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum StateCode {
    Or,
    Wa,
    Ca,
    Id,
}

impl StateCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateCode::Or => "OR",
            StateCode::Wa => "WA",
            StateCode::Ca => "CA",
            StateCode::Id => "ID",
        }
    }
}

impl std::fmt::Display for StateCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StateCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OR" => Ok(StateCode::Or),
            "WA" => Ok(StateCode::Wa),
            "CA" => Ok(StateCode::Ca),
            "ID" => Ok(StateCode::Id),
            _ => Err(anyhow::anyhow!("Unrecognized state code: {}", s)),
        }
    }
}

/// Opening hours.
///
/// The source feed has carried several shapes over time; the store keeps
/// either a parsed day -> interval map or, when the text matches neither
/// supported shape, the raw string as an opaque fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Hours {
    Schedule(BTreeMap<String, String>),
    Raw(String),
}

/// Provenance recorded alongside every synced record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Where the row came from ("google_sheet" or "csv_file")
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtypes: Vec<String>,
    #[serde(default)]
    pub photos_count: i64,
    /// Normalization timestamp of the run that produced this record
    pub synced_at: DateTime<Utc>,
}

/// A normalized, not-yet-persisted candidate record.
///
/// Produced by [`crate::normalize::normalize_row`]; identity (`id`,
/// timestamps) and the slug key are assigned downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDraft {
    pub business_name: String,
    pub address: String,
    pub city: String,
    pub state: StateCode,
    pub zip_code: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub hours: Option<Hours>,
    pub membership_info: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: Option<i32>,
    pub reviews_link: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub metadata: SourceMetadata,
}

impl LocationDraft {
    /// Geo must be both-or-neither; the normalizer never emits a
    /// half-coordinate.
    pub fn has_geo(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// A stored location (maps to the `locations` table).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Location {
    pub id: Uuid,
    pub business_name: String,
    pub address: String,
    pub city: String,
    pub state: StateCode,
    pub zip_code: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub hours: Option<Json<Hours>>,
    pub membership_info: Option<String>,
    pub slug: String,
    pub rating: Option<f64>,
    pub reviews_count: Option<i32>,
    pub reviews_link: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub metadata: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_code_from_str() {
        assert_eq!("OR".parse::<StateCode>().unwrap(), StateCode::Or);
        assert_eq!("WA".parse::<StateCode>().unwrap(), StateCode::Wa);
        assert_eq!("CA".parse::<StateCode>().unwrap(), StateCode::Ca);
        assert_eq!("ID".parse::<StateCode>().unwrap(), StateCode::Id);
        assert!("ZZ".parse::<StateCode>().is_err());
        // Strict: normalization (case, truncation) happens upstream.
        assert!("or".parse::<StateCode>().is_err());
    }

    #[test]
    fn test_state_code_display_roundtrip() {
        for state in [StateCode::Or, StateCode::Wa, StateCode::Ca, StateCode::Id] {
            assert_eq!(state.to_string().parse::<StateCode>().unwrap(), state);
        }
    }

    #[test]
    fn test_hours_serialization_shapes() {
        let schedule = Hours::Schedule(BTreeMap::from([
            ("Mon".to_string(), "9-5".to_string()),
            ("Tue".to_string(), "9-5".to_string()),
        ]));
        let value = serde_json::to_value(&schedule).unwrap();
        assert!(value.is_object());

        let raw = Hours::Raw("by appointment".to_string());
        let value = serde_json::to_value(&raw).unwrap();
        assert!(value.is_string());
    }

    #[test]
    fn test_hours_untagged_deserialization() {
        let schedule: Hours = serde_json::from_str(r#"{"Mon":"9-5"}"#).unwrap();
        assert!(matches!(schedule, Hours::Schedule(_)));

        let raw: Hours = serde_json::from_str(r#""call ahead""#).unwrap();
        assert_eq!(raw, Hours::Raw("call ahead".to_string()));
    }
}
