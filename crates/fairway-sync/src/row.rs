//! Inbound row schema
//!
//! The spreadsheet export is CSV-shaped but its column set has drifted over
//! time, so every field is optional and defaulted: a missing column
//! deserializes to `None` instead of failing the row. Coercion and
//! validation happen in [`crate::normalize`]; this type only captures what
//! the source actually said.

use serde::Deserialize;

/// One raw row of the external dataset.
///
/// Field names follow the export's header row. Everything is kept as text;
/// numeric columns frequently arrive malformed ("4.5 stars", "") and are
/// coerced defensively downstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_address: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub working_hours: Option<String>,
    #[serde(default)]
    pub membership_info: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub reviews: Option<String>,
    #[serde(default)]
    pub reviews_link: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default, rename = "type")]
    pub category: Option<String>,
    #[serde(default)]
    pub subtypes: Option<String>,
    #[serde(default)]
    pub photos_count: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub google_id: Option<String>,
}
