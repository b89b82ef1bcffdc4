use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::geo::LatLng;

// Shape of one record from GET {listings endpoint}:
//
// listing
//  ├── id                 (required)
//  ├── title              (required)
//  ├── description / address / city
//  ├── startDate / endDate   ISO date or RFC 3339 datetime
//  ├── latitude / longitude  number OR numeric string OR junk
//  ├── categories         [tag, ...]
//  └── owner
//       ├── name
//       └── email
//
// Everything past `title` is tolerated missing or malformed: the record
// stays in the store and is simply excluded from whatever needs the field.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, deserialize_with = "calendar_day")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "calendar_day")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
}

impl Listing {
    /// The listing's map position, if its coordinate pair is usable.
    /// Records with a missing, non-numeric or out-of-range pair stay in
    /// the store but render nowhere.
    pub fn coordinate(&self) -> Option<LatLng> {
        let point = LatLng::new(self.latitude?, self.longitude?);
        point.is_valid().then_some(point)
    }

    pub fn has_category(&self, tag: &str) -> bool {
        self.categories.iter().any(|c| c == tag)
    }
}

/// Payload for POST {listings endpoint}. Coordinates are numeric here:
/// they come from an accepted geocode suggestion, not free text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub categories: Vec<String>,
    pub user_email: String,
}

/// The fixed tag catalog the listing form offers. Filtering itself accepts
/// arbitrary tags; this is for embedders building pickers.
pub const CATEGORY_CATALOG: [&str; 12] = [
    "Books",
    "Furniture",
    "Garden",
    "Art",
    "Electronics",
    "Clothes",
    "Toys",
    "Sports",
    "Music",
    "Kitchen",
    "Pets",
    "Tools",
];

fn lenient_coord<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(coord_from_value(&value))
}

fn coord_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn calendar_day<'de, D>(de: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.as_deref().and_then(parse_day))
}

/// Accepts a plain ISO date or an RFC 3339 datetime (the backend emits the
/// latter), truncated to the calendar day.
pub(crate) fn parse_day(raw: &str) -> Option<NaiveDate> {
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(day);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}
