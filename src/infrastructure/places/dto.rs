//! Wire types for the Places API (v1).

use crate::infrastructure::config::SearchArea;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Text fields the provider sends either as a bare string or as
/// `{ "text": ..., "languageCode": ... }`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    #[serde(rename_all = "camelCase")]
    Localized {
        text: Option<String>,
        language_code: Option<String>,
    },
    Other(serde_json::Value),
}

impl LocalizedText {
    /// Bare string, then object `text`; anything else has no text.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Plain(text) => Some(text.as_str()),
            Self::Localized { text, .. } => text.as_deref(),
            Self::Other(_) => None,
        }
    }
}

// Provider records are decoded field by field: a value of the wrong shape
// becomes absent instead of failing the whole response.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoDto {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDto {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    pub display_name: Option<LocalizedText>,
    #[serde(default, deserialize_with = "lenient")]
    pub formatted_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub types: Vec<String>,
    pub primary_type_display_name: Option<LocalizedText>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub photos: Vec<PhotoDto>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTextResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub places: Vec<PlaceDto>,
    #[serde(default, deserialize_with = "lenient")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchNearbyResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub places: Vec<PlaceDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaceDetailsResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub photos: Vec<PhotoDto>,
}

/// Any value that does not decode as `T` (including `null`) is absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// String entries of an array; other entries and non-arrays are dropped.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// Array entries that decode as `T`; the rest are skipped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if decoded.len() < total {
        tracing::warn!(
            skipped = total - decoded.len(),
            "Dropped undecodable entries from provider response"
        );
    }

    Ok(decoded)
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Circle {
    pub center: LatLng,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CircleArea {
    pub circle: Circle,
}

impl From<SearchArea> for CircleArea {
    fn from(area: SearchArea) -> Self {
        Self {
            circle: Circle {
                center: LatLng {
                    latitude: area.latitude,
                    longitude: area.longitude,
                },
                radius: area.radius_m,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTextRequest<'a> {
    pub text_query: &'a str,
    pub included_type: &'a str,
    pub page_size: u32,
    pub location_bias: CircleArea,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchNearbyRequest<'a> {
    pub included_primary_types: [&'a str; 1],
    pub max_result_count: u32,
    pub location_restriction: CircleArea,
}
