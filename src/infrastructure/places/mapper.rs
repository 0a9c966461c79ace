//! Conversion from Places API (v1) place objects to feed records.

use super::dto::{LocalizedText, PlaceDto};
use crate::domain::restaurant::Restaurant;
use regex::Regex;
use std::sync::LazyLock;

const PLACE_RESOURCE_PREFIX: &str = "places/";
const UNKNOWN_NAME: &str = "Unknown";
const DEFAULT_CUISINE: &str = "Restaurant";
const PHOTO_MAX_WIDTH_PX: u32 = 400;

/// Type tags too generic to describe a cuisine.
const GENERIC_TYPES: [&str; 4] = ["restaurant", "food", "point_of_interest", "establishment"];

static WORD_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w").unwrap());

/// Builds photo media URLs for a given provider base URL and API key.
#[derive(Debug, Clone)]
pub struct PhotoUrlBuilder {
    base_url: String,
    api_key: Option<String>,
}

impl PhotoUrlBuilder {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// `None` when either the photo name or the API key is missing.
    pub fn photo_url(&self, photo_name: Option<&str>) -> Option<String> {
        let name = photo_name.filter(|n| !n.is_empty())?;
        let key = self.api_key.as_deref()?;
        Some(format!(
            "{}/v1/{}/media?maxWidthPx={}&key={}",
            self.base_url,
            name,
            PHOTO_MAX_WIDTH_PX,
            urlencoding::encode(key)
        ))
    }

    pub fn photo_urls<'a, I>(&self, photo_names: I) -> Vec<String>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        photo_names
            .into_iter()
            .filter_map(|name| self.photo_url(name))
            .collect()
    }
}

pub fn place_to_restaurant(place: &PlaceDto, photos: &PhotoUrlBuilder) -> Restaurant {
    let id = place
        .id
        .as_deref()
        .map(|id| id.strip_prefix(PLACE_RESOURCE_PREFIX).unwrap_or(id))
        .unwrap_or_default();

    let name = place
        .display_name
        .as_ref()
        .and_then(LocalizedText::text)
        .unwrap_or(UNKNOWN_NAME);

    let cuisine = cuisine_label(&place.types, place.primary_type_display_name.as_ref());

    let photo_urls = photos.photo_urls(place.photos.iter().map(|p| p.name.as_deref()));

    Restaurant::new(
        id,
        name,
        cuisine,
        place.rating.unwrap_or(0.0),
        place.formatted_address.clone().unwrap_or_default(),
    )
    .with_photos(photo_urls)
}

/// A non-empty primary type label wins; otherwise the first specific type tag,
/// humanized; otherwise "Restaurant".
pub fn cuisine_label(types: &[String], primary_type: Option<&LocalizedText>) -> String {
    if let Some(label) = primary_type.and_then(LocalizedText::text).filter(|t| !t.is_empty()) {
        return label.to_string();
    }

    types
        .iter()
        .find(|t| !GENERIC_TYPES.contains(&t.as_str()))
        .map(|t| humanize_type(t))
        .unwrap_or_else(|| DEFAULT_CUISINE.to_string())
}

/// `thai_restaurant` -> `Thai Restaurant`
fn humanize_type(tag: &str) -> String {
    let spaced = tag.replace('_', " ");
    WORD_START
        .replace_all(&spaced, |caps: &regex::Captures| caps[0].to_uppercase())
        .into_owned()
}
