use serde::{Deserialize, Serialize};

/// A restaurant as shown in the feed, normalized from either the places
/// provider or the bundled fallback list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    /// 0 when the provider has no rating
    pub rating: f64,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub photo_urls: Vec<String>,
}

impl Restaurant {
    /// Build a record without photos.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cuisine: impl Into<String>,
        rating: f64,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cuisine: cuisine.into(),
            rating,
            address: address.into(),
            photo_url: None,
            photo_urls: Vec::new(),
        }
    }

    /// Replace the photo list; the primary photo always tracks the first entry.
    pub fn set_photos(&mut self, photo_urls: Vec<String>) {
        self.photo_url = photo_urls.first().cloned();
        self.photo_urls = photo_urls;
    }

    pub fn with_photos(mut self, photo_urls: Vec<String>) -> Self {
        self.set_photos(photo_urls);
        self
    }
}

/// One page of a paginated search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NearbyPage {
    pub restaurants: Vec<Restaurant>,
    /// Opaque continuation token; `None` when there are no further pages
    pub next_page_token: Option<String>,
}
