pub mod model;

pub use model::{NearbyPage, Restaurant};

use crate::error::AppResult;
use async_trait::async_trait;

/// Live source of restaurants (the places provider).
#[async_trait]
pub trait PlacesRepository: Send + Sync {
    /// Whether the provider can be called at all (an API key is present).
    fn is_configured(&self) -> bool;

    /// Fetch one page of nearby restaurants. `page_token` is forwarded verbatim.
    async fn fetch_page(&self, page_token: Option<&str>) -> AppResult<NearbyPage>;

    /// Fetch the full photo set for a restaurant.
    ///
    /// Resolves to an empty list without any network call for ids that were not
    /// issued by the provider. Errors are reported here; callers decide whether
    /// to surface or discard them.
    async fn fetch_detail_photos(&self, id: &str) -> AppResult<Vec<String>>;
}

/// Bundled restaurants used when the provider is unconfigured or failing.
pub trait FallbackRestaurantsRepository: Send + Sync {
    fn get_all(&self) -> Vec<Restaurant>;
}

/// True if `id` looks like a provider-issued place id rather than a short
/// numeric fallback id.
pub fn is_provider_id(id: &str) -> bool {
    id.len() > 15 && (id.starts_with("ChIJ") || !id.bytes().all(|b| b.is_ascii_digit()))
}
