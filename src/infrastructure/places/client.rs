use super::dto::{
    PlaceDetailsResponse, SearchNearbyRequest, SearchNearbyResponse, SearchTextRequest,
    SearchTextResponse,
};
use super::mapper::{place_to_restaurant, PhotoUrlBuilder};
use super::rate_limiter::RateLimiter;
use crate::domain::restaurant::{is_provider_id, NearbyPage, PlacesRepository, Restaurant};
use crate::error::{AppError, AppResult};
use crate::infrastructure::config::{Config, SearchArea};
use async_trait::async_trait;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use std::time::Duration;

const API_KEY_HEADER: &str = "X-Goog-Api-Key";
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

const SEARCH_TEXT_FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,places.types,places.primaryTypeDisplayName,places.photos,places.rating,nextPageToken";
const SEARCH_NEARBY_FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,places.types,places.primaryTypeDisplayName,places.photos,places.rating";
const DETAILS_FIELD_MASK: &str = "id,displayName,photos";

const TEXT_QUERY: &str = "restaurants";
const RESTAURANT_TYPE: &str = "restaurant";
/// Largest page the provider will return
pub const PAGE_SIZE: u32 = 20;

const DETAIL_CACHE_CAPACITY: u64 = 200;
const DETAIL_CACHE_IDLE: Duration = Duration::from_secs(30 * 60);

/// Places API (v1) client. Every request goes through the client's own rate
/// limiter.
pub struct GooglePlacesClient {
    api_key: Option<String>,
    base_url: String,
    search_area: SearchArea,
    photos: PhotoUrlBuilder,
    rate_limiter: RateLimiter,
    detail_cache: Option<Cache<String, Vec<String>>>,
    http_client: reqwest::Client,
}

impl GooglePlacesClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        search_area: SearchArea,
        rate_limiter: RateLimiter,
        detail_cache_enabled: bool,
    ) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let detail_cache = if detail_cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(DETAIL_CACHE_CAPACITY)
                    .time_to_idle(DETAIL_CACHE_IDLE)
                    .build(),
            )
        } else {
            None
        };

        Self {
            photos: PhotoUrlBuilder::new(base_url.clone(), api_key.clone()),
            api_key,
            base_url,
            search_area,
            rate_limiter,
            detail_cache,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.google_maps_api_key.clone(),
            config.places_base_url.clone(),
            config.search_area,
            RateLimiter::new(config.rate_limit_interval()),
            config.detail_cache_enabled,
        )
    }

    /// Single, unpaginated search restricted to the configured area.
    pub async fn fetch_nearby(&self, limit: usize) -> AppResult<Vec<Restaurant>> {
        let key = self.require_key()?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        self.rate_limiter.wait().await;

        let request = SearchNearbyRequest {
            included_primary_types: [RESTAURANT_TYPE],
            max_result_count: max_result_count(limit),
            location_restriction: self.search_area.into(),
        };

        tracing::info!(limit = limit, "Searching nearby places");

        let response = self
            .http_client
            .post(format!("{}/v1/places:searchNearby", self.base_url))
            .header(API_KEY_HEADER, key)
            .header(FIELD_MASK_HEADER, SEARCH_NEARBY_FIELD_MASK)
            .json(&request)
            .send()
            .await?;

        let data: SearchNearbyResponse = read_json(response).await?;

        let mut restaurants: Vec<Restaurant> = data
            .places
            .iter()
            .map(|place| place_to_restaurant(place, &self.photos))
            .collect();
        restaurants.truncate(limit);

        tracing::info!(count = restaurants.len(), "Nearby search completed");

        Ok(restaurants)
    }

    fn require_key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Google Maps API key not set".to_string()))
    }
}

#[async_trait]
impl PlacesRepository for GooglePlacesClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> AppResult<NearbyPage> {
        let key = self.require_key()?;

        self.rate_limiter.wait().await;

        let request = SearchTextRequest {
            text_query: TEXT_QUERY,
            included_type: RESTAURANT_TYPE,
            page_size: PAGE_SIZE,
            location_bias: self.search_area.into(),
            page_token: page_token.filter(|t| !t.is_empty()),
        };

        tracing::info!(
            has_page_token = request.page_token.is_some(),
            page_size = PAGE_SIZE,
            "Fetching places page"
        );

        let response = self
            .http_client
            .post(format!("{}/v1/places:searchText", self.base_url))
            .header(API_KEY_HEADER, key)
            .header(FIELD_MASK_HEADER, SEARCH_TEXT_FIELD_MASK)
            .json(&request)
            .send()
            .await?;

        let data: SearchTextResponse = read_json(response).await?;

        let page = NearbyPage {
            restaurants: data
                .places
                .iter()
                .map(|place| place_to_restaurant(place, &self.photos))
                .collect(),
            next_page_token: normalize_page_token(data.next_page_token),
        };

        tracing::info!(
            count = page.restaurants.len(),
            has_next_page = page.next_page_token.is_some(),
            "Places page received"
        );

        Ok(page)
    }

    async fn fetch_detail_photos(&self, id: &str) -> AppResult<Vec<String>> {
        if !is_provider_id(id) {
            return Ok(Vec::new());
        }
        let Some(key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };

        if let Some(cache) = &self.detail_cache {
            if let Some(photo_urls) = cache.get(id).await {
                tracing::debug!(place_id = %id, "Detail photos served from cache");
                return Ok(photo_urls);
            }
        }

        self.rate_limiter.wait().await;

        tracing::info!(place_id = %id, "Fetching place detail photos");

        let response = self
            .http_client
            .get(format!("{}/v1/{}", self.base_url, place_resource_name(id)))
            .header(API_KEY_HEADER, key)
            .header(FIELD_MASK_HEADER, DETAILS_FIELD_MASK)
            .send()
            .await?;

        let data: PlaceDetailsResponse = read_json(response).await?;
        let photo_urls = self
            .photos
            .photo_urls(data.photos.iter().map(|p| p.name.as_deref()));

        if let Some(cache) = &self.detail_cache {
            cache.insert(id.to_string(), photo_urls.clone()).await;
        }

        Ok(photo_urls)
    }
}

/// Decode a successful response, or turn a failed one into a provider error
/// carrying the body text.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Places API request failed");
        let message = if body.trim().is_empty() {
            format!("Places API {}", status.as_u16())
        } else {
            body
        };
        return Err(AppError::Provider(message));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AppError::Decode(e.to_string()))
}

/// Requested result count, capped at the provider's page size.
fn max_result_count(limit: usize) -> u32 {
    limit.min(PAGE_SIZE as usize) as u32
}

/// Empty or whitespace-only tokens mean there is no next page.
pub fn normalize_page_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}

fn place_resource_name(id: &str) -> String {
    if id.starts_with("places/") {
        id.to_string()
    } else {
        format!("places/{}", id)
    }
}
