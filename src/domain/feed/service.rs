use super::model::{
    DetailPhotosOutcome, DetailView, FeedSession, FeedSnapshot, LoadMoreOutcome, SkipReason,
};
use crate::domain::restaurant::{
    is_provider_id, FallbackRestaurantsRepository, PlacesRepository, Restaurant,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Owns the visible restaurant list and drives incremental loading.
///
/// The session lock is never held across an await point.
pub struct FeedLoader {
    places: Arc<dyn PlacesRepository>,
    fallback: Arc<dyn FallbackRestaurantsRepository>,
    session: Mutex<FeedSession>,
}

impl FeedLoader {
    pub fn new(
        places: Arc<dyn PlacesRepository>,
        fallback: Arc<dyn FallbackRestaurantsRepository>,
    ) -> Self {
        Self {
            places,
            fallback,
            session: Mutex::new(FeedSession::default()),
        }
    }

    /// Load the first page, or the fallback list when the provider is
    /// unconfigured or the request fails.
    pub async fn initial_load(&self) -> FeedSnapshot {
        if !self.places.is_configured() {
            tracing::info!("Places provider not configured, showing fallback restaurants");
            self.adopt_fallback(None);
            return self.snapshot();
        }

        match self.places.fetch_page(None).await {
            Ok(page) => {
                let mut session = self.session.lock();
                session.restaurants.clear();
                let added = merge_new(&mut session.restaurants, page.restaurants);
                session.next_page_token = page.next_page_token;
                session.error = None;

                tracing::info!(
                    count = added,
                    has_more = session.next_page_token.is_some(),
                    "Initial feed page loaded"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    upstream = e.is_upstream(),
                    "Initial feed load failed, showing fallback restaurants"
                );
                self.adopt_fallback(Some(e.to_string()));
            }
        }

        self.snapshot()
    }

    /// Fetch the next page and append the restaurants not already shown.
    ///
    /// Failures leave the session untouched and are not surfaced as errors.
    pub async fn load_more(&self) -> LoadMoreOutcome {
        let (token, in_flight) = {
            let mut session = self.session.lock();
            if !self.places.is_configured() {
                return LoadMoreOutcome::Skipped(SkipReason::NotConfigured);
            }
            if session.loading_more {
                return LoadMoreOutcome::Skipped(SkipReason::InFlight);
            }
            let Some(token) = session.next_page_token.clone() else {
                return LoadMoreOutcome::Skipped(SkipReason::EndOfResults);
            };
            session.loading_more = true;
            (token, InFlight::new(&self.session))
        };

        let result = self.places.fetch_page(Some(&token)).await;

        let mut session = self.session.lock();
        in_flight.disarm();
        session.loading_more = false;

        match result {
            Ok(page) => {
                let added = merge_new(&mut session.restaurants, page.restaurants);
                session.next_page_token = page.next_page_token;

                tracing::info!(
                    added = added,
                    total = session.restaurants.len(),
                    has_more = session.next_page_token.is_some(),
                    "Feed page appended"
                );

                LoadMoreOutcome::Appended {
                    added,
                    has_more: session.next_page_token.is_some(),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Loading more restaurants failed, will retry on next scroll");
                LoadMoreOutcome::Failed(e)
            }
        }
    }

    /// Open the detail view for a restaurant in the current list.
    ///
    /// Selection is the first of two steps. When the returned view has
    /// `photos_loading` set, the caller owns the follow-up
    /// [`load_detail_photos`](Self::load_detail_photos) call for the same id;
    /// nothing else clears the flag short of closing or replacing the
    /// selection.
    pub fn select(&self, id: &str) -> Option<DetailView> {
        let mut session = self.session.lock();
        let restaurant = session.restaurants.iter().find(|r| r.id == id)?.clone();

        let view = DetailView {
            restaurant,
            photos_loading: self.places.is_configured() && is_provider_id(id),
        };
        session.detail = Some(view.clone());
        Some(view)
    }

    pub fn close_detail(&self) {
        self.session.lock().detail = None;
    }

    /// Fetch provider photos for the selected restaurant and merge them ahead
    /// of the photos already known from the list.
    ///
    /// The result is applied only if `id` is still the selected restaurant when
    /// the lookup completes.
    pub async fn load_detail_photos(&self, id: &str) -> DetailPhotosOutcome {
        {
            let session = self.session.lock();
            match &session.detail {
                Some(detail) if detail.restaurant.id == id => {
                    if !detail.photos_loading {
                        return DetailPhotosOutcome::Skipped;
                    }
                }
                _ => return DetailPhotosOutcome::Stale,
            }
        }

        let result = self.places.fetch_detail_photos(id).await;

        let mut session = self.session.lock();
        let Some(detail) = session.detail.as_mut().filter(|d| d.restaurant.id == id) else {
            tracing::debug!(place_id = %id, "Discarding detail photos for a closed selection");
            return DetailPhotosOutcome::Stale;
        };
        detail.photos_loading = false;

        match result {
            Ok(fetched) => {
                let merged = merge_photos(fetched, &detail.restaurant.photo_urls);
                detail.restaurant.set_photos(merged);
                DetailPhotosOutcome::Applied {
                    photo_count: detail.restaurant.photo_urls.len(),
                }
            }
            Err(e) => {
                tracing::warn!(place_id = %id, error = %e, "Detail photos unavailable");
                DetailPhotosOutcome::Failed(e)
            }
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot::from(&*self.session.lock())
    }

    pub fn restaurants(&self) -> Vec<Restaurant> {
        self.session.lock().restaurants.clone()
    }

    pub fn next_page_token(&self) -> Option<String> {
        self.session.lock().next_page_token.clone()
    }

    pub fn has_more(&self) -> bool {
        self.places.is_configured() && self.session.lock().next_page_token.is_some()
    }

    pub fn error(&self) -> Option<String> {
        self.session.lock().error.clone()
    }

    pub fn detail(&self) -> Option<DetailView> {
        self.session.lock().detail.clone()
    }

    fn adopt_fallback(&self, error: Option<String>) {
        let mut session = self.session.lock();
        session.restaurants = self.fallback.get_all();
        session.next_page_token = None;
        session.error = error;
    }
}

/// Resets the in-flight flag if a load-more future is dropped mid-request.
struct InFlight<'a> {
    session: Option<&'a Mutex<FeedSession>>,
}

impl<'a> InFlight<'a> {
    fn new(session: &'a Mutex<FeedSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    fn disarm(mut self) {
        self.session = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session {
            session.lock().loading_more = false;
        }
    }
}

/// Append restaurants whose id is not yet present, keeping page order.
/// The first occurrence of an id wins. Returns how many were added.
fn merge_new(existing: &mut Vec<Restaurant>, incoming: Vec<Restaurant>) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(|r| r.id.clone()).collect();
    let before = existing.len();
    existing.extend(incoming.into_iter().filter(|r| seen.insert(r.id.clone())));
    existing.len() - before
}

/// Provider photos first, then any previously known photo not among them.
fn merge_photos(fetched: Vec<String>, known: &[String]) -> Vec<String> {
    let fetched_set: HashSet<&str> = fetched.iter().map(String::as_str).collect();
    let extra: Vec<String> = known
        .iter()
        .filter(|url| !fetched_set.contains(url.as_str()))
        .cloned()
        .collect();

    let mut merged = fetched;
    merged.extend(extra);
    merged
}
