use crate::domain::restaurant::Restaurant;
use crate::error::AppError;
use serde::Serialize;

/// In-memory state of one feed session. Never persisted.
#[derive(Debug, Default)]
pub struct FeedSession {
    /// Arrival order across pages, first page first
    pub restaurants: Vec<Restaurant>,
    pub next_page_token: Option<String>,
    pub loading_more: bool,
    /// Initial-load failure kept for display
    pub error: Option<String>,
    pub detail: Option<DetailView>,
}

/// The restaurant currently opened in the detail view.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub restaurant: Restaurant,
    /// Set while a provider photo fetch is owed or in flight
    pub photos_loading: bool,
}

/// Read-only copy of the session, for rendering.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub restaurants: Vec<Restaurant>,
    pub next_page_token: Option<String>,
    pub loading_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&FeedSession> for FeedSnapshot {
    fn from(session: &FeedSession) -> Self {
        Self {
            restaurants: session.restaurants.clone(),
            next_page_token: session.next_page_token.clone(),
            loading_more: session.loading_more,
            error: session.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotConfigured,
    EndOfResults,
    InFlight,
}

#[derive(Debug)]
pub enum LoadMoreOutcome {
    Appended { added: usize, has_more: bool },
    Skipped(SkipReason),
    /// The list and cursor were left untouched so a later attempt can retry
    Failed(AppError),
}

#[derive(Debug)]
pub enum DetailPhotosOutcome {
    Applied { photo_count: usize },
    /// Nothing to fetch for this restaurant (fallback id or no provider)
    Skipped,
    /// The selection changed before the photos arrived; the result was dropped
    Stale,
    /// Lookup failed; the detail view keeps the photos it already had
    Failed(AppError),
}
