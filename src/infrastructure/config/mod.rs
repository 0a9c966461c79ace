use serde::Deserialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_PLACES_BASE_URL: &str = "https://places.googleapis.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub log_format: LogFormat,
    // Places provider
    pub google_maps_api_key: Option<String>,
    pub places_base_url: String,
    pub search_area: SearchArea,
    pub rate_limit_interval_ms: u64,
    pub detail_cache_enabled: bool,
    // Feed session driven by the binary
    pub feed_pages: usize,
    pub feed_mode: FeedMode,
    // Supabase auth
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Circle the searches are biased towards.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct SearchArea {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

impl Default for SearchArea {
    /// Vancouver, WA with a 5 km radius.
    fn default() -> Self {
        Self {
            latitude: 45.6387,
            longitude: -122.6615,
            radius_m: 5000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Paginated text search with infinite scroll
    Paged,
    /// Single nearby search, no pagination
    Nearby,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let defaults = SearchArea::default();

        let config = Config {
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            google_maps_api_key: non_empty_var("GOOGLE_MAPS_API_KEY"),
            places_base_url: env::var("PLACES_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PLACES_BASE_URL.to_string()),
            search_area: SearchArea {
                latitude: match env::var("SEARCH_LATITUDE") {
                    Ok(v) => v.parse()?,
                    Err(_) => defaults.latitude,
                },
                longitude: match env::var("SEARCH_LONGITUDE") {
                    Ok(v) => v.parse()?,
                    Err(_) => defaults.longitude,
                },
                radius_m: match env::var("SEARCH_RADIUS_M") {
                    Ok(v) => v.parse()?,
                    Err(_) => defaults.radius_m,
                },
            },
            rate_limit_interval_ms: env::var("RATE_LIMIT_INTERVAL_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()?,
            detail_cache_enabled: env::var("DETAIL_CACHE_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<String>()
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(true),
            feed_pages: env::var("FEED_PAGES")
                .unwrap_or_else(|_| "2".to_string())
                .parse()?,
            feed_mode: env::var("FEED_MODE")
                .unwrap_or_else(|_| "paged".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "nearby" => FeedMode::Nearby,
                    _ => FeedMode::Paged,
                })?,
            supabase_url: non_empty_var("SUPABASE_URL"),
            supabase_anon_key: non_empty_var("SUPABASE_ANON_KEY")
                .or_else(|| non_empty_var("SUPABASE_PUBLISHABLE_KEY")),
            email: non_empty_var("CASTIRON_EMAIL"),
            password: non_empty_var("CASTIRON_PASSWORD"),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_development() {
            "castiron_feed=debug"
        } else {
            "castiron_feed=info"
        }
    }

    /// The places provider is usable only with an API key.
    pub fn is_places_configured(&self) -> bool {
        self.google_maps_api_key.is_some()
    }

    pub fn is_auth_configured(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }

    pub fn rate_limit_interval(&self) -> Duration {
        Duration::from_millis(self.rate_limit_interval_ms)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
