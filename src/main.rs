use castiron_feed::domain::auth::{AuthProvider, AuthService, AuthServiceApi};
use castiron_feed::domain::feed::{FeedLoader, LoadMoreOutcome};
use castiron_feed::domain::restaurant::{FallbackRestaurantsRepository, PlacesRepository};
use castiron_feed::infrastructure::auth::SupabaseAuthClient;
use castiron_feed::infrastructure::config::{Config, FeedMode, LogFormat};
use castiron_feed::infrastructure::places::{client::PAGE_SIZE, GooglePlacesClient};
use castiron_feed::infrastructure::repositories::HardcodedFallbackRepository;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        places_configured = config.is_places_configured(),
        auth_configured = config.is_auth_configured(),
        mode = ?config.feed_mode,
        "Starting Castiron feed"
    );

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Identity provider (only when Supabase is configured)
    let auth_provider: Option<Arc<dyn AuthProvider>> =
        match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(key)) => Some(Arc::new(SupabaseAuthClient::new(
                url.clone(),
                key.clone(),
            )) as Arc<dyn AuthProvider>),
            _ => None,
        };
    let auth_service = Arc::new(AuthService::new(auth_provider));

    // 2. Places client and fallback data
    let places_client = Arc::new(GooglePlacesClient::from_config(&config));
    let fallback = Arc::new(HardcodedFallbackRepository::new());

    // 3. Feed session
    let feed_loader = FeedLoader::new(
        places_client.clone() as Arc<dyn PlacesRepository>,
        fallback as Arc<dyn FallbackRestaurantsRepository>,
    );

    // Auth gate: without Supabase the feed is open
    if auth_service.is_configured() {
        let (Some(email), Some(password)) = (&config.email, &config.password) else {
            return Err("Sign-in required: set CASTIRON_EMAIL and CASTIRON_PASSWORD".into());
        };
        let session = auth_service.sign_in(email, password).await?;
        tracing::info!(user = %session.user.display_name(), "Welcome back");
    }

    let output = match config.feed_mode {
        FeedMode::Paged => run_paged(&feed_loader, config.feed_pages).await?,
        FeedMode::Nearby => {
            let restaurants = places_client.fetch_nearby(PAGE_SIZE as usize).await?;
            serde_json::to_string_pretty(&restaurants)?
        }
    };

    println!("{}", output);

    if auth_service.current_session().is_some() {
        auth_service.sign_out().await?;
    }

    Ok(())
}

/// Walk the feed like a scrolling user: first page, more pages until the
/// cursor runs out, then open the first restaurant.
async fn run_paged(
    feed_loader: &FeedLoader,
    pages: usize,
) -> Result<String, Box<dyn std::error::Error>> {
    let initial = feed_loader.initial_load().await;
    if let Some(error) = &initial.error {
        tracing::warn!(error = %error, "Showing fallback restaurants");
    }

    for _ in 1..pages {
        if !matches!(
            feed_loader.load_more().await,
            LoadMoreOutcome::Appended { has_more: true, .. }
        ) {
            break;
        }
    }

    if let Some(first) = feed_loader.restaurants().first() {
        let view = feed_loader.select(&first.id);
        if view.is_some_and(|v| v.photos_loading) {
            feed_loader.load_detail_photos(&first.id).await;
        }
    }

    let output = serde_json::json!({
        "feed": feed_loader.snapshot(),
        "detail": feed_loader.detail(),
    });

    Ok(serde_json::to_string_pretty(&output)?)
}

fn init_logging(config: &Config) {
    // stdout carries the feed output
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| config.default_log_filter().into()),
            )
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| config.default_log_filter().into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
