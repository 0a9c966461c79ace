pub mod client;
pub mod dto;
pub mod mapper;
pub mod rate_limiter;

pub use client::GooglePlacesClient;
pub use mapper::PhotoUrlBuilder;
pub use rate_limiter::RateLimiter;
