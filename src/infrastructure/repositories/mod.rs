pub mod fallback_restaurants_repository;

pub use fallback_restaurants_repository::HardcodedFallbackRepository;
