use crate::domain::restaurant::{FallbackRestaurantsRepository, Restaurant};
use std::collections::HashSet;
use std::sync::LazyLock;

static RESTAURANTS: LazyLock<Vec<Restaurant>> = LazyLock::new(|| {
    vec![
        Restaurant::new("1", "The Golden Fork", "Contemporary American", 4.8, "123 Main St"),
        Restaurant::new("2", "Sakura Sushi", "Japanese", 4.6, "456 Oak Ave"),
        Restaurant::new("3", "Casa de Pasta", "Italian", 4.7, "789 Elm Blvd"),
        Restaurant::new("4", "Flame & Smoke", "BBQ", 4.9, "321 Grill Rd"),
        Restaurant::new("5", "Bamboo Garden", "Thai", 4.5, "555 Spice Ln"),
        Restaurant::new("6", "La Petite Bistro", "French", 4.8, "777 Rue De Paris"),
        Restaurant::new("7", "Taco Loco", "Mexican", 4.4, "888 Salsa Dr"),
        Restaurant::new("8", "Dragon Dragon", "Chinese", 4.6, "999 Wok Way"),
        Restaurant::new("9", "Sunrise Diner", "Breakfast", 4.3, "111 Morning St"),
        Restaurant::new("10", "Olive & Vine", "Mediterranean", 4.7, "222 Harbor Ave"),
    ]
});

/// Bundled restaurant list shown when the places provider is unavailable.
pub struct HardcodedFallbackRepository;

impl HardcodedFallbackRepository {
    pub fn new() -> Self {
        debug_assert_eq!(RESTAURANTS.len(), 10, "Must have exactly 10 fallback restaurants");

        let unique: HashSet<&str> = RESTAURANTS.iter().map(|r| r.id.as_str()).collect();
        debug_assert_eq!(unique.len(), RESTAURANTS.len(), "Fallback ids must be unique");

        Self
    }
}

impl FallbackRestaurantsRepository for HardcodedFallbackRepository {
    fn get_all(&self) -> Vec<Restaurant> {
        RESTAURANTS.clone()
    }
}

impl Default for HardcodedFallbackRepository {
    fn default() -> Self {
        Self::new()
    }
}
