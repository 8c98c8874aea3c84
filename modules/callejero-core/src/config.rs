use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
/// Every knob has a default matching the deployed game.
#[derive(Debug, Clone)]
pub struct Config {
    // Live geodata source
    pub overpass_url: String,
    pub overpass_area: String,

    // Static datasets
    pub street_names_path: PathBuf,
    pub street_geometries_path: PathBuf,

    // Game shape
    pub total_rounds: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            overpass_url: env::var("OVERPASS_URL")
                .unwrap_or_else(|_| "https://overpass-api.de/api/interpreter".to_string()),
            overpass_area: env::var("OVERPASS_AREA")
                .unwrap_or_else(|_| "Ciudad Autónoma de Buenos Aires".to_string()),
            street_names_path: env::var("STREET_NAMES_PATH")
                .unwrap_or_else(|_| "data/street_names.json".to_string())
                .into(),
            street_geometries_path: env::var("STREET_GEOMETRIES_PATH")
                .unwrap_or_else(|_| "data/street_geometries.json".to_string())
                .into(),
            total_rounds: env::var("TOTAL_ROUNDS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("TOTAL_ROUNDS must be a number"),
        }
    }
}
