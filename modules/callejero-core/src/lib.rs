pub mod config;
pub mod error;
pub mod geo;
pub mod sample;
pub mod types;

pub use config::Config;
pub use error::QuizError;
pub use geo::{haversine_m, project};
pub use sample::sample_without_replacement;
pub use types::{GeoPoint, Geometry, Projection, RoundResult};
