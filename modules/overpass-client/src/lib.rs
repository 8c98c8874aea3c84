pub mod error;
pub mod types;

pub use error::{OverpassError, Result};
pub use types::{GeomNode, OverpassElement, OverpassResponse};

use std::time::Duration;

use types::ways_with_geometry;

pub struct OverpassClient {
    client: reqwest::Client,
    base_url: String,
    area: String,
}

impl OverpassClient {
    /// `area` is the administrative area name every query is scoped to,
    /// e.g. "Ciudad Autónoma de Buenos Aires".
    pub fn new(base_url: &str, area: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            area: area.to_string(),
        }
    }

    /// Fetch the geometry of every way named `street` inside the configured
    /// area. Each way is an ordered vertex list. An empty vec means Overpass
    /// knows no such street; that is not an error at this layer.
    pub async fn street_ways(&self, street: &str) -> Result<Vec<Vec<GeomNode>>> {
        let query = format!(
            "[out:json];\n\
             area[name=\"{}\"]->.searchArea;\n\
             way(area.searchArea)[\"name\"=\"{}\"];\n\
             out geom;",
            self.area, street
        );

        tracing::debug!(street, area = %self.area, "Querying Overpass for way geometry");

        let resp = self.client.post(&self.base_url).body(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(OverpassError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: OverpassResponse = resp.json().await?;
        let ways = ways_with_geometry(data);
        tracing::debug!(street, count = ways.len(), "Overpass returned way geometries");

        Ok(ways)
    }
}
