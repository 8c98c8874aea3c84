//! Geometry resolution: precomputed document first, live Overpass second.
//!
//! Both sources hide behind one `GeometryResolver` trait, composed in order
//! by `GeometryStore`. A `NotFound` from a tier falls through to the next
//! tier; any other error surfaces immediately.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use callejero_core::{Geometry, QuizError};
use overpass_client::OverpassClient;

#[async_trait]
pub trait GeometryResolver: Send + Sync {
    async fn resolve(&self, street: &str) -> Result<Geometry, QuizError>;
}

// Arc<R> blanket impl lets tests share a resolver for request-count assertions.
#[async_trait]
impl<R: GeometryResolver + ?Sized> GeometryResolver for Arc<R> {
    async fn resolve(&self, street: &str) -> Result<Geometry, QuizError> {
        (**self).resolve(street).await
    }
}

// ---------------------------------------------------------------------------
// Precomputed document tier
// ---------------------------------------------------------------------------

/// Read-only lookup over the harvested geometry document: a JSON object
/// mapping street name → geometry entry. Loaded lazily on first resolution
/// and cached for the process lifetime. A missing or unreadable document is
/// non-fatal: every lookup then misses and falls through to the next tier.
pub struct PrecomputedStore {
    path: PathBuf,
    entries: OnceLock<HashMap<String, Value>>,
}

impl PrecomputedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: OnceLock::new(),
        }
    }

    fn entries(&self) -> &HashMap<String, Value> {
        self.entries.get_or_init(|| match load_document(&self.path) {
            Ok(entries) => {
                debug!(path = %self.path.display(), count = entries.len(), "Loaded precomputed geometries");
                entries
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Precomputed geometries unavailable, relying on live queries");
                HashMap::new()
            }
        })
    }
}

fn load_document(path: &Path) -> anyhow::Result<HashMap<String, Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading precomputed geometries from {}", path.display()))?;
    let entries = serde_json::from_str(&raw)
        .with_context(|| format!("parsing precomputed geometries {}", path.display()))?;
    Ok(entries)
}

/// An entry is either a GeoJSON Feature wrapping a geometry object, or the
/// geometry object itself. Anything that does not normalize is treated as
/// absent so resolution falls through to the live tier.
fn parse_entry(entry: &Value) -> Option<Geometry> {
    let geom = entry.get("geometry").unwrap_or(entry);
    let coords = geom.get("coordinates")?;
    let lines: Vec<Vec<[f64; 2]>> = match geom.get("type").and_then(Value::as_str) {
        Some("LineString") => vec![serde_json::from_value(coords.clone()).ok()?],
        _ => serde_json::from_value(coords.clone()).ok()?,
    };
    Geometry::from_lon_lat(lines).ok()
}

#[async_trait]
impl GeometryResolver for PrecomputedStore {
    async fn resolve(&self, street: &str) -> Result<Geometry, QuizError> {
        match self.entries().get(street).and_then(parse_entry) {
            Some(geometry) => {
                debug!(street, "Resolved geometry from precomputed document");
                Ok(geometry)
            }
            None => Err(QuizError::NotFound {
                street: street.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Live Overpass tier
// ---------------------------------------------------------------------------

pub struct LiveResolver {
    client: OverpassClient,
}

impl LiveResolver {
    pub fn new(client: OverpassClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GeometryResolver for LiveResolver {
    async fn resolve(&self, street: &str) -> Result<Geometry, QuizError> {
        let ways = self
            .client
            .street_ways(street)
            .await
            .map_err(|err| QuizError::GeometryUnavailable(err.to_string()))?;

        if ways.is_empty() {
            return Err(QuizError::NotFound {
                street: street.to_string(),
            });
        }

        let lines = ways
            .into_iter()
            .map(|way| way.into_iter().map(|node| [node.lon, node.lat]).collect())
            .collect();

        // Ways made entirely of degenerate vertex lists carry no usable
        // geometry, which is indistinguishable from no match.
        Geometry::from_lon_lat(lines).map_err(|_| QuizError::NotFound {
            street: street.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tier composition
// ---------------------------------------------------------------------------

/// Ordered tiers behind the single resolver interface. Adding another tier
/// (say, an in-memory request cache) changes no caller.
pub struct GeometryStore {
    tiers: Vec<Box<dyn GeometryResolver>>,
}

impl GeometryStore {
    pub fn new(precomputed: PrecomputedStore, live: LiveResolver) -> Self {
        Self::from_tiers(vec![Box::new(precomputed), Box::new(live)])
    }

    pub fn from_tiers(tiers: Vec<Box<dyn GeometryResolver>>) -> Self {
        Self { tiers }
    }
}

#[async_trait]
impl GeometryResolver for GeometryStore {
    async fn resolve(&self, street: &str) -> Result<Geometry, QuizError> {
        for tier in &self.tiers {
            match tier.resolve(street).await {
                Ok(geometry) => return Ok(geometry),
                Err(QuizError::NotFound { .. }) => continue,
                Err(other) => return Err(other),
            }
        }
        Err(QuizError::NotFound {
            street: street.to_string(),
        })
    }
}

// ===========================================================================
// Unit tests
// ===========================================================================
