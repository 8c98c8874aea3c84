use serde::Deserialize;

/// Top-level Overpass interpreter response.
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// One element of an Overpass result set. Only `way` elements carrying an
/// inline `geometry` array (from `out geom;`) are useful to callers; nodes,
/// relations, and geometry-less ways are skipped.
#[derive(Debug, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub geometry: Option<Vec<GeomNode>>,
}

/// A single vertex of a way geometry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeomNode {
    pub lat: f64,
    pub lon: f64,
}

/// Keep only way elements with a non-empty geometry, in response order.
pub fn ways_with_geometry(response: OverpassResponse) -> Vec<Vec<GeomNode>> {
    response
        .elements
        .into_iter()
        .filter(|el| el.kind == "way")
        .filter_map(|el| el.geometry)
        .filter(|geom| !geom.is_empty())
        .collect()
}
