use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    /// No geodata exists for this street, in any source.
    #[error("no geometry found for street: {street}")]
    NotFound { street: String },

    /// The live geometry source failed (transport, HTTP, or parse).
    #[error("geometry source unavailable: {0}")]
    GeometryUnavailable(String),

    /// A geometry with no usable polyline was constructed. Callers must
    /// never feed the projection an empty geometry, so this is a
    /// programming error, not an environmental one.
    #[error("geometry has no polyline with at least two points")]
    InvalidGeometry,

    /// The name pool is smaller than the number of rounds requested.
    #[error("name pool has {available} names but {requested} rounds were requested")]
    InsufficientPool { available: usize, requested: usize },
}
