//! Round and session orchestration for the street quiz.
//!
//! Geometry resolution goes through a tiered `GeometryResolver` (precomputed
//! document, then live Overpass). Each round is an explicit state machine;
//! `GameSession` owns the sampled street list, the append-only results, and
//! the running total.

pub mod datasets;
pub mod resolver;
pub mod round;
pub mod session;

pub use datasets::load_name_pool;
pub use resolver::{GeometryResolver, GeometryStore, LiveResolver, PrecomputedStore};
pub use round::{Round, RoundPhase, RoundToken};
pub use session::{load_current_round, GameSession};
