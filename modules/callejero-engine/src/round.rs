//! The per-round finite-state machine.
//!
//! One tagged phase enum plus explicit transition methods. Transitions that
//! are not legal in the current phase are no-ops, which is what makes the
//! guess and submit paths safe to drive from an unstructured UI.

use callejero_core::{project, GeoPoint, Geometry, Projection, QuizError, RoundResult};

/// Identity of one round within a session. A geometry resolution carries the
/// token it was started under; an outcome whose token no longer matches the
/// session's current round is discarded on apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundToken(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Geometry resolution in flight.
    Loading,
    /// Geometry ready, no guess placed yet.
    AwaitingGuess,
    /// Guess set; replaceable until submission.
    GuessPlaced,
    /// Projection computed; round immutable until advance.
    Submitted,
    /// Resolution failed; stuck until a user-initiated retry.
    Failed,
}

#[derive(Debug)]
pub struct Round {
    street: String,
    token: RoundToken,
    phase: RoundPhase,
    geometry: Option<Geometry>,
    guess: Option<GeoPoint>,
    projection: Option<Projection>,
    error: Option<QuizError>,
}

impl Round {
    pub(crate) fn new(street: String, token: RoundToken) -> Self {
        Self {
            street,
            token,
            phase: RoundPhase::Loading,
            geometry: None,
            guess: None,
            projection: None,
            error: None,
        }
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn token(&self) -> RoundToken {
        self.token
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn guess(&self) -> Option<GeoPoint> {
        self.guess
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn error(&self) -> Option<&QuizError> {
        self.error.as_ref()
    }

    /// Loading → AwaitingGuess.
    pub(crate) fn geometry_ready(&mut self, geometry: Geometry) {
        if self.phase != RoundPhase::Loading {
            return;
        }
        self.geometry = Some(geometry);
        self.phase = RoundPhase::AwaitingGuess;
    }

    /// Loading → Failed.
    pub(crate) fn geometry_failed(&mut self, error: QuizError) {
        if self.phase != RoundPhase::Loading {
            return;
        }
        self.error = Some(error);
        self.phase = RoundPhase::Failed;
    }

    /// Failed → Loading, for a user-initiated retry.
    pub(crate) fn retry(&mut self) -> bool {
        if self.phase != RoundPhase::Failed {
            return false;
        }
        self.error = None;
        self.phase = RoundPhase::Loading;
        true
    }

    /// Place or replace the guess. Rejected before the geometry is ready
    /// and after submission.
    pub(crate) fn place_guess(&mut self, point: GeoPoint) -> bool {
        match self.phase {
            RoundPhase::AwaitingGuess | RoundPhase::GuessPlaced => {
                self.guess = Some(point);
                self.phase = RoundPhase::GuessPlaced;
                true
            }
            _ => false,
        }
    }

    /// Score the round. Requires a placed guess and a resolved geometry;
    /// otherwise a no-op. The first submission freezes the guess, the
    /// projection, and the result.
    pub(crate) fn submit(&mut self) -> Option<RoundResult> {
        if self.phase != RoundPhase::GuessPlaced {
            return None;
        }
        let (geometry, guess) = match (&self.geometry, self.guess) {
            (Some(geometry), Some(guess)) => (geometry, guess),
            _ => return None,
        };

        let projection = project(geometry, guess);
        self.projection = Some(projection);
        self.phase = RoundPhase::Submitted;
        Some(RoundResult::from_distance_m(
            self.street.clone(),
            projection.distance_m,
        ))
    }
}
