//! Session orchestration: a fixed run of rounds over a sampled name pool.

use rand::Rng;
use tracing::{debug, info, warn};

use callejero_core::{
    sample_without_replacement, GeoPoint, Geometry, Projection, QuizError, RoundResult,
};

use crate::resolver::GeometryResolver;
use crate::round::{Round, RoundPhase, RoundToken};

/// One complete game: a fixed number of rounds drawn without replacement
/// from the name pool, an append-only result list, and a running total.
///
/// Exclusively owned by one driver; every mutation goes through an explicit
/// method, and geometry resolutions are applied under a round-token guard so
/// a slow fetch for an already-advanced round cannot clobber state.
#[derive(Debug)]
pub struct GameSession {
    pool: Vec<String>,
    streets: Vec<String>,
    results: Vec<RoundResult>,
    total_km: f64,
    round: Option<Round>,
    round_index: usize,
    next_token: u64,
}

impl GameSession {
    /// Sample `rounds` distinct streets from `pool` and open round 0.
    pub fn start<R: Rng + ?Sized>(
        pool: Vec<String>,
        rounds: usize,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        let streets = sample_without_replacement(&pool, rounds, rng)?;
        info!(rounds, pool_size = pool.len(), "Starting new game session");

        let mut session = Self {
            pool,
            streets,
            results: Vec::new(),
            total_km: 0.0,
            round: None,
            round_index: 0,
            next_token: 0,
        };
        session.open_round(0);
        Ok(session)
    }

    fn open_round(&mut self, index: usize) {
        self.round_index = index;
        match self.streets.get(index) {
            Some(street) => {
                let token = RoundToken(self.next_token);
                self.next_token += 1;
                debug!(round = index, street = %street, "Opening round");
                self.round = Some(Round::new(street.clone(), token));
            }
            None => {
                info!(total_km = self.total_km, "Game complete");
                self.round = None;
            }
        }
    }

    // --- Resolution ---

    /// Apply a finished geometry resolution. The outcome is discarded when
    /// `token` no longer identifies the current round (it advanced, or the
    /// session restarted, while the fetch was in flight) or when the round
    /// already left `Loading`. Returns whether the outcome was applied.
    pub fn apply_resolution(
        &mut self,
        token: RoundToken,
        outcome: Result<Geometry, QuizError>,
    ) -> bool {
        let Some(round) = self.round.as_mut() else {
            return false;
        };
        if round.token() != token || round.phase() != RoundPhase::Loading {
            debug!(?token, "Discarding stale geometry resolution");
            return false;
        }

        match outcome {
            Ok(geometry) => round.geometry_ready(geometry),
            Err(error) => {
                warn!(street = round.street(), %error, "Geometry resolution failed");
                round.geometry_failed(error);
            }
        }
        true
    }

    /// Re-enter `Loading` after a failed resolution. User-initiated; there
    /// is no automatic retry.
    pub fn retry(&mut self) -> bool {
        self.round.as_mut().is_some_and(|round| round.retry())
    }

    // --- Guessing and scoring ---

    /// Place or replace the current round's guess.
    pub fn place_guess(&mut self, point: GeoPoint) -> bool {
        self.round
            .as_mut()
            .is_some_and(|round| round.place_guess(point))
    }

    /// Submit the current guess. On the first effective submission the
    /// round result is recorded and the total updated; anything else is a
    /// no-op returning `None`.
    pub fn submit(&mut self) -> Option<&RoundResult> {
        let round = self.round.as_mut()?;
        let result = round.submit()?;
        info!(street = %result.street, error_km = result.error_km, "Round scored");
        self.total_km += result.error_km;
        self.results.push(result);
        self.results.last()
    }

    /// Move on from a submitted round: the next round opens in `Loading`,
    /// or the session completes after the last one. No-op in any other
    /// phase.
    pub fn advance(&mut self) -> bool {
        let submitted = self
            .round
            .as_ref()
            .is_some_and(|round| round.phase() == RoundPhase::Submitted);
        if !submitted {
            return false;
        }
        self.open_round(self.round_index + 1);
        true
    }

    /// Discard all results and re-sample a fresh game from the full pool.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), QuizError> {
        let rounds = self.streets.len();
        self.streets = sample_without_replacement(&self.pool, rounds, rng)?;
        self.results.clear();
        self.total_km = 0.0;
        info!(rounds, "Session restarted");
        self.open_round(0);
        Ok(())
    }

    // --- UI boundary ---

    pub fn current_street(&self) -> Option<&str> {
        self.round.as_ref().map(Round::street)
    }

    pub fn round_token(&self) -> Option<RoundToken> {
        self.round.as_ref().map(Round::token)
    }

    pub fn phase(&self) -> Option<RoundPhase> {
        self.round.as_ref().map(Round::phase)
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.round.as_ref().and_then(Round::geometry)
    }

    pub fn guess(&self) -> Option<GeoPoint> {
        self.round.as_ref().and_then(Round::guess)
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.round.as_ref().and_then(Round::projection)
    }

    pub fn error(&self) -> Option<&QuizError> {
        self.round.as_ref().and_then(Round::error)
    }

    /// 0-based index of the current round.
    pub fn round_number(&self) -> usize {
        self.round_index
    }

    pub fn round_count(&self) -> usize {
        self.streets.len()
    }

    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    pub fn total_score_km(&self) -> f64 {
        self.total_km
    }

    pub fn is_complete(&self) -> bool {
        self.round.is_none()
    }
}

/// Resolve the current round's geometry and apply the outcome under the
/// round-token guard. The guard matters for drivers that run resolution
/// concurrently with user input; this helper just encodes the handshake.
pub async fn load_current_round<R>(session: &mut GameSession, resolver: &R)
where
    R: GeometryResolver + ?Sized,
{
    if session.phase() != Some(RoundPhase::Loading) {
        return;
    }
    let (Some(street), Some(token)) = (
        session.current_street().map(str::to_owned),
        session.round_token(),
    ) else {
        return;
    };

    let outcome = resolver.resolve(&street).await;
    session.apply_resolution(token, outcome);
}
