//! Integration tests for GameSession and the tiered geometry store,
//! driven entirely over in-memory resolvers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use callejero_core::{GeoPoint, Geometry, QuizError};
use callejero_engine::{
    load_current_round, GameSession, GeometryResolver, GeometryStore, RoundPhase,
};

// ---------------------------------------------------------------------------
// Test resolvers
// ---------------------------------------------------------------------------

/// Counting resolver over a fixed name → polyline map.
struct MapResolver {
    entries: HashMap<String, Vec<Vec<[f64; 2]>>>,
    requests: AtomicU32,
}

impl MapResolver {
    fn new(entries: &[(&str, Vec<Vec<[f64; 2]>>)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(name, lines)| (name.to_string(), lines.clone()))
                .collect(),
            requests: AtomicU32::new(0),
        }
    }

    fn empty() -> Self {
        Self::new(&[])
    }

    fn requests(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeometryResolver for MapResolver {
    async fn resolve(&self, street: &str) -> Result<Geometry, QuizError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.entries.get(street) {
            Some(lines) => Geometry::from_lon_lat(lines.clone()),
            None => Err(QuizError::NotFound {
                street: street.to_string(),
            }),
        }
    }
}

/// Resolver whose backend is unreachable.
struct UnreachableResolver;

#[async_trait]
impl GeometryResolver for UnreachableResolver {
    async fn resolve(&self, _street: &str) -> Result<Geometry, QuizError> {
        Err(QuizError::GeometryUnavailable("connection refused".into()))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// An east-west line on the equator, ~2.2 km long.
fn equator_line() -> Vec<Vec<[f64; 2]>> {
    vec![vec![[-0.01, 0.0], [0.01, 0.0]]]
}

fn pool(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(2024)
}

/// Guesses engineered against `equator_line`: latitude offsets of 0.0027°
/// and 0.0108° are ~300 m and ~1201 m, scoring 0.3 and 1.2 km; a point on
/// the line scores 0.0.
fn guess_for(street: &str) -> GeoPoint {
    match street {
        "Avenida de Mayo" => GeoPoint { lat: 0.0027, lng: 0.0 },
        "Florida" => GeoPoint { lat: 0.0108, lng: 0.0 },
        "Defensa" => GeoPoint { lat: 0.0, lng: 0.005 },
        other => panic!("unexpected street {other}"),
    }
}

fn three_street_resolver() -> MapResolver {
    MapResolver::new(&[
        ("Avenida de Mayo", equator_line()),
        ("Florida", equator_line()),
        ("Defensa", equator_line()),
    ])
}

// =========================================================================
// Session flow
// =========================================================================

#[tokio::test]
async fn full_game_scores_every_round_and_sums_the_total() {
    let resolver = three_street_resolver();
    let names = pool(&["Avenida de Mayo", "Florida", "Defensa"]);
    let mut session = GameSession::start(names.clone(), 3, &mut rng()).unwrap();

    while !session.is_complete() {
        load_current_round(&mut session, &resolver).await;
        assert_eq!(session.phase(), Some(RoundPhase::AwaitingGuess));
        assert!(session.geometry().is_some());

        let street = session.current_street().unwrap().to_owned();
        assert!(session.place_guess(guess_for(&street)));
        let result = session.submit().unwrap();
        assert_eq!(result.street, street);
        assert!(session.advance());
    }

    // Pool size == round count: every street asked exactly once.
    let mut asked: Vec<String> = session.results().iter().map(|r| r.street.clone()).collect();
    asked.sort();
    let mut expected = names;
    expected.sort();
    assert_eq!(asked, expected);

    // 0.3 + 1.2 + 0.0
    assert!((session.total_score_km() - 1.5).abs() < 1e-9);
    let recomputed: f64 = session.results().iter().map(|r| r.error_km).sum();
    assert_eq!(session.total_score_km(), recomputed);
    assert!(session.current_street().is_none());
    assert_eq!(session.phase(), None);
}

#[tokio::test]
async fn submit_is_idempotent() {
    let resolver = three_street_resolver();
    let mut session =
        GameSession::start(pool(&["Avenida de Mayo"]), 1, &mut rng()).unwrap();

    load_current_round(&mut session, &resolver).await;
    session.place_guess(GeoPoint { lat: 0.0027, lng: 0.0 });

    let first = session.submit().cloned().unwrap();
    let frozen = session.projection().copied();

    assert!(session.submit().is_none());
    assert_eq!(session.results().len(), 1);
    assert_eq!(session.results()[0], first);
    assert_eq!(session.projection().copied(), frozen);
    assert_eq!(session.total_score_km(), first.error_km);
}

#[tokio::test]
async fn guess_after_submit_is_rejected() {
    let resolver = three_street_resolver();
    let mut session =
        GameSession::start(pool(&["Avenida de Mayo"]), 1, &mut rng()).unwrap();

    load_current_round(&mut session, &resolver).await;
    let placed = GeoPoint { lat: 0.0027, lng: 0.0 };
    session.place_guess(placed);
    session.submit().unwrap();

    let frozen_projection = session.projection().copied();
    assert!(!session.place_guess(GeoPoint { lat: 0.05, lng: 0.05 }));
    assert_eq!(session.guess(), Some(placed));
    assert_eq!(session.projection().copied(), frozen_projection);
    assert_eq!(session.phase(), Some(RoundPhase::Submitted));
}

#[tokio::test]
async fn guess_during_loading_is_rejected() {
    let mut session =
        GameSession::start(pool(&["Avenida de Mayo"]), 1, &mut rng()).unwrap();
    assert_eq!(session.phase(), Some(RoundPhase::Loading));
    assert!(!session.place_guess(GeoPoint { lat: 0.0, lng: 0.0 }));
    assert!(session.submit().is_none());
}

#[tokio::test]
async fn advance_is_a_noop_before_submission() {
    let resolver = three_street_resolver();
    let mut session =
        GameSession::start(pool(&["Avenida de Mayo"]), 1, &mut rng()).unwrap();

    assert!(!session.advance());
    load_current_round(&mut session, &resolver).await;
    assert!(!session.advance());
    session.place_guess(GeoPoint { lat: 0.0027, lng: 0.0 });
    assert!(!session.advance());

    session.submit().unwrap();
    assert!(session.advance());
    assert!(session.is_complete());
}

#[tokio::test]
async fn undersized_pool_fails_to_start() {
    let err = GameSession::start(pool(&["Avenida de Mayo", "Florida"]), 3, &mut rng())
        .unwrap_err();
    assert!(matches!(
        err,
        QuizError::InsufficientPool { available: 2, requested: 3 }
    ));
}

#[tokio::test]
async fn restart_discards_results_and_resamples() {
    let resolver = three_street_resolver();
    let names = pool(&["Avenida de Mayo", "Florida", "Defensa"]);
    let mut session = GameSession::start(names, 3, &mut rng()).unwrap();

    load_current_round(&mut session, &resolver).await;
    let street = session.current_street().unwrap().to_owned();
    session.place_guess(guess_for(&street));
    session.submit().unwrap();
    assert_eq!(session.results().len(), 1);

    session.restart(&mut rng()).unwrap();
    assert!(session.results().is_empty());
    assert_eq!(session.total_score_km(), 0.0);
    assert_eq!(session.round_number(), 0);
    assert_eq!(session.phase(), Some(RoundPhase::Loading));
    assert!(!session.is_complete());
}

// =========================================================================
// Stale resolution guard
// =========================================================================

#[tokio::test]
async fn stale_resolution_is_discarded_after_advance() {
    let resolver = three_street_resolver();
    let mut session =
        GameSession::start(pool(&["Avenida de Mayo", "Florida"]), 2, &mut rng()).unwrap();

    // Capture round 0's token as if its fetch were still in flight.
    let stale_token = session.round_token().unwrap();

    load_current_round(&mut session, &resolver).await;
    let street = session.current_street().unwrap().to_owned();
    session.place_guess(guess_for(&street));
    session.submit().unwrap();
    session.advance();

    // The slow fetch for round 0 finally lands. It must not touch round 1.
    let late = Geometry::from_lon_lat(equator_line()).unwrap();
    assert!(!session.apply_resolution(stale_token, Ok(late)));
    assert_eq!(session.phase(), Some(RoundPhase::Loading));
    assert!(session.geometry().is_none());
}

#[tokio::test]
async fn stale_resolution_is_discarded_after_restart() {
    let mut session =
        GameSession::start(pool(&["Avenida de Mayo"]), 1, &mut rng()).unwrap();

    let stale_token = session.round_token().unwrap();
    session.restart(&mut rng()).unwrap();

    let late = Geometry::from_lon_lat(equator_line()).unwrap();
    assert!(!session.apply_resolution(stale_token, Ok(late)));
    assert_eq!(session.phase(), Some(RoundPhase::Loading));
    assert!(session.geometry().is_none());
}

#[tokio::test]
async fn duplicate_resolution_for_the_same_round_is_ignored() {
    let resolver = three_street_resolver();
    let mut session =
        GameSession::start(pool(&["Avenida de Mayo"]), 1, &mut rng()).unwrap();

    let token = session.round_token().unwrap();
    load_current_round(&mut session, &resolver).await;
    assert_eq!(session.phase(), Some(RoundPhase::AwaitingGuess));

    // A second outcome for the same token arrives after the first applied.
    assert!(!session.apply_resolution(
        token,
        Err(QuizError::GeometryUnavailable("late timeout".into()))
    ));
    assert_eq!(session.phase(), Some(RoundPhase::AwaitingGuess));
}

// =========================================================================
// Failure and retry
// =========================================================================

#[tokio::test]
async fn failed_resolution_parks_the_round_until_retry() {
    let mut session =
        GameSession::start(pool(&["Avenida de Mayo"]), 1, &mut rng()).unwrap();

    load_current_round(&mut session, &UnreachableResolver).await;
    assert_eq!(session.phase(), Some(RoundPhase::Failed));
    assert!(matches!(
        session.error(),
        Some(QuizError::GeometryUnavailable(_))
    ));

    // Stuck: no guessing, no advancing, no silent skip.
    assert!(!session.place_guess(GeoPoint { lat: 0.0, lng: 0.0 }));
    assert!(!session.advance());

    // Retry re-enters Loading; a healthy resolver then unblocks the round.
    assert!(session.retry());
    assert_eq!(session.phase(), Some(RoundPhase::Loading));
    load_current_round(&mut session, &three_street_resolver()).await;
    assert_eq!(session.phase(), Some(RoundPhase::AwaitingGuess));
}

#[tokio::test]
async fn not_found_street_surfaces_in_the_round_error() {
    let resolver = MapResolver::empty();
    let mut session = GameSession::start(pool(&["Calle Inventada"]), 1, &mut rng()).unwrap();

    load_current_round(&mut session, &resolver).await;
    assert_eq!(session.phase(), Some(RoundPhase::Failed));
    assert!(matches!(
        session.error(),
        Some(QuizError::NotFound { street }) if street == "Calle Inventada"
    ));
}

// =========================================================================
// Tiered store
// =========================================================================

#[tokio::test]
async fn precomputed_hit_never_queries_the_live_tier() {
    let precomputed = Arc::new(three_street_resolver());
    let live = Arc::new(MapResolver::empty());
    let store = GeometryStore::from_tiers(vec![
        Box::new(precomputed.clone()),
        Box::new(live.clone()),
    ]);

    let names = pool(&["Avenida de Mayo", "Florida", "Defensa"]);
    let mut session = GameSession::start(names, 3, &mut rng()).unwrap();
    while !session.is_complete() {
        load_current_round(&mut session, &store).await;
        let street = session.current_street().unwrap().to_owned();
        session.place_guess(guess_for(&street));
        session.submit().unwrap();
        session.advance();
    }

    assert_eq!(precomputed.requests(), 3);
    assert_eq!(live.requests(), 0);
}

#[tokio::test]
async fn cache_miss_falls_through_to_the_live_tier() {
    let precomputed = Arc::new(MapResolver::empty());
    let live = Arc::new(MapResolver::new(&[("Florida", equator_line())]));
    let store = GeometryStore::from_tiers(vec![
        Box::new(precomputed.clone()),
        Box::new(live.clone()),
    ]);

    assert!(store.resolve("Florida").await.is_ok());
    assert_eq!(precomputed.requests(), 1);
    assert_eq!(live.requests(), 1);
}

#[tokio::test]
async fn miss_in_every_tier_is_not_found() {
    let store = GeometryStore::from_tiers(vec![
        Box::new(MapResolver::empty()),
        Box::new(MapResolver::empty()),
    ]);
    assert!(matches!(
        store.resolve("Calle Inventada").await,
        Err(QuizError::NotFound { street }) if street == "Calle Inventada"
    ));
}

#[tokio::test]
async fn live_tier_outage_surfaces_as_unavailable() {
    let store = GeometryStore::from_tiers(vec![
        Box::new(MapResolver::empty()),
        Box::new(UnreachableResolver),
    ]);
    assert!(matches!(
        store.resolve("Florida").await,
        Err(QuizError::GeometryUnavailable(_))
    ));
}
