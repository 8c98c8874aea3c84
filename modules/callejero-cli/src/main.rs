//! Terminal driver for the street quiz. Thin by design: every rule lives in
//! the engine, this loop only renders state and forwards commands.

use std::io::{self, BufRead};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use callejero_core::{Config, GeoPoint};
use callejero_engine::{
    load_current_round, load_name_pool, GameSession, GeometryStore, LiveResolver,
    PrecomputedStore, RoundPhase,
};
use overpass_client::OverpassClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("callejero_engine=info".parse()?),
        )
        .init();

    let config = Config::from_env();
    let pool = load_name_pool(&config.street_names_path)?;
    tracing::info!(streets = pool.len(), rounds = config.total_rounds, "Loaded name pool");

    let store = GeometryStore::new(
        PrecomputedStore::new(&config.street_geometries_path),
        LiveResolver::new(OverpassClient::new(
            &config.overpass_url,
            &config.overpass_area,
        )),
    );

    let mut rng = rand::rng();
    let mut session = GameSession::start(pool, config.total_rounds, &mut rng)?;

    println!("callejero — locate the street.");
    println!("Guess with `lat,lng`. Commands: s = submit, n = next, r = retry, q = quit.");

    let stdin = io::stdin();
    let mut input = stdin.lock().lines();

    loop {
        if session.is_complete() {
            print_scoreboard(&session);
            println!("Play again? (y/n)");
            match read_line(&mut input)?.as_deref() {
                Some("y") => session.restart(&mut rng)?,
                _ => break,
            }
            continue;
        }

        match session.phase() {
            Some(RoundPhase::Loading) => {
                println!(
                    "\n[{}/{}] {}",
                    session.round_number() + 1,
                    session.round_count(),
                    session.current_street().unwrap_or_default()
                );
                load_current_round(&mut session, &store).await;
            }
            Some(RoundPhase::Failed) => {
                if let Some(error) = session.error() {
                    println!("Could not load this street: {error}");
                }
                println!("r = retry, q = quit");
                match read_line(&mut input)?.as_deref() {
                    Some("r") => {
                        session.retry();
                    }
                    Some("q") | None => break,
                    _ => {}
                }
            }
            Some(RoundPhase::AwaitingGuess | RoundPhase::GuessPlaced) => {
                if let Some(guess) = session.guess() {
                    println!("Guess at {:.4},{:.4} — replace it or `s` to submit.", guess.lat, guess.lng);
                } else {
                    println!("Where is it? Enter `lat,lng`.");
                }
                match read_line(&mut input)?.as_deref() {
                    Some("s") => {
                        if let Some(result) = session.submit() {
                            println!("Off by {:.1} km.", result.error_km);
                        }
                    }
                    Some("q") | None => break,
                    Some(line) => match parse_point(line) {
                        Some(point) => {
                            session.place_guess(point);
                        }
                        None => println!("Didn't understand that. Try `-34.60,-58.38`."),
                    },
                }
            }
            Some(RoundPhase::Submitted) => {
                println!("n = next round, q = quit");
                match read_line(&mut input)?.as_deref() {
                    Some("n") => {
                        session.advance();
                    }
                    Some("q") | None => break,
                    _ => {}
                }
            }
            None => unreachable!("handled by is_complete"),
        }
    }

    Ok(())
}

fn read_line(input: &mut impl Iterator<Item = io::Result<String>>) -> Result<Option<String>> {
    match input.next() {
        Some(line) => Ok(Some(line?.trim().to_string())),
        None => Ok(None),
    }
}

fn parse_point(line: &str) -> Option<GeoPoint> {
    let (lat, lng) = line.split_once(',')?;
    Some(GeoPoint {
        lat: lat.trim().parse().ok()?,
        lng: lng.trim().parse().ok()?,
    })
}

fn print_scoreboard(session: &GameSession) {
    println!("\nGame finished!");
    for result in session.results() {
        println!("  {:<40} {:>6.1} km", result.street, result.error_km);
    }
    println!("  {:<40} {:>6.1} km", "Total", session.total_score_km());
}
