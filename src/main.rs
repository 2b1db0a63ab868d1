//! Minimal host binary: wires the engine to a small fixed galaxy, lets bots
//! run unattended, and logs the best-effort event feed. Ship movement,
//! collision, and the network layer are an external collaborator's job; this
//! binary only drives the per-tick decision loop.

use std::time::Duration;

use glam::Vec2;
use netrek_bot_engine::world::{Planet, PlanetKind, Team};
use netrek_bot_engine::{Engine, EngineEvent, ShipClass, TUNING};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn sample_galaxy() -> Vec<Planet> {
    let mut home_fed = Planet::new(0, "Earth", Vec2::new(-40_000.0, 0.0));
    home_fed.owner = Some(Team::Federation);
    home_fed.armies = 15;
    home_fed.kinds = vec![PlanetKind::Home, PlanetKind::Repair, PlanetKind::Fuel];

    let mut home_kli = Planet::new(1, "Klingus", Vec2::new(40_000.0, 0.0));
    home_kli.owner = Some(Team::Klingon);
    home_kli.armies = 15;
    home_kli.kinds = vec![PlanetKind::Home, PlanetKind::Repair, PlanetKind::Fuel];

    let mut contested = Planet::new(2, "Crossroads", Vec2::new(0.0, 20_000.0));
    contested.armies = 5;
    contested.kinds = vec![PlanetKind::Agricultural];

    vec![home_fed, home_kli, contested]
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let engine = std::sync::Arc::new(Engine::new(sample_galaxy(), TUNING, 0xC0FFEE));

    for _ in 0..3 {
        if let Err(e) = engine.add_bot(Team::Federation, ShipClass::Cruiser) {
            tracing::warn!(error = %e, "failed to seed Federation bot");
        }
    }
    for _ in 0..3 {
        if let Err(e) = engine.add_bot(Team::Klingon, ShipClass::Destroyer) {
            tracing::warn!(error = %e, "failed to seed Klingon bot");
        }
    }
    if let Err(e) = engine.add_bot(Team::Federation, ShipClass::Starbase) {
        tracing::warn!(error = %e, "failed to seed Federation starbase");
    }

    let mut events = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                EngineEvent::Chat(text) => info!(%text, "chat"),
                EngineEvent::Death { victim, killer } => info!(victim, ?killer, "death"),
                EngineEvent::PhaserVisual { from, outcome, .. } => {
                    info!(from, ?outcome, "phaser")
                }
                EngineEvent::Victory {
                    text,
                    winner,
                    win_type,
                } => info!(%text, winner, win_type, "victory"),
            }
        }
    });

    let loop_handle = tokio::spawn(engine.clone().run(Duration::from_millis(100)));

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for shutdown signal");
    info!("shutdown requested");
    engine.shutdown();
    let _ = loop_handle.await;
}
