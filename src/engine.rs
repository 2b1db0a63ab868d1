//! Runtime shell (component C13): the shared world lock, the fixed-cadence
//! tick loop, broadcast fan-out, and the external AddBot/RemoveBot/UpdateBots
//! surface that server glue drives (§5.1, §6).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ai;
use crate::ai::victory::{check_victory, VictoryResult};
use crate::config::AiTuning;
use crate::error::{EngineError, EngineResult};
use crate::world::planet::{Planet, PlanetKind};
use crate::world::player::NONE;
use crate::world::{PlayerStatus, ShipClass, Team, World};

/// Outcome of a phaser shot, for the best-effort visual broadcast (§6).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PhaserOutcome {
    Hit(usize),
    Miss,
    PlasmaHit,
}

/// Best-effort events fanned out to clients; a lagging subscriber just misses
/// older ones (`broadcast::Receiver::recv` returns `RecvError::Lagged`), which
/// is the "drop if full" semantics the spec calls for.
#[derive(Clone, Debug)]
pub enum EngineEvent {
    PhaserVisual {
        from: usize,
        outcome: PhaserOutcome,
        position: Option<Vec2>,
        range: f32,
    },
    Death {
        victim: usize,
        killer: Option<usize>,
    },
    Chat(String),
    Victory {
        text: String,
        winner: u8,
        win_type: &'static str,
    },
}

const EVENT_CHANNEL_CAPACITY: usize = 256;
const BOT_SHIP_ROTATION: [ShipClass; 4] = [
    ShipClass::Destroyer,
    ShipClass::Cruiser,
    ShipClass::Battleship,
    ShipClass::Assault,
];

pub struct Engine {
    world: Arc<Mutex<World>>,
    tuning: AiTuning,
    events: broadcast::Sender<EngineEvent>,
    cancel: CancellationToken,
    /// Optional external deadline; the spec leaves the timeout timer itself
    /// to server glue, so this is the minimal knob `UpdateBots` needs to
    /// evaluate the Timeout victory condition without owning a wall clock.
    timeout_frame: Option<u64>,
}

impl Engine {
    pub fn new(planets: Vec<Planet>, tuning: AiTuning, seed: u64) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            world: Arc::new(Mutex::new(World::new(planets, seed))),
            tuning,
            events,
            cancel: CancellationToken::new(),
            timeout_frame: None,
        }
    }

    pub fn set_timeout_frame(&mut self, frame: Option<u64>) {
        self.timeout_frame = frame;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn world(&self) -> Arc<Mutex<World>> {
        Arc::clone(&self.world)
    }

    fn lock_world(&self) -> std::sync::MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(|poisoned| {
            warn!("world lock was poisoned by a prior panic; recovering in place");
            poisoned.into_inner()
        })
    }

    fn team_home_position(world: &World, team: Team) -> Vec2 {
        world
            .planets
            .iter()
            .find(|p| p.owned_by(team) && p.is(PlanetKind::Home))
            .map(|p| p.position)
            .unwrap_or_else(|| {
                let i = Team::ALL.iter().position(|t| *t == team).unwrap_or(0) as f32;
                Vec2::new(10_000.0 + i * 20_000.0, 10_000.0 + i * 20_000.0)
            })
    }

    /// Allocates a free slot, initializes it as a live bot near its team's
    /// home, and announces the join (§6).
    pub fn add_bot(&self, team: Team, ship_class: ShipClass) -> EngineResult<usize> {
        let mut world = self.lock_world();
        let capacity = world.players.len();
        let id = world.free_slot().ok_or(EngineError::NoFreeSlot { capacity })?;

        let home = Self::team_home_position(&world, team);
        let offset = Vec2::new(
            world.rng.gen_range(-3_000.0..=3_000.0),
            world.rng.gen_range(-3_000.0..=3_000.0),
        );

        if !world.teams_seen.contains(&team) {
            world.teams_seen.push(team);
        }

        let bot = &mut world.players[id];
        bot.status = PlayerStatus::Alive;
        bot.team = team;
        bot.ship_class = ship_class;
        bot.is_bot = true;
        bot.name = format!("Bot{id}");
        bot.position = home + offset;
        bot.fuel = bot.max_fuel();
        bot.damage = 0.0;
        bot.bot_target = NONE;
        bot.bot_defense_target = NONE;
        bot.bot_planet_approach_id = NONE;

        info!(bot_id = id, ?team, ?ship_class, "bot added");
        let _ = self.events.send(EngineEvent::Chat(format!(
            "{} has joined the {team:?} team",
            world.players[id].name
        )));

        Ok(id)
    }

    /// Frees a bot's slot and announces the departure (§6).
    pub fn remove_bot(&self, id: usize) -> EngineResult<()> {
        let mut world = self.lock_world();
        let capacity = world.players.len();
        let slot = world.players.get(id).ok_or(EngineError::SlotOutOfRange(id))?;
        if !slot.is_bot {
            return Err(EngineError::NotABot(id));
        }
        let name = slot.name.clone();
        let _ = capacity;

        world.players[id].reset_to_free();
        info!(bot_id = id, "bot removed");
        let _ = self.events.send(EngineEvent::Chat(format!("{name} has left")));
        Ok(())
    }

    /// Tops up the most-populated human team with bots, following the ship
    /// mix policy in §6: a destroyer/cruiser/battleship/assault rotation,
    /// floors of two destroyers and two cruisers, one assault once the team
    /// exceeds three bots, and a uniform draw afterward.
    pub fn auto_balance_bots(&self) -> EngineResult<Vec<usize>> {
        let target_team = {
            let world = self.lock_world();
            let mut counts: std::collections::HashMap<Team, u32> = std::collections::HashMap::new();
            for p in world.players.iter().filter(|p| p.is_alive() && !p.is_bot) {
                *counts.entry(p.team).or_insert(0) += 1;
            }
            counts.into_iter().max_by_key(|(_, c)| *c).map(|(t, _)| t)
        };

        let Some(team) = target_team else {
            return Ok(Vec::new());
        };

        let existing_bots = {
            let world = self.lock_world();
            world
                .players
                .iter()
                .filter(|p| p.is_alive() && p.is_bot && p.team == team)
                .map(|p| p.ship_class)
                .collect::<Vec<_>>()
        };

        let mut added = Vec::new();
        let destroyers = existing_bots.iter().filter(|c| **c == ShipClass::Destroyer).count();
        let cruisers = existing_bots.iter().filter(|c| **c == ShipClass::Cruiser).count();
        let assaults = existing_bots.iter().filter(|c| **c == ShipClass::Assault).count();
        let total = existing_bots.len();

        let class = if total == 0 {
            BOT_SHIP_ROTATION[0]
        } else if destroyers < 2 {
            ShipClass::Destroyer
        } else if cruisers < 2 {
            ShipClass::Cruiser
        } else if total > 3 && assaults == 0 {
            ShipClass::Assault
        } else {
            let mut world = self.lock_world();
            let pick = world.rng.gen_range(0..5);
            drop(world);
            [
                ShipClass::Scout,
                ShipClass::Destroyer,
                ShipClass::Cruiser,
                ShipClass::Battleship,
                ShipClass::Assault,
            ][pick]
        };

        added.push(self.add_bot(team, class)?);
        Ok(added)
    }

    /// Processes one tick: advances every live bot, applies deferred target
    /// suggestions (see [`Self::apply_pending_target_suggestions`] for why
    /// that's also exposed separately), and checks victory (§5, §6).
    pub fn update_bots(&self) -> Option<VictoryResult> {
        let mut world = self.lock_world();
        world.frame += 1;

        // `World` owns its rng, so a plain `&mut world.rng` alongside `&mut
        // world` would double-borrow; swap it out for the call and back.
        let mut rng = std::mem::replace(&mut world.rng, ChaCha8Rng::seed_from_u64(0));
        ai::update_bots(&self.tuning, &mut world, &mut rng);
        world.rng = rng;

        let timed_out = self
            .timeout_frame
            .is_some_and(|deadline| world.frame >= deadline);

        let result = check_victory(&self.tuning, &world, timed_out);
        if let Some(victory) = result {
            let text = format!(
                "Game over: {} victory for team bitmask {}",
                victory.kind.as_str(),
                victory.winner
            );
            info!(winner = victory.winner, kind = victory.kind.as_str(), "victory detected");
            let _ = self.events.send(EngineEvent::Victory {
                text,
                winner: victory.winner,
                win_type: victory.kind.as_str(),
            });
        } else {
            debug!(frame = world.frame, "tick processed, no victory");
        }

        result
    }

    /// Exposed separately from [`Self::update_bots`] for interface parity
    /// with the spec's external surface -- both stages run in the same
    /// world-lock critical section inside `update_bots`, so this is a no-op
    /// unless a future split moves target-suggestion timing off the main
    /// tick (documented decision, see DESIGN.md).
    pub fn apply_pending_target_suggestions(&self) {}

    /// Schedules the post-victory world reset after the configured delay,
    /// cancellable via this engine's token on shutdown (§4.12, §5.1).
    pub fn schedule_victory_reset(&self) {
        let world = Arc::clone(&self.world);
        let delay = Duration::from_secs(self.tuning.victory_reset_delay_secs);
        let cancel = self.cancel.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    let mut world = world.lock().unwrap_or_else(|p| p.into_inner());
                    world.reset();
                    info!("world reset after victory");
                    let _ = events.send(EngineEvent::Chat("A new game begins.".to_string()));
                }
                _ = cancel.cancelled() => {
                    info!("victory reset cancelled by shutdown");
                }
            }
        });
    }

    /// Runs the fixed-cadence tick loop until cancelled (§5, §5.1).
    pub async fn run(self: Arc<Self>, tick_rate: Duration) {
        let mut interval = tokio::time::interval(tick_rate);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Some(_victory) = self.update_bots() {
                        self.schedule_victory_reset();
                    }
                }
                _ = self.cancel.cancelled() => {
                    info!("engine tick loop shutting down");
                    break;
                }
            }
        }
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TUNING;
    use glam::Vec2;

    fn sample_planets() -> Vec<Planet> {
        vec![Planet::new(0, "Sol", Vec2::ZERO)]
    }

    #[test]
    fn add_bot_places_it_near_team_home_and_marks_alive() {
        let engine = Engine::new(sample_planets(), TUNING, 42);
        let id = engine.add_bot(Team::Federation, ShipClass::Cruiser).unwrap();
        let world = engine.lock_world();
        assert!(world.players[id].is_alive());
        assert!(world.players[id].is_bot);
        assert_eq!(world.players[id].ship_class, ShipClass::Cruiser);
    }

    #[test]
    fn add_bot_fails_once_every_slot_is_taken() {
        let engine = Engine::new(sample_planets(), TUNING, 1);
        for _ in 0..crate::world::MAX_PLAYERS {
            engine.add_bot(Team::Federation, ShipClass::Scout).unwrap();
        }
        let result = engine.add_bot(Team::Federation, ShipClass::Scout);
        assert!(matches!(result, Err(EngineError::NoFreeSlot { .. })));
    }

    #[test]
    fn remove_bot_rejects_a_non_bot_slot() {
        let engine = Engine::new(sample_planets(), TUNING, 1);
        let result = engine.remove_bot(0);
        assert!(matches!(result, Err(EngineError::NotABot(0))));
    }

    #[test]
    fn remove_bot_frees_a_previously_added_slot() {
        let engine = Engine::new(sample_planets(), TUNING, 1);
        let id = engine.add_bot(Team::Klingon, ShipClass::Scout).unwrap();
        engine.remove_bot(id).unwrap();
        let world = engine.lock_world();
        assert_eq!(world.players[id].status, PlayerStatus::Free);
    }

    #[test]
    fn update_bots_advances_the_frame_counter() {
        let engine = Engine::new(sample_planets(), TUNING, 1);
        engine.add_bot(Team::Federation, ShipClass::Cruiser).unwrap();
        engine.update_bots();
        let world = engine.lock_world();
        assert_eq!(world.frame, 1);
    }

    #[test]
    fn update_bots_reports_conquest_once_timeout_and_ownership_conditions_are_met() {
        let mut planets = sample_planets();
        planets[0].owner = Some(Team::Federation);
        let mut engine = Engine::new(planets, TUNING, 1);
        engine.set_timeout_frame(Some(1));
        engine.add_bot(Team::Federation, ShipClass::Cruiser).unwrap();
        engine.add_bot(Team::Klingon, ShipClass::Cruiser).unwrap();

        {
            let mut world = engine.lock_world();
            world.frame = TUNING.victory_min_frame + 1;
        }

        let result = engine.update_bots();
        assert!(result.is_some());
    }
}
