//! Per-tick bot AI orchestration: dispatches each bot to the planet-role FSM
//! or the starbase controller, then applies deferred team-coordination
//! suggestions once every bot has moved (§2, §4.11).

pub mod coordination;
pub mod evasion;
pub mod maneuver;
pub mod planets;
pub mod separation;
pub mod shields;
pub mod starbase;
pub mod targeting;
pub mod threat;
pub mod victory;
pub mod weapons;

use crate::config::AiTuning;
use crate::world::{PlayerSlot, ShipClass, World};
use rand_chacha::ChaCha8Rng;

use coordination::buffer_target_suggestions;
use targeting::TargetSuggestion;

/// Runs one bot's full decision for this tick, routing to the stationary
/// starbase controller (no cooldown precondition -- it always re-aims and
/// re-fires) or the mobile planet-role FSM, which only runs with cooldown at
/// 0; otherwise the bot yields by returning immediately, ticking its
/// cooldown down and leaving its prior desired direction/speed in place
/// (§4.9 preconditions, §5 Cancellation).
fn run_bot_tick(tuning: &AiTuning, world: &mut World, rng: &mut ChaCha8Rng, bot_id: usize) {
    match world.players[bot_id].ship_class {
        ShipClass::Starbase => starbase::run_starbase_controller(tuning, world, rng, bot_id),
        _ => {
            let bot = &mut world.players[bot_id];
            if bot.bot_cooldown > 0 {
                bot.bot_cooldown -= 1;
                return;
            }
            planets::run_planet_fsm(tuning, world, rng, bot_id)
        }
    }
}

fn pending_suggestions_for(
    tuning: &AiTuning,
    world: &mut World,
    bot: &PlayerSlot,
) -> Vec<TargetSuggestion> {
    let target_id = bot.bot_target;
    if target_id < 0 {
        return Vec::new();
    }
    let score = bot.bot_target_value;
    buffer_target_suggestions(tuning, world, bot.id, target_id as usize, score)
}

/// Advances every live bot by one tick, in ascending slot order, then applies
/// every suggestion buffered during the tick so no bot's own target choice is
/// ever preempted mid-sweep by an ally running later in the same pass (§8.7).
pub fn update_bots(tuning: &AiTuning, world: &mut World, rng: &mut ChaCha8Rng) {
    let bot_ids: Vec<usize> = world
        .players
        .iter()
        .filter(|p| p.is_alive() && p.is_bot)
        .map(|p| p.id)
        .collect();

    let mut suggestions = Vec::new();

    for bot_id in bot_ids {
        run_bot_tick(tuning, world, rng, bot_id);

        let bot = world.players[bot_id].clone();
        suggestions.extend(pending_suggestions_for(tuning, world, &bot));
    }

    coordination::apply_pending_target_suggestions(world, &suggestions);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TUNING;
    use crate::world::planet::Planet;
    use crate::world::player::{PlayerStatus, Team};
    use glam::Vec2;
    use rand::SeedableRng;

    #[test]
    fn update_bots_skips_dead_and_non_bot_players() {
        let mut world = World::new(vec![Planet::new(0, "Sol", Vec2::ZERO)], 1);
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[0].is_bot = false;

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        update_bots(&TUNING, &mut world, &mut rng);

        // A non-bot player's desired direction/speed are left untouched.
        assert_eq!(world.players[0].desired_speed, 0.0);
    }

    #[test]
    fn bot_on_cooldown_yields_without_running_the_role_fsm() {
        let mut world = World::new(vec![Planet::new(0, "Sol", Vec2::ZERO)], 1);
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[0].is_bot = true;
        world.players[0].fuel = world.players[0].max_fuel();
        world.players[0].position = Vec2::new(1_000.0, 1_000.0);
        world.players[0].direction = 1.5;
        world.players[0].desired_direction = 1.5;
        world.players[0].bot_cooldown = 2;

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        update_bots(&TUNING, &mut world, &mut rng);

        // Still yielding: cooldown ticked down, desired direction untouched.
        assert_eq!(world.players[0].bot_cooldown, 1);
        assert_eq!(world.players[0].desired_direction, 1.5);
    }

    #[test]
    fn update_bots_runs_a_lone_bot_without_panicking() {
        let mut world = World::new(vec![Planet::new(0, "Sol", Vec2::ZERO)], 1);
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[0].is_bot = true;
        world.players[0].fuel = world.players[0].max_fuel();
        world.players[0].position = Vec2::new(1_000.0, 1_000.0);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        update_bots(&TUNING, &mut world, &mut rng);
    }
}
