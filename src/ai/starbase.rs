//! Starbase controller (component C10): the stationary variant of the role
//! FSM -- speed is always zero, priority is defend / detect / retreat-toward-
//! repair / patrol-phasers (§4.10).

use crate::config::AiTuning;
use crate::geometry;
use crate::world::{PlayerSlot, World};
use rand_chacha::ChaCha8Rng;

use super::planets::{apply_safe_navigation, get_threatened_friendly_planet};
use super::weapons::{can_torp_reach_target, fire_bot_plasma, fire_bot_torpedo, fire_phaser_at_ship, phaser_range};
use crate::world::player::NONE;

/// Finds the closest enemy within detection range, if any.
fn detect_closest_enemy(tuning: &AiTuning, world: &World, starbase: &PlayerSlot) -> Option<usize> {
    world
        .alive_enemies_of(starbase.team)
        .map(|e| (e.id, e.position.distance(starbase.position)))
        .filter(|(_, d)| *d <= tuning.starbase_detect_range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Faces and engages `target_id` with the starbase weapon policy: torpedoes
/// when nearly bore-sighted, phasers in range, plasma at mid-range (§4.10).
fn engage_with_starbase_weapons(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
    target_id: usize,
) -> f32 {
    let starbase = world.players[bot_id].clone();
    let target = world.players[target_id].clone();
    let distance = starbase.position.distance(target.position);
    let aim_dir = (target.position - starbase.position)
        .normalize_or_zero()
        .to_angle();

    let angle_off = geometry::angle_diff(starbase.direction, aim_dir);
    if angle_off < 0.3 && can_torp_reach_target(world, &starbase, &target, distance) {
        fire_bot_torpedo(tuning, world, rng, bot_id, target_id);
    }

    let range = phaser_range(&starbase.ship_class.stats());
    if distance <= range
        && (target.damage_ratio() > 0.5 || distance < 4_000.0)
        && angle_off < tuning.starbase_fire_angle
    {
        fire_phaser_at_ship(tuning, world, bot_id, target_id);
    }
    if distance <= tuning.starbase_plasma_band {
        fire_bot_plasma(tuning, world, bot_id, target_id);
    }

    aim_dir
}

/// Runs the starbase controller for one tick. A starbase never moves under
/// its own power -- `desired_speed` is always zero -- but it still turns to
/// track its engagement angle and runs the shared shield assessment. Defense
/// of a bombed friendly planet takes priority over opportunistic engagement,
/// matching the dispatch order of the combat-ship role FSM (§4.9 step 1).
pub fn run_starbase_controller(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
) {
    let starbase = world.players[bot_id].clone();

    if let Some((planet_id, enemy_id)) = get_threatened_friendly_planet(tuning, world, starbase.team) {
        world.players[bot_id].bot_defense_target = planet_id as i32;
        let aim_dir = engage_with_starbase_weapons(tuning, world, rng, bot_id, enemy_id);
        apply_safe_navigation(tuning, world, rng, bot_id, aim_dir, 0.0);
        return;
    }
    world.players[bot_id].bot_defense_target = NONE;

    let Some(target_id) = detect_closest_enemy(tuning, world, &starbase) else {
        apply_safe_navigation(tuning, world, rng, bot_id, starbase.direction, 0.0);
        return;
    };

    let aim_dir = engage_with_starbase_weapons(tuning, world, rng, bot_id, target_id);
    apply_safe_navigation(tuning, world, rng, bot_id, aim_dir, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TUNING;
    use crate::world::planet::Planet;
    use crate::world::player::{PlayerStatus, Team};
    use crate::world::ShipClass;
    use glam::Vec2;
    use rand::SeedableRng;

    fn base_world() -> World {
        World::new(vec![Planet::new(0, "Sol", Vec2::ZERO)], 8)
    }

    #[test]
    fn starbase_never_moves_even_with_a_target_in_range() {
        let mut world = base_world();
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[0].ship_class = ShipClass::Starbase;
        world.players[0].fuel = world.players[0].max_fuel();
        world.players[0].position = Vec2::ZERO;

        world.players[1].status = PlayerStatus::Alive;
        world.players[1].team = Team::Klingon;
        world.players[1].position = Vec2::new(3_000.0, 0.0);

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        run_starbase_controller(&TUNING, &mut world, &mut rng, 0);

        assert_eq!(world.players[0].desired_speed, 0.0);
    }

    #[test]
    fn defends_a_bombed_friendly_planet_over_opportunistic_engagement() {
        let mut world = base_world();
        world.planets[0].owner = Some(Team::Federation);
        world.planets[0].armies = 5;

        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[0].ship_class = ShipClass::Starbase;
        world.players[0].fuel = world.players[0].max_fuel();
        world.players[0].position = Vec2::new(-8_000.0, 0.0);

        world.players[1].status = PlayerStatus::Alive;
        world.players[1].team = Team::Klingon;
        world.players[1].position = Vec2::new(500.0, 0.0);
        world.players[1].direction = std::f32::consts::PI;
        world.players[1].speed = 3.0;

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        run_starbase_controller(&TUNING, &mut world, &mut rng, 0);

        assert_eq!(world.players[0].bot_defense_target, 0);
    }

    #[test]
    fn idles_facing_forward_when_no_enemy_is_in_detection_range() {
        let mut world = base_world();
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[0].ship_class = ShipClass::Starbase;
        world.players[0].fuel = world.players[0].max_fuel();
        world.players[0].direction = 1.0;
        world.players[0].position = Vec2::ZERO;

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        run_starbase_controller(&TUNING, &mut world, &mut rng, 0);

        assert_eq!(world.players[0].desired_speed, 0.0);
    }
}
