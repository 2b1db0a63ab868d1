//! Weapon policies (component C6): torpedo flavors, phasers, anti-plasma
//! phasing, plasma, and manual torpedo detonation.

use crate::config::AiTuning;
use crate::geometry::{self, InterceptSolution};
use crate::world::player::NONE;
use crate::world::projectile::{new_plasma, new_torpedo, Plasma, ProjectileStatus, Torpedo};
use crate::world::{PlayerSlot, World};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TorpedoFlavor {
    Single,
    Spread(u32),
    Burst,
}

/// Firing preconditions shared by every weapon: not cloaked, not repairing,
/// in-flight cap respected, fuel and weapon-temp headroom available.
fn can_fire_base(player: &PlayerSlot, in_flight: u32, max_in_flight: u32, fuel_cost: f32) -> bool {
    if player.cloaked || player.repairing {
        return false;
    }
    if in_flight >= max_in_flight {
        return false;
    }
    if player.fuel < fuel_cost {
        return false;
    }
    let stats = player.ship_class.stats();
    player.weapon_temp < stats.max_weapon_temp - crate::config::TUNING.weapon_temp_headroom.min(f32::MAX)
        && player.weapon_temp + fuel_cost * 0.0 < stats.max_weapon_temp
}

fn debit_firing_cost(player: &mut PlayerSlot, fuel_cost: f32, heat: f32) {
    player.fuel = (player.fuel - fuel_cost).max(0.0);
    player.weapon_temp += heat;
}

/// Chooses a torpedo flavor from range/damage state, per the §4.6 band table.
pub fn choose_torpedo_flavor(
    tuning: &AiTuning,
    shooter: &PlayerSlot,
    target: &PlayerSlot,
    distance: f32,
) -> (TorpedoFlavor, u32) {
    let stats = shooter.ship_class.stats();
    let mut adjusted_range = stats.torp_speed * stats.torp_fuse as f32 / geometry::SPEED_TO_UNITS_PER_TICK;

    let target_speed_ratio = target.speed / shooter.ship_class.stats().max_speed.max(1.0);
    if target_speed_ratio > tuning.torp_range_shrink_fast_threshold {
        adjusted_range *= tuning.torp_range_shrink_fast;
    } else if target_speed_ratio > tuning.torp_range_shrink_med_threshold {
        adjusted_range *= tuning.torp_range_shrink_med;
    }

    let ratio = (distance / adjusted_range).clamp(0.0, 2.0);
    let damage_ratio = target.damage_ratio();

    if damage_ratio > tuning.torp_burst_damage_ratio
        && distance < tuning.torp_burst_range_ratio * adjusted_range
    {
        return (TorpedoFlavor::Burst, tuning.torp_burst_cooldown);
    }

    if ratio >= tuning.torp_spread_band_lo && ratio <= tuning.torp_spread_band_hi {
        return (TorpedoFlavor::Spread(3), tuning.torp_spread_cooldown);
    }

    (TorpedoFlavor::Single, tuning.torp_single_cooldown)
}

/// Whether a torpedo fired now could plausibly reach the target before its
/// fuse expires; when the intercept solver finds no solution, firing is
/// still allowed within a conservative area-denial band (§4.6).
pub fn can_torp_reach_target(world: &World, shooter: &PlayerSlot, target: &PlayerSlot, distance: f32) -> bool {
    let stats = shooter.ship_class.stats();
    let target_vel = target_velocity(world, target);
    match geometry::solve_intercept(shooter.position, target.position, target_vel, stats.torp_speed) {
        InterceptSolution::Found { time, .. } => time <= stats.torp_fuse as f32 * stats.safety_margin,
        InterceptSolution::None => {
            let max_range = stats.torp_speed * stats.torp_fuse as f32 / geometry::SPEED_TO_UNITS_PER_TICK;
            distance <= max_range * 0.3
        }
    }
}

/// Velocity to lead a shot against: orbital motion around the planet the
/// target is circling, or a straight-line projection of heading/speed
/// otherwise (§4.1, §4.6).
fn target_velocity(world: &World, target: &PlayerSlot) -> Vec2 {
    if let Some(planet) = world.planet(target.orbiting) {
        if let Some(v) = geometry::orbital_velocity(target.position, planet.position, true) {
            return v;
        }
    }
    geometry::straight_line_velocity(target.speed, target.direction)
}

/// Fires the chosen torpedo flavor at `target`, appending new projectiles to
/// `world.torpedoes` and debiting fuel/heat/cooldown on `shooter`.
#[allow(clippy::too_many_arguments)]
pub fn fire_bot_torpedo(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    shooter_id: usize,
    target_id: usize,
) -> u32 {
    let shooter = world.players[shooter_id].clone();
    let target = world.players[target_id].clone();
    let stats = shooter.ship_class.stats();
    let distance = shooter.position.distance(target.position);

    let (flavor, cooldown) = choose_torpedo_flavor(tuning, &shooter, &target, distance);
    let count = match flavor {
        TorpedoFlavor::Single => 1,
        TorpedoFlavor::Spread(n) => n,
        TorpedoFlavor::Burst => tuning.torp_burst_count,
    };

    let fuel_cost_each = stats.torp_damage * stats.torp_fuel_mult;
    if !can_fire_base(&shooter, shooter.torps_in_flight, u32::MAX, fuel_cost_each * count as f32) {
        return 0;
    }
    if !can_torp_reach_target(world, &shooter, &target, distance) {
        return 0;
    }

    let base_dir = match geometry::solve_intercept(
        shooter.position,
        target.position,
        target_velocity(world, &target),
        stats.torp_speed,
    ) {
        InterceptSolution::Found { direction, .. } => direction,
        InterceptSolution::None => (target.position - shooter.position)
            .normalize_or_zero()
            .to_angle(),
    };

    let mut fired = 0;
    for i in 0..count {
        let spread_offset = match flavor {
            TorpedoFlavor::Spread(n) => (i as f32 - n as f32 / 2.0) * tuning.torp_spread_angle,
            _ => 0.0,
        };
        let jitter = rng.gen_range(-0.02..=0.02);
        let direction = base_dir + spread_offset + jitter;

        let id = world.next_projectile_id();
        let torp = new_torpedo(
            id,
            shooter_id as i32,
            shooter.team.flag(),
            shooter.position,
            direction,
            stats.torp_speed,
            stats.torp_damage,
            stats.torp_fuse,
        );
        world.torpedoes.push(torp);
        fired += 1;
    }

    let player = &mut world.players[shooter_id];
    debit_firing_cost(player, fuel_cost_each * fired as f32, tuning.torp_heat);
    player.torps_in_flight += fired;
    player.bot_cooldown = cooldown;
    fired
}

/// Nearest point on the segment `a -> a+dir*len` to `point`, clamped to the
/// segment -- used by both the ship-targeted and anti-plasma phaser checks.
fn closest_point_on_ray(origin: Vec2, direction: f32, max_len: f32, point: Vec2) -> (Vec2, f32) {
    let dir = Vec2::new(direction.cos(), direction.sin());
    let t = (point - origin).dot(dir).clamp(0.0, max_len);
    (origin + dir * t, t)
}

pub const PHASER_HIT_RADIUS: f32 = 250.0;

/// Fires a phaser at `target` if it is within effective range and the fire
/// condition is met; returns the damage dealt, or `None` if the shot missed
/// or firing preconditions failed.
pub fn fire_phaser_at_ship(
    tuning: &AiTuning,
    world: &mut World,
    shooter_id: usize,
    target_id: usize,
) -> Option<f32> {
    let shooter = world.players[shooter_id].clone();
    let target = world.players[target_id].clone();
    let stats = shooter.ship_class.stats();
    let range = phaser_range(&stats);
    let distance = shooter.position.distance(target.position);
    if distance > range {
        return None;
    }

    let fuel_cost = stats.phaser_damage * stats.phaser_fuel_mult;
    if !can_fire_base(&shooter, 0, u32::MAX, fuel_cost) {
        return None;
    }

    let would_kill = target.damage + stats.phaser_damage * (1.0 - distance / range) >= target.max_damage();
    let fire_condition = would_kill
        || target.damage_ratio() > tuning.phaser_fire_damage_ratio
        || distance < tuning.phaser_fire_close_range
        || target.cloaked;
    if !fire_condition {
        return None;
    }

    let aim_dir = (target.position - shooter.position).normalize_or_zero().to_angle();
    let (closest, _) = closest_point_on_ray(shooter.position, aim_dir, range, target.position);
    let hit = closest.distance(target.position) <= PHASER_HIT_RADIUS;

    let player = &mut world.players[shooter_id];
    debit_firing_cost(player, fuel_cost, tuning.phaser_heat);
    player.bot_cooldown = player.bot_cooldown.max(1);

    if hit {
        Some(stats.phaser_damage * (1.0 - distance / range))
    } else {
        None
    }
}

pub fn phaser_range(stats: &crate::world::ship_class::ShipClassStats) -> f32 {
    const PHASER_DIST: f32 = 5_000.0;
    PHASER_DIST * stats.phaser_damage / 100.0
}

/// Anti-plasma phaser: targets an incoming enemy plasma rather than a ship.
pub fn fire_phaser_at_plasma(
    tuning: &AiTuning,
    world: &mut World,
    shooter_id: usize,
    plasma_index: usize,
) -> bool {
    let shooter = world.players[shooter_id].clone();
    let stats = shooter.ship_class.stats();
    let range = phaser_range(&stats);

    let Some(plasma) = world.plasmas.get(plasma_index) else {
        return false;
    };
    let distance = shooter.position.distance(plasma.position);
    if distance > range {
        return false;
    }

    let fuel_cost = stats.phaser_damage * stats.phaser_fuel_mult;
    if !can_fire_base(&shooter, 0, u32::MAX, fuel_cost) {
        return false;
    }

    let aim_dir = (plasma.position - shooter.position).normalize_or_zero().to_angle();
    let (closest, _) = closest_point_on_ray(shooter.position, aim_dir, range, plasma.position);
    const PLASMA_HIT_RADIUS: f32 = 180.0;
    let hit = closest.distance(plasma.position) <= PLASMA_HIT_RADIUS;

    let player = &mut world.players[shooter_id];
    debit_firing_cost(player, fuel_cost, tuning.phaser_heat);

    if hit {
        world.plasmas[plasma_index].status = ProjectileStatus::Detonating;
    }
    hit
}

/// Fires a plasma torpedo if preconditions and the band policy (§4.6) allow.
pub fn fire_bot_plasma(
    tuning: &AiTuning,
    world: &mut World,
    shooter_id: usize,
    target_id: usize,
) -> bool {
    let shooter = world.players[shooter_id].clone();
    let target = world.players[target_id].clone();
    let stats = shooter.ship_class.stats();
    if !stats.has_plasma {
        return false;
    }
    if shooter.plasmas_in_flight >= 1 {
        return false;
    }

    let max_range = stats.plasma_speed * stats.plasma_fuse as f32 / geometry::SPEED_TO_UNITS_PER_TICK;
    let distance = shooter.position.distance(target.position);
    if distance > max_range {
        return false;
    }

    let stationary_window = target.speed < target.ship_class.stats().max_speed * 0.2
        && distance > tuning.maneuver_mid_band
        && distance < tuning.maneuver_far_band;
    let finisher = target.damage_ratio() > tuning.plasma_finisher_damage_ratio
        && distance < tuning.plasma_finisher_range_ratio * max_range;
    let orbiting_window = target.is_orbiting() && distance < tuning.plasma_orbit_range_ratio * max_range;

    if !(stationary_window || finisher || orbiting_window) {
        return false;
    }

    let fuel_cost = stats.plasma_damage * stats.plasma_fuel_mult;
    if !can_fire_base(&shooter, 0, u32::MAX, fuel_cost) {
        return false;
    }

    let direction = match geometry::solve_intercept(
        shooter.position,
        target.position,
        target_velocity(world, &target),
        stats.plasma_speed,
    ) {
        InterceptSolution::Found { direction, .. } => direction,
        InterceptSolution::None => (target.position - shooter.position)
            .normalize_or_zero()
            .to_angle(),
    };

    let id = world.next_projectile_id();
    let plasma = new_plasma(
        id,
        shooter_id as i32,
        shooter.team.flag(),
        shooter.position,
        direction,
        stats.plasma_speed,
        stats.plasma_damage,
        stats.plasma_fuse,
    );
    world.plasmas.push(plasma);

    let player = &mut world.players[shooter_id];
    debit_firing_cost(player, fuel_cost, tuning.plasma_heat);
    player.plasmas_in_flight += 1;
    true
}

/// Manually detonates any of `shooter`'s in-flight torpedoes that are
/// passing an enemy rather than heading directly at it, or are caught in a
/// dense enemy cluster (§4.6). Returns the number detonated.
pub fn detonate_passing_torpedoes(
    tuning: &AiTuning,
    world: &mut World,
    shooter_id: usize,
) -> u32 {
    let shooter_team = world.players[shooter_id].team;
    let enemy_positions: Vec<Vec2> = world
        .alive_enemies_of(shooter_team)
        .map(|e| e.position)
        .collect();

    let mut detonated = 0;
    for torp in world.torpedoes.iter_mut() {
        if torp.owner != shooter_id as i32 || !torp.is_active() {
            continue;
        }

        let mut cluster_count = 0;
        let mut should_detonate = false;
        for enemy_pos in &enemy_positions {
            let distance = torp.position.distance(*enemy_pos);
            if distance < tuning.torpedo_detonate_cluster_range {
                cluster_count += 1;
            }
            if distance > tuning.torpedo_detonate_ring_min && distance < tuning.torpedo_detonate_ring_max {
                let to_enemy = (*enemy_pos - torp.position).normalize_or_zero().to_angle();
                if geometry::angle_diff(torp.direction, to_enemy) > tuning.torpedo_detonate_passby_angle {
                    should_detonate = true;
                }
            }
        }
        if cluster_count >= tuning.torpedo_detonate_cluster_count {
            should_detonate = true;
        }

        if should_detonate {
            torp.detonate_now();
            detonated += 1;
        }
    }
    detonated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TUNING;
    use crate::world::planet::Planet;
    use crate::world::player::{PlayerStatus, Team};
    use crate::world::ShipClass;
    use rand::SeedableRng;

    fn ready_bot(world: &mut World, id: usize, team: Team, pos: Vec2) {
        world.players[id].status = PlayerStatus::Alive;
        world.players[id].team = team;
        world.players[id].position = pos;
        world.players[id].ship_class = ShipClass::Cruiser;
        world.players[id].fuel = world.players[id].max_fuel();
    }

    fn base_world() -> World {
        World::new(vec![Planet::new(0, "Sol", Vec2::ZERO)], 11)
    }

    #[test]
    fn firing_straight_ahead_ignores_shooter_facing() {
        let mut world = base_world();
        ready_bot(&mut world, 0, Team::Federation, Vec2::new(50_000.0, 50_000.0));
        world.players[0].direction = std::f32::consts::FRAC_PI_2;
        ready_bot(&mut world, 1, Team::Klingon, Vec2::new(55_000.0, 50_000.0));

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let fired = fire_bot_torpedo(&TUNING, &mut world, &mut rng, 0, 1);
        assert!(fired >= 1);
        let torp = world.torpedoes.last().unwrap();
        assert!(torp.direction.abs() < 0.05 || (torp.direction - 2.0 * std::f32::consts::PI).abs() < 0.05);
    }

    #[test]
    fn spread_centers_on_the_intercept_direction() {
        let mut world = base_world();
        ready_bot(&mut world, 0, Team::Federation, Vec2::new(0.0, 0.0));
        ready_bot(&mut world, 1, Team::Klingon, Vec2::new(4_000.0, 0.0));

        let (flavor, _) = choose_torpedo_flavor(
            &TUNING,
            &world.players[0].clone(),
            &world.players[1].clone(),
            4_000.0,
        );
        assert!(matches!(flavor, TorpedoFlavor::Spread(3)));

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let fired = fire_bot_torpedo(&TUNING, &mut world, &mut rng, 0, 1);
        assert_eq!(fired, 3);
        let directions: Vec<f32> = world.torpedoes.iter().map(|t| t.direction).collect();
        assert!(directions.iter().any(|d| *d < 0.0 || *d > 2.0 * std::f32::consts::PI - 0.2));
    }

    #[test]
    fn detonate_passing_torpedo_near_perpendicular_enemy() {
        let mut world = base_world();
        ready_bot(&mut world, 0, Team::Federation, Vec2::ZERO);
        ready_bot(&mut world, 1, Team::Klingon, Vec2::new(0.0, 1_500.0));

        let torp = new_torpedo(
            0,
            0,
            Team::Federation.flag(),
            Vec2::new(1_500.0, 0.0),
            0.0, // heading due east, perpendicular to the enemy above
            400.0,
            20.0,
            30,
        );
        world.torpedoes.push(torp);

        let detonated = detonate_passing_torpedoes(&TUNING, &mut world, 0);
        assert_eq!(detonated, 1);
        assert_eq!(world.torpedoes[0].status, ProjectileStatus::Detonating);
    }

    #[test]
    fn does_not_detonate_a_torpedo_heading_directly_at_the_enemy() {
        let mut world = base_world();
        ready_bot(&mut world, 0, Team::Federation, Vec2::ZERO);
        ready_bot(&mut world, 1, Team::Klingon, Vec2::new(1_500.0, 0.0));

        let torp = new_torpedo(
            0,
            0,
            Team::Federation.flag(),
            Vec2::new(1_000.0, 0.0),
            0.0, // heading straight at the enemy
            400.0,
            20.0,
            30,
        );
        world.torpedoes.push(torp);

        let detonated = detonate_passing_torpedoes(&TUNING, &mut world, 0);
        assert_eq!(detonated, 0);
    }

    #[test]
    fn phaser_range_scales_with_damage() {
        let weak = phaser_range(&ShipClass::Scout.stats());
        let strong = phaser_range(&ShipClass::Battleship.stats());
        assert!(strong > weak);
    }
}
