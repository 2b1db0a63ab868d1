//! Evasion planner (component C3): dodge-direction search and evasion speed.

use super::threat::ThreatReport;
use crate::config::AiTuning;
use crate::geometry::angle_diff;
use crate::world::{PlayerSlot, Torpedo, World};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Samples candidate headings around `wanted_dir` and returns the
/// lowest-risk one, trading off against torpedo/plasma danger, planet and
/// wall clearance, and closeness to the originally intended course.
pub fn advanced_dodge_direction(
    world: &World,
    tuning: &AiTuning,
    player: &PlayerSlot,
    wanted_dir: f32,
    world_bounds: Vec2,
) -> f32 {
    let nearby_planets: Vec<Vec2> = world
        .planets
        .iter()
        .filter(|p| p.position.distance(player.position) < tuning.evasion_planet_precompute_radius)
        .map(|p| p.position)
        .collect();

    let mut best_dir = wanted_dir;
    let mut best_score = f32::MIN;

    for k in 0..tuning.evasion_candidate_count {
        let offset = if k == 0 {
            0.0
        } else {
            let sign = if k % 2 == 0 { -1.0 } else { 1.0 };
            let magnitude = ((k + 1) / 2) as f32;
            sign * magnitude * tuning.evasion_candidate_step
        };
        let candidate = wanted_dir + offset;
        let score = score_candidate_direction(
            world,
            tuning,
            player,
            candidate,
            wanted_dir,
            &nearby_planets,
            world_bounds,
        );
        if score > best_score {
            best_score = score;
            best_dir = candidate;
        }
    }

    best_dir
}

fn score_candidate_direction(
    world: &World,
    tuning: &AiTuning,
    player: &PlayerSlot,
    candidate: f32,
    wanted_dir: f32,
    nearby_planets: &[Vec2],
    world_bounds: Vec2,
) -> f32 {
    let mut score = 0.0;

    score -= tuning.evasion_wanted_dir_weight * angle_diff(candidate, wanted_dir);

    score -= 10.0 * torpedo_danger(world, tuning, player, candidate);
    score -= 10.0 * plasma_danger(world, tuning, player, candidate);

    let probe = player.position
        + Vec2::new(candidate.cos(), candidate.sin()) * tuning.evasion_wall_probe_range;
    let clearance = wall_clearance(probe, world_bounds, nearby_planets, tuning);
    if clearance < tuning.evasion_wall_clear_min {
        score -= 2.0 * (tuning.evasion_wall_clear_min - clearance);
    }

    score
}

fn torpedo_danger(world: &World, tuning: &AiTuning, player: &PlayerSlot, dir: f32) -> f32 {
    let heading = Vec2::new(dir.cos(), dir.sin());
    let mut danger = 0.0;
    for torp in world.torpedoes.iter().filter(|t| t.is_active()) {
        if torp.owner_team_flag == player.team.flag() {
            continue;
        }
        danger += simulate_min_separation_danger(
            player.position,
            heading * player.speed_units_per_tick(),
            torp,
            tuning,
            tuning.evasion_torpedo_danger_range,
        );
    }
    danger
}

fn plasma_danger(world: &World, tuning: &AiTuning, player: &PlayerSlot, dir: f32) -> f32 {
    let heading = Vec2::new(dir.cos(), dir.sin());
    let mut danger = 0.0;
    for plasma in world.plasmas.iter().filter(|p| p.is_active()) {
        if plasma.owner_team_flag == player.team.flag() {
            continue;
        }
        let mut min_sep = f32::MAX;
        for i in 0..=tuning.evasion_torpedo_sim_ticks {
            let t = i as f32 * tuning.evasion_torpedo_sim_step;
            let self_pos = player.position + heading * player.speed_units_per_tick() * t;
            let plasma_pos = plasma.position + plasma.velocity() * t;
            min_sep = min_sep.min(self_pos.distance(plasma_pos));
        }
        if min_sep < tuning.evasion_plasma_danger_range {
            danger += (tuning.evasion_plasma_danger_range - min_sep) / 100.0;
        }
    }
    danger
}

fn simulate_min_separation_danger(
    self_pos: Vec2,
    self_vel: Vec2,
    torp: &Torpedo,
    tuning: &AiTuning,
    danger_range: f32,
) -> f32 {
    let mut danger = 0.0;
    for i in 0..=tuning.evasion_torpedo_sim_ticks {
        let t = i as f32 * tuning.evasion_torpedo_sim_step;
        let self_p = self_pos + self_vel * t;
        let torp_p = torp.position + torp.velocity() * t;
        let d = self_p.distance(torp_p);
        if d < danger_range {
            danger += (danger_range - d) / 100.0;
        }
    }
    danger
}

fn wall_clearance(probe: Vec2, world_bounds: Vec2, nearby_planets: &[Vec2], tuning: &AiTuning) -> f32 {
    let to_edge = (world_bounds.x - probe.x.abs()).min(world_bounds.y - probe.y.abs());
    let planet_clear = nearby_planets
        .iter()
        .map(|p| probe.distance(*p) - tuning.evasion_planet_block_radius)
        .fold(f32::MAX, f32::min);
    to_edge.min(planet_clear).max(0.0)
}

/// Picks an evasion speed from the aggregate threat level: full commitment
/// at high threat, randomized partial commitment at medium threat (keeps
/// bots from being perfectly predictable), and the normal combat speed band
/// otherwise.
pub fn evasion_speed(
    tuning: &AiTuning,
    player: &PlayerSlot,
    threats: &ThreatReport,
    rng: &mut ChaCha8Rng,
) -> f32 {
    let max_speed = player.ship_class.stats().max_speed;
    if threats.threat_level > tuning.evasion_speed_high_threat as i32 {
        max_speed
    } else if threats.threat_level >= tuning.evasion_speed_mid_threat as i32 {
        max_speed * rng.gen_range(0.6..=1.0)
    } else {
        combat_speed_for_range(tuning, max_speed, tuning.evasion_combat_speed_range)
    }
}

/// Shared band lookup: optimal combat speed for a target distance (used by
/// both evasion fallback and the maneuver picker).
pub fn combat_speed_for_range(tuning: &AiTuning, max_speed: f32, distance: f32) -> f32 {
    if distance > tuning.maneuver_far_band {
        max_speed
    } else if distance > tuning.maneuver_mid_band {
        max_speed * 0.6
    } else if distance > tuning.maneuver_near_band {
        max_speed * 0.4
    } else {
        max_speed * 0.3
    }
}

impl PlayerSlot {
    fn speed_units_per_tick(&self) -> f32 {
        crate::geometry::SPEED_TO_UNITS_PER_TICK * self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TUNING;
    use crate::world::planet::Planet;
    use crate::world::player::{PlayerStatus, Team};
    use crate::world::projectile::{new_torpedo, ProjectileStatus};
    use rand::SeedableRng;

    fn stationary_bot() -> (World, PlayerSlot) {
        let mut world = World::new(vec![Planet::new(0, "Sol", Vec2::new(100_000.0, 100_000.0))], 3);
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[0].position = Vec2::ZERO;
        world.players[0].speed = 0.0;
        let player = world.players[0].clone();
        (world, player)
    }

    #[test]
    fn dodge_keeps_wanted_direction_when_no_threats_present() {
        let (world, player) = stationary_bot();
        let wanted = 1.2_f32;
        let dir = advanced_dodge_direction(
            &world,
            &TUNING,
            &player,
            wanted,
            Vec2::new(1_000_000.0, 1_000_000.0),
        );
        assert_eq!(dir, wanted);
    }

    #[test]
    fn torpedo_danger_is_higher_on_a_converging_course_than_a_diverging_one() {
        let (mut world, mut player) = stationary_bot();
        player.speed = 10.0;
        let mut torp = new_torpedo(
            0,
            9,
            Team::Klingon.flag(),
            Vec2::new(50.0, 0.0),
            0.0,
            200.0,
            20.0,
            30,
        );
        torp.status = ProjectileStatus::Moving;
        world.torpedoes.push(torp);

        let converging = torpedo_danger(&world, &TUNING, &player, 0.0);
        let diverging = torpedo_danger(
            &world,
            &TUNING,
            &player,
            std::f32::consts::FRAC_PI_2,
        );
        assert!(converging > diverging);
    }

    #[test]
    fn evasion_speed_maxes_out_under_heavy_threat() {
        let (_world, mut player) = stationary_bot();
        player.ship_class = crate::world::ShipClass::Destroyer;
        let threats = ThreatReport {
            threat_level: 9,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let speed = evasion_speed(&TUNING, &player, &threats, &mut rng);
        assert_eq!(speed, player.ship_class.stats().max_speed);
    }

    #[test]
    fn combat_speed_for_range_scales_with_distance_bands() {
        let max_speed = 10.0;
        assert_eq!(combat_speed_for_range(&TUNING, max_speed, 8_000.0), max_speed);
        assert_eq!(combat_speed_for_range(&TUNING, max_speed, 400.0), max_speed * 0.3);
    }
}
