//! Threat model (component C2): scans projectiles and nearby enemies and
//! produces a [`ThreatReport`].

use crate::config::AiTuning;
use crate::geometry::{self, angle_diff};
use crate::world::{Plasma, PlayerSlot, Torpedo, World};
use glam::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThreatReport {
    pub closest_torpedo_dist: f32,
    pub closest_plasma_dist: f32,
    pub nearby_enemies: u32,
    pub requires_evasion: bool,
    pub threat_level: i32,
}

pub fn assess_threats(world: &World, tuning: &AiTuning, player: &PlayerSlot) -> ThreatReport {
    let mut report = ThreatReport {
        closest_torpedo_dist: f32::MAX,
        closest_plasma_dist: f32::MAX,
        ..Default::default()
    };

    for torp in world.torpedoes.iter().filter(|t| t.is_active()) {
        if torp.owner_team_flag == player.team.flag() {
            continue;
        }
        let distance = torp.position.distance(player.position);
        if distance > tuning.torpedo_threat_scan_range {
            continue;
        }
        report.closest_torpedo_dist = report.closest_torpedo_dist.min(distance);

        let threatening = is_torpedo_threatening(world, tuning, player, torp, distance);
        if threatening {
            report.threat_level += 4;
            report.requires_evasion = true;
        }

        let mut proximity_bonus = if distance < tuning.threat_band_close {
            3
        } else if distance < tuning.threat_band_mid {
            1
        } else {
            0
        };
        if proximity_bonus > 0 && both_near_same_planet(world, tuning, player.position, torp.position) {
            proximity_bonus *= 2;
        }
        report.threat_level += proximity_bonus;
    }

    for plasma in world.plasmas.iter().filter(|p| p.is_active()) {
        if plasma.owner_team_flag == player.team.flag() {
            continue;
        }
        let distance = plasma.position.distance(player.position);
        report.closest_plasma_dist = report.closest_plasma_dist.min(distance);
        if distance < tuning.plasma_threat_range {
            report.threat_level += 5;
            report.requires_evasion = true;
        }
    }

    for enemy in world.alive_enemies_of(player.team) {
        let distance = enemy.position.distance(player.position);
        if distance > tuning.nearby_enemy_range {
            continue;
        }
        report.nearby_enemies += 1;
        report.threat_level += 1;

        if distance < tuning.nearby_enemy_close_range {
            let to_us = (player.position - enemy.position).normalize_or_zero();
            let heading_to_us = to_us.to_angle();
            if angle_diff(enemy.direction, heading_to_us) < tuning.nearby_enemy_cone {
                report.threat_level += 2;
                report.requires_evasion = true;
            }
        }
    }

    report
}

fn both_near_same_planet(world: &World, tuning: &AiTuning, a: Vec2, b: Vec2) -> bool {
    world.planets.iter().any(|p| {
        p.position.distance(a) < tuning.near_planet_radius
            && p.position.distance(b) < tuning.near_planet_radius
    })
}

/// Simulates straight-line motion of both the torpedo and the player over a
/// short horizon and flags the torpedo threatening if they ever come close,
/// or if it is closing nearly head-on, or if it is simply very close already.
///
/// Uses the player's *current* heading/speed for the self-prediction half of
/// the simulation (see the open question recorded in the design ledger).
fn is_torpedo_threatening(
    _world: &World,
    tuning: &AiTuning,
    player: &PlayerSlot,
    torp: &Torpedo,
    distance: f32,
) -> bool {
    if distance < tuning.torpedo_threat_always_range {
        return true;
    }

    let torp_vel = torp.velocity();
    let player_vel = geometry::straight_line_velocity(player.speed, player.direction);

    let steps = tuning.torpedo_threat_sim_ticks;
    let step = tuning.torpedo_threat_sim_step;
    let mut min_sep = f32::MAX;
    for i in 0..=steps {
        let t = i as f32 * step;
        let torp_pos = torp.position + torp_vel * t;
        let player_pos = player.position + player_vel * t;
        min_sep = min_sep.min(torp_pos.distance(player_pos));
    }
    if min_sep < tuning.torpedo_threat_close_separation {
        return true;
    }

    if distance < tuning.torpedo_threat_cone_range {
        let to_player = (player.position - torp.position).normalize_or_zero();
        let heading_to_player = to_player.to_angle();
        if angle_diff(torp.direction, heading_to_player) < tuning.torpedo_threat_cone {
            return true;
        }
    }

    false
}

/// Whether an incoming plasma requires an emergency phaser response,
/// independent of the aggregate report above (used by C6's anti-plasma policy).
pub fn plasma_in_phaser_range(plasma: &Plasma, player: &PlayerSlot, phaser_range: f32) -> bool {
    plasma.position.distance(player.position) <= phaser_range
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TUNING;
    use crate::world::planet::Planet;
    use crate::world::player::{PlayerStatus, Team};
    use crate::world::projectile::{new_torpedo, ProjectileStatus};

    fn world_with(team_a: Team) -> World {
        let mut world = World::new(vec![Planet::new(0, "Sol", Vec2::ZERO)], 7);
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = team_a;
        world.players[0].position = Vec2::ZERO;
        world.players[0].direction = 0.0;
        world.players[0].speed = 0.0;
        world
    }

    #[test]
    fn torpedo_heading_directly_at_stationary_bot_requires_evasion() {
        let mut world = world_with(Team::Federation);
        let mut torp = new_torpedo(
            0,
            5,
            Team::Klingon.flag(),
            Vec2::new(3_000.0, 0.0),
            std::f32::consts::PI, // heading back toward origin
            450.0,
            20.0,
            30,
        );
        torp.status = ProjectileStatus::Moving;
        world.torpedoes.push(torp);

        let report = assess_threats(&world, &TUNING, &world.players[0]);
        assert!(report.requires_evasion);
    }

    #[test]
    fn torpedo_heading_directly_away_is_not_threatening() {
        let mut world = world_with(Team::Federation);
        let mut torp = new_torpedo(
            0,
            5,
            Team::Klingon.flag(),
            Vec2::new(3_000.0, 0.0),
            0.0, // heading away from origin
            450.0,
            20.0,
            30,
        );
        torp.status = ProjectileStatus::Moving;
        world.torpedoes.push(torp);

        let report = assess_threats(&world, &TUNING, &world.players[0]);
        assert!(!report.requires_evasion);
    }

    #[test]
    fn torpedo_within_always_range_is_flagged_regardless_of_heading() {
        let mut world = world_with(Team::Federation);
        let mut torp = new_torpedo(
            0,
            5,
            Team::Klingon.flag(),
            Vec2::new(1_000.0, 0.0),
            0.0,
            450.0,
            20.0,
            30,
        );
        torp.status = ProjectileStatus::Moving;
        world.torpedoes.push(torp);

        let report = assess_threats(&world, &TUNING, &world.players[0]);
        assert!(report.requires_evasion);
    }

    #[test]
    fn friendly_torpedoes_are_never_threats() {
        let mut world = world_with(Team::Federation);
        let mut torp = new_torpedo(
            0,
            5,
            Team::Federation.flag(),
            Vec2::new(500.0, 0.0),
            std::f32::consts::PI,
            450.0,
            20.0,
            30,
        );
        torp.status = ProjectileStatus::Moving;
        world.torpedoes.push(torp);

        let report = assess_threats(&world, &TUNING, &world.players[0]);
        assert!(!report.requires_evasion);
        assert_eq!(report.closest_torpedo_dist, f32::MAX);
    }
}
