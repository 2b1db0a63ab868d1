//! Combat maneuver picker (component C5): chooses direction, speed, and an
//! archetype tag from range and the ship matchup.

use super::evasion::combat_speed_for_range;
use crate::config::AiTuning;
use crate::geometry::{self, InterceptSolution};
use crate::world::{PlayerSlot, World};
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManeuverArchetype {
    Intercept,
    CircleStrafe,
    BoomZoom,
    OffsetApproach,
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatManeuver {
    pub direction: f32,
    pub speed: f32,
    pub archetype: ManeuverArchetype,
}

pub fn pick_combat_maneuver(
    tuning: &AiTuning,
    world: &World,
    shooter: &PlayerSlot,
    target: &PlayerSlot,
    distance: f32,
) -> CombatManeuver {
    if !target.is_alive() {
        return CombatManeuver {
            direction: shooter.desired_direction,
            speed: shooter.desired_speed,
            archetype: ManeuverArchetype::Idle,
        };
    }

    let max_speed = shooter.ship_class.stats().max_speed;
    let target_vel = world
        .planet(target.orbiting)
        .and_then(|planet| geometry::orbital_velocity(target.position, planet.position, true))
        .unwrap_or_else(|| geometry::straight_line_velocity(target.speed, target.direction));
    let intercept_dir = match geometry::solve_intercept(
        shooter.position,
        target.position,
        target_vel,
        shooter.ship_class.stats().torp_speed,
    ) {
        InterceptSolution::Found { direction, .. } => direction,
        InterceptSolution::None => (target.position - shooter.position)
            .normalize_or_zero()
            .to_angle(),
    };

    let maneuverability_edge = shooter.ship_class.stats().max_speed > target.ship_class.stats().max_speed;
    let speed_edge = shooter.ship_class.stats().max_speed >= target.ship_class.stats().max_speed;
    let target_fast = target.speed > target.ship_class.stats().max_speed * 0.5;

    if distance < tuning.maneuver_close_range && maneuverability_edge {
        let perp = Vec2::new(intercept_dir.cos(), intercept_dir.sin())
            .perp()
            .to_angle();
        return CombatManeuver {
            direction: perp,
            speed: max_speed * 0.7,
            archetype: ManeuverArchetype::CircleStrafe,
        };
    }

    if distance < tuning.maneuver_close_range && speed_edge && !maneuverability_edge {
        let away = (shooter.position - target.position).normalize_or_zero().to_angle();
        return CombatManeuver {
            direction: away,
            speed: max_speed,
            archetype: ManeuverArchetype::BoomZoom,
        };
    }

    if distance > tuning.maneuver_far_band
        && target.ship_class.stats().max_speed > shooter.ship_class.stats().max_speed
        && target_fast
    {
        return CombatManeuver {
            direction: intercept_dir + tuning.maneuver_offset_angle,
            speed: max_speed,
            archetype: ManeuverArchetype::OffsetApproach,
        };
    }

    CombatManeuver {
        direction: intercept_dir,
        speed: combat_speed_for_range(tuning, max_speed, distance),
        archetype: ManeuverArchetype::Intercept,
    }
}
