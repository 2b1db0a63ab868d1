//! Separation field (component C8): repulsion among allies, blended with a
//! navigation direction to prevent formation collapse (§4.8).

use crate::config::AiTuning;
use crate::world::{PlayerSlot, World};
use glam::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SeparationVector {
    pub unit: Vec2,
    pub magnitude: f32,
}

pub fn compute_separation(tuning: &AiTuning, world: &World, player: &PlayerSlot) -> SeparationVector {
    let allies: Vec<&PlayerSlot> = world
        .alive_allies_of(player.team, player.id)
        .filter(|a| !a.is_orbiting())
        .filter(|a| a.position.distance(player.position) < tuning.separation_min_safe_distance)
        .collect();

    if allies.is_empty() {
        return SeparationVector::default();
    }

    let nearby_count = allies.len() as u32;
    let mut accum = Vec2::ZERO;

    for ally in &allies {
        let delta = player.position - ally.position;
        let d = delta.length().max(1.0);

        let mut strength = if d < tuning.separation_critical_distance {
            5.0 * (tuning.separation_critical_distance - d) / tuning.separation_critical_distance
        } else if d < tuning.separation_ideal_distance {
            2.0 * (tuning.separation_ideal_distance - d) / tuning.separation_ideal_distance
        } else {
            0.8 * (tuning.separation_min_safe_distance - d) / tuning.separation_min_safe_distance
        };

        if ally.bot_target != crate::world::NONE && ally.bot_target == player.bot_target {
            strength *= tuning.separation_same_target_mult;
        }
        if ally.damage_ratio() > tuning.separation_damaged_ally_ratio_high {
            strength *= tuning.separation_damaged_ally_mult_high;
        } else if ally.damage_ratio() > tuning.separation_damaged_ally_ratio_mid {
            strength *= tuning.separation_damaged_ally_mult_mid;
        }
        if nearby_count >= tuning.separation_cluster_min_allies {
            strength *= tuning.separation_cluster_mult;
        }

        accum += delta.normalize_or_zero() * strength;
    }

    let scale = (1.0 + tuning.separation_scale_per_ally * nearby_count as f32).min(tuning.separation_scale_cap);
    accum *= scale;

    SeparationVector {
        unit: accum.normalize_or_zero(),
        magnitude: accum.length(),
    }
}

/// Blends a navigation direction with the separation vector; the blend
/// weight is driven by the separation magnitude, not the unit vector (§4.8).
pub fn blend_with_navigation(tuning: &AiTuning, nav_dir: f32, separation: SeparationVector) -> f32 {
    if separation.magnitude <= 0.0 {
        return nav_dir;
    }
    let weight = (separation.magnitude / tuning.separation_blend_divisor).min(tuning.separation_blend_max_weight);
    let nav_vec = Vec2::new(nav_dir.cos(), nav_dir.sin());
    let blended = nav_vec * (1.0 - weight) + separation.unit * weight;
    blended.normalize_or_zero().to_angle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TUNING;
    use crate::world::planet::Planet;
    use crate::world::player::{PlayerStatus, Team};

    fn base_world() -> World {
        World::new(vec![Planet::new(0, "Sol", Vec2::ZERO)], 2)
    }

    #[test]
    fn no_nearby_allies_yields_zero_vector() {
        let world = base_world();
        let player = {
            let mut p = world.players[0].clone();
            p.status = PlayerStatus::Alive;
            p.team = Team::Federation;
            p
        };
        let sep = compute_separation(&TUNING, &world, &player);
        assert_eq!(sep.magnitude, 0.0);
    }

    #[test]
    fn close_ally_produces_repulsion_away_from_it() {
        let mut world = base_world();
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[0].position = Vec2::ZERO;

        world.players[1].status = PlayerStatus::Alive;
        world.players[1].team = Team::Federation;
        world.players[1].position = Vec2::new(100.0, 0.0);

        let player = world.players[0].clone();
        let sep = compute_separation(&TUNING, &world, &player);
        assert!(sep.magnitude > 0.0);
        assert!(sep.unit.x < 0.0);
    }

    #[test]
    fn blend_returns_nav_dir_unchanged_when_no_separation() {
        let nav = 0.4;
        let blended = blend_with_navigation(&TUNING, nav, SeparationVector::default());
        assert_eq!(blended, nav);
    }
}
