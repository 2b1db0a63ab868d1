//! Team coordination (component C11): focus-fire rule, volley cooldown sync,
//! and the deferred target-suggestion buffer (§4.11).

use crate::config::AiTuning;
use crate::world::{PlayerSlot, World, NONE};

use super::targeting::TargetSuggestion;

/// Whether `target` is worth every ally focusing fire on.
pub fn is_worth_focusing(tuning: &AiTuning, world: &World, target: &PlayerSlot) -> bool {
    target.damage_ratio() > tuning.coordination_focus_damage_ratio
        || target.armies > 0
        || target.kills_streak > tuning.coordination_focus_kills
        || world.is_isolated(target.id, tuning.coordination_broadcast_radius)
}

/// Returns the maximum `bot_cooldown` among allied bots currently locked onto
/// `target`, or `None` if no ally shares the target (§8.5). The caller adopts
/// this value only if it is at least its own cooldown, never lower.
pub fn coordinate_team_attack(world: &World, shooter: &PlayerSlot, target_id: usize) -> Option<u32> {
    world
        .alive_allies_of(shooter.team, shooter.id)
        .filter(|a| a.bot_target == target_id as i32)
        .map(|a| a.bot_cooldown)
        .max()
}

/// Buffers a suggestion for each nearby same-team bot whose `bot_target` is
/// still unset, when `target` is high-value enough to broadcast (§4.11).
pub fn buffer_target_suggestions(
    tuning: &AiTuning,
    world: &mut World,
    shooter_id: usize,
    target_id: usize,
    score: f32,
) -> Vec<TargetSuggestion> {
    let shooter = world.players[shooter_id].clone();
    let target = world.players[target_id].clone();

    let high_value = score > tuning.coordination_broadcast_score_threshold || target.armies > 0;
    if !high_value {
        return Vec::new();
    }

    world
        .alive_allies_of(shooter.team, shooter.id)
        .filter(|a| a.bot_target == NONE)
        .filter(|a| a.position.distance(shooter.position) < tuning.coordination_broadcast_radius)
        .map(|a| TargetSuggestion {
            ally: a.id,
            target: target_id,
            lock_time: tuning.target_lock_fresh_ticks,
            score,
        })
        .collect()
}

/// Applies buffered suggestions at tick-end, after every bot has run, so no
/// low-index bot can preempt a suggestion meant for a higher-index one.
/// Each suggestion is applied only if the recipient's `bot_target` is still
/// unset at application time (§4.11, §8.7).
pub fn apply_pending_target_suggestions(world: &mut World, suggestions: &[TargetSuggestion]) {
    for suggestion in suggestions {
        if let Some(ally) = world.players.get_mut(suggestion.ally) {
            if ally.bot_target == NONE {
                ally.bot_target = suggestion.target as i32;
                ally.bot_target_lock_time = suggestion.lock_time;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TUNING;
    use crate::world::planet::Planet;
    use crate::world::player::{PlayerStatus, Team};
    use glam::Vec2;

    fn base_world() -> World {
        World::new(vec![Planet::new(0, "Sol", Vec2::ZERO)], 6)
    }

    #[test]
    fn coordinate_team_attack_returns_max_cooldown_of_matching_allies() {
        let mut world = base_world();
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;

        world.players[1].status = PlayerStatus::Alive;
        world.players[1].team = Team::Federation;
        world.players[1].bot_target = 9;
        world.players[1].bot_cooldown = 3;

        world.players[2].status = PlayerStatus::Alive;
        world.players[2].team = Team::Federation;
        world.players[2].bot_target = 9;
        world.players[2].bot_cooldown = 7;

        let shooter = world.players[0].clone();
        assert_eq!(coordinate_team_attack(&world, &shooter, 9), Some(7));
    }

    #[test]
    fn coordinate_team_attack_returns_none_when_no_ally_shares_target() {
        let mut world = base_world();
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        let shooter = world.players[0].clone();
        assert_eq!(coordinate_team_attack(&world, &shooter, 9), None);
    }

    #[test]
    fn apply_pending_suggestions_skips_allies_that_already_picked_a_target() {
        let mut world = base_world();
        world.players[1].bot_target = 5;
        let suggestions = vec![TargetSuggestion {
            ally: 1,
            target: 2,
            lock_time: 30,
            score: 1.0,
        }];
        apply_pending_target_suggestions(&mut world, &suggestions);
        assert_eq!(world.players[1].bot_target, 5);
    }

    #[test]
    fn apply_pending_suggestions_fills_an_unset_target() {
        let mut world = base_world();
        let suggestions = vec![TargetSuggestion {
            ally: 1,
            target: 2,
            lock_time: 30,
            score: 1.0,
        }];
        apply_pending_target_suggestions(&mut world, &suggestions);
        assert_eq!(world.players[1].bot_target, 2);
    }

    #[test]
    fn high_value_carrier_is_worth_focusing() {
        let world = base_world();
        let mut target = world.players[1].clone();
        target.armies = 3;
        assert!(is_worth_focusing(&TUNING, &world, &target));
    }
}
