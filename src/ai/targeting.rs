//! Target selector (component C4): scoring, lock persistence, and the
//! deferred-suggestion buffer consumed by team coordination (C11).

use crate::config::AiTuning;
use crate::world::{PlayerSlot, World, NONE};

/// A suggestion buffered this tick for an ally whose `bot_target` was still
/// unset; applied only after every bot has run (§4.11, §9).
#[derive(Clone, Copy, Debug)]
pub struct TargetSuggestion {
    pub ally: usize,
    pub target: usize,
    pub lock_time: u32,
    pub score: f32,
}

fn base_score(tuning: &AiTuning, world: &mut World, shooter: &PlayerSlot, target: &PlayerSlot) -> f32 {
    let distance = shooter.position.distance(target.position).max(1.0);
    let mut score = tuning.target_distance_score_scale / distance;

    let ratio = target.damage_ratio();
    score += if ratio > tuning.target_damage_high_ratio {
        tuning.target_damage_high_bonus
    } else if ratio > tuning.target_damage_mid_ratio {
        tuning.target_damage_mid_scale * ratio
    } else {
        tuning.target_damage_low_scale * ratio
    };

    if target.armies > 0 {
        score += tuning.target_army_base_bonus
            + tuning.target_army_per_unit_bonus * target.armies as f32;
    }

    let speed_advantage = shooter.ship_class.stats().max_speed - target.ship_class.stats().max_speed;
    score += tuning.target_speed_advantage_scale * speed_advantage;

    if target.cloaked {
        if distance > tuning.target_cloak_far_range {
            score -= tuning.target_cloak_far_penalty;
        } else {
            score += tuning.target_cloak_close_bonus;
        }
    }

    if world.is_isolated(target.id, tuning.target_isolation_radius) {
        score += tuning.target_isolation_bonus;
    }

    score
}

/// Selects the best enemy within range for `shooter`, applying lock
/// persistence so equally-scored enemies don't thrash the target every tick.
pub fn select_best_combat_target(
    tuning: &AiTuning,
    world: &mut World,
    shooter_id: usize,
) -> Option<usize> {
    let shooter = world.players[shooter_id].clone();

    let candidates: Vec<usize> = world
        .alive_enemies_of(shooter.team)
        .filter(|e| shooter.position.distance(e.position) <= tuning.target_max_range)
        .map(|e| e.id)
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let mut best_id = None;
    let mut best_score = f32::MIN;
    for id in candidates {
        let target = world.players[id].clone();
        let score = base_score(tuning, world, &shooter, &target);
        if score > best_score {
            best_score = score;
            best_id = Some(id);
        }
    }

    let current = shooter.bot_target;
    let locked = current != NONE
        && world
            .player(current)
            .is_some_and(|t| t.is_alive() && t.team != shooter.team)
        && shooter.position.distance(world.player(current).unwrap().position) <= tuning.target_lock_max_range;

    if !locked {
        return best_id;
    }

    let current_id = current as usize;
    let current_target = world.players[current_id].clone();
    let current_score =
        base_score(tuning, world, &shooter, &current_target) + tuning.target_lock_persistence_bonus;

    match best_id {
        Some(id) if id != current_id => {
            if best_score > current_score * (1.0 + tuning.target_lock_replace_margin) {
                Some(id)
            } else {
                Some(current_id)
            }
        }
        _ => Some(current_id),
    }
}

/// Applies a freshly selected target to the player's lock state, per §4.4:
/// new locks start at the fresh-lock timer, re-confirmations are topped up to
/// at least the confirm-minimum.
pub fn apply_target_lock(tuning: &AiTuning, player: &mut PlayerSlot, new_target: Option<usize>) {
    let Some(new_target) = new_target else {
        if player.bot_target_lock_time == 0 {
            player.bot_target = NONE;
        }
        return;
    };

    if player.bot_target == new_target as i32 {
        player.bot_target_lock_time = player
            .bot_target_lock_time
            .max(tuning.target_lock_confirm_min_ticks);
    } else {
        player.bot_target = new_target as i32;
        player.bot_target_lock_time = tuning.target_lock_fresh_ticks;
    }
}

/// Decays the lock timer once per tick; call before re-selecting a target.
pub fn decay_lock(player: &mut PlayerSlot) {
    player.bot_target_lock_time = player.bot_target_lock_time.saturating_sub(1);
}

/// Re-scores a shooter's current target, for callers that need to record the
/// value driving a lock (e.g. `bot_target_value` for C11's broadcast trigger)
/// without duplicating the candidate scan in [`select_best_combat_target`].
pub fn score_against(tuning: &AiTuning, world: &mut World, shooter_id: usize, target_id: usize) -> f32 {
    let shooter = world.players[shooter_id].clone();
    let target = world.players[target_id].clone();
    base_score(tuning, world, &shooter, &target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TUNING;
    use crate::world::planet::Planet;
    use crate::world::player::{PlayerStatus, Team};
    use glam::Vec2;

    fn base_world() -> World {
        World::new(vec![Planet::new(0, "Sol", Vec2::ZERO)], 5)
    }

    #[test]
    fn selects_closest_enemy_when_scores_are_otherwise_equal() {
        let mut world = base_world();
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[0].position = Vec2::ZERO;

        world.players[1].status = PlayerStatus::Alive;
        world.players[1].team = Team::Klingon;
        world.players[1].position = Vec2::new(2_000.0, 0.0);

        world.players[2].status = PlayerStatus::Alive;
        world.players[2].team = Team::Klingon;
        world.players[2].position = Vec2::new(10_000.0, 0.0);

        let chosen = select_best_combat_target(&TUNING, &mut world, 0);
        assert_eq!(chosen, Some(1));
    }

    #[test]
    fn lock_persists_against_a_marginally_better_rival() {
        let mut world = base_world();
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[0].position = Vec2::ZERO;
        world.players[0].bot_target = 1;
        world.players[0].bot_target_lock_time = 15;

        world.players[1].status = PlayerStatus::Alive;
        world.players[1].team = Team::Klingon;
        world.players[1].position = Vec2::new(5_000.0, 0.0);

        world.players[2].status = PlayerStatus::Alive;
        world.players[2].team = Team::Klingon;
        world.players[2].position = Vec2::new(4_800.0, 0.0);

        let chosen = select_best_combat_target(&TUNING, &mut world, 0);
        assert_eq!(chosen, Some(1));
    }

    #[test]
    fn lock_switches_when_new_target_clearly_outscores_it() {
        let mut world = base_world();
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[0].position = Vec2::ZERO;
        world.players[0].bot_target = 1;
        world.players[0].bot_target_lock_time = 15;

        world.players[1].status = PlayerStatus::Alive;
        world.players[1].team = Team::Klingon;
        world.players[1].position = Vec2::new(24_000.0, 0.0);

        world.players[2].status = PlayerStatus::Alive;
        world.players[2].team = Team::Klingon;
        world.players[2].position = Vec2::new(500.0, 0.0);
        world.players[2].armies = 6;

        let chosen = select_best_combat_target(&TUNING, &mut world, 0);
        assert_eq!(chosen, Some(2));
    }

    #[test]
    fn apply_target_lock_starts_fresh_timer_on_new_target() {
        let mut player = PlayerSlot::free(0);
        apply_target_lock(&TUNING, &mut player, Some(4));
        assert_eq!(player.bot_target, 4);
        assert_eq!(player.bot_target_lock_time, TUNING.target_lock_fresh_ticks);
    }

    #[test]
    fn apply_target_lock_tops_up_on_reconfirmation() {
        let mut player = PlayerSlot::free(0);
        player.bot_target = 4;
        player.bot_target_lock_time = 1;
        apply_target_lock(&TUNING, &mut player, Some(4));
        assert_eq!(player.bot_target_lock_time, TUNING.target_lock_confirm_min_ticks);
    }
}
