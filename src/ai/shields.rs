//! Shield controller (component C7): aggregates threat and fuel into a
//! once-per-tick shield decision (§4.7).

use crate::config::AiTuning;
use crate::geometry::angle_diff;
use crate::world::{PlayerSlot, World};

use super::weapons::phaser_range;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct ShieldAssessment {
    threat_level: i32,
    closest_torp_dist: f32,
    closest_enemy_dist: f32,
    immediate: bool,
}

fn assess(tuning: &AiTuning, world: &World, player: &PlayerSlot) -> ShieldAssessment {
    let mut a = ShieldAssessment {
        closest_torp_dist: f32::MAX,
        closest_enemy_dist: f32::MAX,
        ..Default::default()
    };

    let phaser_range = phaser_range(&player.ship_class.stats());

    for enemy in world.alive_enemies_of(player.team) {
        let distance = enemy.position.distance(player.position);
        a.closest_enemy_dist = a.closest_enemy_dist.min(distance);

        if distance < tuning.shield_phaser_range_ratio_immediate * phaser_range {
            a.threat_level += 4;
            a.immediate = true;
        } else if distance < tuning.shield_phaser_range_ratio * phaser_range {
            a.threat_level += 3;
        }

        if distance < tuning.shield_very_close_range {
            a.threat_level += 3;
            a.immediate = true;
        } else if distance < tuning.shield_close_range {
            a.threat_level += 2;
            a.immediate = true;
        }
    }

    for torp in world.torpedoes.iter().filter(|t| t.is_active()) {
        if torp.owner_team_flag == player.team.flag() {
            continue;
        }
        let distance = torp.position.distance(player.position);
        a.closest_torp_dist = a.closest_torp_dist.min(distance);

        if distance < tuning.shield_torpedo_very_close {
            a.threat_level += 5;
            a.immediate = true;
        } else if distance < tuning.shield_torpedo_close {
            a.threat_level += 2;
            let to_player = (player.position - torp.position).normalize_or_zero();
            if angle_diff(torp.direction, to_player.to_angle()) < tuning.torpedo_threat_cone {
                a.threat_level += 4;
            }
        }
    }

    for plasma in world.plasmas.iter().filter(|p| p.is_active()) {
        if plasma.owner_team_flag == player.team.flag() {
            continue;
        }
        let distance = plasma.position.distance(player.position);
        if distance < tuning.shield_plasma_close_ring {
            a.threat_level += 4;
            a.immediate = true;
        } else if distance < tuning.shield_plasma_far_ring {
            a.threat_level += 3;
        }
    }

    a
}

/// Runs the per-tick shield decision for `player`, guarded by `bot_shield_frame`
/// so a second call in the same tick (from any caller) is a no-op (§4.7, §8.8).
pub fn assess_and_activate_shields(tuning: &AiTuning, world: &mut World, player_id: usize) {
    let frame = world.frame;
    if world.players[player_id].bot_shield_frame == frame {
        return;
    }

    let player = world.players[player_id].clone();
    let a = assess(tuning, world, &player);

    let fuel = player.fuel;
    let carrying_armies = player.armies > 0;
    let planet_defense = player.bot_defense_target != crate::world::NONE;
    let close_anything = a.immediate || a.closest_torp_dist < tuning.shield_torpedo_close;

    const THREAT_IMMEDIATE: i32 = 8;
    const THREAT_MEDIUM: i32 = 5;

    let shields_up = if fuel < tuning.fuel_critical {
        false
    } else if a.immediate && fuel > tuning.fuel_low {
        true
    } else if a.threat_level >= THREAT_IMMEDIATE && fuel > tuning.fuel_moderate {
        true
    } else if a.threat_level >= THREAT_MEDIUM && fuel > tuning.fuel_good {
        true
    } else if a.closest_torp_dist < tuning.shield_torpedo_very_close && fuel > tuning.fuel_low {
        true
    } else if a.closest_enemy_dist < tuning.shield_close_range && fuel > tuning.fuel_moderate {
        true
    } else if carrying_armies && close_anything && fuel > tuning.fuel_low {
        true
    } else if planet_defense && close_anything && fuel > tuning.fuel_low {
        true
    } else {
        false
    };

    let player = &mut world.players[player_id];
    player.shields_up = fuel >= tuning.fuel_critical && shields_up;
    player.bot_shield_frame = frame;
}
