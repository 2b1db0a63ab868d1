//! Tunable constants for every AI component, plus an optional TOML overlay so
//! operators can retune without recompiling.

use serde::Deserialize;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

/// Encapsulates every numeric threshold named across the component designs so
/// they can be tuned holistically rather than scattered through the code.
#[derive(Clone, Copy, Debug)]
pub struct AiTuning {
    // C2 threat model
    pub torpedo_threat_scan_range: f32,
    pub torpedo_threat_sim_ticks: u32,
    pub torpedo_threat_sim_step: f32,
    pub torpedo_threat_close_separation: f32,
    pub torpedo_threat_cone: f32,
    pub torpedo_threat_cone_range: f32,
    pub torpedo_threat_always_range: f32,
    pub threat_band_close: f32,
    pub threat_band_mid: f32,
    pub near_planet_radius: f32,
    pub plasma_threat_range: f32,
    pub nearby_enemy_range: f32,
    pub nearby_enemy_close_range: f32,
    pub nearby_enemy_cone: f32,

    // C3 evasion
    pub evasion_candidate_step: f32,
    pub evasion_candidate_count: i32,
    pub evasion_torpedo_sim_ticks: u32,
    pub evasion_torpedo_sim_step: f32,
    pub evasion_torpedo_danger_range: f32,
    pub evasion_plasma_danger_range: f32,
    pub evasion_wanted_dir_weight: f32,
    pub evasion_wall_probe_range: f32,
    pub evasion_wall_clear_min: f32,
    pub evasion_planet_block_radius: f32,
    pub evasion_planet_precompute_radius: f32,
    pub evasion_speed_high_threat: u32,
    pub evasion_speed_mid_threat: u32,
    pub evasion_combat_speed_range: f32,

    // C4 targeting
    pub target_max_range: f32,
    pub target_distance_score_scale: f32,
    pub target_damage_high_ratio: f32,
    pub target_damage_high_bonus: f32,
    pub target_damage_mid_ratio: f32,
    pub target_damage_mid_scale: f32,
    pub target_damage_low_scale: f32,
    pub target_army_base_bonus: f32,
    pub target_army_per_unit_bonus: f32,
    pub target_speed_advantage_scale: f32,
    pub target_cloak_far_penalty: f32,
    pub target_cloak_far_range: f32,
    pub target_cloak_close_bonus: f32,
    pub target_isolation_bonus: f32,
    pub target_isolation_radius: f32,
    pub target_lock_persistence_bonus: f32,
    pub target_lock_replace_margin: f32,
    pub target_lock_fresh_ticks: u32,
    pub target_lock_confirm_min_ticks: u32,
    pub target_lock_max_range: f32,

    // C5 maneuver
    pub maneuver_far_band: f32,
    pub maneuver_mid_band: f32,
    pub maneuver_near_band: f32,
    pub maneuver_close_range: f32,
    pub maneuver_offset_angle: f32,

    // C6 weapons
    pub weapon_temp_headroom: f32,
    pub torp_heat: f32,
    pub phaser_heat: f32,
    pub plasma_heat: f32,
    pub torp_spread_angle: f32,
    pub torp_burst_count: u32,
    pub torp_burst_cooldown: u32,
    pub torp_spread_cooldown: u32,
    pub torp_single_cooldown: u32,
    pub torp_range_shrink_fast: f32,
    pub torp_range_shrink_fast_threshold: f32,
    pub torp_range_shrink_med: f32,
    pub torp_range_shrink_med_threshold: f32,
    pub torp_spread_band_lo: f32,
    pub torp_spread_band_hi: f32,
    pub torp_burst_damage_ratio: f32,
    pub torp_burst_range_ratio: f32,
    pub phaser_fire_damage_ratio: f32,
    pub phaser_fire_close_range: f32,
    pub plasma_finisher_damage_ratio: f32,
    pub plasma_finisher_range_ratio: f32,
    pub plasma_orbit_range_ratio: f32,
    pub torpedo_detonate_ring_min: f32,
    pub torpedo_detonate_ring_max: f32,
    pub torpedo_detonate_passby_angle: f32,
    pub torpedo_detonate_cluster_range: f32,
    pub torpedo_detonate_cluster_count: u32,

    // C7 shields
    pub shield_phaser_range_ratio: f32,
    pub shield_phaser_range_ratio_immediate: f32,
    pub shield_very_close_range: f32,
    pub shield_close_range: f32,
    pub shield_torpedo_very_close: f32,
    pub shield_torpedo_close: f32,
    pub shield_plasma_far_ring: f32,
    pub shield_plasma_close_ring: f32,
    pub fuel_low: f32,
    pub fuel_moderate: f32,
    pub fuel_good: f32,
    pub fuel_critical: f32,

    // C8 separation
    pub separation_min_safe_distance: f32,
    pub separation_critical_distance: f32,
    pub separation_ideal_distance: f32,
    pub separation_same_target_mult: f32,
    pub separation_damaged_ally_mult_high: f32,
    pub separation_damaged_ally_ratio_high: f32,
    pub separation_damaged_ally_mult_mid: f32,
    pub separation_damaged_ally_ratio_mid: f32,
    pub separation_cluster_min_allies: u32,
    pub separation_cluster_mult: f32,
    pub separation_scale_per_ally: f32,
    pub separation_scale_cap: f32,
    pub separation_blend_divisor: f32,
    pub separation_blend_max_weight: f32,

    // C9 planet roles
    pub planet_detect_radius: f32,
    pub planet_bomb_range: f32,
    pub planet_bomb_buffer: f32,
    pub planet_approach_speed_ratio: f32,
    pub planet_repair_damage_ratio: f32,
    pub planet_repair_safe_enemy_range: f32,
    pub planet_repair_exit_enemy_range: f32,
    pub planet_repair_speed_max: f32,
    pub army_kill_streak_requirement: u32,
    pub planet_engage_range: f32,
    pub tournament_min_players_per_team: u32,

    // C10 starbase
    pub starbase_detect_range: f32,
    pub starbase_fire_angle: f32,
    pub starbase_phaser_range: f32,
    pub starbase_plasma_band: f32,
    pub starbase_patrol_radius: f32,
    pub starbase_retreat_speed: f32,

    // C11 coordination
    pub coordination_focus_damage_ratio: f32,
    pub coordination_focus_kills: u32,
    pub coordination_broadcast_radius: f32,
    pub coordination_broadcast_score_threshold: f32,

    // C12 victory
    pub victory_min_frame: u64,
    pub victory_min_teams: usize,
    pub victory_min_players: usize,
    pub victory_reset_delay_secs: u64,
}

pub const TUNING: AiTuning = AiTuning {
    torpedo_threat_scan_range: 5_000.0,
    torpedo_threat_sim_ticks: 5,
    torpedo_threat_sim_step: 0.2,
    torpedo_threat_close_separation: 800.0,
    torpedo_threat_cone: std::f32::consts::PI / 2.5,
    torpedo_threat_cone_range: 4_000.0,
    torpedo_threat_always_range: 1_500.0,
    threat_band_close: 2_000.0,
    threat_band_mid: 4_000.0,
    near_planet_radius: 10_000.0,
    plasma_threat_range: 4_000.0,
    nearby_enemy_range: 5_000.0,
    nearby_enemy_close_range: 2_000.0,
    nearby_enemy_cone: std::f32::consts::PI / 6.0,

    evasion_candidate_step: std::f32::consts::PI / 12.0,
    evasion_candidate_count: 12,
    evasion_torpedo_sim_ticks: 3,
    evasion_torpedo_sim_step: 0.5,
    evasion_torpedo_danger_range: 700.0,
    evasion_plasma_danger_range: 1_000.0,
    evasion_wanted_dir_weight: 100.0,
    evasion_wall_probe_range: 5_000.0,
    evasion_wall_clear_min: 3_000.0,
    evasion_planet_block_radius: 2_000.0,
    evasion_planet_precompute_radius: 12_000.0,
    evasion_speed_high_threat: 5,
    evasion_speed_mid_threat: 3,
    evasion_combat_speed_range: 3_000.0,

    target_max_range: 25_000.0,
    target_distance_score_scale: 20_000.0,
    target_damage_high_ratio: 0.8,
    target_damage_high_bonus: 8_000.0,
    target_damage_mid_ratio: 0.5,
    target_damage_mid_scale: 5_000.0,
    target_damage_low_scale: 3_000.0,
    target_army_base_bonus: 10_000.0,
    target_army_per_unit_bonus: 1_500.0,
    target_speed_advantage_scale: 300.0,
    target_cloak_far_penalty: 6_000.0,
    target_cloak_far_range: 2_000.0,
    target_cloak_close_bonus: 2_000.0,
    target_isolation_bonus: 2_000.0,
    target_isolation_radius: 5_000.0,
    target_lock_persistence_bonus: 3_000.0,
    target_lock_replace_margin: 0.2,
    target_lock_fresh_ticks: 30,
    target_lock_confirm_min_ticks: 10,
    target_lock_max_range: 30_000.0,

    maneuver_far_band: 6_000.0,
    maneuver_mid_band: 3_000.0,
    maneuver_near_band: 1_500.0,
    maneuver_close_range: 3_000.0,
    maneuver_offset_angle: std::f32::consts::PI / 8.0,

    weapon_temp_headroom: 100.0,
    torp_heat: 50.0,
    phaser_heat: 70.0,
    plasma_heat: 100.0,
    torp_spread_angle: std::f32::consts::PI / 16.0,
    torp_burst_count: 4,
    torp_burst_cooldown: 2,
    torp_spread_cooldown: 5,
    torp_single_cooldown: 3,
    torp_range_shrink_fast: 0.8,
    torp_range_shrink_fast_threshold: 0.9,
    torp_range_shrink_med: 0.9,
    torp_range_shrink_med_threshold: 0.75,
    torp_spread_band_lo: 0.45,
    torp_spread_band_hi: 0.75,
    torp_burst_damage_ratio: 0.7,
    torp_burst_range_ratio: 0.6,
    phaser_fire_damage_ratio: 0.5,
    phaser_fire_close_range: 1_500.0,
    plasma_finisher_damage_ratio: 0.6,
    plasma_finisher_range_ratio: 0.75,
    plasma_orbit_range_ratio: 0.75,
    torpedo_detonate_ring_min: 800.0,
    torpedo_detonate_ring_max: 2_500.0,
    torpedo_detonate_passby_angle: std::f32::consts::PI / 4.0,
    torpedo_detonate_cluster_range: 3_000.0,
    torpedo_detonate_cluster_count: 3,

    shield_phaser_range_ratio: 1.0,
    shield_phaser_range_ratio_immediate: 0.8,
    shield_very_close_range: 1_200.0,
    shield_close_range: 2_500.0,
    shield_torpedo_very_close: 800.0,
    shield_torpedo_close: 2_000.0,
    shield_plasma_far_ring: 4_000.0,
    shield_plasma_close_ring: 2_000.0,
    fuel_low: 500.0,
    fuel_moderate: 1_000.0,
    fuel_good: 2_000.0,
    fuel_critical: 250.0,

    separation_min_safe_distance: 1_200.0,
    separation_critical_distance: 300.0,
    separation_ideal_distance: 700.0,
    separation_same_target_mult: 1.8,
    separation_damaged_ally_mult_high: 2.0,
    separation_damaged_ally_ratio_high: 0.5,
    separation_damaged_ally_mult_mid: 1.5,
    separation_damaged_ally_ratio_mid: 0.3,
    separation_cluster_min_allies: 2,
    separation_cluster_mult: 1.3,
    separation_scale_per_ally: 0.3,
    separation_scale_cap: 2.5,
    separation_blend_divisor: 5.0,
    separation_blend_max_weight: 0.8,

    planet_detect_radius: 20_000.0,
    planet_bomb_range: 8_000.0,
    planet_bomb_buffer: 2_000.0,
    planet_approach_speed_ratio: 0.7,
    planet_repair_damage_ratio: 0.5,
    planet_repair_safe_enemy_range: 10_000.0,
    planet_repair_exit_enemy_range: 8_000.0,
    planet_repair_speed_max: 2.0,
    army_kill_streak_requirement: 2,
    planet_engage_range: 20_000.0,
    tournament_min_players_per_team: 2,

    starbase_detect_range: 15_000.0,
    starbase_fire_angle: 0.3,
    starbase_phaser_range: 4_000.0,
    starbase_plasma_band: 8_000.0,
    starbase_patrol_radius: 15_000.0,
    starbase_retreat_speed: 2.0,

    coordination_focus_damage_ratio: 0.4,
    coordination_focus_kills: 3,
    coordination_broadcast_radius: 8_000.0,
    coordination_broadcast_score_threshold: 25_000.0,

    victory_min_frame: 100,
    victory_min_teams: 2,
    victory_min_players: 2,
    victory_reset_delay_secs: 10,
};

/// Sparse TOML overlay: any field left unset keeps its `TUNING` default.
/// Mirrors the tested-range-annotated override pattern used for physics tuning
/// elsewhere in this project's lineage.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfigOverlay {
    pub torpedo_threat_scan_range: Option<f32>,
    pub target_max_range: Option<f32>,
    pub separation_min_safe_distance: Option<f32>,
    pub army_kill_streak_requirement: Option<u32>,
    pub victory_reset_delay_secs: Option<u64>,
}

impl EngineConfigOverlay {
    pub fn apply(&self, tuning: &mut AiTuning) {
        if let Some(v) = self.torpedo_threat_scan_range {
            tuning.torpedo_threat_scan_range = v;
        }
        if let Some(v) = self.target_max_range {
            tuning.target_max_range = v;
        }
        if let Some(v) = self.separation_min_safe_distance {
            tuning.separation_min_safe_distance = v;
        }
        if let Some(v) = self.army_kill_streak_requirement {
            tuning.army_kill_streak_requirement = v;
        }
        if let Some(v) = self.victory_reset_delay_secs {
            tuning.victory_reset_delay_secs = v;
        }
    }

    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::ConfigLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| EngineError::ConfigLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Loads the overlay at `path` and applies it on top of `TUNING`, falling back
/// to the unmodified defaults if the file is absent.
pub fn load_tuning(path: impl AsRef<Path>) -> EngineResult<AiTuning> {
    let mut tuning = TUNING;
    let path = path.as_ref();
    if path.exists() {
        let overlay = EngineConfigOverlay::load(path)?;
        overlay.apply(&mut tuning);
    }
    Ok(tuning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn overlay_only_touches_specified_fields() {
        let mut tuning = TUNING;
        let overlay = EngineConfigOverlay {
            target_max_range: Some(10_000.0),
            ..Default::default()
        };
        overlay.apply(&mut tuning);
        assert_eq!(tuning.target_max_range, 10_000.0);
        assert_eq!(
            tuning.separation_min_safe_distance,
            TUNING.separation_min_safe_distance
        );
    }

    #[test]
    fn load_tuning_missing_file_returns_defaults() {
        let tuning = load_tuning("/nonexistent/path/engine.toml").unwrap();
        assert_eq!(tuning.target_max_range, TUNING.target_max_range);
    }

    #[test]
    fn load_tuning_reads_overlay_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "army_kill_streak_requirement = 7").unwrap();
        let tuning = load_tuning(&path).unwrap();
        assert_eq!(tuning.army_kill_streak_requirement, 7);
    }
}
