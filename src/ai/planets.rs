//! Planet-role FSM (component C9): the highest-level per-tick decision for a
//! combat bot -- defend, repair, carry armies, bomb, take, or raid -- with
//! `apply_safe_navigation` as the shared exit point into evasion, separation,
//! and shields (§4.9).

use crate::config::AiTuning;
use crate::geometry;
use crate::world::planet::PlanetKind;
use crate::world::player::NONE;
use crate::world::{PlayerSlot, Team, World};
use glam::Vec2;
use rand_chacha::ChaCha8Rng;

use super::evasion::{advanced_dodge_direction, combat_speed_for_range};
use super::maneuver::pick_combat_maneuver;
use super::separation::{blend_with_navigation, compute_separation};
use super::shields::assess_and_activate_shields;
use super::targeting::{apply_target_lock, score_against, select_best_combat_target};
use super::threat::assess_threats;
use super::weapons::{
    can_torp_reach_target, detonate_passing_torpedoes, fire_bot_plasma, fire_bot_torpedo,
    fire_phaser_at_ship,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotRole {
    Hunter,
    Defender,
    Raider,
}

const WORLD_BOUNDS: Vec2 = Vec2::new(100_000.0, 100_000.0);

/// Common exit point for every navigation decision: overrides with C3's dodge
/// when threats require it, otherwise blends with C8's separation field, then
/// always runs the per-tick shield assessment (§4.9).
pub fn apply_safe_navigation(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
    desired_dir: f32,
    desired_speed: f32,
) {
    let player = world.players[bot_id].clone();
    let threats = assess_threats(world, tuning, &player);

    let mut dir = desired_dir;
    let mut speed = desired_speed;

    if threats.requires_evasion {
        dir = advanced_dodge_direction(world, tuning, &player, desired_dir, WORLD_BOUNDS);
        speed = super::evasion::evasion_speed(tuning, &player, &threats, rng);
    } else {
        let separation = compute_separation(tuning, world, &player);
        dir = blend_with_navigation(tuning, dir, separation);
        if threats.closest_torpedo_dist < 3_000.0 {
            speed = (speed * 1.2).min(player.ship_class.stats().max_speed);
        }
    }

    let bot = &mut world.players[bot_id];
    bot.desired_direction = geometry::normalize_angle(dir);
    bot.desired_speed = speed;

    assess_and_activate_shields(tuning, world, bot_id);
}

/// Engages `target_id` with the full combat kit: maneuver, torpedoes,
/// phasers, plasma, anti-plasma phasing, and detonation of passing shots.
fn engage_combat_target(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
    target_id: usize,
) {
    let bot = world.players[bot_id].clone();
    let target = world.players[target_id].clone();
    let distance = bot.position.distance(target.position);

    let maneuver = pick_combat_maneuver(tuning, world, &bot, &target, distance);

    if bot.bot_cooldown == 0 {
        if can_torp_reach_target(world, &bot, &target, distance) {
            fire_bot_torpedo(tuning, world, rng, bot_id, target_id);
        }
        fire_phaser_at_ship(tuning, world, bot_id, target_id);
        fire_bot_plasma(tuning, world, bot_id, target_id);
        detonate_passing_torpedoes(tuning, world, bot_id);

        if let Some(coordinated) = super::coordination::coordinate_team_attack(world, &bot, target_id) {
            let cd = &mut world.players[bot_id].bot_cooldown;
            if coordinated >= *cd {
                *cd = coordinated;
            }
        }
    }

    apply_safe_navigation(tuning, world, rng, bot_id, maneuver.direction, maneuver.speed);
}

/// Scans friendly planets for an enemy that is either in bombing range or
/// closing on the planet, scoring threats by proximity/heading plus carrier
/// and low-health bonuses; returns the most-threatened planet and its closest
/// threatening enemy (§4.9 step 1).
pub(crate) fn get_threatened_friendly_planet(tuning: &AiTuning, world: &World, team: Team) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, f32)> = None;

    for planet in world.planets.iter().filter(|p| p.owned_by(team)) {
        for enemy in world.alive_enemies_of(team) {
            let dist_to_planet = enemy.position.distance(planet.position);
            let in_bomb_range = dist_to_planet < tuning.planet_bomb_range + tuning.planet_bomb_buffer;
            let heading_to_planet = (planet.position - enemy.position).normalize_or_zero().to_angle();
            let closing = enemy.speed > 1.0
                && dist_to_planet < 12_000.0
                && geometry::angle_diff(enemy.direction, heading_to_planet) < std::f32::consts::FRAC_PI_4;

            if !in_bomb_range && !closing {
                continue;
            }
            if dist_to_planet > tuning.planet_detect_radius {
                continue;
            }

            let mut score = 1.0 / dist_to_planet.max(1.0);
            score += enemy.armies as f32 * 2.0;
            if enemy.damage_ratio() > 0.7 {
                score += 1.0;
            }

            if best.as_ref().map_or(true, |(_, _, s)| score > *s) {
                best = Some((planet.id, enemy.id, score));
            }
        }
    }

    best.map(|(planet_id, enemy_id, _)| (planet_id, enemy_id))
}

/// Positions the bot on the enemy-to-planet segment at roughly 70% of the
/// optimal intercept distance and engages with the full combat kit (§4.9).
fn defend_planet(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
    planet_id: usize,
    enemy_id: usize,
) {
    world.players[bot_id].bot_defense_target = planet_id as i32;

    let planet_pos = world.planets[planet_id].position;
    let enemy_pos = world.players[enemy_id].position;
    let bot_pos = world.players[bot_id].position;

    let hold_point = enemy_pos + (planet_pos - enemy_pos) * (1.0 - tuning.planet_approach_speed_ratio);
    let to_hold = (hold_point - bot_pos).normalize_or_zero();
    let distance_to_hold = bot_pos.distance(hold_point);

    let max_speed = world.players[bot_id].ship_class.stats().max_speed;
    let desired_dir = if distance_to_hold > 500.0 {
        to_hold.to_angle()
    } else {
        (enemy_pos - bot_pos).normalize_or_zero().to_angle()
    };
    let desired_speed = combat_speed_for_range(tuning, max_speed, distance_to_hold.max(1.0));

    engage_with_maneuver_override(tuning, world, rng, bot_id, enemy_id, desired_dir, desired_speed);
}

fn engage_with_maneuver_override(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
    target_id: usize,
    desired_dir: f32,
    desired_speed: f32,
) {
    let bot = world.players[bot_id].clone();
    let target = world.players[target_id].clone();
    let distance = bot.position.distance(target.position);

    if bot.bot_cooldown == 0 {
        if can_torp_reach_target(world, &bot, &target, distance) {
            fire_bot_torpedo(tuning, world, rng, bot_id, target_id);
        }
        fire_phaser_at_ship(tuning, world, bot_id, target_id);
        detonate_passing_torpedoes(tuning, world, bot_id);
    }

    apply_safe_navigation(tuning, world, rng, bot_id, desired_dir, desired_speed);
}

struct SelfPreservation {
    need_repair: bool,
    need_fuel: bool,
    critical_damage: bool,
}

fn assess_self_preservation(bot: &PlayerSlot) -> SelfPreservation {
    SelfPreservation {
        need_repair: bot.damage > bot.max_damage() / 2.0,
        need_fuel: bot.fuel < bot.max_fuel() / 3.0,
        critical_damage: bot.damage > bot.max_damage() * 3.0 / 4.0,
    }
}

/// A critically damaged bot breaks off and heads home even mid-engagement,
/// overriding the range check `handle_self_preservation` otherwise applies.
fn should_force_retreat(preservation: &SelfPreservation, nearest_enemy: f32) -> bool {
    preservation.critical_damage && nearest_enemy < 6_000.0
}

fn nearest_friendly_planet(world: &World, team: Team, from: Vec2, kind: Option<PlanetKind>) -> Option<usize> {
    world
        .planets
        .iter()
        .filter(|p| p.owned_by(team))
        .filter(|p| kind.map_or(true, |k| p.is(k)))
        .min_by(|a, b| {
            a.position
                .distance(from)
                .total_cmp(&b.position.distance(from))
        })
        .map(|p| p.id)
}

fn nearest_distance_to_enemy(world: &World, team: Team, from: Vec2) -> f32 {
    world
        .alive_enemies_of(team)
        .map(|e| e.position.distance(from))
        .fold(f32::MAX, f32::min)
}

/// Handles the repair/refuel branch: park in orbit if already safely docked,
/// otherwise navigate to the nearest friendly repair/fuel planet and stop.
fn handle_self_preservation(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
) -> bool {
    let bot = world.players[bot_id].clone();
    let preservation = assess_self_preservation(&bot);
    let nearest_enemy = nearest_distance_to_enemy(world, bot.team, bot.position);

    if bot.is_orbiting() {
        if let Some(planet) = world.planet(bot.orbiting) {
            if planet.owned_by(bot.team) && nearest_enemy > tuning.planet_repair_safe_enemy_range {
                world.players[bot_id].repair_request = true;
                apply_safe_navigation(tuning, world, rng, bot_id, bot.direction, 0.0);
                return true;
            }
        }
    }

    let should_retreat = should_force_retreat(&preservation, nearest_enemy)
        || (preservation.need_repair && nearest_enemy > tuning.planet_repair_exit_enemy_range && bot.speed < 2.0);

    if should_retreat {
        let kind = if preservation.need_fuel {
            PlanetKind::Fuel
        } else {
            PlanetKind::Repair
        };
        if let Some(planet_id) = nearest_friendly_planet(world, bot.team, bot.position, Some(kind))
            .or_else(|| nearest_friendly_planet(world, bot.team, bot.position, None))
        {
            let planet_pos = world.planets[planet_id].position;
            let dir = (planet_pos - bot.position).normalize_or_zero().to_angle();
            apply_safe_navigation(tuning, world, rng, bot_id, dir, tuning.planet_repair_speed_max);
            return true;
        }
    }

    false
}

fn control_ratio(world: &mut World, team: Team) -> f32 {
    let total = world.planets.len().max(1) as f32;
    world.team_planet_count(team) as f32 / total
}

/// Roles aren't stored on the player record (they're recomputed each tick);
/// approximate "defenders present" via bots currently holding a defense target.
fn count_defenders(world: &World, team: Team) -> u32 {
    world
        .players
        .iter()
        .filter(|p| p.is_alive() && p.team == team && p.bot_defense_target != NONE)
        .count() as u32
}

/// Selects the high-level role for a bot outside the tournament/defend
/// branches, per §4.9 step 5.
fn select_bot_behavior(tuning: &AiTuning, world: &mut World, bot: &PlayerSlot) -> BotRole {
    let ratio = control_ratio(world, bot.team);
    let defenders = count_defenders(world, bot.team);

    if ratio < 0.2 && defenders < 2 {
        return BotRole::Defender;
    }
    if ratio > 0.6 {
        return BotRole::Hunter;
    }
    if bot.kills_streak >= tuning.army_kill_streak_requirement {
        return BotRole::Raider;
    }
    BotRole::Hunter
}

fn hunter_behavior(tuning: &AiTuning, world: &mut World, rng: &mut ChaCha8Rng, bot_id: usize) {
    let bot = world.players[bot_id].clone();
    super::targeting::decay_lock(&mut world.players[bot_id]);
    let chosen = select_best_combat_target(tuning, world, bot_id);
    apply_target_lock(tuning, &mut world.players[bot_id], chosen);

    let bot = world.players[bot_id].clone();
    if bot.bot_target == NONE {
        world.players[bot_id].bot_target_value = 0.0;
        let speed = combat_speed_for_range(tuning, bot.ship_class.stats().max_speed, 10_000.0);
        apply_safe_navigation(tuning, world, rng, bot_id, bot.direction, speed);
    } else {
        let target_id = bot.bot_target as usize;
        let value = score_against(tuning, world, bot_id, target_id);
        world.players[bot_id].bot_target_value = value;
        engage_combat_target(tuning, world, rng, bot_id, target_id);
    }
}

fn defender_behavior(tuning: &AiTuning, world: &mut World, rng: &mut ChaCha8Rng, bot_id: usize) {
    let bot = world.players[bot_id].clone();
    if let Some((planet_id, enemy_id)) = get_threatened_friendly_planet(tuning, world, bot.team) {
        defend_planet(tuning, world, rng, bot_id, planet_id, enemy_id);
        return;
    }

    let home = nearest_friendly_planet(world, bot.team, bot.position, None);
    if let Some(planet_id) = home {
        let planet_pos = world.planets[planet_id].position;
        let distance = bot.position.distance(planet_pos);
        let dir = if distance > 6_000.0 {
            (planet_pos - bot.position).normalize_or_zero().to_angle()
        } else {
            bot.direction + 0.2
        };
        let speed = combat_speed_for_range(tuning, bot.ship_class.stats().max_speed, distance.max(3_000.0));
        apply_safe_navigation(tuning, world, rng, bot_id, dir, speed);
    } else {
        hunter_behavior(tuning, world, rng, bot_id);
    }
}

/// Picks a planet matching `matches`, preferring the one already recorded in
/// `bot_planet_approach_id` when it still qualifies so an in-progress
/// approach isn't abandoned for a marginally closer target every tick --
/// this is what lets an interrupted approach resume exactly where it left
/// off rather than re-rolling a new destination (§4.9 step 3).
fn pick_or_resume_planet(
    world: &World,
    bot: &PlayerSlot,
    matches: impl Fn(&crate::world::planet::Planet) -> bool,
) -> Option<usize> {
    if bot.bot_planet_approach_id != NONE {
        let id = bot.bot_planet_approach_id as usize;
        if let Some(planet) = world.planets.get(id) {
            if matches(planet) {
                return Some(id);
            }
        }
    }

    world
        .planets
        .iter()
        .filter(|p| matches(p))
        .min_by(|a, b| {
            a.position
                .distance(bot.position)
                .total_cmp(&b.position.distance(bot.position))
        })
        .map(|p| p.id)
}

/// Navigates toward `planet_id`, recording it as the in-progress approach.
/// Returns `true` once within `arrival_radius`, at which point the caller
/// applies whatever terminal action (orbit/beam/bomb) the role calls for.
fn navigate_toward_planet(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
    planet_id: usize,
    arrival_radius: f32,
) -> bool {
    world.players[bot_id].bot_planet_approach_id = planet_id as i32;
    let bot = world.players[bot_id].clone();
    let planet_pos = world.planets[planet_id].position;
    let distance = bot.position.distance(planet_pos);

    if distance <= arrival_radius {
        apply_safe_navigation(tuning, world, rng, bot_id, bot.direction, 0.0);
        true
    } else {
        let dir = (planet_pos - bot.position).normalize_or_zero().to_angle();
        let speed = combat_speed_for_range(tuning, bot.ship_class.stats().max_speed, distance);
        apply_safe_navigation(tuning, world, rng, bot_id, dir, speed);
        false
    }
}

/// Carrying armies: navigate to the nearest neutral planet, orbit, and beam
/// down to claim it (§4.9 step 4, "carrying armies" branch).
fn navigate_and_drop_armies(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
    bot: &PlayerSlot,
) -> bool {
    let Some(planet_id) = pick_or_resume_planet(world, bot, |p| p.is_neutral()) else {
        return false;
    };

    if navigate_toward_planet(tuning, world, rng, bot_id, planet_id, 1_500.0) {
        let slot = &mut world.players[bot_id];
        slot.orbiting = planet_id as i32;
        slot.beaming = true;
        slot.beaming_up = false;
        slot.bot_planet_approach_id = NONE;
    }
    true
}

/// Not carrying, kill streak high enough: navigate to a friendly planet still
/// holding armies, orbit, and beam up (§4.9 step 4 priority list, "pick up
/// armies"). Gated on `kills_streak >= army_kill_streak_requirement` by the
/// caller, matching the role-selection gate the same field already uses.
fn navigate_and_pickup_armies(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
    bot: &PlayerSlot,
) -> bool {
    let team = bot.team;
    let Some(planet_id) = pick_or_resume_planet(world, bot, |p| p.owned_by(team) && p.armies > 0) else {
        return false;
    };

    if navigate_toward_planet(tuning, world, rng, bot_id, planet_id, 1_500.0) {
        let slot = &mut world.players[bot_id];
        slot.orbiting = planet_id as i32;
        slot.beaming = true;
        slot.beaming_up = true;
        slot.bot_planet_approach_id = NONE;
    }
    true
}

/// Not carrying: bomb the nearest enemy planet still holding armies, breaking
/// off toward combat if badly damaged with an enemy pressing close (§4.9 step
/// 4 priority list, "bomb enemy army-planet").
fn navigate_and_bomb(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
    bot: &PlayerSlot,
) -> bool {
    let team = bot.team;
    let Some(planet_id) = pick_or_resume_planet(world, bot, |p| p.is_enemy_of(team) && p.armies > 0) else {
        return false;
    };

    let planet_pos = world.planets[planet_id].position;
    let distance = bot.position.distance(planet_pos);

    if distance < 3_000.0 {
        let nearest_enemy = nearest_distance_to_enemy(world, bot.team, bot.position);
        if bot.damage_ratio() > 2.0 / 3.0 && nearest_enemy < 2_000.0 {
            world.players[bot_id].bot_planet_approach_id = NONE;
            return false;
        }
        world.players[bot_id].bot_planet_approach_id = planet_id as i32;
        world.players[bot_id].bombing = true;
        let speed = combat_speed_for_range(tuning, bot.ship_class.stats().max_speed, distance);
        apply_safe_navigation(tuning, world, rng, bot_id, bot.direction, speed);
    } else {
        navigate_toward_planet(tuning, world, rng, bot_id, planet_id, 3_000.0);
    }
    true
}

/// Not carrying, nothing to bomb: claim a defenseless neutral planet (zero
/// armies) by orbit alone, no beaming required (§4.9 step 4 priority list,
/// "take a planet").
fn navigate_and_take(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
    bot: &PlayerSlot,
) -> bool {
    let Some(planet_id) = pick_or_resume_planet(world, bot, |p| p.is_neutral() && p.armies == 0) else {
        return false;
    };

    if navigate_toward_planet(tuning, world, rng, bot_id, planet_id, 1_500.0) {
        let slot = &mut world.players[bot_id];
        slot.orbiting = planet_id as i32;
        slot.bot_planet_approach_id = NONE;
    }
    true
}

/// Raider priority list (§4.9 step 4): carry-and-drop takes precedence over
/// everything else; otherwise pick up armies (kill streak permitting), bomb
/// an enemy army-planet, take a defenseless neutral, or fall back to combat.
/// Used both as the dedicated tournament-branch handler and as the
/// non-tournament `BotRole::Raider` handler (§4.9 step 5).
fn raider_behavior(tuning: &AiTuning, world: &mut World, rng: &mut ChaCha8Rng, bot_id: usize) {
    let bot = world.players[bot_id].clone();

    let handled = if bot.armies > 0 {
        navigate_and_drop_armies(tuning, world, rng, bot_id, &bot)
    } else if bot.kills_streak >= tuning.army_kill_streak_requirement
        && navigate_and_pickup_armies(tuning, world, rng, bot_id, &bot)
    {
        true
    } else {
        navigate_and_bomb(tuning, world, rng, bot_id, &bot)
            || navigate_and_take(tuning, world, rng, bot_id, &bot)
    };

    if !handled {
        world.players[bot_id].bot_planet_approach_id = NONE;
        hunter_behavior(tuning, world, rng, bot_id);
    }
}

/// True once at least two teams field `tournament_min_players_per_team` or
/// more alive players -- the "cluster has enough players per team" gate on
/// §4.9 step 4.
fn tournament_mode_active(tuning: &AiTuning, world: &World) -> bool {
    world
        .team_alive_counts()
        .values()
        .filter(|&&count| count >= tuning.tournament_min_players_per_team)
        .count()
        >= 2
}

/// Step 3: if a planet approach was interrupted by a higher-priority
/// override (defend, self-preservation) on an earlier tick, resume it before
/// falling through to fresh role selection, as long as the bot isn't still
/// mid-engagement with a locked combat target (§4.9 step 3).
fn resume_interrupted_approach(
    tuning: &AiTuning,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    bot_id: usize,
) -> bool {
    let bot = world.players[bot_id].clone();
    if bot.bot_planet_approach_id == NONE {
        return false;
    }
    if bot.bot_target != NONE && bot.bot_target_lock_time > 0 {
        return false;
    }

    raider_behavior(tuning, world, rng, bot_id);
    true
}

/// Runs the full planet-role FSM for one bot this tick, per the evaluation
/// order in §4.9: defend-under-threat override, self-preservation,
/// resume-interrupted-approach, the tournament branch, then non-tournament
/// role selection and its handler.
pub fn run_planet_fsm(tuning: &AiTuning, world: &mut World, rng: &mut ChaCha8Rng, bot_id: usize) {
    let bot = world.players[bot_id].clone();

    if let Some((planet_id, enemy_id)) = get_threatened_friendly_planet(tuning, world, bot.team) {
        defend_planet(tuning, world, rng, bot_id, planet_id, enemy_id);
        return;
    }
    world.players[bot_id].bot_defense_target = NONE;

    if handle_self_preservation(tuning, world, rng, bot_id) {
        return;
    }

    if resume_interrupted_approach(tuning, world, rng, bot_id) {
        return;
    }

    if tournament_mode_active(tuning, world) {
        raider_behavior(tuning, world, rng, bot_id);
        return;
    }

    let bot = world.players[bot_id].clone();
    match select_bot_behavior(tuning, world, &bot) {
        BotRole::Hunter => hunter_behavior(tuning, world, rng, bot_id),
        BotRole::Defender => defender_behavior(tuning, world, rng, bot_id),
        BotRole::Raider => raider_behavior(tuning, world, rng, bot_id),
    }
}
