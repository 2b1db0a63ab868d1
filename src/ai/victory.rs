//! Victory monitor (component C12): genocide/conquest/domination/timeout
//! detection (§4.12).

use crate::config::AiTuning;
use crate::world::{Team, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VictoryKind {
    Genocide,
    Conquest,
    Domination,
    Timeout,
}

impl VictoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VictoryKind::Genocide => "genocide",
            VictoryKind::Conquest => "conquest",
            VictoryKind::Domination => "domination",
            VictoryKind::Timeout => "timeout",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VictoryResult {
    pub winner: u8,
    pub kind: VictoryKind,
}

fn team_bitmask(teams: impl IntoIterator<Item = Team>) -> u8 {
    teams.into_iter().fold(0u8, |acc, t| acc | t.flag())
}

/// Checks every victory condition in priority order; returns `None` if the
/// game hasn't run long enough or doesn't yet qualify (§4.12).
pub fn check_victory(tuning: &AiTuning, world: &World, timed_out: bool) -> Option<VictoryResult> {
    if world.frame <= tuning.victory_min_frame {
        return None;
    }
    let teams_seen: std::collections::HashSet<Team> = world.teams_seen.iter().copied().collect();
    if teams_seen.len() < tuning.victory_min_teams {
        return None;
    }

    let alive_counts = world.team_alive_counts();
    let total_alive: u32 = alive_counts.values().sum();
    if (total_alive as usize) < tuning.victory_min_players {
        return None;
    }

    let teams_with_players: Vec<Team> = alive_counts.keys().copied().collect();
    if teams_with_players.len() == 1 {
        return Some(VictoryResult {
            winner: team_bitmask(teams_with_players),
            kind: VictoryKind::Genocide,
        });
    }

    let owned_planets: Vec<Team> = world.planets.iter().filter_map(|p| p.owner).collect();
    if !owned_planets.is_empty() {
        let owning_teams: std::collections::HashSet<Team> = owned_planets.iter().copied().collect();
        if owning_teams.len() == 1 {
            let team = *owning_teams.iter().next().unwrap();
            if world.planets.iter().all(|p| p.owned_by(team)) {
                return Some(VictoryResult {
                    winner: team.flag(),
                    kind: VictoryKind::Conquest,
                });
            }

            let no_enemy_carriers = world
                .players
                .iter()
                .filter(|p| p.is_alive() && p.team != team)
                .all(|p| p.armies == 0);
            if no_enemy_carriers {
                return Some(VictoryResult {
                    winner: team.flag(),
                    kind: VictoryKind::Domination,
                });
            }
        }
    }

    if timed_out {
        let mut counts: std::collections::HashMap<Team, u32> = std::collections::HashMap::new();
        for team in &owned_planets {
            *counts.entry(*team).or_insert(0) += 1;
        }
        let max_count = counts.values().copied().max().unwrap_or(0);
        if max_count > 0 {
            let winners: Vec<Team> = counts
                .into_iter()
                .filter(|(_, c)| *c == max_count)
                .map(|(t, _)| t)
                .collect();
            return Some(VictoryResult {
                winner: team_bitmask(winners),
                kind: VictoryKind::Timeout,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TUNING;
    use crate::world::planet::Planet;
    use crate::world::player::PlayerStatus;
    use glam::Vec2;

    fn populated_world(planet_count: usize) -> World {
        let planets = (0..planet_count)
            .map(|i| Planet::new(i, format!("P{i}"), Vec2::ZERO))
            .collect();
        let mut world = World::new(planets, 1);
        world.frame = 200;
        world.teams_seen = vec![Team::Federation, Team::Klingon];
        world.players[0].status = PlayerStatus::Alive;
        world.players[0].team = Team::Federation;
        world.players[1].status = PlayerStatus::Alive;
        world.players[1].team = Team::Klingon;
        world
    }

    #[test]
    fn too_early_frame_never_declares_victory() {
        let mut world = populated_world(4);
        world.frame = 10;
        for p in &mut world.planets {
            p.owner = Some(Team::Federation);
        }
        assert_eq!(check_victory(&TUNING, &world, false), None);
    }

    #[test]
    fn conquest_detected_when_one_team_owns_every_planet() {
        let mut world = populated_world(40);
        for p in &mut world.planets {
            p.owner = Some(Team::Federation);
        }
        let result = check_victory(&TUNING, &world, false).unwrap();
        assert_eq!(result.kind, VictoryKind::Conquest);
        assert_eq!(result.winner, Team::Federation.flag());
    }

    #[test]
    fn genocide_detected_when_only_one_team_has_survivors() {
        let mut world = populated_world(4);
        world.players[1].status = PlayerStatus::Dead;
        let result = check_victory(&TUNING, &world, false).unwrap();
        assert_eq!(result.kind, VictoryKind::Genocide);
        assert_eq!(result.winner, Team::Federation.flag());
    }

    #[test]
    fn domination_requires_no_surviving_enemy_carriers() {
        let mut world = populated_world(4);
        world.planets[0].owner = Some(Team::Federation);
        world.players[1].armies = 2;
        assert_eq!(check_victory(&TUNING, &world, false), None);
        world.players[1].armies = 0;
        let result = check_victory(&TUNING, &world, false).unwrap();
        assert_eq!(result.kind, VictoryKind::Domination);
    }
}
