//! Planets: static positions with mutable ownership and army counts (§3).

use super::player::Team;
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanetKind {
    Agricultural,
    Repair,
    Fuel,
    Home,
    Core,
}

#[derive(Clone, Debug)]
pub struct Planet {
    pub id: usize,
    pub name: String,
    pub position: Vec2,
    pub owner: Option<Team>,
    pub armies: u32,
    pub kinds: Vec<PlanetKind>,
}

impl Planet {
    pub fn new(id: usize, name: impl Into<String>, position: Vec2) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            owner: None,
            armies: 0,
            kinds: Vec::new(),
        }
    }

    pub fn is(&self, kind: PlanetKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn is_neutral(&self) -> bool {
        self.owner.is_none()
    }

    pub fn owned_by(&self, team: Team) -> bool {
        self.owner == Some(team)
    }

    pub fn is_enemy_of(&self, team: Team) -> bool {
        matches!(self.owner, Some(owner) if owner != team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_planet_is_neutral() {
        let p = Planet::new(0, "Earth", Vec2::ZERO);
        assert!(p.is_neutral());
        assert!(!p.owned_by(Team::Federation));
    }

    #[test]
    fn enemy_check_excludes_neutral_and_own_team() {
        let mut p = Planet::new(0, "Earth", Vec2::ZERO);
        assert!(!p.is_enemy_of(Team::Klingon));
        p.owner = Some(Team::Federation);
        assert!(!p.is_enemy_of(Team::Federation));
        assert!(p.is_enemy_of(Team::Klingon));
    }
}
