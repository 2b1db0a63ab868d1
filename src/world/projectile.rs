//! In-flight weapons: torpedoes and plasmas (§3 data model).

use super::player::NONE;
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileStatus {
    Free,
    Moving,
    Detonating,
    Exploding,
}

#[derive(Clone, Debug)]
pub struct Torpedo {
    pub id: u32,
    pub owner: i32,
    pub owner_team_flag: u8,
    pub position: Vec2,
    pub direction: f32,
    pub speed: f32,
    pub damage: f32,
    pub fuse: u32,
    pub status: ProjectileStatus,
}

impl Torpedo {
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.direction.cos(), self.direction.sin()) * self.speed
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            ProjectileStatus::Moving | ProjectileStatus::Detonating
        )
    }

    /// Manually triggers detonation (§4.6); the physics layer decrements the
    /// owner's in-flight counter when it processes the explosion.
    pub fn detonate_now(&mut self) {
        self.fuse = self.fuse.min(1);
        self.status = ProjectileStatus::Detonating;
    }
}

#[derive(Clone, Debug)]
pub struct Plasma {
    pub id: u32,
    pub owner: i32,
    pub owner_team_flag: u8,
    pub position: Vec2,
    pub direction: f32,
    pub speed: f32,
    pub damage: f32,
    pub fuse: u32,
    pub status: ProjectileStatus,
}

impl Plasma {
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.direction.cos(), self.direction.sin()) * self.speed
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            ProjectileStatus::Moving | ProjectileStatus::Detonating
        )
    }
}

/// Builds a fresh torpedo record with the next id, owned by `owner`.
pub fn new_torpedo(
    id: u32,
    owner: i32,
    owner_team_flag: u8,
    position: Vec2,
    direction: f32,
    speed: f32,
    damage: f32,
    fuse: u32,
) -> Torpedo {
    debug_assert!(owner != NONE, "a torpedo must have a firing owner");
    Torpedo {
        id,
        owner,
        owner_team_flag,
        position,
        direction,
        speed,
        damage,
        fuse,
        status: ProjectileStatus::Moving,
    }
}

pub fn new_plasma(
    id: u32,
    owner: i32,
    owner_team_flag: u8,
    position: Vec2,
    direction: f32,
    speed: f32,
    damage: f32,
    fuse: u32,
) -> Plasma {
    debug_assert!(owner != NONE, "a plasma must have a firing owner");
    Plasma {
        id,
        owner,
        owner_team_flag,
        position,
        direction,
        speed,
        damage,
        fuse,
        status: ProjectileStatus::Moving,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detonate_now_caps_fuse_and_flags_detonating() {
        let mut t = new_torpedo(1, 0, 1, Vec2::ZERO, 0.0, 400.0, 20.0, 30);
        t.detonate_now();
        assert_eq!(t.fuse, 1);
        assert_eq!(t.status, ProjectileStatus::Detonating);
    }

    #[test]
    fn velocity_matches_direction_and_speed() {
        let t = new_torpedo(1, 0, 1, Vec2::ZERO, 0.0, 400.0, 20.0, 30);
        let v = t.velocity();
        assert!((v.x - 400.0).abs() < 1e-3);
        assert!(v.y.abs() < 1e-3);
    }
}
