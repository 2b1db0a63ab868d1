//! Player slot record: identity, kinematics, resources, and AI scratch fields (§3).

use super::ship_class::ShipClass;
use glam::Vec2;

/// No-owner / no-target sentinel used throughout the AI scratch fields.
pub const NONE: i32 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Team {
    Federation,
    Romulan,
    Klingon,
    Orion,
}

impl Team {
    pub const ALL: [Team; 4] = [
        Team::Federation,
        Team::Romulan,
        Team::Klingon,
        Team::Orion,
    ];

    /// Bitmask used by the victory-message `winner` field, matching §6.
    pub fn flag(self) -> u8 {
        match self {
            Team::Federation => 1,
            Team::Romulan => 2,
            Team::Klingon => 4,
            Team::Orion => 8,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerStatus {
    Free,
    Alive,
    Exploding,
    Dead,
}

#[derive(Clone, Debug)]
pub struct PlayerSlot {
    // Identity
    pub id: usize,
    pub team: Team,
    pub ship_class: ShipClass,
    pub name: String,
    pub is_bot: bool,

    // Lifecycle
    pub status: PlayerStatus,
    pub explode_timer: u32,

    // Kinematics
    pub position: Vec2,
    pub direction: f32,
    pub speed: f32,
    pub desired_direction: f32,
    pub desired_speed: f32,

    // Resources
    pub fuel: f32,
    pub weapon_temp: f32,
    pub damage: f32,
    pub shields_up: bool,
    pub armies: u8,

    // Ownership links (slot indices, `NONE` sentinel for "none")
    pub orbiting: i32,
    pub tractor_target: i32,
    pub pressor_target: i32,

    // Weapon counters
    pub torps_in_flight: u32,
    pub plasmas_in_flight: u32,

    // Flags
    pub cloaked: bool,
    pub bombing: bool,
    pub beaming: bool,
    pub beaming_up: bool,
    pub repairing: bool,
    pub repair_request: bool,

    // AI scratch fields
    pub bot_target: i32,
    pub bot_target_lock_time: u32,
    pub bot_target_value: f32,
    pub bot_defense_target: i32,
    pub bot_planet_approach_id: i32,
    pub bot_cooldown: u32,
    pub bot_shield_frame: u64,
    pub bot_goal: Option<Vec2>,
    pub kills_streak: u32,
    pub next_ship_type: i32,
}

impl PlayerSlot {
    pub fn free(id: usize) -> Self {
        Self {
            id,
            team: Team::Federation,
            ship_class: ShipClass::Scout,
            name: String::new(),
            is_bot: false,
            status: PlayerStatus::Free,
            explode_timer: 0,
            position: Vec2::ZERO,
            direction: 0.0,
            speed: 0.0,
            desired_direction: 0.0,
            desired_speed: 0.0,
            fuel: 0.0,
            weapon_temp: 0.0,
            damage: 0.0,
            shields_up: false,
            armies: 0,
            orbiting: NONE,
            tractor_target: NONE,
            pressor_target: NONE,
            torps_in_flight: 0,
            plasmas_in_flight: 0,
            cloaked: false,
            bombing: false,
            beaming: false,
            beaming_up: false,
            repairing: false,
            repair_request: false,
            bot_target: NONE,
            bot_target_lock_time: 0,
            bot_target_value: 0.0,
            bot_defense_target: NONE,
            bot_planet_approach_id: NONE,
            bot_cooldown: 0,
            bot_shield_frame: 0,
            bot_goal: None,
            kills_streak: 0,
            next_ship_type: NONE,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == PlayerStatus::Alive
    }

    pub fn max_fuel(&self) -> f32 {
        self.ship_class.stats().max_fuel
    }

    pub fn max_damage(&self) -> f32 {
        self.ship_class.stats().max_damage
    }

    pub fn damage_ratio(&self) -> f32 {
        (self.damage / self.max_damage().max(1.0)).clamp(0.0, 1.0)
    }

    pub fn is_orbiting(&self) -> bool {
        self.orbiting != NONE
    }

    /// Resets a slot to the free state for game reset, clearing every AI scratch
    /// field back to its sentinel (§4.12).
    pub fn reset_to_free(&mut self) {
        let id = self.id;
        *self = PlayerSlot::free(id);
    }
}
