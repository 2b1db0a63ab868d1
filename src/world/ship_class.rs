//! Immutable ship class table (component of the §3 data model).

/// Closed set of hull types a player slot can be assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShipClass {
    Scout,
    Destroyer,
    Cruiser,
    Battleship,
    Assault,
    Starbase,
}

impl ShipClass {
    pub const fn stats(self) -> ShipClassStats {
        match self {
            ShipClass::Scout => ShipClassStats {
                max_speed: 12.0,
                max_damage: 100.0,
                max_shields: 100.0,
                max_fuel: 5_000.0,
                max_armies: 2,
                max_weapon_temp: 1_000.0,
                torp_speed: 450.0,
                torp_damage: 16.0,
                torp_fuel_mult: 3.0,
                torp_fuse: 25,
                phaser_damage: 36.0,
                phaser_fuel_mult: 4.0,
                plasma_speed: 0.0,
                plasma_damage: 0.0,
                plasma_fuse: 0,
                plasma_fuel_mult: 0.0,
                has_plasma: false,
                deceleration: 0.985,
                safety_margin: 1.3,
            },
            ShipClass::Destroyer => ShipClassStats {
                max_speed: 10.0,
                max_damage: 140.0,
                max_shields: 140.0,
                max_fuel: 6_000.0,
                max_armies: 3,
                max_weapon_temp: 1_100.0,
                torp_speed: 425.0,
                torp_damage: 20.0,
                torp_fuel_mult: 3.2,
                torp_fuse: 28,
                phaser_damage: 42.0,
                phaser_fuel_mult: 4.2,
                plasma_speed: 0.0,
                plasma_damage: 0.0,
                plasma_fuse: 0,
                plasma_fuel_mult: 0.0,
                has_plasma: false,
                deceleration: 0.982,
                safety_margin: 1.25,
            },
            ShipClass::Cruiser => ShipClassStats {
                max_speed: 9.0,
                max_damage: 180.0,
                max_shields: 180.0,
                max_fuel: 7_500.0,
                max_armies: 4,
                max_weapon_temp: 1_200.0,
                torp_speed: 400.0,
                torp_damage: 24.0,
                torp_fuel_mult: 3.5,
                torp_fuse: 30,
                phaser_damage: 48.0,
                phaser_fuel_mult: 4.5,
                plasma_speed: 300.0,
                plasma_damage: 70.0,
                plasma_fuse: 40,
                plasma_fuel_mult: 6.0,
                has_plasma: true,
                deceleration: 0.978,
                safety_margin: 1.2,
            },
            ShipClass::Battleship => ShipClassStats {
                max_speed: 8.0,
                max_damage: 220.0,
                max_shields: 220.0,
                max_fuel: 9_000.0,
                max_armies: 6,
                max_weapon_temp: 1_300.0,
                torp_speed: 380.0,
                torp_damage: 28.0,
                torp_fuel_mult: 3.8,
                torp_fuse: 32,
                phaser_damage: 54.0,
                phaser_fuel_mult: 4.8,
                plasma_speed: 280.0,
                plasma_damage: 90.0,
                plasma_fuse: 45,
                plasma_fuel_mult: 6.5,
                has_plasma: true,
                deceleration: 0.975,
                safety_margin: 1.15,
            },
            ShipClass::Assault => ShipClassStats {
                max_speed: 9.0,
                max_damage: 160.0,
                max_shields: 160.0,
                max_fuel: 6_500.0,
                max_armies: 10,
                max_weapon_temp: 1_100.0,
                torp_speed: 410.0,
                torp_damage: 20.0,
                torp_fuel_mult: 3.4,
                torp_fuse: 28,
                phaser_damage: 40.0,
                phaser_fuel_mult: 4.2,
                plasma_speed: 0.0,
                plasma_damage: 0.0,
                plasma_fuse: 0,
                plasma_fuel_mult: 0.0,
                has_plasma: false,
                deceleration: 0.98,
                safety_margin: 1.25,
            },
            ShipClass::Starbase => ShipClassStats {
                max_speed: 0.0,
                max_damage: 600.0,
                max_shields: 600.0,
                max_fuel: 20_000.0,
                max_armies: 0,
                max_weapon_temp: 2_000.0,
                torp_speed: 350.0,
                torp_damage: 30.0,
                torp_fuel_mult: 3.0,
                torp_fuse: 35,
                phaser_damage: 60.0,
                phaser_fuel_mult: 3.5,
                plasma_speed: 260.0,
                plasma_damage: 100.0,
                plasma_fuse: 50,
                plasma_fuel_mult: 5.0,
                has_plasma: true,
                deceleration: 1.0,
                safety_margin: 1.1,
            },
        }
    }
}

/// Per-class tunables consumed by the weapon, shield, and maneuver components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShipClassStats {
    pub max_speed: f32,
    pub max_damage: f32,
    pub max_shields: f32,
    pub max_fuel: f32,
    pub max_armies: u8,
    pub max_weapon_temp: f32,
    pub torp_speed: f32,
    pub torp_damage: f32,
    pub torp_fuel_mult: f32,
    pub torp_fuse: u32,
    pub phaser_damage: f32,
    pub phaser_fuel_mult: f32,
    pub plasma_speed: f32,
    pub plasma_damage: f32,
    pub plasma_fuse: u32,
    pub plasma_fuel_mult: f32,
    pub has_plasma: bool,
    pub deceleration: f32,
    pub safety_margin: f32,
}
