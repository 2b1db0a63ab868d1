//! Shared world state: the single locked record the AI reads and mutates each tick.

pub mod planet;
pub mod player;
pub mod projectile;
pub mod ship_class;

pub use planet::{Planet, PlanetKind};
pub use player::{PlayerSlot, PlayerStatus, Team, NONE};
pub use projectile::{Plasma, Torpedo};
pub use ship_class::ShipClass;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Capacity of the player-slot table. Fixed at construction; a free slot is
/// reused rather than the vector growing at runtime (§9).
pub const MAX_PLAYERS: usize = 32;

/// Per-frame memoized aggregates, invalidated by frame inequality rather than
/// an explicit clear call (§9).
#[derive(Clone, Debug, Default)]
struct FrameCache {
    frame: u64,
    team_planet_counts: HashMap<Team, u32>,
    isolated: HashMap<usize, bool>,
}

pub struct World {
    pub players: Vec<PlayerSlot>,
    pub torpedoes: Vec<Torpedo>,
    pub plasmas: Vec<Plasma>,
    pub planets: Vec<Planet>,
    pub frame: u64,
    pub teams_seen: Vec<Team>,

    next_projectile_id: u32,
    /// Single seeded source for every AI jitter draw, so ticks are replayable.
    pub rng: ChaCha8Rng,

    cache: FrameCache,
}

impl World {
    pub fn new(planets: Vec<Planet>, seed: u64) -> Self {
        let players = (0..MAX_PLAYERS).map(PlayerSlot::free).collect();
        Self {
            players,
            torpedoes: Vec::new(),
            plasmas: Vec::new(),
            planets,
            frame: 0,
            teams_seen: Vec::new(),
            next_projectile_id: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            cache: FrameCache::default(),
        }
    }

    pub fn next_projectile_id(&mut self) -> u32 {
        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        id
    }

    pub fn free_slot(&self) -> Option<usize> {
        self.players
            .iter()
            .find(|p| p.status == PlayerStatus::Free)
            .map(|p| p.id)
    }

    pub fn alive_enemies_of(&self, team: Team) -> impl Iterator<Item = &PlayerSlot> {
        self.players
            .iter()
            .filter(move |p| p.is_alive() && p.team != team)
    }

    pub fn alive_allies_of(&self, team: Team, excluding: usize) -> impl Iterator<Item = &PlayerSlot> {
        self.players
            .iter()
            .filter(move |p| p.is_alive() && p.team == team && p.id != excluding)
    }

    pub fn player(&self, id: i32) -> Option<&PlayerSlot> {
        if id < 0 {
            return None;
        }
        self.players.get(id as usize)
    }

    pub fn planet(&self, id: i32) -> Option<&Planet> {
        if id < 0 {
            return None;
        }
        self.planets.get(id as usize)
    }

    /// Number of planets owned by `team`, memoized per frame.
    pub fn team_planet_count(&mut self, team: Team) -> u32 {
        self.refresh_cache_if_stale();
        *self.cache.team_planet_counts.entry(team).or_insert_with(|| {
            self.planets.iter().filter(|p| p.owned_by(team)).count() as u32
        })
    }

    /// Whether no allied ship sits within `radius` of the given player, memoized per frame.
    pub fn is_isolated(&mut self, player_id: usize, radius: f32) -> bool {
        self.refresh_cache_if_stale();
        if let Some(cached) = self.cache.isolated.get(&player_id) {
            return *cached;
        }
        let Some(player) = self.players.get(player_id) else {
            return true;
        };
        let team = player.team;
        let pos = player.position;
        let isolated = !self
            .players
            .iter()
            .any(|p| p.id != player_id && p.is_alive() && p.team == team && p.position.distance(pos) < radius);
        self.cache.isolated.insert(player_id, isolated);
        isolated
    }

    fn refresh_cache_if_stale(&mut self) {
        if self.cache.frame != self.frame {
            self.cache = FrameCache {
                frame: self.frame,
                ..FrameCache::default()
            };
        }
    }

    /// Reinitializes every player slot, planet ownership, and projectile list
    /// for a new game after a victory (§4.12).
    pub fn reset(&mut self) {
        for player in &mut self.players {
            player.reset_to_free();
        }
        for planet in &mut self.planets {
            planet.owner = None;
            planet.armies = 0;
        }
        self.torpedoes.clear();
        self.plasmas.clear();
        self.frame = 0;
        self.teams_seen.clear();
    }

    pub fn team_alive_counts(&self) -> HashMap<Team, u32> {
        let mut counts = HashMap::new();
        for player in self.players.iter().filter(|p| p.is_alive()) {
            *counts.entry(player.team).or_insert(0) += 1;
        }
        counts
    }

    pub fn team_army_carriers(&self, team: Team) -> impl Iterator<Item = &PlayerSlot> {
        self.players
            .iter()
            .filter(move |p| p.is_alive() && p.team == team && p.armies > 0)
    }
}

/// Position helper shared by several AI components when probing a candidate point.
pub fn is_near_any_planet(planets: &[Planet], point: Vec2, radius: f32) -> bool {
    planets.iter().any(|p| p.position.distance(point) < radius)
}
