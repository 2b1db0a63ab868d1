//! Netrek-style bot AI engine: a tick-driven decision layer over a shared
//! world, plus the runtime shell server glue drives it through.

pub mod ai;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod world;

pub use config::{load_tuning, AiTuning, TUNING};
pub use engine::{Engine, EngineEvent, PhaserOutcome};
pub use error::{EngineError, EngineResult};
pub use world::{Planet, PlanetKind, PlayerSlot, ShipClass, Team, World};
