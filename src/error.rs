//! Error types for the few AI operations that can fail on a structurally
//! invalid argument. Per-tick decision logic never returns `Result` -- it
//! always clamps to a sentinel and continues (see the design notes on
//! exceptions for control flow).

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no free player slot available (capacity {capacity})")]
    NoFreeSlot { capacity: usize },

    #[error("player slot {0} is out of range")]
    SlotOutOfRange(usize),

    #[error("player slot {0} is not occupied by a bot")]
    NotABot(usize),

    #[error("failed to load engine config overrides from {path}: {reason}")]
    ConfigLoad { path: String, reason: String },
}
