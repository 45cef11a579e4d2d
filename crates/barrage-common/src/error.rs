//! Error types for Project Barrage.

use thiserror::Error;

/// Top-level error type for Barrage operations.
#[derive(Debug, Error)]
pub enum BarrageError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Weapon data errors
    #[error("Weapon data error: {0}")]
    WeaponData(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Player index outside the supported range
    #[error("Player index {player} out of range (max {max})")]
    PlayerOutOfRange {
        /// Offending player index
        player: u8,
        /// Number of supported players
        max: usize,
    },
}

/// Result type alias for Barrage operations.
pub type BarrageResult<T> = Result<T, BarrageError>;
