//! Replay error types

use thiserror::Error;

/// Every way a PGN can be rejected. All variants are caller input problems.
#[derive(Error, Debug)]
pub enum PgnError {
    #[error("Empty PGN content")]
    Empty,

    #[error("Invalid PGN format - could not read game")]
    NoGame,

    #[error("Invalid PGN format - {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("No valid moves found in PGN")]
    NoMoves,

    #[error("Illegal move '{san}' at ply {ply}: {reason}")]
    IllegalMove {
        ply: usize,
        san: String,
        reason: String,
    },

    #[error("Unsupported starting position: {0}")]
    InvalidSetup(String),
}
