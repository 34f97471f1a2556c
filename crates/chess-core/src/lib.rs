//! PGN replay for the coaching API.
//!
//! Turns a PGN transcript into paired white/black move records carrying SAN, UCI,
//! FEN and capture/check flags for every ply, plus the game's header metadata.

pub mod error;
pub mod game_data;
pub mod pgn;

pub use error::PgnError;
pub use game_data::{GameMetadata, HalfMove, MoveRecord, ReplayedGame};
pub use pgn::replay_pgn;
