//! NCALA Core - Sowing-board rule engine
//!
//! This crate provides the pure game logic for two-seat kalah duels:
//! - Board layout (six pits and a store per side)
//! - Sowing with the opponent-store skip
//! - Capture, extra turn, and end-of-game sweep
//! - Game state with turn order and result

pub mod board;
pub mod game;

// Re-exports for convenient access
pub use board::{Board, Role, PIT_COUNT, STONES_PER_PIT, TOTAL_STONES};
pub use game::{apply_move, GameState, LastMove, MoveError, MoveOutcome, Winner};
