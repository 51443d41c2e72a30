//! Move application: sowing, capture, extra turn, and the end-of-game sweep

use crate::board::{next_pit, opposite_pit, Board, Role};
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Why a move was refused. The board is untouched when one of these is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("pit does not belong to the acting side")]
    InvalidPit,
    #[error("pit holds no stones")]
    EmptyPit,
}

/// Final result of a finished game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    South,
    North,
    Draw,
}

/// The most recent move, as shown to players
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMove {
    pub player: Role,
    pub pit: usize,
    pub ended_at: usize,
}

/// Everything a single move produced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    /// Slot that received the last sown stone
    pub landing: usize,
    /// Stones moved into the mover's store by a capture (0 if none)
    pub captured: u32,
    /// Landed in the mover's own store
    pub extra_turn: bool,
    /// Set when the move ended the game (after the sweep)
    pub winner: Option<Winner>,
}

// ============================================================================
// RULES
// ============================================================================

/// Apply one move for `role` starting at `pit`, returning the resulting board.
///
/// Validation happens before any stone moves, so an error leaves `board` as it was.
pub fn apply_move(board: &Board, role: Role, pit: usize) -> Result<MoveOutcome, MoveError> {
    if !role.owns_pit(pit) {
        return Err(MoveError::InvalidPit);
    }
    if board[pit] == 0 {
        return Err(MoveError::EmptyPit);
    }

    let mut next = *board;
    let landing = sow(&mut next, role, pit);
    let captured = capture(&mut next, role, landing);
    let winner = finalize_if_over(&mut next);

    Ok(MoveOutcome {
        board: next,
        landing,
        captured,
        extra_turn: landing == role.store(),
        winner,
    })
}

/// Lift every stone from `pit` and drop them one by one, skipping the opponent's store
fn sow(board: &mut Board, role: Role, pit: usize) -> usize {
    let skipped = role.opponent().store();
    let pits = board.pits_mut();
    let mut stones = std::mem::take(&mut pits[pit]);
    let mut index = pit;

    while stones > 0 {
        index = next_pit(index);
        if index == skipped {
            continue;
        }
        pits[index] += 1;
        stones -= 1;
    }

    index
}

/// Landing alone in an own empty pit takes the stones across the board
fn capture(board: &mut Board, role: Role, landing: usize) -> u32 {
    if !role.owns_pit(landing) || board[landing] != 1 {
        return 0;
    }

    let across = opposite_pit(landing);
    let taken = board[across];
    if taken == 0 {
        return 0;
    }

    let pits = board.pits_mut();
    let gained = taken + 1;
    pits[role.store()] += gained;
    pits[landing] = 0;
    pits[across] = 0;
    gained
}

/// Once a side runs out of stones, sweep the other side into its store and score.
pub fn finalize_if_over(board: &mut Board) -> Option<Winner> {
    let south_empty = board.side_empty(Role::South);
    let north_empty = board.side_empty(Role::North);
    if !south_empty && !north_empty {
        return None;
    }

    for role in [Role::South, Role::North] {
        let remainder = board.side_sum(role);
        let pits = board.pits_mut();
        pits[role.store()] += remainder;
        for index in role.pits() {
            pits[index] = 0;
        }
    }

    let south = board.score(Role::South);
    let north = board.score(Role::North);
    Some(match south.cmp(&north) {
        std::cmp::Ordering::Greater => Winner::South,
        std::cmp::Ordering::Less => Winner::North,
        std::cmp::Ordering::Equal => Winner::Draw,
    })
}

impl Board {
    /// Pits `role` may sow from
    pub fn legal_pits(&self, role: Role) -> Vec<usize> {
        role.pits().filter(|&pit| self[pit] > 0).collect()
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Board plus whose turn it is and how the game stands.
///
/// Turn order is enforced by the caller; `play` only checks the rules of the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_turn: Role,
    last_move: Option<LastMove>,
    winner: Option<Winner>,
}

impl GameState {
    /// Fresh game, south to move
    pub fn new() -> Self {
        Self::from_board(Board::initial(), Role::South)
    }

    pub fn from_board(board: Board, current_turn: Role) -> Self {
        Self {
            board,
            current_turn,
            last_move: None,
            winner: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Role {
        self.current_turn
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Apply a move for `role` and commit it
    pub fn play(&mut self, role: Role, pit: usize) -> Result<MoveOutcome, MoveError> {
        let outcome = apply_move(&self.board, role, pit)?;

        self.board = outcome.board;
        if !outcome.extra_turn {
            self.current_turn = role.opponent();
        }
        self.last_move = Some(LastMove {
            player: role,
            pit,
            ended_at: outcome.landing,
        });
        self.winner = outcome.winner;

        Ok(outcome)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
