//! Board layout: two rows of six pits plus a store per side

use serde::{Deserialize, Serialize};
use std::ops::{Index, Range};

/// Number of slots on the board (12 sowing pits + 2 stores)
pub const PIT_COUNT: usize = 14;

/// Stones placed in every sowing pit at the start of a match
pub const STONES_PER_PIT: u32 = 4;

/// Stones on the board for the whole match
pub const TOTAL_STONES: u32 = STONES_PER_PIT * 12;

const SOUTH_STORE: usize = 6;
const NORTH_STORE: usize = 13;

// ============================================================================
// ROLES
// ============================================================================

/// Seat at the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    South,
    North,
}

impl Role {
    pub fn opponent(self) -> Self {
        match self {
            Role::South => Role::North,
            Role::North => Role::South,
        }
    }

    /// Indices of this role's six sowing pits
    pub fn pits(self) -> Range<usize> {
        match self {
            Role::South => 0..SOUTH_STORE,
            Role::North => 7..NORTH_STORE,
        }
    }

    /// Index of this role's store
    pub fn store(self) -> usize {
        match self {
            Role::South => SOUTH_STORE,
            Role::North => NORTH_STORE,
        }
    }

    /// True if `index` is one of this role's sowing pits (never the store)
    pub fn owns_pit(self, index: usize) -> bool {
        self.pits().contains(&index)
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Stone counts, indexed 0-5 south pits, 6 south store, 7-12 north pits, 13 north store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([u32; PIT_COUNT]);

impl Board {
    /// Opening position: four stones in every sowing pit, empty stores
    pub fn initial() -> Self {
        let mut pits = [STONES_PER_PIT; PIT_COUNT];
        pits[SOUTH_STORE] = 0;
        pits[NORTH_STORE] = 0;
        Self(pits)
    }

    pub const fn from_pits(pits: [u32; PIT_COUNT]) -> Self {
        Self(pits)
    }

    pub fn pits(&self) -> &[u32; PIT_COUNT] {
        &self.0
    }

    /// Stones sitting in `role`'s store
    pub fn score(&self, role: Role) -> u32 {
        self.0[role.store()]
    }

    /// Stones left in `role`'s six sowing pits
    pub fn side_sum(&self, role: Role) -> u32 {
        self.0[role.pits()].iter().sum()
    }

    pub fn side_empty(&self, role: Role) -> bool {
        self.0[role.pits()].iter().all(|&n| n == 0)
    }

    /// Stones on the whole board; constant for a match
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    pub(crate) fn pits_mut(&mut self) -> &mut [u32; PIT_COUNT] {
        &mut self.0
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl Index<usize> for Board {
    type Output = u32;

    fn index(&self, index: usize) -> &u32 {
        &self.0[index]
    }
}

/// Next slot in sowing order
pub fn next_pit(index: usize) -> usize {
    (index + 1) % PIT_COUNT
}

/// Pit facing `index` across the board (sowing pits only)
pub fn opposite_pit(index: usize) -> usize {
    12 - index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_board() {
        let board = Board::initial();
        assert_eq!(board.pits(), &[4, 4, 4, 4, 4, 4, 0, 4, 4, 4, 4, 4, 4, 0]);
        assert_eq!(board.total(), TOTAL_STONES);
        assert_eq!(board.score(Role::South), 0);
        assert_eq!(board.side_sum(Role::North), 24);
    }

    #[test]
    fn test_role_layout() {
        assert!(Role::South.owns_pit(0));
        assert!(Role::South.owns_pit(5));
        assert!(!Role::South.owns_pit(6)); // store is not a sowing pit
        assert!(Role::North.owns_pit(7));
        assert!(!Role::North.owns_pit(13));
        assert_eq!(Role::North.opponent(), Role::South);
    }

    #[test]
    fn test_opposite_pits_pair_up() {
        for pit in Role::South.pits() {
            let across = opposite_pit(pit);
            assert!(Role::North.owns_pit(across));
            assert_eq!(opposite_pit(across), pit);
        }
        assert_eq!(next_pit(13), 0);
    }

    #[test]
    fn test_board_serializes_as_array() {
        let json = serde_json::to_string(&Board::initial()).unwrap();
        assert_eq!(json, "[4,4,4,4,4,4,0,4,4,4,4,4,4,0]");
        assert_eq!(serde_json::to_string(&Role::North).unwrap(), "\"north\"");
    }
}
