//! Match registry
//!
//! Owns every live match, keyed by invite code. Matches are created, joined,
//! looked up and removed only through [`MatchRegistry`].

use crate::invite::InviteCode;
use ncala_core::{GameState, MoveError, MoveOutcome, Role};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Identity of one client connection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Match lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Creator seated, waiting for an opponent
    Waiting,
    Active,
    Finished,
    /// A seated player left; the match is gone
    Abandoned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no match with that code")]
    NotFound,
    #[error("match already has two players")]
    Full,
}

/// Connections sitting at the board
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Seats {
    pub south: Option<ConnectionId>,
    pub north: Option<ConnectionId>,
}

impl Seats {
    pub fn get(&self, role: Role) -> Option<ConnectionId> {
        match role {
            Role::South => self.south,
            Role::North => self.north,
        }
    }

    fn role_of(&self, conn: ConnectionId) -> Option<Role> {
        if self.south == Some(conn) {
            Some(Role::South)
        } else if self.north == Some(conn) {
            Some(Role::North)
        } else {
            None
        }
    }

    fn clear(&mut self, role: Role) {
        match role {
            Role::South => self.south = None,
            Role::North => self.north = None,
        }
    }
}

// ============================================================================
// MATCH
// ============================================================================

/// One two-seat duel
#[derive(Clone, Debug)]
pub struct Match {
    code: InviteCode,
    game: GameState,
    seats: Seats,
    status: MatchStatus,
}

impl Match {
    fn new(code: InviteCode, creator: ConnectionId) -> Self {
        Self {
            code,
            game: GameState::new(),
            seats: Seats {
                south: Some(creator),
                north: None,
            },
            status: MatchStatus::Waiting,
        }
    }

    pub fn code(&self) -> &InviteCode {
        &self.code
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn seats(&self) -> Seats {
        self.seats
    }

    /// Seat held by `conn`, if it plays in this match
    pub fn seat_of(&self, conn: ConnectionId) -> Option<Role> {
        self.seats.role_of(conn)
    }

    /// Seated connections, south first
    pub fn connections(&self) -> impl Iterator<Item = (Role, ConnectionId)> + '_ {
        [Role::South, Role::North]
            .into_iter()
            .filter_map(|role| self.seats.get(role).map(|conn| (role, conn)))
    }

    pub fn players_ready(&self) -> bool {
        self.seats.south.is_some() && self.seats.north.is_some()
    }

    /// Apply a board move and mark the match finished if it ended the game.
    /// Turn and status checks belong to the caller.
    pub fn play(&mut self, role: Role, pit: usize) -> Result<MoveOutcome, MoveError> {
        let outcome = self.game.play(role, pit)?;
        if outcome.winner.is_some() {
            self.status = MatchStatus::Finished;
        }
        Ok(outcome)
    }

    #[cfg(test)]
    pub(crate) fn set_game(&mut self, game: GameState) {
        self.game = game;
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// All live matches
pub struct MatchRegistry {
    matches: FxHashMap<InviteCode, Match>,
    rng: ChaCha8Rng,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    /// Deterministic invite codes
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            matches: FxHashMap::default(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Register a new waiting match with `creator` seated south.
    ///
    /// The caller must have removed `creator` from any match it already sits in.
    pub fn create(&mut self, creator: ConnectionId) -> &Match {
        let code = self.unique_code();
        tracing::info!("{} created match {}", creator, code);
        self.matches
            .entry(code.clone())
            .or_insert_with(|| Match::new(code, creator))
    }

    /// Seat `conn` north in the match named by `code` (any case)
    pub fn join(&mut self, conn: ConnectionId, code: &str) -> Result<&Match, RegistryError> {
        let code = InviteCode::normalize(code);
        let game = self.matches.get_mut(&code).ok_or(RegistryError::NotFound)?;
        if game.seats.north.is_some() {
            return Err(RegistryError::Full);
        }

        game.seats.north = Some(conn);
        game.status = MatchStatus::Active;
        tracing::info!("{} joined match {}", conn, code);
        Ok(game)
    }

    pub fn lookup(&self, code: &str) -> Option<&Match> {
        self.matches.get(&InviteCode::normalize(code))
    }

    pub fn lookup_mut(&mut self, code: &str) -> Option<&mut Match> {
        self.matches.get_mut(&InviteCode::normalize(code))
    }

    /// Unseat `conn` from its match, abandon the match, and drop it from the
    /// registry. Returns the abandoned match so the remaining seat can be told.
    pub fn remove(&mut self, conn: ConnectionId) -> Option<Match> {
        let (code, role) = self
            .matches
            .iter()
            .find_map(|(code, game)| game.seat_of(conn).map(|role| (code.clone(), role)))?;

        let mut game = self.matches.remove(&code)?;
        game.seats.clear(role);
        game.status = MatchStatus::Abandoned;
        tracing::info!("{} left match {}, match abandoned", conn, code);
        Some(game)
    }

    /// Re-roll until the code is not in use
    fn unique_code(&mut self) -> InviteCode {
        loop {
            let code = InviteCode::generate(&mut self.rng);
            if !self.matches.contains_key(&code) {
                return code;
            }
        }
    }
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALICE: ConnectionId = ConnectionId(1);
    const BOB: ConnectionId = ConnectionId(2);
    const CAROL: ConnectionId = ConnectionId(3);

    #[test]
    fn test_create_seats_creator_south() {
        let mut registry = MatchRegistry::with_seed(1);
        let game = registry.create(ALICE);

        assert_eq!(game.status(), MatchStatus::Waiting);
        assert_eq!(game.seat_of(ALICE), Some(Role::South));
        assert!(!game.players_ready());
        assert_eq!(game.game().current_turn(), Role::South);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_join_activates_match() {
        let mut registry = MatchRegistry::with_seed(1);
        let code = registry.create(ALICE).code().clone();

        let game = registry.join(BOB, &code.as_str().to_lowercase()).unwrap();
        assert_eq!(game.status(), MatchStatus::Active);
        assert_eq!(game.seat_of(BOB), Some(Role::North));
        assert!(game.players_ready());
        assert_eq!(
            game.connections().collect::<Vec<_>>(),
            vec![(Role::South, ALICE), (Role::North, BOB)]
        );
    }

    #[test]
    fn test_join_errors() {
        let mut registry = MatchRegistry::with_seed(1);
        let code = registry.create(ALICE).code().clone();

        assert_eq!(registry.join(BOB, "ZZZZZ").unwrap_err(), RegistryError::NotFound);
        registry.join(BOB, code.as_str()).unwrap();
        assert_eq!(registry.join(CAROL, code.as_str()).unwrap_err(), RegistryError::Full);
    }

    #[test]
    fn test_remove_abandons_and_frees_code() {
        let mut registry = MatchRegistry::with_seed(1);
        let code = registry.create(ALICE).code().clone();
        registry.join(BOB, code.as_str()).unwrap();

        let gone = registry.remove(BOB).unwrap();
        assert_eq!(gone.status(), MatchStatus::Abandoned);
        assert_eq!(gone.seats().north, None);
        assert_eq!(gone.seats().south, Some(ALICE));
        assert!(registry.lookup(code.as_str()).is_none());
        assert!(registry.is_empty());

        // ALICE is no longer seated anywhere
        assert!(registry.remove(ALICE).is_none());
    }

    #[test]
    fn test_remove_waiting_match() {
        let mut registry = MatchRegistry::with_seed(1);
        let code = registry.create(ALICE).code().clone();

        let gone = registry.remove(ALICE).unwrap();
        assert_eq!(gone.status(), MatchStatus::Abandoned);
        assert!(gone.connections().next().is_none());
        assert!(registry.lookup(code.as_str()).is_none());
    }

    #[test]
    fn test_remove_unknown_connection() {
        let mut registry = MatchRegistry::with_seed(1);
        registry.create(ALICE);
        assert!(registry.remove(CAROL).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_collision_is_rerolled() {
        let seed = 9;
        let first = InviteCode::generate(&mut ChaCha8Rng::seed_from_u64(seed));

        let mut registry = MatchRegistry::with_seed(seed);
        registry
            .matches
            .insert(first.clone(), Match::new(first.clone(), CAROL));

        let code = registry.create(ALICE).code().clone();
        assert_ne!(code, first);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_many_codes_are_unique() {
        let mut registry = MatchRegistry::with_seed(3);
        let codes: HashSet<InviteCode> = (0..2000)
            .map(|i| registry.create(ConnectionId(i)).code().clone())
            .collect();
        assert_eq!(codes.len(), 2000);
        assert_eq!(registry.len(), 2000);
    }

    #[test]
    fn test_play_marks_finished() {
        let mut registry = MatchRegistry::with_seed(1);
        let code = registry.create(ALICE).code().clone();
        registry.join(BOB, code.as_str()).unwrap();

        let game = registry.lookup_mut(code.as_str()).unwrap();
        game.set_game(GameState::from_board(
            ncala_core::Board::from_pits([0, 0, 0, 0, 0, 1, 30, 4, 0, 0, 0, 0, 0, 13]),
            Role::South,
        ));
        let outcome = game.play(Role::South, 5).unwrap();

        assert_eq!(outcome.winner, Some(ncala_core::Winner::South));
        assert_eq!(game.status(), MatchStatus::Finished);
    }
}
