//! Session controller
//!
//! Turns a request from an identified connection into registry and engine
//! calls, maps every failure onto [`SessionError`], and broadcasts the match
//! after each successful change.

use crate::broadcast::{MatchView, Outbox};
use crate::protocol::{Reply, Request, ServerMessage};
use crate::registry::{ConnectionId, MatchRegistry, MatchStatus, RegistryError};
use ncala_core::MoveError;
use serde::Serialize;
use serde_json::Number;
use tokio::sync::mpsc::UnboundedSender;

/// Every reason a request can be refused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum SessionError {
    #[error("not_found")]
    NotFound,
    #[error("full")]
    Full,
    #[error("not_active")]
    NotActive,
    #[error("not_your_turn")]
    NotYourTurn,
    #[error("invalid_pit")]
    InvalidPit,
    #[error("empty_pit")]
    EmptyPit,
    #[error("missing_code")]
    MissingCode,
    #[error("invalid_payload")]
    InvalidPayload,
    #[error("not_in_game")]
    NotInGame,
}

impl From<RegistryError> for SessionError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound => SessionError::NotFound,
            RegistryError::Full => SessionError::Full,
        }
    }
}

impl From<MoveError> for SessionError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::InvalidPit => SessionError::InvalidPit,
            MoveError::EmptyPit => SessionError::EmptyPit,
        }
    }
}

/// Registry plus the outbound queues of every open connection
pub struct SessionController {
    registry: MatchRegistry,
    outbox: Outbox,
}

impl SessionController {
    pub fn new(registry: MatchRegistry) -> Self {
        Self {
            registry,
            outbox: Outbox::default(),
        }
    }

    pub fn registry(&self) -> &MatchRegistry {
        &self.registry
    }

    pub fn connect(&mut self, conn: ConnectionId, queue: UnboundedSender<ServerMessage>) {
        self.outbox.register(conn, queue);
    }

    /// Abandon whatever `conn` was playing and stop delivering to it
    pub fn disconnect(&mut self, conn: ConnectionId) {
        self.leave(conn);
        self.outbox.unregister(conn);
    }

    /// Run one request to completion. Pushes are queued before this returns,
    /// so they always precede the acknowledgement on the wire.
    pub fn handle(&mut self, conn: ConnectionId, request: Request) -> Reply {
        let result = match request {
            Request::Create => Ok(self.create(conn)),
            Request::Join { code } => self.join(conn, code),
            Request::Move { code, pit } => self.play(conn, code, pit),
        };

        result.unwrap_or_else(|reason| {
            tracing::debug!("{} request refused: {}", conn, reason);
            Reply::failed(reason)
        })
    }

    /// Queue an acknowledgement for `conn`
    pub fn acknowledge(&self, conn: ConnectionId, ack: u64, reply: Reply) {
        self.outbox.send(conn, ServerMessage::Ack { ack, reply });
    }

    fn create(&mut self, conn: ConnectionId) -> Reply {
        self.leave(conn);
        let game = self.registry.create(conn);
        self.outbox.broadcast(game);
        Reply::with_state(MatchView::for_viewer(game, conn))
    }

    fn join(&mut self, conn: ConnectionId, code: Option<String>) -> Result<Reply, SessionError> {
        let code = code
            .filter(|code| !code.is_empty())
            .ok_or(SessionError::MissingCode)?;

        self.leave(conn);
        let game = self.registry.join(conn, &code)?;
        self.outbox.broadcast(game);
        Ok(Reply::with_state(MatchView::for_viewer(game, conn)))
    }

    fn play(
        &mut self,
        conn: ConnectionId,
        code: Option<String>,
        pit: Option<Number>,
    ) -> Result<Reply, SessionError> {
        let code = code
            .filter(|code| !code.is_empty())
            .ok_or(SessionError::InvalidPayload)?;
        let pit = pit.ok_or(SessionError::InvalidPayload)?;

        let game = self
            .registry
            .lookup_mut(&code)
            .ok_or(SessionError::NotFound)?;
        let role = game.seat_of(conn).ok_or(SessionError::NotInGame)?;
        if game.status() != MatchStatus::Active {
            return Err(SessionError::NotActive);
        }
        if game.game().current_turn() != role {
            return Err(SessionError::NotYourTurn);
        }
        let pit = pit_index(&pit).ok_or(SessionError::InvalidPit)?;

        let outcome = game.play(role, pit)?;
        tracing::debug!(
            "match {}: {:?} sowed pit {}, landed on {}",
            game.code(),
            role,
            pit,
            outcome.landing
        );
        if let Some(winner) = outcome.winner {
            tracing::info!("match {} finished, winner {:?}", game.code(), winner);
        }

        self.outbox.broadcast(game);
        Ok(Reply::ok())
    }

    fn leave(&mut self, conn: ConnectionId) {
        if let Some(game) = self.registry.remove(conn) {
            self.outbox.broadcast(&game);
        }
    }
}

/// A pit must be a whole, non-negative number; anything else names no pit
fn pit_index(pit: &Number) -> Option<usize> {
    let index = match pit.as_u64() {
        Some(index) => index,
        None => {
            let value = pit.as_f64()?;
            if value < 0.0 || value.fract() != 0.0 {
                return None;
            }
            value as u64
        }
    };
    usize::try_from(index).ok()
}
