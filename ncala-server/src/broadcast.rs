//! Per-viewer match views and delivery to seated connections

use crate::invite::InviteCode;
use crate::protocol::ServerMessage;
use crate::registry::{ConnectionId, Match, MatchStatus};
use ncala_core::{Board, LastMove, Role, Winner};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// What one player sees. Only `you_are` differs between the two seats.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub code: InviteCode,
    pub board: Board,
    pub status: MatchStatus,
    pub current_turn: Role,
    pub players_ready: bool,
    pub you_are: Option<Role>,
    pub last_move: Option<LastMove>,
    pub winner: Option<Winner>,
}

impl MatchView {
    pub fn for_viewer(game: &Match, viewer: ConnectionId) -> Self {
        let state = game.game();
        Self {
            code: game.code().clone(),
            board: *state.board(),
            status: game.status(),
            current_turn: state.current_turn(),
            players_ready: game.players_ready(),
            you_are: game.seat_of(viewer),
            last_move: state.last_move(),
            winner: state.winner(),
        }
    }
}

/// Outbound queues, one per open connection
#[derive(Default)]
pub struct Outbox {
    queues: FxHashMap<ConnectionId, UnboundedSender<ServerMessage>>,
}

impl Outbox {
    pub fn register(&mut self, conn: ConnectionId, queue: UnboundedSender<ServerMessage>) {
        self.queues.insert(conn, queue);
    }

    pub fn unregister(&mut self, conn: ConnectionId) {
        self.queues.remove(&conn);
    }

    /// Queue a message; a connection whose writer is gone is skipped
    pub fn send(&self, conn: ConnectionId, message: ServerMessage) {
        if let Some(queue) = self.queues.get(&conn) {
            if queue.send(message).is_err() {
                tracing::debug!("{} writer closed, dropping message", conn);
            }
        }
    }

    /// Push a fresh view to every seated connection of `game`
    pub fn broadcast(&self, game: &Match) {
        for (_, conn) in game.connections() {
            let state = MatchView::for_viewer(game, conn);
            self.send(conn, ServerMessage::StateUpdate { state });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MatchRegistry;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[test]
    fn test_views_differ_only_in_seat() {
        let mut registry = MatchRegistry::with_seed(5);
        let code = registry.create(ConnectionId(1)).code().clone();
        let game = registry.join(ConnectionId(2), code.as_str()).unwrap();

        let south = MatchView::for_viewer(game, ConnectionId(1));
        let north = MatchView::for_viewer(game, ConnectionId(2));
        assert_eq!(south.you_are, Some(Role::South));
        assert_eq!(north.you_are, Some(Role::North));
        assert_eq!(MatchView { you_are: None, ..south }, MatchView { you_are: None, ..north });
    }

    #[test]
    fn test_view_json_shape() {
        let mut registry = MatchRegistry::with_seed(5);
        let game = registry.create(ConnectionId(1));
        let code = game.code().to_string();
        let view = serde_json::to_value(MatchView::for_viewer(game, ConnectionId(1))).unwrap();

        assert_eq!(
            view,
            json!({
                "code": code,
                "board": [4, 4, 4, 4, 4, 4, 0, 4, 4, 4, 4, 4, 4, 0],
                "status": "waiting",
                "currentTurn": "south",
                "playersReady": false,
                "youAre": "south",
                "lastMove": null,
                "winner": null,
            })
        );
    }

    #[test]
    fn test_broadcast_reaches_both_seats() {
        let mut registry = MatchRegistry::with_seed(5);
        let code = registry.create(ConnectionId(1)).code().clone();
        let game = registry.join(ConnectionId(2), code.as_str()).unwrap();

        let mut outbox = Outbox::default();
        let (south_tx, mut south_rx) = mpsc::unbounded_channel();
        let (north_tx, mut north_rx) = mpsc::unbounded_channel();
        let (other_tx, mut other_rx) = mpsc::unbounded_channel();
        outbox.register(ConnectionId(1), south_tx);
        outbox.register(ConnectionId(2), north_tx);
        outbox.register(ConnectionId(3), other_tx);

        outbox.broadcast(game);

        match south_rx.try_recv().unwrap() {
            ServerMessage::StateUpdate { state } => assert_eq!(state.you_are, Some(Role::South)),
            other => panic!("unexpected message {:?}", other),
        }
        match north_rx.try_recv().unwrap() {
            ServerMessage::StateUpdate { state } => assert_eq!(state.you_are, Some(Role::North)),
            other => panic!("unexpected message {:?}", other),
        }
        assert!(other_rx.try_recv().is_err());
    }
}
