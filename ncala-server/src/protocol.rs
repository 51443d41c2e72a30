//! Wire format for the socket endpoint
//!
//! Client frames: `{"event": "game:move", "ack": 3, "payload": {"code": "ABCDE", "pit": 2}}`.
//! Server frames: `{"event": "ack", "ack": 3, "reply": {...}}` and
//! `{"event": "state:update", "state": {...}}`.

use crate::broadcast::MatchView;
use crate::session::SessionError;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

// ============================================================================
// INBOUND
// ============================================================================

/// One client frame before the payload is interpreted
#[derive(Debug, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub ack: Option<u64>,
    #[serde(default)]
    pub payload: Value,
}

/// A request the session controller understands
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Create,
    Join { code: Option<String> },
    Move { code: Option<String>, pit: Option<Number> },
}

#[derive(Default, Deserialize)]
struct JoinPayload {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Default, Deserialize)]
struct MovePayload {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    pit: Option<Number>,
}

impl Request {
    /// Interpret a frame; `None` for events this server does not handle.
    ///
    /// Payloads of the wrong shape are kept as empty requests so the
    /// controller can answer them with the proper reason.
    pub fn from_frame(event: &str, payload: Value) -> Option<Self> {
        match event {
            "game:create" => Some(Request::Create),
            "game:join" => {
                let JoinPayload { code } = serde_json::from_value(payload).unwrap_or_default();
                Some(Request::Join { code })
            }
            "game:move" => {
                let MovePayload { code, pit } =
                    serde_json::from_value(payload).unwrap_or_default();
                Some(Request::Move { code, pit })
            }
            _ => None,
        }
    }
}

// ============================================================================
// OUTBOUND
// ============================================================================

/// Acknowledgement body for one request
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<MatchView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SessionError>,
}

impl Reply {
    pub fn ok() -> Self {
        Self {
            ok: true,
            state: None,
            reason: None,
        }
    }

    pub fn with_state(state: MatchView) -> Self {
        Self {
            ok: true,
            state: Some(state),
            reason: None,
        }
    }

    pub fn failed(reason: SessionError) -> Self {
        Self {
            ok: false,
            state: None,
            reason: Some(reason),
        }
    }
}

/// Everything the server pushes down a connection
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum ServerMessage {
    #[serde(rename = "state:update")]
    StateUpdate { state: MatchView },
    #[serde(rename = "ack")]
    Ack { ack: u64, reply: Reply },
}
