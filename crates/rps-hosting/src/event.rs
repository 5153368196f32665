use rps_core::*;
use rps_gameplay::*;
use serde::Deserialize;

/// Something a client did, as seen by the [`Dispatcher`](crate::Dispatcher).
///
/// The transport decodes envelopes into events; nothing past this point
/// knows about sockets.
#[derive(Debug, Clone)]
pub enum Event {
    /// A client opened `connection` and claims `name` in `game`.
    Connect {
        name: String,
        connection: ID<Connection>,
        game: ID<Game>,
    },
    /// A connection went away. Its seat is kept for reconnection.
    Disconnect { connection: ID<Connection> },
    /// A client sent a message over an open connection.
    Action {
        connection: ID<Connection>,
        payload: Payload,
    },
}

/// Body of an inbound action: `{"game": "<uuid>", "move": "rock"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Payload {
    pub game: uuid::Uuid,
    #[serde(rename = "move")]
    pub throw: String,
}

impl Payload {
    pub fn game(&self) -> ID<Game> {
        ID::from(self.game)
    }
}

impl TryFrom<&str> for Payload {
    type Error = serde_json::Error;
    fn try_from(text: &str) -> Result<Self, Self::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn payload_reads_move_field() {
        let id = ID::<Game>::default();
        let text = format!(r#"{{"game":"{}","move":"Rock"}}"#, id);
        let payload = Payload::try_from(text.as_str()).unwrap();
        assert_eq!(payload.game(), id);
        assert_eq!(payload.throw, "Rock");
    }
    #[test]
    fn payload_requires_game() {
        assert!(Payload::try_from(r#"{"move":"rock"}"#).is_err());
        assert!(Payload::try_from("rock").is_err());
    }
}
