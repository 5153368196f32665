use rps_core::*;
use rps_gameplay::*;
use serde::Serialize;

/// Messages sent from server to client over WebSocket.
///
/// Every state push is a complete snapshot tagged with the round it
/// describes, so a client that missed a push loses nothing by using the
/// latest one.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Handshake for a freshly opened connection.
    Connected { connection: String },
    /// The game as the recipient is allowed to see it.
    State {
        game: String,
        round: Round,
        plays: usize,
        phase: String,
        seat: Position,
        /// The recipient's own move this round, if any. The opponent's
        /// move is never shown before resolution.
        #[serde(skip_serializing_if = "Option::is_none")]
        played: Option<String>,
        roster: Vec<Seat>,
        #[serde(skip_serializing_if = "Option::is_none")]
        resolved: Option<Resolved>,
    },
    /// The recipient's last event was refused.
    Rejected { reason: String },
}

/// One seat in the roster.
#[derive(Clone, Debug, Serialize)]
pub struct Seat {
    pub seat: Position,
    pub name: String,
    pub score: Score,
    pub played: bool,
}

/// The round that just closed.
#[derive(Clone, Debug, Serialize)]
pub struct Resolved {
    pub round: Round,
    pub moves: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Position>,
}

impl ServerMessage {
    pub fn connected(connection: ID<Connection>) -> Self {
        Self::Connected {
            connection: connection.to_string(),
        }
    }
    pub fn rejected(reason: &impl std::fmt::Display) -> Self {
        Self::Rejected {
            reason: reason.to_string(),
        }
    }
    /// Snapshot of `game` addressed to whoever sits at `seat`.
    pub fn state(game: &Game, seat: Position, resolution: Option<&Resolution>) -> Self {
        Self::State {
            game: game.id().to_string(),
            round: game.round(),
            plays: game.plays(),
            phase: game.phase().to_string(),
            seat,
            played: game
                .player(seat)
                .and_then(|p| p.last())
                .map(|m| m.to_string()),
            roster: game
                .players()
                .iter()
                .enumerate()
                .map(|(seat, p)| Seat {
                    seat,
                    name: p.name().to_string(),
                    score: p.score(),
                    played: p.has_played(game.round()),
                })
                .collect(),
            resolved: resolution.map(|r| Resolved {
                round: r.round(),
                moves: r.moves().iter().map(|m| m.to_string()).collect(),
                winner: r.outcome().winner(),
            }),
        }
    }
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn json(message: ServerMessage) -> Value {
        serde_json::from_str(&message.to_json().unwrap()).unwrap()
    }

    #[test]
    fn state_hides_opponent_move() {
        let mut game = Game::default();
        game.join("first", ID::default()).unwrap();
        game.join("second", ID::default()).unwrap();
        game.record(0, Move::Rock).unwrap();
        let mine = json(ServerMessage::state(&game, 0, None));
        let theirs = json(ServerMessage::state(&game, 1, None));
        assert_eq!(mine["type"], "state");
        assert_eq!(mine["played"], "rock");
        assert_eq!(mine["phase"], "round_open");
        assert!(theirs.get("played").is_none());
        assert_eq!(theirs["roster"][0]["played"], true);
        assert_eq!(theirs["roster"][1]["played"], false);
    }

    #[test]
    fn state_carries_resolution() {
        let mut game = Game::default();
        game.join("first", ID::default()).unwrap();
        game.join("second", ID::default()).unwrap();
        game.record(0, Move::Paper).unwrap();
        game.record(1, Move::Scissors).unwrap();
        let resolution = game.advance().unwrap();
        let value = json(ServerMessage::state(&game, 0, Some(&resolution)));
        assert_eq!(value["round"], FIRST_ROUND + 1);
        assert_eq!(value["resolved"]["round"], FIRST_ROUND);
        assert_eq!(value["resolved"]["moves"][1], "scissors");
        assert_eq!(value["resolved"]["winner"], 1);
        assert_eq!(value["roster"][1]["score"], 1);
    }

    #[test]
    fn rejection_names_reason() {
        let value = json(ServerMessage::rejected(&GameError::InvalidMove("spock".into())));
        assert_eq!(value["type"], "rejected");
        assert!(value["reason"].as_str().unwrap().contains("spock"));
    }
}
