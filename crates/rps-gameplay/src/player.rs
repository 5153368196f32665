use super::*;
use rps_core::*;

/// One seated participant.
///
/// Identity is the `name`; the connection is just where to reach them
/// right now and is rebound freely on reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    connection: ID<Connection>,
    score: Score,
    round: Round,
    last: Option<Move>,
}

impl Player {
    /// A player who has not played yet.
    pub fn new(name: &str, connection: ID<Connection>) -> Self {
        Self {
            name: name.to_string(),
            connection,
            score: 0,
            round: 0,
            last: None,
        }
    }
    /// Reassembles a player from stored fields.
    pub fn restore(
        name: String,
        connection: ID<Connection>,
        score: Score,
        round: Round,
        last: Option<Move>,
    ) -> Self {
        Self {
            name,
            connection,
            score,
            round,
            last,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn connection(&self) -> ID<Connection> {
        self.connection
    }
    pub fn score(&self) -> Score {
        self.score
    }
    /// Last round this player recorded a play in.
    pub fn round(&self) -> Round {
        self.round
    }
    /// Move submitted for the open round, if any.
    pub fn last(&self) -> Option<Move> {
        self.last
    }
    pub fn has_played(&self, round: Round) -> bool {
        self.round == round
    }
}

impl Player {
    pub(crate) fn rebind(&mut self, connection: ID<Connection>) {
        self.connection = connection;
    }
    pub(crate) fn play(&mut self, round: Round, throw: Move) {
        self.round = round;
        self.last = Some(throw);
    }
    pub(crate) fn win(&mut self) {
        self.score += 1;
    }
    pub(crate) fn clear(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn fresh_player() {
        let player = Player::new("first", ID::default());
        assert_eq!(player.name(), "first");
        assert_eq!(player.score(), 0);
        assert_eq!(player.round(), 0);
        assert_eq!(player.last(), None);
        assert!(!player.has_played(FIRST_ROUND));
    }
    #[test]
    fn rebind_keeps_progress() {
        let mut player = Player::restore("p".into(), ID::default(), 3, 4, Some(Move::Rock));
        let next = ID::default();
        player.rebind(next);
        assert_eq!(player.connection(), next);
        assert_eq!(player.score(), 3);
        assert_eq!(player.round(), 4);
        assert_eq!(player.last(), Some(Move::Rock));
    }
}
