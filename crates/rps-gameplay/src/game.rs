use super::*;
use rps_core::*;

/// How a name came to be at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// Took a previously empty seat.
    Seated(Position),
    /// Already seated; only the connection changed.
    Rebound(Position),
}

impl Join {
    pub fn seat(&self) -> Position {
        match self {
            Self::Seated(seat) | Self::Rebound(seat) => *seat,
        }
    }
}

/// A two-seat game and its round counters.
///
/// Invariants maintained by every mutation:
/// - `plays <= players.len() <= SEATS`
/// - seats fill in join order and are never vacated or reordered
/// - `round` and scores only change through [`Game::advance`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    id: ID<Self>,
    round: Round,
    plays: usize,
    players: Vec<Player>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(ID::default())
    }
}

impl Unique for Game {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Game {
    /// An empty table under a caller-chosen id.
    pub fn new(id: ID<Self>) -> Self {
        Self {
            id,
            round: FIRST_ROUND,
            plays: 0,
            players: Vec::with_capacity(SEATS),
        }
    }
    /// Reassembles a game from stored fields. Players must be in seat order.
    pub fn restore(id: ID<Self>, round: Round, plays: usize, players: Vec<Player>) -> Self {
        Self {
            id,
            round,
            plays,
            players,
        }
    }
    pub fn round(&self) -> Round {
        self.round
    }
    /// Plays recorded for the current round.
    pub fn plays(&self) -> usize {
        self.plays
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn player(&self, seat: Position) -> Option<&Player> {
        self.players.get(seat)
    }
    /// Seat held by this name.
    pub fn seat_of(&self, name: &str) -> Option<Position> {
        self.players.iter().position(|p| p.name() == name)
    }
    /// Seat currently reachable at this connection.
    pub fn seat_at(&self, connection: ID<Connection>) -> Option<Position> {
        self.players
            .iter()
            .position(|p| p.connection() == connection)
    }
    pub fn is_full(&self) -> bool {
        self.players.len() == SEATS
    }
    /// Every seat is filled and has played the current round.
    pub fn is_ready(&self) -> bool {
        self.is_full() && self.plays == self.players.len()
    }
    pub fn phase(&self) -> Phase {
        match (self.is_full(), self.plays, self.round > FIRST_ROUND) {
            (false, _, _) => Phase::AwaitingPlayers,
            (true, 0, false) => Phase::Ready,
            (true, 0, true) => Phase::RoundResolved,
            (true, _, _) => Phase::RoundOpen,
        }
    }
}

impl Game {
    /// Seats a new name or rebinds a known one.
    ///
    /// Rebinding never touches counters, so a reconnect can race
    /// with an opponent's play without conflict.
    pub fn join(&mut self, name: &str, connection: ID<Connection>) -> Result<Join, GameError> {
        match self.seat_of(name) {
            Some(seat) => {
                self.players[seat].rebind(connection);
                log::debug!("[game {}] {} rebound to seat {}", self.id, name, seat);
                Ok(Join::Rebound(seat))
            }
            None if self.is_full() => Err(GameError::GameFull(name.to_string())),
            None => {
                self.players.push(Player::new(name, connection));
                let seat = self.players.len() - 1;
                log::debug!("[game {}] {} seated at {}", self.id, name, seat);
                Ok(Join::Seated(seat))
            }
        }
    }

    /// Records one seat's move for the current round.
    pub fn record(&mut self, seat: Position, throw: Move) -> Result<(), GameError> {
        let round = self.round;
        let player = self
            .players
            .get_mut(seat)
            .ok_or(GameError::NoSuchSeat(seat))?;
        if player.has_played(round) {
            return Err(GameError::DuplicatePlay(player.name().to_string(), round));
        }
        player.play(round, throw);
        self.plays += 1;
        Ok(())
    }

    /// Resolves a full round, scores it, and opens the next one.
    ///
    /// Fails without side effects unless both seats have played,
    /// so calling it twice never double-scores.
    pub fn advance(&mut self) -> Result<Resolution, GameError> {
        let not_ready = GameError::NotReady(self.plays, self.players.len());
        if !self.is_ready() {
            return Err(not_ready);
        }
        let moves = match (self.players[0].last(), self.players[1].last()) {
            (Some(left), Some(right)) => [left, right],
            _ => return Err(not_ready),
        };
        let outcome = resolve(moves[0], moves[1]);
        if let Some(winner) = outcome.winner() {
            self.players[winner].win();
        }
        self.players.iter_mut().for_each(Player::clear);
        let resolution = Resolution::new(self.round, moves, outcome);
        self.plays = 0;
        self.round += 1;
        log::debug!(
            "[game {}] round {} resolved: {} vs {} ({})",
            self.id,
            resolution.round(),
            moves[0],
            moves[1],
            outcome
        );
        Ok(resolution)
    }
}
