use rps_core::Round;

/// Reasons a game operation is refused.
///
/// None of these mutate state and none are worth retrying:
/// they are reported back to the offending client only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Input outside {rock, paper, scissors}.
    InvalidMove(String),
    /// The named player already played this round.
    DuplicatePlay(String, Round),
    /// Advance attempted with (plays, seats) short of a full round.
    NotReady(usize, usize),
    /// Both seats are taken and the name is not one of them.
    GameFull(String),
    /// No seat at this position.
    NoSuchSeat(usize),
}

impl GameError {
    /// Input that could never be legal.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidMove(_))
    }
    /// Legal input refused because of the current game state.
    pub fn is_conflict(&self) -> bool {
        !self.is_validation()
    }
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMove(s) => write!(f, "invalid move: {:?}", s),
            Self::DuplicatePlay(name, round) => {
                write!(f, "{} already played round {}", name, round)
            }
            Self::NotReady(plays, seats) => {
                write!(f, "round not ready: {} plays from {} seats", plays, seats)
            }
            Self::GameFull(name) => write!(f, "game is full, {} cannot join", name),
            Self::NoSuchSeat(seat) => write!(f, "no player in seat {}", seat),
        }
    }
}

impl std::error::Error for GameError {}
