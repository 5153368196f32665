use rps_core::Position;

/// A single throw.
///
/// Standard rules apply: R beats S, S beats P, P beats R.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Move {
    /// Rock — beats Scissors, loses to Paper.
    Rock,
    /// Paper — beats Rock, loses to Scissors.
    Paper,
    /// Scissors — beats Paper, loses to Rock.
    Scissors,
}

impl Move {
    pub const fn all() -> [Self; 3] {
        [Self::Rock, Self::Paper, Self::Scissors]
    }
    /// The move this one defeats.
    pub const fn prey(&self) -> Self {
        match self {
            Self::Rock => Self::Scissors,
            Self::Paper => Self::Rock,
            Self::Scissors => Self::Paper,
        }
    }
    pub fn beats(&self, other: &Self) -> bool {
        self.prey() == *other
    }
}

impl TryFrom<&str> for Move {
    type Error = &'static str;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_uppercase().as_str() {
            "ROCK" => Ok(Self::Rock),
            "PAPER" => Ok(Self::Paper),
            "SCISSORS" => Ok(Self::Scissors),
            _ => Err("invalid move"),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Rock => write!(f, "rock"),
            Self::Paper => write!(f, "paper"),
            Self::Scissors => write!(f, "scissors"),
        }
    }
}

/// Result of resolving the left seat's move against the right seat's.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Outcome {
    Left,
    Right,
    Tie,
}

impl Outcome {
    /// Seat index of the winner, if there is one.
    pub fn winner(&self) -> Option<Position> {
        match self {
            Self::Left => Some(0),
            Self::Right => Some(1),
            Self::Tie => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Tie => write!(f, "tie"),
        }
    }
}

/// Pure resolution table. Total over all nine pairs.
pub fn resolve(left: Move, right: Move) -> Outcome {
    match (left.beats(&right), right.beats(&left)) {
        (true, _) => Outcome::Left,
        (_, true) => Outcome::Right,
        _ => Outcome::Tie,
    }
}
