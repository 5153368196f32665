use super::*;
use rps_core::*;

/// What happened when a round was advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    round: Round,
    moves: [Move; SEATS],
    outcome: Outcome,
}

impl Resolution {
    pub fn new(round: Round, moves: [Move; SEATS], outcome: Outcome) -> Self {
        Self {
            round,
            moves,
            outcome,
        }
    }
    /// The round that was resolved (not the one now open).
    pub fn round(&self) -> Round {
        self.round
    }
    /// Moves by seat.
    pub fn moves(&self) -> [Move; SEATS] {
        self.moves
    }
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}
