/// Round lifecycle of a game.
///
/// ```text
/// AwaitingPlayers → Ready → RoundOpen → RoundResolved → RoundOpen → …
/// ```
///
/// Derived from the counters rather than stored, so it can never
/// disagree with them. There is no terminal phase.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Phase {
    /// Fewer than two seats filled.
    AwaitingPlayers,
    /// Both seats filled, nobody has played yet.
    Ready,
    /// At least one play recorded for the current round.
    RoundOpen,
    /// A round just resolved; the next one has no plays yet.
    RoundResolved,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::AwaitingPlayers => write!(f, "awaiting_players"),
            Self::Ready => write!(f, "ready"),
            Self::RoundOpen => write!(f, "round_open"),
            Self::RoundResolved => write!(f, "round_resolved"),
        }
    }
}
