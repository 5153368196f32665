use rps_core::*;
use rps_gameplay::*;
use rps_store::*;

/// Why an event could not be applied.
///
/// Everything except [`Storage`](Self::Storage) is the client's fault and
/// is reported back to the offending connection only.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// A rule refused the event: bad move, duplicate play, full game.
    Rejected(GameError),
    /// The connection is not seated in the game it addressed.
    Unbound(ID<Connection>),
    /// The addressed game does not exist.
    NotFound(ID<Game>),
    /// The store failed, timed out, or kept losing races.
    Storage(StoreError),
}

impl DispatchError {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_stale())
    }
    /// Whether the client can be told what went wrong.
    pub fn is_client(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl From<GameError> for DispatchError {
    fn from(e: GameError) -> Self {
        Self::Rejected(e)
    }
}

impl From<StoreError> for DispatchError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound(id),
            e => Self::Storage(e),
        }
    }
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Rejected(e) => write!(f, "{}", e),
            Self::Unbound(c) => write!(f, "connection {} is not seated in this game", c),
            Self::NotFound(id) => write!(f, "game {} not found", id),
            Self::Storage(e) => write!(f, "storage failure: {}", e),
        }
    }
}

impl std::error::Error for DispatchError {}
