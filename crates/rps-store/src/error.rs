use rps_core::ID;
use rps_gameplay::Game;

/// Storage-layer failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No game row under this id.
    NotFound(ID<Game>),
    /// A conditional write lost a race. Reload and reapply.
    Stale(ID<Game>),
    /// The call did not complete within the store timeout.
    Timeout,
    /// Stored rows cannot be assembled into a valid game.
    Corrupt(String),
    /// Transport or database failure.
    Backend(String),
}

impl StoreError {
    /// Only lost races are worth retrying from a fresh load.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "game {} not found", id),
            Self::Stale(id) => write!(f, "game {} changed underneath this write", id),
            Self::Timeout => write!(f, "store call timed out"),
            Self::Corrupt(s) => write!(f, "corrupt record: {}", s),
            Self::Backend(s) => write!(f, "store backend: {}", s),
        }
    }
}

impl std::error::Error for StoreError {}
