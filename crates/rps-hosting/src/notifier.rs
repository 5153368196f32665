use rps_core::*;

/// Outbound push to a single connection.
///
/// Delivery is best effort. Callers log failures and carry on; a push
/// that fails never rolls back state that was already stored.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn push(&self, connection: ID<Connection>, message: String) -> Result<(), NotifyError>;

    /// Drops whatever the notifier holds for a closed connection.
    async fn forget(&self, _connection: ID<Connection>) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Nothing is listening at this connection.
    Gone(ID<Connection>),
    /// The connection is registered but its outbound channel has closed.
    Closed(ID<Connection>),
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Gone(c) => write!(f, "connection {} is gone", c),
            Self::Closed(c) => write!(f, "connection {} is closed", c),
        }
    }
}

impl std::error::Error for NotifyError {}
