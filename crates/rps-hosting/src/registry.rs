use super::*;
use rps_core::*;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;

type Tx = UnboundedSender<String>;
type Rx = UnboundedReceiver<String>;

/// Live WebSocket connections on this process.
///
/// Each open socket registers an outbound channel here; pushes drop the
/// message into that channel and the socket task writes it out.
#[derive(Default)]
pub struct Registry {
    connections: RwLock<HashMap<ID<Connection>, Tx>>,
}

impl Registry {
    /// Registers a new connection and returns its outbound end.
    pub async fn open(&self) -> (ID<Connection>, Rx) {
        let id = ID::default();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        self.connections.write().await.insert(id, tx);
        log::debug!("[registry] opened {}", id);
        (id, rx)
    }
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl Notifier for Registry {
    async fn push(&self, connection: ID<Connection>, message: String) -> Result<(), NotifyError> {
        self.connections
            .read()
            .await
            .get(&connection)
            .ok_or(NotifyError::Gone(connection))?
            .send(message)
            .map_err(|_| NotifyError::Closed(connection))
    }
    async fn forget(&self, connection: ID<Connection>) {
        self.connections
            .write()
            .await
            .remove(&connection)
            .map(|_| log::debug!("[registry] forgot {}", connection));
    }
}
