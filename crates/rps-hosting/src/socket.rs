use super::*;
use futures::StreamExt;
use rps_core::*;
use rps_gameplay::*;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// One client's socket, from handshake to close.
pub(crate) struct Socket {
    pub game: ID<Game>,
    pub name: String,
    pub connection: ID<Connection>,
    pub outbox: UnboundedReceiver<String>,
    pub session: actix_ws::Session,
    pub stream: actix_ws::MessageStream,
}

impl Socket {
    /// Spawns the bridge between the socket and the dispatcher.
    ///
    /// Inbound text frames become [`Event::Action`]s; anything pushed to
    /// this connection's registry channel is written out. A refused
    /// connect flushes the rejection and closes.
    pub fn spawn(self, dispatcher: Arc<Dispatcher>) {
        let Self {
            game,
            name,
            connection,
            mut outbox,
            mut session,
            mut stream,
        } = self;
        actix_web::rt::spawn(async move {
            let hello = ServerMessage::connected(connection).to_json();
            if let Ok(json) = hello {
                let _ = session.text(json).await;
            }
            let joined = dispatcher
                .dispatch(Event::Connect {
                    name,
                    connection,
                    game,
                })
                .await;
            if joined.is_err() {
                while let Ok(json) = outbox.try_recv() {
                    let _ = session.text(json).await;
                }
            } else {
                'sesh: loop {
                    tokio::select! {
                        biased;
                        msg = outbox.recv() => match msg {
                            Some(json) => if session.text(json).await.is_err() { break 'sesh },
                            None => break 'sesh,
                        },
                        msg = stream.next() => match msg {
                            Some(Ok(actix_ws::Message::Text(text))) => match Payload::try_from(&*text) {
                                Ok(payload) => {
                                    let _ = dispatcher.dispatch(Event::Action { connection, payload }).await;
                                }
                                Err(e) => match ServerMessage::rejected(&e).to_json() {
                                    Ok(json) => if session.text(json).await.is_err() { break 'sesh },
                                    Err(_) => continue 'sesh,
                                },
                            },
                            Some(Ok(actix_ws::Message::Ping(bytes))) => if session.pong(&bytes).await.is_err() { break 'sesh },
                            Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                            Some(Err(_)) => break 'sesh,
                            None => break 'sesh,
                            _ => continue 'sesh,
                        },
                    }
                }
            }
            let _ = dispatcher.dispatch(Event::Disconnect { connection }).await;
            let _ = session.close(None).await;
        });
    }
}
