use super::*;
use rps_core::*;
use rps_gameplay::*;
use rps_store::*;
use std::future::Future;
use std::sync::Arc;

/// Applies client events to stored games.
///
/// Holds no game state. Every event loads what it needs, applies one rule,
/// and writes back with a conditional save; a lost race reloads and tries
/// again up to [`STORE_RETRIES`] times. Rule violations are pushed back to
/// the offending connection, and state changes are pushed to every seat.
pub struct Dispatcher {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Routes one event. Client-facing failures are also pushed to the
    /// connection that caused them before being returned.
    pub async fn dispatch(&self, event: Event) -> Result<(), DispatchError> {
        match event {
            Event::Connect {
                name,
                connection,
                game,
            } => match self.connect(&name, connection, game).await {
                Ok(_) => Ok(()),
                Err(e) => self.refuse(connection, e).await,
            },
            Event::Action {
                connection,
                payload,
            } => match self.action(connection, payload.game(), &payload.throw).await {
                Ok(_) => Ok(()),
                Err(e) => self.refuse(connection, e).await,
            },
            Event::Disconnect { connection } => {
                self.disconnect(connection).await;
                Ok(())
            }
        }
    }

    /// Seats `name` in `game`, creating the game on first contact, or
    /// rebinds a returning name to `connection`. Returns the stored game.
    pub async fn connect(
        &self,
        name: &str,
        connection: ID<Connection>,
        game: ID<Game>,
    ) -> Result<Game, DispatchError> {
        let joined = self
            .retry("connect", move || self.try_connect(name, connection, game))
            .await?;
        log::info!("[dispatch] {} connected to {} as {}", name, game, connection);
        self.broadcast(&joined, None).await;
        if !joined.is_ready() {
            return Ok(joined);
        }
        match self.settle(game).await {
            Ok(Some(advanced)) => Ok(advanced),
            Ok(None) => Ok(joined),
            Err(e) => {
                log::warn!("[dispatch] {} left unresolved: {}", game, e);
                Ok(joined)
            }
        }
    }

    /// Plays `input` for whoever sits at `connection`, then resolves the
    /// round if that was the last missing move. Returns the stored game.
    pub async fn action(
        &self,
        connection: ID<Connection>,
        game: ID<Game>,
        input: &str,
    ) -> Result<Game, DispatchError> {
        // a full round whose advance failed earlier would refuse every play
        self.settle(game).await?;
        let played = self
            .retry("play", move || self.try_play(connection, game, input))
            .await?;
        log::debug!("[dispatch] {} played in {}", connection, game);
        match played.is_ready() {
            false => {
                self.broadcast(&played, None).await;
                Ok(played)
            }
            true => match self.settle(game).await? {
                Some(advanced) => Ok(advanced),
                // a racing handler advanced it and notified everyone
                None => bounded(self.store.load(game)).await.map_err(DispatchError::from),
            },
        }
    }

    /// Forgets the connection's outbound channel. The seat stays taken so
    /// the same name can reconnect later.
    pub async fn disconnect(&self, connection: ID<Connection>) {
        log::info!("[dispatch] {} disconnected", connection);
        self.notifier.forget(connection).await;
    }
}

impl Dispatcher {
    async fn try_connect(
        &self,
        name: &str,
        connection: ID<Connection>,
        id: ID<Game>,
    ) -> Result<Game, DispatchError> {
        let (game, created) = match bounded(self.store.load(id)).await {
            Ok(game) => (game, false),
            Err(StoreError::NotFound(_)) => (Game::new(id), true),
            Err(e) => return Err(e.into()),
        };
        let ctx = GameContext::connect(game, name, connection)?;
        match (created, ctx.join()) {
            (true, _) => bounded(self.store.save_game(ctx.game())).await?,
            (false, Some(Join::Seated(seat))) => {
                bounded(self.store.save_player(id, seat, ctx.player())).await?
            }
            (false, _) => bounded(self.store.save_connection(id, ctx.player())).await?,
        }
        Ok(ctx.into_game())
    }

    async fn try_play(
        &self,
        connection: ID<Connection>,
        id: ID<Game>,
        input: &str,
    ) -> Result<Game, DispatchError> {
        let game = bounded(self.store.load(id)).await?;
        let mut ctx = GameContext::bound(game, connection).ok_or(DispatchError::Unbound(connection))?;
        ctx.play(input)?;
        bounded(self.store.save_play(ctx.game(), ctx.seat())).await?;
        Ok(ctx.into_game())
    }

    /// Resolves the stored round if every seat has played, and tells
    /// everyone. `None` when there was nothing to resolve.
    async fn settle(&self, game: ID<Game>) -> Result<Option<Game>, DispatchError> {
        match self.retry("advance", move || self.try_advance(game)).await? {
            Some((advanced, resolution)) => {
                log::info!(
                    "[dispatch] {} round {} resolved {}",
                    game,
                    resolution.round(),
                    resolution.outcome()
                );
                self.broadcast(&advanced, Some(&resolution)).await;
                Ok(Some(advanced))
            }
            None => Ok(None),
        }
    }

    /// `None` when someone else already advanced the round.
    async fn try_advance(&self, id: ID<Game>) -> Result<Option<(Game, Resolution)>, DispatchError> {
        let mut game = bounded(self.store.load(id)).await?;
        if !game.is_ready() {
            return Ok(None);
        }
        let resolution = game.advance()?;
        bounded(self.store.save_round(&game)).await?;
        Ok(Some((game, resolution)))
    }

    /// Runs `attempt` until it succeeds, fails for a reason other than a
    /// lost race, or runs out of tries.
    async fn retry<T, F, Fut>(&self, op: &str, attempt: F) -> Result<T, DispatchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, DispatchError>>,
    {
        let mut tries = 0;
        loop {
            tries += 1;
            match attempt().await {
                Err(e) if e.is_stale() && tries < STORE_RETRIES => {
                    log::debug!("[dispatch] {} lost a race (try {}), retrying", op, tries)
                }
                Err(e) if e.is_stale() => {
                    log::warn!("[dispatch] {} gave up after {} tries", op, tries);
                    return Err(e);
                }
                result => return result,
            }
        }
    }

    /// Pushes a snapshot to every seat. Failures are logged, never raised:
    /// the state is already stored and the next push will carry it.
    async fn broadcast(&self, game: &Game, resolution: Option<&Resolution>) {
        for (seat, player) in game.players().iter().enumerate() {
            match ServerMessage::state(game, seat, resolution).to_json() {
                Ok(json) => self.send(player.connection(), json).await,
                Err(e) => log::error!("[dispatch] failed to encode state: {}", e),
            }
        }
    }

    async fn refuse(&self, connection: ID<Connection>, e: DispatchError) -> Result<(), DispatchError> {
        let reason = match e.is_client() {
            true => e.to_string(),
            false => String::from("temporarily unavailable, try again"),
        };
        match e.is_client() {
            true => log::debug!("[dispatch] rejected {}: {}", connection, e),
            false => log::error!("[dispatch] {}: {}", connection, e),
        }
        if let Ok(json) = ServerMessage::rejected(&reason).to_json() {
            self.send(connection, json).await;
        }
        Err(e)
    }

    async fn send(&self, connection: ID<Connection>, json: String) {
        if let Err(e) = self.notifier.push(connection, json).await {
            log::warn!("[dispatch] {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use tokio::sync::Mutex;

    /// Records every push, decoded.
    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<(ID<Connection>, Value)>>,
    }
    impl Outbox {
        async fn last(&self, connection: ID<Connection>) -> Option<Value> {
            self.sent
                .lock()
                .await
                .iter()
                .rev()
                .find(|(c, _)| *c == connection)
                .map(|(_, v)| v.clone())
        }
    }
    #[async_trait::async_trait]
    impl Notifier for Outbox {
        async fn push(&self, connection: ID<Connection>, message: String) -> Result<(), NotifyError> {
            let value = serde_json::from_str(&message).unwrap();
            self.sent.lock().await.push((connection, value));
            Ok(())
        }
    }

    /// Nobody is ever listening.
    struct Deaf;
    #[async_trait::async_trait]
    impl Notifier for Deaf {
        async fn push(&self, connection: ID<Connection>, _: String) -> Result<(), NotifyError> {
            Err(NotifyError::Gone(connection))
        }
    }

    /// Loses the first `losses` play writes to an imaginary rival and
    /// times out the first `stalls` round writes.
    struct Flaky {
        inner: Memory,
        losses: AtomicUsize,
        stalls: AtomicUsize,
        attempts: AtomicUsize,
    }
    impl Flaky {
        fn new(losses: usize) -> Self {
            Self {
                inner: Memory::default(),
                losses: AtomicUsize::new(losses),
                stalls: AtomicUsize::new(0),
                attempts: AtomicUsize::new(0),
            }
        }
        fn stalled(stalls: usize) -> Self {
            Self {
                stalls: AtomicUsize::new(stalls),
                ..Self::new(0)
            }
        }
    }
    fn spend(budget: &AtomicUsize) -> bool {
        budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
    #[async_trait::async_trait]
    impl Store for Flaky {
        async fn load(&self, id: ID<Game>) -> Result<Game, StoreError> {
            self.inner.load(id).await
        }
        async fn save_game(&self, game: &Game) -> Result<(), StoreError> {
            self.inner.save_game(game).await
        }
        async fn save_player(&self, id: ID<Game>, seat: Position, player: &Player) -> Result<(), StoreError> {
            self.inner.save_player(id, seat, player).await
        }
        async fn save_connection(&self, id: ID<Game>, player: &Player) -> Result<(), StoreError> {
            self.inner.save_connection(id, player).await
        }
        async fn save_play(&self, game: &Game, seat: Position) -> Result<(), StoreError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            match spend(&self.losses) {
                true => Err(StoreError::Stale(game.id())),
                false => self.inner.save_play(game, seat).await,
            }
        }
        async fn save_round(&self, game: &Game) -> Result<(), StoreError> {
            match spend(&self.stalls) {
                true => Err(StoreError::Timeout),
                false => self.inner.save_round(game).await,
            }
        }
    }

    fn dispatcher(store: Arc<dyn Store>) -> (Dispatcher, Arc<Outbox>) {
        let outbox = Arc::new(Outbox::default());
        (Dispatcher::new(store, outbox.clone()), outbox)
    }

    /// A stored game with both seats taken.
    async fn seated(dispatcher: &Dispatcher) -> (ID<Game>, ID<Connection>, ID<Connection>) {
        let (id, a, b) = (ID::default(), ID::default(), ID::default());
        dispatcher.connect("first", a, id).await.unwrap();
        dispatcher.connect("second", b, id).await.unwrap();
        (id, a, b)
    }

    fn action(connection: ID<Connection>, game: ID<Game>, throw: &str) -> Event {
        Event::Action {
            connection,
            payload: Payload {
                game: game.inner(),
                throw: throw.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn connect_creates_then_seats() {
        let (dispatcher, outbox) = dispatcher(Arc::new(Memory::default()));
        let (id, a, b) = (ID::default(), ID::default(), ID::default());
        let game = dispatcher.connect("first", a, id).await.unwrap();
        assert_eq!(game.players().len(), 1);
        assert_eq!(game.phase(), Phase::AwaitingPlayers);
        let game = dispatcher.connect("second", b, id).await.unwrap();
        assert_eq!(game.phase(), Phase::Ready);
        let first = outbox.last(a).await.unwrap();
        assert_eq!(first["type"], "state");
        assert_eq!(first["phase"], "ready");
        assert_eq!(first["seat"], 0);
        assert_eq!(outbox.last(b).await.unwrap()["seat"], 1);
    }

    #[tokio::test]
    async fn third_player_is_turned_away() {
        let store = Arc::new(Memory::default());
        let (dispatcher, outbox) = dispatcher(store.clone());
        let (id, _, _) = seated(&dispatcher).await;
        let c = ID::default();
        let event = Event::Connect {
            name: "third".into(),
            connection: c,
            game: id,
        };
        assert_eq!(
            dispatcher.dispatch(event).await,
            Err(DispatchError::Rejected(GameError::GameFull("third".into())))
        );
        assert_eq!(outbox.last(c).await.unwrap()["type"], "rejected");
        assert_eq!(store.load(id).await.unwrap().players().len(), 2);
    }

    #[tokio::test]
    async fn reconnect_then_play_to_resolution() {
        let (dispatcher, outbox) = dispatcher(Arc::new(Memory::default()));
        let (id, a, b) = seated(&dispatcher).await;
        let fresh = ID::default();
        let game = dispatcher.connect("second", fresh, id).await.unwrap();
        assert_eq!(game.players().len(), 2);
        assert_eq!(game.player(1).unwrap().connection(), fresh);
        assert_eq!(game.player(1).unwrap().score(), 0);

        let game = dispatcher.action(a, id, "rock").await.unwrap();
        assert_eq!(game.round(), FIRST_ROUND);
        assert_eq!(game.plays(), 1);
        assert_eq!(game.player(0).unwrap().round(), FIRST_ROUND);
        assert_eq!(game.phase(), Phase::RoundOpen);

        assert_eq!(
            dispatcher.action(b, id, "paper").await,
            Err(DispatchError::Unbound(b))
        );

        let game = dispatcher.action(fresh, id, "scissors").await.unwrap();
        assert_eq!(game.round(), FIRST_ROUND + 1);
        assert_eq!(game.plays(), 0);
        assert_eq!(game.player(0).unwrap().score(), 1);
        assert_eq!(game.player(1).unwrap().score(), 0);
        let pushed = outbox.last(a).await.unwrap();
        assert_eq!(pushed["phase"], "round_resolved");
        assert_eq!(pushed["resolved"]["winner"], 0);
        assert_eq!(pushed["resolved"]["moves"][0], "rock");
        assert_eq!(outbox.last(fresh).await.unwrap()["resolved"]["moves"][1], "scissors");
    }

    #[tokio::test]
    async fn invalid_move_changes_nothing() {
        let store = Arc::new(Memory::default());
        let (dispatcher, outbox) = dispatcher(store.clone());
        let (id, a, _) = seated(&dispatcher).await;
        assert_eq!(
            dispatcher.dispatch(action(a, id, "lizard")).await,
            Err(DispatchError::Rejected(GameError::InvalidMove("lizard".into())))
        );
        let rejected = outbox.last(a).await.unwrap();
        assert_eq!(rejected["type"], "rejected");
        assert!(rejected["reason"].as_str().unwrap().contains("lizard"));
        assert_eq!(store.load(id).await.unwrap().plays(), 0);
    }

    #[tokio::test]
    async fn second_play_in_a_round_is_refused() {
        let (dispatcher, _) = dispatcher(Arc::new(Memory::default()));
        let (id, a, _) = seated(&dispatcher).await;
        dispatcher.action(a, id, "rock").await.unwrap();
        assert!(matches!(
            dispatcher.action(a, id, "paper").await,
            Err(DispatchError::Rejected(GameError::DuplicatePlay(_, FIRST_ROUND)))
        ));
    }

    #[tokio::test]
    async fn action_on_unknown_game() {
        let (dispatcher, _) = dispatcher(Arc::new(Memory::default()));
        let id = ID::default();
        assert_eq!(
            dispatcher.action(ID::default(), id, "rock").await,
            Err(DispatchError::NotFound(id))
        );
    }

    #[tokio::test]
    async fn failed_pushes_do_not_fail_events() {
        let store = Arc::new(Memory::default());
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(Deaf));
        let (id, a, b) = seated(&dispatcher).await;
        dispatcher.action(a, id, "paper").await.unwrap();
        dispatcher.action(b, id, "rock").await.unwrap();
        let game = store.load(id).await.unwrap();
        assert_eq!(game.round(), FIRST_ROUND + 1);
        assert_eq!(game.player(0).unwrap().score(), 1);
    }

    #[tokio::test]
    async fn lost_races_are_retried() {
        let store = Arc::new(Flaky::new(STORE_RETRIES - 1));
        let (dispatcher, _) = dispatcher(store.clone());
        let (id, a, _) = seated(&dispatcher).await;
        let game = dispatcher.action(a, id, "rock").await.unwrap();
        assert_eq!(game.plays(), 1);
        assert_eq!(store.attempts.load(Ordering::SeqCst), STORE_RETRIES);
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let store = Arc::new(Flaky::new(STORE_RETRIES));
        let (dispatcher, outbox) = dispatcher(store.clone());
        let (id, a, _) = seated(&dispatcher).await;
        assert_eq!(
            dispatcher.dispatch(action(a, id, "rock")).await,
            Err(DispatchError::Storage(StoreError::Stale(id)))
        );
        assert_eq!(store.attempts.load(Ordering::SeqCst), STORE_RETRIES);
        assert_eq!(outbox.last(a).await.unwrap()["type"], "rejected");
        assert_eq!(store.load(id).await.unwrap().plays(), 0);
    }

    #[tokio::test]
    async fn failed_advance_is_finished_by_the_next_play() {
        let store = Arc::new(Flaky::stalled(1));
        let (dispatcher, outbox) = dispatcher(store.clone());
        let (id, a, b) = seated(&dispatcher).await;
        dispatcher.action(a, id, "rock").await.unwrap();
        assert_eq!(
            dispatcher.action(b, id, "scissors").await,
            Err(DispatchError::Storage(StoreError::Timeout))
        );
        let stuck = store.load(id).await.unwrap();
        assert_eq!(stuck.round(), FIRST_ROUND);
        assert_eq!(stuck.plays(), 2);

        let game = dispatcher.action(b, id, "paper").await.unwrap();
        assert_eq!(game.round(), FIRST_ROUND + 1);
        assert_eq!(game.plays(), 1);
        assert_eq!(game.player(0).unwrap().score(), 1);
        assert_eq!(game.player(1).unwrap().score(), 0);
        assert_eq!(game.player(1).unwrap().last(), Some(Move::Paper));
        let pushed = outbox.last(a).await.unwrap();
        assert_eq!(pushed["round"], FIRST_ROUND + 1);
        assert_eq!(pushed["roster"][0]["score"], 1);
    }

    #[tokio::test]
    async fn failed_advance_is_finished_by_a_reconnect() {
        let store = Arc::new(Flaky::stalled(1));
        let (dispatcher, _) = dispatcher(store.clone());
        let (id, a, b) = seated(&dispatcher).await;
        dispatcher.action(a, id, "paper").await.unwrap();
        assert!(dispatcher.action(b, id, "rock").await.is_err());
        let game = dispatcher.connect("second", ID::default(), id).await.unwrap();
        assert_eq!(game.round(), FIRST_ROUND + 1);
        assert_eq!(game.plays(), 0);
        assert_eq!(game.player(0).unwrap().score(), 1);
        assert_eq!(store.load(id).await.unwrap(), game);
    }

    #[tokio::test]
    async fn simultaneous_plays_both_land() {
        let store = Arc::new(Memory::default());
        let (dispatcher, _) = dispatcher(store.clone());
        let (id, a, b) = seated(&dispatcher).await;
        let (left, right) = tokio::join!(
            dispatcher.action(a, id, "rock"),
            dispatcher.action(b, id, "paper")
        );
        assert!(left.is_ok());
        assert!(right.is_ok());
        let game = store.load(id).await.unwrap();
        assert_eq!(game.round(), FIRST_ROUND + 1);
        assert_eq!(game.player(1).unwrap().score(), 1);
    }

    #[tokio::test]
    async fn disconnect_keeps_the_seat() {
        let store = Arc::new(Memory::default());
        let registry = Arc::new(Registry::default());
        let dispatcher = Dispatcher::new(store.clone(), registry.clone());
        let id = ID::default();
        let (a, _rx) = registry.open().await;
        dispatcher.connect("first", a, id).await.unwrap();
        let event = Event::Disconnect { connection: a };
        assert_eq!(dispatcher.dispatch(event).await, Ok(()));
        assert!(registry.is_empty().await);
        let game = store.load(id).await.unwrap();
        assert_eq!(game.seat_of("first"), Some(0));
        assert_eq!(game.player(0).unwrap().connection(), a);
    }
}
