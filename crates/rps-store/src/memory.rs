use super::*;
use rps_core::*;
use rps_gameplay::*;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-process keyed store.
///
/// Holds the same records the database would, behind one lock, and
/// enforces the same write conditions. State is lost on restart.
#[derive(Debug, Default)]
pub struct Memory {
    records: RwLock<BTreeMap<Key, Record>>,
}

impl Memory {
    /// Number of records held, across all games.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Memory {
    fn counters(records: &BTreeMap<Key, Record>, id: ID<Game>) -> Option<(Round, usize)> {
        match records.get(&Key::game(id)) {
            Some(Record::Game { round, plays }) => Some((*round, *plays)),
            _ => None,
        }
    }
    fn seat_taken(
        records: &BTreeMap<Key, Record>,
        id: ID<Game>,
        seat: Position,
        name: &str,
    ) -> bool {
        records.iter().any(|(key, record)| match (&key.kind, record) {
            (Kind::Player(other), Record::Player { seat: held, .. }) => {
                key.game == id && *held == seat && other != name
            }
            _ => false,
        })
    }
}

#[async_trait::async_trait]
impl Store for Memory {
    async fn load(&self, id: ID<Game>) -> Result<Game, StoreError> {
        let records = self.records.read().await;
        assemble(
            id,
            records
                .iter()
                .filter(|(key, _)| key.game == id)
                .map(|(key, record)| (key.kind.clone(), record.clone())),
        )
    }

    async fn save_game(&self, game: &Game) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&Key::game(game.id())) {
            return Err(StoreError::Stale(game.id()));
        }
        let seats = game.players().iter().enumerate();
        if seats.clone().any(|(seat, p)| {
            records.contains_key(&Key::player(game.id(), p.name()))
                || Self::seat_taken(&records, game.id(), seat, p.name())
        }) {
            return Err(StoreError::Stale(game.id()));
        }
        records.insert(Key::game(game.id()), Record::game(game));
        for (seat, player) in seats {
            records.insert(
                Key::player(game.id(), player.name()),
                Record::player(seat, player),
            );
        }
        Ok(())
    }

    async fn save_player(
        &self,
        id: ID<Game>,
        seat: Position,
        player: &Player,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let key = Key::player(id, player.name());
        if records.contains_key(&key) || Self::seat_taken(&records, id, seat, player.name()) {
            return Err(StoreError::Stale(id));
        }
        records.insert(key, Record::player(seat, player));
        Ok(())
    }

    async fn save_connection(&self, id: ID<Game>, player: &Player) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(&Key::player(id, player.name())) {
            Some(Record::Player { connection, .. }) => {
                *connection = player.connection();
                Ok(())
            }
            _ => Err(StoreError::NotFound(id)),
        }
    }

    async fn save_play(&self, game: &Game, seat: Position) -> Result<(), StoreError> {
        let expected = observed_play(game)?;
        let player = game
            .player(seat)
            .ok_or_else(|| StoreError::Corrupt(format!("no seat {} in {}", seat, game.id())))?;
        let mut records = self.records.write().await;
        if Self::counters(&records, game.id()) != Some(expected) {
            return Err(StoreError::Stale(game.id()));
        }
        match records.get_mut(&Key::player(game.id(), player.name())) {
            Some(Record::Player { round, last, .. }) => {
                *round = player.round();
                *last = player.last();
            }
            _ => return Err(StoreError::Stale(game.id())),
        }
        records.insert(Key::game(game.id()), Record::game(game));
        Ok(())
    }

    async fn save_round(&self, game: &Game) -> Result<(), StoreError> {
        let expected = observed_round(game)?;
        let mut records = self.records.write().await;
        if Self::counters(&records, game.id()) != Some(expected) {
            return Err(StoreError::Stale(game.id()));
        }
        if let Some(lost) = game
            .players()
            .iter()
            .find(|p| !records.contains_key(&Key::player(game.id(), p.name())))
        {
            return Err(StoreError::Corrupt(format!("{} lost its record", lost.name())));
        }
        for player in game.players() {
            if let Some(Record::Player { score, last, .. }) =
                records.get_mut(&Key::player(game.id(), player.name()))
            {
                *score = player.score();
                *last = None;
            }
        }
        records.insert(Key::game(game.id()), Record::game(game));
        Ok(())
    }
}
