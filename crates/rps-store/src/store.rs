use super::*;
use rps_core::*;
use rps_gameplay::*;

/// Persistence gateway for games and their players.
///
/// Nothing is cached between calls: every event rehydrates with
/// [`load`](Store::load) and writes back explicitly.
///
/// Writes that read-modify-write shared counters are conditional on
/// what the caller observed when it loaded. If another writer got
/// there first they fail with [`StoreError::Stale`] and leave the
/// stored state untouched.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Loads a game with every seated player.
    async fn load(&self, id: ID<Game>) -> Result<Game, StoreError>;

    /// Creates a game with its counters and every seat.
    ///
    /// Stale if the game already exists, so a create built from an
    /// outdated `NotFound` can never replace a live game.
    async fn save_game(&self, game: &Game) -> Result<(), StoreError>;

    /// Seats one new player.
    ///
    /// Stale if the name is already seated or `seat` is held by a
    /// different name. Returning players go through
    /// [`save_connection`](Store::save_connection).
    async fn save_player(
        &self,
        id: ID<Game>,
        seat: Position,
        player: &Player,
    ) -> Result<(), StoreError>;

    /// Rebinds a seated player's connection. Touches no counters.
    async fn save_connection(&self, id: ID<Game>, player: &Player) -> Result<(), StoreError>;

    /// Records the play just made by `seat` together with the play count.
    ///
    /// Applies only if the stored game is still at `game.round()` with
    /// one play fewer than `game.plays()`.
    async fn save_play(&self, game: &Game, seat: Position) -> Result<(), StoreError>;

    /// Records a round advance: counters plus both scores.
    ///
    /// Applies only if the stored game is still at the round before
    /// `game.round()` with every seat played.
    async fn save_round(&self, game: &Game) -> Result<(), StoreError>;
}

/// Counters a conditional play write expects to find in storage.
pub(crate) fn observed_play(game: &Game) -> Result<(Round, usize), StoreError> {
    game.plays()
        .checked_sub(1)
        .map(|plays| (game.round(), plays))
        .ok_or_else(|| StoreError::Corrupt(format!("game {} has no play to save", game.id())))
}

/// Counters a conditional round write expects to find in storage.
pub(crate) fn observed_round(game: &Game) -> Result<(Round, usize), StoreError> {
    match game.plays() {
        0 => Ok((game.round() - 1, game.players().len())),
        _ => Err(StoreError::Corrupt(format!("game {} has not advanced", game.id()))),
    }
}
