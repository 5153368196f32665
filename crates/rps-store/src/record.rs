use super::*;
use rps_core::*;
use rps_gameplay::*;

/// The value stored under a [`Key`].
///
/// A game is one `Game` record plus one `Player` record per seat,
/// all sharing the game's id. Player names live in the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Game {
        round: Round,
        plays: usize,
    },
    Player {
        seat: Position,
        connection: ID<Connection>,
        score: Score,
        round: Round,
        last: Option<Move>,
    },
}

impl Record {
    pub fn game(game: &Game) -> Self {
        Self::Game {
            round: game.round(),
            plays: game.plays(),
        }
    }
    pub fn player(seat: Position, player: &Player) -> Self {
        Self::Player {
            seat,
            connection: player.connection(),
            score: player.score(),
            round: player.round(),
            last: player.last(),
        }
    }
}

/// Rebuilds a game from every record stored under its id.
///
/// Fails as `NotFound` without a game record and as `Corrupt` when the
/// player records do not occupy seats `0..n` with `n <= SEATS`.
pub fn assemble<I>(id: ID<Game>, records: I) -> Result<Game, StoreError>
where
    I: IntoIterator<Item = (Kind, Record)>,
{
    let mut counters = None;
    let mut seated = Vec::with_capacity(SEATS);
    for (kind, record) in records {
        match (kind, record) {
            (Kind::Game, Record::Game { round, plays }) => counters = Some((round, plays)),
            (Kind::Player(name), Record::Player { seat, connection, score, round, last }) => {
                seated.push((seat, Player::restore(name, connection, score, round, last)))
            }
            (kind, _) => {
                return Err(StoreError::Corrupt(format!("{} under {} has wrong shape", kind, id)));
            }
        }
    }
    let (round, plays) = counters.ok_or(StoreError::NotFound(id))?;
    seated.sort_by_key(|(seat, _)| *seat);
    if seated.len() > SEATS || seated.iter().enumerate().any(|(i, (seat, _))| i != *seat) {
        return Err(StoreError::Corrupt(format!("game {} has broken seating", id)));
    }
    if plays > seated.len() {
        return Err(StoreError::Corrupt(format!("game {} counts {} plays", id, plays)));
    }
    let players = seated.into_iter().map(|(_, p)| p).collect();
    Ok(Game::restore(id, round, plays, players))
}
