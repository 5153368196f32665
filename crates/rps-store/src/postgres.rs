use super::*;
use rps_core::*;
use rps_gameplay::*;
use rps_pg::*;
use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::error::SqlState;

impl From<PgErr> for StoreError {
    fn from(e: PgErr) -> Self {
        Self::Backend(e.to_string())
    }
}

impl Schema for Record {
    fn name() -> &'static str {
        RECORDS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            RECORDS,
            " (
                game_id     UUID NOT NULL,
                kind        TEXT NOT NULL,
                round       INTEGER NOT NULL,
                plays       SMALLINT,
                seat        SMALLINT,
                connection  UUID,
                score       INTEGER,
                last_move   TEXT,
                PRIMARY KEY (game_id, kind)
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_records_seat ON ",
            RECORDS,
            " (game_id, seat) WHERE seat IS NOT NULL;"
        )
    }
}

/// Maps a unique-seat violation to a lost race.
fn seated(id: ID<Game>, e: PgErr) -> StoreError {
    match e.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => StoreError::Stale(id),
        _ => StoreError::from(e),
    }
}

/// Zero affected rows from a conditional write means someone else won.
fn applied(id: ID<Game>, n: u64) -> Result<(), StoreError> {
    match n {
        0 => Err(StoreError::Stale(id)),
        _ => Ok(()),
    }
}

fn decode(row: &tokio_postgres::Row) -> Result<(Kind, Record), StoreError> {
    let kind = Kind::try_from(row.get::<_, &str>(0)).map_err(StoreError::Corrupt)?;
    let round = row.get::<_, Round>(1);
    let record = match kind {
        Kind::Game => Record::Game {
            round,
            plays: row.get::<_, Option<i16>>(2).unwrap_or_default() as usize,
        },
        Kind::Player(_) => Record::Player {
            seat: row
                .get::<_, Option<i16>>(3)
                .ok_or_else(|| StoreError::Corrupt(format!("{} has no seat", kind)))?
                as Position,
            connection: row
                .get::<_, Option<uuid::Uuid>>(4)
                .map(ID::from)
                .ok_or_else(|| StoreError::Corrupt(format!("{} has no connection", kind)))?,
            score: row.get::<_, Option<Score>>(5).unwrap_or_default(),
            round,
            last: row
                .get::<_, Option<&str>>(6)
                .map(Move::try_from)
                .transpose()
                .map_err(|e| StoreError::Corrupt(format!("{}: {}", kind, e)))?,
        },
    };
    Ok((kind, record))
}

#[async_trait::async_trait]
impl Store for Arc<Client> {
    async fn load(&self, id: ID<Game>) -> Result<Game, StoreError> {
        let rows = self
            .query(
                const_format::concatcp!(
                    "SELECT kind, round, plays, seat, connection, score, last_move FROM ",
                    RECORDS,
                    " WHERE game_id = $1"
                ),
                &[&id.inner()],
            )
            .await?;
        let records = rows.iter().map(decode).collect::<Result<Vec<_>, _>>()?;
        assemble(id, records)
    }

    async fn save_game(&self, game: &Game) -> Result<(), StoreError> {
        let n = self
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    RECORDS,
                    " (game_id, kind, round, plays) VALUES ($1, $2, $3, $4)
                     ON CONFLICT (game_id, kind) DO NOTHING"
                ),
                &[
                    &game.id().inner(),
                    &GAME,
                    &game.round(),
                    &(game.plays() as i16),
                ],
            )
            .await?;
        applied(game.id(), n)?;
        for (seat, player) in game.players().iter().enumerate() {
            self.save_player(game.id(), seat, player).await?;
        }
        Ok(())
    }

    async fn save_player(
        &self,
        id: ID<Game>,
        seat: Position,
        player: &Player,
    ) -> Result<(), StoreError> {
        let kind = Kind::Player(player.name().to_string()).to_string();
        let last = player.last().map(|m| m.to_string());
        let n = self
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    RECORDS,
                    " (game_id, kind, round, seat, connection, score, last_move)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)
                     ON CONFLICT (game_id, kind) DO NOTHING"
                ),
                &[
                    &id.inner(),
                    &kind,
                    &player.round(),
                    &(seat as i16),
                    &player.connection().inner(),
                    &player.score(),
                    &last,
                ],
            )
            .await
            .map_err(|e| seated(id, e))?;
        applied(id, n)
    }

    async fn save_connection(&self, id: ID<Game>, player: &Player) -> Result<(), StoreError> {
        let kind = Kind::Player(player.name().to_string()).to_string();
        let n = self
            .execute(
                const_format::concatcp!(
                    "UPDATE ",
                    RECORDS,
                    " SET connection = $3 WHERE game_id = $1 AND kind = $2"
                ),
                &[&id.inner(), &kind, &player.connection().inner()],
            )
            .await?;
        match n {
            0 => Err(StoreError::NotFound(id)),
            _ => Ok(()),
        }
    }

    async fn save_play(&self, game: &Game, seat: Position) -> Result<(), StoreError> {
        let (round, plays) = observed_play(game)?;
        let player = game
            .player(seat)
            .ok_or_else(|| StoreError::Corrupt(format!("no seat {} in {}", seat, game.id())))?;
        let kind = Kind::Player(player.name().to_string()).to_string();
        let last = player.last().map(|m| m.to_string());
        // the game row compare gates both updates; the player row must exist
        // or the count would move without a play behind it
        let n = self
            .execute(
                const_format::concatcp!(
                    "WITH counted AS (
                        UPDATE ",
                    RECORDS,
                    " SET plays = plays + 1
                        WHERE game_id = $1 AND kind = '",
                    GAME,
                    "' AND round = $2::INTEGER AND plays = $3::SMALLINT
                          AND EXISTS (SELECT 1 FROM ",
                    RECORDS,
                    " WHERE game_id = $1 AND kind = $4::TEXT)
                        RETURNING game_id
                    )
                    UPDATE ",
                    RECORDS,
                    " SET round = $2::INTEGER, last_move = $5::TEXT
                    WHERE game_id IN (SELECT game_id FROM counted) AND kind = $4::TEXT"
                ),
                &[&game.id().inner(), &round, &(plays as i16), &kind, &last],
            )
            .await?;
        applied(game.id(), n)
    }

    async fn save_round(&self, game: &Game) -> Result<(), StoreError> {
        let (round, plays) = observed_round(game)?;
        let (left, right) = match game.players() {
            [left, right] => (left, right),
            _ => return Err(StoreError::Corrupt(format!("game {} is not full", game.id()))),
        };
        let l = Kind::Player(left.name().to_string()).to_string();
        let r = Kind::Player(right.name().to_string()).to_string();
        let n = self
            .execute(
                const_format::concatcp!(
                    "WITH advanced AS (
                        UPDATE ",
                    RECORDS,
                    " SET round = $2::INTEGER, plays = 0
                        WHERE game_id = $1 AND kind = '",
                    GAME,
                    "' AND round = $3::INTEGER AND plays = $4::SMALLINT
                        RETURNING game_id
                    )
                    UPDATE ",
                    RECORDS,
                    " SET last_move = NULL,
                          score = CASE WHEN kind = $5::TEXT THEN $6::INTEGER ELSE $8::INTEGER END
                    WHERE game_id IN (SELECT game_id FROM advanced) AND kind IN ($5::TEXT, $7::TEXT)"
                ),
                &[
                    &game.id().inner(),
                    &game.round(),
                    &round,
                    &(plays as i16),
                    &l,
                    &left.score(),
                    &r,
                    &right.score(),
                ],
            )
            .await?;
        applied(game.id(), n)
    }
}
