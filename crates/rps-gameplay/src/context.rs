use super::*;
use rps_core::*;

/// One inbound event bound to a game and the seat acting in it.
///
/// Lives only for the duration of a single event. It owns its game
/// snapshot; the store is the only thing that outlives it.
#[derive(Debug, Clone)]
pub struct GameContext {
    game: Game,
    seat: Position,
    join: Option<Join>,
}

impl GameContext {
    /// Seats or rebinds `name` at `connection`.
    pub fn connect(
        mut game: Game,
        name: &str,
        connection: ID<Connection>,
    ) -> Result<Self, GameError> {
        let join = game.join(name, connection)?;
        Ok(Self {
            game,
            seat: join.seat(),
            join: Some(join),
        })
    }
    /// The context of whoever is reachable at `connection`, if anyone.
    pub fn bound(game: Game, connection: ID<Connection>) -> Option<Self> {
        game.seat_at(connection).map(|seat| Self {
            game,
            seat,
            join: None,
        })
    }
    /// Validates and records the acting player's move.
    pub fn play(&mut self, input: &str) -> Result<Move, GameError> {
        let throw =
            Move::try_from(input).map_err(|_| GameError::InvalidMove(input.to_string()))?;
        self.game.record(self.seat, throw).map(|_| throw)
    }
    pub fn advance(&mut self) -> Result<Resolution, GameError> {
        self.game.advance()
    }
}

impl GameContext {
    pub fn game(&self) -> &Game {
        &self.game
    }
    pub fn seat(&self) -> Position {
        self.seat
    }
    /// The acting player.
    pub fn player(&self) -> &Player {
        &self.game.players()[self.seat]
    }
    /// How this context was established, when it came from a connect.
    pub fn join(&self) -> Option<Join> {
        self.join
    }
    pub fn into_game(self) -> Game {
        self.game
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn connect_seats_then_rebinds() {
        let game = Game::default();
        let ctx = GameContext::connect(game, "first", ID::default()).unwrap();
        assert_eq!(ctx.join(), Some(Join::Seated(0)));
        let conn = ID::default();
        let ctx = GameContext::connect(ctx.into_game(), "first", conn).unwrap();
        assert_eq!(ctx.join(), Some(Join::Rebound(0)));
        assert_eq!(ctx.player().connection(), conn);
        assert_eq!(ctx.game().players().len(), 1);
    }
    #[test]
    fn bound_finds_acting_seat() {
        let mut game = Game::default();
        let conn = ID::default();
        game.join("first", ID::default()).unwrap();
        game.join("second", conn).unwrap();
        let ctx = GameContext::bound(game.clone(), conn).unwrap();
        assert_eq!(ctx.seat(), 1);
        assert_eq!(ctx.player().name(), "second");
        assert_eq!(ctx.join(), None);
        assert!(GameContext::bound(game, ID::default()).is_none());
    }
    #[test]
    fn invalid_move_is_validation() {
        let ctx = GameContext::connect(Game::default(), "first", ID::default());
        let mut ctx = ctx.unwrap();
        let err = ctx.play("spock").unwrap_err();
        assert_eq!(err, GameError::InvalidMove("spock".into()));
        assert!(err.is_validation());
        assert_eq!(ctx.game().plays(), 0);
        assert_eq!(ctx.player().round(), 0);
    }
    #[test]
    fn play_marks_round() {
        let ctx = GameContext::connect(Game::default(), "first", ID::default());
        let mut ctx = ctx.unwrap();
        assert_eq!(ctx.play("rock"), Ok(Move::Rock));
        assert_eq!(ctx.player().round(), FIRST_ROUND);
        let err = ctx.play("paper").unwrap_err();
        assert!(err.is_conflict());
    }
}
