use rps_core::ID;
use rps_gameplay::Game;

/// Kind text of the game record.
pub const GAME: &str = "GAME";
/// Kind prefix of player records.
pub const PLAYER: &str = "PLAYER#";

/// Which record under a game a key addresses.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Kind {
    Game,
    Player(String),
}

impl TryFrom<&str> for Kind {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            GAME => Ok(Self::Game),
            _ => s
                .strip_prefix(PLAYER)
                .filter(|name| !name.is_empty())
                .map(|name| Self::Player(name.to_string()))
                .ok_or_else(|| format!("unknown record kind {:?}", s)),
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Game => write!(f, "{}", GAME),
            Self::Player(name) => write!(f, "{}{}", PLAYER, name),
        }
    }
}

/// Composite key: every record belongs to exactly one game.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key {
    pub game: ID<Game>,
    pub kind: Kind,
}

impl Key {
    pub fn game(game: ID<Game>) -> Self {
        Self {
            game,
            kind: Kind::Game,
        }
    }
    pub fn player(game: ID<Game>, name: &str) -> Self {
        Self {
            game,
            kind: Kind::Player(name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn kind_text() {
        assert_eq!(Kind::Game.to_string(), "GAME");
        assert_eq!(Kind::Player("first".into()).to_string(), "PLAYER#first");
        assert_eq!(Kind::try_from("GAME"), Ok(Kind::Game));
        assert_eq!(
            Kind::try_from("PLAYER#a#b"),
            Ok(Kind::Player("a#b".into()))
        );
        assert!(Kind::try_from("PLAYER#").is_err());
        assert!(Kind::try_from("SESSION").is_err());
    }
    #[test]
    fn keys_group_by_game() {
        let a = ID::default();
        let b = ID::default();
        let mut keys = vec![Key::player(b, "x"), Key::game(a), Key::game(b), Key::player(a, "y")];
        keys.sort();
        assert!(keys[..2].iter().all(|k| k.game == keys[0].game));
        assert!(keys[2..].iter().all(|k| k.game == keys[2].game));
        assert_eq!(keys[0].kind, Kind::Game);
    }
}
