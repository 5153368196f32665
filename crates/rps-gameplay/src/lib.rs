//! Rock-paper-scissors gameplay.
//!
//! Pure, synchronous domain logic. Nothing in this crate performs I/O;
//! persistence and transport operate on the values defined here.
//!
//! ## Rules
//!
//! - [`Move`] — Rock, paper, or scissors
//! - [`Outcome`] — Result of resolving two moves
//! - [`resolve`] — The resolution table
//!
//! ## State
//!
//! - [`Player`] — One seated participant
//! - [`Game`] — Two seats plus round/play counters; owns round advancement
//! - [`Phase`] — Where a game sits in its round lifecycle
//! - [`Resolution`] — Summary of a resolved round
//! - [`GameContext`] — One inbound event bound to a game and its acting seat
//! - [`GameError`] — Rejected moves and illegal transitions
mod context;
mod error;
mod game;
mod phase;
mod player;
mod resolution;
mod rules;

pub use context::*;
pub use error::*;
pub use game::*;
pub use phase::*;
pub use player::*;
pub use resolution::*;
pub use rules::*;
