#[macro_use]
extern crate derive_more;

pub mod basic;
pub mod collisions;
pub mod display;
pub mod error;
pub mod food;
pub mod game;
pub mod grid;
pub mod input;
pub mod prefs;
pub mod snake;

pub use basic::{Dim, Dir, Point};
pub use collisions::{Collision, GameOverCause, Outcome, Session, Tick};
pub use display::{ConsoleGrid, DisplaySurface, PageBuffer};
pub use error::{Error, ErrorType, Result};
pub use game::{ConsoleGame, Game, State};
pub use grid::{CellState, Grid};
pub use input::{InputSource, SharedInput};
pub use prefs::{Prefs, TailChase};
