use std::time::Duration;

use crate::basic::{Dir, Point};

/// What happens when the head moves onto the cell the tail leaves
/// during the same tick
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TailChase {
    /// The cell still counts as occupied
    Collide,
    /// The tail moves out first
    Allow,
}

#[derive(Clone, Debug)]
pub struct Prefs {
    /// Pause between two ticks
    pub tick: Duration,

    /// `None` starts in the middle of the board
    pub start_pos: Option<Point>,
    pub start_dir: Dir,
    pub start_max_len: usize,
    /// How much longer the snake gets per food
    pub len_delta: usize,

    /// Random positions tried before the food placer falls back
    /// to enumerating the free cells
    pub food_attempts: usize,
    pub tail_chase: TailChase,

    /// Leave a minimap of the last board on the game over screen
    pub minimap: bool,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(200),

            start_pos: None,
            start_dir: Dir::R,
            start_max_len: 5,
            len_delta: 5,

            food_attempts: 256,
            tail_chase: TailChase::Collide,

            minimap: false,
        }
    }
}

// builder
impl Prefs {
    pub fn tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn start_pos(mut self, pos: Point) -> Self {
        self.start_pos = Some(pos);
        self
    }

    pub fn start_dir(mut self, dir: Dir) -> Self {
        self.start_dir = dir;
        self
    }

    pub fn start_max_len(mut self, max_len: usize) -> Self {
        self.start_max_len = max_len;
        self
    }

    pub fn len_delta(mut self, delta: usize) -> Self {
        self.len_delta = delta;
        self
    }

    pub fn food_attempts(mut self, attempts: usize) -> Self {
        self.food_attempts = attempts;
        self
    }

    pub fn tail_chase(mut self, tail_chase: TailChase) -> Self {
        self.tail_chase = tail_chase;
        self
    }

    pub fn minimap(mut self, minimap: bool) -> Self {
        self.minimap = minimap;
        self
    }
}
