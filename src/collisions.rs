use rand::Rng;

use crate::basic::{Dir, Point};
use crate::error::{ErrorConversion, Result};
use crate::food;
use crate::grid::{CellState, Grid};
use crate::prefs::{Prefs, TailChase};
use crate::snake::Snake;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Collision {
    // the head ran into the body
    Itself(Point),
    // the head ran into a wall that isn't part of the snake
    Wall(Point),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameOverCause {
    Collision(Collision),
    /// The snake ate and there was nowhere to put the next food
    GridFull,
}

/// What changed during a tick that didn't end the game
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Tick {
    pub head: Point,
    pub ate: bool,
    pub len: usize,
    /// Cells whose state changed, to be redrawn
    pub dirty: Vec<Point>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Outcome {
    Moved(Tick),
    GameOver(GameOverCause),
}

/// Everything that lives for exactly one game
pub struct Session<const C: usize, const G: usize> {
    snake: Snake,
    grid: Grid<C, G>,
    food: Point,
    ticks: u64,
}

impl<const C: usize, const G: usize> Session<C, G> {
    /// A snake of length 1 at the start position and the first food
    pub fn new(prefs: &Prefs, rng: &mut impl Rng) -> Result<Self> {
        let mut grid = Grid::new();
        grid.clear_all();

        let dim = grid.dim();
        let pos = prefs.start_pos.unwrap_or_else(|| dim.center());
        let snake = Snake::builder()
            .pos(pos)
            .dir(prefs.start_dir)
            .max_len(prefs.start_max_len)
            .dim(dim)
            .build()?;
        grid.set(pos, CellState::Wall);

        let food = food::place(&grid, rng, prefs.food_attempts).with_trace_step("placing the first food")?;
        grid.set(food, CellState::Food);

        Ok(Self { snake, grid, food, ticks: 0 })
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn grid(&self) -> &Grid<C, G> {
        &self.grid
    }

    pub fn food(&self) -> Point {
        self.food
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Releases the snake and clears the grid, returns the final length
    pub fn end(mut self) -> usize {
        self.grid.clear_all();
        self.snake.destroy()
    }

    /// Turns an empty cell into a wall, returns whether it did
    pub fn add_wall(&mut self, point: Point) -> bool {
        let point = point.wrap(self.grid.dim());
        if self.grid.get(point) == CellState::Empty {
            self.grid.set(point, CellState::Wall);
            true
        } else {
            false
        }
    }

    /// Whether moving onto `next` frees the tail tip in the same tick
    fn vacates_tail(&self, next: Point, prefs: &Prefs) -> bool {
        let max_len = if next == self.food {
            self.snake.max_len() + prefs.len_delta
        } else {
            self.snake.max_len()
        };
        self.snake.len() + 1 > max_len && self.snake.tail_tip() == Some(next)
    }

    fn find_collision(&self, next: Point, prefs: &Prefs) -> Option<Collision> {
        if self.grid.get(next) != CellState::Wall {
            return None;
        }

        if prefs.tail_chase == TailChase::Allow && self.vacates_tail(next, prefs) {
            return None;
        }

        if self.snake.contains(next) {
            Some(Collision::Itself(next))
        } else {
            Some(Collision::Wall(next))
        }
    }

    fn shrink_to(&mut self, max_len: usize, dirty: &mut Vec<Point>) -> Result {
        while self.snake.len() > max_len {
            let removed = self.snake.shrink_tail().with_trace_step("shrinking to max length")?;
            self.grid.set(removed, CellState::Empty);
            dirty.push(removed);
        }
        Ok(())
    }

    /// Advances the game by one step in `dir`, which must already be
    /// checked against 180° turns
    pub fn tick(&mut self, dir: Dir, rng: &mut impl Rng, prefs: &Prefs) -> Result<Outcome> {
        let next = self.snake.next_head(dir);

        if let Some(collision) = self.find_collision(next, prefs) {
            log::info!("collision after {} ticks: {:?}", self.ticks, collision);
            return Ok(Outcome::GameOver(GameOverCause::Collision(collision)));
        }

        let mut dirty = Vec::with_capacity(4);

        // only reachable with TailChase::Allow, the tail has to be out
        // of the way before the head is written
        let chase = self.vacates_tail(next, prefs);

        let ate = next == self.food;
        if ate {
            self.snake.grow(prefs.len_delta);
            self.grid.set(self.food, CellState::Empty);
        }

        if chase {
            self.shrink_to(self.snake.max_len() - 1, &mut dirty)
                .with_trace_step("tick")?;
        }

        self.grid.set(next, CellState::Wall);
        let head = self.snake.advance_head(dir);
        dirty.push(head);

        if ate {
            match food::place(&self.grid, rng, prefs.food_attempts) {
                Ok(food) => {
                    log::debug!("ate food at {:?}, next one at {:?}", head, food);
                    self.grid.set(food, CellState::Food);
                    self.food = food;
                    dirty.push(food);
                }
                Err(e) if e.is_grid_full() => {
                    log::info!("no room left for food after {} ticks", self.ticks);
                    return Ok(Outcome::GameOver(GameOverCause::GridFull));
                }
                Err(e) => return Err(e.with_trace_step("tick")),
            }
        }

        self.shrink_to(self.snake.max_len(), &mut dirty).with_trace_step("tick")?;

        self.ticks += 1;
        log::debug!("tick {}: head {:?}, length {}/{}", self.ticks, head, self.snake.len(), self.snake.max_len());
        Ok(Outcome::Moved(Tick {
            head,
            ate,
            len: self.snake.len(),
            dirty,
        }))
    }
}

#[cfg(test)]
use rand::{rngs::SmallRng, SeedableRng};

#[cfg(test)]
impl<const C: usize, const G: usize> Session<C, G> {
    fn relocate_food(&mut self, point: Point) {
        self.grid.set(self.food, CellState::Empty);
        assert_eq!(self.grid.get(point), CellState::Empty);
        self.grid.set(point, CellState::Food);
        self.food = point;
    }

    fn assert_coherent(&self) {
        let snake = &self.snake;
        assert_eq!(snake.len(), snake.segments().map(|s| s.len).sum::<usize>());
        for cell in snake.cells() {
            assert_eq!(self.grid.get(cell), CellState::Wall, "body cell {:?}", cell);
        }
        assert_eq!(self.grid.count(CellState::Wall), snake.len());
        assert_eq!(self.grid.get(self.food), CellState::Food);
        assert_eq!(self.grid.count(CellState::Food), 1);
    }
}

#[cfg(test)]
fn expect_moved(outcome: Outcome) -> Tick {
    match outcome {
        Outcome::Moved(tick) => tick,
        other => panic!("expected the snake to move, got {:?}", other),
    }
}

#[cfg(test)]
fn test_session(prefs: &Prefs, rng: &mut SmallRng) -> Session<8, 2> {
    let mut session = Session::<8, 2>::new(prefs, rng).unwrap();
    session.relocate_food(Point::new(0, 0));
    session
}

#[test]
fn test_length_follows_max_len() {
    let mut rng = SmallRng::seed_from_u64(1);
    let prefs = Prefs::default().start_pos(Point::new(4, 4));
    let mut session = test_session(&prefs, &mut rng);
    assert_eq!(session.snake().len(), 1);
    assert_eq!(session.snake().max_len(), 5);

    for (n, expect_x) in [5, 6, 7, 0, 1, 2].into_iter().enumerate() {
        let tick = expect_moved(session.tick(Dir::R, &mut rng, &prefs).unwrap());
        let n = n + 1;
        assert_eq!(tick.head, Point::new(expect_x, 4));
        assert_eq!(tick.len, (n + 1).min(5));
        assert_eq!(session.snake().len(), (n + 1).min(5));
        session.assert_coherent();

        if n == 5 {
            // first shrink frees the start cell
            assert_eq!(tick.dirty, vec![Point::new(1, 4), Point::new(4, 4)]);
            assert_eq!(session.grid().get(Point::new(4, 4)), CellState::Empty);
        }
    }
    assert_eq!(session.ticks(), 6);
}

#[test]
fn test_eating_grows_by_delta() {
    let mut rng = SmallRng::seed_from_u64(2);
    let prefs = Prefs::default().start_pos(Point::new(4, 4)).len_delta(3);
    let mut session = test_session(&prefs, &mut rng);

    for _ in 0..6 {
        expect_moved(session.tick(Dir::D, &mut rng, &prefs).unwrap());
    }
    assert_eq!(session.snake().len(), 5);

    // food right in front of the head
    let head = session.snake().head_position();
    session.relocate_food(head.wrapping_translate(Dir::L, 1, session.grid().dim()));
    let tick = expect_moved(session.tick(Dir::L, &mut rng, &prefs).unwrap());
    assert!(tick.ate);
    assert_eq!(session.snake().max_len(), 8);
    assert_eq!(session.snake().len(), 6);
    assert_ne!(session.food(), tick.head);
    assert!(!session.snake().contains(session.food()));
    assert!(tick.dirty.contains(&session.food()));
    session.assert_coherent();

    // grows up to the new max_len without eating again
    session.relocate_food(Point::new(7, 0));
    for _ in 0..4 {
        expect_moved(session.tick(Dir::L, &mut rng, &prefs).unwrap());
    }
    assert_eq!(session.snake().len(), 8);
    session.assert_coherent();
}

#[test]
fn test_self_collision() {
    let mut rng = SmallRng::seed_from_u64(3);
    let prefs = Prefs::default().start_pos(Point::new(4, 4));
    let mut session = test_session(&prefs, &mut rng);

    for dir in [Dir::R, Dir::R, Dir::R, Dir::D, Dir::L] {
        expect_moved(session.tick(dir, &mut rng, &prefs).unwrap());
    }
    let before = session.grid().clone();

    let outcome = session.tick(Dir::U, &mut rng, &prefs).unwrap();
    assert_eq!(
        outcome,
        Outcome::GameOver(GameOverCause::Collision(Collision::Itself(Point::new(6, 4))))
    );
    // nothing was committed
    assert_eq!(session.grid(), &before);
    assert_eq!(session.snake().len(), 5);
}

#[test]
fn test_tail_chase() {
    let mut rng = SmallRng::seed_from_u64(4);
    for tail_chase in [TailChase::Collide, TailChase::Allow] {
        let prefs = Prefs::default()
            .start_pos(Point::new(4, 4))
            .start_max_len(4)
            .tail_chase(tail_chase);
        let mut session = test_session(&prefs, &mut rng);

        for dir in [Dir::R, Dir::D, Dir::L] {
            expect_moved(session.tick(dir, &mut rng, &prefs).unwrap());
        }
        assert_eq!(session.snake().tail_tip(), Some(Point::new(4, 4)));

        let outcome = session.tick(Dir::U, &mut rng, &prefs).unwrap();
        match tail_chase {
            TailChase::Collide => assert_eq!(
                outcome,
                Outcome::GameOver(GameOverCause::Collision(Collision::Itself(Point::new(4, 4))))
            ),
            TailChase::Allow => {
                let tick = expect_moved(outcome);
                assert_eq!(tick.head, Point::new(4, 4));
                assert_eq!(tick.len, 4);
                assert_eq!(session.grid().get(Point::new(4, 4)), CellState::Wall);
                session.assert_coherent();

                // and around again
                for dir in [Dir::R, Dir::D, Dir::L, Dir::U] {
                    expect_moved(session.tick(dir, &mut rng, &prefs).unwrap());
                    session.assert_coherent();
                }
            }
        }
    }
}

#[test]
fn test_wall_collision() {
    let mut rng = SmallRng::seed_from_u64(5);
    let prefs = Prefs::default().start_pos(Point::new(4, 4));
    let mut session = test_session(&prefs, &mut rng);

    assert!(session.add_wall(Point::new(6, 4)));
    assert!(!session.add_wall(Point::new(4, 4)));

    expect_moved(session.tick(Dir::R, &mut rng, &prefs).unwrap());
    assert_eq!(
        session.tick(Dir::R, &mut rng, &prefs).unwrap(),
        Outcome::GameOver(GameOverCause::Collision(Collision::Wall(Point::new(6, 4))))
    );
}

#[test]
fn test_grid_full() {
    let mut rng = SmallRng::seed_from_u64(6);
    let prefs = Prefs::default()
        .start_pos(Point::new(0, 0))
        .start_max_len(100)
        .food_attempts(8);
    let mut session = Session::<2, 1>::new(&prefs, &mut rng).unwrap();

    // visits every cell of the 2x4 board
    let path = [Dir::R, Dir::D, Dir::L, Dir::D, Dir::R, Dir::D];
    for dir in path {
        expect_moved(session.tick(dir, &mut rng, &prefs).unwrap());
        session.assert_coherent();
    }
    assert_eq!(session.food(), Point::new(0, 3));

    assert_eq!(
        session.tick(Dir::L, &mut rng, &prefs).unwrap(),
        Outcome::GameOver(GameOverCause::GridFull)
    );
}

#[test]
fn test_random_walk_stays_coherent() {
    for seed in 0..20 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let prefs = Prefs::default().len_delta(2);
        let mut session = Session::<8, 2>::new(&prefs, &mut rng).unwrap();
        session.assert_coherent();

        for _ in 0..300 {
            let dir = session.snake().head_dir().resolve(Some(Dir::random(&mut rng)));
            let max_len = session.snake().max_len();
            match session.tick(dir, &mut rng, &prefs).unwrap() {
                Outcome::Moved(tick) => {
                    session.assert_coherent();
                    for cell in &tick.dirty {
                        if !session.snake().contains(*cell) && *cell != session.food() {
                            assert_eq!(session.grid().get(*cell), CellState::Empty);
                        }
                    }
                    let expected_max = if tick.ate { max_len + 2 } else { max_len };
                    assert_eq!(session.snake().max_len(), expected_max);
                }
                Outcome::GameOver(_) => break,
            }
        }
    }
}
