use std::thread;

use rand::Rng;

use crate::collisions::{GameOverCause, Outcome, Session};
use crate::display::{self, DisplaySurface, COLUMNS, GROUPS};
use crate::error::{ErrorConversion, Result};
use crate::input::InputSource;
use crate::prefs::Prefs;

pub enum State<const C: usize, const G: usize> {
    /// Nothing allocated, the next step starts a game
    Init,
    Running(Session<C, G>),
    GameOver {
        final_length: usize,
        cause: GameOverCause,
    },
}

impl<const C: usize, const G: usize> State<C, G> {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    pub fn final_length(&self) -> Option<usize> {
        match self {
            Self::GameOver { final_length, .. } => Some(*final_length),
            _ => None,
        }
    }
}

/// The main loop, one [`Game::step`] per tick
pub struct Game<R: Rng, D: DisplaySurface, I: InputSource, const C: usize, const G: usize> {
    prefs: Prefs,
    rng: R,
    display: D,
    input: I,
    state: State<C, G>,
}

/// A game on the full console display
pub type ConsoleGame<R, D, I> = Game<R, D, I, COLUMNS, GROUPS>;

impl<R: Rng, D: DisplaySurface, I: InputSource, const C: usize, const G: usize> Game<R, D, I, C, G> {
    pub fn new(prefs: Prefs, rng: R, display: D, input: I) -> Self {
        Self {
            prefs,
            rng,
            display,
            input,
            state: State::Init,
        }
    }

    pub fn state(&self) -> &State<C, G> {
        &self.state
    }

    pub fn prefs(&self) -> &Prefs {
        &self.prefs
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    fn start(&mut self) -> Result<State<C, G>> {
        let session = Session::new(&self.prefs, &mut self.rng).with_trace_step("starting a game")?;

        self.display.clear();
        display::redraw_all(&mut self.display, session.grid());
        self.display.show_length(session.snake().len());

        log::info!("new game, food at {:?}", session.food());
        Ok(State::Running(session))
    }

    fn end(&mut self, session: Session<C, G>, cause: GameOverCause) -> State<C, G> {
        let ticks = session.ticks();

        self.display.clear();
        if self.prefs.minimap {
            let origin = display::minimap_origin(C);
            display::draw_minimap(&mut self.display, session.grid(), origin);
        }

        let final_length = session.end();
        self.display.show_game_over(final_length);

        log::info!(
            "game over after {} ticks ({:?}), final length {}",
            ticks,
            cause,
            final_length
        );
        State::GameOver { final_length, cause }
    }

    /// Advances the state machine by one transition, doesn't wait
    pub fn step(&mut self) -> Result<&State<C, G>> {
        let state = std::mem::replace(&mut self.state, State::Init);

        self.state = match state {
            State::Init => self.start()?,
            State::Running(mut session) => {
                // only meaningful on the game over screen
                if self.input.restart_requested() {
                    log::trace!("restart ignored while running");
                }

                let dir = session
                    .snake()
                    .head_dir()
                    .resolve(self.input.requested_direction());

                match session.tick(dir, &mut self.rng, &self.prefs).with_trace_step("step")? {
                    Outcome::Moved(tick) => {
                        for point in tick.dirty {
                            display::redraw(&mut self.display, session.grid(), point);
                        }
                        self.display.show_length(tick.len);
                        State::Running(session)
                    }
                    Outcome::GameOver(cause) => self.end(session, cause),
                }
            }
            State::GameOver { final_length, cause } => {
                if self.input.restart_requested() {
                    log::debug!("restart requested");
                    State::Init
                } else {
                    State::GameOver { final_length, cause }
                }
            }
        };

        Ok(&self.state)
    }

    /// Plays until the game is over, waiting the tick interval after
    /// every step. Returns the final length.
    pub fn run_session(&mut self) -> Result<usize> {
        loop {
            if let Some(final_length) = self.step()?.final_length() {
                return Ok(final_length);
            }
            thread::sleep(self.prefs.tick);
        }
    }
}

#[cfg(test)]
use crate::{
    basic::{Dir, Point},
    collisions::Collision,
    display::PageBuffer,
    input::SharedInput,
};
#[cfg(test)]
use rand::{rngs::SmallRng, SeedableRng};
#[cfg(test)]
use std::time::Duration;

#[cfg(test)]
fn test_prefs() -> Prefs {
    Prefs::default().tick(Duration::ZERO)
}

#[test]
fn test_start_draws_the_board() {
    let input = SharedInput::new();
    let mut game: ConsoleGame<_, _, _> =
        Game::new(test_prefs(), SmallRng::seed_from_u64(1), PageBuffer::new(), &input);
    assert!(matches!(game.state(), State::Init));
    assert!(game.display().is_blank());

    assert!(game.step().unwrap().is_running());
    assert!(!game.display().is_blank());
    assert_eq!(game.display().length(), Some(1));

    // no input, keeps going right
    for n in 1..20 {
        game.step().unwrap();
        match game.state() {
            State::Running(session) => {
                assert_eq!(session.snake().head_position(), Point::new((12 + n) % 25, 8));
                assert_eq!(game.display().length(), Some(session.snake().len()));
            }
            _ => panic!("game ended after {} ticks", n),
        }
    }
}

#[test]
fn test_reversal_is_ignored() {
    let input = SharedInput::new();
    let mut game: ConsoleGame<_, _, _> =
        Game::new(test_prefs(), SmallRng::seed_from_u64(2), PageBuffer::new(), &input);
    game.step().unwrap();

    input.press(Dir::L);
    game.step().unwrap();
    match game.state() {
        State::Running(session) => {
            assert_eq!(session.snake().head_dir(), Dir::R);
            assert_eq!(session.snake().head_position(), Point::new(13, 8));
        }
        _ => panic!("game should be running"),
    }
}

#[test]
fn test_game_over_and_restart() {
    let input = SharedInput::new();
    let mut game: ConsoleGame<_, _, _> =
        Game::new(test_prefs(), SmallRng::seed_from_u64(3), PageBuffer::new(), &input);
    game.step().unwrap();
    for _ in 0..4 {
        game.step().unwrap();
    }

    for dir in [Dir::D, Dir::L] {
        input.press(dir);
        assert!(game.step().unwrap().is_running());
    }
    input.press(Dir::U);
    input.press_restart();
    game.step().unwrap();

    let final_length = match game.state() {
        State::GameOver { final_length, cause } => {
            assert_eq!(
                *cause,
                GameOverCause::Collision(Collision::Itself(Point::new(15, 8)))
            );
            *final_length
        }
        _ => panic!("expected game over"),
    };
    assert!(final_length >= 5);
    assert_eq!(game.display().final_length(), Some(final_length));
    assert!(game.display().is_blank());

    // waits for the restart button
    for _ in 0..3 {
        input.press(Dir::D);
        assert_eq!(game.step().unwrap().final_length(), Some(final_length));
    }

    input.press_restart();
    assert!(matches!(game.step().unwrap(), State::Init));
    assert!(game.step().unwrap().is_running());
    assert_eq!(game.display().final_length(), None);
    assert_eq!(game.display().length(), Some(1));
}

#[test]
fn test_run_session() {
    let input = SharedInput::new();
    let prefs = test_prefs().start_pos(Point::new(4, 4)).start_max_len(100);
    let mut game: Game<_, _, _, 8, 2> =
        Game::new(prefs, SmallRng::seed_from_u64(4), PageBuffer::new(), &input);

    // fills its own row, then bites the start cell
    assert_eq!(game.run_session().unwrap(), 8);
    assert_eq!(game.display().final_length(), Some(8));
}

#[test]
fn test_minimap_on_game_over() {
    let input = SharedInput::new();
    let prefs = test_prefs().start_pos(Point::new(4, 4)).start_max_len(100).minimap(true);
    let mut game: Game<_, _, _, 8, 2> =
        Game::new(prefs, SmallRng::seed_from_u64(5), PageBuffer::new(), &input);

    let mut last_grid = None;
    while game.step().unwrap().final_length().is_none() {
        if let State::Running(session) = game.state() {
            last_grid = Some(session.grid().clone());
        }
    }

    // the colliding tick doesn't touch the grid
    let mut expected = PageBuffer::new();
    display::draw_minimap(&mut expected, &last_grid.unwrap(), display::minimap_origin(8));
    assert!(!game.display().is_blank());
    assert_eq!(game.display().to_ascii(), expected.to_ascii());
    assert_eq!(game.display().final_length(), Some(8));
}
