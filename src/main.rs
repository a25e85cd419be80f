use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use rand::{rngs::SmallRng, SeedableRng};

use dot_snake::display::DisplayAddress;
use dot_snake::{ConsoleGame, Dir, DisplaySurface, Game, PageBuffer, Prefs, SharedInput};

/// Prints the page buffer to the terminal every tick
#[derive(Default)]
struct Terminal {
    buffer: PageBuffer,
}

/// Redraws the whole buffer with `status` below it
fn render(out: &mut impl Write, buffer: &PageBuffer, status: &str) -> io::Result<()> {
    // clear screen, cursor home
    write!(out, "\x1B[2J\x1B[H{}\n{}\n", buffer.to_ascii(), status)?;
    out.flush()
}

impl Terminal {
    fn print(&self, status: &str) {
        if let Err(e) = render(&mut io::stdout().lock(), &self.buffer, status) {
            log::warn!("failed to draw to the terminal: {}", e);
        }
    }
}

impl DisplaySurface for Terminal {
    fn write_block(&mut self, address: DisplayAddress, columns: &[u8]) {
        self.buffer.write_block(address, columns);
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn show_length(&mut self, length: usize) {
        self.buffer.show_length(length);
        self.print(&format!("length {}", length));
    }

    fn show_game_over(&mut self, final_length: usize) {
        self.buffer.show_game_over(final_length);
        self.print(&format!(
            "game over, final length {}\nr to play again, q to quit",
            final_length
        ));
    }
}

/// Stands in for the button interrupt: only stores, never touches the game
fn read_buttons(input: Arc<SharedInput>, quit: Arc<AtomicBool>) {
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        for c in line.chars() {
            match c.to_ascii_lowercase() {
                'w' => input.press(Dir::U),
                'a' => input.press(Dir::L),
                's' => input.press(Dir::D),
                'd' => input.press(Dir::R),
                'r' => input.press_restart(),
                'q' => {
                    quit.store(true, Ordering::Release);
                    return;
                }
                _ => {}
            }
        }
    }
    quit.store(true, Ordering::Release);
}

fn main() -> dot_snake::Result {
    env_logger::init();

    let input = Arc::new(SharedInput::new());
    let quit = Arc::new(AtomicBool::new(false));
    {
        let input = Arc::clone(&input);
        let quit = Arc::clone(&quit);
        thread::spawn(move || read_buttons(input, quit));
    }

    let mut game: ConsoleGame<_, _, _> = Game::new(
        Prefs::default().minimap(true),
        SmallRng::from_entropy(),
        Terminal::default(),
        Arc::clone(&input),
    );

    while !quit.load(Ordering::Acquire) {
        game.step()?;
        thread::sleep(game.prefs().tick);
    }

    log::info!("bye");
    Ok(())
}

#[cfg(test)]
struct Unplugged;

#[cfg(test)]
impl Write for Unplugged {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_render() {
    let buffer = PageBuffer::new();
    let mut out = Vec::new();
    render(&mut out, &buffer, "length 3").unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.ends_with("\nlength 3\n"));
    assert_eq!(text.lines().count(), 64 + 1);

    let err = render(&mut Unplugged, &buffer, "length 3").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}
