//! State shared between the button interrupt and the game loop
//!
//! The interrupt side ([`SharedInput::press`], [`SharedInput::press_restart`])
//! only ever stores a single word. The game loop takes the values out
//! once per tick, so presses between two ticks are coalesced and the
//! last one wins.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use static_assertions::assert_impl_all;

use crate::basic::Dir;

/// Stored in place of a direction when nothing was pressed
const NO_DIR: u8 = 0xFF;

/// What the game loop reads from the buttons
pub trait InputSource {
    /// The direction requested since the last call, if any
    fn requested_direction(&self) -> Option<Dir>;
    /// Whether restart was pressed since the last call
    fn restart_requested(&self) -> bool;
}

pub struct SharedInput {
    direction: AtomicU8,
    restart: AtomicBool,
}

assert_impl_all!(SharedInput: Send, Sync);

impl Default for SharedInput {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedInput {
    pub const fn new() -> Self {
        Self {
            direction: AtomicU8::new(NO_DIR),
            restart: AtomicBool::new(false),
        }
    }

    pub fn press(&self, dir: Dir) {
        self.direction.store(dir as u8, Ordering::Release);
    }

    pub fn press_restart(&self) {
        self.restart.store(true, Ordering::Release);
    }
}

impl InputSource for SharedInput {
    fn requested_direction(&self) -> Option<Dir> {
        let code = self.direction.swap(NO_DIR, Ordering::AcqRel);
        let dir = Dir::from_code(code);
        if let Some(dir) = dir {
            log::trace!("direction {:?} requested", dir);
        }
        dir
    }

    fn restart_requested(&self) -> bool {
        self.restart.swap(false, Ordering::AcqRel)
    }
}

impl<T: InputSource + ?Sized> InputSource for &T {
    fn requested_direction(&self) -> Option<Dir> {
        (**self).requested_direction()
    }

    fn restart_requested(&self) -> bool {
        (**self).restart_requested()
    }
}

impl<T: InputSource + ?Sized> InputSource for std::sync::Arc<T> {
    fn requested_direction(&self) -> Option<Dir> {
        (**self).requested_direction()
    }

    fn restart_requested(&self) -> bool {
        (**self).restart_requested()
    }
}

#[test]
fn test_last_press_wins() {
    let input = SharedInput::new();
    assert_eq!(input.requested_direction(), None);

    input.press(Dir::U);
    input.press(Dir::L);
    input.press(Dir::D);
    assert_eq!(input.requested_direction(), Some(Dir::D));
    // taken
    assert_eq!(input.requested_direction(), None);
}

#[test]
fn test_restart_is_momentary() {
    let input = SharedInput::new();
    assert!(!input.restart_requested());
    input.press_restart();
    input.press_restart();
    assert!(input.restart_requested());
    assert!(!input.restart_requested());
}

#[test]
fn test_presses_from_another_thread() {
    use std::sync::Arc;
    use std::thread;

    static INPUT: SharedInput = SharedInput::new();

    let handle = thread::spawn(|| {
        for dir in Dir::iter().cycle().take(1000) {
            INPUT.press(dir);
        }
        INPUT.press(Dir::L);
        INPUT.press_restart();
    });
    handle.join().unwrap();

    assert_eq!(INPUT.requested_direction(), Some(Dir::L));
    assert!(INPUT.restart_requested());

    // the same through an Arc
    let shared = Arc::new(SharedInput::new());
    let writer = Arc::clone(&shared);
    thread::spawn(move || writer.press(Dir::U)).join().unwrap();
    assert_eq!(shared.requested_direction(), Some(Dir::U));
}
