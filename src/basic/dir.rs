use std::ops::Neg;

use rand::Rng;
use Dir::*;

// same order as the button codes written by the input interrupt
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Dir {
    U = 0,
    D = 1,
    L = 2,
    R = 3,
}

impl Neg for Dir {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            U => D,
            D => U,
            L => R,
            R => L,
        }
    }
}

impl Dir {
    pub fn iter() -> impl Iterator<Item = Self> + Clone {
        [U, D, L, R].iter().copied()
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::from_code(rng.gen_range(0..4)).unwrap_or(R)
    }

    /// Inverse of `dir as u8`, `None` for anything that isn't a direction
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(U),
            1 => Some(D),
            2 => Some(L),
            3 => Some(R),
            _ => None,
        }
    }

    /// Unit step in grid coordinates, y grows downwards
    pub fn delta(self) -> (i8, i8) {
        match self {
            U => (0, -1),
            D => (0, 1),
            L => (-1, 0),
            R => (1, 0),
        }
    }

    /// The direction a snake heading in `self` goes next tick when
    /// `requested` was pressed, a 180° turn is ignored
    pub fn resolve(self, requested: Option<Self>) -> Self {
        match requested {
            Some(dir) if dir == -self => {
                log::trace!("ignoring 180° turn {:?} -> {:?}", self, dir);
                self
            }
            Some(dir) => dir,
            None => self,
        }
    }
}

#[test]
fn test_opposite() {
    for dir in Dir::iter() {
        assert_ne!(dir, -dir);
        assert_eq!(dir, -(-dir));
        let (dx, dy) = dir.delta();
        let (ox, oy) = (-dir).delta();
        assert_eq!((dx + ox, dy + oy), (0, 0));
    }
}

#[test]
fn test_code_round_trip() {
    for dir in Dir::iter() {
        assert_eq!(Dir::from_code(dir as u8), Some(dir));
    }
    assert_eq!(Dir::from_code(4), None);
    assert_eq!(Dir::from_code(0xFF), None);
}

#[test]
fn test_resolve() {
    #[rustfmt::skip]
    let cases = [
        (R, None,    R),
        (R, Some(L), R),
        (R, Some(U), U),
        (R, Some(R), R),
        (U, Some(D), U),
        (U, Some(L), L),
        (L, Some(R), L),
        (D, Some(U), D),
        (D, Some(R), R),
    ];

    for &(current, requested, expect) in &cases {
        assert_eq!(current.resolve(requested), expect, "{:?} + {:?}", current, requested);
    }
}

#[test]
fn test_iter_cycles() {
    let dirs: Vec<_> = Dir::iter().cycle().take(6).collect();
    assert_eq!(dirs, vec![U, D, L, R, U, D]);
}
