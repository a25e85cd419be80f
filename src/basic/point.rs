use std::fmt::{Debug, Formatter};

use super::Dir;

/// A cell of the playfield, `(0, 0)` is the top-left corner
#[derive(Eq, PartialEq, Copy, Clone, Hash)]
pub struct Point {
    pub x: u8,
    pub y: u8,
}

/// Playfield size in cells
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Dim {
    pub columns: u8,
    pub rows: u8,
}

impl Point {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    // wraps around board edges (the board is a torus)
    #[must_use]
    pub fn wrapping_translate(self, dir: Dir, dist: usize, dim: Dim) -> Self {
        let (dx, dy) = dir.delta();
        let dist = dist as i64;
        let x = (self.x as i64 + dx as i64 * dist).rem_euclid(dim.columns as i64);
        let y = (self.y as i64 + dy as i64 * dist).rem_euclid(dim.rows as i64);
        Self { x: x as u8, y: y as u8 }
    }

    // basically mod width, mod height
    #[must_use]
    pub fn wrap(self, dim: Dim) -> Self {
        Self {
            x: self.x % dim.columns,
            y: self.y % dim.rows,
        }
    }
}

impl Debug for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}, {}>", self.x, self.y)
    }
}

impl Dim {
    pub fn contains(self, pos: Point) -> bool {
        pos.x < self.columns && pos.y < self.rows
    }

    pub fn cells(self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn center(self) -> Point {
        Point::new(self.columns / 2, self.rows / 2)
    }
}

#[test]
fn test_wrapping_translate_edges() {
    use Dir::*;

    for (columns, rows) in [(2, 2), (2, 4), (8, 8), (25, 16)] {
        let dim = Dim { columns, rows };
        let (max_x, max_y) = (columns - 1, rows - 1);

        #[rustfmt::skip]
        let cases = [
            ((max_x, 0), R, (0, 0)),
            ((0, 0),     L, (max_x, 0)),
            ((0, 0),     U, (0, max_y)),
            ((0, max_y), D, (0, 0)),
            ((0, 0),     R, (1, 0)),
            ((0, 0),     D, (0, 1)),
        ];

        for &((x, y), dir, (ex, ey)) in &cases {
            assert_eq!(
                Point::new(x, y).wrapping_translate(dir, 1, dim),
                Point::new(ex, ey),
                "{:?} from <{}, {}> on {:?}",
                dir,
                x,
                y,
                dim,
            );
        }
    }
}

#[test]
fn test_wrapping_translate_long_distance() {
    let dim = Dim { columns: 8, rows: 8 };
    let start = Point::new(1, 4);
    assert_eq!(start.wrapping_translate(Dir::L, 5, dim), Point::new(4, 4));
    assert_eq!(start.wrapping_translate(Dir::R, 16, dim), start);
    assert_eq!(start.wrapping_translate(Dir::U, 0, dim), start);
}
