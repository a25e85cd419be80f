use std::collections::VecDeque;

pub use builder::{Builder, BuilderError};

use crate::basic::{Dim, Dir, Point};
use crate::error::{Error, ErrorType, Result};

pub mod builder;

/// A straight run of the body
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Segment {
    /// The cell of the run closest to the head
    pub pos: Point,
    /// Direction the run was travelling in
    pub dir: Dir,
    /// Number of cells in the run, never 0 for a stored segment
    pub len: usize,
}

impl Segment {
    /// The cell of the run closest to the tail
    pub fn tip(&self, dim: Dim) -> Point {
        self.pos.wrapping_translate(-self.dir, self.len - 1, dim)
    }

    /// Cells from the anchor backwards
    pub fn cells(&self, dim: Dim) -> impl Iterator<Item = Point> + '_ {
        (0..self.len).map(move |i| self.pos.wrapping_translate(-self.dir, i, dim))
    }
}

/// The body is stored run-length encoded: every change of direction
/// starts a new [`Segment`], moving straight only grows the head one
pub struct Snake {
    /// front is the head, back is the tail
    segments: VecDeque<Segment>,
    len: usize,
    /// Length the snake grows to, raised by eating
    max_len: usize,
    dim: Dim,
}

impl Snake {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn dim(&self) -> Dim {
        self.dim
    }

    pub fn grow(&mut self, delta: usize) {
        self.max_len += delta;
    }

    fn head(&self) -> &Segment {
        &self.segments[0]
    }

    /// # Panics
    /// If the snake was shrunk down to nothing, which a game never does.
    /// The same goes for [`Snake::head_dir`] and [`Snake::next_head`].
    pub fn head_position(&self) -> Point {
        self.head().pos
    }

    pub fn head_dir(&self) -> Dir {
        self.head().dir
    }

    /// Where the head ends up after moving in `dir`, without moving it
    pub fn next_head(&self, dir: Dir) -> Point {
        self.head_position().wrapping_translate(dir, 1, self.dim)
    }

    /// The cell `shrink_tail` would free next
    pub fn tail_tip(&self) -> Option<Point> {
        self.segments.back().map(|tail| tail.tip(self.dim))
    }

    /// Head first
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Every cell covered by the body, from head to tail
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        let dim = self.dim;
        self.segments.iter().flat_map(move |segment| segment.cells(dim))
    }

    pub fn contains(&self, point: Point) -> bool {
        self.cells().any(|cell| cell == point)
    }

    pub fn advance_head(&mut self, dir: Dir) -> Point {
        let new_pos = self.next_head(dir);

        match self.segments.front_mut() {
            Some(head) if head.dir == dir => {
                head.pos = new_pos;
                head.len += 1;
            }
            _ => self.segments.push_front(Segment { pos: new_pos, dir, len: 1 }),
        }

        self.len += 1;
        new_pos
    }

    /// Removes the last cell of the body and returns its position
    pub fn shrink_tail(&mut self) -> Result<Point> {
        let dim = self.dim;
        let tail = self
            .segments
            .back_mut()
            .ok_or_else(|| Error::from(ErrorType::InvalidShrink))?;

        let removed = if tail.len == 1 {
            let pos = tail.pos;
            self.segments.pop_back();
            pos
        } else {
            let tip = tail.tip(dim);
            tail.len -= 1;
            tip
        };

        self.len -= 1;
        Ok(removed)
    }

    /// Releases the body, returns the final length
    pub fn destroy(mut self) -> usize {
        let len = self.len;
        log::debug!("releasing {} segments (length {})", self.segments.len(), len);
        self.segments.clear();
        len
    }
}

#[cfg(test)]
fn test_snake(pos: Point, dir: Dir, max_len: usize) -> Snake {
    Snake::builder()
        .pos(pos)
        .dir(dir)
        .max_len(max_len)
        .dim(Dim { columns: 8, rows: 8 })
        .build()
        .unwrap()
}

#[cfg(test)]
fn assert_len_invariant(snake: &Snake) {
    assert_eq!(snake.len(), snake.segments().map(|s| s.len).sum::<usize>());
    assert_eq!(snake.len(), snake.cells().count());
}

#[test]
fn test_straight_growth_reuses_head_segment() {
    let mut snake = test_snake(Point::new(4, 4), Dir::R, 5);
    for expect_x in [5, 6, 7, 0] {
        assert_eq!(snake.advance_head(Dir::R), Point::new(expect_x, 4));
        assert_len_invariant(&snake);
    }
    assert_eq!(snake.len(), 5);
    assert_eq!(snake.segments().count(), 1);
    assert_eq!(snake.head_position(), Point::new(0, 4));
    assert_eq!(snake.tail_tip(), Some(Point::new(4, 4)));
}

#[test]
fn test_turn_adds_segment() {
    let mut snake = test_snake(Point::new(4, 4), Dir::R, 5);
    snake.advance_head(Dir::R);
    snake.advance_head(Dir::D);
    snake.advance_head(Dir::D);
    snake.advance_head(Dir::L);

    let segments: Vec<_> = snake.segments().copied().collect();
    assert_eq!(
        segments,
        vec![
            Segment { pos: Point::new(4, 6), dir: Dir::L, len: 1 },
            Segment { pos: Point::new(5, 6), dir: Dir::D, len: 2 },
            Segment { pos: Point::new(5, 4), dir: Dir::R, len: 2 },
        ]
    );
    assert_len_invariant(&snake);

    let cells: Vec<_> = snake.cells().collect();
    assert_eq!(
        cells,
        vec![
            Point::new(4, 6),
            Point::new(5, 6),
            Point::new(5, 5),
            Point::new(5, 4),
            Point::new(4, 4),
        ]
    );
}

#[test]
fn test_shrink_tail_retracts_from_the_back() {
    let mut snake = test_snake(Point::new(4, 4), Dir::R, 5);
    snake.advance_head(Dir::R);
    snake.advance_head(Dir::R);
    snake.advance_head(Dir::D);

    // tail run of 3: (6,4) (5,4) (4,4)
    assert_eq!(snake.shrink_tail().unwrap(), Point::new(4, 4));
    assert_eq!(snake.shrink_tail().unwrap(), Point::new(5, 4));
    assert_len_invariant(&snake);
    assert_eq!(snake.segments().count(), 2);

    // the run of 1 left is removed with its segment
    assert_eq!(snake.shrink_tail().unwrap(), Point::new(6, 4));
    assert_eq!(snake.segments().count(), 1);
    assert_eq!(snake.len(), 1);
    assert_eq!(snake.head_position(), Point::new(6, 5));
    assert_len_invariant(&snake);
}

#[test]
fn test_shrink_tail_across_the_edge() {
    let mut snake = test_snake(Point::new(6, 2), Dir::R, 5);
    snake.advance_head(Dir::R);
    snake.advance_head(Dir::R);
    snake.advance_head(Dir::R);
    assert_eq!(snake.head_position(), Point::new(1, 2));

    let removed: Vec<_> = (0..3).map(|_| snake.shrink_tail().unwrap()).collect();
    assert_eq!(removed, vec![Point::new(6, 2), Point::new(7, 2), Point::new(0, 2)]);
    assert_eq!(snake.cells().collect::<Vec<_>>(), vec![Point::new(1, 2)]);
}

#[test]
fn test_shrink_last_segment_then_invalid_shrink() {
    let mut snake = test_snake(Point::new(0, 0), Dir::R, 1);
    assert_eq!(snake.shrink_tail().unwrap(), Point::new(0, 0));
    assert!(snake.is_empty());
    assert_eq!(snake.len(), 0);
    assert_eq!(snake.tail_tip(), None);

    let err = snake.shrink_tail().unwrap_err();
    assert!(matches!(err.error_type(), ErrorType::InvalidShrink));
    assert_eq!(snake.len(), 0);
}

#[test]
fn test_grow_and_destroy() {
    let mut snake = test_snake(Point::new(1, 1), Dir::U, 5);
    snake.grow(5);
    assert_eq!(snake.max_len(), 10);
    snake.advance_head(Dir::U);
    snake.advance_head(Dir::L);
    assert!(snake.contains(Point::new(1, 0)));
    assert!(!snake.contains(Point::new(1, 2)));
    assert_eq!(snake.destroy(), 3);
}

#[test]
#[should_panic]
fn test_no_head_after_last_shrink() {
    let mut snake = test_snake(Point::new(2, 2), Dir::D, 1);
    snake.shrink_tail().unwrap();
    assert!(snake.is_empty());
    snake.head_position();
}
