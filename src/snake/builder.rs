use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

use super::{Segment, Snake};
use crate::basic::{Dim, Dir, Point};

#[derive(Debug, Error)]
#[must_use]
pub struct BuilderError(pub Box<Builder>, pub &'static str);

impl Display for BuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "snake builder error: {}", self.1)?;
        writeln!(f, "builder: {:?}", self.0)
    }
}

#[derive(Default, Clone, Debug)]
pub struct Builder {
    pub pos: Option<Point>,
    pub dir: Option<Dir>,
    pub max_len: Option<usize>,
    pub dim: Option<Dim>,
}

impl Builder {
    #[inline(always)]
    #[must_use]
    pub fn pos(mut self, value: Point) -> Self {
        self.pos = Some(value);
        self
    }

    #[inline(always)]
    #[must_use]
    pub fn dir(mut self, value: Dir) -> Self {
        self.dir = Some(value);
        self
    }

    #[inline(always)]
    #[must_use]
    pub fn max_len(mut self, value: usize) -> Self {
        self.max_len = Some(value);
        self
    }

    #[inline(always)]
    #[must_use]
    pub fn dim(mut self, value: Dim) -> Self {
        self.dim = Some(value);
        self
    }

    /// A snake of length 1 at `pos`, heading in `dir`
    pub fn build(&self) -> Result<Snake, BuilderError> {
        let pos = self
            .pos
            .ok_or_else(|| BuilderError(Box::new(self.clone()), "missing field `pos`"))?;
        let dir = self
            .dir
            .ok_or_else(|| BuilderError(Box::new(self.clone()), "missing field `dir`"))?;
        let dim = self
            .dim
            .ok_or_else(|| BuilderError(Box::new(self.clone()), "missing field `dim`"))?;
        let max_len = self
            .max_len
            .ok_or_else(|| BuilderError(Box::new(self.clone()), "missing field `max_len`"))?;

        if max_len == 0 {
            return Err(BuilderError(Box::new(self.clone()), "`max_len` must be at least 1"));
        }
        if !dim.contains(pos) {
            return Err(BuilderError(Box::new(self.clone()), "`pos` is outside the board"));
        }

        log::debug!("spawn snake at {:?} going {:?}", pos, dir);

        let mut segments = VecDeque::new();
        segments.push_back(Segment { pos, dir, len: 1 });

        Ok(Snake {
            segments,
            len: 1,
            max_len,
            dim,
        })
    }
}

#[test]
fn test_missing_fields() {
    let err = Builder::default().dir(Dir::R).build().err().unwrap();
    assert_eq!(err.1, "missing field `pos`");

    let err = Builder::default()
        .pos(Point::new(0, 0))
        .dir(Dir::R)
        .dim(Dim { columns: 8, rows: 8 })
        .build()
        .err()
        .unwrap();
    assert_eq!(err.1, "missing field `max_len`");
}

#[test]
fn test_invalid_fields() {
    let builder = Builder::default()
        .pos(Point::new(8, 0))
        .dir(Dir::R)
        .max_len(5)
        .dim(Dim { columns: 8, rows: 8 });
    assert_eq!(builder.build().err().unwrap().1, "`pos` is outside the board");

    let builder = builder.pos(Point::new(7, 7)).max_len(0);
    assert_eq!(builder.build().err().unwrap().1, "`max_len` must be at least 1");
}

#[test]
fn test_build() {
    let snake = Builder::default()
        .pos(Point::new(4, 4))
        .dir(Dir::R)
        .max_len(5)
        .dim(Dim { columns: 8, rows: 8 })
        .build()
        .unwrap();
    assert_eq!(snake.len(), 1);
    assert_eq!(snake.max_len(), 5);
    assert_eq!(snake.head_position(), Point::new(4, 4));
    assert_eq!(snake.head_dir(), Dir::R);
    assert_eq!(snake.tail_tip(), Some(Point::new(4, 4)));
}
