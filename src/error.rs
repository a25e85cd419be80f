use crate::snake;
use std::fmt::{Debug, Display, Formatter};
use std::{fmt, result};

#[derive(Debug)]
pub enum ErrorType {
    /// No free cell was left for the food
    GridFull { cells: usize },
    /// `shrink_tail` was called on a snake without segments
    InvalidShrink,
    SnakeBuilderError(snake::BuilderError),
}

/// The second member contains a trace in reverse order
#[must_use]
pub struct Error(ErrorType, Vec<String>);

impl From<ErrorType> for Error {
    fn from(typ: ErrorType) -> Self {
        Self(typ, vec![])
    }
}

impl From<snake::BuilderError> for Error {
    fn from(e: snake::BuilderError) -> Self {
        Self(ErrorType::SnakeBuilderError(e), vec![])
    }
}

impl Error {
    pub fn with_trace_step<S: ToString>(mut self, s: S) -> Self {
        self.1.push(s.to_string());
        self
    }

    pub fn error_type(&self) -> &ErrorType {
        &self.0
    }

    pub fn is_grid_full(&self) -> bool {
        matches!(self.0, ErrorType::GridFull { .. })
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error:\n{:?}\nTrace:", self.0)?;
        for t in (self.1).iter().rev() {
            writeln!(f, " in {}", t)?;
        }
        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for Error {}

pub type Result<T = ()> = result::Result<T, Error>;

pub trait ErrorConversion {
    fn with_trace_step<S: ToString>(self, s: S) -> Self;
}

impl<T> ErrorConversion for Result<T> {
    fn with_trace_step<S: ToString>(self, s: S) -> Self {
        self.map_err(|e| e.with_trace_step(s.to_string()))
    }
}

#[test]
fn test_trace_order() {
    let res: Result = Err(Error::from(ErrorType::InvalidShrink));
    let err = res
        .with_trace_step("shrink_tail")
        .with_trace_step("tick")
        .unwrap_err();

    let text = err.to_string();
    let inner = text.find("in shrink_tail").unwrap();
    let outer = text.find("in tick").unwrap();
    assert!(outer < inner, "outermost step should be printed first:\n{}", text);
    assert!(matches!(err.error_type(), ErrorType::InvalidShrink));
    assert!(!err.is_grid_full());
}
