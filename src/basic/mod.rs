pub use dir::Dir;
pub use point::{Dim, Point};

mod dir;
mod point;
