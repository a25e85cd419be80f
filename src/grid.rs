//! Packed occupancy map of the playfield
//!
//! Every cell takes [`BITS_PER_CELL`] bits, [`GROUP_SIZE`] vertically
//! adjacent cells of one column share a byte. [`Address::of`] is the only
//! place where a cell is mapped to its storage, the display translation
//! builds on it as well.

use itertools::iproduct;
use num_integer::Integer;
use static_assertions::const_assert_eq;

use crate::basic::{Dim, Point};

pub const BITS_PER_CELL: usize = 2;
/// Rows per byte
pub const GROUP_SIZE: usize = 4;
const CELL_MASK: u8 = 0b11;

const_assert_eq!(BITS_PER_CELL * GROUP_SIZE, u8::BITS as usize);
const_assert_eq!(CELL_MASK as usize, (1 << BITS_PER_CELL) - 1);

#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum CellState {
    Empty = 0b00,
    /// Anything solid, including the snake's body
    Wall = 0b01,
    Food = 0b10,
    /// Not produced by the current rules
    Special = 0b11,
}

impl CellState {
    /// Decodes the lowest two bits, the rest is ignored
    pub fn from_bits(bits: u8) -> Self {
        match bits & CELL_MASK {
            0b00 => Self::Empty,
            0b01 => Self::Wall,
            0b10 => Self::Food,
            _ => Self::Special,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Location of a cell inside the packed storage
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Address {
    pub column: usize,
    pub group: usize,
    /// Offset of the lowest bit of the cell within the group byte
    pub bit: u8,
}

impl Address {
    /// Coordinates are taken modulo the board size, so any `(x, y)`
    /// maps to the same address as `(x mod columns, y mod rows)`.
    /// `dim.rows` must be a multiple of [`GROUP_SIZE`].
    pub fn of(point: Point, dim: Dim) -> Self {
        let groups = dim.rows as usize / GROUP_SIZE;
        let (group, slot) = (point.y as usize).div_rem(&GROUP_SIZE);
        Self {
            column: point.x as usize % dim.columns as usize,
            group: group % groups,
            bit: (BITS_PER_CELL * slot) as u8,
        }
    }

    /// Position of the cell within its group, 0 is the topmost row
    pub fn slot(self) -> usize {
        self.bit as usize / BITS_PER_CELL
    }

    pub fn mask(self) -> u8 {
        CELL_MASK << self.bit
    }
}

/// A `COLUMNS` × `GROUPS * GROUP_SIZE` playfield, sizes are fixed at
/// compile time
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Grid<const COLUMNS: usize, const GROUPS: usize> {
    bytes: [[u8; GROUPS]; COLUMNS],
}

impl<const COLUMNS: usize, const GROUPS: usize> Default for Grid<COLUMNS, GROUPS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const COLUMNS: usize, const GROUPS: usize> Grid<COLUMNS, GROUPS> {
    pub const DIM: Dim = {
        assert!(COLUMNS >= 2 && COLUMNS <= u8::MAX as usize, "unsupported column count");
        assert!(GROUPS >= 1 && GROUPS * GROUP_SIZE <= u8::MAX as usize, "unsupported row count");
        Dim {
            columns: COLUMNS as u8,
            rows: (GROUPS * GROUP_SIZE) as u8,
        }
    };

    pub fn new() -> Self {
        Self {
            bytes: [[CellState::Empty.bits(); GROUPS]; COLUMNS],
        }
    }

    pub fn dim(&self) -> Dim {
        Self::DIM
    }

    pub fn get(&self, point: Point) -> CellState {
        let address = Address::of(point, Self::DIM);
        CellState::from_bits(self.group_byte(address) >> address.bit)
    }

    pub fn set(&mut self, point: Point, state: CellState) {
        let address = Address::of(point, Self::DIM);
        let byte = &mut self.bytes[address.column][address.group];
        *byte = (*byte & !address.mask()) | (state.bits() << address.bit);
    }

    /// The raw byte holding the whole group the address belongs to
    pub fn group_byte(&self, address: Address) -> u8 {
        self.bytes[address.column][address.group]
    }

    pub fn clear_all(&mut self) {
        for column in self.bytes.iter_mut() {
            column.fill(CellState::Empty.bits());
        }
    }

    /// All cells, column by column
    pub fn cells(&self) -> impl Iterator<Item = (Point, CellState)> + '_ {
        let Dim { columns, rows } = Self::DIM;
        iproduct!(0..columns, 0..rows).map(move |(x, y)| {
            let point = Point::new(x, y);
            (point, self.get(point))
        })
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells().filter(|(_, s)| *s == state).count()
    }
}

#[test]
fn test_address() {
    let dim = Dim { columns: 8, rows: 8 };

    #[rustfmt::skip]
    let cases = [
        ((0, 0),   (0, 0, 0)),
        ((0, 1),   (0, 0, 2)),
        ((0, 3),   (0, 0, 6)),
        ((0, 4),   (0, 1, 0)),
        ((5, 6),   (5, 1, 4)),
        ((7, 7),   (7, 1, 6)),
        // wrapped
        ((8, 0),   (0, 0, 0)),
        ((9, 10),  (1, 0, 4)),
        ((15, 15), (7, 1, 6)),
    ];

    for &((x, y), (column, group, bit)) in &cases {
        assert_eq!(
            Address::of(Point::new(x, y), dim),
            Address { column, group, bit },
            "<{}, {}>",
            x,
            y,
        );
    }
}

#[test]
fn test_addresses_are_unique() {
    let dim = Dim { columns: 5, rows: 12 };
    let mut seen = std::collections::HashSet::new();
    for x in 0..dim.columns {
        for y in 0..dim.rows {
            let address = Address::of(Point::new(x, y), dim);
            assert!(seen.insert(address), "duplicate address {:?}", address);
            assert_eq!(address.slot(), y as usize % GROUP_SIZE);
        }
    }
    assert_eq!(seen.len(), dim.cells());
}

#[test]
fn test_set_get_does_not_disturb_neighbors() {
    let mut grid = Grid::<8, 2>::new();
    let states = [CellState::Wall, CellState::Food, CellState::Special, CellState::Empty];

    // every cell of one group gets a different state
    for (y, state) in states.iter().enumerate() {
        grid.set(Point::new(3, y as u8), *state);
    }
    for (y, state) in states.iter().enumerate() {
        assert_eq!(grid.get(Point::new(3, y as u8)), *state);
    }

    // overwrite the middle ones
    grid.set(Point::new(3, 1), CellState::Empty);
    grid.set(Point::new(3, 2), CellState::Wall);
    assert_eq!(grid.get(Point::new(3, 0)), CellState::Wall);
    assert_eq!(grid.get(Point::new(3, 1)), CellState::Empty);
    assert_eq!(grid.get(Point::new(3, 2)), CellState::Wall);
    assert_eq!(grid.get(Point::new(3, 3)), CellState::Empty);

    // nothing leaked into other columns or groups
    assert_eq!(grid.count(CellState::Empty), 64 - 2);
    assert_eq!(grid.group_byte(Address::of(Point::new(3, 0), Grid::<8, 2>::DIM)), 0b00_01_00_01);
}

#[test]
fn test_wrapped_coordinates_hit_the_same_cell() {
    let mut grid = Grid::<8, 2>::new();
    grid.set(Point::new(10, 9), CellState::Food);
    assert_eq!(grid.get(Point::new(2, 1)), CellState::Food);
}

#[test]
fn test_clear_all() {
    let mut grid = Grid::<25, 4>::new();
    assert_eq!(grid.dim(), Dim { columns: 25, rows: 16 });
    for (x, y) in [(0, 0), (24, 15), (12, 7)] {
        grid.set(Point::new(x, y), CellState::Wall);
    }
    assert_eq!(grid.count(CellState::Wall), 3);
    grid.clear_all();
    assert_eq!(grid.count(CellState::Empty), 25 * 16);
    assert_eq!(grid, Grid::default());
}
