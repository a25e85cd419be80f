//! Translation of the grid to the page-organised dot-matrix display
//!
//! The display is addressed by page (8 pixel rows sent as one byte, bit 0
//! on top) and column. A cell is a `CELL_WIDTH` × `CELL_WIDTH` pixel block,
//! so two vertically adjacent cells share every page byte: the upper one
//! goes in the low nibble. Which cells share a page is derived from the
//! grid's packed [`Address`], never recomputed from raw coordinates.

use itertools::Itertools;
use static_assertions::{const_assert, const_assert_eq};

use crate::basic::Point;
use crate::grid::{Address, CellState, Grid, BITS_PER_CELL, GROUP_SIZE};

pub const DISPLAY_WIDTH: usize = 102;
pub const DISPLAY_HEIGHT: usize = 64;
pub const PIXELS_PER_PAGE: usize = 8;
pub const PAGES: usize = DISPLAY_HEIGHT / PIXELS_PER_PAGE;

/// Side of a cell in pixels
pub const CELL_WIDTH: usize = 4;
pub const CELLS_PER_PAGE: usize = PIXELS_PER_PAGE / CELL_WIDTH;

pub const COLUMNS: usize = DISPLAY_WIDTH / CELL_WIDTH;
pub const ROWS: usize = DISPLAY_HEIGHT / CELL_WIDTH;
pub const GROUPS: usize = ROWS / GROUP_SIZE;

const_assert_eq!(DISPLAY_HEIGHT % PIXELS_PER_PAGE, 0);
const_assert_eq!(PIXELS_PER_PAGE % CELL_WIDTH, 0);
const_assert_eq!(GROUP_SIZE % CELLS_PER_PAGE, 0);
const_assert_eq!(ROWS % GROUP_SIZE, 0);
const_assert!(COLUMNS * CELL_WIDTH <= DISPLAY_WIDTH);

/// The playfield that fills the console's display
pub type ConsoleGrid = Grid<COLUMNS, GROUPS>;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DisplayAddress {
    pub page: usize,
    pub column: usize,
}

impl DisplayAddress {
    /// Top-left pixel block of the cell stored at `address`
    pub fn of(address: Address) -> Self {
        Self {
            page: address.group * (GROUP_SIZE / CELLS_PER_PAGE) + address.slot() / CELLS_PER_PAGE,
            column: address.column * CELL_WIDTH,
        }
    }
}

/// Whatever shows the game, the device driver lives behind this
pub trait DisplaySurface {
    /// `columns[i]` is the page byte for column `address.column + i`
    fn write_block(&mut self, address: DisplayAddress, columns: &[u8]);
    fn clear(&mut self);

    /// Current length, called every tick
    fn show_length(&mut self, _length: usize) {}
    fn show_game_over(&mut self, _final_length: usize) {}
}

/// Column nibbles of a single cell, bit 0 is the top row
fn pattern(state: CellState) -> [u8; CELL_WIDTH] {
    match state {
        CellState::Empty => [0b0000; CELL_WIDTH],
        CellState::Wall => [0b1111; CELL_WIDTH],
        CellState::Food => [0b0110, 0b1111, 0b1111, 0b0110],
        CellState::Special => [0b1001, 0b0110, 0b0110, 0b1001],
    }
}

/// The pixel block holding `point`, which also covers the other cell
/// sharing its page
pub fn render_block<const C: usize, const G: usize>(
    grid: &Grid<C, G>,
    point: Point,
) -> (DisplayAddress, [u8; CELL_WIDTH]) {
    let address = Address::of(point, grid.dim());
    let byte = grid.group_byte(address);
    let first_slot = address.slot() / CELLS_PER_PAGE * CELLS_PER_PAGE;

    let mut block = [0; CELL_WIDTH];
    for i in 0..CELLS_PER_PAGE {
        let state = CellState::from_bits(byte >> ((first_slot + i) * BITS_PER_CELL));
        for (column, nibble) in block.iter_mut().zip(pattern(state)) {
            *column |= nibble << (i * CELL_WIDTH);
        }
    }

    (DisplayAddress::of(address), block)
}

pub fn redraw<const C: usize, const G: usize>(
    display: &mut impl DisplaySurface,
    grid: &Grid<C, G>,
    point: Point,
) {
    let (address, block) = render_block(grid, point);
    display.write_block(address, &block);
}

pub fn redraw_all<const C: usize, const G: usize>(display: &mut impl DisplaySurface, grid: &Grid<C, G>) {
    let dim = grid.dim();
    for x in 0..dim.columns {
        for y in (0..dim.rows).step_by(CELLS_PER_PAGE) {
            redraw(display, grid, Point::new(x, y));
        }
    }
}

/// Duplicates both bits of a pair, `0bAB -> 0bAABB`
fn interleave2(pair: u8) -> u8 {
    let x = pair & 0b11;
    let x = (x | (x << 1)) & 0b0101;
    x | (x << 1)
}

/// Duplicates every bit of a nibble, `0bABCD -> 0bAABBCCDD`
pub fn interleave4(nibble: u8) -> u8 {
    interleave2(nibble) | (interleave2(nibble >> 2) << 4)
}

/// One bit per cell of a group byte, set for anything that isn't empty
pub fn occupancy(group_byte: u8) -> u8 {
    (0..GROUP_SIZE)
        .filter(|slot| CellState::from_bits(group_byte >> (slot * BITS_PER_CELL)) != CellState::Empty)
        .fold(0, |acc, slot| acc | (1 << slot))
}

/// Left edge that centers the minimap of a `columns` wide grid
pub fn minimap_origin(columns: usize) -> usize {
    DISPLAY_WIDTH.saturating_sub(2 * columns) / 2
}

/// The whole grid at two pixels per cell, with its left edge at
/// `origin_column`
pub fn draw_minimap<const C: usize, const G: usize>(
    display: &mut impl DisplaySurface,
    grid: &Grid<C, G>,
    origin_column: usize,
) {
    // one group (4 cells) fills exactly one page at 2 pixels per cell
    for group in 0..G {
        for column in 0..C {
            let address = Address { column, group, bit: 0 };
            let page_byte = interleave4(occupancy(grid.group_byte(address)));
            display.write_block(
                DisplayAddress { page: group, column: origin_column + 2 * column },
                &[page_byte, page_byte],
            );
        }
    }
}

/// In-memory copy of the display's RAM
#[derive(Clone)]
pub struct PageBuffer {
    pages: [[u8; DISPLAY_WIDTH]; PAGES],
    length: Option<usize>,
    final_length: Option<usize>,
}

impl Default for PageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageBuffer {
    pub fn new() -> Self {
        Self {
            pages: [[0; DISPLAY_WIDTH]; PAGES],
            length: None,
            final_length: None,
        }
    }

    pub fn page_byte(&self, page: usize, column: usize) -> u8 {
        self.pages[page][column]
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pages[y / PIXELS_PER_PAGE][x] & (1 << (y % PIXELS_PER_PAGE)) != 0
    }

    pub fn is_blank(&self) -> bool {
        self.pages.iter().flatten().all(|byte| *byte == 0)
    }

    pub fn length(&self) -> Option<usize> {
        self.length
    }

    pub fn final_length(&self) -> Option<usize> {
        self.final_length
    }

    pub fn to_ascii(&self) -> String {
        (0..DISPLAY_HEIGHT)
            .map(|y| {
                (0..DISPLAY_WIDTH)
                    .map(|x| if self.pixel(x, y) { '#' } else { '.' })
                    .collect::<String>()
            })
            .join("\n")
    }
}

impl DisplaySurface for PageBuffer {
    fn write_block(&mut self, address: DisplayAddress, columns: &[u8]) {
        if address.page >= PAGES {
            return;
        }
        let page = &mut self.pages[address.page];
        for (i, byte) in columns.iter().enumerate() {
            if let Some(target) = page.get_mut(address.column + i) {
                *target = *byte;
            }
        }
    }

    fn clear(&mut self) {
        self.pages = [[0; DISPLAY_WIDTH]; PAGES];
        self.final_length = None;
    }

    fn show_length(&mut self, length: usize) {
        self.length = Some(length);
    }

    fn show_game_over(&mut self, final_length: usize) {
        self.final_length = Some(final_length);
    }
}

#[test]
fn test_console_geometry() {
    assert_eq!((COLUMNS, ROWS, GROUPS), (25, 16, 4));
    assert_eq!(ConsoleGrid::DIM.columns, 25);
    assert_eq!(ConsoleGrid::DIM.rows, 16);
}

#[test]
fn test_display_address() {
    let dim = ConsoleGrid::DIM;

    #[rustfmt::skip]
    let cases = [
        ((0, 0),   (0, 0)),
        ((0, 1),   (0, 0)),
        ((0, 2),   (1, 0)),
        ((3, 3),   (1, 12)),
        ((3, 4),   (2, 12)),
        ((24, 15), (7, 96)),
    ];

    for &((x, y), (page, column)) in &cases {
        let address = DisplayAddress::of(Address::of(Point::new(x, y), dim));
        assert_eq!(address, DisplayAddress { page, column }, "<{}, {}>", x, y);
        // same as deriving it from pixel coordinates
        assert_eq!(page, CELL_WIDTH * y as usize / PIXELS_PER_PAGE);
        assert_eq!(column, CELL_WIDTH * x as usize);
    }
}

#[test]
fn test_render_block_combines_page_neighbors() {
    let mut grid = ConsoleGrid::new();
    let upper = Point::new(2, 6);
    let lower = Point::new(2, 7);

    let (_, block) = render_block(&grid, upper);
    assert_eq!(block, [0; CELL_WIDTH]);

    grid.set(upper, CellState::Wall);
    let (address, block) = render_block(&grid, upper);
    assert_eq!(address, DisplayAddress { page: 3, column: 8 });
    assert_eq!(block, [0x0F; CELL_WIDTH]);

    grid.set(lower, CellState::Wall);
    assert_eq!(render_block(&grid, lower), (address, [0xFF; CELL_WIDTH]));

    grid.set(upper, CellState::Empty);
    grid.set(lower, CellState::Food);
    assert_eq!(render_block(&grid, upper).1, [0x60, 0xF0, 0xF0, 0x60]);
}

#[test]
fn test_redraw_all_matches_grid() {
    let mut grid = ConsoleGrid::new();
    let walls = [Point::new(0, 0), Point::new(24, 15), Point::new(10, 5), Point::new(10, 6)];
    for wall in walls {
        grid.set(wall, CellState::Wall);
    }

    let mut display = PageBuffer::new();
    redraw_all(&mut display, &grid);

    for (point, state) in grid.cells() {
        for dx in 0..CELL_WIDTH {
            for dy in 0..CELL_WIDTH {
                let x = point.x as usize * CELL_WIDTH + dx;
                let y = point.y as usize * CELL_WIDTH + dy;
                assert_eq!(display.pixel(x, y), state == CellState::Wall, "{:?} ({}, {})", point, x, y);
            }
        }
    }

    let ascii = display.to_ascii();
    assert_eq!(ascii.lines().count(), DISPLAY_HEIGHT);
    assert!(ascii.lines().next().unwrap().starts_with("####."));
}

#[test]
fn test_interleave2() {
    assert_eq!(interleave2(0b00), 0b0000);
    assert_eq!(interleave2(0b01), 0b0011);
    assert_eq!(interleave2(0b10), 0b1100);
    assert_eq!(interleave2(0b111), 0b1111);
    // agrees with the nibble version on the low half
    for pair in 0..4 {
        assert_eq!(interleave2(pair), interleave4(pair) & 0x0F);
    }
}

#[test]
fn test_interleave4() {
    assert_eq!(interleave4(0b0000), 0b0000_0000);
    assert_eq!(interleave4(0b0001), 0b0000_0011);
    assert_eq!(interleave4(0b1010), 0b1100_1100);
    assert_eq!(interleave4(0b1111), 0b1111_1111);
    // high bits are ignored
    assert_eq!(interleave4(0xF1), 0b0000_0011);
}

#[test]
fn test_minimap() {
    let mut grid = Grid::<8, 2>::new();
    grid.set(Point::new(1, 2), CellState::Wall);
    grid.set(Point::new(1, 5), CellState::Food);
    assert_eq!(occupancy(grid.group_byte(Address::of(Point::new(1, 2), grid.dim()))), 0b0100);

    let mut display = PageBuffer::new();
    draw_minimap(&mut display, &grid, 50);
    assert_eq!(display.page_byte(0, 52), 0b0011_0000);
    assert_eq!(display.page_byte(0, 53), 0b0011_0000);
    assert_eq!(display.page_byte(1, 52), 0b0000_1100);
    assert_eq!(display.page_byte(0, 50), 0);

    assert_eq!(minimap_origin(8), 43);
    assert_eq!(minimap_origin(COLUMNS), 26);
}

#[test]
fn test_out_of_range_writes_are_dropped() {
    let mut display = PageBuffer::new();
    display.write_block(DisplayAddress { page: PAGES, column: 0 }, &[0xFF]);
    display.write_block(DisplayAddress { page: 0, column: DISPLAY_WIDTH - 1 }, &[0xFF, 0xFF]);
    assert_eq!(display.page_byte(0, DISPLAY_WIDTH - 1), 0xFF);
    display.clear();
    assert!(display.is_blank());
}
