use rand::Rng;

use crate::basic::{Dim, Point};
use crate::error::{Error, ErrorType, Result};
use crate::grid::{CellState, Grid};

fn random_location(dim: Dim, rng: &mut impl Rng) -> Point {
    Point::new(rng.gen_range(0..dim.columns), rng.gen_range(0..dim.rows))
}

/// Uniformly chooses one of the empty cells, `None` if there aren't any
pub fn random_free_spot<const C: usize, const G: usize>(
    grid: &Grid<C, G>,
    rng: &mut impl Rng,
) -> Option<Point> {
    let free_spaces = grid.count(CellState::Empty);
    if free_spaces == 0 {
        return None;
    }

    let new_idx = rng.gen_range(0..free_spaces);
    grid.cells()
        .filter(|(_, state)| *state == CellState::Empty)
        .nth(new_idx)
        .map(|(point, _)| point)
}

/// Picks a random empty cell for the next food. The grid is not
/// modified, marking the cell is up to the caller.
///
/// Random locations are tried `attempts` times, after that the free
/// cells are enumerated, which only fails if the grid is full.
pub fn place<const C: usize, const G: usize>(
    grid: &Grid<C, G>,
    rng: &mut impl Rng,
    attempts: usize,
) -> Result<Point> {
    let dim = grid.dim();

    for _ in 0..attempts {
        let candidate = random_location(dim, rng);
        if grid.get(candidate) == CellState::Empty {
            return Ok(candidate);
        }
    }

    log::warn!("no free cell found after {} random attempts, scanning", attempts);
    random_free_spot(grid, rng).ok_or_else(|| Error::from(ErrorType::GridFull { cells: dim.cells() }))
}

#[cfg(test)]
use rand::{rngs::SmallRng, SeedableRng};

#[test]
fn test_food_is_placed_on_empty_cells() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut grid = Grid::<8, 2>::new();
    for x in 0..8 {
        grid.set(Point::new(x, 4), CellState::Wall);
    }
    grid.set(Point::new(0, 0), CellState::Special);

    for _ in 0..200 {
        let food = place(&grid, &mut rng, 256).unwrap();
        assert_eq!(grid.get(food), CellState::Empty, "{:?}", food);
    }
}

#[test]
fn test_single_free_cell_is_found() {
    let hole = Point::new(5, 2);
    for attempts in [0, 1, 256] {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut grid = Grid::<8, 2>::new();
        for (x, y) in itertools::iproduct!(0..8, 0..8) {
            grid.set(Point::new(x, y), CellState::Wall);
        }
        grid.set(hole, CellState::Empty);

        assert_eq!(place(&grid, &mut rng, attempts).unwrap(), hole);
    }
}

#[test]
fn test_full_grid() {
    let mut rng = SmallRng::seed_from_u64(0);
    let mut grid = Grid::<4, 1>::new();
    for (x, y) in itertools::iproduct!(0..4, 0..4) {
        grid.set(Point::new(x, y), CellState::Wall);
    }

    let err = place(&grid, &mut rng, 50).unwrap_err();
    assert!(err.is_grid_full());
    assert!(matches!(err.error_type(), ErrorType::GridFull { cells: 16 }));
    assert_eq!(random_free_spot(&grid, &mut rng), None);
}

#[test]
fn test_random_free_spot_is_uniform_enough() {
    let mut rng = SmallRng::seed_from_u64(5);
    let mut grid = Grid::<4, 1>::new();
    for x in 0..4 {
        grid.set(Point::new(x, 0), CellState::Wall);
    }

    let mut hits = std::collections::HashMap::new();
    for _ in 0..1200 {
        let spot = random_free_spot(&grid, &mut rng).unwrap();
        assert_ne!(spot.y, 0);
        *hits.entry(spot).or_insert(0) += 1;
    }
    assert_eq!(hits.len(), 12);
}
