//! Exhaustive enumeration of every legal state key for a grid size
//!
//! Cost grows combinatorially with grid area (it walks every self-avoiding
//! path on the grid), so this is only practical for single-digit grids and
//! must run once up front, never inside the step loop.
//!
//! Steps:
//! 1. every connected, self-avoiding placement of `L` cells, deduplicated by
//!    cell set,
//! 2. every (head, heading) pair admitted by a Hamiltonian path through that
//!    cell set,
//! 3. every food cell outside the set.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use super::encoder::StateKey;
use crate::game::{Direction, Position};

/// Grids above this side length take minutes to hours to enumerate
const LARGE_GRID: usize = 4;

/// In-bounds neighbours of a cell, in up/down/left/right order
pub fn neighbors(cell: Position, grid_size: usize) -> impl Iterator<Item = Position> {
    Direction::ALL
        .into_iter()
        .map(move |direction| cell.moved_in_direction(direction))
        .filter(move |pos| pos.is_within(grid_size))
}

/// All cells of the grid in row-major order
fn all_cells(grid_size: usize) -> Vec<Position> {
    let size = grid_size as i32;
    (0..size)
        .flat_map(|row| (0..size).map(move |col| Position::new(row, col)))
        .collect()
}

fn cell_index(cell: Position, grid_size: usize) -> usize {
    cell.row as usize * grid_size + cell.col as usize
}

/// Every distinct cell set covered by a self-avoiding path of `length` cells.
///
/// Each set is returned sorted row-major; the outer list is sorted too.
pub fn connected_placements(length: usize, grid_size: usize) -> Vec<Vec<Position>> {
    if length == 0 || length > grid_size * grid_size {
        return Vec::new();
    }

    let mut placements = BTreeSet::new();
    let mut visited = vec![false; grid_size * grid_size];
    let mut path = Vec::with_capacity(length);

    for start in all_cells(grid_size) {
        visited[cell_index(start, grid_size)] = true;
        path.push(start);
        extend_path(&mut path, &mut visited, length, grid_size, &mut placements);
        path.pop();
        visited[cell_index(start, grid_size)] = false;
    }

    placements.into_iter().collect()
}

fn extend_path(
    path: &mut Vec<Position>,
    visited: &mut [bool],
    length: usize,
    grid_size: usize,
    placements: &mut BTreeSet<Vec<Position>>,
) {
    if path.len() == length {
        let mut shape = path.clone();
        shape.sort_unstable();
        placements.insert(shape);
        return;
    }

    let tail = path[path.len() - 1];
    for next in neighbors(tail, grid_size) {
        let idx = cell_index(next, grid_size);
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        path.push(next);
        extend_path(path, visited, length, grid_size, placements);
        path.pop();
        visited[idx] = false;
    }
}

/// Every (head, heading) pair a snake covering `shape` can have.
///
/// A single cell may face any direction. Longer shapes contribute one pair
/// per Hamiltonian path through the cells, with the heading taken from the
/// path's neck to its head (the same convention as
/// [`current_direction`](super::encoder::current_direction)).
pub fn head_direction_pairs(shape: &[Position], grid_size: usize) -> BTreeSet<(Position, Direction)> {
    let mut pairs = BTreeSet::new();

    if let [only] = shape {
        for direction in Direction::ALL {
            pairs.insert((*only, direction));
        }
        return pairs;
    }

    let cells: BTreeSet<Position> = shape.iter().copied().collect();
    let mut visited = vec![false; grid_size * grid_size];
    let mut path = Vec::with_capacity(cells.len());

    for &start in &cells {
        visited[cell_index(start, grid_size)] = true;
        path.push(start);
        trace_hamiltonian(&mut path, &mut visited, &cells, grid_size, &mut pairs);
        path.pop();
        visited[cell_index(start, grid_size)] = false;
    }

    pairs
}

fn trace_hamiltonian(
    path: &mut Vec<Position>,
    visited: &mut [bool],
    cells: &BTreeSet<Position>,
    grid_size: usize,
    pairs: &mut BTreeSet<(Position, Direction)>,
) {
    if path.len() == cells.len() {
        let (head, neck) = (path[0], path[1]);
        pairs.insert((head, Direction::from_delta(head.row - neck.row, head.col - neck.col)));
        return;
    }

    let tail = path[path.len() - 1];
    for next in neighbors(tail, grid_size) {
        let idx = cell_index(next, grid_size);
        if visited[idx] || !cells.contains(&next) {
            continue;
        }
        visited[idx] = true;
        path.push(next);
        trace_hamiltonian(path, visited, cells, grid_size, pairs);
        path.pop();
        visited[idx] = false;
    }
}

/// Every valid state key for the grid, for snake lengths 1 through
/// `grid_size²`.
pub fn enumerate_states(grid_size: usize) -> Vec<StateKey> {
    if grid_size > LARGE_GRID {
        warn!(
            grid_size,
            "enumerating the full state space of a large grid; this grows combinatorially"
        );
    }

    let cells = all_cells(grid_size);
    let mut states = Vec::new();

    for length in 1..=grid_size * grid_size {
        let placements = connected_placements(length, grid_size);
        let before = states.len();

        for shape in &placements {
            for (head, direction) in head_direction_pairs(shape, grid_size) {
                for &food in &cells {
                    // `shape` is sorted, so binary search doubles as a set lookup
                    if shape.binary_search(&food).is_err() {
                        states.push(StateKey {
                            head,
                            direction,
                            body: shape.clone(),
                            food,
                        });
                    }
                }
            }
        }

        debug!(
            length,
            shapes = placements.len(),
            states = states.len() - before,
            "enumerated snake length"
        );
    }

    states
}

/// Number of states per snake length
pub fn count_states_by_length<'a, I>(states: I) -> BTreeMap<usize, usize>
where
    I: IntoIterator<Item = &'a StateKey>,
{
    let mut counts = BTreeMap::new();
    for state in states {
        *counts.entry(state.snake_len()).or_insert(0) += 1;
    }
    counts
}
