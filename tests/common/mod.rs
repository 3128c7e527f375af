#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};
use taxicab_explorer::pathfinding::open_neighbors;
use taxicab_explorer::report::render_ascii;
use taxicab_explorer::{BlockedSet, Edge, GridCell, GridState};

pub const EPSILON: f64 = 1e-9;

pub fn cell(x: i32, y: i32) -> GridCell {
    GridCell::new(x, y)
}

pub fn edge(a: (i32, i32), b: (i32, i32)) -> Edge {
    Edge::new(cell(a.0, a.1), cell(b.0, b.1)).expect("test edge must join adjacent cells")
}

/// Every street touching a cell that stays inside the grid
pub fn streets_around(center: GridCell, size: i32) -> Vec<Edge> {
    [(0, 1), (0, -1), (1, 0), (-1, 0)]
        .iter()
        .map(|&(dx, dy)| cell(center.x + dx, center.y + dy))
        .filter(|n| n.x >= 0 && n.x < size && n.y >= 0 && n.y < size)
        .map(|n| Edge::new(center, n).unwrap())
        .collect()
}

/// Brute-force breadth-first search: true shortest path length in streets
pub fn bfs_distance(start: GridCell, end: GridCell, size: i32, blocked: &BlockedSet) -> Option<usize> {
    let mut dist: HashMap<GridCell, usize> = HashMap::new();
    let mut queue = VecDeque::new();
    dist.insert(start, 0);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let d = dist[&current];
        if current == end {
            return Some(d);
        }
        for next in open_neighbors(current, size, blocked) {
            if !dist.contains_key(&next) {
                dist.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }
    None
}

/// Check the structural rules every returned path must satisfy.
/// Returns a description of the first violation.
pub fn check_path(
    path: &[GridCell],
    start: GridCell,
    end: GridCell,
    blocked: &BlockedSet,
) -> Result<(), String> {
    if path.first() != Some(&start) {
        return Err(format!("path starts at {:?}, expected {}", path.first(), start));
    }
    if path.last() != Some(&end) {
        return Err(format!("path ends at {:?}, expected {}", path.last(), end));
    }
    for pair in path.windows(2) {
        let dx = (pair[1].x - pair[0].x).abs();
        let dy = (pair[1].y - pair[0].y).abs();
        if dx + dy != 1 {
            return Err(format!("{} -> {} is not a single street", pair[0], pair[1]));
        }
        let street = Edge::new(pair[0], pair[1]).unwrap();
        if blocked.contains(&street) {
            return Err(format!("path uses blocked street {}", street));
        }
    }
    Ok(())
}

/// Random blocked-street layout, reproducible from the seed
pub fn random_blocked(size: i32, density: f64, rng: &mut StdRng) -> BlockedSet {
    let mut blocked = BlockedSet::new();
    for y in 0..size {
        for x in 0..size {
            if x + 1 < size && rng.gen_bool(density) {
                blocked.insert(edge((x, y), (x + 1, y)));
            }
            if y + 1 < size && rng.gen_bool(density) {
                blocked.insert(edge((x, y), (x, y + 1)));
            }
        }
    }
    blocked
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Print a grid with its path, for failing test output
pub fn visualize(grid: &GridState, path: Option<&[GridCell]>) -> String {
    format!("\n{}", render_ascii(grid, path))
}

pub fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
    assert!(
        (actual.0 - expected.0).abs() < EPSILON && (actual.1 - expected.1).abs() < EPSILON,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}
