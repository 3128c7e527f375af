use crate::error::{ExplorerError, ExplorerResult};
use crate::grid::{in_bounds, BlockedSet, GridCell};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::{debug, trace};

/// The four street directions out of an intersection: down, up, right, left
const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// A frontier entry in the A* search
#[derive(Debug, Clone, Copy)]
struct PathNode {
    cell: GridCell,
    /// Steps taken from the start
    cost: i32,
    /// Manhattan distance left to the end
    heuristic: i32,
}

impl PathNode {
    fn estimate(&self) -> i32 {
        self.cost + self.heuristic
    }
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathNode {}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .estimate()
            .cmp(&self.estimate())
            .then_with(|| other.heuristic.cmp(&self.heuristic))
            // Tie-breaker: use position for deterministic ordering
            .then_with(|| other.cell.x.cmp(&self.cell.x))
            .then_with(|| other.cell.y.cmp(&self.cell.y))
            .then_with(|| other.cost.cmp(&self.cost))
    }
}

/// Open neighbours of a cell: inside the grid and not behind a blocked street
pub fn open_neighbors(cell: GridCell, size: i32, blocked: &BlockedSet) -> Vec<GridCell> {
    DIRECTIONS
        .iter()
        .map(|&(dx, dy)| GridCell::new(cell.x + dx, cell.y + dy))
        .filter(|next| in_bounds(*next, size))
        .filter(|next| !blocked.is_blocked_between(cell, *next))
        .collect()
}

/// Find a shortest street path from `start` to `end` on a `size` x `size`
/// grid, never crossing a blocked street.
///
/// Returns `PathNotFound` when the two points are disconnected (or either lies
/// outside the grid). For fixed inputs the same path is returned every time.
pub fn find_path(
    start: GridCell,
    end: GridCell,
    size: i32,
    blocked: &BlockedSet,
) -> ExplorerResult<Vec<GridCell>> {
    if !in_bounds(start, size) || !in_bounds(end, size) {
        debug!(%start, %end, size, "endpoint outside the grid");
        return Err(ExplorerError::PathNotFound { start, end });
    }

    if start == end {
        return Ok(vec![start]);
    }

    trace!(%start, %end, size, blocked = blocked.len(), "starting A* search");

    let mut queue: BinaryHeap<PathNode> = BinaryHeap::new();
    let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();
    let mut best_cost: HashMap<GridCell, i32> = HashMap::new();
    let mut closed: HashSet<GridCell> = HashSet::new();

    best_cost.insert(start, 0);
    queue.push(PathNode {
        cell: start,
        cost: 0,
        heuristic: start.manhattan(&end),
    });

    let mut iterations = 0;
    while let Some(node) = queue.pop() {
        iterations += 1;

        if node.cell == end {
            let path = reconstruct_path(&came_from, start, end);
            debug!(
                %start,
                %end,
                steps = path.len() - 1,
                iterations,
                "found street path"
            );
            return Ok(path);
        }

        // Stale entry, a cheaper route to this cell was already expanded
        if !closed.insert(node.cell) {
            continue;
        }

        trace!(cell = %node.cell, cost = node.cost, estimate = node.estimate(), "expanding");

        for next in open_neighbors(node.cell, size, blocked) {
            if closed.contains(&next) {
                continue;
            }
            let cost = node.cost + 1;
            let better = match best_cost.get(&next) {
                Some(&known) => cost < known,
                None => true,
            };
            if better {
                best_cost.insert(next, cost);
                came_from.insert(next, node.cell);
                queue.push(PathNode {
                    cell: next,
                    cost,
                    heuristic: next.manhattan(&end),
                });
            }
        }
    }

    debug!(%start, %end, iterations, blocked = blocked.len(), "no street path found");
    Err(ExplorerError::PathNotFound { start, end })
}

fn reconstruct_path(
    came_from: &HashMap<GridCell, GridCell>,
    start: GridCell,
    end: GridCell,
) -> Vec<GridCell> {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Number of streets travelled along a path
pub fn path_length(path: &[GridCell]) -> usize {
    path.len().saturating_sub(1)
}

/// Format path for display
pub fn format_path(path: &[GridCell]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    let mut result = String::new();
    for (i, cell) in path.iter().enumerate() {
        if i > 0 {
            result.push_str(" -> ");
        }
        result.push_str(&cell.to_string());
    }
    result
}
