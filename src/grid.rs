use crate::error::{ExplorerError, ExplorerResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Maximum distance (in grid units) between the pointer and a street for the
/// street to be picked up by `street_at`
pub const STREET_SNAP_DISTANCE: f64 = 0.3;

/// An intersection on the street grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        GridCell { x, y }
    }

    /// Taxicab distance between two cells
    pub fn manhattan(&self, other: &GridCell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Straight-line distance between two cells
    pub fn euclidean(&self, other: &GridCell) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_adjacent(&self, other: &GridCell) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A street: the unordered connection between two adjacent cells.
///
/// The endpoints are stored in canonical order (lower coordinate first), so
/// `Edge::new(a, b) == Edge::new(b, a)` and the derived `Hash`/`Eq` are the
/// identity used by `BlockedSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    a: GridCell,
    b: GridCell,
}

impl Edge {
    /// Build the canonical street between two cells.
    /// Fails with `InvalidEdge` when the cells are not adjacent.
    pub fn new(a: GridCell, b: GridCell) -> ExplorerResult<Self> {
        if !a.is_adjacent(&b) {
            return Err(ExplorerError::InvalidEdge { a, b });
        }
        if a <= b {
            Ok(Edge { a, b })
        } else {
            Ok(Edge { a: b, b: a })
        }
    }

    /// Lower endpoint
    pub fn a(&self) -> GridCell {
        self.a
    }

    /// Higher endpoint
    pub fn b(&self) -> GridCell {
        self.b
    }

    pub fn is_vertical(&self) -> bool {
        self.a.x == self.b.x
    }

    /// Whether both endpoints lie inside a grid of the given size
    pub fn fits(&self, size: i32) -> bool {
        in_bounds(self.a, size) && in_bounds(self.b, size)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}-{},{}", self.a.x, self.a.y, self.b.x, self.b.y)
    }
}

impl FromStr for Edge {
    type Err = ExplorerError;

    /// Parse the `"x1,y1-x2,y2"` text form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (left, right) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| ExplorerError::Parse(format!("street '{}' is missing '-'", s)))?;
        let a = parse_cell(left)?;
        let b = parse_cell(right)?;
        Edge::new(a, b)
    }
}

fn parse_cell(s: &str) -> ExplorerResult<GridCell> {
    let (x, y) = s
        .trim()
        .split_once(',')
        .ok_or_else(|| ExplorerError::Parse(format!("cell '{}' is missing ','", s)))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|e| ExplorerError::Parse(format!("cell '{}': {}", s, e)))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|e| ExplorerError::Parse(format!("cell '{}': {}", s, e)))?;
    Ok(GridCell::new(x, y))
}

/// Check if a cell lies inside a square grid of `size` cells per axis
pub fn in_bounds(cell: GridCell, size: i32) -> bool {
    cell.x >= 0 && cell.x < size && cell.y >= 0 && cell.y < size
}

/// Set of blocked streets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockedSet {
    edges: HashSet<Edge>,
}

impl BlockedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// Check if the street between two cells is blocked, in either direction.
    /// Non-adjacent cells have no street between them and count as blocked.
    pub fn is_blocked_between(&self, a: GridCell, b: GridCell) -> bool {
        match Edge::new(a, b) {
            Ok(edge) => self.edges.contains(&edge),
            Err(_) => true,
        }
    }

    /// Returns true if the street was newly blocked
    pub fn insert(&mut self, edge: Edge) -> bool {
        self.edges.insert(edge)
    }

    /// Flip the street's membership. Returns the new blocked state.
    pub fn toggle(&mut self, edge: Edge) -> bool {
        if self.edges.remove(&edge) {
            false
        } else {
            self.edges.insert(edge);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Blocked streets in canonical order, for stable output
    pub fn sorted(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self.edges.iter().copied().collect();
        edges.sort();
        edges
    }
}

impl FromIterator<Edge> for BlockedSet {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        BlockedSet {
            edges: iter.into_iter().collect(),
        }
    }
}

/// Which of the two endpoints is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    Start,
    End,
}

/// Street grid state: size, the two endpoints and the blocked streets
#[derive(Debug, Clone)]
pub struct GridState {
    pub size: i32,
    pub start: GridCell,
    pub end: GridCell,
    pub blocked: BlockedSet,
    /// Revision number - incremented whenever points or streets change
    pub revision: u64,
}

impl GridState {
    /// Create a grid with no blocked streets. Points are clamped into the grid.
    pub fn new(size: i32, start: GridCell, end: GridCell) -> Self {
        let size = size.max(1);
        GridState {
            size,
            start: clamp_cell(start, size),
            end: clamp_cell(end, size),
            blocked: BlockedSet::new(),
            revision: 0,
        }
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        in_bounds(cell, self.size)
    }

    pub fn point(&self, which: PointKind) -> GridCell {
        match which {
            PointKind::Start => self.start,
            PointKind::End => self.end,
        }
    }

    /// Which endpoint (if any) sits on the given cell
    pub fn point_at(&self, cell: GridCell) -> Option<PointKind> {
        if cell == self.start {
            Some(PointKind::Start)
        } else if cell == self.end {
            Some(PointKind::End)
        } else {
            None
        }
    }

    /// Drag an endpoint to (x, y), clamped into the grid.
    /// The two points never overlap: a move onto the other point is refused.
    /// Returns true if the point actually moved.
    pub fn move_point(&mut self, which: PointKind, x: i32, y: i32) -> bool {
        let target = clamp_cell(GridCell::new(x, y), self.size);
        let (current, other) = match which {
            PointKind::Start => (self.start, self.end),
            PointKind::End => (self.end, self.start),
        };

        if target == other || target == current {
            return false;
        }

        match which {
            PointKind::Start => self.start = target,
            PointKind::End => self.end = target,
        }
        self.revision += 1;
        true
    }

    /// Flip a street between open and blocked. Streets outside the grid are
    /// ignored. Returns the street's blocked state after the call.
    pub fn toggle_street(&mut self, edge: Edge) -> bool {
        if !edge.fits(self.size) {
            return false;
        }
        let blocked = self.blocked.toggle(edge);
        self.revision += 1;
        blocked
    }

    pub fn block_street(&mut self, edge: Edge) {
        if edge.fits(self.size) && self.blocked.insert(edge) {
            self.revision += 1;
        }
    }

    pub fn clear_blocked(&mut self) {
        if !self.blocked.is_empty() {
            self.blocked.clear();
            self.revision += 1;
        }
    }

    /// Get current grid revision number
    pub fn get_revision(&self) -> u64 {
        self.revision
    }
}

fn clamp_cell(cell: GridCell, size: i32) -> GridCell {
    GridCell::new(cell.x.clamp(0, size - 1), cell.y.clamp(0, size - 1))
}

/// Find the street closest to a pointer position given in grid units.
///
/// Intersections sit on integer coordinates. Returns `None` when the pointer
/// is farther than `STREET_SNAP_DISTANCE` from every street or the street
/// would leave the grid.
pub fn street_at(fx: f64, fy: f64, size: i32) -> Option<Edge> {
    if !fx.is_finite() || !fy.is_finite() {
        return None;
    }
    // far off the grid; also keeps the integer casts below in range
    let limit = size as f64;
    if fx < -1.0 || fy < -1.0 || fx > limit || fy > limit {
        return None;
    }

    let rx = fx.round();
    let ry = fy.round();
    let dist_to_row = (fy - ry).abs();
    let dist_to_col = (fx - rx).abs();

    let edge = if dist_to_row <= dist_to_col {
        if dist_to_row > STREET_SNAP_DISTANCE {
            return None;
        }
        // horizontal street along row ry
        let x0 = fx.floor() as i32;
        let y = ry as i32;
        Edge::new(GridCell::new(x0, y), GridCell::new(x0 + 1, y)).ok()?
    } else {
        if dist_to_col > STREET_SNAP_DISTANCE {
            return None;
        }
        // vertical street along column rx
        let x = rx as i32;
        let y0 = fy.floor() as i32;
        Edge::new(GridCell::new(x, y0), GridCell::new(x, y0 + 1)).ok()?
    };

    if edge.fits(size) {
        Some(edge)
    } else {
        None
    }
}
