use crate::grid::{GridCell, GridState};
use crate::pathfinding::{find_path, path_length};
use serde::Serialize;

/// Step-by-step flight distance, as shown to students
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EuclideanBreakdown {
    pub dx: i32,
    pub dy: i32,
    pub squared_dx: i32,
    pub squared_dy: i32,
    pub distance: f64,
}

/// Step-by-step street distance on an open grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaxicabBreakdown {
    pub dx: i32,
    pub dy: i32,
    pub distance: i32,
}

pub fn euclidean_breakdown(p1: GridCell, p2: GridCell) -> EuclideanBreakdown {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    EuclideanBreakdown {
        dx,
        dy,
        squared_dx: dx * dx,
        squared_dy: dy * dy,
        distance: ((dx * dx + dy * dy) as f64).sqrt(),
    }
}

pub fn taxicab_breakdown(p1: GridCell, p2: GridCell) -> TaxicabBreakdown {
    let dx = (p2.x - p1.x).abs();
    let dy = (p2.y - p1.y).abs();
    TaxicabBreakdown {
        dx,
        dy,
        distance: dx + dy,
    }
}

/// Heading of the flight from `from` to `to`, in degrees (screen axes, y down)
pub fn flight_heading_degrees(from: GridCell, to: GridCell) -> f64 {
    let dx = (to.x - from.x) as f64;
    let dy = (to.y - from.y) as f64;
    dy.atan2(dx).to_degrees()
}

/// Distances between the two points of a grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub flight_distance: f64,
    /// Length of the shortest street path, `None` when blocked streets cut the
    /// end off from the start
    pub street_distance: Option<usize>,
    /// Street minus flight distance, only when the end is reachable
    pub difference: Option<f64>,
}

impl Metrics {
    pub fn compute(grid: &GridState) -> Self {
        let flight_distance = grid.start.euclidean(&grid.end);
        let street_distance = find_path(grid.start, grid.end, grid.size, &grid.blocked)
            .ok()
            .map(|path| path_length(&path));
        let difference = street_distance.map(|steps| steps as f64 - flight_distance);

        Metrics {
            flight_distance,
            street_distance,
            difference,
        }
    }

    /// Street distance for display, `∞` when unreachable
    pub fn street_label(&self) -> String {
        match self.street_distance {
            Some(steps) => format!("{} units", steps),
            None => "∞".to_string(),
        }
    }
}
