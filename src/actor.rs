use crate::grid::GridCell;
use serde::Serialize;

/// Which of the two travellers an actor is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ActorKind {
    /// Flies the straight line between the points
    Flight,
    /// Drives along the streets
    Street,
}

/// Direction of the street leg an actor is currently driving
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StreetHeading {
    Horizontal,
    Vertical,
}

/// Actor represents a traveller on the grid with floating-point positioning
/// (grid units, intersections on integer coordinates)
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub kind: ActorKind,

    /// Floating-point position
    pub fpos_x: f64,
    pub fpos_y: f64,
}

impl Actor {
    /// Create a new actor standing on a cell
    pub fn new(kind: ActorKind, cell: GridCell) -> Self {
        Actor {
            kind,
            fpos_x: cell.x as f64,
            fpos_y: cell.y as f64,
        }
    }

    /// Snap the actor onto a cell
    pub fn place_at(&mut self, cell: GridCell) {
        self.fpos_x = cell.x as f64;
        self.fpos_y = cell.y as f64;
    }

    /// Put the actor at fraction `t` of the way from `from` to `to`
    pub fn move_between(&mut self, from: GridCell, to: GridCell, t: f64) {
        self.fpos_x = from.x as f64 + (to.x - from.x) as f64 * t;
        self.fpos_y = from.y as f64 + (to.y - from.y) as f64 * t;
    }

    pub fn position(&self) -> (f64, f64) {
        (self.fpos_x, self.fpos_y)
    }

    /// Check if the actor stands exactly on a cell
    pub fn is_at(&self, cell: GridCell) -> bool {
        self.fpos_x == cell.x as f64 && self.fpos_y == cell.y as f64
    }
}
