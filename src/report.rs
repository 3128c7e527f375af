use crate::grid::{Edge, GridCell, GridState};
use crate::metrics::{euclidean_breakdown, taxicab_breakdown, Metrics};
use crate::pathfinding::{find_path, format_path};
use std::collections::HashSet;

/// Render the street grid as text.
///
/// Intersections sit on even columns/rows of the canvas with streets in
/// between: `S` start, `E` end, `*` path, `+` other intersections, `-`/`|`
/// open streets, `#` blocked streets.
pub fn render_ascii(grid: &GridState, path: Option<&[GridCell]>) -> String {
    let on_path: HashSet<GridCell> = path.map(|p| p.iter().copied().collect()).unwrap_or_default();
    let mut result = String::new();

    for y in 0..grid.size {
        // intersections and horizontal streets
        for x in 0..grid.size {
            let cell = GridCell::new(x, y);
            let symbol = if cell == grid.start {
                'S'
            } else if cell == grid.end {
                'E'
            } else if on_path.contains(&cell) {
                '*'
            } else {
                '+'
            };
            result.push(symbol);

            if x + 1 < grid.size {
                let street = street_symbol(grid, cell, GridCell::new(x + 1, y));
                result.push(street);
            }
        }
        result.push('\n');

        // vertical streets
        if y + 1 < grid.size {
            for x in 0..grid.size {
                let street = street_symbol(grid, GridCell::new(x, y), GridCell::new(x, y + 1));
                result.push(street);
                if x + 1 < grid.size {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
    }

    result
}

fn street_symbol(grid: &GridState, a: GridCell, b: GridCell) -> char {
    match Edge::new(a, b) {
        Ok(edge) if grid.blocked.contains(&edge) => '#',
        Ok(edge) if edge.is_vertical() => '|',
        _ => '-',
    }
}

/// Full text report: grid drawing, path, and both distances worked out
pub fn text_report(grid: &GridState) -> String {
    let path = find_path(grid.start, grid.end, grid.size, &grid.blocked).ok();
    let metrics = Metrics::compute(grid);
    let flight = euclidean_breakdown(grid.start, grid.end);
    let street = taxicab_breakdown(grid.start, grid.end);

    let mut report = String::new();
    report.push_str(&format!(
        "Grid {}x{}, start {}, end {}\n\n",
        grid.size, grid.size, grid.start, grid.end
    ));
    report.push_str(&render_ascii(grid, path.as_deref()));
    report.push('\n');

    report.push_str(&format!(
        "Flight distance: sqrt({}² + {}²) = sqrt({} + {}) = {:.2} units\n",
        flight.dx, flight.dy, flight.squared_dx, flight.squared_dy, flight.distance
    ));
    report.push_str(&format!(
        "Open-grid street distance: |{}| + |{}| = {} units\n",
        street.dx, street.dy, street.distance
    ));
    report.push_str(&format!("Street distance: {}\n", metrics.street_label()));
    if let Some(difference) = metrics.difference {
        report.push_str(&format!("Difference: {:.2} units\n", difference));
    }

    match &path {
        Some(path) => report.push_str(&format!("Path: {}\n", format_path(path))),
        None => report.push_str("Path: No path (destination unreachable)\n"),
    }

    if !grid.blocked.is_empty() {
        let streets: Vec<String> = grid.blocked.sorted().iter().map(|e| e.to_string()).collect();
        report.push_str(&format!("Blocked streets: {}\n", streets.join(" ")));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_small_grid() {
        let mut grid = GridState::new(3, GridCell::new(0, 0), GridCell::new(2, 0));
        grid.block_street(Edge::new(GridCell::new(1, 0), GridCell::new(2, 0)).unwrap());
        let text = render_ascii(&grid, None);
        let expected = "S-+#E\n\
                        | | |\n\
                        +-+-+\n\
                        | | |\n\
                        +-+-+\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_report_mentions_unreachable() {
        let mut grid = GridState::new(2, GridCell::new(0, 0), GridCell::new(1, 1));
        grid.block_street(Edge::new(GridCell::new(1, 1), GridCell::new(0, 1)).unwrap());
        grid.block_street(Edge::new(GridCell::new(1, 1), GridCell::new(1, 0)).unwrap());
        let report = text_report(&grid);
        assert!(report.contains("Street distance: ∞"));
        assert!(report.contains("destination unreachable"));
        assert!(report.contains("Blocked streets: 0,1-1,1 1,0-1,1"));
        assert!(!report.contains("Difference"));
    }
}
