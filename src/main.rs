use arboard::Clipboard;
use macroquad::prelude::*;
use std::sync::OnceLock;
use taxicab_explorer::config::{ConfigSource, CONFIG_FILE};
use taxicab_explorer::report::text_report;
use taxicab_explorer::{
    AnimationState, Config, DisplayMode, ExplorerSession, FrameScheduler, GridCell, Metrics,
    PointKind, StreetHeading,
};
use tracing_subscriber::EnvFilter;

const MARGIN: f32 = 30.0;
const PANEL_WIDTH: f32 = 320.0;
const MIN_CELL_SIZE: f32 = 4.0;
/// How long status messages stay on screen, in seconds
const MESSAGE_SECONDS: f64 = 4.0;

/// Read once, shared by the window setup and `main`
static CONFIG: OnceLock<(Config, ConfigSource)> = OnceLock::new();

fn loaded_config() -> &'static (Config, ConfigSource) {
    CONFIG.get_or_init(|| Config::read_from(CONFIG_FILE))
}

const FLIGHT_COLOR: Color = Color::new(0.23, 0.51, 0.96, 1.0);
const STREET_COLOR: Color = Color::new(0.94, 0.27, 0.27, 1.0);

/// Visualization state
struct VisState {
    session: ExplorerSession<FrameScheduler>,
    cell_size: f32,
    background: Color,
    show_grid: bool,
    dragging: Option<PointKind>,
    metrics: Metrics,
    metrics_revision: u64,
    status: Option<(String, f64)>,
}

impl VisState {
    fn new(config: &Config) -> Self {
        let session = ExplorerSession::from_config(config, FrameScheduler::new());
        let metrics = session.metrics();
        let metrics_revision = session.grid().get_revision();

        VisState {
            session,
            cell_size: config.visual.cell_size.max(MIN_CELL_SIZE),
            background: Color::from_rgba(
                config.visual.background_r,
                config.visual.background_g,
                config.visual.background_b,
                255,
            ),
            show_grid: config.visual.show_grid,
            dragging: None,
            metrics,
            metrics_revision,
            status: None,
        }
    }

    /// Screen position of a point given in grid units
    fn to_screen(&self, x: f64, y: f64) -> (f32, f32) {
        (
            MARGIN + x as f32 * self.cell_size,
            MARGIN + y as f32 * self.cell_size,
        )
    }

    /// Grid units under a screen position
    fn to_grid(&self, mouse_x: f32, mouse_y: f32) -> (f64, f64) {
        (
            ((mouse_x - MARGIN) / self.cell_size) as f64,
            ((mouse_y - MARGIN) / self.cell_size) as f64,
        )
    }

    fn show_status(&mut self, message: String) {
        self.status = Some((message, get_time() + MESSAGE_SECONDS));
    }

    fn handle_mouse(&mut self) {
        let (mouse_x, mouse_y) = mouse_position();
        let (fx, fy) = self.to_grid(mouse_x, mouse_y);

        if self.session.blocking_mode() {
            self.session.hover(fx, fy);
            if is_mouse_button_pressed(MouseButton::Left) {
                self.session.click_street(fx, fy);
            }
            return;
        }

        let cell = GridCell::new(fx.round() as i32, fy.round() as i32);
        if is_mouse_button_pressed(MouseButton::Left) {
            self.dragging = self.session.grid().point_at(cell);
        }
        if let Some(which) = self.dragging {
            if is_mouse_button_down(MouseButton::Left) {
                self.session.move_point(which, cell.x, cell.y);
            }
        }
        if is_mouse_button_released(MouseButton::Left) {
            self.dragging = None;
        }
    }

    fn handle_keys(&mut self) {
        if is_key_pressed(KeyCode::Space) {
            if let Err(e) = self.session.toggle_play() {
                self.show_status(e.to_string());
            }
        }
        if is_key_pressed(KeyCode::R) {
            self.session.reset();
        }
        if is_key_pressed(KeyCode::B) {
            let enabled = !self.session.blocking_mode();
            self.session.set_blocking_mode(enabled);
        }
        if is_key_pressed(KeyCode::G) {
            self.show_grid = !self.show_grid;
        }
        if is_key_pressed(KeyCode::Key1) {
            self.session.set_mode(DisplayMode::DirectOnly);
        }
        if is_key_pressed(KeyCode::Key2) {
            self.session.set_mode(DisplayMode::GridOnly);
        }
        if is_key_pressed(KeyCode::Key3) {
            self.session.set_mode(DisplayMode::Both);
        }
        if is_key_pressed(KeyCode::X) {
            self.session.clear_streets();
        }
        if is_key_pressed(KeyCode::C) {
            self.copy_to_clipboard();
        }
    }

    fn refresh_metrics(&mut self) {
        let revision = self.session.grid().get_revision();
        if revision != self.metrics_revision {
            self.metrics = self.session.metrics();
            self.metrics_revision = revision;
        }
    }

    fn copy_to_clipboard(&mut self) {
        let report = text_report(self.session.grid());
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(report) {
                    tracing::warn!("Failed to copy to clipboard: {}", e);
                } else {
                    tracing::info!("Grid report copied to clipboard");
                    self.show_status("Report copied to clipboard".to_string());
                    // Keep clipboard alive for a moment to ensure clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => {
                tracing::warn!("Failed to access clipboard: {}", e);
            }
        }
    }

    fn draw_streets(&self) {
        let grid = self.session.grid();
        let open = Color::from_rgba(226, 232, 240, 255);

        if self.show_grid {
            for i in 0..grid.size {
                let (x0, y0) = self.to_screen(0.0, i as f64);
                let (x1, _) = self.to_screen((grid.size - 1) as f64, i as f64);
                draw_line(x0, y0, x1, y0, 1.0, open);
                let (cx, cy0) = self.to_screen(i as f64, 0.0);
                let (_, cy1) = self.to_screen(i as f64, (grid.size - 1) as f64);
                draw_line(cx, cy0, cx, cy1, 1.0, open);
            }
        }

        for edge in grid.blocked.iter() {
            let (x0, y0) = self.to_screen(edge.a().x as f64, edge.a().y as f64);
            let (x1, y1) = self.to_screen(edge.b().x as f64, edge.b().y as f64);
            draw_line(x0, y0, x1, y1, 4.0, RED);
        }

        if let Some(edge) = self.session.highlighted_street() {
            let color = if grid.blocked.contains(&edge) { GREEN } else { ORANGE };
            let (x0, y0) = self.to_screen(edge.a().x as f64, edge.a().y as f64);
            let (x1, y1) = self.to_screen(edge.b().x as f64, edge.b().y as f64);
            draw_line(x0, y0, x1, y1, 6.0, color);
        }
    }

    fn draw_trip(&self) {
        let motion = self.session.motion();
        let grid = self.session.grid();
        if motion.state() == AnimationState::Idle {
            return;
        }

        if let Some(path) = motion.path() {
            for pair in path.windows(2) {
                let (x0, y0) = self.to_screen(pair[0].x as f64, pair[0].y as f64);
                let (x1, y1) = self.to_screen(pair[1].x as f64, pair[1].y as f64);
                draw_line(x0, y0, x1, y1, 2.0, Color::new(0.94, 0.27, 0.27, 0.4));
            }
            for cell in path {
                let (x, y) = self.to_screen(cell.x as f64, cell.y as f64);
                draw_circle(x, y, 2.5, Color::new(0.94, 0.27, 0.27, 0.6));
            }
        }

        if motion.mode().uses_flight() {
            let (x0, y0) = self.to_screen(grid.start.x as f64, grid.start.y as f64);
            let (x1, y1) = self.to_screen(grid.end.x as f64, grid.end.y as f64);
            draw_line(x0, y0, x1, y1, 2.0, Color::new(0.23, 0.51, 0.96, 0.4));
        }
    }

    fn draw_actors(&self) {
        let motion = self.session.motion();
        let mode = self.session.mode();
        let radius = self.cell_size * 0.3;

        if mode.uses_flight() {
            let (fx, fy) = motion.flight_position();
            let (x, y) = self.to_screen(fx, fy);
            draw_circle(x, y, radius, FLIGHT_COLOR);
            let heading = motion.flight_heading().to_radians() as f32;
            draw_line(
                x,
                y,
                x + heading.cos() * radius * 1.6,
                y + heading.sin() * radius * 1.6,
                2.0,
                DARKBLUE,
            );
        }

        if mode.uses_street() {
            let (sx, sy) = motion.street_position();
            let (x, y) = self.to_screen(sx, sy);
            let (w, h) = match motion.street_heading() {
                StreetHeading::Horizontal => (radius * 2.2, radius * 1.4),
                StreetHeading::Vertical => (radius * 1.4, radius * 2.2),
            };
            draw_rectangle(x - w / 2.0, y - h / 2.0, w, h, STREET_COLOR);
        }
    }

    fn draw_points(&self) {
        let grid = self.session.grid();
        let radius = self.cell_size * 0.22;
        for (cell, color, label) in [(grid.start, DARKGREEN, "A"), (grid.end, MAROON, "B")] {
            let (x, y) = self.to_screen(cell.x as f64, cell.y as f64);
            let scale = match self.dragging {
                Some(which) if grid.point(which) == cell => 1.2,
                _ => 1.0,
            };
            draw_circle_lines(x, y, radius * scale, 3.0, color);
            draw_text(label, x + radius, y - radius, 20.0, color);
        }
    }

    fn draw_panel(&self) {
        let grid = self.session.grid();
        let motion = self.session.motion();
        let left = MARGIN * 2.0 + (grid.size - 1) as f32 * self.cell_size;

        let mode = match self.session.mode() {
            DisplayMode::DirectOnly => "Flight only",
            DisplayMode::GridOnly => "Street only",
            DisplayMode::Both => "Flight and street",
        };
        let state = match motion.state() {
            AnimationState::Idle => "Idle",
            AnimationState::Running => "Running",
            AnimationState::Paused => "Paused",
            AnimationState::Completed => "Completed",
        };

        let mut lines = vec![
            format!("Flight distance: {:.2} units", self.metrics.flight_distance),
            format!("Street distance: {}", self.metrics.street_label()),
        ];
        if let Some(difference) = self.metrics.difference {
            lines.push(format!("Difference: {:.2} units", difference));
        }
        lines.push(String::new());
        lines.push(format!("Mode: {}", mode));
        lines.push(format!("Pace: {:.0} ms per unit", motion.ms_per_unit()));
        lines.push(format!("State: {} ({:.0}%)", state, motion.progress() * 100.0));
        if self.session.blocking_mode() {
            lines.push("Blocking streets: click a street".to_string());
        }
        lines.push(String::new());
        lines.push("Drag A/B: move points".to_string());
        lines.push("Space: start / pause / resume".to_string());
        lines.push("R: reset   B: block streets   X: clear".to_string());
        lines.push("1/2/3: flight / street / both".to_string());
        lines.push("G: grid   C: copy report   Esc: quit".to_string());

        for (i, line) in lines.iter().enumerate() {
            draw_text(line, left, MARGIN + 20.0 + i as f32 * 22.0, 20.0, DARKGRAY);
        }

        if let Some((message, until)) = &self.status {
            if get_time() < *until {
                let y = MARGIN + 20.0 + (lines.len() + 1) as f32 * 22.0;
                draw_text(message, left, y, 18.0, RED);
            }
        }
    }

    fn draw(&self) {
        clear_background(self.background);
        self.draw_streets();
        self.draw_trip();
        self.draw_points();
        self.draw_actors();
        self.draw_panel();
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn window_conf() -> Conf {
    let (config, _) = loaded_config();
    let cell_size = config.visual.cell_size.max(MIN_CELL_SIZE);
    let grid_side = (config.grid.size.max(1) - 1) as f32 * cell_size + MARGIN * 2.0;
    Conf {
        window_title: config.visual.window_title.clone(),
        window_width: (grid_side + PANEL_WIDTH) as i32,
        window_height: grid_side.max(420.0) as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let (config, source) = loaded_config();
    init_tracing(config);
    source.log();

    // Check command line arguments
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--report" {
        println!("{}", text_report(&config.initial_grid()));
        return;
    }

    let mut state = VisState::new(config);

    loop {
        state.handle_mouse();
        state.handle_keys();

        // Close window on Escape
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        state.session.pump();
        state.refresh_metrics();
        state.draw();

        next_frame().await
    }

    let log = state.session.action_log();
    tracing::info!("\n{}", log.summary());
    if config.logging.enable_action_log {
        match log.save_to_file(&config.logging.action_log_path) {
            Ok(()) => tracing::info!("Action log saved to {}", config.logging.action_log_path),
            Err(e) => tracing::warn!("Failed to save action log: {}", e),
        }
    }
}
