pub mod action_log;
pub mod actor;
pub mod config;
pub mod error;
pub mod grid;
pub mod metrics;
pub mod motion;
pub mod pathfinding;
pub mod report;
pub mod scheduler;
pub mod session;

pub use actor::{Actor, ActorKind, StreetHeading};
pub use config::Config;
pub use error::{ExplorerError, ExplorerResult};
pub use grid::{BlockedSet, Edge, GridCell, GridState, PointKind};
pub use metrics::Metrics;
pub use motion::{AnimationState, DisplayMode, MotionController};
pub use pathfinding::find_path;
pub use scheduler::{FrameScheduler, ManualScheduler, Scheduler, TickHandle};
pub use session::ExplorerSession;
