use crate::grid::PointKind;
use crate::motion::DisplayMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What became of a requested action
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Applied,
    /// Not applicable in the current state
    Ignored,
    /// Refused with a user-visible reason
    Rejected(String),
}

/// User intents sent to an explorer session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Drag an endpoint to (x, y)
    MovePoint { which: PointKind, x: i32, y: i32 },
    /// Toggle the street given in "x1,y1-x2,y2" form
    ToggleStreet { street: String },
    /// Unblock every street
    ClearStreets,
    /// Enter or leave street blocking mode
    SetBlockingMode { enabled: bool },
    SetMode { mode: DisplayMode },
    Start,
    Pause,
    Resume,
    Reset,
}

/// Logged action with timestamp and outcome
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggedAction {
    /// Milliseconds on the session clock
    pub timestamp_ms: u64,
    /// The action
    pub action: Action,
    pub outcome: ActionOutcome,
}

/// Action logger
#[derive(Debug, Default)]
pub struct ActionLog {
    actions: Vec<LoggedAction>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an action with its timestamp and outcome
    pub fn log(&mut self, timestamp_ms: f64, action: Action, outcome: ActionOutcome) {
        self.actions.push(LoggedAction {
            timestamp_ms: timestamp_ms.max(0.0) as u64,
            action,
            outcome,
        });
    }

    /// Get all logged actions
    pub fn get_actions(&self) -> &Vec<LoggedAction> {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.actions)
    }

    /// Save log to JSON file
    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let mut counts: HashMap<&'static str, usize> = HashMap::new();
        let mut rejected = 0;
        let mut ignored = 0;

        for logged in &self.actions {
            match logged.outcome {
                ActionOutcome::Applied => {}
                ActionOutcome::Ignored => {
                    ignored += 1;
                    continue;
                }
                ActionOutcome::Rejected(_) => {
                    rejected += 1;
                    continue;
                }
            }
            let key = match &logged.action {
                Action::MovePoint { .. } => "moves",
                Action::ToggleStreet { .. } | Action::ClearStreets => "toggles",
                Action::SetBlockingMode { .. } => "blocking",
                Action::SetMode { .. } => "modes",
                Action::Start => "starts",
                Action::Pause => "pauses",
                Action::Resume => "resumes",
                Action::Reset => "resets",
            };
            *counts.entry(key).or_insert(0) += 1;
        }

        let count = |key: &str| counts.get(key).copied().unwrap_or(0);
        let duration = self.actions.last().map(|last| last.timestamp_ms).unwrap_or(0);

        format!(
            "Session Duration: {}ms\n\
             Total Events: {} ({} rejected, {} ignored)\n\
             Grid Changes: {} point moves, {} street toggles\n\
             Animation: {} starts, {} pauses, {} resumes, {} resets",
            duration,
            self.actions.len(),
            rejected,
            ignored,
            count("moves"),
            count("toggles"),
            count("starts"),
            count("pauses"),
            count("resumes"),
            count("resets"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_applied_actions_only() {
        let mut log = ActionLog::new();
        log.log(0.0, Action::Start, ActionOutcome::Rejected("no path".to_string()));
        log.log(10.0, Action::ToggleStreet { street: "0,0-1,0".to_string() }, ActionOutcome::Applied);
        log.log(20.0, Action::Start, ActionOutcome::Applied);
        log.log(35.5, Action::Resume, ActionOutcome::Ignored);

        let summary = log.summary();
        assert!(summary.contains("Session Duration: 35ms"));
        assert!(summary.contains("Total Events: 4 (1 rejected, 1 ignored)"));
        assert!(summary.contains("1 street toggles"));
        assert!(summary.contains("1 starts"));
    }

    #[test]
    fn test_json_dump() {
        let mut log = ActionLog::new();
        log.log(
            5.0,
            Action::MovePoint { which: PointKind::End, x: 2, y: 3 },
            ActionOutcome::Applied,
        );
        let json = log.to_json().unwrap();
        let parsed: Vec<LoggedAction> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].action, Action::MovePoint { which: PointKind::End, x: 2, y: 3 });
        assert_eq!(parsed[0].outcome, ActionOutcome::Applied);
    }
}
