use serde::{Deserialize, Serialize};

/// Task counts for the current month, each paired with its change against the
/// previous month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub task_count: i64,
    pub task_difference: i64,
    pub assigned_task_count: i64,
    pub assigned_task_difference: i64,
    pub completed_task_count: i64,
    pub completed_task_difference: i64,
    pub incomplete_task_count: i64,
    pub incomplete_task_difference: i64,
    pub overdue_task_count: i64,
    pub overdue_task_difference: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn of(difference: i64) -> Self {
        if difference >= 0 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl Analytics {
    /// `(title, value, difference)` rows in card order.
    pub fn cards(&self) -> [(&'static str, i64, i64); 5] {
        [
            ("Total Tasks", self.task_count, self.task_difference),
            ("Assigned Tasks", self.assigned_task_count, self.assigned_task_difference),
            ("Completed Tasks", self.completed_task_count, self.completed_task_difference),
            ("Overdue Tasks", self.overdue_task_count, self.overdue_task_difference),
            ("Incomplete Tasks", self.incomplete_task_count, self.incomplete_task_difference),
        ]
    }
}
