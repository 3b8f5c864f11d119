// task.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Priority::Low => Priority::High,
            Priority::Medium => Priority::Low,
            Priority::High => Priority::Medium,
        }
    }
}

/// How pressing a task is relative to a given day. Presentation maps tiers
/// to colors; nothing here knows about rendering.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UrgencyTier {
    Completed,
    Overdue,
    Critical,
    Warning,
    Normal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub description: String,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub completed_at: Option<NaiveDate>,
}

impl Task {
    pub fn new(id: u64, description: String, priority: Priority, due_date: NaiveDate) -> Self {
        Self {
            id,
            description,
            priority,
            due_date,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Completing records the given day; un-completing clears the date
    /// entirely rather than keeping a stale one.
    pub fn set_completed(&mut self, completed: bool, today: NaiveDate) {
        self.completed_at = if completed { Some(today) } else { None };
    }

    pub fn urgency(&self, today: NaiveDate) -> UrgencyTier {
        if self.is_completed() {
            return UrgencyTier::Completed;
        }
        let days_until_due = (self.due_date - today).num_days();
        if days_until_due < 0 {
            UrgencyTier::Overdue
        } else if days_until_due <= 3 {
            UrgencyTier::Critical
        } else if days_until_due <= 10 {
            UrgencyTier::Warning
        } else {
            UrgencyTier::Normal
        }
    }
}
