// pipeline.rs

use crate::task::Task;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Completed,
    Incomplete,
}

impl StatusFilter {
    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Completed => "completed",
            StatusFilter::Incomplete => "incomplete",
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::Incomplete,
            StatusFilter::Incomplete => StatusFilter::All,
        }
    }

    fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => task.is_completed(),
            StatusFilter::Incomplete => !task.is_completed(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SortMode {
    None,
    PriorityDesc,
    PriorityAsc,
    NearestDue,
}

impl SortMode {
    pub fn label(self) -> &'static str {
        match self {
            SortMode::None => "none",
            SortMode::PriorityDesc => "priority high-low",
            SortMode::PriorityAsc => "priority low-high",
            SortMode::NearestDue => "nearest due",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortMode::None => SortMode::PriorityDesc,
            SortMode::PriorityDesc => SortMode::PriorityAsc,
            SortMode::PriorityAsc => SortMode::NearestDue,
            SortMode::NearestDue => SortMode::None,
        }
    }
}

/// Produces the ordered subset to display. Status and keyword predicates are
/// ANDed; keyword search is a case-insensitive substring match against the
/// description. Sorts are stable, so ties keep the source order. Never
/// mutates anything.
pub fn present<'a>(
    tasks: &'a [Task],
    status: StatusFilter,
    keyword: &str,
    sort: SortMode,
) -> Vec<&'a Task> {
    let needle = keyword.to_lowercase();
    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|t| status.matches(t))
        .filter(|t| needle.is_empty() || t.description.to_lowercase().contains(&needle))
        .collect();

    match sort {
        SortMode::None => {}
        SortMode::PriorityDesc => view.sort_by(|a, b| b.priority.cmp(&a.priority)),
        SortMode::PriorityAsc => view.sort_by(|a, b| a.priority.cmp(&b.priority)),
        SortMode::NearestDue => view.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
    }

    view
}
