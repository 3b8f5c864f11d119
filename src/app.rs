// app.rs
use chrono::{Duration, Local, NaiveDate};
use tracing::error;

use crate::pipeline::{self, SortMode, StatusFilter};
use crate::store::TaskStore;
use crate::task::{Priority, Task};
use crate::tui::parse_due_date;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    EditingDescription,
    EditingPriority,
    EditingDueDate,
    Searching,
    ConfirmingDelete,
    ConfirmingClear,
}

/// Whether the form feeds a brand-new task or rewrites an existing one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditMode {
    Creating,
    Editing(u64),
}

pub struct App {
    store: TaskStore,
    pub tasks: Vec<Task>,

    pub input_mode: InputMode,
    pub edit_mode: EditMode,
    pub input_description: String,
    pub input_priority: Priority,
    pub input_due_date: String,

    pub search_query: String,
    pub status_filter: StatusFilter,
    pub sort_mode: SortMode,
    pub selected: usize,
    pub error_message: Option<String>,
}

impl App {
    pub fn new(store: TaskStore) -> Self {
        let tasks = store.load_all();
        let mut app = Self {
            store,
            tasks,
            input_mode: InputMode::Normal,
            edit_mode: EditMode::Creating,
            input_description: String::new(),
            input_priority: Priority::High,
            input_due_date: String::new(),
            search_query: String::new(),
            status_filter: StatusFilter::Incomplete,
            sort_mode: SortMode::NearestDue,
            selected: 0,
            error_message: None,
        };
        app.reset_inputs();
        app
    }

    pub fn visible(&self) -> Vec<&Task> {
        pipeline::present(
            &self.tasks,
            self.status_filter,
            &self.search_query,
            self.sort_mode,
        )
    }

    pub fn selected_task_id(&self) -> Option<u64> {
        self.visible().get(self.selected).map(|t| t.id)
    }

    /// One full load-apply-save cycle against the store. The in-memory
    /// collection follows the applied change even when the save fails, in
    /// which case the failure is logged and shown on the status line.
    /// Input resets must not wipe that message, so it is owned here: every
    /// cycle starts a fresh status.
    fn mutate<F: FnOnce(&mut Vec<Task>)>(&mut self, apply: F) {
        self.error_message = None;
        let mut tasks = self.store.load_all();
        apply(&mut tasks);
        if let Err(e) = self.store.save_all(&tasks) {
            error!(error = %e, "failed to persist tasks");
            self.error_message = Some(format!("Save failed: {}", e));
        }
        self.tasks = tasks;
        // The applied change may have shrunk the visible view.
        self.selected = self.selected.min(self.visible().len().saturating_sub(1));
    }

    pub fn submit_task(&mut self) -> Result<(), String> {
        let description = self.input_description.trim().to_string();
        if description.is_empty() {
            return Err("Description cannot be empty.".to_string());
        }
        let due_date = parse_due_date(&self.input_due_date)?;
        let priority = self.input_priority;

        match self.edit_mode {
            EditMode::Creating => {
                self.mutate(|tasks| {
                    let id = TaskStore::next_id(tasks);
                    tasks.push(Task::new(id, description, priority, due_date));
                });
            }
            EditMode::Editing(id) => {
                let mut found = false;
                self.mutate(|tasks| {
                    if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
                        task.description = description;
                        task.priority = priority;
                        task.due_date = due_date;
                        found = true;
                    }
                });
                if !found {
                    self.cancel_edit();
                    return Err(format!("Task #{} no longer exists.", id));
                }
            }
        }

        self.cancel_edit();
        Ok(())
    }

    pub fn begin_edit_selected(&mut self) {
        let Some((id, description, priority, due_date)) = self
            .visible()
            .get(self.selected)
            .map(|t| (t.id, t.description.clone(), t.priority, t.due_date))
        else {
            return;
        };
        self.edit_mode = EditMode::Editing(id);
        self.input_description = description;
        self.input_priority = priority;
        self.input_due_date = due_date.format("%Y-%m-%d").to_string();
        self.error_message = None;
    }

    pub fn cancel_edit(&mut self) {
        self.edit_mode = EditMode::Creating;
        self.reset_inputs();
    }

    fn reset_inputs(&mut self) {
        self.input_description.clear();
        self.input_priority = Priority::High;
        let tomorrow = Local::now().date_naive() + Duration::days(1);
        self.input_due_date = tomorrow.format("%Y-%m-%d").to_string();
    }

    /// Flips completion on the selected row. A vanished id is a silent
    /// no-op; the row may have been deleted by another window of the same
    /// app, which we do not defend against.
    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        let today = Local::now().date_naive();
        self.toggle_completed(id, today);
    }

    pub fn toggle_completed(&mut self, id: u64, today: NaiveDate) {
        self.mutate(|tasks| {
            if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
                let done = task.is_completed();
                task.set_completed(!done, today);
            }
        });
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        self.mutate(|tasks| {
            tasks.retain(|t| t.id != id);
        });
        if let EditMode::Editing(editing) = self.edit_mode {
            if editing == id {
                self.cancel_edit();
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.mutate(|tasks| tasks.clear());
        self.selected = 0;
        self.cancel_edit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn app_in(dir: &tempfile::TempDir) -> App {
        let mut app = App::new(TaskStore::new(dir.path().join("tasks.json")));
        // Deterministic view for selection-based operations.
        app.status_filter = StatusFilter::All;
        app.sort_mode = SortMode::None;
        app
    }

    fn add(app: &mut App, description: &str, priority: Priority, due: &str) {
        app.input_description = description.to_string();
        app.input_priority = priority;
        app.input_due_date = due.to_string();
        app.submit_task().unwrap();
    }

    #[test]
    fn add_toggle_delete_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        add(&mut app, "Pay rent", Priority::High, "2025-01-01");
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].description, "Pay rent");

        app.selected = 0;
        app.toggle_selected();
        let today = Local::now().date_naive();
        assert!(app.tasks[0].is_completed());
        assert_eq!(app.tasks[0].completed_at, Some(today));

        app.delete_selected();
        assert!(app.tasks.is_empty());

        // A fresh load after "restart" sees the empty store.
        let reopened = TaskStore::new(dir.path().join("tasks.json"));
        assert!(reopened.load_all().is_empty());
    }

    #[test]
    fn empty_description_is_rejected_without_state_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        app.input_description = "   ".to_string();
        app.input_due_date = "2025-01-01".to_string();
        assert!(app.submit_task().is_err());
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn malformed_date_is_rejected_without_state_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        app.input_description = "Pay rent".to_string();
        app.input_due_date = "01/01/2025".to_string();
        assert!(app.submit_task().is_err());
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn edit_replaces_fields_and_keeps_completion() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        add(&mut app, "Buy milk", Priority::Low, "2025-02-01");
        let id = app.tasks[0].id;
        app.selected = 0;
        app.toggle_completed(id, date("2025-01-20"));

        app.begin_edit_selected();
        assert_eq!(app.edit_mode, EditMode::Editing(id));
        assert_eq!(app.input_description, "Buy milk");

        app.input_description = "Buy oat milk".to_string();
        app.input_priority = Priority::Medium;
        app.submit_task().unwrap();

        assert_eq!(app.tasks.len(), 1);
        let task = &app.tasks[0];
        assert_eq!(task.id, id);
        assert_eq!(task.description, "Buy oat milk");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.completed_at, Some(date("2025-01-20")));
        assert_eq!(app.edit_mode, EditMode::Creating);
    }

    #[test]
    fn editing_a_vanished_task_reports_and_resets() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        add(&mut app, "Buy milk", Priority::Low, "2025-02-01");
        app.selected = 0;
        app.begin_edit_selected();

        // Another window of the same app empties the store underneath us.
        let other = TaskStore::new(dir.path().join("tasks.json"));
        other.save_all(&[]).unwrap();

        app.input_description = "Buy oat milk".to_string();
        app.input_due_date = "2025-02-01".to_string();
        let err = app.submit_task().unwrap_err();
        assert!(err.contains("no longer exists"));
        assert_eq!(app.edit_mode, EditMode::Creating);
    }

    #[test]
    fn toggling_a_vanished_id_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        add(&mut app, "Buy milk", Priority::Low, "2025-02-01");
        app.toggle_completed(999, date("2025-01-20"));
        assert!(!app.tasks[0].is_completed());
    }

    #[test]
    fn clear_all_empties_store_and_view_without_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        add(&mut app, "a", Priority::Low, "2025-02-01");
        add(&mut app, "b", Priority::High, "2025-02-02");
        assert_eq!(app.tasks.len(), 2);

        app.clear_all();
        assert!(app.tasks.is_empty());
        assert!(app.visible().is_empty());

        let reopened = TaskStore::new(dir.path().join("tasks.json"));
        assert!(reopened.load_all().is_empty());
    }

    #[test]
    fn save_failure_is_reported_on_the_status_line() {
        let dir = tempfile::tempdir().unwrap();
        // The store path is a directory, so every save fails.
        let mut app = App::new(TaskStore::new(dir.path()));
        app.status_filter = StatusFilter::All;
        app.sort_mode = SortMode::None;

        app.input_description = "Pay rent".to_string();
        app.input_due_date = "2025-01-01".to_string();
        app.submit_task().unwrap();
        assert_eq!(app.tasks.len(), 1);
        let msg = app.error_message.as_deref().unwrap_or("");
        assert!(msg.starts_with("Save failed"), "got {msg:?}");

        app.clear_all();
        assert!(app.tasks.is_empty());
        let msg = app.error_message.as_deref().unwrap_or("");
        assert!(msg.starts_with("Save failed"), "got {msg:?}");
    }

    #[test]
    fn selection_follows_rows_leaving_the_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.status_filter = StatusFilter::Incomplete;

        add(&mut app, "first", Priority::Low, "2025-02-01");
        add(&mut app, "second", Priority::Low, "2025-02-02");
        app.selected = 1;

        // Completing the last visible row removes it from the incomplete view.
        app.toggle_selected();
        assert_eq!(app.visible().len(), 1);
        assert_eq!(app.selected, 0);
        assert!(app.selected_task_id().is_some());

        app.toggle_selected();
        assert!(app.visible().is_empty());
        assert_eq!(app.selected, 0);
        assert_eq!(app.selected_task_id(), None);
    }

    #[test]
    fn sequential_additions_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        for i in 0..10 {
            add(&mut app, &format!("task {i}"), Priority::Medium, "2025-02-01");
        }
        let mut ids: Vec<u64> = app.tasks.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }
}
