// tui.rs

use crate::app::{App, EditMode, InputMode};
use crate::task::{Priority, Task, UrgencyTier};
use chrono::{Duration as Dur, Local, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use ratatui::{
    Terminal,
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use std::{io, time::Duration};

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()>
where
    std::io::Error: From<<B as Backend>::Error>,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if crossterm::event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match app.input_mode {
                    InputMode::Normal => match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('a') => {
                            app.cancel_edit();
                            app.error_message = None;
                            app.input_mode = InputMode::EditingDescription;
                        }
                        KeyCode::Char('e') => {
                            app.begin_edit_selected();
                            if matches!(app.edit_mode, EditMode::Editing(_)) {
                                app.input_mode = InputMode::EditingDescription;
                            }
                        }
                        KeyCode::Char('d') => app.toggle_selected(),
                        KeyCode::Char('D') => {
                            if app.selected_task_id().is_some() {
                                app.input_mode = InputMode::ConfirmingDelete;
                            }
                        }
                        KeyCode::Char('C') => {
                            if !app.tasks.is_empty() {
                                app.input_mode = InputMode::ConfirmingClear;
                            }
                        }
                        KeyCode::Char('/') => {
                            app.input_mode = InputMode::Searching;
                            app.search_query.clear();
                            app.selected = 0;
                        }
                        KeyCode::Char('f') => {
                            app.status_filter = app.status_filter.next();
                            app.selected = 0;
                        }
                        KeyCode::Char('s') => {
                            app.sort_mode = app.sort_mode.next();
                            app.selected = 0;
                        }
                        KeyCode::Down => {
                            if app.selected + 1 < app.visible().len() {
                                app.selected += 1;
                            }
                        }
                        KeyCode::Up => {
                            if app.selected > 0 {
                                app.selected -= 1;
                            }
                        }
                        _ => {}
                    },
                    InputMode::EditingDescription => match key.code {
                        KeyCode::Enter => {
                            app.input_mode = InputMode::EditingPriority;
                        }
                        KeyCode::Esc => {
                            app.cancel_edit();
                            app.error_message = None;
                            app.input_mode = InputMode::Normal;
                        }
                        KeyCode::Char(c) => {
                            app.input_description.push(c);
                        }
                        KeyCode::Backspace => {
                            app.input_description.pop();
                        }
                        _ => {}
                    },
                    InputMode::EditingPriority => match key.code {
                        KeyCode::Enter => {
                            app.input_mode = InputMode::EditingDueDate;
                        }
                        KeyCode::Esc => {
                            app.cancel_edit();
                            app.error_message = None;
                            app.input_mode = InputMode::Normal;
                        }
                        KeyCode::Left | KeyCode::Char('h') => {
                            app.input_priority = app.input_priority.prev();
                        }
                        KeyCode::Right | KeyCode::Char('l') => {
                            app.input_priority = app.input_priority.next();
                        }
                        KeyCode::Char('1') => app.input_priority = Priority::Low,
                        KeyCode::Char('2') => app.input_priority = Priority::Medium,
                        KeyCode::Char('3') => app.input_priority = Priority::High,
                        _ => {}
                    },
                    InputMode::EditingDueDate => match key.code {
                        KeyCode::Enter => match app.submit_task() {
                            Ok(_) => app.input_mode = InputMode::Normal,
                            Err(e) => app.error_message = Some(e),
                        },
                        KeyCode::Esc => {
                            app.cancel_edit();
                            app.error_message = None;
                            app.input_mode = InputMode::Normal;
                        }
                        KeyCode::Char(c) => {
                            app.input_due_date.push(c);
                        }
                        KeyCode::Backspace => {
                            app.input_due_date.pop();
                        }
                        _ => {}
                    },
                    InputMode::Searching => match key.code {
                        KeyCode::Enter => {
                            app.input_mode = InputMode::Normal;
                        }
                        KeyCode::Esc => {
                            app.search_query.clear();
                            app.selected = 0;
                            app.input_mode = InputMode::Normal;
                        }
                        KeyCode::Char(c) => {
                            app.search_query.push(c);
                            app.selected = 0;
                        }
                        KeyCode::Backspace => {
                            app.search_query.pop();
                            app.selected = 0;
                        }
                        _ => {}
                    },
                    InputMode::ConfirmingDelete => match key.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                            app.delete_selected();
                            app.input_mode = InputMode::Normal;
                        }
                        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                            app.input_mode = InputMode::Normal;
                        }
                        _ => {}
                    },
                    InputMode::ConfirmingClear => match key.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                            app.clear_all();
                            app.input_mode = InputMode::Normal;
                        }
                        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                            app.input_mode = InputMode::Normal;
                        }
                        _ => {}
                    },
                }
            }
        }
    }
}

fn urgency_color(tier: UrgencyTier) -> Color {
    match tier {
        UrgencyTier::Completed => Color::Green,
        UrgencyTier::Overdue => Color::Red,
        UrgencyTier::Critical => Color::Yellow,
        UrgencyTier::Warning => Color::Cyan,
        UrgencyTier::Normal => Color::White,
    }
}

fn task_line(task: &Task, today: NaiveDate) -> Line<'static> {
    let mark = if task.is_completed() { "[x]" } else { "[ ]" };
    let text = format!(
        "{} {:<6} {}  (Due: {})",
        mark,
        task.priority.label(),
        task.description,
        task.due_date.format("%Y-%m-%d"),
    );
    let mut style = Style::default().fg(urgency_color(task.urgency(today)));
    if task.is_completed() {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    Line::from(Span::styled(text, style))
}

fn ui(f: &mut ratatui::Frame<'_>, app: &App) {
    let size = f.area();

    let needs_input = matches!(
        app.input_mode,
        InputMode::EditingDescription
            | InputMode::EditingPriority
            | InputMode::EditingDueDate
            | InputMode::Searching
            | InputMode::ConfirmingDelete
            | InputMode::ConfirmingClear
    );

    let mut constraints = vec![
        Constraint::Length(1), // title
        Constraint::Length(2), // help
        Constraint::Length(1), // filter/sort status
        Constraint::Min(1),    // task list
    ];
    if needs_input {
        constraints.push(Constraint::Length(3)); // one input line only
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(size);

    let title = Paragraph::new(Line::from(Span::styled(
        format!("taskhub ({} tasks)", app.tasks.len()),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let b = Style::default().add_modifier(Modifier::BOLD);
    let help = Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("a", b),
            Span::raw(" add, "),
            Span::styled("e", b),
            Span::raw(" edit, "),
            Span::styled("d", b),
            Span::raw(" toggle done, "),
            Span::raw("Shift+"),
            Span::styled("D", b),
            Span::raw(" delete, "),
            Span::raw("Shift+"),
            Span::styled("C", b),
            Span::raw(" clear all"),
        ]),
        Line::from(vec![
            Span::styled("/", b),
            Span::raw(" search, "),
            Span::styled("f", b),
            Span::raw(" status filter, "),
            Span::styled("s", b),
            Span::raw(" sort, "),
            Span::styled("Up/Down", b),
            Span::raw(" select, "),
            Span::styled("q", b),
            Span::raw(" quit"),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[1]);

    let mut status_text = format!(
        "status: {}   sort: {}   search: {}",
        app.status_filter.label(),
        app.sort_mode.label(),
        if app.search_query.is_empty() {
            "(none)"
        } else {
            app.search_query.as_str()
        },
    );
    if let EditMode::Editing(id) = app.edit_mode {
        status_text.push_str(&format!("   editing #{}", id));
    }
    let status = Paragraph::new(Line::from(Span::styled(
        status_text,
        Style::default().fg(Color::Gray),
    )))
    .alignment(Alignment::Center);
    f.render_widget(status, chunks[2]);

    let today = Local::now().date_naive();
    let items: Vec<ListItem> = app
        .visible()
        .into_iter()
        .map(|t| ListItem::new(task_line(t, today)))
        .collect();

    let mut list_state = ratatui::widgets::ListState::default();
    if !items.is_empty() {
        list_state.select(Some(app.selected.min(items.len() - 1)));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, chunks[3], &mut list_state);

    if needs_input {
        let last = chunks.len() - 1;
        let caret = "|";
        let style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        match app.input_mode {
            InputMode::EditingDescription => {
                let text = if app.input_description.is_empty() {
                    caret.to_string()
                } else {
                    format!("{}{}", app.input_description, caret)
                };
                let widget = Paragraph::new(text)
                    .block(Block::default().borders(Borders::ALL).title("Description"))
                    .style(style)
                    .wrap(Wrap { trim: true });
                f.render_widget(widget, chunks[last]);
            }
            InputMode::EditingPriority => {
                let spans: Vec<Span> = [Priority::Low, Priority::Medium, Priority::High]
                    .iter()
                    .flat_map(|p| {
                        let s = if *p == app.input_priority {
                            Style::default()
                                .fg(Color::Black)
                                .bg(Color::Yellow)
                                .add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(Color::Gray)
                        };
                        [Span::styled(format!(" {} ", p.label()), s), Span::raw("  ")]
                    })
                    .collect();
                let widget = Paragraph::new(Line::from(spans)).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Priority (Left/Right or 1-3)"),
                );
                f.render_widget(widget, chunks[last]);
            }
            InputMode::EditingDueDate => {
                let text = if app.input_due_date.is_empty() {
                    caret.to_string()
                } else {
                    format!("{}{}", app.input_due_date, caret)
                };
                let widget = Paragraph::new(text)
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title("Due (YYYY-MM-DD, today, tomorrow)"),
                    )
                    .style(style)
                    .wrap(Wrap { trim: true });
                f.render_widget(widget, chunks[last]);
            }
            InputMode::Searching => {
                let text = if app.search_query.is_empty() {
                    caret.to_string()
                } else {
                    format!("{}{}", app.search_query, caret)
                };
                let widget = Paragraph::new(text)
                    .block(Block::default().borders(Borders::ALL).title("Search"))
                    .style(style)
                    .wrap(Wrap { trim: true });
                f.render_widget(widget, chunks[last]);
            }
            InputMode::ConfirmingDelete => {
                let desc = app
                    .visible()
                    .get(app.selected)
                    .map(|t| t.description.clone())
                    .unwrap_or_default();
                let widget = Paragraph::new(format!("Delete \"{}\"? [y/n]", desc))
                    .block(Block::default().borders(Borders::ALL).title("Confirm"))
                    .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
                f.render_widget(widget, chunks[last]);
            }
            InputMode::ConfirmingClear => {
                let widget = Paragraph::new("This will permanently clear ALL tasks. Sure? [y/n]")
                    .block(Block::default().borders(Borders::ALL).title("Confirm"))
                    .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
                f.render_widget(widget, chunks[last]);
            }
            _ => {}
        }
    }

    // Show error message if any
    if let Some(ref msg) = app.error_message {
        let error = Paragraph::new(msg.as_str())
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        let area = ratatui::layout::Rect {
            x: size.x,
            y: size.height.saturating_sub(1),
            width: size.width,
            height: 1,
        };
        f.render_widget(error, area);
    }
}

pub fn parse_due_date(input: &str) -> Result<NaiveDate, String> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err("Please enter a due date".to_string());
    }

    let today = Local::now().date_naive();
    match input.as_str() {
        "today" => Ok(today),
        "tomorrow" | "tmr" => Ok(today + Dur::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|_| "Invalid date format. Use YYYY-MM-DD.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_due_date("2025-03-09"),
            Ok(NaiveDate::parse_from_str("2025-03-09", "%Y-%m-%d").unwrap())
        );
        assert_eq!(
            parse_due_date("  2025-12-31  "),
            Ok(NaiveDate::parse_from_str("2025-12-31", "%Y-%m-%d").unwrap())
        );
    }

    #[test]
    fn parses_relative_shorthands() {
        let today = Local::now().date_naive();
        assert_eq!(parse_due_date("today"), Ok(today));
        assert_eq!(parse_due_date("Tomorrow"), Ok(today + Dur::days(1)));
        assert_eq!(parse_due_date("tmr"), Ok(today + Dur::days(1)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_due_date("").is_err());
        assert!(parse_due_date("03/09/2025").is_err());
        assert!(parse_due_date("next sometime").is_err());
        assert!(parse_due_date("2025-13-40").is_err());
    }
}
