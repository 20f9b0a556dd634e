use std::fmt::Write as _;

use chrono::{DateTime, Local};
use ledger::{
    aggregate::day_cell,
    presentation::{present, Presentation},
};
use model::{ids::DayRange, rights::Viewer, session::CalendarSession};

/// Week grid: one block per day, at most two sessions inline plus an
/// overflow line.
pub fn grid(sessions: &[CalendarSession], range: DayRange) -> String {
    let mut out = String::new();
    let mut day = range.from;
    while day < range.to {
        let cell = day_cell(sessions, day.date());
        let _ = writeln!(out, "{} {}", day.week_day(), day);
        if cell.total == 0 {
            let _ = writeln!(out, "  -");
        }
        for session in &cell.inline {
            let _ = writeln!(
                out,
                "  {} {} [{}]",
                session.start_at().format("%H:%M"),
                session.title,
                session.session_type().label()
            );
        }
        if let Some(more) = cell.overflow_label() {
            let _ = writeln!(out, "  {}", more);
        }
        day = day.next();
    }
    out
}

fn line(session: &CalendarSession, presentation: &Presentation) -> String {
    let mut out = format!(
        "{} {}-{} {}",
        session.day_id(),
        session.start_at().format("%H:%M"),
        session.end_time.with_timezone(&Local).format("%H:%M"),
        presentation.title
    );
    if let Some(subtitle) = &presentation.subtitle {
        let _ = write!(out, " / {}", subtitle);
    }
    for meta in &presentation.meta {
        let _ = write!(out, " | {}", meta);
    }
    if let Some(status) = presentation.status {
        let _ = write!(out, " ({})", status.label());
    }
    if !presentation.actions.is_empty() {
        let labels: Vec<&str> = presentation.actions.iter().map(|a| a.label).collect();
        let _ = write!(out, " [{}]", labels.join(", "));
    }
    out
}

/// Session list with the actions the viewer may take.
pub fn list(sessions: &[CalendarSession], viewer: &Viewer, now: DateTime<Local>) -> String {
    let mut out = String::new();
    for session in sessions {
        let presentation = present(session, viewer, now);
        let _ = writeln!(out, "{}", line(session, &presentation));
    }
    out
}
