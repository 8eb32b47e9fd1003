//! Terminal rendering of register data and session events

use crate::backend::types::{AttendanceRecord, AttendanceView, Student, StudentDetail};
use crate::core::styles::StyleRole;
use crate::session::types::{ScanSessionState, SessionEvent, StatusKind, StatusMessage};
use chrono::{DateTime, Local, NaiveDateTime};
use prettytable::{format, Cell, Row, Table};

const NOT_PROVIDED: &str = "Not provided";
const NO_REMARKS: &str = "No remarks added yet.";
const NO_RECORDS: &str = "No attendance records found.";

fn cell(text: &str, role: StyleRole, color: bool) -> Cell {
    let cell = Cell::new(text);
    match role.to_prettytable_spec() {
        Some(spec) if color => cell.style_spec(spec),
        _ => cell,
    }
}

fn header(titles: &[&str], color: bool) -> Row {
    Row::new(
        titles
            .iter()
            .map(|title| {
                let cell = cell(title, StyleRole::Header, color);
                if color {
                    cell.with_style(prettytable::Attr::Bold)
                } else {
                    cell
                }
            })
            .collect(),
    )
}

fn table(titles: &[&str], color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(header(titles, color));
    table
}

pub fn render_students(students: &[&Student], color: bool) -> String {
    if students.is_empty() {
        return StyleRole::Dim.paint("No students found.", color) + "\n";
    }

    let mut table = table(&["ID", "Name", "Phone", "Remarks"], color);
    for student in students {
        table.add_row(Row::new(vec![
            cell(&student.id.to_string(), StyleRole::Key, color),
            cell(&student.name, StyleRole::Value, color),
            cell(student.tel.as_deref().unwrap_or(""), StyleRole::Value, color),
            cell(student.remarks.as_deref().unwrap_or(""), StyleRole::Dim, color),
        ]));
    }
    table.to_string()
}

pub fn render_student(student: &StudentDetail, color: bool) -> String {
    let key = |k: &str| StyleRole::Key.paint(&format!("{:<8}", k), color);
    let mut out = format!("{}\n", StyleRole::Header.paint(&student.name, color));
    out += &format!("{} {}\n", key("ID:"), student.id);
    out += &format!(
        "{} {}\n",
        key("Tel:"),
        student.tel.as_deref().unwrap_or(NOT_PROVIDED)
    );
    let remarks = match student.remarks.as_deref() {
        Some(remarks) if !remarks.is_empty() => remarks.to_string(),
        _ => StyleRole::Dim.paint(NO_REMARKS, color),
    };
    out += &format!("{} {}\n", key("Remarks:"), remarks);
    if let Some(created_at) = &student.created_at {
        out += &format!("{} {}\n", key("Added:"), format_time(created_at));
    }
    out
}

pub fn render_attendance(records: &[AttendanceRecord], color: bool) -> String {
    if records.is_empty() {
        return StyleRole::Dim.paint(NO_RECORDS, color) + "\n";
    }

    let mut table = table(&["Date", "Time"], color);
    for record in records {
        let (date, time) = split_time(&record.time);
        table.add_row(Row::new(vec![
            cell(&date, StyleRole::Value, color),
            cell(&time, StyleRole::Value, color),
        ]));
    }
    table.to_string()
}

pub fn render_attendance_view(view: &AttendanceView, color: bool) -> String {
    format!(
        "{}\n{}\n{}",
        render_student(&view.student, color),
        StyleRole::Header.paint("Attendance Records", color),
        render_attendance(&view.records, color)
    )
}

/// One line per event; `None` for events the operator does not need to see
pub fn render_event(event: &SessionEvent, color: bool) -> Option<String> {
    match event {
        SessionEvent::Status(message) => Some(render_status(message, color)),
        SessionEvent::StateChanged(ScanSessionState::PermissionPending) => {
            Some(StyleRole::Dim.paint("Waiting for camera permission...", color))
        }
        SessionEvent::StateChanged(ScanSessionState::Submitting) => {
            Some(StyleRole::Dim.paint("Recording attendance...", color))
        }
        SessionEvent::StateChanged(_) => None,
        SessionEvent::Navigate(route) => {
            Some(StyleRole::Dim.paint(&format!("Opening {}", route), color))
        }
    }
}

pub fn render_status(message: &StatusMessage, color: bool) -> String {
    let role = match message.kind {
        StatusKind::Success => StyleRole::Success,
        StatusKind::Error => StyleRole::Error,
        StatusKind::Info => StyleRole::Info,
    };
    role.paint(&message.text, color)
}

/// Local date and time of a backend timestamp
///
/// RFC 3339 timestamps are converted to local time; naive timestamps are
/// taken as already local. Anything else is shown unchanged.
pub fn split_time(raw: &str) -> (String, String) {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        let local = time.with_timezone(&Local);
        return (
            local.format("%Y-%m-%d").to_string(),
            local.format("%H:%M:%S").to_string(),
        );
    }
    if let Ok(time) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return (
            time.format("%Y-%m-%d").to_string(),
            time.format("%H:%M:%S").to_string(),
        );
    }
    (raw.to_string(), String::new())
}

pub fn format_time(raw: &str) -> String {
    match split_time(raw) {
        (date, time) if time.is_empty() => date,
        (date, time) => format!("{} {}", date, time),
    }
}
