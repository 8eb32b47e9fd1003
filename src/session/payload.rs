//! Student identifier extraction from QR payloads
//!
//! Two payload shapes are accepted:
//!
//! - a JSON object carrying the identifier under `id`, `studentId` or
//!   `student_id`, as an integer or a string of decimal digits. Fields that
//!   are null, false, zero or empty are skipped in favour of the next name;
//! - any other text, from which the first run of decimal digits is taken.
//!
//! The identifier must be a positive integer that fits in 64 bits.

use crate::backend::types::StudentId;
use crate::session::error::{PayloadError, PayloadResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const ID_FIELDS: [&str; 3] = ["id", "studentId", "student_id"];

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("digit run pattern"));

/// Interpret a decoded payload as a student reference
///
/// ```rust
/// # use rollcall::session::extract_student_id;
/// assert_eq!(extract_student_id(r#"{"id": 42}"#).unwrap().get(), 42);
/// assert_eq!(extract_student_id("STU-1138-X").unwrap().get(), 1138);
/// assert!(extract_student_id("no numbers here").is_err());
/// ```
pub fn extract_student_id(payload: &str) -> PayloadResult<StudentId> {
    let id = match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(record)) => from_record(&record),
        _ => from_text(payload),
    };
    id.ok_or_else(|| PayloadError::invalid(payload))
}

fn from_record(record: &serde_json::Map<String, Value>) -> Option<StudentId> {
    let value = ID_FIELDS
        .iter()
        .find_map(|field| record.get(*field).filter(|v| !is_blank(v)))?;

    match value {
        Value::Number(n) => match n.as_u64() {
            Some(id) => StudentId::new(id),
            None => n.as_f64().and_then(whole_number).and_then(StudentId::new),
        },
        Value::String(s) if s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok().and_then(StudentId::new)
        }
        _ => None,
    }
}

/// Values that leave the field unset: null, false, zero and the empty string
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// `42.0` is 42; fractions and values past `u64::MAX` are not identifiers
fn whole_number(value: f64) -> Option<u64> {
    const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;
    (value > 0.0 && value.fract() == 0.0 && value < TWO_POW_64).then_some(value as u64)
}

fn from_text(payload: &str) -> Option<StudentId> {
    let run = DIGIT_RUN.find(payload)?;
    if is_negated(&payload[..run.start()]) {
        return None;
    }
    run.as_str().parse().ok().and_then(StudentId::new)
}

/// A `-` right before the digits is a sign only at the start of the payload
/// or after whitespace; `STU-7` is a separator, `-7` and `id -7` are negative.
fn is_negated(prefix: &str) -> bool {
    let Some(before_dash) = prefix.strip_suffix('-') else {
        return false;
    };
    before_dash
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace)
}
