//! Parser for the blood pressure history file
//!
//! The history is a plain text export, one reading per line:
//!
//! ```text
//! 2023/01/01	09:24:20	113	78	84
//! ```
//!
//! date, time, systolic, diastolic, pulse separated by TAB. Anything after
//! the fifth column is ignored. Lines that don't fit are skipped.

use chrono::NaiveDateTime;
use log::trace;

use crate::types::Reading;

const FIELD_DELIMITER: char = '\t';
const MIN_FIELDS: usize = 5;

/// Formats seen in `recorded_at`, tried in order
const RECORDED_AT_FORMATS: [&str; 4] = [
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse one line of the history file.
///
/// Returns None if the line has fewer than five columns or any of the three
/// numeric columns is not an `i32`.
pub fn parse_line(line: &str) -> Option<Reading> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() < MIN_FIELDS {
        trace!("Skipping line with {} fields: {:?}", fields.len(), line);
        return None;
    }

    let date = fields[0].trim();
    let time = fields[1].trim();

    let (Some(systolic), Some(diastolic), Some(pulse)) = (
        parse_value(fields[2]),
        parse_value(fields[3]),
        parse_value(fields[4]),
    ) else {
        trace!("Skipping line with non-numeric values: {:?}", line);
        return None;
    };

    Some(Reading {
        systolic,
        diastolic,
        pulse,
        recorded_at: Some(format!("{} {}", date, time)),
    })
}

fn parse_value(field: &str) -> Option<i32> {
    field.trim().parse().ok()
}

/// Decode the whole history file, keeping file order and dropping bad lines.
pub fn parse_records(raw: &str) -> Vec<Reading> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    // \n, \r\n and a lone \r all end a line
    raw.split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_line)
        .collect()
}

impl Reading {
    /// Interpret `recorded_at` as a local date-time, if it is in a known format.
    pub fn recorded_at_naive(&self) -> Option<NaiveDateTime> {
        let text = self.recorded_at.as_deref()?.trim();
        RECORDED_AT_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    }
}
