//! Marker sigil detection and payload parsing.
//!
//! A marker is a comment line carrying the case-insensitive `cc:` sigil.
//! Whatever follows the sigil is a semicolon-separated payload:
//!
//! ```text
//! cc: <trail>#<step>; <title>; <peek count>; <description>
//! cc: <title>; <peek count>; <description>
//! ```
//!
//! Every field is optional. Parsing is field-by-field and tolerates short
//! or malformed input by keeping whatever parsed so far and defaulting the
//! rest; it never fails the surrounding file scan.

use lazy_static::lazy_static;
use regex::Regex;

/// Separator between payload fields.
const FIELD_SEPARATOR: char = ';';
/// Separator between trail identifier and trail step.
const TRAIL_SEPARATOR: char = '#';

lazy_static! {
    /// The marker sigil, optionally surrounded by single spaces.
    static ref SIGIL: Regex = Regex::new(r"\s?(?i:cc:)\s?").unwrap();
}

/// Locate the marker sigil in a stripped comment line.
///
/// Returns the byte offset just past the sigil (where the payload begins).
pub fn find_sigil(stripped: &str) -> Option<usize> {
    SIGIL.find(stripped).map(|m| m.end())
}

/// Structured fields parsed out of one marker payload.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MarkerFields {
    /// Trail identifier; empty means the crumb is a standalone remark.
    pub trail_id: String,
    /// Position within the trail; meaningful only with a non-empty trail.
    pub trail_step: i64,
    pub title: String,
    /// Number of raw source lines to capture after the marker.
    pub peek_count: usize,
    /// First description line, when a trailing field is present.
    pub description: Option<String>,
}

/// Parse the payload text following the sigil.
///
/// Field 0 is a trail spec only when it contains the `#` separator;
/// otherwise it is the title and the crumb stays a remark. The field after
/// the title is consumed as a peek count only when it parses to a positive
/// integer; otherwise it falls through to the description.
pub fn parse_payload(payload: &str) -> MarkerFields {
    let mut fields = MarkerFields::default();
    let mut parts = payload.split(FIELD_SEPARATOR);

    let first = parts.next().unwrap_or("");
    if let Some((trail, step)) = first.split_once(TRAIL_SEPARATOR) {
        fields.trail_id = trail.trim().to_string();
        fields.trail_step = step.trim().parse().unwrap_or(0);
        fields.title = parts.next().unwrap_or("").trim().to_string();
    } else {
        fields.title = first.trim().to_string();
    }

    let mut next = parts.next();
    if let Some(field) = next {
        if let Ok(count) = field.trim().parse::<i64>() {
            if count > 0 {
                fields.peek_count = count as usize;
                next = parts.next();
            }
        }
    }

    if let Some(field) = next {
        fields.description = Some(field.trim().to_string());
    }

    fields
}
