//! Comment scanning state machine.
//!
//! Turns one file's lines into an ordered sequence of [`Crumb`]s. The
//! scanner only looks at line-level comment prefixes; it never parses the
//! host language. Two booleans drive it: whether the current line run is a
//! comment block, and whether a marker is open inside that block.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::languages::LanguageDefinition;
use crate::marker::{self, MarkerFields};

/// Errors that abort extraction for a single file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Two marker sigils inside one uninterrupted comment run. Fatal for
    /// the file only; the caller skips the file and continues the walk.
    #[error("cannot place a second marker in the same comment block (line {line})")]
    DuplicateMarker { line: usize },
}

/// One extracted annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crumb {
    /// Opaque identifier, unique within a run.
    pub id: String,
    pub title: String,
    /// Empty means the crumb is a standalone remark.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trail_id: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub trail_step: i64,
    pub desc_lines: Vec<String>,
    pub source_path: String,
    /// 1-based line number of the line carrying the marker sigil.
    pub source_line: usize,
    /// Peek lines still owed to this crumb; drained during the scan.
    #[serde(skip)]
    pub peek_remaining: usize,
    /// Raw source lines captured after the marker, verbatim.
    pub peeked_lines: Vec<String>,
    #[serde(rename = "lang_name")]
    pub language_name: String,
}

fn is_zero(step: &i64) -> bool {
    *step == 0
}

static NEXT_CRUMB_ID: AtomicU64 = AtomicU64::new(1);

fn next_crumb_id() -> String {
    format!("crumb-{:08x}", NEXT_CRUMB_ID.fetch_add(1, Ordering::Relaxed))
}

impl Crumb {
    fn open(source_path: &str, language_name: &str, source_line: usize) -> Self {
        Self {
            id: next_crumb_id(),
            title: String::new(),
            trail_id: String::new(),
            trail_step: 0,
            desc_lines: Vec::new(),
            source_path: source_path.to_string(),
            source_line,
            peek_remaining: 0,
            peeked_lines: Vec::new(),
            language_name: language_name.to_string(),
        }
    }

    fn apply(&mut self, fields: MarkerFields) {
        self.trail_id = fields.trail_id;
        self.trail_step = fields.trail_step;
        self.title = fields.title;
        self.peek_remaining = fields.peek_count;
        if let Some(desc) = fields.description {
            self.desc_lines.push(desc);
        }
    }

    /// Whether this crumb belongs to a named trail.
    pub fn is_trail(&self) -> bool {
        !self.trail_id.is_empty()
    }
}

/// Scan one file's content for crumbs, in source order.
///
/// For each line: a comment-line match opens or extends a comment block; a
/// sigil inside it opens a crumb; further comment lines extend the open
/// crumb's description; the first non-comment line finalizes it. Peek
/// capture is purely positional: every line, comment or code, is appended
/// to each already finalized crumb that still owes peek lines. A crumb
/// left open at end of input is finalized as well.
pub fn collect_crumbs(
    source_path: &str,
    lang: &LanguageDefinition,
    content: &str,
) -> Result<Vec<Crumb>, ScanError> {
    let mut in_comment = false;
    let mut marker_open = false;

    let mut crumbs: Vec<Crumb> = Vec::new();
    let mut current: Option<Crumb> = None;

    for (idx, raw_line) in content.lines().enumerate() {
        let line_number = idx + 1;

        if let Some(stripped) = lang.match_comment(raw_line) {
            in_comment = true;
            if let Some(payload_start) = marker::find_sigil(stripped) {
                if marker_open {
                    return Err(ScanError::DuplicateMarker { line: line_number });
                }
                marker_open = true;
                let mut crumb = Crumb::open(source_path, lang.name, line_number);
                crumb.apply(marker::parse_payload(&stripped[payload_start..]));
                current = Some(crumb);
            } else if marker_open {
                if let Some(crumb) = current.as_mut() {
                    crumb.desc_lines.push(stripped.to_string());
                }
            }
        } else if in_comment {
            // The comment run just ended.
            in_comment = false;
            if marker_open {
                marker_open = false;
                if let Some(crumb) = current.take() {
                    crumbs.push(crumb);
                }
            }
        }

        // Positional peek capture for finalized crumbs, on every line.
        for prev in crumbs.iter_mut() {
            if prev.peek_remaining > 0 {
                prev.peek_remaining -= 1;
                prev.peeked_lines.push(raw_line.to_string());
            }
        }
    }

    // File ended inside a comment run with a marker still open.
    if let Some(crumb) = current.take() {
        crumbs.push(crumb);
    }

    Ok(crumbs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::LanguageRegistry;

    fn scan(content: &str) -> Result<Vec<Crumb>, ScanError> {
        let registry = LanguageRegistry::builtin();
        let go = registry.lookup("go").unwrap();
        collect_crumbs("pkg/file.go", go, content)
    }

    #[test]
    fn test_no_markers_yields_nothing() {
        let crumbs = scan("package main\n\n// plain comment\nfunc main() {}\n").unwrap();
        assert!(crumbs.is_empty());
    }

    #[test]
    fn test_single_trail_marker() {
        let crumbs = scan(
            "package main\n\
             // cc: checkout#1; Start; Begin checkout flow\n\
             func main() {}\n",
        )
        .unwrap();
        assert_eq!(crumbs.len(), 1);
        let crumb = &crumbs[0];
        assert_eq!(crumb.trail_id, "checkout");
        assert_eq!(crumb.trail_step, 1);
        assert_eq!(crumb.title, "Start");
        assert_eq!(crumb.desc_lines, vec!["Begin checkout flow"]);
        assert_eq!(crumb.source_line, 2);
        assert_eq!(crumb.source_path, "pkg/file.go");
        assert_eq!(crumb.language_name, "Go");
        assert!(crumb.peeked_lines.is_empty());
    }

    #[test]
    fn test_continuation_lines_extend_description() {
        let crumbs = scan(
            "// cc: trail#2; Title; first line\n\
             // second line\n\
             // third line\n\
             code()\n",
        )
        .unwrap();
        assert_eq!(crumbs.len(), 1);
        assert_eq!(
            crumbs[0].desc_lines,
            vec!["first line", "second line", "third line"]
        );
    }

    #[test]
    fn test_peek_capture_after_block() {
        // Scenario: remark requesting two peek lines captures the two raw
        // lines following the comment block, verbatim.
        let crumbs = scan(
            "// cc: Validate input; 2; trims whitespace\n\
             a()\n\
             b()\n\
             c()\n",
        )
        .unwrap();
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].peeked_lines, vec!["a()", "b()"]);
        assert_eq!(crumbs[0].peek_remaining, 0);
    }

    #[test]
    fn test_peek_capture_spans_comment_boundaries() {
        // Capture is positional: it keeps going into a subsequent comment
        // block, raw lines unstripped.
        let crumbs = scan(
            "// cc: First; 3\n\
             code()\n\
             // cc: Second\n\
             more()\n",
        )
        .unwrap();
        assert_eq!(crumbs.len(), 2);
        assert_eq!(
            crumbs[0].peeked_lines,
            vec!["code()", "// cc: Second", "more()"]
        );
    }

    #[test]
    fn test_peek_truncated_by_end_of_file() {
        let crumbs = scan("// cc: Note; 5\nonly()\n").unwrap();
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].peeked_lines, vec!["only()"]);
        assert_eq!(crumbs[0].peek_remaining, 4);
    }

    #[test]
    fn test_marker_open_at_end_of_file() {
        let crumbs = scan("func f() {}\n// cc: tail#9; Last words\n").unwrap();
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].trail_id, "tail");
        assert_eq!(crumbs[0].source_line, 2);
    }

    #[test]
    fn test_duplicate_marker_in_one_block() {
        let err = scan(
            "// cc: one#1; First\n\
             // cc: one#2; Second\n\
             code()\n",
        )
        .unwrap_err();
        assert_eq!(err, ScanError::DuplicateMarker { line: 2 });
    }

    #[test]
    fn test_markers_in_separate_blocks_are_fine() {
        let crumbs = scan(
            "// cc: one#1; First\n\
             code()\n\
             // cc: one#2; Second\n\
             more()\n",
        )
        .unwrap();
        assert_eq!(crumbs.len(), 2);
        assert_eq!(crumbs[0].trail_step, 1);
        assert_eq!(crumbs[1].trail_step, 2);
    }

    #[test]
    fn test_crumb_count_matches_marker_count() {
        let content = "\
// cc: a#1; One
x()
// cc: b#1; Two
y()
// plain comment
// cc: Three
z()
";
        let crumbs = scan(content).unwrap();
        assert_eq!(crumbs.len(), 3);
        for crumb in &crumbs {
            let marker_line = content.lines().nth(crumb.source_line - 1).unwrap();
            assert!(marker_line.contains("cc:"));
        }
    }

    #[test]
    fn test_sigil_is_case_insensitive() {
        let crumbs = scan("// CC: loud#1; Shouted\nx()\n").unwrap();
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].trail_id, "loud");
    }

    #[test]
    fn test_ids_are_unique() {
        let crumbs = scan("// cc: a\nx()\n// cc: b\ny()\n").unwrap();
        assert_ne!(crumbs[0].id, crumbs[1].id);
    }
}
