//! Crumbtrail - document a codebase by putting breadcrumbs in its source.
//!
//! Crumbtrail scans source files across many languages for specially-marked
//! comment lines ("codecrumbs"), reassembles the scattered annotations into
//! ordered narrative trails plus standalone remarks, and renders the result
//! as Markdown or JSON.
//!
//! # Architecture
//!
//! Data flows strictly forward, one pass per stage:
//!
//! - `languages`: immutable registry mapping file extensions to
//!   comment-line patterns
//! - `walk`: deterministic project traversal with include/exclude filters
//! - `scanner`: per-file comment scanning state machine producing crumbs
//! - `marker`: the `cc:` sigil micro-syntax parser
//! - `assemble`: merges per-file crumbs into main trails, side trails and
//!   remarks
//! - `report`: Markdown and JSON generation over the grouped document
//! - `render`: remote Markdown→HTML conversion via the GitHub API
//!
//! # Marker syntax
//!
//! On any recognized comment line:
//!
//! ```text
//! // cc: <trail>#<step>; <title>; <peek lines>; <description>
//! ```
//!
//! All fields are optional; without a `<trail>#<step>` spec the crumb is a
//! standalone remark.

pub mod assemble;
pub mod cli;
pub mod languages;
pub mod marker;
pub mod render;
pub mod report;
pub mod scanner;
pub mod walk;

pub use assemble::{regroup, GroupedCrumbs};
pub use languages::{LanguageDefinition, LanguageRegistry};
pub use marker::{parse_payload, MarkerFields};
pub use render::{GithubRenderer, RenderError};
pub use report::MarkdownGenerator;
pub use scanner::{collect_crumbs, Crumb, ScanError};
pub use walk::{collect_source_files, SourceFile};
