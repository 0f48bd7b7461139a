//! Output formatting for the grouped document.
//!
//! Supports two output formats:
//! - Markdown: GitHub-flavored document with a table of contents, one
//!   section per trail, source links and peek code blocks
//! - JSON: structured output for programmatic consumption

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::assemble::GroupedCrumbs;
use crate::scanner::Crumb;

/// Serialize the grouped document as pretty-printed JSON.
pub fn render_json(grouped: &GroupedCrumbs) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(grouped)?)
}

/// Renders the grouped document into one Markdown document.
pub struct MarkdownGenerator {
    project_name: String,
    source_prefix: String,
}

impl MarkdownGenerator {
    pub fn new(project_name: &str, source_prefix: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            source_prefix: source_prefix.to_string(),
        }
    }

    /// Render the full document: stats header, table of contents, then the
    /// main trails, side trails and remarks sections.
    pub fn render_document(&self, grouped: &GroupedCrumbs) -> String {
        let mut buf = String::new();

        let stats_main = grouped.main_trails.len();
        let stats_side = grouped.side_trails.len();
        let stats_remarks = grouped.remarks.len();
        let stats_total = grouped.total();

        let _ = writeln!(buf, "# {}\n", title_case(&self.project_name));
        let _ = writeln!(
            buf,
            "❓ This document has been generated using [crumbtrail](https://github.com/xlab/crumbtrail) \
             tool. Running for **{}** project it found **{}** codecrumbs in total. There are **{}** main \
             trails of codecrumbs, that are crossing the project's entrypoint, also **{}** side trails \
             and **{}** standalone remarks.\n",
            self.project_name, stats_total, stats_main, stats_side, stats_remarks
        );

        self.render_toc(&mut buf, grouped);

        if !grouped.main_trails.is_empty() {
            let _ = writeln!(buf, "## Main Trails\n");
            for (name, trail) in &grouped.main_trails {
                self.render_trail(&mut buf, name, trail);
            }
        }
        if !grouped.side_trails.is_empty() {
            let _ = writeln!(buf, "## Side Trails\n");
            for (name, trail) in &grouped.side_trails {
                self.render_trail(&mut buf, name, trail);
            }
        }
        if !grouped.remarks.is_empty() {
            let _ = writeln!(buf, "## Remarks\n");
            for crumb in &grouped.remarks {
                let _ = writeln!(buf, "### {}\n", remark_heading(crumb));
                self.render_crumb_body(&mut buf, crumb);
            }
        }

        buf
    }

    fn render_toc(&self, buf: &mut String, grouped: &GroupedCrumbs) {
        if !grouped.main_trails.is_empty() {
            let _ = writeln!(buf, "- [Main Trails]({})", anchor("Main Trails"));
            for name in grouped.main_trails.keys() {
                let _ = writeln!(buf, "  - [{}]({})", title_case(name), anchor(name));
            }
        }
        if !grouped.side_trails.is_empty() {
            let _ = writeln!(buf, "- [Side Trails]({})", anchor("Side Trails"));
            for name in grouped.side_trails.keys() {
                let _ = writeln!(buf, "  - [{}]({})", title_case(name), anchor(name));
            }
        }
        if !grouped.remarks.is_empty() {
            // Duplicate headings get suffixed anchors, the way GitHub
            // de-duplicates them.
            let mut anchors_seen: HashMap<String, usize> = HashMap::new();
            let _ = writeln!(buf, "- [Remarks]({})", anchor("Remarks"));
            for crumb in &grouped.remarks {
                let title = remark_heading(crumb);
                let mut anchor_title = anchor(&title);
                let seen = anchors_seen.entry(anchor_title.clone()).or_insert(0);
                if *seen > 0 {
                    anchor_title = format!("{}-{}", anchor_title, seen);
                }
                *seen += 1;
                let _ = writeln!(buf, "  - [{}]({})", title, anchor_title);
            }
        }
        let _ = writeln!(buf);
    }

    fn render_trail(&self, buf: &mut String, name: &str, trail: &[Crumb]) {
        let _ = writeln!(buf, "### {}\n", title_case(name));
        let _ = writeln!(buf, "~~~");
        let _ = write!(buf, "{}", trail_map(trail));
        let _ = writeln!(buf, "~~~\n");

        for crumb in trail {
            if crumb.title.is_empty() {
                let _ = writeln!(buf, "#### {}.\n", crumb.trail_step);
            } else {
                let _ = writeln!(
                    buf,
                    "#### {}. {}\n",
                    crumb.trail_step,
                    title_case(&crumb.title)
                );
            }
            self.render_crumb_body(buf, crumb);
        }
    }

    fn render_crumb_body(&self, buf: &mut String, crumb: &Crumb) {
        if !crumb.desc_lines.is_empty() {
            for line in &crumb.desc_lines {
                let _ = writeln!(buf, "{}", line);
            }
            let _ = writeln!(buf);
        }
        let _ = writeln!(
            buf,
            "📖 [{}:{}]({}#L{})\n",
            crumb.source_path,
            crumb.source_line,
            join_prefix_path(&self.source_prefix, &crumb.source_path),
            crumb.source_line
        );
        if !crumb.peeked_lines.is_empty() {
            let lines = dedent(&crumb.peeked_lines);
            let _ = writeln!(buf, "~~~{}", crumb.language_name.to_lowercase());
            for line in &lines {
                let _ = writeln!(buf, "{}", line);
            }
            let _ = writeln!(buf, "~~~\n");
        }
    }
}

fn remark_heading(crumb: &Crumb) -> String {
    if crumb.title.is_empty() {
        format!("L{}", crumb.source_line)
    } else {
        format!("L{}: {}", crumb.source_line, title_case(&crumb.title))
    }
}

/// Expand the source prefix into a link base for a file path.
///
/// GitHub prefixes turn into blob links; anything else is plain
/// concatenation.
fn join_prefix_path(prefix: &str, path: &str) -> String {
    if let Some(rest) = prefix.strip_prefix("https://github.com") {
        let rest = rest.trim_matches('/');
        let prefix_parts: Vec<&str> = rest.split('/').filter(|p| !p.is_empty()).collect();
        if prefix_parts.len() == 1 {
            // Prefix names only the org; the repo is the first path segment.
            let (repo, file) = match path.split_once('/') {
                Some((repo, file)) => (repo, file),
                None => (path, ""),
            };
            return format!(
                "https://github.com/{}/{}/blob/master/{}",
                prefix_parts[0], repo, file
            );
        }
        return format!("https://github.com/{}/blob/master/{}", rest, path);
    }
    format!("{}{}", prefix, path)
}

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\w+").unwrap();
}

/// Build a GitHub heading anchor from a title.
fn anchor(title: &str) -> String {
    let words: Vec<String> = WORD
        .find_iter(title)
        .map(|m| m.as_str().to_lowercase())
        .collect();
    format!("#{}", words.join("-"))
}

/// Capitalize the first letter of each whitespace-separated word.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Compact file/step outline shown above each trail. Each new file nests
/// one level under the file before it; revisited files keep their level.
fn trail_map(trail: &[Crumb]) -> String {
    let mut out = String::new();
    let mut depths: HashMap<&str, usize> = HashMap::new();
    let mut current_file: Option<&str> = None;
    let mut current_depth = 0usize;

    for crumb in trail {
        let path = crumb.source_path.as_str();
        if current_file != Some(path) {
            let depth = match depths.get(path) {
                Some(&d) => d,
                None => {
                    let d = if current_file.is_none() {
                        0
                    } else {
                        current_depth + 1
                    };
                    depths.insert(path, d);
                    d
                }
            };
            current_file = Some(path);
            current_depth = depth;
            let base = path.rsplit('/').next().unwrap_or(path);
            let _ = writeln!(out, "{}{}", "    ".repeat(depth), base);
        }
        let _ = writeln!(
            out,
            "{}└── [#{}]  {}",
            "    ".repeat(current_depth),
            crumb.trail_step,
            title_case(&crumb.title)
        );
    }
    out
}

/// Strip the indentation common to all peek lines: whole tabs first, then
/// whole spaces.
fn dedent(lines: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = lines.to_vec();
    for prefix in ['\t', ' '] {
        while !lines.is_empty() && lines.iter().all(|l| l.starts_with(prefix)) {
            for line in lines.iter_mut() {
                line.remove(0);
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::regroup;
    use crate::languages::LanguageRegistry;
    use crate::scanner::collect_crumbs;

    #[test]
    fn test_anchor() {
        assert_eq!(anchor("Main Trails"), "#main-trails");
        assert_eq!(anchor("L12: Some Title"), "#l12-some-title");
        assert_eq!(anchor("weird!!punct"), "#weird-punct");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("checkout flow"), "Checkout Flow");
        assert_eq!(title_case("already Caps"), "Already Caps");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_join_prefix_path_plain() {
        assert_eq!(
            join_prefix_path("https://example.com/src/", "a/b.go"),
            "https://example.com/src/a/b.go"
        );
        assert_eq!(join_prefix_path("", "a/b.go"), "a/b.go");
    }

    #[test]
    fn test_join_prefix_path_github_org_repo() {
        assert_eq!(
            join_prefix_path("https://github.com/acme/tool", "core/main.go"),
            "https://github.com/acme/tool/blob/master/core/main.go"
        );
    }

    #[test]
    fn test_join_prefix_path_github_org_only() {
        // First path segment is taken as the repository name.
        assert_eq!(
            join_prefix_path("https://github.com/acme", "tool/core/main.go"),
            "https://github.com/acme/tool/blob/master/core/main.go"
        );
    }

    #[test]
    fn test_dedent_tabs_then_spaces() {
        let lines = vec!["\t\t  a".to_string(), "\t\t  b".to_string()];
        assert_eq!(dedent(&lines), vec!["a", "b"]);

        let mixed = vec!["\tfoo".to_string(), "bar".to_string()];
        assert_eq!(dedent(&mixed), vec!["\tfoo", "bar"]);
    }

    fn sample_grouped() -> GroupedCrumbs {
        let registry = LanguageRegistry::builtin();
        let go = registry.lookup("go").unwrap();
        let main = collect_crumbs(
            "cmd/main.go",
            go,
            "// cc: checkout#1; Start; Begin checkout flow\nrun()\n// cc: A note; 1\npeek()\n",
        )
        .unwrap();
        let helper = collect_crumbs(
            "core/helpers.go",
            go,
            "// cc: checkout#2; Finish\ndone()\n// cc: util#1; Side thing\nx()\n",
        )
        .unwrap();
        regroup("cmd/main.go", vec![main, helper])
    }

    #[test]
    fn test_render_document_sections() {
        let grouped = sample_grouped();
        let doc = MarkdownGenerator::new("demo", "").render_document(&grouped);

        assert!(doc.starts_with("# Demo\n"));
        assert!(doc.contains("## Main Trails"));
        assert!(doc.contains("### Checkout"));
        assert!(doc.contains("#### 1. Start"));
        assert!(doc.contains("#### 2. Finish"));
        assert!(doc.contains("## Side Trails"));
        assert!(doc.contains("### Util"));
        assert!(doc.contains("## Remarks"));
        assert!(doc.contains("📖 [cmd/main.go:1](cmd/main.go#L1)"));
        assert!(doc.contains("~~~go\npeek()\n~~~"));
    }

    #[test]
    fn test_trail_map_nests_files() {
        let grouped = sample_grouped();
        let map = trail_map(&grouped.main_trails["checkout"]);
        assert_eq!(
            map,
            "main.go\n└── [#1]  Start\n    helpers.go\n    └── [#2]  Finish\n"
        );
    }

    #[test]
    fn test_duplicate_remark_anchors_are_suffixed() {
        let registry = LanguageRegistry::builtin();
        let go = registry.lookup("go").unwrap();
        // Two remarks with identical titles on the same line of different
        // files produce identical headings.
        let a = collect_crumbs("a.go", go, "// cc: Same note\nx()\n").unwrap();
        let b = collect_crumbs("b.go", go, "// cc: Same note\nx()\n").unwrap();
        let grouped = regroup("", vec![a, b]);
        let doc = MarkdownGenerator::new("demo", "").render_document(&grouped);

        assert!(doc.contains("(#l1-same-note)"));
        assert!(doc.contains("(#l1-same-note-1)"));
    }

    #[test]
    fn test_render_json_field_names() {
        let grouped = sample_grouped();
        let json = render_json(&grouped).unwrap();
        assert!(json.contains("\"main_trails\""));
        assert!(json.contains("\"side_trails\""));
        assert!(json.contains("\"remarks\""));
        assert!(json.contains("\"trail_id\""));
        assert!(json.contains("\"desc_lines\""));
        assert!(json.contains("\"peeked_lines\""));
        assert!(json.contains("\"lang_name\""));
    }
}
