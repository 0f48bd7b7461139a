//! Built-in language definitions and comment-line matching.
//!
//! The registry is an immutable value constructed once at startup and passed
//! by reference into the scanner. Lookup is by file extension and never
//! fails hard: an unknown extension simply means the file is not scanned.

use regex::Regex;
use std::collections::HashMap;

/// A single supported language: its display name, the file extensions it
/// claims, and the patterns that recognize one of its comment lines.
pub struct LanguageDefinition {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    patterns: Vec<Regex>,
}

impl LanguageDefinition {
    fn new(name: &'static str, extensions: &'static [&'static str], patterns: &[&str]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p).expect("invalid built-in comment pattern"))
            .collect();
        Self {
            name,
            extensions,
            patterns,
        }
    }

    /// Test a line against this language's comment patterns.
    ///
    /// Returns the line with the comment sigil (leading whitespace plus the
    /// comment prefix) stripped when it is a comment line, `None` otherwise.
    pub fn match_comment<'a>(&self, line: &'a str) -> Option<&'a str> {
        for pattern in &self.patterns {
            if let Some(m) = pattern.find(line) {
                return Some(&line[m.end()..]);
            }
        }
        None
    }
}

/// Immutable table mapping file extensions to language definitions.
pub struct LanguageRegistry {
    definitions: Vec<LanguageDefinition>,
    by_extension: HashMap<String, usize>,
}

impl LanguageRegistry {
    /// Build the registry of built-in languages.
    pub fn builtin() -> Self {
        let definitions = vec![
            LanguageDefinition::new("Go", &["go"], &[r"^\s*//\s?"]),
            LanguageDefinition::new("Javascript", &["js", "jsx"], &[r"^\s*//\s?"]),
            LanguageDefinition::new("Typescript", &["ts"], &[r"^\s*//\s?"]),
            LanguageDefinition::new("PHP", &["php"], &[r"^\s*//\s?"]),
            LanguageDefinition::new("Python", &["py"], &[r"^\s*#\s?"]),
            LanguageDefinition::new("Java", &["java"], &[r"^\s*//\s?"]),
            LanguageDefinition::new(
                "C/C++",
                &["c", "h", "cpp", "cxx", "objc", "m"],
                &[r"^\s*//\s?"],
            ),
        ];

        let mut by_extension = HashMap::new();
        for (idx, def) in definitions.iter().enumerate() {
            for ext in def.extensions {
                by_extension.insert(ext.to_lowercase(), idx);
            }
        }

        Self {
            definitions,
            by_extension,
        }
    }

    /// Look up the language claiming the given extension.
    ///
    /// Matching is case-insensitive and tolerates a leading dot.
    pub fn lookup(&self, extension: &str) -> Option<&LanguageDefinition> {
        let ext = extension.trim_start_matches('.').to_lowercase();
        self.by_extension.get(&ext).map(|&idx| &self.definitions[idx])
    }

    /// All registered definitions, in registration order.
    pub fn definitions(&self) -> &[LanguageDefinition] {
        &self.definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        let registry = LanguageRegistry::builtin();
        assert_eq!(registry.lookup("go").unwrap().name, "Go");
        assert_eq!(registry.lookup("GO").unwrap().name, "Go");
        assert_eq!(registry.lookup(".Go").unwrap().name, "Go");
        assert_eq!(registry.lookup("cpp").unwrap().name, "C/C++");
        assert!(registry.lookup("bin").is_none());
    }

    #[test]
    fn test_match_comment_strips_prefix() {
        let registry = LanguageRegistry::builtin();
        let go = registry.lookup("go").unwrap();

        assert_eq!(go.match_comment("// hello"), Some("hello"));
        assert_eq!(go.match_comment("    // indented"), Some("indented"));
        assert_eq!(go.match_comment("//no space"), Some("no space"));
        assert_eq!(go.match_comment("x := 1 // trailing"), None);
        assert_eq!(go.match_comment("fmt.Println()"), None);

        let py = registry.lookup("py").unwrap();
        assert_eq!(py.match_comment("# hello"), Some("hello"));
        assert_eq!(py.match_comment("  #tight"), Some("tight"));
        assert_eq!(py.match_comment("// not python"), None);
    }

    #[test]
    fn test_extension_map_covers_all_definitions() {
        let registry = LanguageRegistry::builtin();
        for def in registry.definitions() {
            for ext in def.extensions {
                assert_eq!(registry.lookup(ext).unwrap().name, def.name);
            }
        }
    }
}
