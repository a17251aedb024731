//! Ignore rules for traversal.
//!
//! Paths are excluded before they are hashed, so an ignored entry never appears in a
//! tree node. The built-in rules skip version-control metadata (`.git`) and the workspace
//! config file at the root; the root `.gitignore` adds patterns through a minimal parse.

use crate::config::WORKSPACE_CONFIG_FILE;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Built-in ignore patterns
const BUILTIN_DEFAULTS: &[&str] = &[".git"];

/// Decides whether a path, relative to the traversal root, is excluded
pub trait IgnorePredicate: Send + Sync {
    fn is_ignored(&self, relative: &Path) -> bool;
}

impl<F> IgnorePredicate for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn is_ignored(&self, relative: &Path) -> bool {
        self(relative)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    /// Matches the final component name anywhere in the tree
    Name(String),
    /// Matches the whole relative path
    Anchored(String),
}

/// Ordered set of ignore patterns
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    /// Rules that ignore nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// Built-in rules only
    pub fn builtin() -> Self {
        Self::none()
            .with_patterns(BUILTIN_DEFAULTS.iter().copied())
            .with_patterns([format!("/{}", WORKSPACE_CONFIG_FILE)])
    }

    /// Built-in rules plus the patterns of `<root>/.gitignore`, if present
    pub fn for_root(root: &Path) -> Self {
        let patterns = read_gitignore_patterns(root);
        debug!(count = patterns.len(), "Loaded .gitignore patterns");
        Self::builtin().with_patterns(patterns)
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in patterns {
            if let Some(pattern) = parse_pattern(raw.as_ref()) {
                self.patterns.push(pattern);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl IgnorePredicate for IgnoreRules {
    fn is_ignored(&self, relative: &Path) -> bool {
        let Some(name) = relative.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let full = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        self.patterns.iter().any(|pattern| match pattern {
            Pattern::Name(p) => wildcard_match(p.as_bytes(), name.as_bytes()),
            Pattern::Anchored(p) => wildcard_match(p.as_bytes(), full.as_bytes()),
        })
    }
}

/// Read workspace .gitignore into a list of pattern strings (minimal parse: trim, skip empty and #).
pub fn read_gitignore_patterns(root: &Path) -> Vec<String> {
    let gitignore_path = root.join(".gitignore");
    if !gitignore_path.is_file() {
        return Vec::new();
    }
    let Ok(contents) = fs::read_to_string(&gitignore_path) else {
        return Vec::new();
    };
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn parse_pattern(raw: &str) -> Option<Pattern> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    if trimmed.starts_with('!') {
        warn!(pattern = trimmed, "Negated ignore patterns are not supported; skipping");
        return None;
    }

    let body = trimmed.trim_end_matches('/');
    if let Some(anchored) = body.strip_prefix('/') {
        return (!anchored.is_empty()).then(|| Pattern::Anchored(anchored.to_string()));
    }
    if body.contains('/') {
        return Some(Pattern::Anchored(body.to_string()));
    }
    (!body.is_empty()).then(|| Pattern::Name(body.to_string()))
}

/// `*` matches any run of characters and `?` any single character, neither crossing `/`
fn wildcard_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len()
            && (pattern[p] == text[t] || (pattern[p] == b'?' && text[t] != b'/'))
        {
            p += 1;
            t += 1;
        } else if let Some((star, matched)) = backtrack {
            if text[matched] == b'/' {
                return false;
            }
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}
