//! Wildcard patterns that decide which files under a root are resources.
//!
//! `*` matches any run of characters except `/`, `**` matches anything,
//! `?` matches one character except `/`, and a leading `!` negates the
//! pattern. Patterns without a `/` are matched against the file name, the
//! others against the path relative to the root.

use std::path::Path;

use regex::Regex;

use crate::error::BuildError;

#[derive(Debug, Clone)]
struct CompiledPattern {
    regex: Regex,
    whole_path: bool,
}

impl CompiledPattern {
    fn matches(&self, relative: &str) -> bool {
        if self.whole_path {
            self.regex.is_match(relative)
        } else {
            let name = relative.rsplit('/').next().unwrap_or(relative);
            self.regex.is_match(name)
        }
    }
}

/// A compiled list of resource patterns.
#[derive(Debug, Clone, Default)]
pub struct ResourcePatterns {
    positive: Vec<CompiledPattern>,
    negated: Vec<CompiledPattern>,
}

impl ResourcePatterns {
    /// Compiles `patterns`, skipping blank entries.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, BuildError> {
        let mut compiled = Self::default();
        for pattern in patterns.iter().map(|p| p.as_ref().trim()) {
            if pattern.is_empty() {
                continue;
            }
            let (negate, body) = match pattern.strip_prefix('!') {
                Some(body) => (true, body),
                None => (false, pattern),
            };
            let regex =
                Regex::new(&wildcard_to_regex(body)).map_err(|e| BuildError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
            let entry = CompiledPattern {
                regex,
                whole_path: body.contains('/'),
            };
            if negate {
                compiled.negated.push(entry);
            } else {
                compiled.positive.push(entry);
            }
        }
        Ok(compiled)
    }

    /// Returns `true` if the file at `relative` (relative to its root) is a
    /// resource.
    ///
    /// Any positive match makes the file a resource. Otherwise, when negated
    /// patterns exist, the file is a resource unless one of them matches.
    pub fn is_resource(&self, relative: &Path) -> bool {
        let relative = relative.to_string_lossy().replace('\\', "/");
        if self.positive.iter().any(|p| p.matches(&relative)) {
            return true;
        }
        !self.negated.is_empty() && !self.negated.iter().any(|p| p.matches(&relative))
    }
}

fn wildcard_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2 + 2);
    regex.push('^');
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                regex.push_str(".*");
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            other => regex.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    regex.push('$');
    regex
}
