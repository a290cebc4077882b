//! Glob-style filename matching with a single `*` wildcard.
//!
//! Literal characters match exactly (case-sensitive), `*` matches any run of
//! zero or more characters and the whole filename must match.

use regex_lite::{Regex, RegexBuilder};
use tracing::error;

/// A compiled filename pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern`. Fails only when the compiled form exceeds the
    /// regex engine's default size limit.
    pub fn new(pattern: &str) -> Result<Self, regex_lite::Error> {
        Self::build(pattern, RegexBuilder::new(&glob_to_regex(pattern)))
    }

    /// Compile `pattern` with an explicit limit on the compiled size in bytes.
    pub fn with_size_limit(pattern: &str, limit: usize) -> Result<Self, regex_lite::Error> {
        let mut builder = RegexBuilder::new(&glob_to_regex(pattern));
        builder.size_limit(limit);
        Self::build(pattern, builder)
    }

    fn build(pattern: &str, builder: RegexBuilder) -> Result<Self, regex_lite::Error> {
        Ok(Self {
            source: pattern.to_string(),
            regex: builder.build()?,
        })
    }

    pub fn matches(&self, filename: &str) -> bool {
        self.regex.is_match(filename)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let body = pattern
        .split('*')
        .map(regex_lite::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("^(?s:{body})$")
}

/// A set of patterns; a filename matches if any member does.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile every pattern. One that fails to compile is logged and left
    /// out, so it matches nothing.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match Pattern::new(p.as_ref()) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    error!(pattern = p.as_ref(), error = %e, "Invalid file pattern, skipping");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn matches_any(&self, filename: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(filename))
    }

    /// Patterns that match `filename`, in declaration order.
    pub fn matching(&self, filename: &str) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|p| p.matches(filename))
            .map(|p| p.as_str().to_string())
            .collect()
    }

    pub fn sources(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.as_str().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Check whether `filename` matches `pattern`.
/// A pattern that fails to compile matches nothing.
pub fn matches(filename: &str, pattern: &str) -> bool {
    Pattern::new(pattern).is_ok_and(|p| p.matches(filename))
}

/// Check whether `filename` matches any of `patterns`.
pub fn matches_any<S: AsRef<str>>(filename: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|p| matches(filename, p.as_ref()))
}
