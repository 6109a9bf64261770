//! Repository name filters
//!
//! Filters are regular expressions that must match a whole repository name.
//! A filter of `foo` therefore never matches `myfoo/bar`.

use regex::Regex;

use crate::error::{ListError, Result};

/// A compiled, fully anchored repository filter
#[derive(Debug, Clone)]
pub struct RepoFilter {
    regex: Regex,
}

impl RepoFilter {
    /// Compile a filter, adding `^` and `$` anchors where missing
    pub fn compile(raw: &str) -> Result<Self> {
        let anchored = anchor(raw);
        let regex = Regex::new(&anchored).map_err(|source| ListError::InvalidPattern {
            pattern: raw.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// The anchored expression actually used for matching
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Check a single repository name
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Keep the matching names, preserving their order
    pub fn apply<'a, I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        names
            .into_iter()
            .filter(|n| self.is_match(n))
            .cloned()
            .collect()
    }
}

fn anchor(raw: &str) -> String {
    let mut anchored = String::with_capacity(raw.len() + 2);
    if !raw.starts_with('^') {
        anchored.push('^');
    }
    anchored.push_str(raw);
    if !raw.ends_with('$') {
        anchored.push('$');
    }
    anchored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_anchoring() {
        assert_eq!(RepoFilter::compile("foo").unwrap().as_str(), "^foo$");
        assert_eq!(RepoFilter::compile("^foo").unwrap().as_str(), "^foo$");
        assert_eq!(RepoFilter::compile("foo$").unwrap().as_str(), "^foo$");
        assert_eq!(RepoFilter::compile("^foo$").unwrap().as_str(), "^foo$");
    }

    #[test]
    fn test_anchoring_is_idempotent() {
        let once = RepoFilter::compile("library/.*").unwrap();
        let twice = RepoFilter::compile(once.as_str()).unwrap();
        assert_eq!(once.as_str(), twice.as_str());
    }

    #[test]
    fn test_unanchored_matches_like_anchored() {
        let plain = RepoFilter::compile("a/.*").unwrap();
        let anchored = RepoFilter::compile("^a/.*$").unwrap();

        for name in ["a/b", "a/", "ba/b", "a", "x/a/b", "a/b/c"] {
            assert_eq!(plain.is_match(name), anchored.is_match(name), "{}", name);
        }
    }

    #[test]
    fn test_no_substring_matches() {
        let filter = RepoFilter::compile("foo").unwrap();
        assert!(filter.is_match("foo"));
        assert!(!filter.is_match("myfoo/bar"));
        assert!(!filter.is_match("foo/bar"));
    }

    #[test]
    fn test_apply_preserves_order() {
        let filter = RepoFilter::compile("a/.*").unwrap();
        let raw = names(&["a/b", "c/d", "a/x"]);
        assert_eq!(filter.apply(&raw), names(&["a/b", "a/x"]));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = RepoFilter::compile("lib/(unclosed").unwrap_err();
        match err {
            ListError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "lib/(unclosed"),
            other => panic!("Expected InvalidPattern, got {:?}", other),
        }
    }
}
