//! API path template matching
//!
//! Grant paths are axum templates (`/api/v1/system/users/{id}`). A template
//! compiles to a regex: literal text is escaped and every `{...}` placeholder
//! matches one non-empty path segment.

use dashmap::DashMap;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How far a template must cover the request path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathMatchMode {
    /// Anchored at both ends
    #[default]
    Exact,
    /// Anchored at the start only; `/a/b` also covers `/a/b/extra`
    Prefix,
}

impl FromStr for PathMatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "prefix" => Ok(Self::Prefix),
            other => Err(format!("unknown path match mode: {other} (expected exact|prefix)")),
        }
    }
}

impl fmt::Display for PathMatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::Prefix => f.write_str("prefix"),
        }
    }
}

/// Compile a path template into an anchored regex
pub fn compile_template(template: &str, mode: PathMatchMode) -> Result<Regex, regex::Error> {
    let mut pattern = String::with_capacity(template.len() + 16);
    pattern.push('^');

    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open..].find('}') else {
            break;
        };
        pattern.push_str(&regex::escape(&rest[..open]));
        pattern.push_str("[^/]+");
        rest = &rest[open + len + 1..];
    }
    // Unbalanced `{` is kept as literal text
    pattern.push_str(&regex::escape(rest));

    if mode == PathMatchMode::Exact {
        pattern.push('$');
    }
    Regex::new(&pattern)
}

/// Compiled template cache
///
/// Grants are few and long-lived, so each distinct template is compiled once
/// per process. A template that fails to compile is cached as `None` and
/// matches nothing. Clones share the same cache.
#[derive(Debug, Clone, Default)]
pub struct TemplateCache {
    mode: PathMatchMode,
    compiled: Arc<DashMap<String, Option<Regex>>>,
}

impl TemplateCache {
    pub fn new(mode: PathMatchMode) -> Self {
        Self {
            mode,
            compiled: Arc::new(DashMap::new()),
        }
    }

    pub fn mode(&self) -> PathMatchMode {
        self.mode
    }

    /// Whether `path` is covered by `template`
    pub fn matches(&self, template: &str, path: &str) -> bool {
        if let Some(entry) = self.compiled.get(template) {
            return entry.as_ref().is_some_and(|re| re.is_match(path));
        }

        let compiled = match compile_template(template, self.mode) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!(template = %template, error = %e, "Invalid api path template");
                None
            }
        };
        let matched = compiled.as_ref().is_some_and(|re| re.is_match(path));
        self.compiled.insert(template.to_string(), compiled);
        matched
    }

    /// Number of distinct templates compiled so far
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact() -> TemplateCache {
        TemplateCache::new(PathMatchMode::Exact)
    }

    #[test]
    fn test_placeholder_matches_one_segment() {
        let cache = exact();
        assert!(cache.matches("/items/{id}", "/items/42"));
        assert!(!cache.matches("/items/{id}", "/items/"));
        assert!(!cache.matches("/items/{id}", "/items/42/x"));
        assert!(cache.matches("/a/{x}/b/{y}", "/a/1/b/2"));
    }

    #[test]
    fn test_exact_vs_prefix() {
        let prefix = TemplateCache::new(PathMatchMode::Prefix);
        assert!(!exact().matches("/a/b", "/a/b/extra"));
        assert!(prefix.matches("/a/b", "/a/b/extra"));
        assert!(exact().matches("/a/b", "/a/b"));
        assert!(!prefix.matches("/a/b", "/x/a/b"));
    }

    #[test]
    fn test_literals_are_escaped() {
        let cache = exact();
        assert!(!cache.matches("/a.b", "/axb"));
        assert!(cache.matches("/a.b", "/a.b"));
        assert!(!cache.matches("/a+", "/aa"));
    }

    #[test]
    fn test_unbalanced_brace_is_literal() {
        let cache = exact();
        assert!(cache.matches("/a/{id", "/a/{id"));
        assert!(!cache.matches("/a/{id", "/a/1"));
    }

    #[test]
    fn test_template_compiled_once() {
        let cache = exact();
        assert!(cache.is_empty());

        for id in 0..50 {
            assert!(cache.matches("/items/{id}", &format!("/items/{id}")));
        }
        assert!(!cache.matches("/items/{id}", "/items"));
        assert_eq!(cache.len(), 1);

        // Clones share compiled templates
        let shared = cache.clone();
        assert!(shared.matches("/users/{id}", "/users/1"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_mode_is_part_of_compiled_pattern() {
        let cache = exact();
        let re = compile_template("/a/{id}", cache.mode()).unwrap();
        assert_eq!(re.as_str(), "^/a/[^/]+$");

        let re = compile_template("/a/{id}", PathMatchMode::Prefix).unwrap();
        assert_eq!(re.as_str(), "^/a/[^/]+");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("EXACT".parse::<PathMatchMode>(), Ok(PathMatchMode::Exact));
        assert_eq!(" prefix ".parse::<PathMatchMode>(), Ok(PathMatchMode::Prefix));
        assert!("fuzzy".parse::<PathMatchMode>().is_err());
    }
}
