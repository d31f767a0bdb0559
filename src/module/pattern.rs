//! Shell-style pattern sets matched against dotted module names.

use globset::{Glob, GlobMatcher};

use super::name::ModuleName;
use crate::error::{Result, TrawlError};

struct ShellPattern {
    text: String,
    glob: GlobMatcher,
    package_glob: GlobMatcher,
}

/// Ordered list of module name patterns. The first pattern that matches
/// decides, and the returned text says how it matched.
#[derive(Default)]
pub struct ShellPatterns {
    patterns: Vec<ShellPattern>,
}

impl ShellPatterns {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let text = p.as_ref().to_string();
                Ok(ShellPattern {
                    glob: compile(&text)?,
                    package_glob: compile(&format!("{text}.*"))?,
                    text,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Describe the first pattern `name` matches, if any.
    pub fn first_match(&self, name: &ModuleName) -> Option<String> {
        self.patterns.iter().find_map(|p| p.describe_match(name))
    }
}

impl ShellPattern {
    fn describe_match(&self, name: &ModuleName) -> Option<String> {
        let text = &self.text;
        if name.as_str() == text {
            Some(format!("is exact match of '{text}'"))
        } else if name.is_below(text) {
            Some(format!("is package content of '{text}'"))
        } else if self.glob.is_match(name.as_str()) {
            Some(format!("matches pattern '{text}'"))
        } else if self.package_glob.is_match(name.as_str()) {
            Some(format!("is package content of match to pattern '{text}'"))
        } else {
            None
        }
    }
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|e| TrawlError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(patterns: &[&str], name: &str) -> Option<String> {
        ShellPatterns::new(patterns)
            .unwrap()
            .first_match(&ModuleName::new(name))
    }

    #[test]
    fn test_exact_and_below() {
        assert_eq!(
            first(&["numpy"], "numpy").as_deref(),
            Some("is exact match of 'numpy'")
        );
        assert_eq!(
            first(&["numpy"], "numpy.linalg").as_deref(),
            Some("is package content of 'numpy'")
        );
        assert_eq!(first(&["numpy"], "numpyro"), None);
    }

    #[test]
    fn test_glob_and_package_glob() {
        assert_eq!(
            first(&["plugin_*"], "plugin_json").as_deref(),
            Some("matches pattern 'plugin_*'")
        );
        assert_eq!(
            first(&["plugin_?"], "plugin_a.sub").as_deref(),
            Some("is package content of match to pattern 'plugin_?'")
        );
    }

    #[test]
    fn test_first_pattern_wins() {
        assert_eq!(
            first(&["a.*", "a.b"], "a.b").as_deref(),
            Some("matches pattern 'a.*'")
        );
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = ShellPatterns::new(["a[b"]).err().unwrap();
        assert!(matches!(err, TrawlError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_set() {
        let patterns = ShellPatterns::default();
        assert!(patterns.is_empty());
        assert_eq!(patterns.first_match(&ModuleName::new("x")), None);
    }
}
