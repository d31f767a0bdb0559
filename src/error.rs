//! Error types for Trawl.
//!
//! Only forbidden imports and internal invariant violations abort a run.
//! Everything else the engine meets (unresolved imports, denied explicit
//! inclusions, empty patterns) is logged and skipped, never returned here.

use std::fmt;
use std::path::PathBuf;

use crate::module::{ModuleName, SourceRef};

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TrawlError>;

#[derive(Debug, thiserror::Error)]
pub enum TrawlError {
    #[error("{0}")]
    ForbiddenImport(ForbiddenImport),

    #[error("Internal error, invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Syntax error in '{}': {message}", path.display())]
    Syntax { path: PathBuf, message: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TrawlError {
    /// Attribute a forbidden import raised somewhere below an import edge
    /// to that edge. Other errors pass through untouched.
    pub fn at_import(self, importer: &ModuleName, location: &SourceRef) -> Self {
        match self {
            TrawlError::ForbiddenImport(mut forbidden) => {
                if forbidden.site == ImportSite::Unattributed {
                    forbidden.site = ImportSite::Explicit {
                        importer: importer.clone(),
                        location: location.clone(),
                    };
                }
                TrawlError::ForbiddenImport(forbidden)
            }
            other => other,
        }
    }

    /// Same as [`TrawlError::at_import`] for imports a plugin declared.
    pub fn implicit_in(self, importer: &ModuleName) -> Self {
        match self {
            TrawlError::ForbiddenImport(mut forbidden) => {
                if forbidden.site == ImportSite::Unattributed {
                    forbidden.site = ImportSite::Implicit {
                        importer: importer.clone(),
                    };
                }
                TrawlError::ForbiddenImport(forbidden)
            }
            other => other,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TrawlError::ForbiddenImport(_) | TrawlError::InvariantViolation(_)
        )
    }
}

/// Where a forbidden import was met.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSite {
    Unattributed,
    Explicit {
        importer: ModuleName,
        location: SourceRef,
    },
    Implicit {
        importer: ModuleName,
    },
}

/// A policy says `module` must not be imported, because doing so would
/// pull in `avoiding`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenImport {
    pub module: ModuleName,
    pub avoiding: String,
    pub site: ImportSite,
}

impl ForbiddenImport {
    pub fn new(module: ModuleName, avoiding: impl Into<String>) -> Self {
        Self {
            module,
            avoiding: avoiding.into(),
            site: ImportSite::Unattributed,
        }
    }
}

impl fmt::Display for ForbiddenImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error, forbidden import of '{}' (intending to avoid '{}')",
            self.module, self.avoiding
        )?;
        match &self.site {
            ImportSite::Unattributed => write!(f, " encountered."),
            ImportSite::Explicit { importer, location } => write!(
                f,
                " in module '{}' at '{}' encountered.",
                importer, location
            ),
            ImportSite::Implicit { importer } => {
                write!(f, " done implicitly by module '{}'.", importer)
            }
        }
    }
}

impl From<ForbiddenImport> for TrawlError {
    fn from(forbidden: ForbiddenImport) -> Self {
        TrawlError::ForbiddenImport(forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_message_explicit() {
        let err: TrawlError = ForbiddenImport::new(ModuleName::new("setuptools"), "setuptools").into();
        let err = err.at_import(
            &ModuleName::new("app.build"),
            &SourceRef::new("/src/app/build.py", 12),
        );

        assert_eq!(
            err.to_string(),
            "Error, forbidden import of 'setuptools' (intending to avoid 'setuptools') \
             in module 'app.build' at '/src/app/build.py:12' encountered."
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_forbidden_message_implicit() {
        let err: TrawlError = ForbiddenImport::new(ModuleName::new("IPython"), "IPython").into();
        let err = err.implicit_in(&ModuleName::new("matplotlib"));

        assert_eq!(
            err.to_string(),
            "Error, forbidden import of 'IPython' (intending to avoid 'IPython') \
             done implicitly by module 'matplotlib'."
        );
    }

    #[test]
    fn test_first_attribution_wins() {
        let err: TrawlError = ForbiddenImport::new(ModuleName::new("a"), "b").into();
        let err = err
            .at_import(&ModuleName::new("first"), &SourceRef::new("/x.py", 1))
            .implicit_in(&ModuleName::new("second"));

        assert!(err.to_string().contains("in module 'first'"));
    }

    #[test]
    fn test_non_fatal_passes_through() {
        let err = TrawlError::Config("bad".into());
        let err = err.at_import(&ModuleName::new("m"), &SourceRef::new("/m.py", 3));
        assert!(matches!(err, TrawlError::Config(_)));
        assert!(!err.is_fatal());
    }
}
