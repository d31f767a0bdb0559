//! Inclusion policy: the tri-state decision and the ordered rules that
//! render it.

mod engine;

pub use engine::DecisionKey;

use serde::Serialize;
use std::fmt;

/// Outcome of the inclusion policy for one module.
///
/// `Undecided` is not `Exclude`: nothing forces the module in here, but
/// another requester may still pull it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "lowercase")]
pub enum Decision {
    Include(String),
    Exclude(String),
    Undecided(String),
}

impl Decision {
    pub fn include(reason: impl Into<String>) -> Self {
        Decision::Include(reason.into())
    }

    pub fn exclude(reason: impl Into<String>) -> Self {
        Decision::Exclude(reason.into())
    }

    pub fn undecided(reason: impl Into<String>) -> Self {
        Decision::Undecided(reason.into())
    }

    pub fn from_bool(include: bool, reason: impl Into<String>) -> Self {
        if include {
            Decision::include(reason)
        } else {
            Decision::exclude(reason)
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Decision::Include(r) | Decision::Exclude(r) | Decision::Undecided(r) => r,
        }
    }

    pub fn is_include(&self) -> bool {
        matches!(self, Decision::Include(_))
    }

    pub fn is_exclude(&self) -> bool {
        matches!(self, Decision::Exclude(_))
    }

    pub fn is_undecided(&self) -> bool {
        matches!(self, Decision::Undecided(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match self {
            Decision::Include(_) => "include",
            Decision::Exclude(_) => "exclude",
            Decision::Undecided(_) => "undecided",
        };
        write!(f, "{}: {}", verdict, self.reason())
    }
}

pub(crate) mod reasons {
    pub const MAIN_NOT_TWICE: &str = "Main program is not followed to a second time.";
    pub const MAIN_IN_PACKAGE: &str = "Main program is already included in package mode.";
    pub const EXTENSION_STANDALONE: &str = "Extension module needed for standalone mode.";
    pub const EXTENSION_NOT_INSPECTABLE: &str = "Extension module cannot be inspected.";
    pub const PROFILE: &str = "PGO based decision";
    pub const EXPLICIT_PATH: &str = "Lives in plug-in directory.";
    pub const FOLLOW_STDLIB: &str = "Instructed by user to follow to standard library.";
    pub const FOLLOW_ALL_NO_AUTO: &str = "Instructed by user to follow all modules, including non-automatic standard library modules.";
    pub const FOLLOW_ALL: &str = "Instructed by user to follow to all non-standard library modules.";
    pub const FOLLOW_NONE: &str = "Instructed by user to not follow at all, not following without request.";
    pub const DEFAULT: &str = "Default behavior in non-standalone mode, not following without request.";
}
