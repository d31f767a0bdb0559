//
//  config.rs
//  Trawl
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TrawlError};
use crate::module::{ModuleName, ShellPatterns};

/// Top-level Trawl configuration (`trawl.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrawlConfig {
    #[serde(default)]
    pub follow: FollowOptions,
    #[serde(default)]
    pub include: IncludeConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub plugins: PluginConfig,
}

/// Inclusion policy. Fixed for the whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowOptions {
    /// Fully self-contained artifact; the only mode that can carry
    /// extension modules.
    pub standalone: bool,
    /// Building an importable module rather than a program.
    pub module_build: bool,
    /// The entry is a package's `__main__`, run as `-m <package>`.
    pub package_mode: Option<String>,
    /// Follow into the standard library.
    pub follow_stdlib: bool,
    pub follow_all: bool,
    pub follow_none: bool,
    /// Module name patterns to always follow.
    pub follow_to: Vec<String>,
    /// Module name patterns to never follow.
    pub nofollow_to: Vec<String>,
    /// Module name patterns that are included as bytecode, not compiled.
    pub bytecode_modules: Vec<String>,
    /// Log every inclusion step.
    pub show_inclusion: bool,
}

impl FollowOptions {
    pub fn in_package_mode(&self) -> bool {
        self.package_mode.is_some()
    }

    /// Package the entry runs in under `-m <package>`.
    pub fn runtime_package(&self) -> Option<ModuleName> {
        self.package_mode.as_deref().map(ModuleName::new)
    }

    /// Reject contradicting options and malformed patterns.
    pub fn validate(&self) -> Result<()> {
        if self.follow_all && self.follow_none {
            return Err(TrawlError::Config(
                "follow_all and follow_none are mutually exclusive".into(),
            ));
        }
        ShellPatterns::new(&self.follow_to)?;
        ShellPatterns::new(&self.nofollow_to)?;
        ShellPatterns::new(&self.bytecode_modules)?;
        Ok(())
    }
}

/// Extra roots seeded independently of the import graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeConfig {
    /// Files, package directories or plain directories.
    pub paths: Vec<String>,
    /// Filename glob patterns.
    pub patterns: Vec<String>,
}

/// Standard library layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directories holding the standard library.
    #[serde(default)]
    pub roots: Vec<String>,
    /// Top-level library packages never pulled in automatically.
    #[serde(default = "default_no_auto_inclusion")]
    pub no_auto_inclusion: Vec<String>,
}

/// Import resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Directories searched for absolute imports, in order.
    #[serde(default)]
    pub paths: Vec<String>,
    /// Modules compiled into the interpreter; imports of them are silent.
    #[serde(default = "default_builtin_modules")]
    pub builtin_modules: Vec<String>,
}

/// Profiling feedback from a previous run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub path: Option<String>,
}

/// Rules for the configuration-driven plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub decisions: Vec<DecisionRule>,
    pub implicit: Vec<ImplicitRule>,
    pub forbid: Vec<ForbidRule>,
    pub bytecode: Vec<String>,
}

/// Authoritative decision for modules matching `pattern`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRule {
    pub pattern: String,
    pub decision: RuleDecision,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleDecision {
    Include,
    Exclude,
    Undecided,
}

/// Modules `module` needs without importing them literally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplicitRule {
    pub module: String,
    pub imports: Vec<String>,
}

/// Following into anything matching `pattern` aborts the run, the import
/// would drag in `avoid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForbidRule {
    pub pattern: String,
    pub avoid: String,
}

fn default_no_auto_inclusion() -> Vec<String> {
    [
        "idlelib",
        "tkinter",
        "turtle",
        "turtledemo",
        "test",
        "lib2to3",
        "ensurepip",
        "venv",
        "pydoc_data",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_builtin_modules() -> Vec<String> {
    [
        "sys",
        "builtins",
        "_imp",
        "_io",
        "_thread",
        "_warnings",
        "_weakref",
        "atexit",
        "errno",
        "gc",
        "itertools",
        "marshal",
        "math",
        "posix",
        "nt",
        "time",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            no_auto_inclusion: default_no_auto_inclusion(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            builtin_modules: default_builtin_modules(),
        }
    }
}

impl TrawlConfig {
    /// Load config from a TOML file. A missing file yields defaults, a
    /// malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Self = toml::from_str(&contents)?;
        config.follow.validate()?;
        Ok(config)
    }

    /// Resolve a configured path relative to the config file's directory.
    pub fn resolve(&self, config_path: &Path, value: &str) -> PathBuf {
        let parent = config_path.parent().unwrap_or(config_path);
        parent.join(value)
    }
}
