//! CLI module for Trawl.
//!
//! Commands:
//! - follow: compute the closure of an entry module
//! - decide: explain the inclusion decision for one file

pub mod decide;
pub mod follow;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::builder::{ImportResolver, SourceBuilder};
use crate::config::TrawlConfig;
use crate::hooks::{NoProfile, ProfileFeedback};
use crate::library::StdlibClassifier;
use crate::plugins::ConfigPlugin;
use crate::profile::ProfileData;
use crate::session::Session;

#[derive(Parser)]
#[command(name = "trawl")]
#[command(about = "Trawl - Dependency closure for ahead-of-time compilation", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./trawl.toml, optional)
    #[arg(short, long, default_value = "trawl.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Follow imports from an entry module to a fixed point
    Follow {
        /// Entry module file
        entry: PathBuf,

        #[command(flatten)]
        options: FollowArgs,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the inclusion decision for a single module file
    Decide {
        /// Module file or package directory
        file: PathBuf,

        /// Dotted module name (default: derived from the file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Decide as for an explicitly included path
        #[arg(long)]
        explicit: bool,

        #[command(flatten)]
        options: FollowArgs,
    },
}

impl Commands {
    fn options(&self) -> &FollowArgs {
        match self {
            Commands::Follow { options, .. } | Commands::Decide { options, .. } => options,
        }
    }
}

/// Flags that override the `[follow]`, `[include]` and `[search]` tables.
#[derive(Args, Debug, Default)]
pub struct FollowArgs {
    /// Self-contained build: extension modules are embedded
    #[arg(long)]
    pub standalone: bool,

    /// Build a module instead of a program
    #[arg(long = "module")]
    pub module_build: bool,

    /// Follow all non-library imports
    #[arg(long = "follow-imports")]
    pub follow_all: bool,

    /// Follow no imports unless asked to
    #[arg(long = "nofollow-imports")]
    pub follow_none: bool,

    /// Follow into the standard library
    #[arg(long)]
    pub follow_stdlib: bool,

    /// Always follow modules matching this pattern
    #[arg(long = "follow-to", value_name = "PATTERN")]
    pub follow_to: Vec<String>,

    /// Never follow modules matching this pattern
    #[arg(long = "nofollow-to", value_name = "PATTERN")]
    pub nofollow_to: Vec<String>,

    /// Include a file, package or directory of modules
    #[arg(long = "include-path", value_name = "PATH")]
    pub include_paths: Vec<PathBuf>,

    /// Include every file matching a glob
    #[arg(long = "include-pattern", value_name = "GLOB")]
    pub include_patterns: Vec<String>,

    /// Extra directory to resolve absolute imports in
    #[arg(long = "search-path", value_name = "DIR")]
    pub search_paths: Vec<PathBuf>,

    /// Log every inclusion step
    #[arg(long)]
    pub show_inclusion: bool,
}

impl FollowArgs {
    /// Layer the flags over the loaded configuration. Paths given on the
    /// command line are relative to the working directory.
    pub fn apply(&self, config: &mut TrawlConfig) -> Result<()> {
        let follow = &mut config.follow;
        follow.standalone |= self.standalone;
        follow.module_build |= self.module_build;
        follow.follow_stdlib |= self.follow_stdlib;
        follow.show_inclusion |= self.show_inclusion;
        if self.follow_all {
            follow.follow_all = true;
            follow.follow_none = false;
        }
        if self.follow_none {
            follow.follow_none = true;
            follow.follow_all = false;
        }
        follow.follow_to.extend(self.follow_to.iter().cloned());
        follow.nofollow_to.extend(self.nofollow_to.iter().cloned());

        for path in &self.include_paths {
            config.include.paths.push(absolute(path)?);
        }
        for pattern in &self.include_patterns {
            config.include.patterns.push(absolute(Path::new(pattern))?);
        }
        for path in &self.search_paths {
            config.search.paths.push(absolute(path)?);
        }

        Ok(())
    }
}

fn absolute(path: &Path) -> Result<String> {
    let path = std::path::absolute(path)
        .with_context(|| format!("Cannot make '{}' absolute", path.display()))?;
    Ok(path.to_string_lossy().to_string())
}

/// Directory relative config entries are resolved against.
pub fn config_base(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Load the configuration file and apply command line overrides.
pub fn load_config(config_path: &Path, args: &FollowArgs) -> Result<TrawlConfig> {
    let mut config = TrawlConfig::load(config_path)
        .with_context(|| format!("Failed to load '{}'", config_path.display()))?;
    args.apply(&mut config)?;
    config.follow.validate()?;
    Ok(config)
}

/// Wire the disk-backed collaborators into a session. With an entry, its
/// directory is searched first for absolute imports.
pub fn open_session(
    config: &TrawlConfig,
    config_path: &Path,
    entry: Option<&Path>,
) -> Result<Session> {
    let base = config_base(config_path);

    let mut resolver = ImportResolver::from_config(&config.search, &base);
    if let Some(dir) = entry.and_then(Path::parent) {
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
        resolver.prepend_search_path(dir);
    }

    let builder = SourceBuilder::new(resolver.clone())?;
    let plugins = ConfigPlugin::new(&config.plugins, resolver)?;
    let classifier = StdlibClassifier::from_config(&config.library, &base);

    let profile: Box<dyn ProfileFeedback> = match &config.profile.path {
        Some(path) => {
            let path = config.resolve(config_path, path);
            let data = ProfileData::load(&path)
                .with_context(|| format!("Failed to load profile '{}'", path.display()))?;
            Box::new(data)
        }
        None => Box::new(NoProfile),
    };

    Ok(Session::new(config.follow.clone(), Box::new(builder))?
        .with_plugins(Box::new(plugins))
        .with_classifier(Box::new(classifier))
        .with_profile(profile))
}

/// Install the log subscriber. `RUST_LOG` wins; otherwise warnings only,
/// or inclusion traces with `--show-inclusion`.
pub fn init_tracing(cli: &Cli) {
    let default = if cli.command.options().show_inclusion {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = TrawlConfig::default();
        config.follow.follow_none = true;
        config.follow.follow_to.push("from_file".into());

        let args = FollowArgs {
            follow_all: true,
            follow_to: vec!["from_flag".into()],
            search_paths: vec![PathBuf::from("lib")],
            ..Default::default()
        };
        args.apply(&mut config).unwrap();

        assert!(config.follow.follow_all);
        assert!(!config.follow.follow_none);
        assert_eq!(config.follow.follow_to, vec!["from_file", "from_flag"]);
        assert!(Path::new(&config.search.paths[0]).is_absolute());
        assert!(config.follow.validate().is_ok());
    }

    #[test]
    fn test_config_base() {
        assert_eq!(config_base(Path::new("trawl.toml")), PathBuf::from("."));
        assert_eq!(config_base(Path::new("/etc/app/trawl.toml")), PathBuf::from("/etc/app"));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "trawl",
            "follow",
            "main.py",
            "--follow-imports",
            "--nofollow-to",
            "tests.*",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Follow { entry, options, json } => {
                assert_eq!(entry, PathBuf::from("main.py"));
                assert!(options.follow_all);
                assert_eq!(options.nofollow_to, vec!["tests.*"]);
                assert!(json);
            }
            _ => panic!("expected follow"),
        }
    }
}
