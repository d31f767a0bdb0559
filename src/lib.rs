//! # Trawl
//!
//! Dependency-closure engine for ahead-of-time compilation of dynamically
//! imported module trees.
//!
//! Starting from a program entry and any explicitly included paths, Trawl
//! decides for every reachable module whether it is followed, builds each
//! followed module exactly once, and keeps going until a full pass over
//! the discovered imports adds nothing new.
//!
//! ## Key Features
//!
//! - **Ordered policy**: twelve inclusion rules, first hit wins, memoized per key
//! - **At-most-once builds**: one record per (name, file) identity
//! - **Explicit roots**: files, package trees and glob patterns, walked without recursion
//! - **Fatal forbidden imports**: reported once with the offending file and line
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use trawl::{FollowOptions, ImportResolver, Session, SourceBuilder};
//!
//! let resolver = ImportResolver::new(["app"], &[]);
//! let builder = SourceBuilder::new(resolver).unwrap();
//! let options = FollowOptions {
//!     follow_all: true,
//!     ..Default::default()
//! };
//!
//! let mut session = Session::new(options, Box::new(builder)).unwrap();
//! session.add_entry(Path::new("app/main.py")).unwrap();
//! let report = session.run_to_fixed_point().unwrap();
//! println!("{} modules", report.modules.len());
//! ```

pub mod builder;
pub mod cli;
pub mod closure;
pub mod config;
pub mod consumer;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod library;
pub mod module;
pub mod plugins;
pub mod policy;
pub mod profile;
pub mod recursion;
pub mod registry;
pub mod session;
pub mod walker;

#[cfg(test)]
mod test_utils;

// Re-exports for convenience
pub use builder::{ImportResolver, SourceBuilder};
pub use closure::{ClosureReport, ModuleSummary};
pub use config::{FollowOptions, TrawlConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{ForbiddenImport, ImportSite, Result, TrawlError};
pub use hooks::{LibraryClassifier, ModuleBuilder, Plugins, ProfileFeedback};
pub use library::StdlibClassifier;
pub use module::{ModuleFile, ModuleKind, ModuleName, ModuleRecord};
pub use plugins::ConfigPlugin;
pub use policy::Decision;
pub use profile::ProfileData;
pub use recursion::{ImportCache, NewCode, RecursionRequest};
pub use registry::ModuleRegistry;
pub use session::Session;
