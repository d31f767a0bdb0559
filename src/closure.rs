//
//  closure.rs
//  Trawl
//
//  Created by hak (tharun)
//

//! The outer fixed-point driver.
//!
//! Each pass hands every module queued before the pass to the used-module
//! consumer. Consumption may build further modules, which are queued for
//! the next pass. Discovery is complete after a pass that raised no "new
//! code" signal and left nothing queued.

use serde::Serialize;
use std::path::Path;

use tracing::{debug, info};

use crate::config::IncludeConfig;
use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::module::{CompilationMode, ModuleFile, ModuleKind, ModuleName};
use crate::recursion::NewCode;
use crate::session::Session;

/// A module of the final closure.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSummary {
    pub name: ModuleName,
    pub file: ModuleFile,
    pub kind: ModuleKind,
    pub is_package: bool,
    pub is_root: bool,
    pub compilation: CompilationMode,
}

/// Outcome of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct ClosureReport {
    /// Signals raised per pass; the last entry is always 0.
    pub passes: Vec<usize>,
    pub roots: Vec<ModuleName>,
    pub modules: Vec<ModuleSummary>,
    pub new_code: Vec<NewCode>,
    pub diagnostics: Vec<Diagnostic>,
    pub usage_edges: usize,
}

impl Session {
    /// Run the walker over the configured include paths and patterns.
    /// Relative entries are taken relative to `base`.
    pub fn seed_includes(&mut self, include: &IncludeConfig, base: &Path) -> Result<()> {
        for path in &include.paths {
            self.check_plugin_path(&base.join(path), None)?;
        }

        for pattern in &include.patterns {
            let pattern = if Path::new(pattern).is_absolute() {
                pattern.clone()
            } else {
                base.join(pattern).to_string_lossy().to_string()
            };
            self.check_plugin_filename_pattern(&pattern)?;
        }

        Ok(())
    }

    /// Consume every module queued so far. Returns the number of "new
    /// code" signals raised while doing so.
    pub fn run_pass(&mut self) -> Result<usize> {
        let before = self.changes.len();
        let batch: Vec<_> = self.pending.drain(..).collect();

        debug!(modules = batch.len(), "closure pass");

        for pending in batch {
            self.consider_used_modules(&pending.module, pending.used_modules)?;
        }

        Ok(self.changes.len() - before)
    }

    /// Pass until nothing changes. A forbidden import or an internal
    /// invariant violation stops the run with `Err`.
    pub fn run_to_fixed_point(&mut self) -> Result<ClosureReport> {
        let mut passes = Vec::new();

        loop {
            let signals = self.run_pass()?;
            passes.push(signals);
            if signals == 0 && self.pending.is_empty() {
                break;
            }
        }

        info!(
            passes = passes.len(),
            modules = self.import_cache.len(),
            roots = self.registry.roots().len(),
            "closure complete"
        );

        Ok(self.report(passes))
    }

    fn report(&self, passes: Vec<usize>) -> ClosureReport {
        let modules = self
            .import_cache
            .modules()
            .into_iter()
            .map(|m| ModuleSummary {
                name: m.name.clone(),
                file: m.file.clone(),
                kind: m.kind,
                is_package: m.is_package,
                is_root: self.registry.is_root(&m.key()),
                compilation: self.compilation_mode(&m.name),
            })
            .collect();

        ClosureReport {
            passes,
            roots: self.registry.roots().iter().map(|m| m.name.clone()).collect(),
            modules,
            new_code: self.changes.clone(),
            diagnostics: self.diagnostics.clone(),
            usage_edges: self.registry.usage_count(),
        }
    }
}
