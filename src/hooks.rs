//! Collaborator contracts the inclusion engine consumes.
//!
//! The engine never parses, classifies library paths or reads profiling
//! data itself. It asks these traits, and treats their answers as fixed
//! for the whole run.

use crate::error::{ForbiddenImport, Result};
use crate::module::{
    CompilationMode, ModuleFile, ModuleKind, ModuleName, ModuleRecord, SourceRef, UsedModule,
};
use crate::policy::Decision;

/// What the recursion driver asks the builder to construct.
#[derive(Debug, Clone)]
pub struct BuildRequest<'a> {
    pub name: &'a ModuleName,
    pub file: &'a ModuleFile,
    pub kind: ModuleKind,
    pub is_top: bool,
    /// Swallow syntax errors (log them, return `Ok(None)`).
    pub hide_syntax_error: bool,
}

/// A freshly constructed module and the imports found in it.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub module: ModuleRecord,
    pub used_modules: Vec<UsedModule>,
    /// `false` when the builder had already produced this module earlier.
    pub newly_built: bool,
}

/// Turns a file into a module record.
pub trait ModuleBuilder {
    /// `Ok(None)` means the module could not be built and the failure was
    /// already reported.
    fn build(&mut self, request: &BuildRequest<'_>) -> Result<Option<BuildOutcome>>;
}

/// A module a plugin says is needed by convention.
#[derive(Debug, Clone)]
pub struct ImplicitImport {
    pub name: ModuleName,
    pub file: Option<ModuleFile>,
    pub kind: ModuleKind,
    pub reason: String,
}

/// Plugin layer. Every method has a no-op default.
pub trait Plugins {
    /// An authoritative decision, or `None` to leave it to the policy.
    fn on_module_encounter(
        &self,
        _file: &ModuleFile,
        _name: &ModuleName,
        _kind: ModuleKind,
    ) -> Option<Decision> {
        None
    }

    /// Called right before a module is built. Cannot veto, only abort.
    fn on_module_recursion(
        &self,
        _file: &ModuleFile,
        _name: &ModuleName,
        _kind: ModuleKind,
        _using_module: Option<&ModuleName>,
        _source_ref: Option<&SourceRef>,
    ) -> std::result::Result<(), ForbiddenImport> {
        Ok(())
    }

    fn consider_implicit_imports(
        &self,
        _module: &ModuleRecord,
    ) -> std::result::Result<Vec<ImplicitImport>, ForbiddenImport> {
        Ok(Vec::new())
    }

    fn decide_compilation(&self, _name: &ModuleName) -> Option<CompilationMode> {
        None
    }
}

/// Plugin layer with nothing loaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPlugins;

impl Plugins for NoPlugins {}

/// Labels modules belonging to the standard library.
pub trait LibraryClassifier {
    fn is_library_path(&self, file: &ModuleFile) -> bool;

    /// Library modules that are only included on explicit request.
    fn is_no_auto_inclusion_module(&self, name: &ModuleName) -> bool;
}

/// Classifier that treats nothing as library code.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLibrary;

impl LibraryClassifier for NoLibrary {
    fn is_library_path(&self, _file: &ModuleFile) -> bool {
        false
    }

    fn is_no_auto_inclusion_module(&self, _name: &ModuleName) -> bool {
        false
    }
}

/// Inclusion feedback recorded by a previous profiled run.
pub trait ProfileFeedback {
    fn decide_inclusion(&self, name: &ModuleName, kind: ModuleKind) -> Option<bool>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProfile;

impl ProfileFeedback for NoProfile {
    fn decide_inclusion(&self, _name: &ModuleName, _kind: ModuleKind) -> Option<bool> {
        None
    }
}
