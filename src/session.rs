//
//  session.rs
//  Trawl
//
//  Created by hak (tharun)
//

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::rc::Rc;

use tracing::{info, warn};

use crate::config::FollowOptions;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::{Result, TrawlError};
use crate::hooks::{
    BuildRequest, LibraryClassifier, ModuleBuilder, NoLibrary, NoPlugins, NoProfile, Plugins,
    ProfileFeedback,
};
use crate::module::file::module_name_and_kind;
use crate::module::{ModuleFile, ModuleHandle, ModuleKind, ModuleName, ShellPatterns, UsedModule};
use crate::policy::{Decision, DecisionKey};
use crate::recursion::{ImportCache, NewCode};
use crate::registry::ModuleRegistry;

/// A built module whose imports have not been consumed yet.
pub(crate) struct PendingModule {
    pub module: ModuleHandle,
    pub used_modules: Vec<UsedModule>,
}

/// One compilation run.
///
/// Owns every cache the inclusion engine needs: memoized decisions, the
/// identity cache of built modules, the root registry and the queue of
/// modules still to be consumed. Nothing is global, two sessions never
/// share state.
pub struct Session {
    pub(crate) options: FollowOptions,
    pub(crate) follow_to: ShellPatterns,
    pub(crate) nofollow_to: ShellPatterns,
    pub(crate) bytecode_modules: ShellPatterns,

    pub(crate) builder: Box<dyn ModuleBuilder>,
    pub(crate) plugins: Box<dyn Plugins>,
    pub(crate) library: Box<dyn LibraryClassifier>,
    pub(crate) profile: Box<dyn ProfileFeedback>,

    pub(crate) decisions: HashMap<DecisionKey, Decision>,
    pub(crate) import_cache: ImportCache,
    pub(crate) registry: ModuleRegistry,
    pub(crate) pending: VecDeque<PendingModule>,
    pub(crate) changes: Vec<NewCode>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    warned_unresolved: HashSet<ModuleName>,
}

impl Session {
    /// Create a session with no plugins, no library classification and no
    /// profile data. Fails on contradicting options or bad patterns.
    pub fn new(options: FollowOptions, builder: Box<dyn ModuleBuilder>) -> Result<Self> {
        options.validate()?;

        Ok(Self {
            follow_to: ShellPatterns::new(&options.follow_to)?,
            nofollow_to: ShellPatterns::new(&options.nofollow_to)?,
            bytecode_modules: ShellPatterns::new(&options.bytecode_modules)?,
            options,
            builder,
            plugins: Box::new(NoPlugins),
            library: Box::new(NoLibrary),
            profile: Box::new(NoProfile),
            decisions: HashMap::new(),
            import_cache: ImportCache::default(),
            registry: ModuleRegistry::new(),
            pending: VecDeque::new(),
            changes: Vec::new(),
            diagnostics: Vec::new(),
            warned_unresolved: HashSet::new(),
        })
    }

    pub fn with_plugins(mut self, plugins: Box<dyn Plugins>) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_classifier(mut self, library: Box<dyn LibraryClassifier>) -> Self {
        self.library = library;
        self
    }

    pub fn with_profile(mut self, profile: Box<dyn ProfileFeedback>) -> Self {
        self.profile = profile;
        self
    }

    pub fn options(&self) -> &FollowOptions {
        &self.options
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn import_cache(&self) -> &ImportCache {
        &self.import_cache
    }

    /// Every "new code" signal raised so far.
    pub fn changes(&self) -> &[NewCode] {
        &self.changes
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Modules built but not consumed yet.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Build the program entry. It runs as `__main__`, is registered as
    /// entry and root, and is queued for consumption. Its syntax errors
    /// are not hidden.
    pub fn add_entry(&mut self, path: &Path) -> Result<ModuleHandle> {
        let file = ModuleFile::new(path);
        let kind = module_name_and_kind(file.path())
            .map(|(_, kind)| kind)
            .unwrap_or(ModuleKind::Source);
        let name = ModuleName::main();

        let request = BuildRequest {
            name: &name,
            file: &file,
            kind,
            is_top: true,
            hide_syntax_error: false,
        };
        let outcome = self.builder.build(&request)?.ok_or_else(|| {
            TrawlError::Parser(format!("entry module '{}' could not be built", file))
        })?;

        let runtime_package = self.options.runtime_package();
        let module = Rc::new(outcome.module.top().with_runtime_package(runtime_package));
        let module = self.import_cache.add(module);

        if self.options.show_inclusion {
            info!("Entry module '{}' from '{}'.", module.name, module.file);
        }

        self.registry.set_entry(module.clone());
        self.pending.push_back(PendingModule {
            module: module.clone(),
            used_modules: outcome.used_modules,
        });

        Ok(module)
    }

    /// Log a recoverable problem and keep it for the report.
    pub(crate) fn diagnose(&mut self, kind: DiagnosticKind, message: String) {
        warn!("{}", message);
        self.diagnostics.push(Diagnostic { kind, message });
    }

    /// Unresolved imports are reported once per name.
    pub(crate) fn warn_unresolved(&mut self, importer: &ModuleName, used: &UsedModule) {
        if !self.warned_unresolved.insert(used.name.clone()) {
            return;
        }

        let message = if used.level > 0 {
            let package = importer
                .package_name()
                .map(|p| p.to_string())
                .unwrap_or_default();
            format!(
                "{}: Cannot find '{}' in package '{}' as relative import.",
                used.source_ref, used.name, package
            )
        } else {
            format!(
                "{}: Cannot find '{}' as absolute import.",
                used.source_ref, used.name
            )
        };
        self.diagnose(DiagnosticKind::UnresolvedImport, message);
    }
}
