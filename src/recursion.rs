//
//  recursion.rs
//  Trawl
//
//  Created by hak (tharun)
//

use serde::Serialize;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::error::Result;
use crate::hooks::BuildRequest;
use crate::module::{ModuleFile, ModuleHandle, ModuleKey, ModuleKind, ModuleName, SourceRef};
use crate::session::{PendingModule, Session};

/// Identity cache: at most one record per (name, file).
#[derive(Default)]
pub struct ImportCache {
    modules: HashMap<ModuleKey, ModuleHandle>,
}

impl ImportCache {
    pub fn get(&self, name: &ModuleName, file: &ModuleFile) -> Option<&ModuleHandle> {
        self.modules.get(&ModuleKey::new(name.clone(), file.clone()))
    }

    /// Register a module. The first record for an identity wins and is
    /// returned for every later registration.
    pub fn add(&mut self, module: ModuleHandle) -> ModuleHandle {
        self.modules.entry(module.key()).or_insert(module).clone()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// All built modules, ordered by identity.
    pub fn modules(&self) -> Vec<&ModuleHandle> {
        let mut modules: Vec<_> = self.modules.values().collect();
        modules.sort_by(|a, b| a.key().cmp(&b.key()));
        modules
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// "New code appeared": a module entered the closure for the first time.
#[derive(Debug, Clone, Serialize)]
pub struct NewCode {
    pub module: ModuleName,
    pub origin: SourceRef,
    pub reason: String,
}

/// A module the decision engine said to include.
#[derive(Debug, Clone, Copy)]
pub struct RecursionRequest<'a> {
    pub name: &'a ModuleName,
    pub file: &'a ModuleFile,
    pub kind: ModuleKind,
    pub using_module: Option<&'a ModuleName>,
    pub source_ref: Option<&'a SourceRef>,
    pub reason: &'a str,
}

impl Session {
    /// Retrieve or build an included module.
    ///
    /// A cached identity is returned as is. Otherwise the plugins observe
    /// the recursion, the builder constructs the module and it is cached.
    /// Only a genuinely new build is queued for consumption, and only then
    /// is a change signalled (when `signal` is set).
    pub fn recurse_to(
        &mut self,
        request: &RecursionRequest<'_>,
        signal: bool,
    ) -> Result<Option<ModuleHandle>> {
        if let Some(module) = self.import_cache.get(request.name, request.file) {
            debug!(module = %request.name, "already built");
            return Ok(Some(module.clone()));
        }

        self.plugins.on_module_recursion(
            request.file,
            request.name,
            request.kind,
            request.using_module,
            request.source_ref,
        )?;

        let build = BuildRequest {
            name: request.name,
            file: request.file,
            kind: request.kind,
            is_top: false,
            hide_syntax_error: true,
        };
        let Some(outcome) = self.builder.build(&build)? else {
            debug!(module = %request.name, "builder gave up");
            return Ok(None);
        };

        let module = self.import_cache.add(Rc::new(outcome.module));

        if outcome.newly_built {
            self.pending.push_back(PendingModule {
                module: module.clone(),
                used_modules: outcome.used_modules,
            });
            if signal {
                self.signal_new_code(&module.name, &module.source_ref, request.reason);
            }
        }

        Ok(Some(module))
    }

    fn signal_new_code(&mut self, module: &ModuleName, origin: &SourceRef, reason: &str) {
        debug!(%module, %origin, reason, "new code");
        self.changes.push(NewCode {
            module: module.clone(),
            origin: origin.clone(),
            reason: reason.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FollowOptions;
    use crate::error::TrawlError;
    use crate::test_utils::{fake_file, FakeBuilder, RecordingPlugins};

    fn request<'a>(name: &'a ModuleName, file: &'a ModuleFile) -> RecursionRequest<'a> {
        RecursionRequest {
            name,
            file,
            kind: ModuleKind::Source,
            using_module: None,
            source_ref: None,
            reason: "test",
        }
    }

    #[test]
    fn test_builds_at_most_once() {
        let mut builder = FakeBuilder::new();
        builder.add_module("a", &[]);
        let builds = builder.builds();
        let plugins = RecordingPlugins::default();
        let recursions = plugins.recursions();

        let mut session = Session::new(FollowOptions::default(), Box::new(builder))
            .unwrap()
            .with_plugins(Box::new(plugins));
        let name = ModuleName::new("a");
        let file = fake_file("a");

        let first = session.recurse_to(&request(&name, &file), true).unwrap().unwrap();
        for _ in 0..4 {
            let again = session.recurse_to(&request(&name, &file), true).unwrap().unwrap();
            assert!(Rc::ptr_eq(&first, &again));
        }

        assert_eq!(builds.borrow().len(), 1);
        assert_eq!(recursions.borrow().len(), 1);
        assert_eq!(session.changes().len(), 1);
        assert_eq!(session.changes()[0].reason, "test");
        assert_eq!(session.pending_len(), 1);
        assert_eq!(session.import_cache().len(), 1);
    }

    #[test]
    fn test_silent_recursion_still_queues() {
        let mut builder = FakeBuilder::new();
        builder.add_module("a", &[]);
        let mut session = Session::new(FollowOptions::default(), Box::new(builder)).unwrap();
        let name = ModuleName::new("a");
        let file = fake_file("a");

        session.recurse_to(&request(&name, &file), false).unwrap();

        assert!(session.changes().is_empty());
        assert_eq!(session.pending_len(), 1);
    }

    #[test]
    fn test_not_newly_built_is_not_signalled() {
        let mut builder = FakeBuilder::new();
        builder.add_module("a", &[]);
        builder.mark_prebuilt("a");
        let mut session = Session::new(FollowOptions::default(), Box::new(builder)).unwrap();
        let name = ModuleName::new("a");
        let file = fake_file("a");

        let module = session.recurse_to(&request(&name, &file), true).unwrap();

        assert!(module.is_some());
        assert!(session.changes().is_empty());
        assert_eq!(session.pending_len(), 0);
    }

    #[test]
    fn test_builder_failure_yields_none() {
        let mut builder = FakeBuilder::new();
        builder.add_module("broken", &[]);
        builder.mark_broken("broken");
        let mut session = Session::new(FollowOptions::default(), Box::new(builder)).unwrap();
        let name = ModuleName::new("broken");
        let file = fake_file("broken");

        assert!(session.recurse_to(&request(&name, &file), true).unwrap().is_none());
        assert!(session.changes().is_empty());
        assert!(session.import_cache().is_empty());
    }

    #[test]
    fn test_forbidden_recursion_aborts_before_build() {
        let mut builder = FakeBuilder::new();
        builder.add_module("setuptools", &[]);
        let builds = builder.builds();
        let plugins = RecordingPlugins::default().with_forbidden("setuptools", "setuptools");
        let mut session = Session::new(FollowOptions::default(), Box::new(builder))
            .unwrap()
            .with_plugins(Box::new(plugins));
        let name = ModuleName::new("setuptools");
        let file = fake_file("setuptools");

        let err = session.recurse_to(&request(&name, &file), true).unwrap_err();

        assert!(matches!(err, TrawlError::ForbiddenImport(_)));
        assert!(builds.borrow().is_empty());
    }

    #[test]
    fn test_import_cache_first_wins() {
        let mut cache = ImportCache::default();
        let a1 = Rc::new(crate::module::ModuleRecord::new(
            ModuleName::new("a"),
            ModuleFile::new("/p/a/__init__.py"),
            ModuleKind::Source,
        ));
        let a2 = Rc::new(crate::module::ModuleRecord::new(
            ModuleName::new("a"),
            ModuleFile::new("/p/a"),
            ModuleKind::Source,
        ));

        let kept = cache.add(a1.clone());
        let again = cache.add(a2);

        assert!(Rc::ptr_eq(&kept, &a1));
        assert!(Rc::ptr_eq(&again, &a1));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&ModuleName::new("a"), &ModuleFile::new("/p/a")).is_some());
    }
}
