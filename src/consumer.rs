//! Consumption of a freshly built module's import edges.

use tracing::debug;

use crate::error::{Result, TrawlError};
use crate::module::{Finding, ModuleFile, ModuleHandle, ModuleKind, ModuleName, SourceRef, UsedModule};
use crate::policy::Decision;
use crate::recursion::RecursionRequest;
use crate::registry::UsageTag;
use crate::session::Session;

impl Session {
    /// Drain the import edges of `module`, following every edge the policy
    /// includes, then the plugins' implicit imports.
    ///
    /// A forbidden import aborts right away: later edges of the module are
    /// not looked at.
    pub fn consider_used_modules(
        &mut self,
        module: &ModuleHandle,
        used_modules: Vec<UsedModule>,
    ) -> Result<()> {
        for used in used_modules {
            if used.finding == Finding::NotFound {
                self.warn_unresolved(&module.name, &used);
            }

            let Some(file) = used.file.as_ref() else {
                continue;
            };

            self.follow_edge(
                module,
                &used.name,
                file,
                used.kind,
                &used.source_ref,
                UsageTag::Import,
            )
            .map_err(|e| e.at_import(&module.name, &used.source_ref))?;
        }

        let implicit = self
            .plugins
            .consider_implicit_imports(module)
            .map_err(|e| TrawlError::from(e).implicit_in(&module.name))?;

        for import in implicit {
            let Some(file) = import.file.as_ref() else {
                debug!(module = %module.name, implicit = %import.name, "implicit import has no file");
                continue;
            };
            debug!(module = %module.name, implicit = %import.name, reason = %import.reason, "implicit import");

            self.follow_edge(
                module,
                &import.name,
                file,
                import.kind,
                &module.source_ref,
                UsageTag::Plugin,
            )
            .map_err(|e| e.implicit_in(&module.name))?;
        }

        Ok(())
    }

    fn follow_edge(
        &mut self,
        module: &ModuleHandle,
        name: &ModuleName,
        file: &ModuleFile,
        kind: ModuleKind,
        source_ref: &SourceRef,
        tag: UsageTag,
    ) -> Result<()> {
        let Decision::Include(reason) = self.decide_recursion(file, name, kind, false) else {
            return Ok(());
        };

        let request = RecursionRequest {
            name,
            file,
            kind,
            using_module: Some(&module.name),
            source_ref: Some(source_ref),
            reason: &reason,
        };

        if let Some(used) = self.recurse_to(&request, true)? {
            self.registry
                .add_used_module(&used, module, tag, &reason, Some(source_ref.clone()));
        }

        Ok(())
    }
}
