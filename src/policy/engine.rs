//
//  engine.rs
//  Trawl
//
//  Created by hak (tharun)
//

use tracing::debug;

use super::reasons;
use super::Decision;
use crate::module::{CompilationMode, ModuleFile, ModuleKind, ModuleName};
use crate::session::Session;

/// Memoization key of the decision engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecisionKey {
    pub file: ModuleFile,
    pub name: ModuleName,
    pub kind: ModuleKind,
    /// Request came from an explicit path or pattern, not an import.
    pub explicit: bool,
}

impl Session {
    /// Decide whether to follow into a module.
    ///
    /// Memoized on the full key: with the session's options, plugins and
    /// profile fixed, the same key always yields the same decision.
    pub fn decide_recursion(
        &mut self,
        file: &ModuleFile,
        name: &ModuleName,
        kind: ModuleKind,
        explicit: bool,
    ) -> Decision {
        let key = DecisionKey {
            file: file.clone(),
            name: name.clone(),
            kind,
            explicit,
        };

        if let Some(decision) = self.decisions.get(&key) {
            return decision.clone();
        }

        let decision = self.render_decision(file, name, kind, explicit);
        debug!(module = %name, file = %file, %kind, explicit, %decision, "inclusion decision");
        self.decisions.insert(key, decision.clone());
        decision
    }

    /// Number of memoized decisions.
    pub fn decision_cache_len(&self) -> usize {
        self.decisions.len()
    }

    /// How `name` would end up in the artifact if included.
    pub fn compilation_mode(&self, name: &ModuleName) -> CompilationMode {
        if let Some(mode) = self.plugins.decide_compilation(name) {
            return mode;
        }
        if self.bytecode_modules.first_match(name).is_some() {
            CompilationMode::Bytecode
        } else {
            CompilationMode::Compiled
        }
    }

    // First rule that fires wins.
    fn render_decision(
        &self,
        file: &ModuleFile,
        name: &ModuleName,
        kind: ModuleKind,
        explicit: bool,
    ) -> Decision {
        if name.is_main() {
            return Decision::exclude(reasons::MAIN_NOT_TWICE);
        }

        // With `-m package`, that package's `__main__` is the entry already.
        if self.options.in_package_mode()
            && !self.options.module_build
            && name.basename() == ModuleName::MAIN
            && name.package_name() == self.options.runtime_package()
        {
            return Decision::exclude(reasons::MAIN_IN_PACKAGE);
        }

        if let Some(decision) = self.plugins.on_module_encounter(file, name, kind) {
            return decision;
        }

        if kind == ModuleKind::Extension {
            return if self.options.standalone {
                Decision::include(reasons::EXTENSION_STANDALONE)
            } else {
                Decision::exclude(reasons::EXTENSION_NOT_INSPECTABLE)
            };
        }

        let is_stdlib = self.library.is_library_path(file);

        // Profile data overrules the options below, never the rules above.
        if (!is_stdlib || self.options.follow_stdlib)
            && self.compilation_mode(name) == CompilationMode::Compiled
        {
            if let Some(include) = self.profile.decide_inclusion(name, kind) {
                return Decision::from_bool(include, reasons::PROFILE);
            }
        }

        if let Some(matched) = self.nofollow_to.first_match(name) {
            return Decision::exclude(format!(
                "Module '{name}' {matched}, instructed by user to not follow to."
            ));
        }

        if let Some(matched) = self.follow_to.first_match(name) {
            return Decision::include(format!(
                "Module '{name}' {matched}, instructed by user to follow to."
            ));
        }

        if explicit {
            return Decision::include(reasons::EXPLICIT_PATH);
        }

        if is_stdlib && self.options.follow_stdlib {
            return Decision::include(reasons::FOLLOW_STDLIB);
        }

        if self.options.follow_all {
            if !is_stdlib {
                return Decision::include(reasons::FOLLOW_ALL);
            }
            if self.library.is_no_auto_inclusion_module(name) {
                return Decision::include(reasons::FOLLOW_ALL_NO_AUTO);
            }
        }

        if self.options.follow_none {
            return Decision::undecided(reasons::FOLLOW_NONE);
        }

        Decision::undecided(reasons::DEFAULT)
    }
}
