//
//  plugins.rs
//  Trawl
//
//  Created by hak (tharun)
//

//! Plugin layer driven by the `[plugins]` configuration table.

use std::collections::HashMap;

use tracing::debug;

use crate::builder::ImportResolver;
use crate::config::{PluginConfig, RuleDecision};
use crate::error::{ForbiddenImport, Result};
use crate::hooks::{ImplicitImport, Plugins};
use crate::module::{
    CompilationMode, ModuleFile, ModuleKind, ModuleName, ModuleRecord, ShellPatterns, SourceRef,
};
use crate::policy::Decision;

struct DecisionEntry {
    patterns: ShellPatterns,
    decision: RuleDecision,
    reason: Option<String>,
}

struct ForbidEntry {
    patterns: ShellPatterns,
    avoid: String,
}

/// Decisions, implicit imports, forbidden imports and bytecode modules,
/// all from configuration.
pub struct ConfigPlugin {
    decisions: Vec<DecisionEntry>,
    implicit: HashMap<ModuleName, Vec<ModuleName>>,
    forbid: Vec<ForbidEntry>,
    bytecode: ShellPatterns,
    resolver: ImportResolver,
}

impl ConfigPlugin {
    pub fn new(config: &PluginConfig, resolver: ImportResolver) -> Result<Self> {
        let decisions = config
            .decisions
            .iter()
            .map(|rule| {
                Ok(DecisionEntry {
                    patterns: ShellPatterns::new([&rule.pattern])?,
                    decision: rule.decision,
                    reason: rule.reason.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let forbid = config
            .forbid
            .iter()
            .map(|rule| {
                Ok(ForbidEntry {
                    patterns: ShellPatterns::new([&rule.pattern])?,
                    avoid: rule.avoid.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut implicit: HashMap<ModuleName, Vec<ModuleName>> = HashMap::new();
        for rule in &config.implicit {
            implicit
                .entry(ModuleName::new(rule.module.as_str()))
                .or_default()
                .extend(rule.imports.iter().map(|i| ModuleName::new(i.as_str())));
        }

        Ok(Self {
            decisions,
            implicit,
            forbid,
            bytecode: ShellPatterns::new(&config.bytecode)?,
            resolver,
        })
    }
}

impl Plugins for ConfigPlugin {
    fn on_module_encounter(
        &self,
        _file: &ModuleFile,
        name: &ModuleName,
        _kind: ModuleKind,
    ) -> Option<Decision> {
        self.decisions.iter().find_map(|entry| {
            let matched = entry.patterns.first_match(name)?;
            let reason = entry
                .reason
                .clone()
                .unwrap_or_else(|| format!("Module '{name}' {matched}, decided by configuration."));
            Some(match entry.decision {
                RuleDecision::Include => Decision::Include(reason),
                RuleDecision::Exclude => Decision::Exclude(reason),
                RuleDecision::Undecided => Decision::Undecided(reason),
            })
        })
    }

    fn on_module_recursion(
        &self,
        _file: &ModuleFile,
        name: &ModuleName,
        _kind: ModuleKind,
        using_module: Option<&ModuleName>,
        source_ref: Option<&SourceRef>,
    ) -> std::result::Result<(), ForbiddenImport> {
        match self.forbid.iter().find(|f| f.patterns.first_match(name).is_some()) {
            Some(rule) => {
                debug!(
                    module = %name,
                    using = ?using_module.map(|m| m.as_str()),
                    at = ?source_ref.map(|s| s.to_string()),
                    "forbidden import"
                );
                Err(ForbiddenImport::new(name.clone(), rule.avoid.as_str()))
            }
            None => Ok(()),
        }
    }

    fn consider_implicit_imports(
        &self,
        module: &ModuleRecord,
    ) -> std::result::Result<Vec<ImplicitImport>, ForbiddenImport> {
        let Some(names) = self.implicit.get(&module.name) else {
            return Ok(Vec::new());
        };

        let mut imports = Vec::new();
        for name in names {
            if let Some(rule) = self.forbid.iter().find(|f| f.patterns.first_match(name).is_some()) {
                return Err(ForbiddenImport::new(name.clone(), rule.avoid.as_str()));
            }

            let located = self.resolver.locate(name);
            imports.push(ImplicitImport {
                name: name.clone(),
                kind: located.as_ref().map(|(_, k)| *k).unwrap_or(ModuleKind::Source),
                file: located.map(|(f, _)| f),
                reason: format!("Module '{}' needs it implicitly.", module.name),
            });
        }
        Ok(imports)
    }

    fn decide_compilation(&self, name: &ModuleName) -> Option<CompilationMode> {
        self.bytecode
            .first_match(name)
            .map(|_| CompilationMode::Bytecode)
    }
}
