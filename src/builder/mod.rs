//
//  mod.rs
//  Trawl
//
//  Created by hak (tharun)
//

//! Module construction from disk.

pub mod imports;
pub mod resolve;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use tree_sitter::Parser;

use crate::error::{Result, TrawlError};
use crate::hooks::{BuildOutcome, BuildRequest, ModuleBuilder};
use crate::module::file::INIT_ENTRY;
use crate::module::{ModuleFile, ModuleKey, ModuleKind, ModuleRecord, UsedModule};

pub use imports::{extract_imports, ImportStatement};
pub use resolve::ImportResolver;

/// Builds module records from the filesystem, parsing source modules with
/// tree-sitter to find their imports.
pub struct SourceBuilder {
    parser: Parser,
    resolver: ImportResolver,
    built: HashSet<ModuleKey>,
}

impl SourceBuilder {
    pub fn new(resolver: ImportResolver) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| TrawlError::Parser(e.to_string()))?;

        Ok(Self {
            parser,
            resolver,
            built: HashSet::new(),
        })
    }

    /// Imports of one source file, or `None` for a hidden syntax error.
    fn scan(
        &mut self,
        module: &ModuleRecord,
        path: &Path,
        hide_syntax_error: bool,
    ) -> Result<Option<Vec<UsedModule>>> {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) if hide_syntax_error => {
                warn!("Cannot read '{}': {}", path.display(), e);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| TrawlError::Parser(format!("parse of '{}' cancelled", path.display())))?;

        if let Some(line) = imports::first_error_line(&tree) {
            let err = TrawlError::Syntax {
                path: path.to_path_buf(),
                message: format!("invalid syntax at line {line}"),
            };
            if hide_syntax_error {
                warn!("{}", err);
                return Ok(None);
            }
            return Err(err);
        }

        let used: Vec<UsedModule> = extract_imports(&tree, source.as_bytes())
            .iter()
            .flat_map(|import| self.resolver.resolve(module, import))
            .collect();

        debug!(module = %module.name, imports = used.len(), "scanned module");
        Ok(Some(used))
    }
}

impl ModuleBuilder for SourceBuilder {
    fn build(&mut self, request: &BuildRequest<'_>) -> Result<Option<BuildOutcome>> {
        let path = request.file.path();

        // Packages are built from their init entry, namespace packages from
        // the bare directory.
        let (module, source): (ModuleRecord, Option<PathBuf>) = if path.is_dir() {
            let init = path.join(INIT_ENTRY);
            if init.is_file() {
                let record = ModuleRecord::new(request.name.clone(), ModuleFile::new(&init), request.kind);
                (record.package(), Some(init))
            } else {
                let record = ModuleRecord::new(request.name.clone(), request.file.clone(), request.kind);
                (record.package(), None)
            }
        } else if request.file.is_init_entry() {
            let record = ModuleRecord::new(request.name.clone(), request.file.clone(), request.kind);
            (record.package(), Some(path.to_path_buf()))
        } else {
            let record = ModuleRecord::new(request.name.clone(), request.file.clone(), request.kind);
            let source = (request.kind == ModuleKind::Source).then(|| path.to_path_buf());
            (record, source)
        };
        let module = if request.is_top { module.top() } else { module };

        if self.built.contains(&module.key()) {
            return Ok(Some(BuildOutcome {
                module,
                used_modules: Vec::new(),
                newly_built: false,
            }));
        }

        let used_modules = match source {
            Some(source) => match self.scan(&module, &source, request.hide_syntax_error)? {
                Some(used) => used,
                None => return Ok(None),
            },
            None => Vec::new(),
        };

        self.built.insert(module.key());
        Ok(Some(BuildOutcome {
            module,
            used_modules,
            newly_built: true,
        }))
    }
}
