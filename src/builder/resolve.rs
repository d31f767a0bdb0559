//! Import resolution against search paths.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::imports::ImportStatement;
use crate::config::SearchConfig;
use crate::module::file::{
    is_package_dir, is_real_package_dir, list_dir, module_name_and_kind, BYTECODE_SUFFIX, INIT_ENTRY, SOURCE_SUFFIX,
};
use crate::module::{ModuleFile, ModuleKind, ModuleName, ModuleRecord, SourceRef, UsedModule};

/// Maps dotted names to files.
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    search_paths: Vec<PathBuf>,
    builtins: HashSet<String>,
}

impl ImportResolver {
    pub fn new<I, P>(search_paths: I, builtins: &[String]) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            search_paths: search_paths
                .into_iter()
                .map(|p| ModuleFile::new(p.as_ref()).path().to_path_buf())
                .collect(),
            builtins: builtins.iter().cloned().collect(),
        }
    }

    /// Search paths are relative to `base`.
    pub fn from_config(config: &SearchConfig, base: &Path) -> Self {
        Self::new(config.paths.iter().map(|p| base.join(p)), &config.builtin_modules)
    }

    /// Search `dir` before every configured path.
    pub fn prepend_search_path(&mut self, dir: &Path) {
        let dir = ModuleFile::new(dir).path().to_path_buf();
        self.search_paths.retain(|p| p != &dir);
        self.search_paths.insert(0, dir);
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn is_builtin(&self, name: &ModuleName) -> bool {
        self.builtins.contains(name.top_level())
    }

    /// Locate an absolute module name on the search paths.
    pub fn locate(&self, name: &ModuleName) -> Option<(ModuleFile, ModuleKind)> {
        self.search_paths
            .iter()
            .find_map(|dir| locate_in(dir, name.as_str()))
    }

    /// Turn one import statement of `importer` into import edges.
    ///
    /// Enclosing packages of a found module are edges too, they are
    /// imported along with it. For `from a import b`, `a.b` is an edge only
    /// when it is a module.
    pub fn resolve(&self, importer: &ModuleRecord, import: &ImportStatement) -> Vec<UsedModule> {
        let source_ref = SourceRef::new(importer.file.path(), import.line);

        let (name, located) = if import.level == 0 {
            let name = ModuleName::new(import.module.as_str());
            if self.is_builtin(&name) {
                return vec![UsedModule::built_in(name, source_ref)];
            }
            let located = self.locate(&name);
            (name, located)
        } else {
            let Some((name, dir)) = relative_base(importer, import) else {
                let name = ModuleName::new(format!("{}{}", ".".repeat(import.level), import.module));
                return vec![UsedModule::not_found(name, import.level, source_ref)];
            };
            let located = if import.module.is_empty() {
                module_at_dir(&dir)
            } else {
                locate_in(&dir, &import.module)
            };
            (name, located)
        };

        let Some((file, kind)) = located else {
            return vec![UsedModule::not_found(name, import.level, source_ref)];
        };

        let mut used = Vec::new();
        if import.level == 0 {
            for parent in parent_packages(&name) {
                if let Some((file, kind)) = self.locate(&parent) {
                    used.push(UsedModule::found(parent, file, kind, source_ref.clone()));
                }
            }
        }

        let package_dir = if file.is_init_entry() {
            file.path().parent().map(Path::to_path_buf)
        } else if file.path().is_dir() {
            Some(file.path().to_path_buf())
        } else {
            None
        };

        used.push(
            UsedModule::found(name.clone(), file, kind, source_ref.clone()).with_level(import.level),
        );

        if let Some(package_dir) = package_dir {
            for sub in &import.names {
                if let Some((file, kind)) = locate_in(&package_dir, sub) {
                    used.push(
                        UsedModule::found(name.child(sub), file, kind, source_ref.clone())
                            .with_level(import.level),
                    );
                }
            }
        }

        used
    }
}

/// Absolute name a relative import denotes, and the directory its module
/// path is looked up in.
fn relative_base(importer: &ModuleRecord, import: &ImportStatement) -> Option<(ModuleName, PathBuf)> {
    let (mut package, mut dir) = if importer.is_package {
        (importer.name.clone(), importer.file.identity().to_path_buf())
    } else {
        let package = importer
            .runtime_package
            .clone()
            .or_else(|| importer.name.package_name())?;
        (package, importer.file.path().parent()?.to_path_buf())
    };

    for _ in 1..import.level {
        package = package.package_name()?;
        dir = dir.parent()?.to_path_buf();
    }

    let name = if import.module.is_empty() {
        package
    } else {
        package.child(&import.module)
    };
    Some((name, dir))
}

fn parent_packages(name: &ModuleName) -> Vec<ModuleName> {
    let mut parents = Vec::new();
    let mut current = name.package_name();
    while let Some(parent) = current {
        current = parent.package_name();
        parents.push(parent);
    }
    parents.reverse();
    parents
}

/// Look up a dotted path below `dir`. Per directory the order is real
/// package, source module, extension module, bytecode module, namespace
/// package.
fn locate_in(dir: &Path, dotted: &str) -> Option<(ModuleFile, ModuleKind)> {
    let mut parts = dotted.split('.').peekable();
    let mut dir = dir.to_path_buf();

    while let Some(part) = parts.next() {
        if part.is_empty() {
            return None;
        }
        if parts.peek().is_some() {
            dir = dir.join(part);
            if !is_package_dir(&dir) {
                return None;
            }
            continue;
        }
        return locate_leaf(&dir, part);
    }

    None
}

fn locate_leaf(dir: &Path, name: &str) -> Option<(ModuleFile, ModuleKind)> {
    let package = dir.join(name);
    if is_real_package_dir(&package) {
        return module_at_dir(&package);
    }

    let source = dir.join(format!("{name}{SOURCE_SUFFIX}"));
    if source.is_file() {
        return Some((ModuleFile::new(source), ModuleKind::Source));
    }

    if let Ok(entries) = list_dir(dir) {
        for (path, file_name) in entries {
            if !file_name.starts_with(name) || !path.is_file() {
                continue;
            }
            if let Some((stem, ModuleKind::Extension)) = module_name_and_kind(&path) {
                if stem == name {
                    return Some((ModuleFile::new(path), ModuleKind::Extension));
                }
            }
        }
    }

    let bytecode = dir.join(format!("{name}{BYTECODE_SUFFIX}"));
    if bytecode.is_file() {
        return Some((ModuleFile::new(bytecode), ModuleKind::Bytecode));
    }

    module_at_dir(&package)
}

fn module_at_dir(dir: &Path) -> Option<(ModuleFile, ModuleKind)> {
    if !is_package_dir(dir) {
        return None;
    }
    let init = dir.join(INIT_ENTRY);
    let file = if init.is_file() { init } else { dir.to_path_buf() };
    Some((ModuleFile::new(file), ModuleKind::Source))
}
