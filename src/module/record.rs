//
//  record.rs
//  Trawl
//
//  Created by hak (tharun)
//

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::file::ModuleFile;
use super::kind::ModuleKind;
use super::name::ModuleName;

/// File and line a diagnostic points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRef {
    pub file: PathBuf,
    pub line: usize,
}

impl SourceRef {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Reference to the start of a module.
    pub fn module_start(file: &Path) -> Self {
        Self::new(file, 1)
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Identity of a module: at most one record is ever built per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleKey {
    pub name: ModuleName,
    pub file: ModuleFile,
}

impl ModuleKey {
    pub fn new(name: ModuleName, file: ModuleFile) -> Self {
        Self { name, file }
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.file)
    }
}

/// A built module. Created once by the builder and shared for the rest of
/// the run.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleRecord {
    pub name: ModuleName,
    pub file: ModuleFile,
    pub kind: ModuleKind,
    pub is_package: bool,
    /// Set for the program entry only.
    pub is_top: bool,
    /// Package the entry runs as, when compiled in package mode.
    pub runtime_package: Option<ModuleName>,
    pub source_ref: SourceRef,
}

/// Shared handle to a built module.
pub type ModuleHandle = Rc<ModuleRecord>;

impl ModuleRecord {
    pub fn new(name: ModuleName, file: ModuleFile, kind: ModuleKind) -> Self {
        let source_ref = SourceRef::module_start(file.path());
        Self {
            name,
            file,
            kind,
            is_package: false,
            is_top: false,
            runtime_package: None,
            source_ref,
        }
    }

    pub fn package(mut self) -> Self {
        self.is_package = true;
        self
    }

    pub fn top(mut self) -> Self {
        self.is_top = true;
        self
    }

    pub fn with_runtime_package(mut self, package: Option<ModuleName>) -> Self {
        self.runtime_package = package;
        self
    }

    pub fn key(&self) -> ModuleKey {
        ModuleKey::new(self.name.clone(), self.file.clone())
    }

    /// A package without init entry, backed only by its directory.
    pub fn is_namespace_package(&self) -> bool {
        self.is_package && !self.file.is_init_entry()
    }
}

impl fmt::Display for ModuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = if self.is_package { "package" } else { "module" };
        write!(f, "<{} {} {} '{}'>", self.kind, shape, self.name, self.file)
    }
}

/// How an import statement resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Finding {
    Found,
    /// Compiled into the interpreter, there is no file to follow.
    BuiltIn,
    NotFound,
}

/// An import edge discovered while building a module. Consumed exactly
/// once.
#[derive(Debug, Clone)]
pub struct UsedModule {
    pub name: ModuleName,
    pub file: Option<ModuleFile>,
    pub kind: ModuleKind,
    /// Relative import level, 0 for absolute imports.
    pub level: usize,
    pub finding: Finding,
    pub source_ref: SourceRef,
}

impl UsedModule {
    pub fn found(
        name: ModuleName,
        file: ModuleFile,
        kind: ModuleKind,
        source_ref: SourceRef,
    ) -> Self {
        Self {
            name,
            file: Some(file),
            kind,
            level: 0,
            finding: Finding::Found,
            source_ref,
        }
    }

    pub fn not_found(name: ModuleName, level: usize, source_ref: SourceRef) -> Self {
        Self {
            name,
            file: None,
            kind: ModuleKind::Source,
            level,
            finding: Finding::NotFound,
            source_ref,
        }
    }

    pub fn built_in(name: ModuleName, source_ref: SourceRef) -> Self {
        Self {
            name,
            file: None,
            kind: ModuleKind::Source,
            level: 0,
            finding: Finding::BuiltIn,
            source_ref,
        }
    }

    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_detection() {
        let real = ModuleRecord::new(
            ModuleName::new("pkg"),
            ModuleFile::new("/p/pkg/__init__.py"),
            ModuleKind::Source,
        )
        .package();
        let namespace = ModuleRecord::new(
            ModuleName::new("ns"),
            ModuleFile::new("/p/ns"),
            ModuleKind::Source,
        )
        .package();
        let leaf = ModuleRecord::new(
            ModuleName::new("leaf"),
            ModuleFile::new("/p/leaf.py"),
            ModuleKind::Source,
        );

        assert!(!real.is_namespace_package());
        assert!(namespace.is_namespace_package());
        assert!(!leaf.is_namespace_package());
    }

    #[test]
    fn test_key_uses_identity() {
        let record = ModuleRecord::new(
            ModuleName::new("pkg"),
            ModuleFile::new("/p/pkg/__init__.py"),
            ModuleKind::Source,
        );
        assert_eq!(
            record.key(),
            ModuleKey::new(ModuleName::new("pkg"), ModuleFile::new("/p/pkg"))
        );
        assert_eq!(record.source_ref.to_string(), "/p/pkg/__init__.py:1");
    }
}
