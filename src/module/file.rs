//
//  file.rs
//  Trawl
//
//  Created by hak (tharun)
//

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

use super::kind::ModuleKind;

pub const SOURCE_SUFFIX: &str = ".py";
pub const BYTECODE_SUFFIX: &str = ".pyc";
pub const INIT_ENTRY: &str = "__init__.py";
pub const BYTECODE_CACHE_DIR: &str = "__pycache__";

/// Filename suffixes of native extension modules.
pub const EXTENSION_SUFFIXES: &[&str] = &[".so", ".pyd", ".dylib"];

/// Canonical location of a module.
///
/// Equality, ordering and hashing go through the identity path: absolute,
/// with a package's init entry folded into its directory. `pkg/__init__.py`
/// and `pkg/` therefore name the same module.
#[derive(Debug, Clone)]
pub struct ModuleFile {
    path: PathBuf,
    identity: PathBuf,
}

impl ModuleFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = absolutize(path.as_ref());
        let identity = identity_path(&path);
        Self { path, identity }
    }

    /// The file as given (absolute).
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn identity(&self) -> &Path {
        &self.identity
    }

    /// Whether this is a package's `__init__.py`.
    pub fn is_init_entry(&self) -> bool {
        self.path.file_name().is_some_and(|n| n == INIT_ENTRY)
    }

    pub fn display(&self) -> std::path::Display<'_> {
        self.path.display()
    }
}

impl PartialEq for ModuleFile {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for ModuleFile {}

impl Hash for ModuleFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl PartialOrd for ModuleFile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModuleFile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity.cmp(&other.identity)
    }
}

impl fmt::Display for ModuleFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl Serialize for ModuleFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.path.display())
    }
}

impl From<&Path> for ModuleFile {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

/// Two paths denote the same module once init entries are folded into
/// their package directory and both are made absolute.
pub fn is_same_module_path(a: &Path, b: &Path) -> bool {
    identity_path(&absolutize(a)) == identity_path(&absolutize(b))
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn identity_path(path: &Path) -> PathBuf {
    if path.file_name().is_some_and(|n| n == INIT_ENTRY) {
        if let Some(parent) = path.parent() {
            return parent.to_path_buf();
        }
    }
    path.to_path_buf()
}

// ─── Filesystem classification ──────────────────────────────────

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// A directory with an init entry.
pub fn is_real_package_dir(path: &Path) -> bool {
    path.is_dir() && path.join(INIT_ENTRY).is_file()
}

/// A real package directory, or a namespace package: an identifier-named
/// directory without an init entry.
pub fn is_package_dir(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    if path.join(INIT_ENTRY).is_file() {
        return true;
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n != BYTECODE_CACHE_DIR && is_identifier(n))
}

/// The extension suffix `path` ends with, if any.
pub fn extension_suffix(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;
    EXTENSION_SUFFIXES
        .iter()
        .copied()
        .find(|suffix| name.ends_with(suffix))
}

/// Derive the bare module name and kind from a file or package directory.
/// Returns `None` for anything that is not importable.
pub fn module_name_and_kind(path: &Path) -> Option<(String, ModuleKind)> {
    let file_name = path.file_name()?.to_str()?;

    if is_package_dir(path) {
        return Some((file_name.to_string(), ModuleKind::Source));
    }
    if path.is_dir() {
        return None;
    }

    let stem = file_name.split('.').next().unwrap_or(file_name);
    if stem.is_empty() {
        return None;
    }

    let kind = if file_name.ends_with(SOURCE_SUFFIX) {
        ModuleKind::Source
    } else if file_name.ends_with(BYTECODE_SUFFIX) {
        ModuleKind::Bytecode
    } else if extension_suffix(path).is_some() {
        ModuleKind::Extension
    } else {
        return None;
    };

    Some((stem.to_string(), kind))
}

/// Immediate children of a directory as `(path, file name)`, sorted by name.
pub fn list_dir(path: &Path) -> io::Result<Vec<(PathBuf, String)>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        entries.push((entry.path(), name));
    }

    entries.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_entry_folds_into_package_dir() {
        let a = ModuleFile::new("/proj/pkg/__init__.py");
        let b = ModuleFile::new("/proj/pkg");
        assert_eq!(a, b);
        assert!(a.is_init_entry());
        assert!(!b.is_init_entry());
        assert_eq!(a.path(), Path::new("/proj/pkg/__init__.py"));
        assert!(is_same_module_path(
            Path::new("/proj/pkg/__init__.py"),
            Path::new("/proj/pkg")
        ));
    }

    #[test]
    fn test_distinct_modules_differ() {
        assert_ne!(
            ModuleFile::new("/proj/pkg/a.py"),
            ModuleFile::new("/proj/pkg/b.py")
        );
        assert!(!is_same_module_path(
            Path::new("/proj/a.py"),
            Path::new("/proj/a")
        ));
    }

    #[test]
    fn test_relative_paths_become_absolute() {
        let file = ModuleFile::new("some/module.py");
        assert!(file.path().is_absolute());
    }

    #[test]
    fn test_identifier() {
        assert!(is_identifier("pkg_1"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("with-dash"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_module_name_and_kind() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::create_dir(root.join("pkg")).unwrap();
        fs::write(root.join("pkg").join(INIT_ENTRY), "").unwrap();
        fs::create_dir(root.join("not-a-package")).unwrap();
        fs::write(root.join("mod.py"), "").unwrap();
        fs::write(root.join("old.cpython-311.pyc"), "").unwrap();
        fs::write(root.join("_speedups.cpython-311-x86_64-linux-gnu.so"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        assert_eq!(
            module_name_and_kind(&root.join("pkg")),
            Some(("pkg".to_string(), ModuleKind::Source))
        );
        assert_eq!(module_name_and_kind(&root.join("not-a-package")), None);
        assert_eq!(
            module_name_and_kind(&root.join("mod.py")),
            Some(("mod".to_string(), ModuleKind::Source))
        );
        assert_eq!(
            module_name_and_kind(&root.join("old.cpython-311.pyc")),
            Some(("old".to_string(), ModuleKind::Bytecode))
        );
        assert_eq!(
            module_name_and_kind(&root.join("_speedups.cpython-311-x86_64-linux-gnu.so")),
            Some(("_speedups".to_string(), ModuleKind::Extension))
        );
        assert_eq!(module_name_and_kind(&root.join("README.md")), None);
    }

    #[test]
    fn test_package_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::create_dir(root.join("real")).unwrap();
        fs::write(root.join("real").join(INIT_ENTRY), "").unwrap();
        fs::create_dir(root.join("namespace")).unwrap();
        fs::create_dir(root.join(BYTECODE_CACHE_DIR)).unwrap();

        assert!(is_real_package_dir(&root.join("real")));
        assert!(is_package_dir(&root.join("real")));
        assert!(!is_real_package_dir(&root.join("namespace")));
        assert!(is_package_dir(&root.join("namespace")));
        assert!(!is_package_dir(&root.join(BYTECODE_CACHE_DIR)));
    }

    #[test]
    fn test_list_dir_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.py"), "").unwrap();
        fs::write(dir.path().join("a.py"), "").unwrap();

        let names: Vec<String> = list_dir(dir.path())
            .unwrap()
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        assert_eq!(names, vec!["a.py", "b.py"]);
    }
}
