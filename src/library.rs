//! Standard library classification by directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::LibraryConfig;
use crate::hooks::LibraryClassifier;
use crate::module::{ModuleFile, ModuleName};

/// Library code is whatever lives below one of the configured roots.
#[derive(Debug, Clone, Default)]
pub struct StdlibClassifier {
    roots: Vec<PathBuf>,
    no_auto_inclusion: HashSet<String>,
}

impl StdlibClassifier {
    pub fn new<I, P>(roots: I, no_auto_inclusion: &[String]) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            roots: roots
                .into_iter()
                .map(|r| ModuleFile::new(r.as_ref()).path().to_path_buf())
                .collect(),
            no_auto_inclusion: no_auto_inclusion.iter().cloned().collect(),
        }
    }

    /// Roots are relative to `base`.
    pub fn from_config(config: &LibraryConfig, base: &Path) -> Self {
        Self::new(
            config.roots.iter().map(|r| base.join(r)),
            &config.no_auto_inclusion,
        )
    }
}

impl LibraryClassifier for StdlibClassifier {
    fn is_library_path(&self, file: &ModuleFile) -> bool {
        self.roots.iter().any(|root| file.path().starts_with(root))
    }

    fn is_no_auto_inclusion_module(&self, name: &ModuleName) -> bool {
        self.no_auto_inclusion.contains(name.top_level())
    }
}
