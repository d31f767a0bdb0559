//
//  walker.rs
//  Trawl
//
//  Created by hak (tharun)
//

//! Explicit inclusion roots from paths and filename patterns.
//!
//! Runs independently of the import graph. Pending filesystem entries are
//! kept on an explicit stack, so deep package trees never deepen the call
//! stack; children are pushed in reverse to visit them in listing order.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::diagnostics::DiagnosticKind;
use crate::error::{Result, TrawlError};
use crate::module::file::{
    extension_suffix, is_package_dir, is_real_package_dir, list_dir, module_name_and_kind,
    BYTECODE_CACHE_DIR, BYTECODE_SUFFIX, INIT_ENTRY, SOURCE_SUFFIX,
};
use crate::module::{ModuleFile, ModuleHandle, ModuleKind, ModuleName};
use crate::policy::Decision;
use crate::recursion::RecursionRequest;
use crate::session::Session;

#[derive(Debug, Clone)]
enum WalkItem {
    SinglePath {
        path: PathBuf,
        package: Option<ModuleName>,
    },
    Path {
        path: PathBuf,
        package: Option<ModuleName>,
    },
    Pattern(String),
}

impl Session {
    /// Include one file or package directory, as module of `package`.
    pub fn check_plugin_single_path(
        &mut self,
        path: &Path,
        package: Option<&ModuleName>,
    ) -> Result<()> {
        self.walk(WalkItem::SinglePath {
            path: path.to_path_buf(),
            package: package.cloned(),
        })
    }

    /// Include a file, a package directory, or every module directly in a
    /// plain directory.
    pub fn check_plugin_path(&mut self, path: &Path, package: Option<&ModuleName>) -> Result<()> {
        self.walk(WalkItem::Path {
            path: path.to_path_buf(),
            package: package.cloned(),
        })
    }

    /// Include every file matching a glob pattern.
    pub fn check_plugin_filename_pattern(&mut self, pattern: &str) -> Result<()> {
        self.walk(WalkItem::Pattern(pattern.to_string()))
    }

    fn walk(&mut self, item: WalkItem) -> Result<()> {
        let mut stack = vec![item];

        while let Some(item) = stack.pop() {
            let children = match item {
                WalkItem::SinglePath { path, package } => {
                    self.check_single_path(&path, package.as_ref())?
                }
                WalkItem::Path { path, package } => self.expand_path(&path, package)?,
                WalkItem::Pattern(pattern) => self.expand_pattern(&pattern)?,
            };
            stack.extend(children.into_iter().rev());
        }

        Ok(())
    }

    fn check_single_path(
        &mut self,
        path: &Path,
        package: Option<&ModuleName>,
    ) -> Result<Vec<WalkItem>> {
        // Identities are compared on absolute paths.
        let file = ModuleFile::new(path);

        if self.options.show_inclusion {
            info!(
                "Checking detail plug-in path '{}' '{}':",
                file,
                package.map(|p| p.as_str()).unwrap_or("")
            );
        }

        let Some((bare_name, kind)) = module_name_and_kind(file.path()) else {
            debug!(path = %file, "not a module");
            return Ok(Vec::new());
        };
        let name = ModuleName::in_package(&bare_name, package);

        if kind == ModuleKind::Extension && !self.options.standalone {
            self.diagnose(
                DiagnosticKind::NonEmbeddableExtension,
                format!(
                    "Cannot include extension module '{name}' unless using at least standalone mode, \
                     where they would be copied. In this mode, extension modules are not part of \
                     the compiled result, and therefore asking to include them makes no sense."
                ),
            );
        }

        let reason = match self.decide_recursion(&file, &name, kind, true) {
            Decision::Include(reason) => reason,
            denied => {
                self.diagnose(
                    DiagnosticKind::InclusionDenied,
                    format!(
                        "Not allowed to include module '{}' due to '{}'.",
                        name,
                        denied.reason()
                    ),
                );
                return Ok(Vec::new());
            }
        };

        let request = RecursionRequest {
            name: &name,
            file: &file,
            kind,
            using_module: None,
            source_ref: None,
            reason: &reason,
        };

        match self.recurse_to(&request, false)? {
            Some(module) => self.add_included_module(&module),
            None => {
                self.diagnose(
                    DiagnosticKind::IncludeFailed,
                    format!("Failed to include module from '{}'.", file),
                );
                Ok(Vec::new())
            }
        }
    }

    /// Register an explicitly included module as root and, for packages,
    /// queue everything below the package directory.
    fn add_included_module(&mut self, module: &ModuleHandle) -> Result<Vec<WalkItem>> {
        if self.options.show_inclusion {
            info!("Included '{}' as '{}'.", module.name, module);
        }

        self.import_cache.add(module.clone());

        if module.is_package {
            if module.kind == ModuleKind::Extension {
                return Err(TrawlError::InvariantViolation(format!(
                    "extension module '{}' cannot be a package",
                    module.name
                )));
            }

            let package_dir = if module.is_namespace_package() {
                // Only included through the modules found inside it.
                module.file.path().to_path_buf()
            } else {
                self.registry.add_root(module);
                module
                    .file
                    .path()
                    .parent()
                    .map(Path::to_path_buf)
                    .ok_or_else(|| {
                        TrawlError::InvariantViolation(format!(
                            "package '{}' has no directory",
                            module.name
                        ))
                    })?
            };

            if self.options.show_inclusion {
                info!("Package directory '{}'.", package_dir.display());
            }

            let mut children = Vec::new();
            for (sub_path, sub_name) in list_dir(&package_dir)? {
                if sub_name == INIT_ENTRY || sub_name == BYTECODE_CACHE_DIR {
                    continue;
                }

                // A module file shadows a directory of the same name.
                let is_subpackage =
                    is_package_dir(&sub_path) && !with_suffix(&sub_path, SOURCE_SUFFIX).exists();
                if is_subpackage || sub_name.ends_with(SOURCE_SUFFIX) {
                    children.push(WalkItem::SinglePath {
                        path: sub_path,
                        package: Some(module.name.clone()),
                    });
                }
            }
            return Ok(children);
        }

        match module.kind {
            ModuleKind::Source | ModuleKind::Bytecode => {
                self.registry.add_root(module);
            }
            ModuleKind::Extension => {
                if self.options.standalone {
                    self.registry.add_root(module);
                }
            }
        }

        Ok(Vec::new())
    }

    fn expand_path(&mut self, path: &Path, package: Option<ModuleName>) -> Result<Vec<WalkItem>> {
        if self.options.show_inclusion {
            info!(
                "Checking top level inclusion path '{}' '{}'.",
                path.display(),
                package.as_ref().map(|p| p.as_str()).unwrap_or("")
            );
        }

        if path.is_file() || is_real_package_dir(path) {
            return Ok(vec![WalkItem::SinglePath {
                path: path.to_path_buf(),
                package,
            }]);
        }

        if !path.is_dir() {
            self.diagnose(
                DiagnosticKind::IncludeFailed,
                format!("Failed to include module from '{}'.", path.display()),
            );
            return Ok(Vec::new());
        }

        // A directory that is no package: its modules are top level.
        let mut children = Vec::new();
        for (sub_path, sub_name) in list_dir(path)? {
            if is_package_dir(&sub_path)
                || sub_name.ends_with(SOURCE_SUFFIX)
                || extension_suffix(&sub_path).is_some()
            {
                children.push(WalkItem::SinglePath {
                    path: sub_path,
                    package: None,
                });
            }
        }
        Ok(children)
    }

    fn expand_pattern(&mut self, pattern: &str) -> Result<Vec<WalkItem>> {
        if self.options.show_inclusion {
            info!("Checking plug-in pattern '{}':", pattern);
        }

        if Path::new(pattern).is_dir() {
            return Err(TrawlError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "is a directory, not a filename pattern".into(),
            });
        }

        let paths = glob::glob(pattern).map_err(|e| TrawlError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let children: Vec<WalkItem> = paths
            .flatten()
            .filter(|p| !p.to_string_lossy().ends_with(BYTECODE_SUFFIX))
            .filter(|p| p.is_file())
            .map(|path| WalkItem::SinglePath {
                path,
                package: None,
            })
            .collect();

        if children.is_empty() {
            self.diagnose(
                DiagnosticKind::PatternMatchEmpty,
                format!("Didn't match any files against pattern '{}'.", pattern),
            );
        }

        Ok(children)
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}
