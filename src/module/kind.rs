use serde::{Deserialize, Serialize};
use std::fmt;

/// What a module file physically is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Plain source module or package.
    Source,
    /// Precompiled bytecode module.
    Bytecode,
    /// Native extension module (shared library).
    Extension,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModuleKind::Source => "source",
            ModuleKind::Bytecode => "bytecode",
            ModuleKind::Extension => "extension",
        };
        f.write_str(s)
    }
}

/// How an included module ends up in the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilationMode {
    Compiled,
    Bytecode,
}
