//
//  mod.rs
//  Trawl
//
//  Created by hak (tharun)
//

//! Module identities: dotted names, canonical files, kinds and the records
//! the builder produces for them.

pub mod file;
pub mod kind;
pub mod name;
pub mod pattern;
pub mod record;

pub use file::{is_same_module_path, ModuleFile};
pub use kind::{CompilationMode, ModuleKind};
pub use name::ModuleName;
pub use pattern::ShellPatterns;
pub use record::{Finding, ModuleHandle, ModuleKey, ModuleRecord, SourceRef, UsedModule};
