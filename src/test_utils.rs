//! Test doubles for the collaborator traits.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::{ForbiddenImport, Result};
use crate::hooks::{
    BuildOutcome, BuildRequest, ImplicitImport, LibraryClassifier, ModuleBuilder, Plugins,
    ProfileFeedback,
};
use crate::module::file::INIT_ENTRY;
use crate::module::{
    CompilationMode, ModuleFile, ModuleKey, ModuleKind, ModuleName, ModuleRecord, SourceRef,
    UsedModule,
};
use crate::policy::Decision;

/// Location of a module registered with [`FakeBuilder`].
pub fn fake_file(name: &str) -> ModuleFile {
    ModuleFile::new(format!("/fake/{}.py", name.replace('.', "/")))
}

/// Builder over an in-memory module table. Names it does not know fail to
/// build.
#[derive(Default)]
pub struct FakeBuilder {
    modules: HashMap<String, Vec<UsedModule>>,
    prebuilt: HashSet<String>,
    broken: HashSet<String>,
    packages: HashSet<String>,
    builds: Rc<RefCell<Vec<String>>>,
}

impl FakeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` importing `deps`, one import per line.
    pub fn add_module(&mut self, name: &str, deps: &[&str]) {
        let importer = fake_file(name);
        let used = deps
            .iter()
            .enumerate()
            .map(|(i, dep)| {
                UsedModule::found(
                    ModuleName::new(*dep),
                    fake_file(dep),
                    ModuleKind::Source,
                    SourceRef::new(importer.path(), i + 1),
                )
            })
            .collect();
        self.modules.insert(name.to_string(), used);
    }

    pub fn add_module_with(&mut self, name: &str, used: Vec<UsedModule>) {
        self.modules.insert(name.to_string(), used);
    }

    /// Report `name` as already built by an earlier run of the builder.
    pub fn mark_prebuilt(&mut self, name: &str) {
        self.prebuilt.insert(name.to_string());
    }

    pub fn mark_broken(&mut self, name: &str) {
        self.broken.insert(name.to_string());
    }

    /// Build `name` as a package, whatever its kind.
    pub fn mark_package(&mut self, name: &str) {
        self.packages.insert(name.to_string());
    }

    /// Names built so far, in build order.
    pub fn builds(&self) -> Rc<RefCell<Vec<String>>> {
        self.builds.clone()
    }
}

impl ModuleBuilder for FakeBuilder {
    fn build(&mut self, request: &BuildRequest<'_>) -> Result<Option<BuildOutcome>> {
        let name = request.name.as_str();
        if self.broken.contains(name) {
            return Ok(None);
        }
        let Some(used) = self.modules.get(name) else {
            return Ok(None);
        };

        self.builds.borrow_mut().push(name.to_string());

        let mut module = ModuleRecord::new(request.name.clone(), request.file.clone(), request.kind);
        if self.packages.contains(name) {
            module = module.package();
        }

        Ok(Some(BuildOutcome {
            module,
            used_modules: used.clone(),
            newly_built: !self.prebuilt.contains(name),
        }))
    }
}

/// Builder that looks at the filesystem only: directories become packages,
/// files become modules without imports.
#[derive(Default)]
pub struct DiskBuilder {
    seen: HashSet<ModuleKey>,
    builds: Rc<RefCell<Vec<String>>>,
}

impl DiskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builds(&self) -> Rc<RefCell<Vec<String>>> {
        self.builds.clone()
    }
}

impl ModuleBuilder for DiskBuilder {
    fn build(&mut self, request: &BuildRequest<'_>) -> Result<Option<BuildOutcome>> {
        let path = request.file.path();

        let module = if path.is_dir() {
            let init = path.join(INIT_ENTRY);
            let file = if init.is_file() {
                ModuleFile::new(init)
            } else {
                request.file.clone()
            };
            ModuleRecord::new(request.name.clone(), file, request.kind).package()
        } else if path.is_file() {
            ModuleRecord::new(request.name.clone(), request.file.clone(), request.kind)
        } else {
            return Ok(None);
        };

        let newly_built = self.seen.insert(module.key());
        if newly_built {
            self.builds.borrow_mut().push(request.name.to_string());
        }

        Ok(Some(BuildOutcome {
            module,
            used_modules: Vec::new(),
            newly_built,
        }))
    }
}

/// Plugin layer with canned answers that counts how often it is asked.
#[derive(Default)]
pub struct RecordingPlugins {
    decisions: HashMap<String, Decision>,
    bytecode: HashSet<String>,
    forbidden: HashMap<String, String>,
    implicit: HashMap<String, Vec<ImplicitImport>>,
    implicit_forbidden: HashMap<String, (String, String)>,
    encounters: Rc<Cell<usize>>,
    recursions: Rc<RefCell<Vec<String>>>,
}

impl RecordingPlugins {
    pub fn with_decision(mut self, name: &str, decision: Decision) -> Self {
        self.decisions.insert(name.to_string(), decision);
        self
    }

    pub fn with_bytecode(mut self, name: &str) -> Self {
        self.bytecode.insert(name.to_string());
        self
    }

    /// Abort any recursion into `name`.
    pub fn with_forbidden(mut self, name: &str, avoiding: &str) -> Self {
        self.forbidden.insert(name.to_string(), avoiding.to_string());
        self
    }

    pub fn with_implicit(mut self, module: &str, import: ImplicitImport) -> Self {
        self.implicit
            .entry(module.to_string())
            .or_default()
            .push(import);
        self
    }

    /// Make `module` implicitly need `forbidden`, which is refused.
    pub fn with_implicit_forbidden(mut self, module: &str, forbidden: &str, avoiding: &str) -> Self {
        self.implicit_forbidden.insert(
            module.to_string(),
            (forbidden.to_string(), avoiding.to_string()),
        );
        self
    }

    pub fn encounters(&self) -> Rc<Cell<usize>> {
        self.encounters.clone()
    }

    pub fn recursions(&self) -> Rc<RefCell<Vec<String>>> {
        self.recursions.clone()
    }
}

impl Plugins for RecordingPlugins {
    fn on_module_encounter(
        &self,
        _file: &ModuleFile,
        name: &ModuleName,
        _kind: ModuleKind,
    ) -> Option<Decision> {
        self.encounters.set(self.encounters.get() + 1);
        self.decisions.get(name.as_str()).cloned()
    }

    fn on_module_recursion(
        &self,
        _file: &ModuleFile,
        name: &ModuleName,
        _kind: ModuleKind,
        _using_module: Option<&ModuleName>,
        _source_ref: Option<&SourceRef>,
    ) -> std::result::Result<(), ForbiddenImport> {
        if let Some(avoiding) = self.forbidden.get(name.as_str()) {
            return Err(ForbiddenImport::new(name.clone(), avoiding.clone()));
        }
        self.recursions.borrow_mut().push(name.to_string());
        Ok(())
    }

    fn consider_implicit_imports(
        &self,
        module: &ModuleRecord,
    ) -> std::result::Result<Vec<ImplicitImport>, ForbiddenImport> {
        if let Some((forbidden, avoiding)) = self.implicit_forbidden.get(module.name.as_str()) {
            return Err(ForbiddenImport::new(
                ModuleName::new(forbidden.as_str()),
                avoiding.clone(),
            ));
        }
        Ok(self
            .implicit
            .get(module.name.as_str())
            .cloned()
            .unwrap_or_default())
    }

    fn decide_compilation(&self, name: &ModuleName) -> Option<CompilationMode> {
        self.bytecode
            .contains(name.as_str())
            .then_some(CompilationMode::Bytecode)
    }
}

/// Profile that knows a fixed set of names.
pub struct FixedProfile {
    include: bool,
    names: HashSet<String>,
}

impl FixedProfile {
    pub fn including(names: &[&str]) -> Self {
        Self {
            include: true,
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn excluding(names: &[&str]) -> Self {
        Self {
            include: false,
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl ProfileFeedback for FixedProfile {
    fn decide_inclusion(&self, name: &ModuleName, _kind: ModuleKind) -> Option<bool> {
        self.names.contains(name.as_str()).then_some(self.include)
    }
}

/// Everything below `prefix` is library code.
pub struct PrefixLibrary {
    prefix: PathBuf,
    no_auto: HashSet<String>,
}

impl PrefixLibrary {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            no_auto: HashSet::new(),
        }
    }

    pub fn with_no_auto(mut self, names: &[&str]) -> Self {
        self.no_auto.extend(names.iter().map(|n| n.to_string()));
        self
    }
}

impl LibraryClassifier for PrefixLibrary {
    fn is_library_path(&self, file: &ModuleFile) -> bool {
        file.path().starts_with(&self.prefix)
    }

    fn is_no_auto_inclusion_module(&self, name: &ModuleName) -> bool {
        self.no_auto.contains(name.as_str())
    }
}
