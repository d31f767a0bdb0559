//! `trawl decide`: one inclusion decision, with its reason.

use anyhow::{bail, Result};
use std::path::Path;

use super::{load_config, open_session, FollowArgs};
use crate::module::file::module_name_and_kind;
use crate::module::{ModuleFile, ModuleKind, ModuleName};

pub fn run(
    config_path: &Path,
    file: &Path,
    name: Option<&str>,
    explicit: bool,
    args: &FollowArgs,
) -> Result<()> {
    let config = load_config(config_path, args)?;
    let mut session = open_session(&config, config_path, None)?;

    let detected = module_name_and_kind(file);
    let kind = detected
        .as_ref()
        .map(|(_, kind)| *kind)
        .unwrap_or(ModuleKind::Source);
    let name = match (name, detected) {
        (Some(name), _) => ModuleName::new(name),
        (None, Some((bare, _))) => ModuleName::new(bare),
        (None, None) => bail!("Cannot derive a module name from '{}', use --name", file.display()),
    };

    let decision = session.decide_recursion(&ModuleFile::new(file), &name, kind, explicit);

    println!("{} ({})", name, kind);
    println!("{}", decision);
    if decision.is_include() {
        println!("compilation: {:?}", session.compilation_mode(&name));
    }

    Ok(())
}
