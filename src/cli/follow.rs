//! `trawl follow`: closure of an entry module.

use anyhow::Result;
use std::path::Path;

use super::{config_base, load_config, open_session, FollowArgs};
use crate::closure::ClosureReport;

pub fn run(config_path: &Path, entry: &Path, args: &FollowArgs, json: bool) -> Result<()> {
    let config = load_config(config_path, args)?;
    let mut session = open_session(&config, config_path, Some(entry))?;

    session.add_entry(entry)?;
    session.seed_includes(&config.include, &config_base(config_path))?;
    let report = session.run_to_fixed_point()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &ClosureReport) {
    println!("Roots ({}):", report.roots.len());
    for root in &report.roots {
        println!("  - {}", root);
    }

    println!("Modules ({}):", report.modules.len());
    for module in &report.modules {
        let marker = if module.is_root { "*" } else { " " };
        println!(
            "  {} {} [{}, {:?}] {}",
            marker, module.name, module.kind, module.compilation, module.file
        );
    }

    if !report.diagnostics.is_empty() {
        println!("Warnings: {}", report.diagnostics.len());
    }
    println!(
        "Fixed point after {} passes, {} usage edges.",
        report.passes.len(),
        report.usage_edges
    );
}
