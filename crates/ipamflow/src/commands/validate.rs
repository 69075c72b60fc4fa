use crate::utils;
use colored::Colorize;
use ipamflow_core::{ResourceKind, State, Vocabulary};
use std::path::PathBuf;

/// Parse and check the manifest; never contacts the server
pub fn handle(manifest: Option<PathBuf>) -> anyhow::Result<()> {
    println!("{}", "Validating manifest...".blue());

    let (path, manifest) = utils::load_manifest(manifest)?;
    utils::print_loaded_manifest(&path);

    let vocabulary = Vocabulary::default();
    let mut errors = Vec::new();
    for resource in &manifest.resources {
        if let Err(e) = resource.validate(&vocabulary) {
            errors.push(format!("{}: {}", resource.label(), e));
        }
    }

    if !errors.is_empty() {
        eprintln!();
        eprintln!("{}", "✗ Manifest has errors".red().bold());
        for error in &errors {
            eprintln!("  {}", error);
        }
        anyhow::bail!("{} invalid resource(s)", errors.len());
    }

    println!("{}", "✓ Manifest is valid".green().bold());
    println!();
    println!("Summary:");
    for kind in [ResourceKind::PropertyDefinition, ResourceKind::User, ResourceKind::Zone] {
        let of_kind: Vec<_> = manifest
            .resources
            .iter()
            .filter(|r| r.kind() == kind)
            .collect();
        if of_kind.is_empty() {
            continue;
        }
        println!("  {}: {}", kind, of_kind.len());
        for resource in of_kind {
            let state = match resource.state() {
                State::Present => "present".green(),
                State::Absent => "absent".red(),
            };
            println!("    - {} ({})", resource.name().cyan(), state);
        }
    }

    Ok(())
}
