use crate::utils;
use colored::Colorize;
use ipamflow_core::Reconciler;
use serde_json::Value;
use std::path::PathBuf;

/// Reconcile every selected resource in manifest order, stopping at the
/// first failure
pub async fn handle(manifest: Option<PathBuf>, only: Option<&str>, json: bool) -> anyhow::Result<()> {
    let (path, manifest) = utils::load_manifest(manifest)?;
    let resources = utils::select(&manifest, only)?;
    let client = utils::connect(&manifest)?;
    let reconciler = Reconciler::new(&client);

    if !json {
        utils::print_loaded_manifest(&path);
        println!("{}", "Applying manifest...".blue());
    }

    let mut changed = 0;
    for resource in &resources {
        match reconciler.reconcile(resource).await {
            Ok(result) => {
                if result.changed {
                    changed += 1;
                }
                if json {
                    println!("{}", utils::json_line(resource, result.changed, result.message));
                } else {
                    utils::print_result(resource, &result);
                }
            }
            Err(e) => {
                if json {
                    println!(
                        "{}",
                        utils::json_line(resource, false, Value::String(e.to_string()))
                    );
                } else {
                    eprintln!("  {} {}", "✗".red(), resource.label().bold());
                    eprintln!("    {}", e);
                }
                return Err(anyhow::anyhow!("{} failed: {}", resource.label(), e));
            }
        }
    }

    if !json {
        println!();
        println!(
            "{} {} changed, {} unchanged",
            "✓".green().bold(),
            changed,
            resources.len() - changed
        );
    }

    Ok(())
}
