use crate::utils;
use colored::Colorize;
use ipamflow_core::{ActionType, Plan, PlanSummary, Reconciler};
use std::path::PathBuf;

/// Compute and print the plan for every selected resource
pub async fn handle(manifest: Option<PathBuf>, only: Option<&str>) -> anyhow::Result<()> {
    let (path, manifest) = utils::load_manifest(manifest)?;
    let resources = utils::select(&manifest, only)?;
    let client = utils::connect(&manifest)?;
    let reconciler = Reconciler::new(&client);

    utils::print_loaded_manifest(&path);
    println!("{}", "Planning changes...".blue());
    println!();

    let mut plans = Vec::with_capacity(resources.len());
    for resource in resources {
        let plan = reconciler
            .plan(resource)
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", resource.label(), e))?;
        print_plan(&plan);
        plans.push(plan);
    }

    let summary = PlanSummary::of(&plans);
    println!();
    if summary.has_changes() {
        println!("{} {}", "Plan:".bold(), summary);
    } else {
        println!("{}", "No changes. The platform matches the manifest.".green());
    }

    Ok(())
}

fn print_plan(plan: &Plan) {
    let symbol = match plan.action_type {
        ActionType::Create => "+".green(),
        ActionType::Update => "~".yellow(),
        ActionType::Delete => "-".red(),
        ActionType::NoOp => "=".dimmed(),
    };
    println!("  {} {}", symbol, plan.description);
    for operation in plan.operations.iter().filter(|op| op.verb.is_mutation()) {
        println!("      {}", operation.to_string().dimmed());
    }
}
