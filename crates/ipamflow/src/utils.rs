use colored::Colorize;
use ipamflow_api::{ClientOptions, MicetroClient};
use ipamflow_config::Credentials;
use ipamflow_core::{DesiredResource, Manifest, ReconcileResult};
use serde_json::{Value, json};
use std::path::PathBuf;

/// Load the manifest at `path`, or the discovered one
pub fn load_manifest(path: Option<PathBuf>) -> anyhow::Result<(PathBuf, Manifest)> {
    let path = match path {
        Some(path) => path,
        None => ipamflow_config::find_manifest_file()?,
    };
    tracing::debug!(path = %path.display(), "Loading manifest");

    let manifest = ipamflow_core::parse_manifest_file(&path)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
    Ok((path, manifest))
}

/// Resources to act on, in manifest order
pub fn select<'a>(
    manifest: &'a Manifest,
    only: Option<&str>,
) -> anyhow::Result<Vec<&'a DesiredResource>> {
    match only {
        Some(name) => {
            let selected = manifest.only(name);
            if selected.is_empty() {
                anyhow::bail!("No resource named '{}' in the manifest", name);
            }
            Ok(selected)
        }
        None => Ok(manifest.resources.iter().collect()),
    }
}

/// Build an API client from the resolved credentials
pub fn connect(manifest: &Manifest) -> anyhow::Result<MicetroClient> {
    let credentials = Credentials::resolve(manifest.provider.as_ref())?;
    tracing::debug!(?credentials, "Resolved credentials");
    Ok(MicetroClient::new(credentials, ClientOptions::default())?)
}

pub fn print_loaded_manifest(path: &std::path::Path) {
    println!("📄 {}", path.display().to_string().cyan());
}

/// Message as plain text; structured messages are printed as JSON
pub fn message_text(message: &Value) -> String {
    match message {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn print_result(resource: &DesiredResource, result: &ReconcileResult) {
    if result.changed {
        println!(
            "  {} {} {}",
            "✓".green(),
            resource.label().bold(),
            "changed".yellow()
        );
        let text = message_text(&result.message);
        if !text.is_empty() {
            println!("    {}", text.dimmed());
        }
    } else {
        println!(
            "  {} {} {}",
            "✓".green(),
            resource.label(),
            "ok".dimmed()
        );
    }
}

pub fn json_line(resource: &DesiredResource, changed: bool, message: Value) -> String {
    json!({
        "resource": resource.label(),
        "changed": changed,
        "message": message,
    })
    .to_string()
}
