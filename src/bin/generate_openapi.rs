//! Writes the hub's OpenAPI document, for the dashboard's client generator.
//!
//!   cargo run --bin generate_openapi                 # print to stdout
//!   cargo run --bin generate_openapi -- docs/api.json

use std::{env, fs, io::Write, path::PathBuf};

use anyhow::{Context, Result};
use home_hub::api::handlers::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI document")?;

    match env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("OpenAPI document written to {}", path.display());
        }
        None => std::io::stdout()
            .lock()
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?,
    }
    Ok(())
}
