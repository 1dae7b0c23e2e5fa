use std::{env, fs, path::PathBuf};

use shipyard_api::openapi::ApiDocV1;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi/shipyard-api.v1.json";

/// Writes the work order console API document, to the first argument if given.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let doc = ApiDocV1::openapi();
    let route_count = doc.paths.paths.len();
    let json = serde_json::to_string_pretty(&doc)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, json)?;

    println!(
        "shipyard work order API: {route_count} routes exported to {}",
        output_path.display()
    );
    Ok(())
}
