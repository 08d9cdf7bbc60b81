//! Validates a launch dataset and writes `<file>.manifest.json` next to it.
//!
//! Run with: cargo run --bin dataset_manifest -- data/spacex_launch_dash.csv

use anyhow::{bail, Context, Result};
use launchdash::data::{analyze, default_manifest_path, validate_schema, REQUIRED_COLUMNS};
use launchdash::logging::{log, obj, v_str, Domain, Level};
use serde_json::json;
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() -> Result<()> {
    let path = PathBuf::from(
        env::args()
            .nth(1)
            .or_else(|| env::var("DATA_PATH").ok())
            .unwrap_or_else(|| "data/spacex_launch_dash.csv".to_string()),
    );

    let schema = validate_schema(&path).context("schema check failed")?;
    if !schema.ok {
        eprintln!("required columns: {:?}", REQUIRED_COLUMNS);
        bail!("{}", schema.message);
    }

    let (_, manifest) = analyze(&path).with_context(|| format!("failed to load {}", path.display()))?;

    let out_path = default_manifest_path(&path);
    let payload = json!({
        "manifest": manifest,
        "schema": schema,
    });
    fs::write(&out_path, serde_json::to_string_pretty(&payload)?)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    log(
        Level::Info,
        Domain::Data,
        "manifest_written",
        obj(&[
            ("path", v_str(&out_path.display().to_string())),
            ("rows", json!(manifest.row_count)),
            ("hash_sha256", v_str(&manifest.hash_sha256)),
        ]),
    );
    println!("wrote manifest {}", out_path.display());
    Ok(())
}
