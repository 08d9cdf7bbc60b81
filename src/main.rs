use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use launchdash::binding::Dashboard;
use launchdash::config::Config;
use launchdash::data::analyze;
use launchdash::logging::{log, log_dataset_loaded, obj, v_str, Domain, Level};
use launchdash::server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_args_and_env();
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("data_path", v_str(&cfg.data_path.display().to_string())),
            ("addr", v_str(&cfg.bind_addr())),
        ]),
    );

    // A dataset that fails to load never gets served.
    let (dataset, manifest) = match analyze(&cfg.data_path) {
        Ok(loaded) => loaded,
        Err(err) => {
            log(
                Level::Fatal,
                Domain::Data,
                "dataset_load_failed",
                obj(&[
                    ("path", v_str(&cfg.data_path.display().to_string())),
                    ("error", v_str(&err.to_string())),
                ]),
            );
            return Err(err.into());
        }
    };
    log_dataset_loaded(
        &manifest.path,
        dataset.len(),
        manifest.sites.len(),
        dataset.min_payload(),
        dataset.max_payload(),
    );
    log(
        Level::Debug,
        Domain::Data,
        "manifest",
        obj(&[
            ("hash_sha256", v_str(&manifest.hash_sha256)),
            ("success_count", json!(manifest.success_count)),
        ]),
    );

    let dashboard = Dashboard::new(Arc::new(dataset));
    serve(&cfg, AppState::new(dashboard, Some(manifest))).await
}
