use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::chembl::ChemblStatus;
use crate::error::AnnotatorError;

pub const LOG_FILE: &str = "chemical_annotator.log";

const RULE: &str = "===========================================";

/// Replaces any previous log at `path` and routes `tracing` output into it.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_log_file(path: &Path) -> Result<(), AnnotatorError> {
    if path.exists() {
        fs::remove_file(path).map_err(|err| AnnotatorError::Filesystem(err.to_string()))?;
    }
    let file = File::create(path).map_err(|err| AnnotatorError::Filesystem(err.to_string()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| AnnotatorError::Filesystem(err.to_string()))
}

/// Run banner at the top of the log, followed by the ChEMBL release details.
pub fn log_run_header(status: Option<&ChemblStatus>) {
    tracing::info!("{RULE}");
    tracing::info!("            Chemical Annotator             ");
    tracing::info!("Version:  {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Author: {}", crate::AUTHOR);
    tracing::info!("Contact: {}", crate::CONTACT);
    tracing::info!("{}", crate::INSTITUTION);
    tracing::info!("{RULE}");
    match status {
        Some(status) => {
            let show = |value: Option<String>| value.unwrap_or_else(|| "n/a".to_string());
            tracing::info!(
                "ChEMBL Database Version: {}",
                show(status.chembl_db_version.clone())
            );
            tracing::info!(
                "ChEMBL Release Date: {}",
                show(status.chembl_release_date.clone())
            );
            tracing::info!("ChEMBL Status: {}", show(status.status.clone()));
            tracing::info!(
                "Number of Activities: {}",
                show(status.activities.map(|n| n.to_string()))
            );
            tracing::info!(
                "Number of Distinct Compounds: {}",
                show(status.disinct_compounds.map(|n| n.to_string()))
            );
            tracing::info!(
                "Number of Targets: {}",
                show(status.targets.map(|n| n.to_string()))
            );
        }
        None => tracing::warn!("Unable to fetch ChEMBL status information"),
    }
    tracing::info!("{RULE}");
    tracing::info!(started_at = %chrono::Local::now().to_rfc3339(), "run started");
}
