//! `a2p refresh` command implementation

use super::run_batch;
use crate::config::Settings;
use crate::error::Result;
use a2p_engine::passes::StatusRefreshPass;
use a2p_engine::BatchReport;
use std::path::Path;
use std::sync::Arc;

/// Record the current brand and campaign status of every pending row
pub async fn run(settings: &Settings, file: &Path) -> Result<BatchReport> {
    let provider = settings.provider()?;
    let config = Arc::new(settings.engine_config());

    let pass = Arc::new(StatusRefreshPass::new(provider, config.clone()));
    run_batch(pass, file, file, config.concurrency).await
}
