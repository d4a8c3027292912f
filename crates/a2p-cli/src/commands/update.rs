//! `a2p update` command implementation
//!
//! Rewrites registered profiles, trust bundles and brands from the cells of
//! the update file.

use super::run_batch;
use crate::config::Settings;
use crate::error::Result;
use a2p_engine::passes::ProfileUpdatePass;
use a2p_engine::BatchReport;
use std::path::Path;
use std::sync::Arc;

pub async fn run(settings: &Settings, input: &Path, output: &Path) -> Result<BatchReport> {
    let provider = settings.provider()?;
    let config = Arc::new(settings.engine_config());

    let pass = Arc::new(ProfileUpdatePass::new(provider, config.clone()));
    run_batch(pass, input, output, config.concurrency).await
}
