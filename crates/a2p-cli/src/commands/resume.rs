//! `a2p resume` command implementation
//!
//! Polls brands again and finishes the messaging service and campaign for
//! approved ones. The checkpoint is rewritten in place.

use super::run_batch;
use crate::config::Settings;
use crate::error::Result;
use a2p_engine::passes::ResumePass;
use a2p_engine::BatchReport;
use std::path::Path;
use std::sync::Arc;

pub async fn run(settings: &Settings, file: &Path) -> Result<BatchReport> {
    let provider = settings.provider()?;
    let config = Arc::new(settings.engine_config());

    let pass = Arc::new(ResumePass::new(provider, config.clone()));
    run_batch(pass, file, file, config.concurrency).await
}
