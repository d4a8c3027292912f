//! `a2p attach-numbers` command implementation

use super::run_batch;
use crate::config::Settings;
use crate::error::Result;
use a2p_engine::passes::PhoneAttachPass;
use a2p_engine::BatchReport;
use std::path::Path;
use std::sync::Arc;

/// Attach phone numbers for rows whose campaign is verified
pub async fn run(settings: &Settings, file: &Path) -> Result<BatchReport> {
    let pass = Arc::new(PhoneAttachPass::new(settings.provider()?));
    run_batch(pass, file, file, settings.concurrency).await
}
