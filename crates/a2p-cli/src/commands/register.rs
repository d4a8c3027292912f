//! `a2p register` command implementation
//!
//! Runs the full registration chain on every row without a customer profile.

use super::run_batch;
use crate::config::Settings;
use crate::error::Result;
use a2p_engine::passes::RegisterPass;
use a2p_engine::BatchReport;
use std::path::Path;
use std::sync::Arc;

pub async fn run(settings: &Settings, input: &Path, output: &Path) -> Result<BatchReport> {
    settings.require_primary_profile()?;
    let provider = settings.provider()?;
    let config = Arc::new(settings.engine_config());

    let pass = Arc::new(RegisterPass::new(provider, config.clone()));
    run_batch(pass, input, output, config.concurrency).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_primary_profile_writes_nothing() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("TWILIO_ACCOUNT_SID", "ACroot"), ("TWILIO_AUTH_TOKEN", "secret")]);
        let settings = Settings::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.csv");

        let err = run(&settings, &dir.path().join("in.csv"), &output)
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::Config(_)));
        assert!(!output.exists());
    }
}
