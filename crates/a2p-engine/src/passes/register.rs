use super::BLANK_ROW;
use crate::config::EngineConfig;
use crate::error::RecordError;
use crate::pipeline::Pipeline;
use crate::record::RecordState;
use crate::remote::Provider;
use crate::runner::{Admission, RowPass};
use crate::session::{open_session, SubaccountPolicy};
use crate::state::{derive_state, ProvisioningState};
use async_trait::async_trait;
use std::sync::Arc;

/// Runs the full chain on rows that have not been registered yet
///
/// Rows that already hold a customer profile are left exactly as read.
pub struct RegisterPass {
    provider: Arc<dyn Provider>,
    config: Arc<EngineConfig>,
}

impl RegisterPass {
    pub fn new(provider: Arc<dyn Provider>, config: Arc<EngineConfig>) -> Self {
        Self { provider, config }
    }
}

#[async_trait]
impl RowPass for RegisterPass {
    fn name(&self) -> &'static str {
        "register"
    }

    fn admits(&self, record: &RecordState) -> Admission {
        match derive_state(record) {
            ProvisioningState::Blank => Admission::Skip(BLANK_ROW),
            ProvisioningState::ProfileCreating => Admission::Process,
            _ => Admission::Skip("customer profile already created"),
        }
    }

    async fn process(&self, record: &mut RecordState) -> Result<(), RecordError> {
        let session =
            open_session(&*self.provider, record, SubaccountPolicy::CreateWhenMissing).await?;
        Pipeline::new(&*session, &self.config, record)
            .run_from(ProvisioningState::ProfileCreating)
            .await;
        Ok(())
    }
}
