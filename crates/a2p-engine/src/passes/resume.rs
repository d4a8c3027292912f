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

/// Picks up rows that stopped at or after brand creation
///
/// The brand is polled again and, once approved, the messaging service and
/// campaign are created.
pub struct ResumePass {
    provider: Arc<dyn Provider>,
    config: Arc<EngineConfig>,
}

impl ResumePass {
    pub fn new(provider: Arc<dyn Provider>, config: Arc<EngineConfig>) -> Self {
        Self { provider, config }
    }
}

#[async_trait]
impl RowPass for ResumePass {
    fn name(&self) -> &'static str {
        "resume"
    }

    fn admits(&self, record: &RecordState) -> Admission {
        use ProvisioningState::*;

        match derive_state(record) {
            Blank => Admission::Skip(BLANK_ROW),
            BrandCreating | BrandPolling | MessagingServiceCreating | CampaignCreating => {
                Admission::Process
            },
            CampaignPolling | Done => Admission::Skip("campaign already created"),
            _ => Admission::Skip("trust bundle not compliant yet"),
        }
    }

    async fn process(&self, record: &mut RecordState) -> Result<(), RecordError> {
        let from = derive_state(record);
        let session =
            open_session(&*self.provider, record, SubaccountPolicy::RootWhenMissing).await?;
        Pipeline::new(&*session, &self.config, record)
            .run_from(from)
            .await;
        Ok(())
    }
}
