use super::BLANK_ROW;
use crate::config::EngineConfig;
use crate::error::RecordError;
use crate::pipeline::Pipeline;
use crate::record::RecordState;
use crate::remote::Provider;
use crate::runner::{Admission, RowPass};
use crate::session::{open_session, SubaccountPolicy};
use a2p_common::types::CampaignStatus;
use async_trait::async_trait;
use std::sync::Arc;

/// Observes pending brands and in-flight campaigns once, creating nothing
pub struct StatusRefreshPass {
    provider: Arc<dyn Provider>,
    config: Arc<EngineConfig>,
}

impl StatusRefreshPass {
    pub fn new(provider: Arc<dyn Provider>, config: Arc<EngineConfig>) -> Self {
        Self { provider, config }
    }

    fn brand_open(record: &RecordState) -> bool {
        record.ids.brand.is_some()
            && record
                .status
                .brand
                .as_ref()
                .map_or(true, |status| status.is_pending())
    }

    fn campaign_open(record: &RecordState) -> bool {
        record.ids.messaging_service.is_some()
            && record
                .status
                .campaign
                .as_ref()
                .is_some_and(CampaignStatus::is_settling)
    }
}

#[async_trait]
impl RowPass for StatusRefreshPass {
    fn name(&self) -> &'static str {
        "refresh"
    }

    fn admits(&self, record: &RecordState) -> Admission {
        if record.is_blank() {
            Admission::Skip(BLANK_ROW)
        } else if Self::brand_open(record) || Self::campaign_open(record) {
            Admission::Process
        } else {
            Admission::Skip("nothing pending")
        }
    }

    async fn process(&self, record: &mut RecordState) -> Result<(), RecordError> {
        let brand_open = Self::brand_open(record);
        let campaign_open = Self::campaign_open(record);

        let session =
            open_session(&*self.provider, record, SubaccountPolicy::RootWhenMissing).await?;
        let mut pipeline = Pipeline::new(&*session, &self.config, record);

        if brand_open {
            pipeline.refresh_brand().await?;
        }
        if campaign_open {
            pipeline.refresh_campaign().await?;
        }
        Ok(())
    }
}
