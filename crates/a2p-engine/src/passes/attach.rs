use super::BLANK_ROW;
use crate::error::{at, RecordError, Step};
use crate::record::RecordState;
use crate::remote::Provider;
use crate::runner::{Admission, RowPass};
use crate::session::{open_session, SubaccountPolicy};
use a2p_common::types::CampaignStatus;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Attaches each row's phone number to its messaging service once the
/// campaign is verified
pub struct PhoneAttachPass {
    provider: Arc<dyn Provider>,
}

impl PhoneAttachPass {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RowPass for PhoneAttachPass {
    fn name(&self) -> &'static str {
        "attach-numbers"
    }

    fn admits(&self, record: &RecordState) -> Admission {
        if record.is_blank() {
            return Admission::Skip(BLANK_ROW);
        }
        if record.status.phone_attached {
            return Admission::Skip("phone number already attached");
        }
        if record.status.campaign != Some(CampaignStatus::Verified) {
            return Admission::Skip("campaign not verified");
        }
        if record.applicant.phone_number.is_empty() || record.ids.messaging_service.is_none() {
            return Admission::Skip("no phone number or messaging service");
        }
        Admission::Process
    }

    async fn process(&self, record: &mut RecordState) -> Result<(), RecordError> {
        let row = record.row_number();
        let session =
            open_session(&*self.provider, record, SubaccountPolicy::RootWhenMissing).await?;

        let service = record.ids.messaging_service.clone().unwrap_or_default();
        let number = &record.applicant.phone_number;
        let sms_url = &record.applicant.phone_number_url;

        let phone_sid = session
            .find_phone_number(number)
            .await
            .map_err(at(Step::PhoneNumberLookup, row))?
            .ok_or_else(|| {
                RecordError::step(
                    Step::PhoneNumberLookup,
                    row,
                    format!("{} is not a number on this account", number),
                )
            })?;

        if !sms_url.is_empty() {
            session
                .set_phone_number_sms_url(&phone_sid, sms_url)
                .await
                .map_err(at(Step::PhoneNumberUrl, row))?;
        }

        session
            .attach_phone_number(&service, &phone_sid)
            .await
            .map_err(at(Step::PhoneNumberAttachment, row))?;

        info!(row, number = %number, service = %service, "Attached phone number");
        record.status.phone_attached = true;
        Ok(())
    }
}
