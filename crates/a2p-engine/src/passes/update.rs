//! In-place correction of registered rows
//!
//! The applicant cells are treated as the new truth. The customer profile is
//! moved back to draft when needed, every assigned entity is rewritten from the
//! row, and the profile, trust bundle and brand are resubmitted. Profiles that
//! are under review or already approved are refused.

use super::BLANK_ROW;
use crate::config::EngineConfig;
use crate::error::{at, RecordError, Step};
use crate::pipeline::Pipeline;
use crate::record::RecordState;
use crate::remote::{AssignedObject, BundleUpdate, ComplianceApi, EndUserType, Provider};
use crate::runner::{Admission, RowPass};
use crate::session::{open_session, SubaccountPolicy};
use crate::state::ProvisioningState;
use a2p_common::types::BundleStatus;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

pub const PROFILE_IN_REVIEW: &str = "Customer Profile is 'in-review' and cannot be updated. \
    Try again later. If issue persists, restart from scratch or contact support.";
pub const PROFILE_APPROVED: &str = "Customer Profile is already approved and cannot be updated. \
    Start from scratch or request support put it back into draft status.";
pub const NO_EXTERNAL_BRAND_ID: &str = "No external brand id available, so updates are not \
    allowed. Restart from scratch. You have not been charged.";

pub struct ProfileUpdatePass {
    provider: Arc<dyn Provider>,
    config: Arc<EngineConfig>,
}

impl ProfileUpdatePass {
    pub fn new(provider: Arc<dyn Provider>, config: Arc<EngineConfig>) -> Self {
        Self { provider, config }
    }
}

#[async_trait]
impl RowPass for ProfileUpdatePass {
    fn name(&self) -> &'static str {
        "update"
    }

    fn admits(&self, record: &RecordState) -> Admission {
        if record.is_blank() {
            Admission::Skip(BLANK_ROW)
        } else if record.ids.customer_profile.is_none() {
            Admission::Skip("no customer profile to update")
        } else {
            Admission::Process
        }
    }

    async fn process(&self, record: &mut RecordState) -> Result<(), RecordError> {
        let row = record.row_number();
        let session =
            open_session(&*self.provider, record, SubaccountPolicy::RootWhenMissing).await?;
        let session = &*session;

        // an external id means the brand was charged for and can be resubmitted
        let external_brand_id = match record.ids.brand.clone() {
            Some(brand_sid) => session
                .fetch_brand(&brand_sid)
                .await
                .map_err(at(Step::BrandStatus, row))?
                .external_id()
                .map(str::to_string),
            None => None,
        };

        redraft_profile(session, record).await?;
        rewrite_assigned_entities(session, record).await?;

        let mut pipeline = Pipeline::new(session, &self.config, record);

        // re-evaluate and resubmit the profile
        if pipeline
            .run(
                ProvisioningState::ProfileEvaluating,
                ProvisioningState::TrustBundleCreating,
            )
            .await
            == ProvisioningState::Failed
        {
            return Ok(());
        }

        if !update_trust_bundle(&mut pipeline).await? {
            return Ok(());
        }

        update_brand(&mut pipeline, external_brand_id).await
    }
}

async fn redraft_profile(
    session: &dyn ComplianceApi,
    record: &mut RecordState,
) -> Result<(), RecordError> {
    let row = record.row_number();
    let profile_sid = record.ids.customer_profile.clone().unwrap_or_default();

    let profile = session
        .fetch_customer_profile(&profile_sid)
        .await
        .map_err(at(Step::ProfileStatus, row))?;

    match profile.status {
        BundleStatus::InReview => {
            return Err(RecordError::refused(Step::ProfileUpdate, row, PROFILE_IN_REVIEW))
        },
        BundleStatus::TwilioApproved => {
            return Err(RecordError::refused(Step::ProfileUpdate, row, PROFILE_APPROVED))
        },
        _ => {},
    }

    let applicant = &record.applicant;
    let update = BundleUpdate::redraft(
        &profile.status,
        &applicant.friendly_id,
        &applicant.contact_email,
    );
    session
        .update_customer_profile(&profile_sid, &update)
        .await
        .map_err(at(Step::ProfileUpdate, row))?;
    debug!(row, from = %profile.status, "Customer profile back in draft");

    record.status.profile_evaluation = None;
    Ok(())
}

/// Rewrite every entity assigned to the profile from the row's cells
///
/// Identifiers found along the way fill the row's blank id cells.
async fn rewrite_assigned_entities(
    session: &dyn ComplianceApi,
    record: &mut RecordState,
) -> Result<(), RecordError> {
    let row = record.row_number();
    let profile_sid = record.ids.customer_profile.clone().unwrap_or_default();

    let assignments = session
        .list_customer_profile_assignments(&profile_sid)
        .await
        .map_err(at(Step::EntityLookup, row))?;

    for assignment in assignments {
        let object_sid = assignment.object_sid.as_str();
        match assignment.object_kind() {
            AssignedObject::EndUser => {
                let end_user = session
                    .fetch_end_user(object_sid)
                    .await
                    .map_err(at(Step::EntityLookup, row))?;
                let attributes = match end_user.kind {
                    EndUserType::BusinessInformation => {
                        let sid = object_sid.to_string();
                        record.ids.business_information.get_or_insert(sid);
                        record.applicant.business_identity().attributes()
                    },
                    EndUserType::AuthorizedRepresentative1 => {
                        record.ids.authorized_rep.get_or_insert_with(|| object_sid.to_string());
                        record.applicant.representative.attributes()
                    },
                    other => {
                        debug!(
                            row,
                            end_user = %object_sid,
                            kind = other.as_str(),
                            "Leaving end user as is"
                        );
                        continue;
                    },
                };
                session
                    .update_end_user(object_sid, &attributes)
                    .await
                    .map_err(at(Step::EndUserUpdate, row))?;
            },
            AssignedObject::SupportingDocument => {
                let document = session
                    .fetch_supporting_document(object_sid)
                    .await
                    .map_err(at(Step::EntityLookup, row))?;
                let Some(address_sid) = document.address_sid() else {
                    debug!(row, document = %object_sid, "Document has no address");
                    continue;
                };
                let applicant = &record.applicant;
                session
                    .update_address(&address_sid, &applicant.business_name, &applicant.address)
                    .await
                    .map_err(at(Step::AddressUpdate, row))?;
                record.ids.supporting_document.get_or_insert_with(|| object_sid.to_string());
                record.ids.address.get_or_insert(address_sid);
            },
            AssignedObject::Bundle | AssignedObject::Unknown => {},
        }
    }

    Ok(())
}

/// Returns whether the walk may continue to the brand
async fn update_trust_bundle(pipeline: &mut Pipeline<'_>) -> Result<bool, RecordError> {
    let row = pipeline.row();
    let session = pipeline.session();

    let from = match pipeline.record().ids.trust_bundle.clone() {
        None => ProvisioningState::TrustBundleCreating,
        Some(bundle_sid) => {
            let record = pipeline.record();
            let compliant = record
                .status
                .trust_bundle_evaluation
                .as_ref()
                .is_some_and(|eval| eval.is_compliant());
            if compliant {
                return Ok(true);
            }

            let bundle = session
                .fetch_trust_bundle(&bundle_sid)
                .await
                .map_err(at(Step::TrustBundleStatus, row))?;
            let applicant = &record.applicant;
            let update = BundleUpdate::redraft(
                &bundle.status,
                &applicant.friendly_id,
                &applicant.contact_email,
            );
            session
                .update_trust_bundle(&bundle_sid, &update)
                .await
                .map_err(at(Step::TrustBundleUpdate, row))?;
            ProvisioningState::TrustBundleEvaluating
        },
    };

    let reached = pipeline.run(from, ProvisioningState::BrandCreating).await;
    Ok(reached != ProvisioningState::Failed)
}

async fn update_brand(
    pipeline: &mut Pipeline<'_>,
    external_brand_id: Option<String>,
) -> Result<(), RecordError> {
    let row = pipeline.row();

    let Some(brand_sid) = pipeline.record().ids.brand.clone() else {
        pipeline
            .run(ProvisioningState::BrandCreating, ProvisioningState::BrandPolling)
            .await;
        return Ok(());
    };

    if external_brand_id.is_none() {
        return Err(RecordError::refused(Step::BrandUpdate, row, NO_EXTERNAL_BRAND_ID));
    }

    let brand = pipeline
        .session()
        .resubmit_brand(&brand_sid)
        .await
        .map_err(at(Step::BrandUpdate, row))?;
    info!(row, brand = %brand_sid, status = %brand.status, "Resubmitted brand");

    let record = pipeline.record_mut();
    record.status.brand = Some(brand.status);
    record.diagnostics.brand_failure_reason = None;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::passes::testing::config;
    use crate::record::fixtures::applicant;
    use crate::remote::fake::FakeProvider;
    use crate::runner::BatchRunner;
    use a2p_common::types::{BrandStatus, EvaluationStatus};

    fn pass(provider: &FakeProvider) -> Arc<ProfileUpdatePass> {
        Arc::new(ProfileUpdatePass::new(Arc::new(provider.clone()), config()))
    }

    /// A registered row whose profile holds one of each entity
    fn registered(provider: &FakeProvider) -> RecordState {
        provider.seed_end_user("BU1", "IT0100", EndUserType::BusinessInformation);
        provider.seed_end_user("BU1", "IT0101", EndUserType::AuthorizedRepresentative1);
        provider.seed_end_user("BU1", "IT0102", EndUserType::AuthorizedRepresentative2);
        provider.seed_document("BU1", "RD0100", "AD0100");

        let mut record = applicant(0, "alpha");
        record.subaccount = Some("ACsub".to_string());
        record.ids.customer_profile = Some("BU1".to_string());
        record.status.profile_evaluation = Some(EvaluationStatus::Noncompliant);
        record.ids.trust_bundle = Some("BU2".to_string());
        record.status.trust_bundle_evaluation = Some(EvaluationStatus::Noncompliant);
        record.ids.brand = Some("BN1".to_string());
        record.status.brand = Some(BrandStatus::Failed);
        record.diagnostics.brand_failure_reason = Some("TAX_ID".to_string());
        record
    }

    #[tokio::test]
    async fn test_draft_profile_is_rewritten_and_resubmitted() {
        let provider = FakeProvider::new();
        let record = registered(&provider);

        let outcome = BatchRunner::new(1).run(pass(&provider), vec![record]).await;
        let record = &outcome.records[0];

        assert!(!record.has_error(), "{:?}", record.error());
        assert_eq!(provider.calls_named("update_end_user"), 2);
        assert_eq!(provider.calls_named("update_address"), 1);
        assert_eq!(record.ids.business_information.as_deref(), Some("IT0100"));
        assert_eq!(record.ids.address.as_deref(), Some("AD0100"));
        assert_eq!(record.status.profile_evaluation, Some(EvaluationStatus::Compliant));
        assert_eq!(record.status.trust_bundle_evaluation, Some(EvaluationStatus::Compliant));
        assert_eq!(provider.calls_named("resubmit_brand"), 1);
        assert_eq!(record.status.brand, Some(BrandStatus::Pending));
        assert!(record.diagnostics.brand_failure_reason.is_none());
        assert_eq!(provider.calls_named("create_trust_bundle"), 0);
    }

    #[tokio::test]
    async fn test_in_review_profile_is_refused() {
        let provider = FakeProvider::new();
        provider.set_profile_status(BundleStatus::InReview);
        let record = registered(&provider);

        let outcome = BatchRunner::new(1).run(pass(&provider), vec![record]).await;
        let err = outcome.records[0].error().unwrap();

        assert_eq!(err.kind(), ErrorKind::Refused);
        assert!(err.to_string().contains(PROFILE_IN_REVIEW));
        assert_eq!(provider.calls_named("update_customer_profile"), 0);
        assert_eq!(provider.calls_named("update_end_user"), 0);
    }

    #[tokio::test]
    async fn test_approved_profile_is_refused() {
        let provider = FakeProvider::new();
        provider.set_profile_status(BundleStatus::TwilioApproved);
        let record = registered(&provider);

        let outcome = BatchRunner::new(1).run(pass(&provider), vec![record]).await;

        assert!(outcome.records[0]
            .error()
            .unwrap()
            .to_string()
            .contains(PROFILE_APPROVED));
    }

    #[tokio::test]
    async fn test_rejected_profile_goes_back_to_draft_first() {
        let provider = FakeProvider::new();
        provider.set_profile_status(BundleStatus::TwilioRejected);
        let record = registered(&provider);

        BatchRunner::new(1).run(pass(&provider), vec![record]).await;

        let first_update = provider
            .calls()
            .into_iter()
            .find(|call| call.op == "update_customer_profile")
            .unwrap();
        assert!(first_update.args.ends_with("BU1 draft"));
    }

    #[tokio::test]
    async fn test_brand_without_external_id_is_refused() {
        let provider = FakeProvider::new();
        provider.set_brand_tcr_id(None);
        let record = registered(&provider);

        let outcome = BatchRunner::new(1).run(pass(&provider), vec![record]).await;

        assert!(outcome.records[0]
            .error()
            .unwrap()
            .to_string()
            .contains("You have not been charged"));
        assert_eq!(provider.calls_named("resubmit_brand"), 0);
    }

    #[tokio::test]
    async fn test_missing_trust_bundle_and_brand_are_created() {
        let provider = FakeProvider::new();
        let mut record = registered(&provider);
        record.ids.trust_bundle = None;
        record.status.trust_bundle_evaluation = None;
        record.ids.brand = None;
        record.status.brand = None;

        let outcome = BatchRunner::new(1).run(pass(&provider), vec![record]).await;
        let record = &outcome.records[0];

        assert!(!record.has_error(), "{:?}", record.error());
        assert_eq!(provider.calls_named("create_trust_bundle"), 1);
        assert_eq!(provider.calls_named("create_brand"), 1);
        assert_eq!(provider.calls_named("fetch_brand"), 0);
        assert_eq!(record.status.brand, Some(BrandStatus::Pending));
    }

    #[tokio::test]
    async fn test_noncompliant_profile_stops_before_trust_bundle() {
        let provider = FakeProvider::new();
        provider.set_profile_verdict(EvaluationStatus::Noncompliant, &["customer_profile_address"]);
        let record = registered(&provider);

        let outcome = BatchRunner::new(1).run(pass(&provider), vec![record]).await;

        assert_eq!(
            outcome.records[0].error().unwrap().kind(),
            ErrorKind::Compliance
        );
        assert_eq!(provider.calls_named("fetch_trust_bundle"), 0);
        assert_eq!(provider.calls_named("resubmit_brand"), 0);
    }
}
