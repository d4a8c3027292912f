//! Per-record provisioning state machine
//!
//! [`Pipeline::run`] walks a record from one [`ProvisioningState`] to the next,
//! one handler per state. A handler either returns the next state or a
//! [`RecordError`]; the error is stored on the record and the walk stops in
//! [`ProvisioningState::Failed`]. Once the error slot is set no handler runs
//! again for that record.
//!
//! Handlers never create a remote entity whose id the record already holds,
//! so a walk can be restarted from any state.

use crate::config::EngineConfig;
use crate::error::{at, RecordError, Step};
use crate::poll::poll_until;
use crate::record::RecordState;
use crate::remote::{BrandRegistration, BrandRequest, Campaign, ComplianceApi, EndUserRequest};
use crate::state::ProvisioningState;
use a2p_common::types::{BrandStatus, CampaignStatus};
use std::time::Duration;
use tracing::{debug, info, warn};

type StepResult = Result<ProvisioningState, RecordError>;

const PROFILE_SUBJECT: &str = "customer profile";
const TRUST_BUNDLE_SUBJECT: &str = "trust bundle";

pub struct Pipeline<'a> {
    session: &'a dyn ComplianceApi,
    config: &'a EngineConfig,
    record: &'a mut RecordState,
    row: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        session: &'a dyn ComplianceApi,
        config: &'a EngineConfig,
        record: &'a mut RecordState,
    ) -> Self {
        let row = record.row_number();
        Self {
            session,
            config,
            record,
            row,
        }
    }

    /// Walk from `from` until `until` or a terminal state is reached
    ///
    /// Returns the state the walk stopped in.
    pub async fn run(
        &mut self,
        from: ProvisioningState,
        until: ProvisioningState,
    ) -> ProvisioningState {
        let mut state = from;

        loop {
            if state == until || state.is_terminal() {
                return state;
            }
            if self.record.has_error() {
                return ProvisioningState::Failed;
            }

            debug!(row = self.row, state = %state, "Entering state");
            match self.step(state).await {
                Ok(next) => state = next,
                Err(err) => {
                    warn!(
                        row = self.row,
                        state = %state,
                        step = ?err.step_kind(),
                        error = %err,
                        "Step failed"
                    );
                    self.record.fail(err);
                    return ProvisioningState::Failed;
                },
            }
        }
    }

    /// Walk from `from` to the end of the chain
    pub async fn run_from(&mut self, from: ProvisioningState) -> ProvisioningState {
        self.run(from, ProvisioningState::Done).await
    }

    async fn step(&mut self, state: ProvisioningState) -> StepResult {
        use ProvisioningState::*;

        match state {
            ProfileCreating => self.create_profile().await,
            ProfilePopulating => self.populate_profile().await,
            ProfileAssigning => self.assign_profile().await,
            ProfileEvaluating => self.evaluate_profile().await,
            ProfileSubmitting => self.submit_profile().await,
            TrustBundleCreating => self.create_trust_bundle().await,
            TrustBundleAssigning => self.assign_trust_bundle().await,
            TrustBundleEvaluating => self.evaluate_trust_bundle().await,
            TrustBundleSubmitting => self.submit_trust_bundle().await,
            BrandCreating => self.create_brand().await,
            BrandPolling => self.poll_brand().await,
            MessagingServiceCreating => self.create_messaging_service().await,
            CampaignCreating => self.create_campaign().await,
            CampaignPolling => self.poll_campaign().await,
            Blank | SkippedAlreadyDone | Done | Failed => Ok(state),
        }
    }

    fn require(&self, step: Step, id: &Option<String>, what: &str) -> Result<String, RecordError> {
        id.clone()
            .ok_or_else(|| RecordError::step(step, self.row, format!("record has no {} id", what)))
    }

    async fn pause(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    // ========================================================================
    // Customer profile
    // ========================================================================

    async fn create_profile(&mut self) -> StepResult {
        if self.record.ids.customer_profile.is_none() {
            let applicant = &self.record.applicant;
            let profile = self
                .session
                .create_customer_profile(&applicant.friendly_id, &applicant.contact_email)
                .await
                .map_err(at(Step::CustomerProfile, self.row))?;
            info!(row = self.row, profile = %profile.sid, "Created customer profile");
            self.record.ids.customer_profile = Some(profile.sid);
        }
        Ok(ProvisioningState::ProfilePopulating)
    }

    async fn populate_profile(&mut self) -> StepResult {
        let row = self.row;

        if self.record.ids.business_information.is_none() {
            let applicant = &self.record.applicant;
            let request = EndUserRequest::business_information(
                &applicant.friendly_id,
                &applicant.business_identity(),
            );
            let end_user = self
                .session
                .create_end_user(&request)
                .await
                .map_err(at(Step::BusinessInformation, row))?;
            self.record.ids.business_information = Some(end_user.sid);
        }

        if self.record.ids.authorized_rep.is_none() {
            let request =
                EndUserRequest::authorized_representative(&self.record.applicant.representative);
            let end_user = self
                .session
                .create_end_user(&request)
                .await
                .map_err(at(Step::AuthorizedRepresentative, row))?;
            self.record.ids.authorized_rep = Some(end_user.sid);
        }

        if self.record.ids.address.is_none() {
            let applicant = &self.record.applicant;
            let address = self
                .session
                .create_address(&applicant.business_name, &applicant.address)
                .await
                .map_err(at(Step::Address, row))?;
            self.record.ids.address = Some(address);
        }

        if self.record.ids.supporting_document.is_none() {
            let address = self.require(
                Step::SupportingDocument,
                &self.record.ids.address,
                "address",
            )?;
            let document = self
                .session
                .create_supporting_document(&self.record.applicant.friendly_id, &address)
                .await
                .map_err(at(Step::SupportingDocument, row))?;
            self.record.ids.supporting_document = Some(document.sid);
        }

        Ok(ProvisioningState::ProfileAssigning)
    }

    async fn assign_profile(&mut self) -> StepResult {
        let ids = &self.record.ids;
        let profile = self.require(
            Step::RepresentativeAssignment,
            &ids.customer_profile,
            "customer profile",
        )?;
        let primary = self.config.primary_profile_sid.clone().ok_or_else(|| {
            RecordError::step(
                Step::PrimaryProfileAssignment,
                self.row,
                "no primary customer profile configured",
            )
        })?;

        let objects = [
            (
                Step::RepresentativeAssignment,
                self.require(
                    Step::RepresentativeAssignment,
                    &ids.authorized_rep,
                    "authorized representative",
                )?,
            ),
            (
                Step::DocumentAssignment,
                self.require(
                    Step::DocumentAssignment,
                    &ids.supporting_document,
                    "supporting document",
                )?,
            ),
            (
                Step::BusinessAssignment,
                self.require(
                    Step::BusinessAssignment,
                    &ids.business_information,
                    "business information",
                )?,
            ),
            (Step::PrimaryProfileAssignment, primary),
        ];

        for (step, object_sid) in objects {
            // the profile rejects assignments made right after entity creation
            Self::pause(self.config.timings.profile_assignment_delay).await;
            self.session
                .assign_to_customer_profile(&profile, &object_sid)
                .await
                .map_err(at(step, self.row))?;
            debug!(
                row = self.row,
                step = %step,
                object = %object_sid,
                "Assigned to customer profile"
            );
        }

        Ok(ProvisioningState::ProfileEvaluating)
    }

    async fn evaluate_profile(&mut self) -> StepResult {
        let profile = self.require(
            Step::ProfileEvaluation,
            &self.record.ids.customer_profile,
            "customer profile",
        )?;
        let evaluation = self
            .session
            .evaluate_customer_profile(&profile)
            .await
            .map_err(at(Step::ProfileEvaluation, self.row))?;

        let compliant = evaluation.status.is_compliant();
        self.record.status.profile_evaluation = Some(evaluation.status.clone());
        if !compliant {
            return Err(RecordError::compliance(
                Step::ProfileEvaluation,
                self.row,
                PROFILE_SUBJECT,
                &evaluation.failed_object_types(),
            ));
        }
        Ok(ProvisioningState::ProfileSubmitting)
    }

    async fn submit_profile(&mut self) -> StepResult {
        let profile = self.require(
            Step::ProfileSubmission,
            &self.record.ids.customer_profile,
            "customer profile",
        )?;
        self.session
            .submit_customer_profile(&profile)
            .await
            .map_err(at(Step::ProfileSubmission, self.row))?;
        info!(row = self.row, profile = %profile, "Submitted customer profile");
        Ok(ProvisioningState::TrustBundleCreating)
    }

    // ========================================================================
    // Trust bundle
    // ========================================================================

    async fn create_trust_bundle(&mut self) -> StepResult {
        let row = self.row;

        if self.record.ids.trust_bundle.is_none() {
            let applicant = &self.record.applicant;
            let bundle = self
                .session
                .create_trust_bundle(&applicant.friendly_id, &applicant.contact_email)
                .await
                .map_err(at(Step::TrustBundle, row))?;
            info!(row, bundle = %bundle.sid, "Created trust bundle");
            self.record.ids.trust_bundle = Some(bundle.sid);
        }

        if self.record.ids.trust_bundle_end_user.is_none() {
            let request = EndUserRequest::messaging_profile(&self.record.applicant.friendly_id);
            let end_user = self
                .session
                .create_end_user(&request)
                .await
                .map_err(at(Step::TrustBundleEndUser, row))?;
            self.record.ids.trust_bundle_end_user = Some(end_user.sid);
        }

        Ok(ProvisioningState::TrustBundleAssigning)
    }

    async fn assign_trust_bundle(&mut self) -> StepResult {
        let ids = &self.record.ids;
        let bundle = self.require(
            Step::TrustBundleEndUserAssignment,
            &ids.trust_bundle,
            "trust bundle",
        )?;
        let end_user = self.require(
            Step::TrustBundleEndUserAssignment,
            &ids.trust_bundle_end_user,
            "trust bundle end user",
        )?;
        let profile = self.require(
            Step::TrustBundleProfileAssignment,
            &ids.customer_profile,
            "customer profile",
        )?;

        Self::pause(self.config.timings.trust_assignment_delay).await;
        self.session
            .assign_to_trust_bundle(&bundle, &end_user)
            .await
            .map_err(at(Step::TrustBundleEndUserAssignment, self.row))?;
        self.session
            .assign_to_trust_bundle(&bundle, &profile)
            .await
            .map_err(at(Step::TrustBundleProfileAssignment, self.row))?;

        Ok(ProvisioningState::TrustBundleEvaluating)
    }

    async fn evaluate_trust_bundle(&mut self) -> StepResult {
        let bundle = self.require(
            Step::TrustBundleEvaluation,
            &self.record.ids.trust_bundle,
            "trust bundle",
        )?;
        let evaluation = self
            .session
            .evaluate_trust_bundle(&bundle)
            .await
            .map_err(at(Step::TrustBundleEvaluation, self.row))?;

        let compliant = evaluation.status.is_compliant();
        self.record.status.trust_bundle_evaluation = Some(evaluation.status.clone());
        if !compliant {
            return Err(RecordError::compliance(
                Step::TrustBundleEvaluation,
                self.row,
                TRUST_BUNDLE_SUBJECT,
                &evaluation.failed_object_types(),
            ));
        }
        Ok(ProvisioningState::TrustBundleSubmitting)
    }

    async fn submit_trust_bundle(&mut self) -> StepResult {
        let bundle = self.require(
            Step::TrustBundleSubmission,
            &self.record.ids.trust_bundle,
            "trust bundle",
        )?;
        self.session
            .submit_trust_bundle(&bundle)
            .await
            .map_err(at(Step::TrustBundleSubmission, self.row))?;
        info!(row = self.row, bundle = %bundle, "Submitted trust bundle");
        Ok(ProvisioningState::BrandCreating)
    }

    // ========================================================================
    // Brand
    // ========================================================================

    async fn create_brand(&mut self) -> StepResult {
        if self.record.ids.brand.is_none() {
            let ids = &self.record.ids;
            let request = BrandRequest {
                customer_profile_sid: self.require(
                    Step::Brand,
                    &ids.customer_profile,
                    "customer profile",
                )?,
                trust_bundle_sid: self.require(Step::Brand, &ids.trust_bundle, "trust bundle")?,
                skip_automatic_sec_vet: true,
                mock: self.config.mock_brands,
            };
            let brand = self
                .session
                .create_brand(&request)
                .await
                .map_err(at(Step::Brand, self.row))?;
            info!(
                row = self.row,
                brand = %brand.sid,
                mock = request.mock,
                "Created brand registration"
            );
            self.record.ids.brand = Some(brand.sid);
            self.record.status.brand = Some(brand.status);
        }
        Ok(ProvisioningState::BrandPolling)
    }

    async fn poll_brand(&mut self) -> StepResult {
        let brand_sid = self.require(Step::BrandStatus, &self.record.ids.brand, "brand")?;
        let timings = self.config.timings;
        let session = self.session;

        let outcome = poll_until(
            timings.brand_poll_attempts,
            timings.brand_poll_interval,
            || session.fetch_brand(&brand_sid),
            |brand| brand.status.is_pending(),
        )
        .await
        .map_err(at(Step::BrandStatus, self.row))?;

        if !outcome.converged {
            warn!(
                row = self.row,
                brand = %brand_sid,
                attempts = outcome.attempts,
                "Brand still pending; keeping last observed status"
            );
        }

        self.apply_brand(&outcome.value);
        match outcome.value.status {
            BrandStatus::Approved => Ok(ProvisioningState::MessagingServiceCreating),
            status => {
                debug!(row = self.row, status = %status, "Brand not approved; stopping");
                Ok(ProvisioningState::Done)
            },
        }
    }

    fn apply_brand(&mut self, brand: &BrandRegistration) {
        if brand.status == BrandStatus::Failed {
            self.record.diagnostics.brand_failure_reason = brand.failure_summary();
        }
        self.record.status.brand = Some(brand.status.clone());
    }

    // ========================================================================
    // Messaging service and campaign
    // ========================================================================

    async fn create_messaging_service(&mut self) -> StepResult {
        if self.record.ids.messaging_service.is_none() {
            let service = self
                .session
                .create_messaging_service(&self.record.applicant.friendly_id)
                .await
                .map_err(at(Step::MessagingService, self.row))?;
            info!(row = self.row, service = %service, "Created messaging service");
            self.record.ids.messaging_service = Some(service);
        }
        Ok(ProvisioningState::CampaignCreating)
    }

    async fn create_campaign(&mut self) -> StepResult {
        if self.record.status.campaign.is_none() {
            let ids = &self.record.ids;
            let service = self.require(
                Step::Campaign,
                &ids.messaging_service,
                "messaging service",
            )?;
            let brand = self.require(Step::Campaign, &ids.brand, "brand")?;
            let request = self.record.applicant.campaign_request(&brand);

            let campaign = self
                .session
                .create_campaign(&service, &request)
                .await
                .map_err(at(Step::Campaign, self.row))?;
            info!(row = self.row, campaign = %campaign.sid, "Created campaign");
            self.record.status.campaign = Some(campaign.campaign_status);
        }
        Ok(ProvisioningState::CampaignPolling)
    }

    async fn poll_campaign(&mut self) -> StepResult {
        self.refresh_campaign().await?;
        Ok(ProvisioningState::Done)
    }

    fn apply_campaign(&mut self, campaign: &Campaign) {
        if campaign.campaign_status == CampaignStatus::Failed {
            if let Some(error) = campaign.first_error() {
                self.record.diagnostics.campaign_error_code =
                    error.error_code.map(|code| code.to_string());
                self.record.diagnostics.campaign_failure_reason = error.description.clone();
            }
        }
        self.record.status.campaign = Some(campaign.campaign_status.clone());
    }

    // ========================================================================
    // Single observations (status refresh)
    // ========================================================================

    /// Fetch the brand once and record what was seen
    pub async fn refresh_brand(&mut self) -> Result<(), RecordError> {
        let brand_sid = self.require(Step::BrandStatus, &self.record.ids.brand, "brand")?;
        let brand = self
            .session
            .fetch_brand(&brand_sid)
            .await
            .map_err(at(Step::BrandStatus, self.row))?;
        self.apply_brand(&brand);
        Ok(())
    }

    /// Fetch the campaign once and record what was seen
    pub async fn refresh_campaign(&mut self) -> Result<(), RecordError> {
        let service = self.require(
            Step::CampaignStatus,
            &self.record.ids.messaging_service,
            "messaging service",
        )?;
        let campaign = self
            .session
            .fetch_campaign(&service)
            .await
            .map_err(at(Step::CampaignStatus, self.row))?;
        self.apply_campaign(&campaign);
        Ok(())
    }

    pub fn record(&self) -> &RecordState {
        self.record
    }

    pub fn record_mut(&mut self) -> &mut RecordState {
        self.record
    }

    pub fn session(&self) -> &'a dyn ComplianceApi {
        self.session
    }

    pub fn row(&self) -> usize {
        self.row
    }
}
