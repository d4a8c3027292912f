//! Provisioning states and state derivation
//!
//! A row does not store its state. [`derive_state`] reads the identifiers and
//! statuses the row already carries and names the step at which work would
//! resume, which is what makes every pass safe to rerun.

use crate::record::RecordState;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProvisioningState {
    /// No business name; the row is a placeholder
    Blank,
    /// The row already holds a customer profile
    SkippedAlreadyDone,
    ProfileCreating,
    ProfilePopulating,
    ProfileAssigning,
    ProfileEvaluating,
    ProfileSubmitting,
    TrustBundleCreating,
    TrustBundleAssigning,
    TrustBundleEvaluating,
    TrustBundleSubmitting,
    BrandCreating,
    BrandPolling,
    MessagingServiceCreating,
    CampaignCreating,
    CampaignPolling,
    Done,
    Failed,
}

impl ProvisioningState {
    pub fn as_str(self) -> &'static str {
        match self {
            ProvisioningState::Blank => "blank",
            ProvisioningState::SkippedAlreadyDone => "skipped",
            ProvisioningState::ProfileCreating => "profile-creating",
            ProvisioningState::ProfilePopulating => "profile-populating",
            ProvisioningState::ProfileAssigning => "profile-assigning",
            ProvisioningState::ProfileEvaluating => "profile-evaluating",
            ProvisioningState::ProfileSubmitting => "profile-submitting",
            ProvisioningState::TrustBundleCreating => "trust-bundle-creating",
            ProvisioningState::TrustBundleAssigning => "trust-bundle-assigning",
            ProvisioningState::TrustBundleEvaluating => "trust-bundle-evaluating",
            ProvisioningState::TrustBundleSubmitting => "trust-bundle-submitting",
            ProvisioningState::BrandCreating => "brand-creating",
            ProvisioningState::BrandPolling => "brand-polling",
            ProvisioningState::MessagingServiceCreating => "messaging-service-creating",
            ProvisioningState::CampaignCreating => "campaign-creating",
            ProvisioningState::CampaignPolling => "campaign-polling",
            ProvisioningState::Done => "done",
            ProvisioningState::Failed => "failed",
        }
    }

    /// States the pipeline stops in
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProvisioningState::Blank
                | ProvisioningState::SkippedAlreadyDone
                | ProvisioningState::Done
                | ProvisioningState::Failed
        )
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where work on `record` would resume
pub fn derive_state(record: &RecordState) -> ProvisioningState {
    use ProvisioningState::*;

    let ids = &record.ids;
    let status = &record.status;
    let compliant = |eval: &Option<a2p_common::types::EvaluationStatus>| {
        eval.as_ref().is_some_and(|e| e.is_compliant())
    };

    if record.is_blank() {
        return Blank;
    }
    if ids.customer_profile.is_none() {
        return ProfileCreating;
    }
    if !compliant(&status.profile_evaluation) {
        return ProfileEvaluating;
    }
    if ids.trust_bundle.is_none() {
        return TrustBundleCreating;
    }
    if !compliant(&status.trust_bundle_evaluation) {
        return TrustBundleEvaluating;
    }
    if ids.brand.is_none() {
        return BrandCreating;
    }
    if !status.brand.as_ref().is_some_and(|b| b.is_approved()) {
        return BrandPolling;
    }
    if ids.messaging_service.is_none() {
        return MessagingServiceCreating;
    }
    match &status.campaign {
        None => CampaignCreating,
        Some(campaign) if campaign.is_settling() => CampaignPolling,
        Some(_) => Done,
    }
}
