//! Registration service client
//!
//! Two seams:
//!
//! - [`Provider`] acts with the root account: creates subaccounts, looks up
//!   subaccount tokens and opens per-account sessions.
//! - [`ComplianceApi`] is one session bound to a single account's credentials.
//!   Every record opens its own session; nothing is shared across records.
//!
//! [`TwilioProvider`] is the HTTP implementation.

pub mod endpoints;
pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use http::{ApiHosts, TwilioProvider, TwilioSession};
pub use types::*;

use crate::error::RemoteResult;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Root-account operations
#[async_trait]
pub trait Provider: Send + Sync {
    fn root_account_sid(&self) -> &str;

    fn root_credentials(&self) -> Credentials;

    /// Create a subaccount and return its credentials
    async fn create_subaccount(&self, friendly_name: &str) -> RemoteResult<Credentials>;

    /// Look up the auth token of an existing subaccount
    async fn fetch_auth_token(&self, account_sid: &str) -> RemoteResult<String>;

    /// Open a session acting as the given account
    fn session(&self, credentials: Credentials) -> Arc<dyn ComplianceApi>;
}

/// Operations available within one account
#[async_trait]
pub trait ComplianceApi: Send + Sync {
    // ------------------------------------------------------------------
    // Customer profiles
    // ------------------------------------------------------------------

    async fn create_customer_profile(&self, friendly_name: &str, email: &str)
        -> RemoteResult<Bundle>;

    async fn fetch_customer_profile(&self, profile_sid: &str) -> RemoteResult<Bundle>;

    async fn update_customer_profile(
        &self,
        profile_sid: &str,
        update: &BundleUpdate,
    ) -> RemoteResult<Bundle>;

    async fn assign_to_customer_profile(
        &self,
        profile_sid: &str,
        object_sid: &str,
    ) -> RemoteResult<EntityAssignment>;

    async fn list_customer_profile_assignments(
        &self,
        profile_sid: &str,
    ) -> RemoteResult<Vec<EntityAssignment>>;

    async fn evaluate_customer_profile(&self, profile_sid: &str) -> RemoteResult<Evaluation>;

    /// Move the profile into review
    async fn submit_customer_profile(&self, profile_sid: &str) -> RemoteResult<Bundle> {
        self.update_customer_profile(profile_sid, &BundleUpdate::submit()).await
    }

    // ------------------------------------------------------------------
    // End users, addresses, documents
    // ------------------------------------------------------------------

    async fn create_end_user(&self, request: &EndUserRequest) -> RemoteResult<EndUser>;

    async fn fetch_end_user(&self, end_user_sid: &str) -> RemoteResult<EndUser>;

    async fn update_end_user(&self, end_user_sid: &str, attributes: &Value)
        -> RemoteResult<EndUser>;

    /// Create a postal address; returns its sid
    async fn create_address(
        &self,
        customer_name: &str,
        address: &PostalAddress,
    ) -> RemoteResult<String>;

    async fn update_address(
        &self,
        address_sid: &str,
        customer_name: &str,
        address: &PostalAddress,
    ) -> RemoteResult<()>;

    async fn create_supporting_document(
        &self,
        friendly_name: &str,
        address_sid: &str,
    ) -> RemoteResult<SupportingDocument>;

    async fn fetch_supporting_document(&self, document_sid: &str)
        -> RemoteResult<SupportingDocument>;

    // ------------------------------------------------------------------
    // Trust bundles
    // ------------------------------------------------------------------

    async fn create_trust_bundle(&self, friendly_name: &str, email: &str) -> RemoteResult<Bundle>;

    async fn fetch_trust_bundle(&self, bundle_sid: &str) -> RemoteResult<Bundle>;

    async fn update_trust_bundle(
        &self,
        bundle_sid: &str,
        update: &BundleUpdate,
    ) -> RemoteResult<Bundle>;

    async fn assign_to_trust_bundle(
        &self,
        bundle_sid: &str,
        object_sid: &str,
    ) -> RemoteResult<EntityAssignment>;

    async fn evaluate_trust_bundle(&self, bundle_sid: &str) -> RemoteResult<Evaluation>;

    async fn submit_trust_bundle(&self, bundle_sid: &str) -> RemoteResult<Bundle> {
        self.update_trust_bundle(bundle_sid, &BundleUpdate::submit()).await
    }

    // ------------------------------------------------------------------
    // Brands, services, campaigns
    // ------------------------------------------------------------------

    async fn create_brand(&self, request: &BrandRequest) -> RemoteResult<BrandRegistration>;

    async fn fetch_brand(&self, brand_sid: &str) -> RemoteResult<BrandRegistration>;

    /// Ask for a failed brand to be vetted again
    async fn resubmit_brand(&self, brand_sid: &str) -> RemoteResult<BrandRegistration>;

    /// Create a messaging service; returns its sid
    async fn create_messaging_service(&self, friendly_name: &str) -> RemoteResult<String>;

    async fn create_campaign(
        &self,
        service_sid: &str,
        request: &CampaignRequest,
    ) -> RemoteResult<Campaign>;

    /// The campaign registered on a messaging service
    async fn fetch_campaign(&self, service_sid: &str) -> RemoteResult<Campaign>;

    // ------------------------------------------------------------------
    // Phone numbers
    // ------------------------------------------------------------------

    /// Find an owned number; returns its sid
    async fn find_phone_number(&self, phone_number: &str) -> RemoteResult<Option<String>>;

    async fn set_phone_number_sms_url(&self, phone_sid: &str, sms_url: &str) -> RemoteResult<()>;

    async fn attach_phone_number(&self, service_sid: &str, phone_sid: &str) -> RemoteResult<()>;
}
