//! Request and response types for the registration service
//!
//! Response structs deserialize straight from the service's snake_case JSON;
//! fields the engine does not use are ignored.

use a2p_common::types::{BrandStatus, BundleStatus, CampaignStatus, EvaluationStatus};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ============================================================================
// Policies
// ============================================================================

/// Secondary customer profile policy
pub const SECONDARY_PROFILE_POLICY_SID: &str = "RNdfbf3fae0e1107f8aded0e7cead80bf5";

/// A2P messaging profile (trust bundle) policy
pub const A2P_TRUST_POLICY_SID: &str = "RNb0d4771c2c98518d916a3d4cd70a8f8b";

/// Only US businesses with an EIN are registered
pub const BUSINESS_REGISTRATION_IDENTIFIER: &str = "EIN";

pub const BUSINESS_IDENTITY: &str = "direct_customer";

/// Company type asserted on the messaging profile end user
pub const MESSAGING_PROFILE_COMPANY_TYPE: &str = "private";

// ============================================================================
// Identity inputs
// ============================================================================

/// Root or subaccount credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account_sid: String,
    pub auth_token: String,
}

impl Credentials {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Postal address of the business
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub iso_country: String,
}

/// Facts recorded on the `customer_profile_business_information` end user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessIdentity {
    pub business_name: String,
    pub website_url: String,
    pub regions_of_operation: String,
    pub business_type: String,
    pub industry: String,
    /// EIN
    pub registration_number: String,
}

impl BusinessIdentity {
    pub fn attributes(&self) -> Value {
        json!({
            "business_name": self.business_name,
            "website_url": self.website_url,
            "business_regions_of_operation": self.regions_of_operation,
            "business_type": self.business_type,
            "business_registration_identifier": BUSINESS_REGISTRATION_IDENTIFIER,
            "business_identity": BUSINESS_IDENTITY,
            "business_industry": self.industry,
            "business_registration_number": self.registration_number,
        })
    }
}

/// Authorized representative contact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Representative {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub business_title: String,
    pub job_position: String,
    pub phone_number: String,
}

impl Representative {
    pub fn attributes(&self) -> Value {
        json!({
            "job_position": self.job_position,
            "last_name": self.last_name,
            "phone_number": self.phone_number,
            "first_name": self.first_name,
            "email": self.email,
            "business_title": self.business_title,
        })
    }
}

// ============================================================================
// End users and documents
// ============================================================================

/// Kind of trust-hub end user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EndUserType {
    BusinessInformation,
    AuthorizedRepresentative1,
    AuthorizedRepresentative2,
    MessagingProfileInformation,
    Other(String),
}

impl EndUserType {
    pub fn as_str(&self) -> &str {
        match self {
            EndUserType::BusinessInformation => "customer_profile_business_information",
            EndUserType::AuthorizedRepresentative1 => "authorized_representative_1",
            EndUserType::AuthorizedRepresentative2 => "authorized_representative_2",
            EndUserType::MessagingProfileInformation => "us_a2p_messaging_profile_information",
            EndUserType::Other(raw) => raw,
        }
    }
}

impl From<String> for EndUserType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "customer_profile_business_information" => EndUserType::BusinessInformation,
            "authorized_representative_1" => EndUserType::AuthorizedRepresentative1,
            "authorized_representative_2" => EndUserType::AuthorizedRepresentative2,
            "us_a2p_messaging_profile_information" => EndUserType::MessagingProfileInformation,
            _ => EndUserType::Other(raw),
        }
    }
}

impl From<EndUserType> for String {
    fn from(kind: EndUserType) -> Self {
        kind.as_str().to_string()
    }
}

/// Request to create an end user
#[derive(Debug, Clone, PartialEq)]
pub struct EndUserRequest {
    pub friendly_name: String,
    pub kind: EndUserType,
    pub attributes: Value,
}

impl EndUserRequest {
    pub fn business_information(friendly_name: &str, identity: &BusinessIdentity) -> Self {
        Self {
            friendly_name: friendly_name.to_string(),
            kind: EndUserType::BusinessInformation,
            attributes: identity.attributes(),
        }
    }

    pub fn authorized_representative(representative: &Representative) -> Self {
        Self {
            friendly_name: "auth_rep_1".to_string(),
            kind: EndUserType::AuthorizedRepresentative1,
            attributes: representative.attributes(),
        }
    }

    pub fn messaging_profile(friendly_name: &str) -> Self {
        Self {
            friendly_name: friendly_name.to_string(),
            kind: EndUserType::MessagingProfileInformation,
            attributes: json!({ "company_type": MESSAGING_PROFILE_COMPANY_TYPE }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndUser {
    pub sid: String,
    #[serde(rename = "type")]
    pub kind: EndUserType,
    #[serde(default)]
    pub attributes: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SupportingDocument {
    pub sid: String,
    #[serde(default)]
    pub attributes: Value,
}

impl SupportingDocument {
    /// Address the document points at. The service returns either a single
    /// sid or a list depending on how the document was created.
    pub fn address_sid(&self) -> Option<String> {
        match self.attributes.get("address_sids")? {
            Value::String(sid) if !sid.is_empty() => Some(sid.clone()),
            Value::Array(sids) => sids.first().and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }
}

/// Link between a bundle and one of its entities
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityAssignment {
    pub sid: String,
    pub object_sid: String,
}

/// What an assigned object is, judged by its sid prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignedObject {
    EndUser,
    SupportingDocument,
    Bundle,
    Unknown,
}

impl EntityAssignment {
    pub fn object_kind(&self) -> AssignedObject {
        match self.object_sid.get(..2) {
            Some("IT") => AssignedObject::EndUser,
            Some("RD") => AssignedObject::SupportingDocument,
            Some("BU") => AssignedObject::Bundle,
            _ => AssignedObject::Unknown,
        }
    }
}

// ============================================================================
// Bundles (customer profiles and trust products)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Bundle {
    pub sid: String,
    pub status: BundleStatus,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Fields that may be changed on an existing bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleUpdate {
    pub status: Option<BundleStatus>,
    pub friendly_name: Option<String>,
    pub email: Option<String>,
}

impl BundleUpdate {
    /// Move the bundle into review
    pub fn submit() -> Self {
        Self {
            status: Some(BundleStatus::PendingReview),
            ..Self::default()
        }
    }

    /// Rewrite name and email, moving the bundle back to draft unless it already is
    pub fn redraft(current: &BundleStatus, friendly_name: &str, email: &str) -> Self {
        Self {
            status: (*current != BundleStatus::Draft).then_some(BundleStatus::Draft),
            friendly_name: Some(friendly_name.to_string()),
            email: Some(email.to_string()),
        }
    }

    pub fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = Vec::new();
        if let Some(status) = &self.status {
            form.push(("Status", status.to_string()));
        }
        if let Some(name) = &self.friendly_name {
            form.push(("FriendlyName", name.clone()));
        }
        if let Some(email) = &self.email {
            form.push(("Email", email.clone()));
        }
        form
    }
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Evaluation {
    #[serde(default)]
    pub sid: String,
    pub status: EvaluationStatus,
    #[serde(default)]
    pub results: Vec<EvaluationResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EvaluationResult {
    pub object_type: String,
    #[serde(default)]
    pub passed: bool,
}

impl Evaluation {
    /// Object types that did not pass, in report order
    pub fn failed_object_types(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|result| !result.passed)
            .map(|result| result.object_type.clone())
            .collect()
    }
}

// ============================================================================
// Brands, services, campaigns
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandRequest {
    pub customer_profile_sid: String,
    pub trust_bundle_sid: String,
    pub skip_automatic_sec_vet: bool,
    pub mock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrandRegistration {
    pub sid: String,
    pub status: BrandStatus,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub brand_feedback: Option<Vec<String>>,
    /// External brand id; present once the registration fee has been charged
    #[serde(default)]
    pub tcr_id: Option<String>,
}

impl BrandRegistration {
    /// Feedback codes when present, the free-text failure reason otherwise
    pub fn failure_summary(&self) -> Option<String> {
        match &self.brand_feedback {
            Some(feedback) if !feedback.is_empty() => Some(feedback.join(", ")),
            _ => self.failure_reason.clone().filter(|reason| !reason.is_empty()),
        }
    }

    pub fn external_id(&self) -> Option<&str> {
        self.tcr_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// US app-to-person campaign submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignRequest {
    pub brand_registration_sid: String,
    pub use_case: String,
    pub description: String,
    pub message_flow: String,
    pub message_samples: Vec<String>,
    pub opt_in_keywords: Vec<String>,
    pub opt_in_message: String,
    pub opt_out_keywords: Vec<String>,
    pub opt_out_message: String,
    pub help_keywords: Vec<String>,
    pub help_message: String,
    pub has_embedded_links: bool,
    pub has_embedded_phone: bool,
}

impl CampaignRequest {
    pub fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("BrandRegistrationSid", self.brand_registration_sid.clone()),
            ("UsAppToPersonUsecase", self.use_case.clone()),
            ("Description", self.description.clone()),
            ("MessageFlow", self.message_flow.clone()),
            ("OptInMessage", self.opt_in_message.clone()),
            ("OptOutMessage", self.opt_out_message.clone()),
            ("HelpMessage", self.help_message.clone()),
            ("HasEmbeddedLinks", self.has_embedded_links.to_string()),
            ("HasEmbeddedPhone", self.has_embedded_phone.to_string()),
        ];
        form.extend(self.message_samples.iter().map(|s| ("MessageSamples", s.clone())));
        form.extend(self.opt_in_keywords.iter().map(|k| ("OptInKeywords", k.clone())));
        form.extend(self.opt_out_keywords.iter().map(|k| ("OptOutKeywords", k.clone())));
        form.extend(self.help_keywords.iter().map(|k| ("HelpKeywords", k.clone())));
        form
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Campaign {
    pub sid: String,
    pub campaign_status: CampaignStatus,
    #[serde(default)]
    pub errors: Vec<CampaignError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CampaignError {
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Campaign {
    pub fn first_error(&self) -> Option<&CampaignError> {
        self.errors.first()
    }
}
