//! Checkpoint column contract
//!
//! The checkpoint is a CSV file whose header must equal [`SCHEMA`] exactly,
//! column for column. Any change to the column list bumps [`SCHEMA_VERSION`].

use serde::{Deserialize, Serialize};

/// Version of the column list below
///
/// Version 1 was the original 52-column sheet. Version 2 adds the
/// intermediate identifiers (business information, representative, address,
/// supporting document, trust bundle end user) so a rerun never recreates them.
pub const SCHEMA_VERSION: u32 = 2;

/// Ordered checkpoint header
pub const SCHEMA: [&str; 57] = [
    // identity inputs
    "friendlyId",
    "subaccount",
    "businessName",
    "street",
    "city",
    "state",
    "postalCode",
    "country",
    "contactEmail",
    "industry",
    "businessRegionOfOperation",
    "EIN",
    "businessStructure",
    "websiteUrl",
    "useCase",
    "useCaseDescription",
    "sampleTextOne",
    "sampleTextTwo",
    "embeddedPhone",
    "embeddedLink",
    "authorizedRepFirstName",
    "authorizedRepLastName",
    "authorizedRepEmail",
    "authorizedRepTitle",
    "authorizedRepPosition",
    "authorizedRepPhone",
    "customerType",
    "stockExchange",
    "stockTicker",
    "brandType",
    "messageFlow",
    "optIn",
    "optInMessage",
    "optOut",
    "optOutMessage",
    "helpKeywords",
    "helpMessage",
    "twilioPhone",
    "twilioPhoneUrl",
    // produced identifiers and status projections
    "customerProfileSid",
    "businessInformationSid",
    "authorizedRepSid",
    "addressSid",
    "customerDocumentSid",
    "customerProfileEval",
    "trustBundleSid",
    "trustBundleEndUserSid",
    "trustBundleEval",
    "brandSid",
    "messagingServiceSid",
    "brandStatus",
    "brandFailureReason",
    "campaignStatus",
    "campaignFailureReason",
    "twilioPhoneAttached",
    "campaignErrorCode",
    // diagnostics
    "error",
];

/// One checkpoint line as stored on disk
///
/// Field order must follow [`SCHEMA`]; the writer relies on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointRow {
    pub friendly_id: String,
    pub subaccount: String,
    pub business_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub contact_email: String,
    pub industry: String,
    pub business_region_of_operation: String,
    #[serde(rename = "EIN")]
    pub ein: String,
    pub business_structure: String,
    pub website_url: String,
    pub use_case: String,
    pub use_case_description: String,
    pub sample_text_one: String,
    pub sample_text_two: String,
    pub embedded_phone: String,
    pub embedded_link: String,
    pub authorized_rep_first_name: String,
    pub authorized_rep_last_name: String,
    pub authorized_rep_email: String,
    pub authorized_rep_title: String,
    pub authorized_rep_position: String,
    pub authorized_rep_phone: String,
    pub customer_type: String,
    pub stock_exchange: String,
    pub stock_ticker: String,
    pub brand_type: String,
    pub message_flow: String,
    pub opt_in: String,
    pub opt_in_message: String,
    pub opt_out: String,
    pub opt_out_message: String,
    pub help_keywords: String,
    pub help_message: String,
    pub twilio_phone: String,
    pub twilio_phone_url: String,
    pub customer_profile_sid: String,
    pub business_information_sid: String,
    pub authorized_rep_sid: String,
    pub address_sid: String,
    pub customer_document_sid: String,
    pub customer_profile_eval: String,
    pub trust_bundle_sid: String,
    pub trust_bundle_end_user_sid: String,
    pub trust_bundle_eval: String,
    pub brand_sid: String,
    pub messaging_service_sid: String,
    pub brand_status: String,
    pub brand_failure_reason: String,
    pub campaign_status: String,
    pub campaign_failure_reason: String,
    pub twilio_phone_attached: String,
    pub campaign_error_code: String,
    pub error: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_serialized_header_matches_schema() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(CheckpointRow::default()).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();

        assert_eq!(header, SCHEMA.join(","));
    }

    #[test]
    fn test_schema_columns_are_unique() {
        let unique: HashSet<_> = SCHEMA.iter().collect();
        assert_eq!(unique.len(), SCHEMA.len());
    }

    #[test]
    fn test_error_is_last_column() {
        assert_eq!(SCHEMA.last(), Some(&"error"));
    }
}
