//! Per-row record state
//!
//! A [`RecordState`] is built from one checkpoint line, mutated in place by a
//! pass, and turned back into a line when the batch is written. The row index
//! is fixed at construction and used for every message about the row.

use crate::error::{ErrorKind, RecordError};
use crate::remote::{BusinessIdentity, CampaignRequest, PostalAddress, Representative};
use crate::schema::CheckpointRow;
use a2p_common::types::{BrandStatus, CampaignStatus, EvaluationStatus};

/// Value written to `twilioPhoneAttached` once the number is on the service
pub const ATTACHED_FLAG: &str = "Y";

/// Comma separated keyword cell
///
/// Earlier tooling wrote these cells as JSON arrays; brackets and quotes are
/// stripped on read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    raw: String,
    words: Vec<String>,
}

impl KeywordSet {
    pub fn parse(cell: &str) -> Self {
        let noise = |c: char| matches!(c, '[' | ']' | '"') || c.is_whitespace();
        let words = cell
            .split(',')
            .map(|word| word.trim_matches(noise))
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            raw: cell.to_string(),
            words,
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Cell text to write back. Clean cells are kept as read.
    pub fn to_cell(&self) -> String {
        if self.raw.contains(['[', ']', '"']) {
            self.words.join(",")
        } else {
            self.raw.clone()
        }
    }
}

/// Yes/no cell; blank means yes
fn flag(cell: &str) -> bool {
    !matches!(
        cell.trim().to_ascii_lowercase().as_str(),
        "false" | "no" | "n" | "0"
    )
}

fn optional(cell: String) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == cell.len() {
        Some(cell)
    } else {
        Some(trimmed.to_string())
    }
}

fn cell(value: &Option<impl ToString>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Business details read from the input sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applicant {
    pub friendly_id: String,
    pub business_name: String,
    pub address: PostalAddress,
    pub contact_email: String,
    pub industry: String,
    pub region_of_operation: String,
    pub ein: String,
    pub business_structure: String,
    pub website_url: String,
    pub use_case: String,
    pub use_case_description: String,
    pub sample_text_one: String,
    pub sample_text_two: String,
    pub embedded_phone: String,
    pub embedded_link: String,
    pub representative: Representative,
    pub customer_type: String,
    pub stock_exchange: String,
    pub stock_ticker: String,
    pub brand_type: String,
    pub message_flow: String,
    pub opt_in: KeywordSet,
    pub opt_in_message: String,
    pub opt_out: KeywordSet,
    pub opt_out_message: String,
    pub help_keywords: KeywordSet,
    pub help_message: String,
    pub phone_number: String,
    pub phone_number_url: String,
}

impl Applicant {
    pub fn business_identity(&self) -> BusinessIdentity {
        BusinessIdentity {
            business_name: self.business_name.clone(),
            website_url: self.website_url.clone(),
            regions_of_operation: self.region_of_operation.clone(),
            business_type: self.business_structure.clone(),
            industry: self.industry.clone(),
            registration_number: self.ein.clone(),
        }
    }

    pub fn campaign_request(&self, brand_sid: &str) -> CampaignRequest {
        let message_samples = [&self.sample_text_one, &self.sample_text_two]
            .into_iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect();

        CampaignRequest {
            brand_registration_sid: brand_sid.to_string(),
            use_case: self.use_case.clone(),
            description: self.use_case_description.clone(),
            message_flow: self.message_flow.clone(),
            message_samples,
            opt_in_keywords: self.opt_in.words().to_vec(),
            opt_in_message: self.opt_in_message.clone(),
            opt_out_keywords: self.opt_out.words().to_vec(),
            opt_out_message: self.opt_out_message.clone(),
            help_keywords: self.help_keywords.words().to_vec(),
            help_message: self.help_message.clone(),
            has_embedded_links: flag(&self.embedded_link),
            has_embedded_phone: flag(&self.embedded_phone),
        }
    }
}

/// Identifiers of remote entities created for the row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducedIds {
    pub customer_profile: Option<String>,
    pub business_information: Option<String>,
    pub authorized_rep: Option<String>,
    pub address: Option<String>,
    pub supporting_document: Option<String>,
    pub trust_bundle: Option<String>,
    pub trust_bundle_end_user: Option<String>,
    pub brand: Option<String>,
    pub messaging_service: Option<String>,
}

/// Last observed remote statuses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusProjection {
    pub profile_evaluation: Option<EvaluationStatus>,
    pub trust_bundle_evaluation: Option<EvaluationStatus>,
    pub brand: Option<BrandStatus>,
    pub campaign: Option<CampaignStatus>,
    pub phone_attached: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub error: Option<RecordError>,
    pub brand_failure_reason: Option<String>,
    pub campaign_failure_reason: Option<String>,
    pub campaign_error_code: Option<String>,
}

/// State of one checkpoint row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordState {
    index: usize,
    pub subaccount: Option<String>,
    pub applicant: Applicant,
    pub ids: ProducedIds,
    pub status: StatusProjection,
    pub diagnostics: Diagnostics,
    /// Line the record was read from
    source: Option<Box<CheckpointRow>>,
}

impl RecordState {
    /// Empty record at `index`
    pub fn new(index: usize) -> Self {
        Self {
            index,
            subaccount: None,
            applicant: Applicant::default(),
            ids: ProducedIds::default(),
            status: StatusProjection::default(),
            diagnostics: Diagnostics::default(),
            source: None,
        }
    }

    pub fn from_row(index: usize, row: CheckpointRow) -> Self {
        let source = Some(Box::new(row.clone()));
        let applicant = Applicant {
            friendly_id: row.friendly_id,
            business_name: row.business_name,
            address: PostalAddress {
                street: row.street,
                city: row.city,
                region: row.state,
                postal_code: row.postal_code,
                iso_country: row.country,
            },
            contact_email: row.contact_email,
            industry: row.industry,
            region_of_operation: row.business_region_of_operation,
            ein: row.ein,
            business_structure: row.business_structure,
            website_url: row.website_url,
            use_case: row.use_case,
            use_case_description: row.use_case_description,
            sample_text_one: row.sample_text_one,
            sample_text_two: row.sample_text_two,
            embedded_phone: row.embedded_phone,
            embedded_link: row.embedded_link,
            representative: Representative {
                first_name: row.authorized_rep_first_name,
                last_name: row.authorized_rep_last_name,
                email: row.authorized_rep_email,
                business_title: row.authorized_rep_title,
                job_position: row.authorized_rep_position,
                phone_number: row.authorized_rep_phone,
            },
            customer_type: row.customer_type,
            stock_exchange: row.stock_exchange,
            stock_ticker: row.stock_ticker,
            brand_type: row.brand_type,
            message_flow: row.message_flow,
            opt_in: KeywordSet::parse(&row.opt_in),
            opt_in_message: row.opt_in_message,
            opt_out: KeywordSet::parse(&row.opt_out),
            opt_out_message: row.opt_out_message,
            help_keywords: KeywordSet::parse(&row.help_keywords),
            help_message: row.help_message,
            phone_number: row.twilio_phone,
            phone_number_url: row.twilio_phone_url,
        };

        let ids = ProducedIds {
            customer_profile: optional(row.customer_profile_sid),
            business_information: optional(row.business_information_sid),
            authorized_rep: optional(row.authorized_rep_sid),
            address: optional(row.address_sid),
            supporting_document: optional(row.customer_document_sid),
            trust_bundle: optional(row.trust_bundle_sid),
            trust_bundle_end_user: optional(row.trust_bundle_end_user_sid),
            brand: optional(row.brand_sid),
            messaging_service: optional(row.messaging_service_sid),
        };

        let status = StatusProjection {
            profile_evaluation: optional(row.customer_profile_eval).map(EvaluationStatus::from),
            trust_bundle_evaluation: optional(row.trust_bundle_eval).map(EvaluationStatus::from),
            brand: optional(row.brand_status).map(BrandStatus::from),
            campaign: optional(row.campaign_status).map(CampaignStatus::from),
            phone_attached: row.twilio_phone_attached.trim() == ATTACHED_FLAG,
        };

        let diagnostics = Diagnostics {
            error: optional(row.error).map(RecordError::carried),
            brand_failure_reason: optional(row.brand_failure_reason),
            campaign_failure_reason: optional(row.campaign_failure_reason),
            campaign_error_code: optional(row.campaign_error_code),
        };

        Self {
            index,
            subaccount: optional(row.subaccount),
            applicant,
            ids,
            status,
            diagnostics,
            source,
        }
    }

    /// Line to write back. A record that still matches the line it was read
    /// from is written back cell for cell.
    pub fn to_row(&self) -> CheckpointRow {
        match &self.source {
            Some(source) if Self::from_row(self.index, (**source).clone()) == *self => {
                (**source).clone()
            }
            _ => self.render(),
        }
    }

    fn render(&self) -> CheckpointRow {
        let a = &self.applicant;
        CheckpointRow {
            friendly_id: a.friendly_id.clone(),
            subaccount: cell(&self.subaccount),
            business_name: a.business_name.clone(),
            street: a.address.street.clone(),
            city: a.address.city.clone(),
            state: a.address.region.clone(),
            postal_code: a.address.postal_code.clone(),
            country: a.address.iso_country.clone(),
            contact_email: a.contact_email.clone(),
            industry: a.industry.clone(),
            business_region_of_operation: a.region_of_operation.clone(),
            ein: a.ein.clone(),
            business_structure: a.business_structure.clone(),
            website_url: a.website_url.clone(),
            use_case: a.use_case.clone(),
            use_case_description: a.use_case_description.clone(),
            sample_text_one: a.sample_text_one.clone(),
            sample_text_two: a.sample_text_two.clone(),
            embedded_phone: a.embedded_phone.clone(),
            embedded_link: a.embedded_link.clone(),
            authorized_rep_first_name: a.representative.first_name.clone(),
            authorized_rep_last_name: a.representative.last_name.clone(),
            authorized_rep_email: a.representative.email.clone(),
            authorized_rep_title: a.representative.business_title.clone(),
            authorized_rep_position: a.representative.job_position.clone(),
            authorized_rep_phone: a.representative.phone_number.clone(),
            customer_type: a.customer_type.clone(),
            stock_exchange: a.stock_exchange.clone(),
            stock_ticker: a.stock_ticker.clone(),
            brand_type: a.brand_type.clone(),
            message_flow: a.message_flow.clone(),
            opt_in: a.opt_in.to_cell(),
            opt_in_message: a.opt_in_message.clone(),
            opt_out: a.opt_out.to_cell(),
            opt_out_message: a.opt_out_message.clone(),
            help_keywords: a.help_keywords.to_cell(),
            help_message: a.help_message.clone(),
            twilio_phone: a.phone_number.clone(),
            twilio_phone_url: a.phone_number_url.clone(),
            customer_profile_sid: cell(&self.ids.customer_profile),
            business_information_sid: cell(&self.ids.business_information),
            authorized_rep_sid: cell(&self.ids.authorized_rep),
            address_sid: cell(&self.ids.address),
            customer_document_sid: cell(&self.ids.supporting_document),
            customer_profile_eval: cell(&self.status.profile_evaluation),
            trust_bundle_sid: cell(&self.ids.trust_bundle),
            trust_bundle_end_user_sid: cell(&self.ids.trust_bundle_end_user),
            trust_bundle_eval: cell(&self.status.trust_bundle_evaluation),
            brand_sid: cell(&self.ids.brand),
            messaging_service_sid: cell(&self.ids.messaging_service),
            brand_status: cell(&self.status.brand),
            brand_failure_reason: cell(&self.diagnostics.brand_failure_reason),
            campaign_status: cell(&self.status.campaign),
            campaign_failure_reason: cell(&self.diagnostics.campaign_failure_reason),
            twilio_phone_attached: if self.status.phone_attached {
                ATTACHED_FLAG.to_string()
            } else {
                String::new()
            },
            campaign_error_code: cell(&self.diagnostics.campaign_error_code),
            error: cell(&self.diagnostics.error),
        }
    }

    /// 0-based position in the source
    pub fn index(&self) -> usize {
        self.index
    }

    /// Spreadsheet row number (the header is row 1)
    pub fn row_number(&self) -> usize {
        self.index + 2
    }

    /// Rows without a business name are placeholders and never touched
    pub fn is_blank(&self) -> bool {
        self.applicant.business_name.trim().is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.diagnostics.error.is_some()
    }

    pub fn error(&self) -> Option<&RecordError> {
        self.diagnostics.error.as_ref()
    }

    /// Record the first failure of this pass. Later failures are dropped.
    pub fn fail(&mut self, err: RecordError) {
        if self.diagnostics.error.is_none() {
            self.diagnostics.error = Some(err);
        }
    }

    /// Drop an error inherited from the previous run
    pub fn clear_carried_error(&mut self) {
        if matches!(self.error().map(RecordError::kind), Some(ErrorKind::Carried)) {
            self.diagnostics.error = None;
        }
    }

    /// Whether a later status refresh can still change the row
    pub fn is_settling(&self) -> bool {
        let brand_open = matches!(
            self.status.brand,
            Some(BrandStatus::Pending) | Some(BrandStatus::InReview)
        );
        let campaign_open = self
            .status
            .campaign
            .as_ref()
            .is_some_and(CampaignStatus::is_settling);
        brand_open || campaign_open
    }
}
