//! Error types for the provisioning engine
//!
//! Two layers:
//!
//! - [`RemoteError`]: a single call to the registration service failed.
//! - [`RecordError`]: what a row remembers about the first thing that went
//!   wrong for it during a pass. It is only turned into text when the row is
//!   written back to the checkpoint.

use std::fmt;
use thiserror::Error;

/// Result type alias for remote calls
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Failure of one remote call
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Connection, TLS or timeout failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with an error envelope
    #[error("HTTP {status}: {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// A lookup returned no matching resource
    #[error("{0} not found")]
    NotFound(String),

    /// The response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Build an API error, folding the service error code into the message
    pub fn api(status: u16, code: Option<i64>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = match code {
            Some(code) => format!("{} (code {})", message, code),
            None => message,
        };
        Self::Api {
            status,
            code,
            message,
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// The remote operation a row was attempting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Subaccount,
    SubaccountToken,
    CustomerProfile,
    BusinessInformation,
    AuthorizedRepresentative,
    Address,
    SupportingDocument,
    RepresentativeAssignment,
    DocumentAssignment,
    BusinessAssignment,
    PrimaryProfileAssignment,
    ProfileEvaluation,
    ProfileSubmission,
    TrustBundle,
    TrustBundleEndUser,
    TrustBundleEndUserAssignment,
    TrustBundleProfileAssignment,
    TrustBundleEvaluation,
    TrustBundleSubmission,
    Brand,
    BrandStatus,
    MessagingService,
    Campaign,
    CampaignStatus,
    PhoneNumberLookup,
    PhoneNumberUrl,
    PhoneNumberAttachment,
    ProfileStatus,
    ProfileUpdate,
    EntityLookup,
    EndUserUpdate,
    AddressUpdate,
    TrustBundleStatus,
    TrustBundleUpdate,
    BrandUpdate,
    Task,
}

impl Step {
    /// Human-readable label used as the message prefix in the error column
    pub fn label(self) -> &'static str {
        match self {
            Step::Subaccount => "subaccount creation",
            Step::SubaccountToken => "subaccount auth",
            Step::CustomerProfile => "customer profile",
            Step::BusinessInformation => "business information",
            Step::AuthorizedRepresentative => "authorized representative",
            Step::Address => "address",
            Step::SupportingDocument => "customer document",
            Step::RepresentativeAssignment => "end-user assignment",
            Step::DocumentAssignment => "supporting document assignment",
            Step::BusinessAssignment => "business information assignment",
            Step::PrimaryProfileAssignment => "primary profile assignment",
            Step::ProfileEvaluation => "customer profile evaluation",
            Step::ProfileSubmission => "secondary profile submission",
            Step::TrustBundle => "trust bundle creation",
            Step::TrustBundleEndUser => "trust bundle end user",
            Step::TrustBundleEndUserAssignment => "trust bundle end user assignment",
            Step::TrustBundleProfileAssignment => "trust bundle profile assignment",
            Step::TrustBundleEvaluation => "trust bundle evaluation",
            Step::TrustBundleSubmission => "trust bundle submission",
            Step::Brand => "brand",
            Step::BrandStatus => "brand status",
            Step::MessagingService => "messaging service creation",
            Step::Campaign => "campaign creation",
            Step::CampaignStatus => "campaign status",
            Step::PhoneNumberLookup => "phone number lookup",
            Step::PhoneNumberUrl => "phone number url",
            Step::PhoneNumberAttachment => "phone number allocation",
            Step::ProfileStatus => "customer profile status",
            Step::ProfileUpdate => "customer profile update",
            Step::EntityLookup => "customer profile entity",
            Step::EndUserUpdate => "end user update",
            Step::AddressUpdate => "address update",
            Step::TrustBundleStatus => "trust bundle status",
            Step::TrustBundleUpdate => "trust bundle update",
            Step::BrandUpdate => "brand update",
            Step::Task => "row task",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category of a row failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A remote call failed
    Step,
    /// An evaluation came back non-compliant
    Compliance,
    /// The remote entity is in a state that forbids the operation
    Refused,
    /// The row's task panicked
    Aborted,
    /// Text read back from a previous run's checkpoint
    Carried,
}

/// Structured value held in a row's error slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    kind: ErrorKind,
    step: Option<Step>,
    row: usize,
    cause: String,
}

impl RecordError {
    /// A remote call for `step` failed on visible row `row`
    pub fn step(step: Step, row: usize, cause: impl fmt::Display) -> Self {
        Self {
            kind: ErrorKind::Step,
            step: Some(step),
            row,
            cause: cause.to_string(),
        }
    }

    /// An evaluation of `subject` failed; `failed` lists the object types that did not pass
    pub fn compliance(step: Step, row: usize, subject: &str, failed: &[String]) -> Self {
        let cause = if failed.is_empty() {
            format!("non-compliant {}", subject)
        } else {
            format!(
                "non-compliant {}. The following objects failed evaluation: {}",
                subject,
                failed.join(", ")
            )
        };
        Self {
            kind: ErrorKind::Compliance,
            step: Some(step),
            row,
            cause,
        }
    }

    pub fn refused(step: Step, row: usize, reason: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Refused,
            step: Some(step),
            row,
            cause: reason.into(),
        }
    }

    pub fn aborted(row: usize, reason: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Aborted,
            step: Some(Step::Task),
            row,
            cause: reason.into(),
        }
    }

    /// Wrap the error column of a row loaded from a checkpoint
    pub fn carried(text: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Carried,
            step: None,
            row: 0,
            cause: text.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn step_kind(&self) -> Option<Step> {
        self.step
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.step) {
            (ErrorKind::Carried, _) | (_, None) => f.write_str(&self.cause),
            (ErrorKind::Step, Some(step)) => {
                write!(f, "{} error for row {}: {}", step, self.row, self.cause)
            },
            (ErrorKind::Compliance, Some(_)) => write!(f, "{} for row {}", self.cause, self.row),
            (ErrorKind::Refused, Some(step)) => {
                write!(f, "{} refused for row {}: {}", step, self.row, self.cause)
            },
            (ErrorKind::Aborted, Some(_)) => write!(f, "row {} aborted: {}", self.row, self.cause),
        }
    }
}

impl std::error::Error for RecordError {}

/// Adapter for `map_err`: tags a remote failure with the step and row it happened on
pub fn at(step: Step, row: usize) -> impl FnOnce(RemoteError) -> RecordError {
    move |err| RecordError::step(step, row, err)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_step_error_rendering() {
        let err = RecordError::step(
            Step::CustomerProfile,
            3,
            RemoteError::api(400, Some(21201), "Invalid email"),
        );
        assert_eq!(
            err.to_string(),
            "customer profile error for row 3: HTTP 400: Invalid email (code 21201)"
        );
        assert_eq!(err.kind(), ErrorKind::Step);
    }

    #[test]
    fn test_compliance_error_lists_failed_objects() {
        let failed = vec![
            "customer_profile_business_information".to_string(),
            "customer_profile_address".to_string(),
        ];
        let err = RecordError::compliance(Step::ProfileEvaluation, 4, "customer profile", &failed);
        let text = err.to_string();
        assert!(text.starts_with("non-compliant customer profile."));
        assert!(text.contains("customer_profile_business_information, customer_profile_address"));
        assert!(text.ends_with("for row 4"));
    }

    #[test]
    fn test_carried_error_renders_verbatim() {
        let err = RecordError::carried("brand error for row 7: HTTP 500: boom");
        assert_eq!(err.to_string(), "brand error for row 7: HTTP 500: boom");
        assert_eq!(err.kind(), ErrorKind::Carried);
    }
}
