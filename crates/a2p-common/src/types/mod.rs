//! Remote status vocabulary
//!
//! The registration service reports lifecycle states as plain strings, and the
//! checkpoint file stores them verbatim. Each enum keeps an `Other` variant so
//! a value the service introduces later survives a round trip unchanged.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value this build does not know about
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $text, )+
                    $name::Other(raw) => raw.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $( $text => $name::$variant, )+
                    _ => $name::Other(raw),
                }
            }
        }

        impl From<$name> for String {
            fn from(status: $name) -> Self {
                status.as_str().to_string()
            }
        }

        impl std::str::FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from(s.to_string()))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

status_enum! {
    /// Verdict of a policy evaluation run against a bundle
    pub enum EvaluationStatus {
        Compliant => "compliant",
        Noncompliant => "noncompliant",
    }
}

impl EvaluationStatus {
    pub fn is_compliant(&self) -> bool {
        matches!(self, EvaluationStatus::Compliant)
    }
}

status_enum! {
    /// Review lifecycle of a customer profile or trust bundle
    pub enum BundleStatus {
        Draft => "draft",
        PendingReview => "pending-review",
        InReview => "in-review",
        TwilioApproved => "twilio-approved",
        TwilioRejected => "twilio-rejected",
    }
}

status_enum! {
    /// Brand registration state
    pub enum BrandStatus {
        /// Non-terminal; polled until it changes or the attempt cap is reached
        Pending => "PENDING",
        Approved => "APPROVED",
        Failed => "FAILED",
        InReview => "IN_REVIEW",
        Deleted => "DELETED",
    }
}

impl BrandStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, BrandStatus::Pending)
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, BrandStatus::Approved)
    }
}

status_enum! {
    /// Campaign (US app-to-person use case) registration state
    pub enum CampaignStatus {
        Pending => "PENDING",
        InProgress => "IN_PROGRESS",
        Verified => "VERIFIED",
        Failed => "FAILED",
    }
}

impl CampaignStatus {
    /// Whether a status refresh can still change this value
    pub fn is_settling(&self) -> bool {
        matches!(self, CampaignStatus::Pending | CampaignStatus::InProgress)
    }
}
