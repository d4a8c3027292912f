//! Per-record account sessions
//!
//! Each record acts as its own subaccount. The session is resolved from the
//! `subaccount` cell every time a record is processed; tokens are never cached
//! across records.

use crate::error::{at, RecordError, Step};
use crate::record::RecordState;
use crate::remote::{ComplianceApi, Credentials, Provider};
use std::sync::Arc;
use tracing::info;

/// What to do when the row names no subaccount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubaccountPolicy {
    /// Create one named after the friendly id and write it back to the row
    CreateWhenMissing,
    /// Act as the root account
    RootWhenMissing,
}

/// Open the session a record's remote calls are made with
pub async fn open_session(
    provider: &dyn Provider,
    record: &mut RecordState,
    policy: SubaccountPolicy,
) -> Result<Arc<dyn ComplianceApi>, RecordError> {
    let row = record.row_number();

    let subaccount = record.subaccount.clone();
    let credentials = match subaccount.as_deref() {
        Some(sid) if sid == provider.root_account_sid() => provider.root_credentials(),
        Some(sid) => {
            let token = provider
                .fetch_auth_token(sid)
                .await
                .map_err(at(Step::SubaccountToken, row))?;
            Credentials::new(sid, token)
        },
        None => match policy {
            SubaccountPolicy::RootWhenMissing => provider.root_credentials(),
            SubaccountPolicy::CreateWhenMissing => {
                let created = provider
                    .create_subaccount(&record.applicant.friendly_id)
                    .await
                    .map_err(at(Step::Subaccount, row))?;
                info!(row, subaccount = %created.account_sid, "Created subaccount");
                record.subaccount = Some(created.account_sid.clone());
                created
            },
        },
    };

    Ok(provider.session(credentials))
}
