//! Scripted in-memory provider for engine tests
#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::error::RemoteError;
use a2p_common::types::{BrandStatus, BundleStatus, CampaignStatus, EvaluationStatus};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

pub(crate) const ROOT_SID: &str = "ACroot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub op: &'static str,
    pub args: String,
}

struct FailureRule {
    op: &'static str,
    needle: String,
    message: String,
}

struct FakeState {
    calls: Vec<Call>,
    failures: Vec<FailureRule>,
    counters: HashMap<&'static str, u32>,
    profile_status: BundleStatus,
    trust_status: BundleStatus,
    profile_verdict: (EvaluationStatus, Vec<String>),
    trust_verdict: (EvaluationStatus, Vec<String>),
    brand_script: VecDeque<BrandStatus>,
    brand_default: BrandStatus,
    brand_feedback: Option<Vec<String>>,
    brand_failure_reason: Option<String>,
    brand_tcr_id: Option<String>,
    campaign_status: CampaignStatus,
    campaign_errors: Vec<CampaignError>,
    unknown_numbers: HashSet<String>,
    end_users: HashMap<String, EndUserType>,
    documents: HashMap<String, String>,
    assignments: HashMap<String, Vec<EntityAssignment>>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            failures: Vec::new(),
            counters: HashMap::new(),
            profile_status: BundleStatus::Draft,
            trust_status: BundleStatus::Draft,
            profile_verdict: (EvaluationStatus::Compliant, Vec::new()),
            trust_verdict: (EvaluationStatus::Compliant, Vec::new()),
            brand_script: VecDeque::new(),
            brand_default: BrandStatus::Approved,
            brand_feedback: None,
            brand_failure_reason: None,
            brand_tcr_id: Some("BTCR001".to_string()),
            campaign_status: CampaignStatus::InProgress,
            campaign_errors: Vec::new(),
            unknown_numbers: HashSet::new(),
            end_users: HashMap::new(),
            documents: HashMap::new(),
            assignments: HashMap::new(),
        }
    }
}

impl FakeState {
    fn next_sid(&mut self, prefix: &'static str) -> String {
        let counter = self.counters.entry(prefix).or_insert(0);
        *counter += 1;
        format!("{}{:04}", prefix, counter)
    }

    fn brand(&mut self, sid: &str) -> BrandRegistration {
        let status = self
            .brand_script
            .pop_front()
            .unwrap_or_else(|| self.brand_default.clone());
        BrandRegistration {
            sid: sid.to_string(),
            status,
            failure_reason: self.brand_failure_reason.clone(),
            brand_feedback: self.brand_feedback.clone(),
            tcr_id: self.brand_tcr_id.clone(),
        }
    }

    fn campaign(&mut self) -> Campaign {
        Campaign {
            sid: "QE0001".to_string(),
            campaign_status: self.campaign_status.clone(),
            errors: self.campaign_errors.clone(),
        }
    }

    fn evaluation(verdict: &(EvaluationStatus, Vec<String>)) -> Evaluation {
        let (status, failed) = verdict;
        Evaluation {
            sid: "EL0001".to_string(),
            status: status.clone(),
            results: failed
                .iter()
                .map(|object_type| EvaluationResult {
                    object_type: object_type.clone(),
                    passed: false,
                })
                .collect(),
        }
    }

    fn assign(&mut self, bundle_sid: &str, object_sid: &str) -> EntityAssignment {
        let assignment = EntityAssignment {
            sid: self.next_sid("BV"),
            object_sid: object_sid.to_string(),
        };
        self.assignments
            .entry(bundle_sid.to_string())
            .or_default()
            .push(assignment.clone());
        assignment
    }
}

/// Shared handle to the scripted state; sessions see the same state
#[derive(Clone, Default)]
pub(crate) struct FakeProvider {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the call and apply any matching failure rule
    fn enter(state: &Mutex<FakeState>, op: &'static str, args: String) -> RemoteResult<()> {
        let mut state = state.lock().unwrap();
        let failure = state
            .failures
            .iter()
            .find(|rule| rule.op == op && args.contains(&rule.needle))
            .map(|rule| rule.message.clone());
        state.calls.push(Call { op, args });
        match failure {
            Some(message) => Err(RemoteError::api(400, None, message)),
            None => Ok(()),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    // ------------------------------------------------------------------
    // Scripting
    // ------------------------------------------------------------------

    /// Fail every `op` call whose arguments contain `needle`
    pub fn fail_on(&self, op: &'static str, needle: &str, message: &str) {
        self.with(|s| {
            s.failures.push(FailureRule {
                op,
                needle: needle.to_string(),
                message: message.to_string(),
            })
        });
    }

    /// Statuses returned by successive brand fetches before the default applies
    pub fn script_brand_statuses(&self, statuses: impl IntoIterator<Item = BrandStatus>) {
        self.with(|s| s.brand_script.extend(statuses));
    }

    pub fn set_brand_default(&self, status: BrandStatus) {
        self.with(|s| s.brand_default = status);
    }

    pub fn set_brand_failure(&self, feedback: Option<Vec<String>>, reason: Option<&str>) {
        self.with(|s| {
            s.brand_feedback = feedback;
            s.brand_failure_reason = reason.map(str::to_string);
        });
    }

    pub fn set_brand_tcr_id(&self, tcr_id: Option<&str>) {
        self.with(|s| s.brand_tcr_id = tcr_id.map(str::to_string));
    }

    pub fn set_profile_verdict(&self, status: EvaluationStatus, failed: &[&str]) {
        self.with(|s| {
            s.profile_verdict = (status, failed.iter().map(|f| f.to_string()).collect())
        });
    }

    pub fn set_trust_verdict(&self, status: EvaluationStatus, failed: &[&str]) {
        self.with(|s| s.trust_verdict = (status, failed.iter().map(|f| f.to_string()).collect()));
    }

    pub fn set_profile_status(&self, status: BundleStatus) {
        self.with(|s| s.profile_status = status);
    }

    pub fn set_trust_status(&self, status: BundleStatus) {
        self.with(|s| s.trust_status = status);
    }

    pub fn set_campaign(&self, status: CampaignStatus, errors: Vec<CampaignError>) {
        self.with(|s| {
            s.campaign_status = status;
            s.campaign_errors = errors;
        });
    }

    pub fn mark_unknown_number(&self, phone_number: &str) {
        self.with(|s| s.unknown_numbers.insert(phone_number.to_string()));
    }

    /// Pre-existing end user assigned to `profile_sid`
    pub fn seed_end_user(&self, profile_sid: &str, end_user_sid: &str, kind: EndUserType) {
        self.with(|s| {
            s.end_users.insert(end_user_sid.to_string(), kind);
            s.assign(profile_sid, end_user_sid);
        });
    }

    /// Pre-existing address document assigned to `profile_sid`
    pub fn seed_document(&self, profile_sid: &str, document_sid: &str, address_sid: &str) {
        self.with(|s| {
            s.documents
                .insert(document_sid.to_string(), address_sid.to_string());
            s.assign(profile_sid, document_sid);
        });
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn calls(&self) -> Vec<Call> {
        self.with(|s| s.calls.clone())
    }

    pub fn calls_named(&self, op: &str) -> usize {
        self.with(|s| s.calls.iter().filter(|c| c.op == op).count())
    }

    /// Mutating calls (everything except fetches and lookups)
    pub fn mutating_calls(&self) -> usize {
        self.with(|s| {
            s.calls
                .iter()
                .filter(|c| {
                    !(c.op.starts_with("fetch_")
                        || c.op.starts_with("list_")
                        || c.op.starts_with("find_"))
                })
                .count()
        })
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn root_account_sid(&self) -> &str {
        ROOT_SID
    }

    fn root_credentials(&self) -> Credentials {
        Credentials::new(ROOT_SID, "root-token")
    }

    async fn create_subaccount(&self, friendly_name: &str) -> RemoteResult<Credentials> {
        Self::enter(&self.state, "create_subaccount", friendly_name.to_string())?;
        let sid = self.with(|s| s.next_sid("ACsub"));
        Ok(Credentials::new(sid, "sub-token"))
    }

    async fn fetch_auth_token(&self, account_sid: &str) -> RemoteResult<String> {
        Self::enter(&self.state, "fetch_auth_token", account_sid.to_string())?;
        Ok(format!("token-{}", account_sid))
    }

    fn session(&self, credentials: Credentials) -> Arc<dyn ComplianceApi> {
        Arc::new(FakeSession {
            account: credentials.account_sid,
            state: self.state.clone(),
        })
    }
}

pub(crate) struct FakeSession {
    account: String,
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    fn enter(&self, op: &'static str, args: impl Into<String>) -> RemoteResult<()> {
        FakeProvider::enter(&self.state, op, format!("{} {}", self.account, args.into()))
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    fn bundle(sid: &str, status: BundleStatus) -> Bundle {
        Bundle {
            sid: sid.to_string(),
            status,
            friendly_name: None,
            email: None,
        }
    }
}

#[async_trait]
impl ComplianceApi for FakeSession {
    async fn create_customer_profile(
        &self,
        friendly_name: &str,
        email: &str,
    ) -> RemoteResult<Bundle> {
        self.enter("create_customer_profile", format!("{} {}", friendly_name, email))?;
        let sid = self.with(|s| s.next_sid("BU"));
        Ok(Self::bundle(&sid, BundleStatus::Draft))
    }

    async fn fetch_customer_profile(&self, profile_sid: &str) -> RemoteResult<Bundle> {
        self.enter("fetch_customer_profile", profile_sid)?;
        let status = self.with(|s| s.profile_status.clone());
        Ok(Self::bundle(profile_sid, status))
    }

    async fn update_customer_profile(
        &self,
        profile_sid: &str,
        update: &BundleUpdate,
    ) -> RemoteResult<Bundle> {
        let status = update.status.as_ref().map(ToString::to_string).unwrap_or_default();
        self.enter("update_customer_profile", format!("{} {}", profile_sid, status))?;
        let status = self.with(|s| {
            if let Some(status) = &update.status {
                s.profile_status = status.clone();
            }
            s.profile_status.clone()
        });
        Ok(Self::bundle(profile_sid, status))
    }

    async fn assign_to_customer_profile(
        &self,
        profile_sid: &str,
        object_sid: &str,
    ) -> RemoteResult<EntityAssignment> {
        self.enter("assign_to_customer_profile", format!("{} {}", profile_sid, object_sid))?;
        Ok(self.with(|s| s.assign(profile_sid, object_sid)))
    }

    async fn list_customer_profile_assignments(
        &self,
        profile_sid: &str,
    ) -> RemoteResult<Vec<EntityAssignment>> {
        self.enter("list_customer_profile_assignments", profile_sid)?;
        Ok(self.with(|s| s.assignments.get(profile_sid).cloned().unwrap_or_default()))
    }

    async fn evaluate_customer_profile(&self, profile_sid: &str) -> RemoteResult<Evaluation> {
        self.enter("evaluate_customer_profile", profile_sid)?;
        Ok(self.with(|s| FakeState::evaluation(&s.profile_verdict)))
    }

    async fn create_end_user(&self, request: &EndUserRequest) -> RemoteResult<EndUser> {
        self.enter(
            "create_end_user",
            format!("{} {}", request.kind.as_str(), request.friendly_name),
        )?;
        let sid = self.with(|s| {
            let sid = s.next_sid("IT");
            s.end_users.insert(sid.clone(), request.kind.clone());
            sid
        });
        Ok(EndUser {
            sid,
            kind: request.kind.clone(),
            attributes: request.attributes.clone(),
        })
    }

    async fn fetch_end_user(&self, end_user_sid: &str) -> RemoteResult<EndUser> {
        self.enter("fetch_end_user", end_user_sid)?;
        let kind = self
            .with(|s| s.end_users.get(end_user_sid).cloned())
            .ok_or_else(|| RemoteError::not_found(format!("end user {}", end_user_sid)))?;
        Ok(EndUser {
            sid: end_user_sid.to_string(),
            kind,
            attributes: Value::Null,
        })
    }

    async fn update_end_user(
        &self,
        end_user_sid: &str,
        attributes: &Value,
    ) -> RemoteResult<EndUser> {
        self.enter("update_end_user", end_user_sid)?;
        let kind = self
            .with(|s| s.end_users.get(end_user_sid).cloned())
            .unwrap_or_else(|| EndUserType::Other(String::new()));
        Ok(EndUser {
            sid: end_user_sid.to_string(),
            kind,
            attributes: attributes.clone(),
        })
    }

    async fn create_address(
        &self,
        customer_name: &str,
        _address: &PostalAddress,
    ) -> RemoteResult<String> {
        self.enter("create_address", customer_name)?;
        Ok(self.with(|s| s.next_sid("AD")))
    }

    async fn update_address(
        &self,
        address_sid: &str,
        customer_name: &str,
        _address: &PostalAddress,
    ) -> RemoteResult<()> {
        self.enter("update_address", format!("{} {}", address_sid, customer_name))
    }

    async fn create_supporting_document(
        &self,
        friendly_name: &str,
        address_sid: &str,
    ) -> RemoteResult<SupportingDocument> {
        self.enter(
            "create_supporting_document",
            format!("{} {}", friendly_name, address_sid),
        )?;
        let sid = self.with(|s| {
            let sid = s.next_sid("RD");
            s.documents.insert(sid.clone(), address_sid.to_string());
            sid
        });
        Ok(SupportingDocument {
            sid,
            attributes: serde_json::json!({ "address_sids": address_sid }),
        })
    }

    async fn fetch_supporting_document(
        &self,
        document_sid: &str,
    ) -> RemoteResult<SupportingDocument> {
        self.enter("fetch_supporting_document", document_sid)?;
        let address = self.with(|s| s.documents.get(document_sid).cloned());
        Ok(SupportingDocument {
            sid: document_sid.to_string(),
            attributes: serde_json::json!({
                "address_sids": address.into_iter().collect::<Vec<_>>()
            }),
        })
    }

    async fn create_trust_bundle(&self, friendly_name: &str, email: &str) -> RemoteResult<Bundle> {
        self.enter("create_trust_bundle", format!("{} {}", friendly_name, email))?;
        let sid = self.with(|s| s.next_sid("BU"));
        Ok(Self::bundle(&sid, BundleStatus::Draft))
    }

    async fn fetch_trust_bundle(&self, bundle_sid: &str) -> RemoteResult<Bundle> {
        self.enter("fetch_trust_bundle", bundle_sid)?;
        let status = self.with(|s| s.trust_status.clone());
        Ok(Self::bundle(bundle_sid, status))
    }

    async fn update_trust_bundle(
        &self,
        bundle_sid: &str,
        update: &BundleUpdate,
    ) -> RemoteResult<Bundle> {
        let status = update.status.as_ref().map(ToString::to_string).unwrap_or_default();
        self.enter("update_trust_bundle", format!("{} {}", bundle_sid, status))?;
        let status = self.with(|s| {
            if let Some(status) = &update.status {
                s.trust_status = status.clone();
            }
            s.trust_status.clone()
        });
        Ok(Self::bundle(bundle_sid, status))
    }

    async fn assign_to_trust_bundle(
        &self,
        bundle_sid: &str,
        object_sid: &str,
    ) -> RemoteResult<EntityAssignment> {
        self.enter("assign_to_trust_bundle", format!("{} {}", bundle_sid, object_sid))?;
        Ok(self.with(|s| s.assign(bundle_sid, object_sid)))
    }

    async fn evaluate_trust_bundle(&self, bundle_sid: &str) -> RemoteResult<Evaluation> {
        self.enter("evaluate_trust_bundle", bundle_sid)?;
        Ok(self.with(|s| FakeState::evaluation(&s.trust_verdict)))
    }

    async fn create_brand(&self, request: &BrandRequest) -> RemoteResult<BrandRegistration> {
        self.enter(
            "create_brand",
            format!(
                "{} {} mock={}",
                request.customer_profile_sid, request.trust_bundle_sid, request.mock
            ),
        )?;
        Ok(self.with(|s| {
            let sid = s.next_sid("BN");
            BrandRegistration {
                sid,
                status: BrandStatus::Pending,
                failure_reason: None,
                brand_feedback: None,
                tcr_id: None,
            }
        }))
    }

    async fn fetch_brand(&self, brand_sid: &str) -> RemoteResult<BrandRegistration> {
        self.enter("fetch_brand", brand_sid)?;
        Ok(self.with(|s| s.brand(brand_sid)))
    }

    async fn resubmit_brand(&self, brand_sid: &str) -> RemoteResult<BrandRegistration> {
        self.enter("resubmit_brand", brand_sid)?;
        Ok(BrandRegistration {
            sid: brand_sid.to_string(),
            status: BrandStatus::Pending,
            failure_reason: None,
            brand_feedback: None,
            tcr_id: None,
        })
    }

    async fn create_messaging_service(&self, friendly_name: &str) -> RemoteResult<String> {
        self.enter("create_messaging_service", friendly_name)?;
        Ok(self.with(|s| s.next_sid("MG")))
    }

    async fn create_campaign(
        &self,
        service_sid: &str,
        request: &CampaignRequest,
    ) -> RemoteResult<Campaign> {
        self.enter(
            "create_campaign",
            format!("{} {}", service_sid, request.brand_registration_sid),
        )?;
        Ok(self.with(|s| s.campaign()))
    }

    async fn fetch_campaign(&self, service_sid: &str) -> RemoteResult<Campaign> {
        self.enter("fetch_campaign", service_sid)?;
        Ok(self.with(|s| s.campaign()))
    }

    async fn find_phone_number(&self, phone_number: &str) -> RemoteResult<Option<String>> {
        self.enter("find_phone_number", phone_number)?;
        Ok(self.with(|s| {
            if s.unknown_numbers.contains(phone_number) {
                None
            } else {
                Some(s.next_sid("PN"))
            }
        }))
    }

    async fn set_phone_number_sms_url(&self, phone_sid: &str, sms_url: &str) -> RemoteResult<()> {
        self.enter("set_phone_number_sms_url", format!("{} {}", phone_sid, sms_url))
    }

    async fn attach_phone_number(&self, service_sid: &str, phone_sid: &str) -> RemoteResult<()> {
        self.enter("attach_phone_number", format!("{} {}", service_sid, phone_sid))
    }
}
