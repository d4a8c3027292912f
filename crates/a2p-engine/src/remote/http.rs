//! HTTP implementation of the registration client
//!
//! Requests are form encoded and authenticated with HTTP basic auth using the
//! account sid and token of the session. Error responses carry a JSON
//! envelope (`code`, `message`, `status`) that is folded into
//! [`RemoteError::Api`].

use super::{endpoints, types::*, ComplianceApi, Provider};
use crate::error::{RemoteError, RemoteResult};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

// ============================================================================
// Client Constants
// ============================================================================

/// Default timeout for a single request in seconds.
/// Can be overridden via A2P_API_TIMEOUT_SECS environment variable.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_API_HOST: &str = "https://api.twilio.com";
pub const DEFAULT_TRUSTHUB_HOST: &str = "https://trusthub.twilio.com";
pub const DEFAULT_MESSAGING_HOST: &str = "https://messaging.twilio.com";

/// Supporting document type for the business address
const ADDRESS_DOCUMENT_TYPE: &str = "customer_profile_address";

/// Base URLs of the three service hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiHosts {
    pub api: String,
    pub trusthub: String,
    pub messaging: String,
}

impl ApiHosts {
    pub fn production() -> Self {
        Self {
            api: DEFAULT_API_HOST.to_string(),
            trusthub: DEFAULT_TRUSTHUB_HOST.to_string(),
            messaging: DEFAULT_MESSAGING_HOST.to_string(),
        }
    }

    /// Route every host to one base URL (used against a local mock server)
    pub fn uniform(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            api: base_url.clone(),
            trusthub: base_url.clone(),
            messaging: base_url,
        }
    }
}

impl Default for ApiHosts {
    fn default() -> Self {
        Self::production()
    }
}

// ============================================================================
// Transport
// ============================================================================

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Created {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct Account {
    sid: String,
    auth_token: String,
}

#[derive(Debug, Deserialize)]
struct AssignmentPage {
    #[serde(default)]
    results: Vec<EntityAssignment>,
}

#[derive(Debug, Deserialize)]
struct PhoneNumberPage {
    #[serde(default)]
    incoming_phone_numbers: Vec<Created>,
}

#[derive(Debug, Deserialize)]
struct CampaignPage {
    #[serde(default)]
    compliance: Vec<Campaign>,
}

type Form = Vec<(&'static str, String)>;

#[derive(Clone)]
struct Transport {
    client: Client,
    hosts: Arc<ApiHosts>,
}

impl Transport {
    async fn get<T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        url: &str,
    ) -> RemoteResult<T> {
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .send()
            .await?;
        decode(response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        url: &str,
        form: &Form,
    ) -> RemoteResult<T> {
        debug!(url = %url, fields = form.len(), "POST");
        let response = self
            .client
            .post(url)
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .form(form)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let envelope: Option<ErrorEnvelope> = serde_json::from_str(&body).ok();
        let (code, message) = match envelope {
            Some(ErrorEnvelope { code, message }) => (
                code,
                message.unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            ),
            None => (None, body),
        };
        return Err(RemoteError::api(status.as_u16(), code, message));
    }

    serde_json::from_str(&body).map_err(|e| RemoteError::decode(e.to_string()))
}

// ============================================================================
// Provider
// ============================================================================

/// Root-account client
pub struct TwilioProvider {
    transport: Transport,
    root: Credentials,
}

impl TwilioProvider {
    pub fn new(root: Credentials, hosts: ApiHosts, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            transport: Transport {
                client,
                hosts: Arc::new(hosts),
            },
            root,
        })
    }
}

#[async_trait]
impl Provider for TwilioProvider {
    fn root_account_sid(&self) -> &str {
        &self.root.account_sid
    }

    fn root_credentials(&self) -> Credentials {
        self.root.clone()
    }

    async fn create_subaccount(&self, friendly_name: &str) -> RemoteResult<Credentials> {
        let url = endpoints::accounts_url(&self.transport.hosts.api);
        let form = vec![("FriendlyName", friendly_name.to_string())];
        let account: Account = self.transport.post(&self.root, &url, &form).await?;
        Ok(Credentials::new(account.sid, account.auth_token))
    }

    async fn fetch_auth_token(&self, account_sid: &str) -> RemoteResult<String> {
        let url = endpoints::account_url(&self.transport.hosts.api, account_sid);
        let account: Account = self.transport.get(&self.root, &url).await?;
        Ok(account.auth_token)
    }

    fn session(&self, credentials: Credentials) -> Arc<dyn ComplianceApi> {
        Arc::new(TwilioSession {
            transport: self.transport.clone(),
            credentials,
        })
    }
}

// ============================================================================
// Session
// ============================================================================

/// Client bound to one account
pub struct TwilioSession {
    transport: Transport,
    credentials: Credentials,
}

impl TwilioSession {
    fn hosts(&self) -> &ApiHosts {
        &self.transport.hosts
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> RemoteResult<T> {
        self.transport.get(&self.credentials, url).await
    }

    async fn post<T: DeserializeOwned>(&self, url: &str, form: Form) -> RemoteResult<T> {
        self.transport.post(&self.credentials, url, &form).await
    }

    fn address_form(customer_name: &str, address: &PostalAddress) -> Form {
        vec![
            ("CustomerName", customer_name.to_string()),
            ("Street", address.street.clone()),
            ("City", address.city.clone()),
            ("Region", address.region.clone()),
            ("PostalCode", address.postal_code.clone()),
            ("IsoCountry", address.iso_country.clone()),
        ]
    }
}

#[async_trait]
impl ComplianceApi for TwilioSession {
    async fn create_customer_profile(
        &self,
        friendly_name: &str,
        email: &str,
    ) -> RemoteResult<Bundle> {
        let url = endpoints::customer_profiles_url(&self.hosts().trusthub);
        let form = vec![
            ("FriendlyName", friendly_name.to_string()),
            ("Email", email.to_string()),
            ("PolicySid", SECONDARY_PROFILE_POLICY_SID.to_string()),
        ];
        self.post(&url, form).await
    }

    async fn fetch_customer_profile(&self, profile_sid: &str) -> RemoteResult<Bundle> {
        let url = endpoints::customer_profile_url(&self.hosts().trusthub, profile_sid);
        self.get(&url).await
    }

    async fn update_customer_profile(
        &self,
        profile_sid: &str,
        update: &BundleUpdate,
    ) -> RemoteResult<Bundle> {
        let url = endpoints::customer_profile_url(&self.hosts().trusthub, profile_sid);
        self.post(&url, update.form()).await
    }

    async fn assign_to_customer_profile(
        &self,
        profile_sid: &str,
        object_sid: &str,
    ) -> RemoteResult<EntityAssignment> {
        let url = endpoints::customer_profile_assignments_url(&self.hosts().trusthub, profile_sid);
        self.post(&url, vec![("ObjectSid", object_sid.to_string())]).await
    }

    async fn list_customer_profile_assignments(
        &self,
        profile_sid: &str,
    ) -> RemoteResult<Vec<EntityAssignment>> {
        let url = endpoints::customer_profile_assignments_url(&self.hosts().trusthub, profile_sid);
        let page: AssignmentPage = self.get(&url).await?;
        Ok(page.results)
    }

    async fn evaluate_customer_profile(&self, profile_sid: &str) -> RemoteResult<Evaluation> {
        let url = endpoints::customer_profile_evaluations_url(&self.hosts().trusthub, profile_sid);
        self.post(&url, vec![("PolicySid", SECONDARY_PROFILE_POLICY_SID.to_string())])
            .await
    }

    async fn create_end_user(&self, request: &EndUserRequest) -> RemoteResult<EndUser> {
        let url = endpoints::end_users_url(&self.hosts().trusthub);
        let form = vec![
            ("FriendlyName", request.friendly_name.clone()),
            ("Type", request.kind.as_str().to_string()),
            ("Attributes", request.attributes.to_string()),
        ];
        self.post(&url, form).await
    }

    async fn fetch_end_user(&self, end_user_sid: &str) -> RemoteResult<EndUser> {
        let url = endpoints::end_user_url(&self.hosts().trusthub, end_user_sid);
        self.get(&url).await
    }

    async fn update_end_user(
        &self,
        end_user_sid: &str,
        attributes: &Value,
    ) -> RemoteResult<EndUser> {
        let url = endpoints::end_user_url(&self.hosts().trusthub, end_user_sid);
        self.post(&url, vec![("Attributes", attributes.to_string())]).await
    }

    async fn create_address(
        &self,
        customer_name: &str,
        address: &PostalAddress,
    ) -> RemoteResult<String> {
        let url = endpoints::addresses_url(&self.hosts().api, &self.credentials.account_sid);
        let created: Created = self.post(&url, Self::address_form(customer_name, address)).await?;
        Ok(created.sid)
    }

    async fn update_address(
        &self,
        address_sid: &str,
        customer_name: &str,
        address: &PostalAddress,
    ) -> RemoteResult<()> {
        let url =
            endpoints::address_url(&self.hosts().api, &self.credentials.account_sid, address_sid);
        let _: Created = self.post(&url, Self::address_form(customer_name, address)).await?;
        Ok(())
    }

    async fn create_supporting_document(
        &self,
        friendly_name: &str,
        address_sid: &str,
    ) -> RemoteResult<SupportingDocument> {
        let url = endpoints::supporting_documents_url(&self.hosts().trusthub);
        let form = vec![
            ("FriendlyName", friendly_name.to_string()),
            ("Type", ADDRESS_DOCUMENT_TYPE.to_string()),
            ("Attributes", json!({ "address_sids": address_sid }).to_string()),
        ];
        self.post(&url, form).await
    }

    async fn fetch_supporting_document(
        &self,
        document_sid: &str,
    ) -> RemoteResult<SupportingDocument> {
        let url = endpoints::supporting_document_url(&self.hosts().trusthub, document_sid);
        self.get(&url).await
    }

    async fn create_trust_bundle(&self, friendly_name: &str, email: &str) -> RemoteResult<Bundle> {
        let url = endpoints::trust_products_url(&self.hosts().trusthub);
        let form = vec![
            ("FriendlyName", friendly_name.to_string()),
            ("Email", email.to_string()),
            ("PolicySid", A2P_TRUST_POLICY_SID.to_string()),
        ];
        self.post(&url, form).await
    }

    async fn fetch_trust_bundle(&self, bundle_sid: &str) -> RemoteResult<Bundle> {
        let url = endpoints::trust_product_url(&self.hosts().trusthub, bundle_sid);
        self.get(&url).await
    }

    async fn update_trust_bundle(
        &self,
        bundle_sid: &str,
        update: &BundleUpdate,
    ) -> RemoteResult<Bundle> {
        let url = endpoints::trust_product_url(&self.hosts().trusthub, bundle_sid);
        self.post(&url, update.form()).await
    }

    async fn assign_to_trust_bundle(
        &self,
        bundle_sid: &str,
        object_sid: &str,
    ) -> RemoteResult<EntityAssignment> {
        let url = endpoints::trust_product_assignments_url(&self.hosts().trusthub, bundle_sid);
        self.post(&url, vec![("ObjectSid", object_sid.to_string())]).await
    }

    async fn evaluate_trust_bundle(&self, bundle_sid: &str) -> RemoteResult<Evaluation> {
        let url = endpoints::trust_product_evaluations_url(&self.hosts().trusthub, bundle_sid);
        self.post(&url, vec![("PolicySid", A2P_TRUST_POLICY_SID.to_string())]).await
    }

    async fn create_brand(&self, request: &BrandRequest) -> RemoteResult<BrandRegistration> {
        let url = endpoints::brand_registrations_url(&self.hosts().messaging);
        let form = vec![
            ("CustomerProfileBundleSid", request.customer_profile_sid.clone()),
            ("A2PProfileBundleSid", request.trust_bundle_sid.clone()),
            ("SkipAutomaticSecVet", request.skip_automatic_sec_vet.to_string()),
            ("Mock", request.mock.to_string()),
        ];
        self.post(&url, form).await
    }

    async fn fetch_brand(&self, brand_sid: &str) -> RemoteResult<BrandRegistration> {
        let url = endpoints::brand_registration_url(&self.hosts().messaging, brand_sid);
        self.get(&url).await
    }

    async fn resubmit_brand(&self, brand_sid: &str) -> RemoteResult<BrandRegistration> {
        let url = endpoints::brand_registration_url(&self.hosts().messaging, brand_sid);
        self.post(&url, Vec::new()).await
    }

    async fn create_messaging_service(&self, friendly_name: &str) -> RemoteResult<String> {
        let url = endpoints::services_url(&self.hosts().messaging);
        let created: Created = self
            .post(&url, vec![("FriendlyName", friendly_name.to_string())])
            .await?;
        Ok(created.sid)
    }

    async fn create_campaign(
        &self,
        service_sid: &str,
        request: &CampaignRequest,
    ) -> RemoteResult<Campaign> {
        let url = endpoints::campaigns_url(&self.hosts().messaging, service_sid);
        self.post(&url, request.form()).await
    }

    async fn fetch_campaign(&self, service_sid: &str) -> RemoteResult<Campaign> {
        let url = endpoints::campaigns_url(&self.hosts().messaging, service_sid);
        let page: CampaignPage = self.get(&url).await?;
        page.compliance
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::not_found(format!("campaign on {}", service_sid)))
    }

    async fn find_phone_number(&self, phone_number: &str) -> RemoteResult<Option<String>> {
        let url = endpoints::phone_number_lookup_url(
            &self.hosts().api,
            &self.credentials.account_sid,
            phone_number,
        );
        let page: PhoneNumberPage = self.get(&url).await?;
        Ok(page.incoming_phone_numbers.into_iter().next().map(|n| n.sid))
    }

    async fn set_phone_number_sms_url(&self, phone_sid: &str, sms_url: &str) -> RemoteResult<()> {
        let url = endpoints::phone_number_url(
            &self.hosts().api,
            &self.credentials.account_sid,
            phone_sid,
        );
        let _: Created = self.post(&url, vec![("SmsUrl", sms_url.to_string())]).await?;
        Ok(())
    }

    async fn attach_phone_number(&self, service_sid: &str, phone_sid: &str) -> RemoteResult<()> {
        let url = endpoints::service_phone_numbers_url(&self.hosts().messaging, service_sid);
        let _: Created = self
            .post(&url, vec![("PhoneNumberSid", phone_sid.to_string())])
            .await?;
        Ok(())
    }
}
