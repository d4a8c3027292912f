//! Registration service URL builders
//!
//! The service is split across three hosts: the core account API, the trust
//! hub, and the messaging API. Each builder takes the relevant host.

/// Build subaccount list URL
pub fn accounts_url(api: &str) -> String {
    format!("{}/2010-04-01/Accounts.json", api)
}

/// Build single account URL
pub fn account_url(api: &str, account_sid: &str) -> String {
    format!("{}/2010-04-01/Accounts/{}.json", api, account_sid)
}

/// Build address collection URL
pub fn addresses_url(api: &str, account_sid: &str) -> String {
    format!("{}/2010-04-01/Accounts/{}/Addresses.json", api, account_sid)
}

/// Build single address URL
pub fn address_url(api: &str, account_sid: &str, address_sid: &str) -> String {
    format!(
        "{}/2010-04-01/Accounts/{}/Addresses/{}.json",
        api, account_sid, address_sid
    )
}

/// Build incoming phone number lookup URL
pub fn phone_number_lookup_url(api: &str, account_sid: &str, phone_number: &str) -> String {
    format!(
        "{}/2010-04-01/Accounts/{}/IncomingPhoneNumbers.json?PhoneNumber={}",
        api,
        account_sid,
        urlencoding::encode(phone_number)
    )
}

/// Build single incoming phone number URL
pub fn phone_number_url(api: &str, account_sid: &str, phone_sid: &str) -> String {
    format!(
        "{}/2010-04-01/Accounts/{}/IncomingPhoneNumbers/{}.json",
        api, account_sid, phone_sid
    )
}

/// Build customer profile collection URL
pub fn customer_profiles_url(trusthub: &str) -> String {
    format!("{}/v1/CustomerProfiles", trusthub)
}

/// Build single customer profile URL
pub fn customer_profile_url(trusthub: &str, profile_sid: &str) -> String {
    format!("{}/v1/CustomerProfiles/{}", trusthub, profile_sid)
}

/// Build customer profile entity assignment URL
pub fn customer_profile_assignments_url(trusthub: &str, profile_sid: &str) -> String {
    format!("{}/v1/CustomerProfiles/{}/EntityAssignments", trusthub, profile_sid)
}

/// Build customer profile evaluation URL
pub fn customer_profile_evaluations_url(trusthub: &str, profile_sid: &str) -> String {
    format!("{}/v1/CustomerProfiles/{}/Evaluations", trusthub, profile_sid)
}

/// Build end user collection URL
pub fn end_users_url(trusthub: &str) -> String {
    format!("{}/v1/EndUsers", trusthub)
}

/// Build single end user URL
pub fn end_user_url(trusthub: &str, end_user_sid: &str) -> String {
    format!("{}/v1/EndUsers/{}", trusthub, end_user_sid)
}

/// Build supporting document collection URL
pub fn supporting_documents_url(trusthub: &str) -> String {
    format!("{}/v1/SupportingDocuments", trusthub)
}

/// Build single supporting document URL
pub fn supporting_document_url(trusthub: &str, document_sid: &str) -> String {
    format!("{}/v1/SupportingDocuments/{}", trusthub, document_sid)
}

/// Build trust product collection URL
pub fn trust_products_url(trusthub: &str) -> String {
    format!("{}/v1/TrustProducts", trusthub)
}

/// Build single trust product URL
pub fn trust_product_url(trusthub: &str, bundle_sid: &str) -> String {
    format!("{}/v1/TrustProducts/{}", trusthub, bundle_sid)
}

/// Build trust product entity assignment URL
pub fn trust_product_assignments_url(trusthub: &str, bundle_sid: &str) -> String {
    format!("{}/v1/TrustProducts/{}/EntityAssignments", trusthub, bundle_sid)
}

/// Build trust product evaluation URL
pub fn trust_product_evaluations_url(trusthub: &str, bundle_sid: &str) -> String {
    format!("{}/v1/TrustProducts/{}/Evaluations", trusthub, bundle_sid)
}

/// Build brand registration collection URL
pub fn brand_registrations_url(messaging: &str) -> String {
    format!("{}/v1/a2p/BrandRegistrations", messaging)
}

/// Build single brand registration URL
pub fn brand_registration_url(messaging: &str, brand_sid: &str) -> String {
    format!("{}/v1/a2p/BrandRegistrations/{}", messaging, brand_sid)
}

/// Build messaging service collection URL
pub fn services_url(messaging: &str) -> String {
    format!("{}/v1/Services", messaging)
}

/// Build US app-to-person campaign URL for a messaging service
pub fn campaigns_url(messaging: &str, service_sid: &str) -> String {
    format!("{}/v1/Services/{}/Compliance/Usa2p", messaging, service_sid)
}

/// Build messaging service phone number pool URL
pub fn service_phone_numbers_url(messaging: &str, service_sid: &str) -> String {
    format!("{}/v1/Services/{}/PhoneNumbers", messaging, service_sid)
}
