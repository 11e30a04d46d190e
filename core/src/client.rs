//! Stateless request builder and response parser for the bank service.
//!
//! # Design
//! `BankService` holds only the base URL and token. Each operation is split
//! into a `build_*` method that produces a fresh `HttpRequest` and a
//! `parse_*` method that consumes the `HttpResponse`. Both halves are driven
//! by the operation's `Route`, so adding an operation is a table entry plus
//! two one-line methods. `BankClient` glues the halves to a transport.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::config::{redact, ConfigError, ServiceConfig};
use crate::envelope::{classify, encode};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::routes::{self, Route};
use crate::types::{BankAccount, BankAccounts, Item, Tag, Tags};

const CONTENT_TYPE: (&str, &str) = ("content-type", "application/json");
const AUTHORIZATION: &str = "authorization";

/// Builds requests for, and parses responses from, the bank service.
#[derive(Clone)]
pub struct BankService {
    base_url: Url,
    token: String,
}

impl BankService {
    pub fn new(config: &ServiceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: config.base_url()?,
            token: config.token.clone(),
        })
    }

    /// Service located through `BANK_SERVICE_SCHEME` / `BANK_SERVICE_HOST`.
    pub fn from_env(token: &str) -> Result<Self, ConfigError> {
        Self::new(&ServiceConfig::from_env(token))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // Bank accounts

    pub fn build_get_user_bank_accounts(&self, user_uuid: Uuid) -> HttpRequest {
        self.request(&routes::GET_USER_BANK_ACCOUNTS, Some(user_uuid), None)
    }

    pub fn parse_get_user_bank_accounts(&self, response: HttpResponse) -> Result<BankAccounts, ApiError> {
        parse(&routes::GET_USER_BANK_ACCOUNTS, &response)
    }

    pub fn build_get_organisation_bank_accounts(&self, organisation_uuid: Uuid) -> HttpRequest {
        self.request(&routes::GET_ORGANISATION_BANK_ACCOUNTS, Some(organisation_uuid), None)
    }

    pub fn parse_get_organisation_bank_accounts(
        &self,
        response: HttpResponse,
    ) -> Result<BankAccounts, ApiError> {
        parse(&routes::GET_ORGANISATION_BANK_ACCOUNTS, &response)
    }

    pub fn build_create_bank_account(&self, account: &BankAccount) -> Result<HttpRequest, ApiError> {
        self.request_with(&routes::CREATE_BANK_ACCOUNT, account)
    }

    pub fn parse_create_bank_account(&self, response: HttpResponse) -> Result<BankAccount, ApiError> {
        parse(&routes::CREATE_BANK_ACCOUNT, &response)
    }

    /// The account is identified by the `uuid` in the body.
    pub fn build_update_bank_account(&self, account: &BankAccount) -> Result<HttpRequest, ApiError> {
        self.request_with(&routes::UPDATE_BANK_ACCOUNT, account)
    }

    pub fn parse_update_bank_account(&self, response: HttpResponse) -> Result<BankAccount, ApiError> {
        parse(&routes::UPDATE_BANK_ACCOUNT, &response)
    }

    pub fn build_delete_bank_account(&self, uuid: Uuid) -> HttpRequest {
        self.request(&routes::DELETE_BANK_ACCOUNT, Some(uuid), None)
    }

    pub fn parse_delete_bank_account(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse(&routes::DELETE_BANK_ACCOUNT, &response)
    }

    // Items

    pub fn build_create_item(&self, item: &Item) -> Result<HttpRequest, ApiError> {
        self.request_with(&routes::CREATE_ITEM, item)
    }

    pub fn parse_create_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        parse(&routes::CREATE_ITEM, &response)
    }

    pub fn build_update_item(&self, item: &Item) -> Result<HttpRequest, ApiError> {
        self.request_with(&routes::UPDATE_ITEM, item)
    }

    pub fn parse_update_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        parse(&routes::UPDATE_ITEM, &response)
    }

    pub fn build_delete_item(&self, uuid: Uuid) -> HttpRequest {
        self.request(&routes::DELETE_ITEM, Some(uuid), None)
    }

    pub fn parse_delete_item(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse(&routes::DELETE_ITEM, &response)
    }

    // Tags

    /// System default tags, shared by every user and organisation.
    pub fn build_get_tags(&self) -> HttpRequest {
        self.request(&routes::GET_TAGS, None, None)
    }

    pub fn parse_get_tags(&self, response: HttpResponse) -> Result<Tags, ApiError> {
        parse(&routes::GET_TAGS, &response)
    }

    pub fn build_get_user_tags(&self, user_uuid: Uuid) -> HttpRequest {
        self.request(&routes::GET_USER_TAGS, Some(user_uuid), None)
    }

    pub fn parse_get_user_tags(&self, response: HttpResponse) -> Result<Tags, ApiError> {
        parse(&routes::GET_USER_TAGS, &response)
    }

    pub fn build_get_organisation_tags(&self, organisation_uuid: Uuid) -> HttpRequest {
        self.request(&routes::GET_ORGANISATION_TAGS, Some(organisation_uuid), None)
    }

    pub fn parse_get_organisation_tags(&self, response: HttpResponse) -> Result<Tags, ApiError> {
        parse(&routes::GET_ORGANISATION_TAGS, &response)
    }

    pub fn build_create_tag(&self, tag: &Tag) -> Result<HttpRequest, ApiError> {
        self.request_with(&routes::CREATE_TAG, tag)
    }

    pub fn parse_create_tag(&self, response: HttpResponse) -> Result<Tag, ApiError> {
        parse(&routes::CREATE_TAG, &response)
    }

    pub fn build_update_tag(&self, tag: &Tag) -> Result<HttpRequest, ApiError> {
        self.request_with(&routes::UPDATE_TAG, tag)
    }

    pub fn parse_update_tag(&self, response: HttpResponse) -> Result<Tag, ApiError> {
        parse(&routes::UPDATE_TAG, &response)
    }

    pub fn build_delete_tag(&self, uuid: Uuid) -> HttpRequest {
        self.request(&routes::DELETE_TAG, Some(uuid), None)
    }

    pub fn parse_delete_tag(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse(&routes::DELETE_TAG, &response)
    }

    /// Absolute URL for `path`, with `uuid` as the only query parameter.
    pub fn url(&self, path: &str, uuid: Option<Uuid>) -> String {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(None);
        if let Some(uuid) = uuid {
            url.query_pairs_mut().append_pair("uuid", &uuid.to_string());
        }
        url.into()
    }

    fn request(&self, route: &Route, uuid: Option<Uuid>, body: Option<String>) -> HttpRequest {
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push((CONTENT_TYPE.0.to_string(), CONTENT_TYPE.1.to_string()));
        }
        if !self.token.is_empty() {
            headers.push((AUTHORIZATION.to_string(), format!("Bearer {}", self.token)));
        }
        HttpRequest {
            method: route.method,
            url: self.url(route.path, uuid),
            headers,
            body,
        }
    }

    fn request_with<T: Serialize>(&self, route: &Route, payload: &T) -> Result<HttpRequest, ApiError> {
        let body = encode(payload)?;
        Ok(self.request(route, None, Some(body)))
    }
}

impl fmt::Debug for BankService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankService")
            .field("base_url", &self.base_url.as_str())
            .field("token", &redact(&self.token))
            .finish()
    }
}

fn parse<T>(route: &Route, response: &HttpResponse) -> Result<T, ApiError>
where
    T: DeserializeOwned + Serialize + Default,
{
    classify(response, route.success, route.data_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::http::HttpMethod;

    const USER: &str = "ef50ad5f-539a-454d-bb49-c2e3123eaba8";

    fn service() -> BankService {
        BankService::new(&ServiceConfig::new("http", "localhost:5000", "")).unwrap()
    }

    fn user() -> Uuid {
        USER.parse().unwrap()
    }

    #[test]
    fn build_get_user_bank_accounts_puts_uuid_in_query() {
        let req = service().build_get_user_bank_accounts(user());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, format!("http://localhost:5000/bank-account/user/-?uuid={USER}"));
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_organisation_tags_uses_placeholder_path() {
        let req = service().build_get_organisation_tags(user());
        assert_eq!(req.url, format!("http://localhost:5000/tag/organisation/-?uuid={USER}"));
    }

    #[test]
    fn build_get_tags_has_no_query() {
        let req = service().build_get_tags();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:5000/tag");
    }

    #[test]
    fn build_create_bank_account_sends_json_body() {
        let account = BankAccount {
            user_uuid: user(),
            account_number: "098765432109".into(),
            ..Default::default()
        };
        let req = service().build_create_bank_account(&account).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:5000/bank-account");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["user_uuid"], USER);
        assert!(body["organisation_uuid"].is_null());
        assert_eq!(body["account_number"], "098765432109");
    }

    #[test]
    fn build_update_targets_placeholder_without_query() {
        let tag = Tag {
            uuid: user(),
            tag: "rent".into(),
            ..Default::default()
        };
        let req = service().build_update_tag(&tag).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:5000/tag/-");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["uuid"], USER);

        let req = service().build_update_item(&Item::default()).unwrap();
        assert_eq!(req.url, "http://localhost:5000/item/-");
    }

    #[test]
    fn build_delete_item_sends_no_body() {
        let req = service().build_delete_item(user());
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, format!("http://localhost:5000/item/-?uuid={USER}"));
        assert!(req.body.is_none());
    }

    #[test]
    fn token_is_sent_as_bearer() {
        let service =
            BankService::new(&ServiceConfig::new("https", "bank.dottics.com", "my-test-token")).unwrap();
        let req = service.build_delete_tag(user());
        assert_eq!(req.header("authorization"), Some("Bearer my-test-token"));
        assert!(!format!("{service:?}").contains("my-test-token"));
    }

    #[test]
    fn requests_do_not_leak_into_each_other() {
        let service = service();
        let first = service.build_delete_bank_account(user());
        let second = service.build_get_tags();
        assert!(first.url.ends_with(&format!("?uuid={USER}")));
        assert_eq!(second.url, "http://localhost:5000/tag");
    }

    #[test]
    fn parse_create_bank_account_success() {
        let body = r#"{"message":"bank account create","data":{"bank_account":{"uuid":"e6b7f986-307c-4147-a34e-f924790799bb","user_uuid":null,"organisation_uuid":"e4bd194d-41e7-4f27-a4a8-161685a9b8b8","account_number":"098765432109","active":true,"create_date":"2022-06-17T21:57:12.000Z","update_date":"2022-06-17T21:57:12.000Z"}},"errors":{}}"#;
        let account = service()
            .parse_create_bank_account(HttpResponse::new(201, body))
            .unwrap();
        assert!(account.user_uuid.is_nil());
        assert_eq!(
            account.organisation_uuid.to_string(),
            "e4bd194d-41e7-4f27-a4a8-161685a9b8b8"
        );
        assert!(account.active);
    }

    #[test]
    fn parse_create_with_ok_status_is_rejected() {
        let body = r#"{"message":"","data":{"item":{}},"errors":{}}"#;
        let err = service().parse_create_item(HttpResponse::new(200, body)).unwrap_err();
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn parse_delete_tag_forbidden() {
        let body = r#"{"message":"","data":{},"errors":{"permission":["Please ensure you have permission"]}}"#;
        let err = service().parse_delete_tag(HttpResponse::new(403, body)).unwrap_err();
        assert_eq!(
            err,
            ServiceError::single(403, "permission", "Please ensure you have permission").into()
        );
    }

    #[test]
    fn parse_get_user_tags_empty() {
        let body = r#"{"message":"user tags found","data":{"tags":[]},"errors":{}}"#;
        let tags = service().parse_get_user_tags(HttpResponse::new(200, body)).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn parse_get_tags_rejects_array_body() {
        let err = service().parse_get_tags(HttpResponse::new(200, "[]")).unwrap_err();
        assert!(matches!(err, ApiError::Decoding(_)), "got {err:?}");
    }

    #[test]
    fn parse_create_tag_rejects_array_resource() {
        let body = r#"{"data":{"tag":["00000000-0000-0000-0000-000000000000"]},"errors":{}}"#;
        let err = service().parse_create_tag(HttpResponse::new(201, body)).unwrap_err();
        assert!(matches!(err, ApiError::Decoding(_)), "got {err:?}");
    }
}
