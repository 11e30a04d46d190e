//! Operation table of the bank service.
//!
//! A trailing `-` path segment is a placeholder: the target entity is named
//! by the `uuid` query parameter or by the body, never by the path.

use crate::http::HttpMethod;

/// Everything needed to build and classify one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    pub path: &'static str,
    /// The only status that counts as success.
    pub success: u16,
    /// Key of the resource inside the envelope's `data` object.
    pub data_key: Option<&'static str>,
}

const fn route(
    method: HttpMethod,
    path: &'static str,
    success: u16,
    data_key: Option<&'static str>,
) -> Route {
    Route {
        method,
        path,
        success,
        data_key,
    }
}

pub const GET_USER_BANK_ACCOUNTS: Route =
    route(HttpMethod::Get, "/bank-account/user/-", 200, Some("bank_accounts"));
pub const GET_ORGANISATION_BANK_ACCOUNTS: Route = route(
    HttpMethod::Get,
    "/bank-account/organisation/-",
    200,
    Some("bank_accounts"),
);
pub const CREATE_BANK_ACCOUNT: Route =
    route(HttpMethod::Post, "/bank-account", 201, Some("bank_account"));
pub const UPDATE_BANK_ACCOUNT: Route =
    route(HttpMethod::Put, "/bank-account/-", 200, Some("bank_account"));
pub const DELETE_BANK_ACCOUNT: Route = route(HttpMethod::Delete, "/bank-account/-", 200, None);

pub const CREATE_ITEM: Route = route(HttpMethod::Post, "/item", 201, Some("item"));
pub const UPDATE_ITEM: Route = route(HttpMethod::Put, "/item/-", 200, Some("item"));
pub const DELETE_ITEM: Route = route(HttpMethod::Delete, "/item/-", 200, None);

pub const GET_TAGS: Route = route(HttpMethod::Get, "/tag", 200, Some("tags"));
pub const GET_USER_TAGS: Route = route(HttpMethod::Get, "/tag/user/-", 200, Some("tags"));
pub const GET_ORGANISATION_TAGS: Route =
    route(HttpMethod::Get, "/tag/organisation/-", 200, Some("tags"));
pub const CREATE_TAG: Route = route(HttpMethod::Post, "/tag", 201, Some("tag"));
pub const UPDATE_TAG: Route = route(HttpMethod::Put, "/tag/-", 200, Some("tag"));
pub const DELETE_TAG: Route = route(HttpMethod::Delete, "/tag/-", 200, None);
