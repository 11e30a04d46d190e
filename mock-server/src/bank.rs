//! In-memory bank service.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{keyed, reply, reply_error, Reply};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BankAccount {
    pub uuid: Uuid,
    pub user_uuid: Option<Uuid>,
    pub organisation_uuid: Option<Uuid>,
    pub account_number: String,
    pub active: bool,
    pub create_date: Option<DateTime<Utc>>,
    pub update_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub uuid: Uuid,
    pub transaction_uuid: Option<Uuid>,
    pub description: String,
    pub amount: f64,
    pub active: bool,
    pub create_date: Option<DateTime<Utc>>,
    pub update_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub uuid: Uuid,
    pub user_uuid: Option<Uuid>,
    pub organisation_uuid: Option<Uuid>,
    pub tag: String,
    pub active: bool,
    pub create_date: Option<DateTime<Utc>>,
    pub update_date: Option<DateTime<Utc>>,
}

/// Records kept in insertion order, which is the order lists come back in.
#[derive(Debug, Default)]
pub struct Bank {
    pub bank_accounts: Vec<BankAccount>,
    pub items: Vec<Item>,
    pub tags: Vec<Tag>,
}

impl Bank {
    /// A bank holding the two system default tags.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let system_tag = |label: &str| Tag {
            uuid: Uuid::new_v4(),
            tag: label.to_string(),
            active: true,
            create_date: Some(now),
            update_date: Some(now),
            ..Default::default()
        };
        Self {
            tags: vec![system_tag("salary"), system_tag("groceries")],
            ..Default::default()
        }
    }
}

#[derive(Clone)]
struct AppState {
    bank: Arc<RwLock<Bank>>,
    token: Option<String>,
}

const BAD_REQUEST: &str = "BadRequest: Unable to process request";
const NOT_FOUND: &str = "NotFound: Unable to find resource";

/// Open bank: every request is authorized.
pub fn app() -> Router {
    router(None)
}

/// Bank that only answers requests bearing `Authorization: Bearer <token>`.
pub fn app_with_token(token: &str) -> Router {
    router(Some(token.to_string()))
}

fn router(token: Option<String>) -> Router {
    let state = AppState {
        bank: Arc::new(RwLock::new(Bank::seeded())),
        token,
    };
    Router::new()
        .route("/bank-account", post(create_bank_account))
        .route("/bank-account/-", put(update_bank_account).delete(delete_bank_account))
        .route("/bank-account/user/-", get(user_bank_accounts))
        .route("/bank-account/organisation/-", get(organisation_bank_accounts))
        .route("/item", post(create_item))
        .route("/item/-", put(update_item).delete(delete_item))
        .route("/tag", get(system_tags).post(create_tag))
        .route("/tag/-", put(update_tag).delete(delete_tag))
        .route("/tag/user/-", get(user_tags))
        .route("/tag/organisation/-", get(organisation_tags))
        .fallback(unknown_route)
        .layer(middleware::from_fn_with_state(state.clone(), authorize))
        .with_state(state)
}

async fn authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(token) = &state.token {
        let expected = format!("Bearer {token}");
        let presented = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        if presented != Some(expected.as_str()) {
            tracing::debug!(uri = %request.uri(), "rejecting unauthorized request");
            return reply_error(
                StatusCode::FORBIDDEN,
                "Forbidden: Unable to process request",
                "permission",
                "Please ensure you have permission",
            )
            .into_response();
        }
    }
    next.run(request).await
}

async fn unknown_route() -> Reply {
    reply_error(StatusCode::NOT_FOUND, NOT_FOUND, "route", "not found")
}

// --- bank accounts ---

async fn user_bank_accounts(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Reply, Reply> {
    let user = query_uuid(&params)?;
    let bank = state.bank.read().await;
    let accounts: Vec<&BankAccount> = bank
        .bank_accounts
        .iter()
        .filter(|a| a.user_uuid == Some(user))
        .collect();
    Ok(reply(
        StatusCode::OK,
        "user bank accounts found",
        keyed("bank_accounts", &accounts),
    ))
}

async fn organisation_bank_accounts(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Reply, Reply> {
    let organisation = query_uuid(&params)?;
    let bank = state.bank.read().await;
    let accounts: Vec<&BankAccount> = bank
        .bank_accounts
        .iter()
        .filter(|a| a.organisation_uuid == Some(organisation))
        .collect();
    Ok(reply(
        StatusCode::OK,
        "organisation bank accounts found",
        keyed("bank_accounts", &accounts),
    ))
}

async fn create_bank_account(State(state): State<AppState>, body: String) -> Result<Reply, Reply> {
    let input: BankAccount = parse_body(&body)?;
    let (user_uuid, organisation_uuid) = (set(input.user_uuid), set(input.organisation_uuid));
    if user_uuid.is_some() == organisation_uuid.is_some() {
        return Err(reply_error(
            StatusCode::BAD_REQUEST,
            BAD_REQUEST,
            "owner",
            "exactly one of user_uuid or organisation_uuid is required",
        ));
    }
    if input.account_number.trim().is_empty() {
        return Err(reply_error(StatusCode::BAD_REQUEST, BAD_REQUEST, "account_number", "required"));
    }

    let now = Utc::now();
    let account = BankAccount {
        uuid: Uuid::new_v4(),
        user_uuid,
        organisation_uuid,
        account_number: input.account_number,
        active: true,
        create_date: Some(now),
        update_date: Some(now),
    };
    state.bank.write().await.bank_accounts.push(account.clone());
    Ok(reply(
        StatusCode::CREATED,
        "bank account created",
        keyed("bank_account", &account),
    ))
}

async fn update_bank_account(State(state): State<AppState>, body: String) -> Result<Reply, Reply> {
    let input: BankAccount = parse_body(&body)?;
    let mut bank = state.bank.write().await;
    let account = bank
        .bank_accounts
        .iter_mut()
        .find(|a| a.uuid == input.uuid)
        .ok_or_else(|| not_found("bank_account"))?;
    if !input.account_number.trim().is_empty() {
        account.account_number = input.account_number;
    }
    account.active = input.active;
    account.update_date = Some(Utc::now());
    Ok(reply(
        StatusCode::OK,
        "bank account updated",
        keyed("bank_account", &*account),
    ))
}

async fn delete_bank_account(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Reply, Reply> {
    let uuid = query_uuid(&params)?;
    let mut bank = state.bank.write().await;
    remove(&mut bank.bank_accounts, |a| a.uuid == uuid, "bank_account")?;
    Ok(reply(StatusCode::OK, "bank account deleted", serde_json::json!({})))
}

// --- items ---

async fn create_item(State(state): State<AppState>, body: String) -> Result<Reply, Reply> {
    let input: Item = parse_body(&body)?;
    let transaction_uuid = set(input.transaction_uuid)
        .ok_or_else(|| reply_error(StatusCode::BAD_REQUEST, BAD_REQUEST, "transaction_uuid", "required"))?;

    let now = Utc::now();
    let item = Item {
        uuid: Uuid::new_v4(),
        transaction_uuid: Some(transaction_uuid),
        description: input.description,
        amount: input.amount,
        active: true,
        create_date: Some(now),
        update_date: Some(now),
    };
    state.bank.write().await.items.push(item.clone());
    Ok(reply(StatusCode::CREATED, "item created", keyed("item", &item)))
}

async fn update_item(State(state): State<AppState>, body: String) -> Result<Reply, Reply> {
    let input: Item = parse_body(&body)?;
    let mut bank = state.bank.write().await;
    let item = bank
        .items
        .iter_mut()
        .find(|i| i.uuid == input.uuid)
        .ok_or_else(|| not_found("item"))?;
    item.description = input.description;
    item.amount = input.amount;
    item.active = input.active;
    item.update_date = Some(Utc::now());
    Ok(reply(StatusCode::OK, "item updated", keyed("item", &*item)))
}

async fn delete_item(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Reply, Reply> {
    let uuid = query_uuid(&params)?;
    let mut bank = state.bank.write().await;
    remove(&mut bank.items, |i| i.uuid == uuid, "item")?;
    Ok(reply(StatusCode::OK, "item deleted", serde_json::json!({})))
}

// --- tags ---

async fn system_tags(State(state): State<AppState>) -> Reply {
    let bank = state.bank.read().await;
    let tags: Vec<&Tag> = bank
        .tags
        .iter()
        .filter(|t| t.user_uuid.is_none() && t.organisation_uuid.is_none())
        .collect();
    reply(StatusCode::OK, "tags found", keyed("tags", &tags))
}

async fn user_tags(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Reply, Reply> {
    let user = query_uuid(&params)?;
    let bank = state.bank.read().await;
    let tags: Vec<&Tag> = bank.tags.iter().filter(|t| t.user_uuid == Some(user)).collect();
    Ok(reply(StatusCode::OK, "user tags found", keyed("tags", &tags)))
}

async fn organisation_tags(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Reply, Reply> {
    let organisation = query_uuid(&params)?;
    let bank = state.bank.read().await;
    let tags: Vec<&Tag> = bank
        .tags
        .iter()
        .filter(|t| t.organisation_uuid == Some(organisation))
        .collect();
    Ok(reply(StatusCode::OK, "organisation tags found", keyed("tags", &tags)))
}

async fn create_tag(State(state): State<AppState>, body: String) -> Result<Reply, Reply> {
    let input: Tag = parse_body(&body)?;
    let (user_uuid, organisation_uuid) = (set(input.user_uuid), set(input.organisation_uuid));
    if user_uuid.is_some() && organisation_uuid.is_some() {
        return Err(reply_error(
            StatusCode::BAD_REQUEST,
            BAD_REQUEST,
            "owner",
            "a tag belongs to a user or an organisation, not both",
        ));
    }
    if input.tag.trim().is_empty() {
        return Err(reply_error(StatusCode::BAD_REQUEST, BAD_REQUEST, "tag", "required"));
    }

    let now = Utc::now();
    let tag = Tag {
        uuid: Uuid::new_v4(),
        user_uuid,
        organisation_uuid,
        tag: input.tag,
        active: true,
        create_date: Some(now),
        update_date: Some(now),
    };
    state.bank.write().await.tags.push(tag.clone());
    Ok(reply(StatusCode::CREATED, "tag created", keyed("tag", &tag)))
}

async fn update_tag(State(state): State<AppState>, body: String) -> Result<Reply, Reply> {
    let input: Tag = parse_body(&body)?;
    let mut bank = state.bank.write().await;
    let tag = bank
        .tags
        .iter_mut()
        .find(|t| t.uuid == input.uuid)
        .ok_or_else(|| not_found("tag"))?;
    if !input.tag.trim().is_empty() {
        tag.tag = input.tag;
    }
    tag.active = input.active;
    tag.update_date = Some(Utc::now());
    Ok(reply(StatusCode::OK, "tag updated", keyed("tag", &*tag)))
}

async fn delete_tag(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Reply, Reply> {
    let uuid = query_uuid(&params)?;
    let mut bank = state.bank.write().await;
    remove(&mut bank.tags, |t| t.uuid == uuid, "tag")?;
    Ok(reply(StatusCode::OK, "tag deleted", serde_json::json!({})))
}

// --- helpers ---

fn query_uuid(params: &HashMap<String, String>) -> Result<Uuid, Reply> {
    let raw = params
        .get("uuid")
        .ok_or_else(|| reply_error(StatusCode::BAD_REQUEST, BAD_REQUEST, "uuid", "required"))?;
    raw.parse()
        .map_err(|_| reply_error(StatusCode::BAD_REQUEST, BAD_REQUEST, "uuid", "invalid uuid"))
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, Reply> {
    serde_json::from_str(body)
        .map_err(|e| reply_error(StatusCode::BAD_REQUEST, BAD_REQUEST, "body", &e.to_string()))
}

/// Nil UUIDs count as absent.
fn set(uuid: Option<Uuid>) -> Option<Uuid> {
    uuid.filter(|u| !u.is_nil())
}

fn not_found(resource: &str) -> Reply {
    reply_error(StatusCode::NOT_FOUND, NOT_FOUND, resource, "not found")
}

fn remove<T>(records: &mut Vec<T>, matches: impl Fn(&T) -> bool, resource: &str) -> Result<T, Reply> {
    let index = records
        .iter()
        .position(matches)
        .ok_or_else(|| not_found(resource))?;
    Ok(records.remove(index))
}
