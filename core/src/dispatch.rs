//! One-call operations: build, execute through a transport, parse.

use uuid::Uuid;

use crate::client::BankService;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{BankAccount, BankAccounts, Item, Tag, Tags};

/// A `BankService` bound to a transport.
///
/// Every call makes exactly one round trip and returns the first error it
/// meets. Holds no per-call state, so `&self` calls may run concurrently
/// whenever the transport allows it.
#[derive(Debug, Clone)]
pub struct BankClient<T> {
    service: BankService,
    transport: T,
}

#[cfg(feature = "ureq")]
impl BankClient<crate::transport::UreqTransport> {
    /// Client for the service named by the environment, over `ureq`.
    pub fn from_env(token: &str) -> Result<Self, crate::config::ConfigError> {
        Ok(Self::new(
            BankService::from_env(token)?,
            crate::transport::UreqTransport::new(),
        ))
    }
}

impl<T: Transport> BankClient<T> {
    pub fn new(service: BankService, transport: T) -> Self {
        Self { service, transport }
    }

    pub fn service(&self) -> &BankService {
        &self.service
    }

    /// Bank accounts owned by a user. No accounts is an empty list.
    pub fn get_user_bank_accounts(&self, user_uuid: Uuid) -> Result<BankAccounts, ApiError> {
        let response = self.send(self.service.build_get_user_bank_accounts(user_uuid))?;
        self.service.parse_get_user_bank_accounts(response)
    }

    /// Bank accounts owned by an organisation. No accounts is an empty list.
    pub fn get_organisation_bank_accounts(
        &self,
        organisation_uuid: Uuid,
    ) -> Result<BankAccounts, ApiError> {
        let response = self.send(self.service.build_get_organisation_bank_accounts(organisation_uuid))?;
        self.service.parse_get_organisation_bank_accounts(response)
    }

    /// Creates a bank account; the service assigns its UUID and dates.
    pub fn create_bank_account(&self, account: &BankAccount) -> Result<BankAccount, ApiError> {
        let response = self.send(self.service.build_create_bank_account(account)?)?;
        self.service.parse_create_bank_account(response)
    }

    pub fn update_bank_account(&self, account: &BankAccount) -> Result<BankAccount, ApiError> {
        let response = self.send(self.service.build_update_bank_account(account)?)?;
        self.service.parse_update_bank_account(response)
    }

    pub fn delete_bank_account(&self, uuid: Uuid) -> Result<(), ApiError> {
        let response = self.send(self.service.build_delete_bank_account(uuid))?;
        self.service.parse_delete_bank_account(response)
    }

    /// Creates a new item for a transaction.
    pub fn create_item(&self, item: &Item) -> Result<Item, ApiError> {
        let response = self.send(self.service.build_create_item(item)?)?;
        self.service.parse_create_item(response)
    }

    pub fn update_item(&self, item: &Item) -> Result<Item, ApiError> {
        let response = self.send(self.service.build_update_item(item)?)?;
        self.service.parse_update_item(response)
    }

    pub fn delete_item(&self, uuid: Uuid) -> Result<(), ApiError> {
        let response = self.send(self.service.build_delete_item(uuid))?;
        self.service.parse_delete_item(response)
    }

    /// System default tags.
    pub fn get_tags(&self) -> Result<Tags, ApiError> {
        let response = self.send(self.service.build_get_tags())?;
        self.service.parse_get_tags(response)
    }

    pub fn get_user_tags(&self, user_uuid: Uuid) -> Result<Tags, ApiError> {
        let response = self.send(self.service.build_get_user_tags(user_uuid))?;
        self.service.parse_get_user_tags(response)
    }

    pub fn get_organisation_tags(&self, organisation_uuid: Uuid) -> Result<Tags, ApiError> {
        let response = self.send(self.service.build_get_organisation_tags(organisation_uuid))?;
        self.service.parse_get_organisation_tags(response)
    }

    pub fn create_tag(&self, tag: &Tag) -> Result<Tag, ApiError> {
        let response = self.send(self.service.build_create_tag(tag)?)?;
        self.service.parse_create_tag(response)
    }

    pub fn update_tag(&self, tag: &Tag) -> Result<Tag, ApiError> {
        let response = self.send(self.service.build_update_tag(tag)?)?;
        self.service.parse_update_tag(response)
    }

    pub fn delete_tag(&self, uuid: Uuid) -> Result<(), ApiError> {
        let response = self.send(self.service.build_delete_tag(uuid))?;
        self.service.parse_delete_tag(response)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");
        let response = self.transport.execute(request)?;
        tracing::debug!(status = response.status, "response received");
        Ok(response)
    }
}
