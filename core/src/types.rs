//! Resource models exchanged with the bank service.
//!
//! # Design
//! Models are flat value types whose JSON shape matches the service. Every
//! field defaults when absent so that partially populated payloads decode
//! the way the service intends. Owner references are plain `Uuid`s with the
//! nil UUID standing for "not this kind of owner": the service sends `null`
//! for the other owner kind, and `null` goes back out for a nil owner.
//! `Owner` offers a tagged view over the same two fields without changing
//! the wire shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bank account owned by either a user or an organisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankAccount {
    pub uuid: Uuid,
    #[serde(with = "nullable_uuid")]
    pub user_uuid: Uuid,
    #[serde(with = "nullable_uuid")]
    pub organisation_uuid: Uuid,
    pub account_number: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_date: Option<DateTime<Utc>>,
}

pub type BankAccounts = Vec<BankAccount>;

/// A line item of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub uuid: Uuid,
    #[serde(with = "nullable_uuid")]
    pub transaction_uuid: Uuid,
    pub description: String,
    pub amount: f64,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_date: Option<DateTime<Utc>>,
}

/// A classification label. Tags without an owner are system defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub uuid: Uuid,
    #[serde(with = "nullable_uuid")]
    pub user_uuid: Uuid,
    #[serde(with = "nullable_uuid")]
    pub organisation_uuid: Uuid,
    pub tag: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_date: Option<DateTime<Utc>>,
}

pub type Tags = Vec<Tag>;

/// Who a resource belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    User(Uuid),
    Organisation(Uuid),
    Unset,
}

impl Owner {
    /// Reads the owner from the two wire fields. The service guarantees at
    /// most one of them is set; if both are, the user wins.
    pub fn from_parts(user_uuid: Uuid, organisation_uuid: Uuid) -> Self {
        if !user_uuid.is_nil() {
            Owner::User(user_uuid)
        } else if !organisation_uuid.is_nil() {
            Owner::Organisation(organisation_uuid)
        } else {
            Owner::Unset
        }
    }

    /// `(user_uuid, organisation_uuid)` with the unused side nil.
    pub fn into_parts(self) -> (Uuid, Uuid) {
        match self {
            Owner::User(uuid) => (uuid, Uuid::nil()),
            Owner::Organisation(uuid) => (Uuid::nil(), uuid),
            Owner::Unset => (Uuid::nil(), Uuid::nil()),
        }
    }
}

/// Resources that belong to a user or an organisation.
pub trait Owned {
    fn owner_parts(&self) -> (Uuid, Uuid);
    fn set_owner_parts(&mut self, user_uuid: Uuid, organisation_uuid: Uuid);

    fn owner(&self) -> Owner {
        let (user, organisation) = self.owner_parts();
        Owner::from_parts(user, organisation)
    }

    /// Replaces the owner, clearing the other owner kind.
    fn set_owner(&mut self, owner: Owner) {
        let (user, organisation) = owner.into_parts();
        self.set_owner_parts(user, organisation);
    }
}

impl Owned for BankAccount {
    fn owner_parts(&self) -> (Uuid, Uuid) {
        (self.user_uuid, self.organisation_uuid)
    }

    fn set_owner_parts(&mut self, user_uuid: Uuid, organisation_uuid: Uuid) {
        self.user_uuid = user_uuid;
        self.organisation_uuid = organisation_uuid;
    }
}

impl Owned for Tag {
    fn owner_parts(&self) -> (Uuid, Uuid) {
        (self.user_uuid, self.organisation_uuid)
    }

    fn set_owner_parts(&mut self, user_uuid: Uuid, organisation_uuid: Uuid) {
        self.user_uuid = user_uuid;
        self.organisation_uuid = organisation_uuid;
    }
}

/// `null` on the wire is the nil UUID in memory, both ways.
mod nullable_uuid {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(uuid: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
        if uuid.is_nil() {
            serializer.serialize_none()
        } else {
            uuid.serialize(serializer)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
        Ok(Option::<Uuid>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid(s: &str) -> Uuid {
        s.parse().unwrap()
    }

    #[test]
    fn null_owner_decodes_to_nil() {
        let json = r#"{"uuid":"318b052a-7911-4e09-a76d-f6e6a18c6fcd","user_uuid":"ef50ad5f-539a-454d-bb49-c2e3123eaba8","organisation_uuid":null,"account_number":"012345678911","active":true,"create_date":"2022-05-17T04:35:23.000Z","update_date":"2022-05-17T04:35:23.000Z"}"#;
        let account: BankAccount = serde_json::from_str(json).unwrap();
        assert_eq!(account.user_uuid, uuid("ef50ad5f-539a-454d-bb49-c2e3123eaba8"));
        assert!(account.organisation_uuid.is_nil());
        assert_eq!(account.owner(), Owner::User(account.user_uuid));
        assert_eq!(
            account.create_date.unwrap().to_rfc3339(),
            "2022-05-17T04:35:23+00:00"
        );
    }

    #[test]
    fn missing_owner_decodes_to_nil() {
        let tag: Tag = serde_json::from_str(r#"{"tag":"groceries"}"#).unwrap();
        assert_eq!(tag.tag, "groceries");
        assert_eq!(tag.owner(), Owner::Unset);
        assert!(tag.create_date.is_none());
    }

    #[test]
    fn nil_owner_encodes_as_null_and_unset_dates_are_omitted() {
        let account = BankAccount {
            user_uuid: uuid("e4bd194d-41e7-4f27-a4a8-161685a9b8b8"),
            account_number: "098765432109".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["user_uuid"], "e4bd194d-41e7-4f27-a4a8-161685a9b8b8");
        assert!(json["organisation_uuid"].is_null());
        assert_eq!(json["uuid"], "00000000-0000-0000-0000-000000000000");
        assert!(json.get("create_date").is_none());
        assert!(json.get("update_date").is_none());
    }

    #[test]
    fn encode_then_decode_preserves_client_fields() {
        let item = Item {
            transaction_uuid: uuid("6f9c1b52-0a1c-4d1f-9e59-0c6bd0b5b1a3"),
            description: "coffee beans".into(),
            amount: 12.5,
            active: true,
            ..Default::default()
        };
        let back: Item = serde_json::from_str(&serde_json::to_string(&item).unwrap()).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn set_owner_clears_the_other_kind() {
        let mut tag = Tag {
            user_uuid: uuid("ef50ad5f-539a-454d-bb49-c2e3123eaba8"),
            ..Default::default()
        };
        let org = uuid("e4bd194d-41e7-4f27-a4a8-161685a9b8b8");
        tag.set_owner(Owner::Organisation(org));
        assert!(tag.user_uuid.is_nil());
        assert_eq!(tag.organisation_uuid, org);
    }
}
