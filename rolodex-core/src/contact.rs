//! The contact record and its input shapes.
//!
//! A [`Contact`] has an immutable identity (`id`, `created_at`) and mutable
//! fields. Every mutation goes through [`Contact::apply_update`], which
//! refreshes `updated_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RolodexError};
use crate::types::ContactId;

/// A single contact record.
///
/// Serialized with camelCase field names; timestamps are RFC 3339 strings
/// carrying full nanosecond precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Opaque identifier, fixed at creation.
    pub id: ContactId,
    /// Given name. May be empty.
    pub first_name: String,
    /// Family name. May be empty.
    pub last_name: String,
    /// Email address; the directory's case-insensitive uniqueness key.
    pub email: String,
    /// Optional phone number, stored as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Optional postal address, stored as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContact {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
}

impl NewContact {
    /// Required fields only; phone and address left empty.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: None,
            address: None,
        }
    }

    /// Attach a phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Attach a postal address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Partial update. Only `Some` fields are written.
///
/// `phone` and `address` are doubly optional: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New phone number, or `Some(None)` to remove it.
    pub phone: Option<Option<String>>,
    /// New postal address, or `Some(None)` to remove it.
    pub address: Option<Option<String>>,
}

impl ContactPatch {
    /// Patch that only changes the email.
    #[must_use]
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Whether the patch writes no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

impl From<NewContact> for ContactPatch {
    /// A full overwrite, as produced by an edit form.
    fn from(fields: NewContact) -> Self {
        Self {
            first_name: Some(fields.first_name),
            last_name: Some(fields.last_name),
            email: Some(fields.email),
            phone: Some(fields.phone),
            address: Some(fields.address),
        }
    }
}

impl Contact {
    /// Create a record with a freshly generated ID.
    #[must_use]
    pub fn new(fields: NewContact) -> Self {
        Self::with_id(ContactId::new(), fields)
    }

    /// Create a record with a caller-chosen ID. Both timestamps are set to now.
    #[must_use]
    pub fn with_id(id: ContactId, fields: NewContact) -> Self {
        let now = Utc::now();
        Self {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            phone: fields.phone,
            address: fields.address,
            created_at: now,
            updated_at: now,
        }
    }

    /// First and last name joined by a space, trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Case-insensitive comparison against this record's email.
    #[must_use]
    pub fn email_matches(&self, email: &str) -> bool {
        email_key(&self.email) == email_key(email)
    }

    /// Overwrite the fields present in `patch` and refresh `updated_at`.
    ///
    /// `id` and `created_at` are never touched.
    pub fn apply_update(&mut self, patch: &ContactPatch) {
        if let Some(first_name) = &patch.first_name {
            self.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name.clone_from(last_name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(phone) = &patch.phone {
            self.phone.clone_from(phone);
        }
        if let Some(address) = &patch.address {
            self.address.clone_from(address);
        }
        self.updated_at = Utc::now();
    }

    /// Serialize to a JSON object.
    ///
    /// # Errors
    /// Returns [`RolodexError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| RolodexError::Serialization(e.to_string()))
    }

    /// Rebuild a record from its JSON form, keeping the stored ID and timestamps.
    ///
    /// # Errors
    /// Returns [`RolodexError::Serialization`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RolodexError::Serialization(e.to_string()))
    }
}

/// Normalised form used for email equality.
#[must_use]
pub fn email_key(email: &str) -> String {
    email.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> Contact {
        Contact::new(
            NewContact::new("Ada", "Lovelace", "ada@example.com")
                .with_phone("+44 20 7946 0000")
                .with_address("12 St James's Square, London"),
        )
    }

    #[test]
    fn new_contact_has_equal_timestamps() {
        let c = ada();
        assert_eq!(c.created_at, c.updated_at);
        assert!(!c.id.as_str().is_empty());
    }

    #[test]
    fn full_name_is_trimmed() {
        assert_eq!(ada().full_name(), "Ada Lovelace");

        let only_first = Contact::new(NewContact::new("Ada", "", "a@x.com"));
        assert_eq!(only_first.full_name(), "Ada");

        let only_last = Contact::new(NewContact::new("", "Lovelace", "l@x.com"));
        assert_eq!(only_last.full_name(), "Lovelace");

        let nameless = Contact::new(NewContact::new("", "", "n@x.com"));
        assert_eq!(nameless.full_name(), "");
    }

    #[test]
    fn apply_update_overwrites_only_present_fields() {
        let mut c = ada();
        let id = c.id.clone();
        let created = c.created_at;

        c.apply_update(&ContactPatch {
            last_name: Some("King".to_string()),
            phone: Some(None),
            ..ContactPatch::default()
        });

        assert_eq!(c.id, id);
        assert_eq!(c.created_at, created);
        assert_eq!(c.first_name, "Ada");
        assert_eq!(c.last_name, "King");
        assert_eq!(c.email, "ada@example.com");
        assert_eq!(c.phone, None);
        assert!(c.address.is_some());
        assert!(c.updated_at >= created);
    }

    #[test]
    fn email_matching_ignores_case() {
        let c = ada();
        assert!(c.email_matches("ADA@Example.COM"));
        assert!(!c.email_matches("ada@example.org"));
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let mut c = ada();
        c.apply_update(&ContactPatch::email("ada@analytical.engine"));

        let json = c.to_json().expect("serialize");
        let back = Contact::from_json(&json).expect("deserialize");

        assert_eq!(back, c);
        assert_eq!(back.created_at.timestamp_nanos_opt(), c.created_at.timestamp_nanos_opt());
    }

    #[test]
    fn json_uses_camel_case_and_omits_absent_optionals() {
        let c = Contact::new(NewContact::new("Grace", "Hopper", "grace@navy.mil"));
        let json = c.to_json().expect("serialize");
        assert!(json.contains("\"firstName\":\"Grace\""));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("phone"));
        assert!(!json.contains("address"));
    }

    #[test]
    fn deserialize_preserves_foreign_id_and_instant() {
        let json = r#"{
            "id": "lx9k2m-abc123",
            "firstName": "Alan",
            "lastName": "Turing",
            "email": "alan@bletchley.uk",
            "createdAt": "2024-03-01T09:15:30.123Z",
            "updatedAt": "2024-03-02T10:00:00Z"
        }"#;
        let c = Contact::from_json(json).expect("deserialize");
        assert_eq!(c.id.as_str(), "lx9k2m-abc123");
        assert_eq!(c.created_at.timestamp_millis(), 1_709_284_530_123);
        assert_eq!(c.phone, None);
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = Contact::from_json("{\"id\": 7}").expect_err("should fail");
        assert!(matches!(err, RolodexError::Serialization(_)));
    }

    #[test]
    fn patch_from_new_contact_is_full_overwrite() {
        let patch = ContactPatch::from(NewContact::new("A", "B", "c@d.e"));
        assert!(!patch.is_empty());
        assert_eq!(patch.phone, Some(None));
        assert!(ContactPatch::default().is_empty());
    }
}
