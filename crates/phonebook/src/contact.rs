//! Core contact types for phonebook.
//!
//! This module defines the contact record, the closed set of fields that
//! contacts can be sorted and grouped by, and the update payload used to
//! change a contact's details.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A contact field that records can be sorted or grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    /// The contact's given name.
    FirstName,
    /// The contact's family name.
    #[default]
    LastName,
    /// The canonical phone number.
    Phone,
    /// The optional email address.
    Email,
    /// The optional postal address.
    Address,
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstName => write!(f, "first_name"),
            Self::LastName => write!(f, "last_name"),
            Self::Phone => write!(f, "phone"),
            Self::Email => write!(f, "email"),
            Self::Address => write!(f, "address"),
        }
    }
}

/// A change to an optional field.
///
/// Separates "leave the field alone" from "remove the value", which a plain
/// empty string cannot express.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate {
    /// Keep the current value.
    #[default]
    Keep,
    /// Replace the value.
    Set(String),
    /// Remove the value.
    Clear,
}

impl FieldUpdate {
    fn apply(&self, slot: &mut Option<String>) {
        match self {
            Self::Keep => {}
            Self::Set(value) => *slot = non_empty(value),
            Self::Clear => *slot = None,
        }
    }
}

/// The set of changes to apply to a contact.
///
/// Required fields use `None` for "keep". Supplying an empty string for a
/// required field is rejected rather than silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactUpdate {
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// Change to the email address.
    pub email: FieldUpdate,
    /// Change to the postal address.
    pub address: FieldUpdate,
}

impl ContactUpdate {
    /// Check whether this update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.email == FieldUpdate::Keep
            && self.address == FieldUpdate::Keep
    }

    /// Reject updates that would blank a required field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for the first required field set to an
    /// empty string.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("phone", &self.phone),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(Error::MissingField { field });
            }
        }
        Ok(())
    }
}

/// A single entry in the phone book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// The contact's given name.
    pub first_name: String,

    /// The contact's family name.
    pub last_name: String,

    /// Phone number in `(###) ###-####` form.
    pub phone: String,

    /// Email address, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Postal address, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    time_added: DateTime<Local>,
}

impl Contact {
    /// Create a new contact stamped with the current time.
    ///
    /// Format validation of the phone and email is the caller's job; see
    /// [`crate::validate`]. Empty optional values are stored as absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if a name or the phone is empty.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
        email: Option<String>,
        address: Option<String>,
    ) -> Result<Self> {
        Self::with_time_added(first_name, last_name, phone, email, address, Local::now())
    }

    /// Create a contact with an explicit creation time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if a name or the phone is empty.
    pub fn with_time_added(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
        email: Option<String>,
        address: Option<String>,
        time_added: DateTime<Local>,
    ) -> Result<Self> {
        let first_name = required("first_name", &first_name.into())?;
        let last_name = required("last_name", &last_name.into())?;
        let phone = required("phone", &phone.into())?;

        Ok(Self {
            first_name,
            last_name,
            phone,
            email: email.as_deref().and_then(non_empty),
            address: address.as_deref().and_then(non_empty),
            time_added,
        })
    }

    /// When this contact was created.
    #[must_use]
    pub fn time_added(&self) -> DateTime<Local> {
        self.time_added
    }

    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Read the value of the given field.
    #[must_use]
    pub fn field(&self, field: ContactField) -> Option<&str> {
        match field {
            ContactField::FirstName => Some(&self.first_name),
            ContactField::LastName => Some(&self.last_name),
            ContactField::Phone => Some(&self.phone),
            ContactField::Email => self.email.as_deref(),
            ContactField::Address => self.address.as_deref(),
        }
    }

    /// Apply an update, leaving untouched every field it does not carry.
    ///
    /// The update is validated first, so a rejected update changes nothing.
    /// `time_added` is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if the update would blank a required
    /// field.
    pub fn update(&mut self, update: &ContactUpdate) -> Result<()> {
        update.validate()?;

        if let Some(first_name) = &update.first_name {
            first_name.trim().clone_into(&mut self.first_name);
        }
        if let Some(last_name) = &update.last_name {
            last_name.trim().clone_into(&mut self.last_name);
        }
        if let Some(phone) = &update.phone {
            phone.trim().clone_into(&mut self.phone);
        }
        update.email.apply(&mut self.email);
        update.address.apply(&mut self.address);

        Ok(())
    }
}

fn required(field: &'static str, value: &str) -> Result<String> {
    non_empty(value).ok_or(Error::MissingField { field })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
