//! Contact form handling
//!
//! The form state is plain data so validation and reset can be exercised
//! without a DOM.

use std::fmt;
use thiserror::Error;

/// The three required inputs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactField {
    FirstName,
    LastName,
    PhoneNumber,
}

impl ContactField {
    pub const ALL: [ContactField; 3] = [
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::PhoneNumber,
    ];

    /// Element id of the matching `<input>`
    pub fn dom_id(&self) -> &'static str {
        match self {
            ContactField::FirstName => "first-name",
            ContactField::LastName => "last-name",
            ContactField::PhoneNumber => "phone-number",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactField::FirstName => "First name",
            ContactField::LastName => "Last name",
            ContactField::PhoneNumber => "Phone number",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", join(.0))]
    MissingFields(Vec<ContactField>),
}

fn join(fields: &[ContactField]) -> String {
    fields
        .iter()
        .map(ContactField::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values captured by a successful submit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// Contact form contents and the download control it unlocks
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub download_enabled: bool,
}

impl ContactForm {
    pub fn value(&self, field: ContactField) -> &str {
        match field {
            ContactField::FirstName => &self.first_name,
            ContactField::LastName => &self.last_name,
            ContactField::PhoneNumber => &self.phone_number,
        }
    }

    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ContactField::FirstName => self.first_name = value,
            ContactField::LastName => self.last_name = value,
            ContactField::PhoneNumber => self.phone_number = value,
        }
    }

    /// Fields with an empty value, in form order
    pub fn missing_fields(&self) -> Vec<ContactField> {
        ContactField::ALL
            .into_iter()
            .filter(|f| self.value(*f).is_empty())
            .collect()
    }

    /// Validate, then clear the inputs and unlock the download control
    ///
    /// On failure nothing changes.
    pub fn submit(&mut self) -> Result<ContactDetails, ValidationError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let details = ContactDetails {
            first_name: std::mem::take(&mut self.first_name),
            last_name: std::mem::take(&mut self.last_name),
            phone_number: std::mem::take(&mut self.phone_number),
        };
        self.download_enabled = true;
        Ok(details)
    }
}
