//! The request payloads of the `web` module, their validated counterparts and parsing.

use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;
use validator::ValidateEmail;

use crate::{config::WaitlistConfig, model::WaitlistEntry};

const MAX_FIELD_GRAPHEMES: usize = 256;

// ###################################
// ->   STRUCTS
// ###################################
/// The `/submit` body as it arrives. Absent and `null` fields both decode to `None`,
/// whether they are required is decided by `ValidEntry::parse`.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitPayload {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// A submission with every field validated against the `WaitlistConfig` rules.
#[derive(Debug, Clone)]
pub struct ValidEntry {
    pub email: ValidEmail,
    pub name: Option<ValidName>,
}

impl ValidEntry {
    pub fn parse(payload: SubmitPayload, rules: &WaitlistConfig) -> Result<Self, DataParsingError> {
        let email = payload.email.filter(|email| !email.trim().is_empty());
        let name = payload.name.filter(|name| !name.trim().is_empty());

        let email = match (email, &name) {
            (None, None) if rules.require_name => {
                return Err(DataParsingError::NameAndEmailMissing)
            }
            (None, _) => return Err(DataParsingError::EmailMissing),
            (Some(_), None) if rules.require_name => return Err(DataParsingError::NameMissing),
            (Some(email), _) => email,
        };

        Ok(ValidEntry {
            email: ValidEmail::parse(email, rules.strict_email)?,
            name: name.map(ValidName::parse).transpose()?,
        })
    }
}

impl From<ValidEntry> for WaitlistEntry {
    fn from(entry: ValidEntry) -> Self {
        WaitlistEntry::new(entry.email.0, entry.name.map(|name| name.0))
    }
}

/// Validated email, kept exactly as submitted.
#[derive(Debug, Clone)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    /// Non-empty and at most 256 graphemes. `strict` additionally requires a valid address.
    pub fn parse<S>(value: S, strict: bool) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.trim().is_empty() {
            return Err(DataParsingError::EmailMissing);
        }

        if value.graphemes(true).count() > MAX_FIELD_GRAPHEMES {
            return Err(DataParsingError::EmailTooLong);
        }

        if strict && !value.validate_email() {
            return Err(DataParsingError::EmailInvalid);
        }

        Ok(ValidEmail(value.to_owned()))
    }
}

/// Validated name
#[derive(Debug, Clone)]
pub struct ValidName(String);

impl AsRef<str> for ValidName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidName {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.trim().is_empty() {
            return Err(DataParsingError::NameMissing);
        }

        if value.graphemes(true).count() > MAX_FIELD_GRAPHEMES {
            return Err(DataParsingError::NameTooLong);
        }

        Ok(ValidName(value.to_owned()))
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("missing email")]
    EmailMissing,
    #[error("missing name")]
    NameMissing,
    #[error("missing name and email")]
    NameAndEmailMissing,

    #[error("email invalid")]
    EmailInvalid,
    #[error("email too long")]
    EmailTooLong,
    #[error("name too long")]
    NameTooLong,
}

impl DataParsingError {
    pub fn is_missing_field(&self) -> bool {
        matches!(
            self,
            Self::EmailMissing | Self::NameMissing | Self::NameAndEmailMissing
        )
    }

    /// The message shown to the client.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::EmailMissing => "Email is required",
            Self::NameMissing => "Name is required",
            Self::NameAndEmailMissing => "Name and email are required",
            Self::EmailInvalid => "Invalid email",
            Self::EmailTooLong => "Email is too long",
            Self::NameTooLong => "Name is too long",
        }
    }
}
