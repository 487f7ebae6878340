//! Validated text identifiers shared by teams, users and pull requests.
//!
//! Identifiers are opaque strings supplied by callers. They must be non-empty
//! and carry no leading or trailing whitespace; anything else is accepted
//! verbatim so external systems keep control of their naming.

use std::fmt;

use serde_json::json;

use super::Error;

/// Validation failures for text identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must not have leading or trailing whitespace")]
    SurroundingWhitespace { field: &'static str },
}

impl IdentifierValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::SurroundingWhitespace { field } => field,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "empty",
            Self::SurroundingWhitespace { .. } => "surrounding_whitespace",
        }
    }
}

impl From<IdentifierValidationError> for Error {
    fn from(value: IdentifierValidationError) -> Self {
        Error::invalid_request(value.to_string()).with_details(json!({
            "field": value.field(),
            "code": value.code(),
        }))
    }
}

fn validate(field: &'static str, value: String) -> Result<String, IdentifierValidationError> {
    if value.trim().is_empty() {
        return Err(IdentifierValidationError::Empty { field });
    }
    if value.trim() != value {
        return Err(IdentifierValidationError::SurroundingWhitespace { field });
    }
    Ok(value)
}

macro_rules! text_identifier {
    ($(#[$meta:meta])* $name:ident => $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap the supplied value.
            pub fn new(value: impl Into<String>) -> Result<Self, IdentifierValidationError> {
                validate($field, value.into()).map(Self)
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdentifierValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

text_identifier! {
    /// Unique team name.
    TeamName => "team_name"
}

text_identifier! {
    /// Caller-assigned user identifier.
    UserId => "user_id"
}

text_identifier! {
    /// Display name of a user.
    Username => "username"
}

text_identifier! {
    /// Caller-assigned pull request identifier.
    PullRequestId => "pull_request_id"
}

text_identifier! {
    /// Human-readable pull request title.
    PullRequestName => "pull_request_name"
}
