//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope. Every failure carries a
//! discrete [`ErrorCode`] next to its message; adapters branch on the code and
//! never on the message text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A team with the requested name is already registered.
    TeamExists,
    /// A pull request with the requested identifier already exists.
    PrExists,
    /// A referenced team, user, or pull request does not exist.
    NotFound,
    /// A mutation was attempted on a merged pull request.
    PrMerged,
    /// The reviewer named for reassignment is not assigned to the pull request.
    NotAssigned,
    /// No active replacement reviewer is available in the team.
    NoCandidate,
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// A dependency (usually storage) is temporarily unreachable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain or its adapters.
    InternalError,
}

impl ErrorCode {
    /// Wire representation of the code.
    ///
    /// # Examples
    /// ```
    /// use pr_reviewer::domain::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::NoCandidate.as_str(), "NO_CANDIDATE");
    /// ```
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TeamExists => "TEAM_EXISTS",
            Self::PrExists => "PR_EXISTS",
            Self::NotFound => "NOT_FOUND",
            Self::PrMerged => "PR_MERGED",
            Self::NotAssigned => "NOT_ASSIGNED",
            Self::NoCandidate => "NO_CANDIDATE",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    const fn default_message(self) -> &'static str {
        match self {
            Self::TeamExists => "team_name already exists",
            Self::PrExists => "PR id already exists",
            Self::NotFound => "resource not found",
            Self::PrMerged => "cannot reassign on merged PR",
            Self::NotAssigned => "reviewer is not assigned to this PR",
            Self::NoCandidate => "no active replacement candidate in team",
            Self::InvalidRequest => "invalid request",
            Self::ServiceUnavailable => "service temporarily unavailable",
            Self::InternalError => "internal error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace.
/// - `trace_id`, when present, is non-empty.
///
/// # Examples
/// ```
/// use pr_reviewer::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("PR not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "PR not found");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Validation errors emitted by the fallible constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The supplied message was empty or whitespace.
    #[error("error message must not be empty")]
    EmptyMessage,
    /// The supplied trace identifier was empty or whitespace.
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

impl Error {
    /// Create a new error, capturing the trace identifier in scope.
    ///
    /// Blank messages are replaced with the code's default wording so the
    /// payload invariant holds without panicking.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match Self::try_new(code, message) {
            Ok(error) => error,
            Err(_) => Self {
                code,
                message: code.default_message().to_owned(),
                trace_id: TraceId::current().map(|id| id.to_string()),
                details: None,
            },
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier captured when the error was built.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach a trace identifier, rejecting blank values.
    pub fn try_with_trace_id(mut self, id: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        self.trace_id = Some(id);
        Ok(self)
    }

    /// Attach a trace identifier; blank values leave the error unchanged.
    pub fn with_trace_id(self, id: impl Into<String>) -> Self {
        let fallback = self.clone();
        self.try_with_trace_id(id).unwrap_or(fallback)
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use pr_reviewer::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "team_name" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::TeamExists`].
    pub fn team_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TeamExists, message)
    }

    /// Convenience constructor for [`ErrorCode::PrExists`].
    pub fn pr_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PrExists, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::PrMerged`].
    pub fn pr_merged(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PrMerged, message)
    }

    /// Convenience constructor for [`ErrorCode::NotAssigned`].
    pub fn not_assigned(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotAssigned, message)
    }

    /// Convenience constructor for [`ErrorCode::NoCandidate`].
    pub fn no_candidate(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoCandidate, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}
