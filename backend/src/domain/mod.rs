//! Domain primitives, the reviewer selection engine and the lifecycle service.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure with a stable code.
//! - Identifier newtypes: `TeamName`, `UserId`, `Username`, `PullRequestId`,
//!   `PullRequestName`.
//! - Entities: `Team`, `TeamMember`, `User`, `PullRequest`, `PullRequestSummary`.
//! - `ReviewerSelector`: uniform random reviewer selection.
//! - `ReviewService`: implements the driving ports in [`ports`].

pub mod error;
mod identifier;
pub mod ports;
mod pull_request;
mod review_service;
mod reviewer_selection;
mod statistics;
mod team;
mod trace_id;
mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identifier::{
    IdentifierValidationError, PullRequestId, PullRequestName, TeamName, UserId, Username,
};
pub use self::pull_request::{
    ParseStatusError, PullRequest, PullRequestRecord, PullRequestStatus, PullRequestSummary,
    ReviewAssignment,
};
pub use self::review_service::ReviewService;
pub use self::reviewer_selection::{DEFAULT_MAX_REVIEWERS, ReviewerSelector};
pub use self::statistics::{PullRequestTotals, Statistics, UserAssignmentStats};
pub use self::team::{Team, TeamMember};
pub use self::trace_id::TraceId;
pub use self::user::User;
