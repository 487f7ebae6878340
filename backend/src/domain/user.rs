//! Team members as seen by the review engine.

use super::{TeamName, UserId, Username};

/// A user resolvable to exactly one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub team_name: TeamName,
    pub is_active: bool,
}

impl User {
    /// A user may review only while active.
    pub fn can_review(&self) -> bool {
        self.is_active
    }
}
