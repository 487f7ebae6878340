//! Teams and their membership.

use super::{TeamName, User, UserId, Username};

/// Membership entry as supplied when creating a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    pub user_id: UserId,
    pub username: Username,
    pub is_active: bool,
}

impl TeamMember {
    /// Bind the member to `team`, producing the user record to upsert.
    pub fn into_user(self, team: &TeamName) -> User {
        User {
            id: self.user_id,
            username: self.username,
            team_name: team.clone(),
            is_active: self.is_active,
        }
    }
}

impl From<User> for TeamMember {
    fn from(value: User) -> Self {
        Self {
            user_id: value.id,
            username: value.username,
            is_active: value.is_active,
        }
    }
}

/// A team with its members ordered by user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub name: TeamName,
    pub members: Vec<TeamMember>,
}

impl Team {
    /// Assemble a team from stored users, sorting members by id.
    pub fn from_users(name: TeamName, users: Vec<User>) -> Self {
        let mut members: Vec<TeamMember> = users.into_iter().map(TeamMember::from).collect();
        members.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Self { name, members }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user(id: &str, team: &str) -> User {
        User {
            id: UserId::new(id).expect("id"),
            username: Username::new(format!("name-{id}")).expect("name"),
            team_name: TeamName::new(team).expect("team"),
            is_active: true,
        }
    }

    #[rstest]
    fn from_users_sorts_members() {
        let team = TeamName::new("backend").expect("team");
        let built = Team::from_users(team, vec![user("u3", "backend"), user("u1", "backend")]);
        let ids: Vec<_> = built.members.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(ids, ["u1", "u3"]);
    }

    #[rstest]
    fn into_user_rehomes_member() {
        let member = TeamMember::from(user("u1", "frontend"));
        let target = TeamName::new("backend").expect("team");
        assert_eq!(member.into_user(&target).team_name, target);
    }
}
