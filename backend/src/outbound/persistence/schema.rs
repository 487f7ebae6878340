//! Diesel table definitions.
//!
//! Must match `backend/migrations` exactly.

diesel::table! {
    teams (team_name) {
        team_name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Users belong to exactly one team.
    users (user_id) {
        user_id -> Varchar,
        username -> Varchar,
        team_name -> Varchar,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Pull requests. `status` is `OPEN` or `MERGED`.
    pull_requests (pull_request_id) {
        pull_request_id -> Varchar,
        pull_request_name -> Varchar,
        author_id -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
        merged_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Reviewer assignments, unique per pull request and reviewer.
    pr_reviewers (pull_request_id, reviewer_id) {
        pull_request_id -> Varchar,
        reviewer_id -> Varchar,
        assigned_at -> Timestamptz,
    }
}

diesel::joinable!(users -> teams (team_name));
diesel::joinable!(pr_reviewers -> pull_requests (pull_request_id));
diesel::joinable!(pr_reviewers -> users (reviewer_id));

diesel::allow_tables_to_appear_in_same_query!(teams, users, pull_requests, pr_reviewers);
