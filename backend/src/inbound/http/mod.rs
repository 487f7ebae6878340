//! HTTP inbound adapter exposing REST endpoints.

pub mod dto;
pub mod error;
pub mod health;
pub mod pull_requests;
pub mod state;
pub mod stats;
pub mod teams;
pub mod users;
pub mod validation;

pub use error::ApiResult;
