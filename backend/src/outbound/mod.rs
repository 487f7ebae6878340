//! Outbound adapters implementing domain ports.
//!
//! - **memory**: in-process review store
//! - **persistence**: PostgreSQL review store using Diesel
//! - **random**: `rand`-backed random sources for reviewer selection
//!
//! Adapters only translate between domain types and infrastructure; they hold
//! no business rules.

pub mod memory;
pub mod persistence;
pub mod random;
