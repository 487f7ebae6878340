//! Pull request reviewer assignment service.
//!
//! The crate is organised as a hexagon: [`domain`] holds the rules and the
//! ports, [`inbound`] adapts HTTP onto the driving ports and [`outbound`]
//! implements the store and randomness ports.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
