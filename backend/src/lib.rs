//! Questlog backend library.
//!
//! A gamified task tracker: tasks award XP, XP drives levels, counters unlock
//! achievements. The crate follows a hexagonal layout:
//!
//! - [`domain`]: entities, progression rules, services, and port traits.
//! - [`inbound`]: actix-web handlers translating HTTP into port calls.
//! - [`outbound`]: Diesel persistence, the in-memory store, and Argon2.
//! - [`middleware`]: request tracing.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

#[cfg(test)]
pub(crate) mod test_support;

/// OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
