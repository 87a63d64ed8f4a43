//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel and `diesel-async`.
//! - **memory**: a mutex-guarded store implementing the same repositories,
//!   used when no database is configured and by the integration suite.
//! - **security**: Argon2id password hashing.
//!
//! Adapters translate between domain types and storage; rules stay in the
//! domain services.

pub mod memory;
pub mod persistence;
pub mod security;
