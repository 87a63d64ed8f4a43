//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each repository implements one domain port on top of a shared [`DbPool`]
//! (`diesel-async` connections pooled by `bb8`). Row structs in `models.rs`
//! and the `schema.rs` table definitions stay private to this module; port
//! errors are the only failures that escape.
//!
//! # Example
//!
//! ```no_run
//! use questlog::outbound::persistence::{
//!     DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://questlog@localhost/questlog";
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_achievement_repository;
pub(crate) mod diesel_helpers;
mod diesel_tag_repository;
mod diesel_task_repository;
mod diesel_user_repository;
mod diesel_xp_ledger_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_achievement_repository::DieselAchievementRepository;
pub use diesel_tag_repository::DieselTagRepository;
pub use diesel_task_repository::DieselTaskRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_xp_ledger_repository::DieselXpLedgerRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
