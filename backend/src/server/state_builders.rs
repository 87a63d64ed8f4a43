//! Builds the HTTP state from the configured storage backend.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use questlog::domain::ports::PasswordHasher;
use questlog::inbound::http::state::{Adapters, HttpState};
use questlog::outbound::memory::MemoryStore;
use questlog::outbound::persistence::{
    DbPool, DieselAchievementRepository, DieselTagRepository, DieselTaskRepository,
    DieselUserRepository, DieselXpLedgerRepository,
};
use questlog::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Wire the domain services over PostgreSQL when a pool is configured,
/// otherwise over one shared in-memory store.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let state = match &config.db_pool {
        Some(pool) => diesel_state(pool, hasher, clock),
        None => {
            warn!("no database configured; state lives in memory and is lost on restart");
            memory_state(hasher, clock)
        }
    };
    web::Data::new(state)
}

fn diesel_state(pool: &DbPool, hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> HttpState {
    HttpState::from_adapters(Adapters {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        ledger: Arc::new(DieselXpLedgerRepository::new(pool.clone())),
        tasks: Arc::new(DieselTaskRepository::new(pool.clone())),
        tags: Arc::new(DieselTagRepository::new(pool.clone())),
        achievements: Arc::new(DieselAchievementRepository::new(pool.clone())),
        hasher,
        clock,
    })
}

fn memory_state(hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> HttpState {
    let store = Arc::new(MemoryStore::new());
    HttpState::from_adapters(Adapters {
        users: Arc::clone(&store),
        ledger: Arc::clone(&store),
        tasks: Arc::clone(&store),
        tags: Arc::clone(&store),
        achievements: store,
        hasher,
        clock,
    })
}
