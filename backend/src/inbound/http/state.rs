//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AchievementCommand, AchievementQuery, AchievementRepository, AuthCommand, PasswordHasher,
    TagCommand, TagQuery, TagRepository, TaskCommand, TaskQuery, TaskRepository,
    UserProfileCommand, UserProfileQuery, UserRepository, XpCommand, XpLedgerRepository,
};
use crate::domain::{
    AchievementService, AuthService, TagService, TaskService, UserProfileService, XpService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub profile_command: Arc<dyn UserProfileCommand>,
    pub tasks: Arc<dyn TaskCommand>,
    pub tasks_query: Arc<dyn TaskQuery>,
    pub tags: Arc<dyn TagCommand>,
    pub tags_query: Arc<dyn TagQuery>,
    pub achievements: Arc<dyn AchievementCommand>,
    pub achievements_query: Arc<dyn AchievementQuery>,
}

/// Driven adapters the services are built from.
pub struct Adapters<U, L, T, G, A> {
    pub users: Arc<U>,
    pub ledger: Arc<L>,
    pub tasks: Arc<T>,
    pub tags: Arc<G>,
    pub achievements: Arc<A>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Wire every domain service over one set of adapters.
    ///
    /// The task pipeline and auth bonuses share a single [`XpService`] and
    /// [`AchievementService`], so HTTP-triggered checks and completion-time
    /// checks read the same catalogue.
    pub fn from_adapters<U, L, T, G, A>(adapters: Adapters<U, L, T, G, A>) -> Self
    where
        U: UserRepository + 'static,
        L: XpLedgerRepository + 'static,
        T: TaskRepository + 'static,
        G: TagRepository + 'static,
        A: AchievementRepository + 'static,
    {
        let Adapters {
            users,
            ledger,
            tasks,
            tags,
            achievements,
            hasher,
            clock,
        } = adapters;

        let xp: Arc<dyn XpCommand> = Arc::new(XpService::new(Arc::clone(&ledger), Arc::clone(&clock)));
        let achievement_service = Arc::new(AchievementService::new(
            Arc::clone(&achievements),
            Arc::clone(&tasks),
            Arc::clone(&users),
            Arc::clone(&clock),
        ));
        let task_service = Arc::new(TaskService::new(
            Arc::clone(&tasks),
            Arc::clone(&xp),
            achievement_service.clone(),
            Arc::clone(&clock),
        ));
        let profile_service = Arc::new(UserProfileService::new(
            Arc::clone(&users),
            Arc::clone(&ledger),
            tasks,
            achievements,
            Arc::clone(&clock),
        ));
        let tag_service = Arc::new(TagService::new(tags, Arc::clone(&clock)));
        let auth_service = Arc::new(AuthService::new(users, ledger, hasher, xp, clock));

        Self {
            auth: auth_service,
            profile: profile_service.clone(),
            profile_command: profile_service,
            tasks: task_service.clone(),
            tasks_query: task_service,
            tags: tag_service.clone(),
            tags_query: tag_service,
            achievements: achievement_service.clone(),
            achievements_query: achievement_service,
        }
    }
}
