use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::domain::repositories::{
    InvitationRepository, MembershipRepository, NewsRepository, ProjectRepository,
    SquadRepository, TeamRepository, UserRepository,
};
use crate::infrastructure::repositories::{
    PostgresInvitationRepository, PostgresMembershipRepository, PostgresNewsRepository,
    PostgresProjectRepository, PostgresSquadRepository, PostgresTeamRepository,
    PostgresUserRepository,
};
use crate::infrastructure::storage::ObjectStorage;

/// Shared application state handed to every handler
///
/// Repositories are trait objects so the router can run against any
/// adapter.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub teams: Arc<dyn TeamRepository>,
    pub squads: Arc<dyn SquadRepository>,
    pub news: Arc<dyn NewsRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub invitations: Arc<dyn InvitationRepository>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl AppState {
    /// Wires every repository to the same PostgreSQL pool
    pub fn postgres(pool: PgPool, config: AppConfig, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            config: Arc::new(config),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            memberships: Arc::new(PostgresMembershipRepository::new(pool.clone())),
            teams: Arc::new(PostgresTeamRepository::new(pool.clone())),
            squads: Arc::new(PostgresSquadRepository::new(pool.clone())),
            news: Arc::new(PostgresNewsRepository::new(pool.clone())),
            projects: Arc::new(PostgresProjectRepository::new(pool.clone())),
            invitations: Arc::new(PostgresInvitationRepository::new(pool)),
            storage,
        }
    }
}
