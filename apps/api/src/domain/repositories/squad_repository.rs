use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::squad::Squad;

#[derive(Debug, Clone)]
pub struct SquadSummary {
    pub squad: Squad,
    pub team_name: String,
    pub member_count: i64,
}

/// Repository trait for squads
#[async_trait]
pub trait SquadRepository: Send + Sync {
    /// Insert or update
    async fn save(&self, squad: &Squad) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Squad>>;

    /// Squads ordered by name, restricted to `teams` when given
    async fn list(&self, teams: Option<&[Uuid]>) -> RepositoryResult<Vec<SquadSummary>>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;

    async fn count(&self, teams: Option<&[Uuid]>) -> RepositoryResult<i64>;
}
