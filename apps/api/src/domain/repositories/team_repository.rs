use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::team::{Leadership, Team};

/// Team row plus the aggregates shown in listings
#[derive(Debug, Clone)]
pub struct TeamSummary {
    pub team: Team,
    pub president_id: Option<Uuid>,
    pub squad_count: i64,
    pub member_count: i64,
}

/// Repository trait for Team aggregate
///
/// Defines the contract for persisting and retrieving teams.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Inserts the team and its leadership seats in one transaction
    async fn create(&self, team: &Team, leadership: &Leadership) -> RepositoryResult<()>;

    /// Saves the team; with `leadership` the president and vice president
    /// seats are replaced in the same transaction
    async fn update(&self, team: &Team, leadership: Option<&Leadership>) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>>;

    /// All teams ordered by name
    async fn list(&self) -> RepositoryResult<Vec<TeamSummary>>;

    async fn leadership(&self, team_id: Uuid) -> RepositoryResult<Leadership>;

    /// Drops the current president / vice president rows and inserts the new ones
    async fn replace_leadership(&self, team_id: Uuid, leadership: &Leadership) -> RepositoryResult<()>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;

    async fn count(&self) -> RepositoryResult<i64>;
}
