use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::membership::{SquadMembership, TeamMembership};
use crate::domain::roles::TeamRole;

/// Repository trait for `user_teams` and `user_squads`
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn teams_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<TeamMembership>>;

    async fn squads_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<SquadMembership>>;

    async fn team_members(&self, team_id: Uuid) -> RepositoryResult<Vec<TeamMembership>>;

    async fn squad_members(&self, squad_id: Uuid) -> RepositoryResult<Vec<SquadMembership>>;

    async fn all_team_memberships(&self) -> RepositoryResult<Vec<TeamMembership>>;

    async fn all_squad_memberships(&self) -> RepositoryResult<Vec<SquadMembership>>;


    /// Adds a single role; an identical existing row is a conflict
    async fn add_team_role(&self, membership: &TeamMembership) -> RepositoryResult<()>;

    async fn remove_team_role(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> RepositoryResult<()>;
}
