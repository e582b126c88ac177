use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::project::Project;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectMember {
    pub id: Uuid,
    pub name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct ProjectEntry {
    pub project: Project,
    pub team_name: Option<String>,
    pub member_count: i64,
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Upserts the project and replaces its members in one transaction
    async fn save(&self, project: &Project, member_ids: &[Uuid]) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Project>>;

    async fn members(&self, project_id: Uuid) -> RepositoryResult<Vec<ProjectMember>>;

    /// Newest first, restricted to `teams` when given
    async fn list(&self, teams: Option<&[Uuid]>) -> RepositoryResult<Vec<ProjectEntry>>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;

    async fn count(&self, teams: Option<&[Uuid]>) -> RepositoryResult<i64>;
}
