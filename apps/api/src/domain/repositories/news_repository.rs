use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::news::News;

/// News row joined with its team and author
#[derive(Debug, Clone)]
pub struct NewsEntry {
    pub news: News,
    pub team_name: Option<String>,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
}

#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Insert or update
    async fn save(&self, news: &News) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<News>>;

    /// Newest first, restricted to `teams` when given
    async fn list(&self, teams: Option<&[Uuid]>, limit: Option<i64>) -> RepositoryResult<Vec<NewsEntry>>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;

    async fn count(&self, teams: Option<&[Uuid]>) -> RepositoryResult<i64>;
}
