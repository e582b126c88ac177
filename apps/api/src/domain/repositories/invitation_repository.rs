use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::invitation::Invitation;

/// Invitation joined with the names of its team and squad
#[derive(Debug, Clone)]
pub struct InvitationEntry {
    pub invitation: Invitation,
    pub team_name: Option<String>,
    pub squad_name: Option<String>,
}

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, invitation: &Invitation) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<InvitationEntry>>;

    /// Invitations created by `user_id`, newest first
    async fn list_by_creator(&self, user_id: Uuid) -> RepositoryResult<Vec<InvitationEntry>>;
}
