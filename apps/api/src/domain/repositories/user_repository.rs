use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::membership::MembershipPlan;
use crate::domain::user::{Email, Profile};

/// Profile together with its credentials
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub profile: Profile,
    pub password_hash: String,
}

/// Repository trait for profiles and their credentials
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user with its initial memberships in one transaction
    ///
    /// When `invitation_id` is given the invitation is marked used in the
    /// same transaction; an invitation that is already used yields
    /// `RepositoryError::Conflict` and nothing is written.
    async fn create(
        &self,
        account: &UserAccount,
        memberships: &MembershipPlan,
        invitation_id: Option<Uuid>,
    ) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Profile>>;

    async fn find_account_by_id(&self, id: Uuid) -> RepositoryResult<Option<UserAccount>>;

    async fn find_account_by_email(&self, email: &Email) -> RepositoryResult<Option<UserAccount>>;

    /// All profiles ordered by name
    async fn list(&self) -> RepositoryResult<Vec<Profile>>;

    async fn find_many(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Profile>>;

    /// Persists name, email, admin flag and the social fields
    ///
    /// With `memberships` the user's seats are replaced in the same
    /// transaction.
    async fn update(
        &self,
        profile: &Profile,
        memberships: Option<&MembershipPlan>,
    ) -> RepositoryResult<()>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> RepositoryResult<()>;

    async fn update_last_login(&self, id: Uuid) -> RepositoryResult<()>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;

    async fn count(&self) -> RepositoryResult<i64>;
}
