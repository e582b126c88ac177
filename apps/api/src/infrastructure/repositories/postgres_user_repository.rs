use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ensure_affected, insert_memberships, replace_memberships};
use crate::domain::membership::MembershipPlan;
use crate::domain::repositories::{
    RepositoryError, RepositoryResult, UserAccount, UserRepository,
};
use crate::domain::user::{Email, Profile};

const PROFILE_COLUMNS: &str = r#"
    id, name, email, password_hash, is_admin, bio, website, x, instagram,
    avatar_url, banner_url, created_at
"#;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    is_admin: bool,
    bio: Option<String>,
    website: Option<String>,
    x: Option<String>,
    instagram: Option<String>,
    avatar_url: Option<String>,
    banner_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_account(self) -> RepositoryResult<UserAccount> {
        let email = Email::new(self.email)
            .map_err(|e| RepositoryError::Database(format!("Corrupt profile {}: {}", self.id, e)))?;

        Ok(UserAccount {
            profile: Profile {
                id: self.id,
                name: self.name,
                email,
                is_admin: self.is_admin,
                bio: self.bio,
                website: self.website,
                x: self.x,
                instagram: self.instagram,
                avatar_url: self.avatar_url,
                banner_url: self.banner_url,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        })
    }

    fn into_profile(self) -> RepositoryResult<Profile> {
        self.into_account().map(|a| a.profile)
    }
}

/// PostgreSQL implementation of UserRepository
///
/// Profiles and password hashes live in the same `profiles` table.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(
        &self,
        account: &UserAccount,
        memberships: &MembershipPlan,
        invitation_id: Option<Uuid>,
    ) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        // Claim the invitation first so a concurrent registration loses the race
        if let Some(invitation_id) = invitation_id {
            let claimed = sqlx::query(
                "UPDATE invitations SET used = TRUE WHERE id = $1 AND used = FALSE",
            )
            .bind(invitation_id)
            .execute(&mut *tx)
            .await?;

            if claimed.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(
                    "Invitation has already been used".to_string(),
                ));
            }
        }

        let profile = &account.profile;
        sqlx::query(
            r#"
            INSERT INTO profiles (
                id, name, email, password_hash, is_admin, bio, website, x,
                instagram, avatar_url, banner_url, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.name)
        .bind(profile.email.as_str())
        .bind(&account.password_hash)
        .bind(profile.is_admin)
        .bind(&profile.bio)
        .bind(&profile.website)
        .bind(&profile.x)
        .bind(&profile.instagram)
        .bind(&profile.avatar_url)
        .bind(&profile.banner_url)
        .bind(profile.created_at)
        .execute(&mut *tx)
        .await?;

        insert_memberships(&mut tx, profile.id, memberships).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Profile>> {
        self.find_account_by_id(id)
            .await
            .map(|account| account.map(|a| a.profile))
    }

    async fn find_account_by_id(&self, id: Uuid) -> RepositoryResult<Option<UserAccount>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProfileRow::into_account).transpose()
    }

    async fn find_account_by_email(&self, email: &Email) -> RepositoryResult<Option<UserAccount>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProfileRow::into_account).transpose()
    }

    async fn list(&self) -> RepositoryResult<Vec<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY name");
        let rows = sqlx::query_as::<_, ProfileRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    async fn find_many(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ANY($1) ORDER BY name");
        let rows = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    async fn update(
        &self,
        profile: &Profile,
        memberships: Option<&MembershipPlan>,
    ) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                name = $2,
                email = $3,
                is_admin = $4,
                bio = $5,
                website = $6,
                x = $7,
                instagram = $8,
                avatar_url = $9,
                banner_url = $10,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(profile.id)
        .bind(&profile.name)
        .bind(profile.email.as_str())
        .bind(profile.is_admin)
        .bind(&profile.bio)
        .bind(&profile.website)
        .bind(&profile.x)
        .bind(&profile.instagram)
        .bind(&profile.avatar_url)
        .bind(&profile.banner_url)
        .execute(&mut *tx)
        .await?;
        ensure_affected(result.rows_affected(), "User")?;

        if let Some(plan) = memberships {
            replace_memberships(&mut tx, profile.id, plan).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE profiles SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        ensure_affected(result.rows_affected(), "User")
    }

    async fn update_last_login(&self, id: Uuid) -> RepositoryResult<()> {
        sqlx::query("UPDATE profiles SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected(), "User")
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
