use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::invitation::Invitation;
use crate::domain::repositories::{
    InvitationEntry, InvitationRepository, RepositoryError, RepositoryResult,
};
use crate::domain::roles::InvitationRole;
use crate::domain::user::Email;

const ENTRY_SELECT: &str = r#"
    SELECT
        i.id, i.email, i.role, i.team_id, i.squad_id, i.created_by,
        i.expires_at, i.used, i.created_at,
        t.name AS team_name,
        s.name AS squad_name
    FROM invitations i
    LEFT JOIN teams t ON t.id = i.team_id
    LEFT JOIN squads s ON s.id = i.squad_id
"#;

#[derive(sqlx::FromRow)]
struct InvitationRow {
    id: Uuid,
    email: String,
    role: InvitationRole,
    team_id: Option<Uuid>,
    squad_id: Option<Uuid>,
    created_by: Option<Uuid>,
    expires_at: DateTime<Utc>,
    used: bool,
    created_at: DateTime<Utc>,
    team_name: Option<String>,
    squad_name: Option<String>,
}

impl InvitationRow {
    fn into_entry(self) -> RepositoryResult<InvitationEntry> {
        let email = Email::new(self.email).map_err(|e| {
            RepositoryError::Database(format!("Corrupt invitation {}: {}", self.id, e))
        })?;

        Ok(InvitationEntry {
            invitation: Invitation {
                id: self.id,
                email,
                role: self.role,
                team_id: self.team_id,
                squad_id: self.squad_id,
                created_by: self.created_by,
                expires_at: self.expires_at,
                used: self.used,
                created_at: self.created_at,
            },
            team_name: self.team_name,
            squad_name: self.squad_name,
        })
    }
}

/// PostgreSQL implementation of InvitationRepository
///
/// Invitations are marked used by `PostgresUserRepository::create`, inside
/// the registration transaction.
pub struct PostgresInvitationRepository {
    pool: PgPool,
}

impl PostgresInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn create(&self, invitation: &Invitation) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invitations (
                id, email, role, team_id, squad_id, created_by, expires_at, used, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(invitation.id)
        .bind(invitation.email.as_str())
        .bind(invitation.role)
        .bind(invitation.team_id)
        .bind(invitation.squad_id)
        .bind(invitation.created_by)
        .bind(invitation.expires_at)
        .bind(invitation.used)
        .bind(invitation.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<InvitationEntry>> {
        let sql = format!("{ENTRY_SELECT} WHERE i.id = $1");
        let row = sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(InvitationRow::into_entry).transpose()
    }

    async fn list_by_creator(&self, user_id: Uuid) -> RepositoryResult<Vec<InvitationEntry>> {
        let sql = format!("{ENTRY_SELECT} WHERE i.created_by = $1 ORDER BY i.created_at DESC");
        let rows = sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(InvitationRow::into_entry).collect()
    }
}
