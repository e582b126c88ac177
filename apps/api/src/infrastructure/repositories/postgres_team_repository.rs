use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::ensure_affected;
use crate::domain::repositories::{RepositoryResult, TeamRepository, TeamSummary};
use crate::domain::roles::TeamRole;
use crate::domain::team::{Leadership, Team, TeamColor};

const TEAM_COLUMNS: &str =
    "t.id, t.name, t.description, t.banner_url, t.logo_url, t.team_color, t.created_at";

#[derive(sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    banner_url: Option<String>,
    logo_url: Option<String>,
    team_color: Option<String>,
    created_at: DateTime<Utc>,
}

impl TeamRow {
    fn into_team(self) -> Team {
        // A color that no longer validates is dropped rather than failing the read
        let team_color = self.team_color.and_then(|c| TeamColor::new(c).ok());

        Team::from_persistence(
            self.id,
            self.name,
            self.description,
            self.banner_url,
            self.logo_url,
            team_color,
            self.created_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct TeamSummaryRow {
    #[sqlx(flatten)]
    team: TeamRow,
    president_id: Option<Uuid>,
    squad_count: i64,
    member_count: i64,
}

/// PostgreSQL implementation of TeamRepository
///
/// Leadership is not a column of `teams`: presidents and vice presidents
/// are `user_teams` rows with the matching role.
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Creates a new PostgresTeamRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn delete_leadership(
    tx: &mut Transaction<'_, Postgres>,
    team_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM user_teams
        WHERE team_id = $1 AND role IN ('president', 'vice_president')
        "#,
    )
    .bind(team_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_leadership(
    tx: &mut Transaction<'_, Postgres>,
    team_id: Uuid,
    leadership: &Leadership,
) -> Result<(), sqlx::Error> {
    let seats = [
        (leadership.president_id, TeamRole::President),
        (leadership.vice_president_id, TeamRole::VicePresident),
    ];

    for (user_id, role) in seats {
        let Some(user_id) = user_id else {
            continue;
        };
        sqlx::query(
            r#"
            INSERT INTO user_teams (user_id, team_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, team_id, role) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(team_id)
        .bind(role)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn create(&self, team: &Team, leadership: &Leadership) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO teams (id, name, description, banner_url, logo_url, team_color, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(team.id())
        .bind(team.name())
        .bind(team.description())
        .bind(team.banner_url())
        .bind(team.logo_url())
        .bind(team.team_color().map(TeamColor::as_str))
        .bind(team.created_at())
        .execute(&mut *tx)
        .await?;

        insert_leadership(&mut tx, team.id(), leadership).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, team: &Team, leadership: Option<&Leadership>) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE teams SET
                name = $2,
                description = $3,
                banner_url = $4,
                logo_url = $5,
                team_color = $6
            WHERE id = $1
            "#,
        )
        .bind(team.id())
        .bind(team.name())
        .bind(team.description())
        .bind(team.banner_url())
        .bind(team.logo_url())
        .bind(team.team_color().map(TeamColor::as_str))
        .execute(&mut *tx)
        .await?;
        ensure_affected(result.rows_affected(), "Team")?;

        if let Some(leadership) = leadership {
            delete_leadership(&mut tx, team.id()).await?;
            insert_leadership(&mut tx, team.id(), leadership).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>> {
        let sql = format!("SELECT {TEAM_COLUMNS} FROM teams t WHERE t.id = $1");
        let row = sqlx::query_as::<_, TeamRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(TeamRow::into_team))
    }

    async fn list(&self) -> RepositoryResult<Vec<TeamSummary>> {
        let sql = format!(
            r#"
            SELECT
                {TEAM_COLUMNS},
                (
                    SELECT ut.user_id FROM user_teams ut
                    WHERE ut.team_id = t.id AND ut.role = 'president'
                    LIMIT 1
                ) AS president_id,
                (SELECT COUNT(*) FROM squads s WHERE s.team_id = t.id) AS squad_count,
                (
                    SELECT COUNT(DISTINCT ut.user_id) FROM user_teams ut
                    WHERE ut.team_id = t.id
                ) AS member_count
            FROM teams t
            ORDER BY t.name
            "#
        );
        let rows = sqlx::query_as::<_, TeamSummaryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| TeamSummary {
                team: r.team.into_team(),
                president_id: r.president_id,
                squad_count: r.squad_count,
                member_count: r.member_count,
            })
            .collect())
    }

    async fn leadership(&self, team_id: Uuid) -> RepositoryResult<Leadership> {
        let rows = sqlx::query_as::<_, (Uuid, TeamRole)>(
            r#"
            SELECT user_id, role FROM user_teams
            WHERE team_id = $1 AND role IN ('president', 'vice_president')
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        let mut leadership = Leadership::default();
        for (user_id, role) in rows {
            match role {
                TeamRole::President => leadership.president_id = Some(user_id),
                TeamRole::VicePresident => leadership.vice_president_id = Some(user_id),
                _ => {}
            }
        }
        Ok(leadership)
    }

    async fn replace_leadership(&self, team_id: Uuid, leadership: &Leadership) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        delete_leadership(&mut tx, team_id).await?;
        insert_leadership(&mut tx, team_id, leadership).await?;

        tx.commit().await?;

        tracing::debug!(team_id = %team_id, "Team leadership replaced");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected(), "Team")
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM teams")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
