use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::ensure_affected;
use crate::domain::repositories::{RepositoryResult, SquadRepository, SquadSummary};
use crate::domain::squad::Squad;

#[derive(sqlx::FromRow)]
struct SquadRow {
    id: Uuid,
    name: String,
    team_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<SquadRow> for Squad {
    fn from(row: SquadRow) -> Self {
        Squad {
            id: row.id,
            name: row.name,
            team_id: row.team_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SquadSummaryRow {
    #[sqlx(flatten)]
    squad: SquadRow,
    team_name: String,
    member_count: i64,
}

/// PostgreSQL implementation of SquadRepository
pub struct PostgresSquadRepository {
    pool: PgPool,
}

impl PostgresSquadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SquadRepository for PostgresSquadRepository {
    async fn save(&self, squad: &Squad) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO squads (id, name, team_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                team_id = EXCLUDED.team_id
            "#,
        )
        .bind(squad.id)
        .bind(&squad.name)
        .bind(squad.team_id)
        .bind(squad.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Squad>> {
        let row = sqlx::query_as::<_, SquadRow>(
            "SELECT id, name, team_id, created_at FROM squads WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Squad::from))
    }

    async fn list(&self, teams: Option<&[Uuid]>) -> RepositoryResult<Vec<SquadSummary>> {
        let rows = sqlx::query_as::<_, SquadSummaryRow>(
            r#"
            SELECT
                s.id, s.name, s.team_id, s.created_at,
                t.name AS team_name,
                (SELECT COUNT(*) FROM user_squads us WHERE us.squad_id = s.id) AS member_count
            FROM squads s
            JOIN teams t ON t.id = s.team_id
            WHERE $1::uuid[] IS NULL OR s.team_id = ANY($1)
            ORDER BY s.name
            "#,
        )
        .bind(teams.map(<[Uuid]>::to_vec))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| SquadSummary {
                squad: r.squad.into(),
                team_name: r.team_name,
                member_count: r.member_count,
            })
            .collect())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM squads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected(), "Squad")
    }

    async fn count(&self, teams: Option<&[Uuid]>) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM squads WHERE $1::uuid[] IS NULL OR team_id = ANY($1)",
        )
        .bind(teams.map(<[Uuid]>::to_vec))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
