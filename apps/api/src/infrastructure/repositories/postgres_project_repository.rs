use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::ensure_affected;
use crate::domain::project::Project;
use crate::domain::repositories::{
    ProjectEntry, ProjectMember, ProjectRepository, RepositoryResult,
};

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    description: String,
    image_url: Option<String>,
    team_id: Option<Uuid>,
    squad_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            team_id: row.team_id,
            squad_id: row.squad_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProjectEntryRow {
    #[sqlx(flatten)]
    project: ProjectRow,
    team_name: Option<String>,
    member_count: i64,
}

/// PostgreSQL implementation of ProjectRepository
///
/// Project members are kept in `user_projects`.
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn save(&self, project: &Project, member_ids: &[Uuid]) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO projects (id, name, description, image_url, team_id, squad_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                image_url = EXCLUDED.image_url,
                team_id = EXCLUDED.team_id,
                squad_id = EXCLUDED.squad_id
            "#,
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.image_url)
        .bind(project.team_id)
        .bind(project.squad_id)
        .bind(project.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM user_projects WHERE project_id = $1")
            .bind(project.id)
            .execute(&mut *tx)
            .await?;

        if !member_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO user_projects (project_id, user_id)
                SELECT $1, UNNEST($2::uuid[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(project.id)
            .bind(member_ids.to_vec())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, image_url, team_id, squad_id, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Project::from))
    }

    async fn members(&self, project_id: Uuid) -> RepositoryResult<Vec<ProjectMember>> {
        let rows = sqlx::query_as::<_, (Uuid, String, bool)>(
            r#"
            SELECT p.id, p.name, p.is_admin
            FROM user_projects up
            JOIN profiles p ON p.id = up.user_id
            WHERE up.project_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, is_admin)| ProjectMember { id, name, is_admin })
            .collect())
    }

    async fn list(&self, teams: Option<&[Uuid]>) -> RepositoryResult<Vec<ProjectEntry>> {
        let rows = sqlx::query_as::<_, ProjectEntryRow>(
            r#"
            SELECT
                pr.id, pr.name, pr.description, pr.image_url, pr.team_id,
                pr.squad_id, pr.created_at,
                t.name AS team_name,
                (SELECT COUNT(*) FROM user_projects up WHERE up.project_id = pr.id) AS member_count
            FROM projects pr
            LEFT JOIN teams t ON t.id = pr.team_id
            WHERE $1::uuid[] IS NULL OR pr.team_id = ANY($1)
            ORDER BY pr.created_at DESC
            "#,
        )
        .bind(teams.map(<[Uuid]>::to_vec))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProjectEntry {
                project: r.project.into(),
                team_name: r.team_name,
                member_count: r.member_count,
            })
            .collect())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected(), "Project")
    }

    async fn count(&self, teams: Option<&[Uuid]>) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM projects WHERE $1::uuid[] IS NULL OR team_id = ANY($1)",
        )
        .bind(teams.map(<[Uuid]>::to_vec))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
