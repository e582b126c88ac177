use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::ensure_affected;
use crate::domain::news::News;
use crate::domain::repositories::{NewsEntry, NewsRepository, RepositoryResult};

#[derive(sqlx::FromRow)]
struct NewsRow {
    id: Uuid,
    title: String,
    content: String,
    image_url: Option<String>,
    team_id: Option<Uuid>,
    squad_id: Option<Uuid>,
    author_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<NewsRow> for News {
    fn from(row: NewsRow) -> Self {
        News {
            id: row.id,
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            team_id: row.team_id,
            squad_id: row.squad_id,
            author_id: row.author_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct NewsEntryRow {
    #[sqlx(flatten)]
    news: NewsRow,
    team_name: Option<String>,
    author_name: String,
    author_avatar_url: Option<String>,
}

/// PostgreSQL implementation of NewsRepository
pub struct PostgresNewsRepository {
    pool: PgPool,
}

impl PostgresNewsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NewsRepository for PostgresNewsRepository {
    async fn save(&self, news: &News) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO news (id, title, content, image_url, team_id, squad_id, author_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                content = EXCLUDED.content,
                image_url = EXCLUDED.image_url,
                team_id = EXCLUDED.team_id,
                squad_id = EXCLUDED.squad_id
            "#,
        )
        .bind(news.id)
        .bind(&news.title)
        .bind(&news.content)
        .bind(&news.image_url)
        .bind(news.team_id)
        .bind(news.squad_id)
        .bind(news.author_id)
        .bind(news.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<News>> {
        let row = sqlx::query_as::<_, NewsRow>(
            r#"
            SELECT id, title, content, image_url, team_id, squad_id, author_id, created_at
            FROM news
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(News::from))
    }

    async fn list(&self, teams: Option<&[Uuid]>, limit: Option<i64>) -> RepositoryResult<Vec<NewsEntry>> {
        let rows = sqlx::query_as::<_, NewsEntryRow>(
            r#"
            SELECT
                n.id, n.title, n.content, n.image_url, n.team_id, n.squad_id,
                n.author_id, n.created_at,
                t.name AS team_name,
                p.name AS author_name,
                p.avatar_url AS author_avatar_url
            FROM news n
            JOIN profiles p ON p.id = n.author_id
            LEFT JOIN teams t ON t.id = n.team_id
            WHERE $1::uuid[] IS NULL OR n.team_id = ANY($1)
            ORDER BY n.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(teams.map(<[Uuid]>::to_vec))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| NewsEntry {
                news: r.news.into(),
                team_name: r.team_name,
                author_name: r.author_name,
                author_avatar_url: r.author_avatar_url,
            })
            .collect())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected(), "News")
    }

    async fn count(&self, teams: Option<&[Uuid]>) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM news WHERE $1::uuid[] IS NULL OR team_id = ANY($1)",
        )
        .bind(teams.map(<[Uuid]>::to_vec))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
