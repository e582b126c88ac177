use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{publication_target, remove_image};
use crate::api::errors::ApiError;
use crate::api::middleware::Access;
use crate::api::state::AppState;
use crate::domain::news::{News, NewsDetails};
use crate::domain::repositories::NewsEntry;

#[derive(Debug, Serialize)]
pub struct NewsTeam {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct NewsAuthor {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewsItem {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub squad_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub team: Option<NewsTeam>,
    pub author: NewsAuthor,
    pub can_manage: bool,
}

impl NewsItem {
    pub(crate) fn from_entry(entry: NewsEntry, access: &Access) -> Self {
        let news = entry.news;
        Self {
            can_manage: access
                .ctx
                .can_manage_content(news.team_id, Some(news.author_id)),
            team: news
                .team_id
                .zip(entry.team_name)
                .map(|(id, name)| NewsTeam { id, name }),
            author: NewsAuthor {
                id: news.author_id,
                name: entry.author_name,
                avatar_url: entry.author_avatar_url,
            },
            id: news.id,
            title: news.title,
            content: news.content,
            image_url: news.image_url,
            squad_id: news.squad_id,
            created_at: news.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewsRequest {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub team_id: Option<Uuid>,
    pub squad_id: Option<Uuid>,
}

/// Loads a news post the viewer is allowed to see
///
/// Posts outside the viewer's scope are reported as missing.
async fn find_visible(state: &AppState, access: &Access, id: Uuid) -> Result<News, ApiError> {
    state
        .news
        .find_by_id(id)
        .await?
        .filter(|n| access.content_scope().includes(n.team_id))
        .ok_or_else(|| ApiError::not_found(format!("News not found: {}", id)))
}

/// News of the active team (everything for admins), newest first
///
/// GET /api/news
pub async fn list_news(
    State(state): State<AppState>,
    access: Access,
) -> Result<Json<Vec<NewsItem>>, ApiError> {
    let scope = access.content_scope();
    let entries = state.news.list(scope.team_filter(), None).await?;

    Ok(Json(
        entries
            .into_iter()
            .map(|e| NewsItem::from_entry(e, &access))
            .collect(),
    ))
}

/// Publish a news post
///
/// POST /api/news
pub async fn create_news(
    State(state): State<AppState>,
    access: Access,
    Json(req): Json<NewsRequest>,
) -> Result<(StatusCode, Json<News>), ApiError> {
    let (team_id, squad_id) = publication_target(&state, &access, req.team_id, req.squad_id).await?;

    let news = News::new(
        NewsDetails {
            title: req.title,
            content: req.content,
            image_url: req.image_url,
            team_id,
            squad_id,
        },
        access.user_id(),
    )?;
    state.news.save(&news).await?;

    tracing::info!(news_id = %news.id, author_id = %news.author_id, "News published");
    Ok((StatusCode::CREATED, Json(news)))
}

/// GET /api/news/:id
pub async fn get_news(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<Json<News>, ApiError> {
    Ok(Json(find_visible(&state, &access, id).await?))
}

/// Edit a news post
///
/// PUT /api/news/:id
pub async fn update_news(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
    Json(req): Json<NewsRequest>,
) -> Result<Json<News>, ApiError> {
    let mut news = find_visible(&state, &access, id).await?;
    access.ensure(
        access.ctx.can_manage_content(news.team_id, Some(news.author_id)),
        "You do not have permission to edit this news",
    )?;

    let (team_id, squad_id) = publication_target(
        &state,
        &access,
        req.team_id.or(news.team_id),
        req.squad_id,
    )
    .await?;

    let previous_image = news.image_url.clone();
    news.apply(NewsDetails {
        title: req.title,
        content: req.content,
        image_url: req.image_url,
        team_id,
        squad_id,
    })?;
    state.news.save(&news).await?;

    if let Some(old) = previous_image.filter(|old| news.image_url.as_ref() != Some(old)) {
        remove_image(&state, &old).await;
    }

    Ok(Json(news))
}

/// Delete a news post and its stored image
///
/// DELETE /api/news/:id
pub async fn delete_news(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let news = find_visible(&state, &access, id).await?;
    access.ensure(
        access.ctx.can_manage_content(news.team_id, Some(news.author_id)),
        "You do not have permission to delete this news",
    )?;

    state.news.delete(id).await?;
    if let Some(url) = &news.image_url {
        remove_image(&state, url).await;
    }

    tracing::info!(news_id = %id, "News deleted");
    Ok(StatusCode::NO_CONTENT)
}
