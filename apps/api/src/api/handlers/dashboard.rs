use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::Access;
use crate::api::state::AppState;

/// Number of news posts shown on the dashboard
const RECENT_NEWS_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct DashboardCounts {
    pub users: i64,
    pub news: i64,
    pub projects: i64,
    pub squads: i64,
    pub teams: i64,
}

#[derive(Debug, Serialize)]
pub struct TeamStats {
    pub id: Uuid,
    pub name: String,
    pub squad_count: i64,
    pub member_count: i64,
}

#[derive(Debug, Serialize)]
pub struct RecentNews {
    pub id: Uuid,
    pub title: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub counts: DashboardCounts,
    pub teams: Vec<TeamStats>,
    pub recent_news: Vec<RecentNews>,
}

/// Counters and recent activity for the teams in scope
///
/// GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    access: Access,
) -> Result<Json<Dashboard>, ApiError> {
    let scope = access.content_scope();
    let filter = scope.team_filter();

    let teams: Vec<TeamStats> = state
        .teams
        .list()
        .await?
        .into_iter()
        .filter(|s| scope.includes(Some(s.team.id())))
        .map(|s| TeamStats {
            id: s.team.id(),
            name: s.team.name().to_string(),
            squad_count: s.squad_count,
            member_count: s.member_count,
        })
        .collect();

    let counts = DashboardCounts {
        users: state.users.count().await?,
        news: state.news.count(filter).await?,
        projects: state.projects.count(filter).await?,
        squads: state.squads.count(filter).await?,
        teams: teams.len() as i64,
    };

    let recent_news = state
        .news
        .list(filter, Some(RECENT_NEWS_LIMIT))
        .await?
        .into_iter()
        .map(|e| RecentNews {
            id: e.news.id,
            title: e.news.title,
            author_name: e.author_name,
            created_at: e.news.created_at,
        })
        .collect();

    Ok(Json(Dashboard {
        counts,
        teams,
        recent_news,
    }))
}
