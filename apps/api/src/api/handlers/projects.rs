use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{profiles_by_id, publication_target, remove_image};
use crate::api::errors::ApiError;
use crate::api::middleware::Access;
use crate::api::state::AppState;
use crate::domain::project::{Project, ProjectDetails};
use crate::domain::repositories::ProjectMember;

#[derive(Debug, Serialize)]
pub struct ProjectListItem {
    #[serde(flatten)]
    pub project: Project,
    pub team_name: Option<String>,
    pub member_count: i64,
    pub can_manage: bool,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<ProjectMember>,
    pub can_manage: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    pub team_id: Option<Uuid>,
    pub squad_id: Option<Uuid>,
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

async fn find_visible(state: &AppState, access: &Access, id: Uuid) -> Result<Project, ApiError> {
    state
        .projects
        .find_by_id(id)
        .await?
        .filter(|p| access.content_scope().includes(p.team_id))
        .ok_or_else(|| ApiError::not_found(format!("Project not found: {}", id)))
}

/// Drops duplicates and ids that do not belong to a user
async fn existing_members(state: &AppState, ids: &[Uuid]) -> Result<Vec<Uuid>, ApiError> {
    let profiles = profiles_by_id(state, ids.iter().copied()).await?;
    if profiles.len() != ids.iter().collect::<std::collections::HashSet<_>>().len() {
        return Err(ApiError::bad_request("Unknown project member"));
    }
    let mut members: Vec<Uuid> = profiles.into_keys().collect();
    members.sort_unstable();
    Ok(members)
}

async fn detail(state: &AppState, access: &Access, project: Project) -> Result<ProjectDetail, ApiError> {
    let members = state.projects.members(project.id).await?;
    Ok(ProjectDetail {
        can_manage: access.ctx.can_manage_content(project.team_id, None),
        project,
        members,
    })
}

/// Projects of the active team (everything for admins), newest first
///
/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    access: Access,
) -> Result<Json<Vec<ProjectListItem>>, ApiError> {
    let scope = access.content_scope();
    let entries = state.projects.list(scope.team_filter()).await?;

    let items = entries
        .into_iter()
        .map(|e| ProjectListItem {
            can_manage: access.ctx.can_manage_content(e.project.team_id, None),
            project: e.project,
            team_name: e.team_name,
            member_count: e.member_count,
        })
        .collect();

    Ok(Json(items))
}

/// Create a project
///
/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    access: Access,
    Json(req): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<ProjectDetail>), ApiError> {
    let (team_id, squad_id) = publication_target(&state, &access, req.team_id, req.squad_id).await?;
    let members = existing_members(&state, &req.member_ids).await?;

    let project = Project::new(ProjectDetails {
        name: req.name,
        description: req.description,
        image_url: req.image_url,
        team_id,
        squad_id,
    })?;
    state.projects.save(&project, &members).await?;

    tracing::info!(project_id = %project.id, members = members.len(), "Project created");
    Ok((StatusCode::CREATED, Json(detail(&state, &access, project).await?)))
}

/// Project with its members
///
/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let project = find_visible(&state, &access, id).await?;
    Ok(Json(detail(&state, &access, project).await?))
}

/// Edit a project and replace its members
///
/// PUT /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
    Json(req): Json<ProjectRequest>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let mut project = find_visible(&state, &access, id).await?;
    access.ensure(
        access.ctx.can_manage_content(project.team_id, None),
        "You do not have permission to edit this project",
    )?;

    let (team_id, squad_id) = publication_target(
        &state,
        &access,
        req.team_id.or(project.team_id),
        req.squad_id,
    )
    .await?;
    let members = existing_members(&state, &req.member_ids).await?;

    let previous_image = project.image_url.clone();
    project.apply(ProjectDetails {
        name: req.name,
        description: req.description,
        image_url: req.image_url,
        team_id,
        squad_id,
    })?;
    state.projects.save(&project, &members).await?;

    if let Some(old) = previous_image.filter(|old| project.image_url.as_ref() != Some(old)) {
        remove_image(&state, &old).await;
    }

    Ok(Json(detail(&state, &access, project).await?))
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let project = find_visible(&state, &access, id).await?;
    access.ensure(
        access.ctx.can_manage_content(project.team_id, None),
        "You do not have permission to delete this project",
    )?;

    state.projects.delete(id).await?;
    if let Some(url) = &project.image_url {
        remove_image(&state, url).await;
    }

    tracing::info!(project_id = %id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}
