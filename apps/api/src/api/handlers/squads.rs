use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profiles_by_id;
use crate::api::errors::ApiError;
use crate::api::middleware::Access;
use crate::api::state::AppState;
use crate::domain::repositories::SquadSummary;
use crate::domain::roles::SquadRole;
use crate::domain::squad::Squad;
use crate::domain::user::initials;

#[derive(Debug, Serialize)]
pub struct SquadResponse {
    pub id: Uuid,
    pub name: String,
    pub team_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Squad> for SquadResponse {
    fn from(squad: &Squad) -> Self {
        Self {
            id: squad.id,
            name: squad.name.clone(),
            team_id: squad.team_id,
            created_at: squad.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SquadListItem {
    #[serde(flatten)]
    pub squad: SquadResponse,
    pub team_name: String,
    pub member_count: i64,
    pub can_manage: bool,
}

#[derive(Debug, Serialize)]
pub struct SquadMember {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub initials: String,
    pub role: SquadRole,
}

#[derive(Debug, Serialize)]
pub struct SquadDetail {
    #[serde(flatten)]
    pub squad: SquadResponse,
    pub team_name: String,
    pub members: Vec<SquadMember>,
    pub can_manage: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateSquadRequest {
    pub name: String,
    pub team_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSquadRequest {
    pub name: String,
}

async fn find_squad(state: &AppState, id: Uuid) -> Result<Squad, ApiError> {
    state
        .squads
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Squad not found: {}", id)))
}

/// List squads of the active team (all squads for admins)
///
/// GET /api/squads
pub async fn list_squads(
    State(state): State<AppState>,
    access: Access,
) -> Result<Json<Vec<SquadListItem>>, ApiError> {
    access.ensure(access.ctx.can_invite_users(), "You do not have permission to view squads")?;

    let squads: Vec<SquadSummary> = if access.is_admin() {
        state.squads.list(None).await?
    } else {
        let team_id = access.require_active_team()?.id();
        state.squads.list(Some(std::slice::from_ref(&team_id))).await?
    };

    let items = squads
        .into_iter()
        .map(|s| SquadListItem {
            can_manage: access.ctx.can_manage_squad(&s.squad),
            squad: SquadResponse::from(&s.squad),
            team_name: s.team_name,
            member_count: s.member_count,
        })
        .collect();

    Ok(Json(items))
}

/// Create a squad inside a team
///
/// POST /api/squads
pub async fn create_squad(
    State(state): State<AppState>,
    access: Access,
    Json(req): Json<CreateSquadRequest>,
) -> Result<(StatusCode, Json<SquadResponse>), ApiError> {
    access.ensure(
        access.ctx.is_team_staff(req.team_id),
        "Only team staff can create squads",
    )?;

    state
        .teams
        .find_by_id(req.team_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Team not found: {}", req.team_id)))?;

    let squad = Squad::new(req.name, req.team_id)?;
    state.squads.save(&squad).await?;

    tracing::info!(squad_id = %squad.id, team_id = %squad.team_id, "Squad created");
    Ok((StatusCode::CREATED, Json(SquadResponse::from(&squad))))
}

/// Squad with its members
///
/// GET /api/squads/:id
pub async fn get_squad(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<Json<SquadDetail>, ApiError> {
    let squad = find_squad(&state, id).await?;
    access.ensure(
        access.ctx.can_view_team(squad.team_id),
        "You are not a member of this team",
    )?;

    let team_name = state
        .teams
        .find_by_id(squad.team_id)
        .await?
        .map(|t| t.name().to_string())
        .unwrap_or_default();

    let seats = state.memberships.squad_members(id).await?;
    let profiles = profiles_by_id(&state, seats.iter().map(|m| m.user_id)).await?;

    let mut members: Vec<SquadMember> = seats
        .iter()
        .filter_map(|m| {
            profiles.get(&m.user_id).map(|p| SquadMember {
                id: p.id,
                name: p.name.clone(),
                avatar_url: p.avatar_url.clone(),
                initials: initials(&p.name),
                role: m.role,
            })
        })
        .collect();
    members.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(SquadDetail {
        can_manage: access.ctx.can_manage_squad(&squad),
        squad: SquadResponse::from(&squad),
        team_name,
        members,
    }))
}

/// Rename a squad
///
/// PUT /api/squads/:id
pub async fn update_squad(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSquadRequest>,
) -> Result<Json<SquadResponse>, ApiError> {
    let mut squad = find_squad(&state, id).await?;
    access.ensure(
        access.ctx.can_manage_squad(&squad),
        "You do not have permission to edit this squad",
    )?;

    squad.rename(req.name)?;
    state.squads.save(&squad).await?;

    Ok(Json(SquadResponse::from(&squad)))
}

/// Delete a squad
///
/// DELETE /api/squads/:id
pub async fn delete_squad(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let squad = find_squad(&state, id).await?;
    access.ensure(
        access.ctx.is_team_staff(squad.team_id),
        "Only team staff can delete squads",
    )?;

    state.squads.delete(id).await?;

    tracing::info!(squad_id = %id, "Squad deleted");
    Ok(StatusCode::NO_CONTENT)
}
