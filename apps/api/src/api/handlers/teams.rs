use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::{profiles_by_id, PersonRef};
use crate::api::errors::ApiError;
use crate::api::middleware::Access;
use crate::api::state::AppState;
use crate::domain::membership::TeamMembership;
use crate::domain::roles::TeamRole;
use crate::domain::team::{Leadership, Team, TeamDetails, TeamEvent};
use crate::domain::user::initials;

/// Team as returned by the API
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub banner_url: Option<String>,
    pub logo_url: Option<String>,
    pub team_color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id(),
            name: team.name().to_string(),
            description: team.description().map(str::to_string),
            banner_url: team.banner_url().map(str::to_string),
            logo_url: team.logo_url().map(str::to_string),
            team_color: team.team_color().map(|c| c.as_str().to_string()),
            created_at: team.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamListItem {
    #[serde(flatten)]
    pub team: TeamResponse,
    pub president: Option<PersonRef>,
    pub squad_count: i64,
    pub member_count: i64,
}

/// Request body for creating a team
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    #[serde(flatten)]
    pub details: TeamDetails,
    pub president_id: Option<Uuid>,
    pub vice_president_id: Option<Uuid>,
}

/// Request body for updating a team
///
/// The leadership is only touched when its keys are present; `null`
/// vacates a seat.
#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    #[serde(flatten)]
    pub details: TeamDetails,
    #[serde(default, deserialize_with = "present")]
    pub president_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "present")]
    pub vice_president_id: Option<Option<Uuid>>,
}

/// Distinguishes a key set to `null` from a missing key
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct StaffRequest {
    pub president_id: Option<Uuid>,
    pub vice_president_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CoordinatorRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct StaffResponse {
    pub president: Option<PersonRef>,
    pub vice_president: Option<PersonRef>,
    pub coordinators: Vec<PersonRef>,
}

#[derive(Debug, Serialize)]
pub struct MemberSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub initials: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SquadOverview {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<MemberSummary>,
}

#[derive(Debug, Serialize)]
pub struct TeamOverview {
    pub team: TeamResponse,
    pub squads: Vec<SquadOverview>,
    pub members: Vec<MemberSummary>,
}

async fn find_team(state: &AppState, id: Uuid) -> Result<Team, ApiError> {
    state
        .teams
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Team not found: {}", id)))
}

/// List all teams
///
/// GET /api/teams
pub async fn list_teams(
    State(state): State<AppState>,
    access: Access,
) -> Result<Json<Vec<TeamListItem>>, ApiError> {
    access.ensure(access.ctx.can_invite_users(), "You do not have permission to view teams")?;

    let summaries = state.teams.list().await?;
    let presidents = profiles_by_id(&state, summaries.iter().filter_map(|s| s.president_id)).await?;

    let items = summaries
        .iter()
        .map(|s| TeamListItem {
            team: TeamResponse::from(&s.team),
            president: s
                .president_id
                .and_then(|id| presidents.get(&id))
                .map(PersonRef::from),
            squad_count: s.squad_count,
            member_count: s.member_count,
        })
        .collect();

    Ok(Json(items))
}

/// Create a new team, optionally seating its president and vice president
///
/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    access: Access,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    access.ensure(access.ctx.can_invite_users(), "You do not have permission to create teams")?;

    let leadership = Leadership::new(req.president_id, req.vice_president_id)?;
    let (team, events) = Team::new(req.details)?;

    state.teams.create(&team, &leadership).await?;

    events.iter().for_each(TeamEvent::record);
    if !leadership.is_vacant() {
        TeamEvent::LeadershipChanged {
            team_id: team.id(),
            president_id: leadership.president_id,
            vice_president_id: leadership.vice_president_id,
        }
        .record();
    }

    Ok((StatusCode::CREATED, Json(TeamResponse::from(&team))))
}

/// Get a team by ID
///
/// GET /api/teams/:id
pub async fn get_team(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = find_team(&state, id).await?;
    access.ensure(access.ctx.can_view_team(id), "You are not a member of this team")?;

    Ok(Json(TeamResponse::from(&team)))
}

/// Update a team
///
/// PUT /api/teams/:id
pub async fn update_team(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    access.ensure(access.ctx.is_team_staff(id), "Only team staff can edit this team")?;

    let mut team = find_team(&state, id).await?;
    let event = team.update(req.details)?;

    let leadership = if req.president_id.is_some() || req.vice_president_id.is_some() {
        let current = state.teams.leadership(id).await?;
        Some(Leadership::new(
            req.president_id.unwrap_or(current.president_id),
            req.vice_president_id.unwrap_or(current.vice_president_id),
        )?)
    } else {
        None
    };

    state.teams.update(&team, leadership.as_ref()).await?;
    event.record();
    if let Some(leadership) = leadership {
        leadership_changed(id, &leadership);
    }

    Ok(Json(TeamResponse::from(&team)))
}

fn leadership_changed(team_id: Uuid, leadership: &Leadership) {
    TeamEvent::LeadershipChanged {
        team_id,
        president_id: leadership.president_id,
        vice_president_id: leadership.vice_president_id,
    }
    .record();
}

/// Delete a team together with its squads and memberships
///
/// DELETE /api/teams/:id
pub async fn delete_team(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access.ensure(access.is_admin(), "Only admins can delete teams")?;

    state.teams.delete(id).await?;
    TeamEvent::Deleted { team_id: id }.record();

    Ok(StatusCode::NO_CONTENT)
}

/// Team page: squads with their members and the team roster
///
/// GET /api/teams/:id/overview
pub async fn team_overview(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamOverview>, ApiError> {
    let team = find_team(&state, id).await?;
    access.ensure(access.ctx.can_view_team(id), "You are not a member of this team")?;

    let squads = state.squads.list(Some(std::slice::from_ref(&id))).await?;
    let mut squad_members = Vec::with_capacity(squads.len());
    for summary in &squads {
        squad_members.push(state.memberships.squad_members(summary.squad.id).await?);
    }
    let team_members = state.memberships.team_members(id).await?;

    let profiles = profiles_by_id(
        &state,
        team_members
            .iter()
            .map(|m| m.user_id)
            .chain(squad_members.iter().flatten().map(|m| m.user_id)),
    )
    .await?;

    let member = |user_id: Uuid, roles: Vec<String>| {
        profiles.get(&user_id).map(|p| MemberSummary {
            id: p.id,
            name: p.name.clone(),
            avatar_url: p.avatar_url.clone(),
            initials: initials(&p.name),
            roles,
        })
    };

    let squads = squads
        .iter()
        .zip(&squad_members)
        .map(|(summary, members)| SquadOverview {
            id: summary.squad.id,
            name: summary.squad.name.clone(),
            members: members
                .iter()
                .filter_map(|m| member(m.user_id, vec![m.role.to_string()]))
                .collect(),
        })
        .collect();

    let members = roles_by_user(&team_members)
        .into_iter()
        .filter_map(|(user_id, roles)| member(user_id, roles.iter().map(TeamRole::label).collect()))
        .collect();

    Ok(Json(TeamOverview {
        team: TeamResponse::from(&team),
        squads,
        members,
    }))
}

/// Groups team seats by user, roles in seniority order
fn roles_by_user(memberships: &[TeamMembership]) -> BTreeMap<Uuid, Vec<TeamRole>> {
    let mut roles: BTreeMap<Uuid, Vec<TeamRole>> = BTreeMap::new();
    for m in memberships {
        let entry = roles.entry(m.user_id).or_default();
        if !entry.contains(&m.role) {
            entry.push(m.role);
        }
    }
    for entry in roles.values_mut() {
        entry.sort_by_key(|r| *r as u8);
    }
    roles
}

async fn load_staff(state: &AppState, team_id: Uuid) -> Result<StaffResponse, ApiError> {
    let leadership = state.teams.leadership(team_id).await?;
    let coordinator_ids: Vec<Uuid> = state
        .memberships
        .team_members(team_id)
        .await?
        .into_iter()
        .filter(|m| m.role == TeamRole::Coordinator)
        .map(|m| m.user_id)
        .collect();

    let profiles = profiles_by_id(
        state,
        leadership
            .president_id
            .into_iter()
            .chain(leadership.vice_president_id)
            .chain(coordinator_ids.iter().copied()),
    )
    .await?;

    let person = |id: Uuid| profiles.get(&id).map(PersonRef::from);

    Ok(StaffResponse {
        president: leadership.president_id.and_then(person),
        vice_president: leadership.vice_president_id.and_then(person),
        coordinators: coordinator_ids.into_iter().filter_map(person).collect(),
    })
}

/// President, vice president and coordinators of a team
///
/// GET /api/teams/:id/staff
pub async fn get_staff(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<Json<StaffResponse>, ApiError> {
    access.ensure(access.ctx.is_team_staff(id), "Only team staff can manage the staff")?;
    find_team(&state, id).await?;

    Ok(Json(load_staff(&state, id).await?))
}

/// Replace president and vice president
///
/// PUT /api/teams/:id/staff
pub async fn update_staff(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
    Json(req): Json<StaffRequest>,
) -> Result<Json<StaffResponse>, ApiError> {
    access.ensure(access.ctx.is_team_staff(id), "Only team staff can manage the staff")?;
    find_team(&state, id).await?;

    let leadership = Leadership::new(req.president_id, req.vice_president_id)?;
    state.teams.replace_leadership(id, &leadership).await?;
    leadership_changed(id, &leadership);

    Ok(Json(load_staff(&state, id).await?))
}

/// Add a coordinator to the team
///
/// POST /api/teams/:id/coordinators
pub async fn add_coordinator(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
    Json(req): Json<CoordinatorRequest>,
) -> Result<(StatusCode, Json<StaffResponse>), ApiError> {
    access.ensure(access.ctx.is_team_staff(id), "Only team staff can manage the staff")?;
    find_team(&state, id).await?;

    state
        .users
        .find_by_id(req.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let already_staff = state
        .memberships
        .team_members(id)
        .await?
        .iter()
        .any(|m| m.user_id == req.user_id && m.role != TeamRole::Member);
    if already_staff {
        return Err(ApiError::conflict("User is already part of the team staff"));
    }

    state
        .memberships
        .add_team_role(&TeamMembership {
            user_id: req.user_id,
            team_id: id,
            role: TeamRole::Coordinator,
        })
        .await?;
    TeamEvent::CoordinatorAdded {
        team_id: id,
        user_id: req.user_id,
    }
    .record();

    Ok((StatusCode::CREATED, Json(load_staff(&state, id).await?)))
}

/// Remove a coordinator from the team
///
/// DELETE /api/teams/:id/coordinators/:user_id
pub async fn remove_coordinator(
    State(state): State<AppState>,
    access: Access,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    access.ensure(access.ctx.is_team_staff(id), "Only team staff can manage the staff")?;

    state
        .memberships
        .remove_team_role(id, user_id, TeamRole::Coordinator)
        .await?;
    TeamEvent::CoordinatorRemoved { team_id: id, user_id }.record();

    Ok(StatusCode::NO_CONTENT)
}
