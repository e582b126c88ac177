// The signed-in user: profile, password, memberships and active team

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::teams::TeamResponse;
use crate::api::cookies::{CookieBuilder, ACTIVE_TEAM_COOKIE};
use crate::api::errors::ApiError;
use crate::api::middleware::Access;
use crate::api::state::AppState;
use crate::auth::password::{hash_password, validate_new_password, verify_password};
use crate::domain::roles::{SquadRole, TeamRole};
use crate::domain::user::{initials, Profile, ProfileDetails};

/// Team the user belongs to, with one flag per held role
#[derive(Debug, Serialize)]
pub struct MyTeam {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub team_color: Option<String>,
    pub is_president: bool,
    pub is_vice_president: bool,
    pub is_coordinator: bool,
    pub is_member: bool,
}

#[derive(Debug, Serialize)]
pub struct MySquad {
    pub id: Uuid,
    pub name: String,
    pub team_id: Uuid,
    pub team_name: String,
    pub role: SquadRole,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub profile: Profile,
    pub initials: String,
    pub is_admin: bool,
    pub can_invite: bool,
    pub teams: Vec<MyTeam>,
    pub squads: Vec<MySquad>,
    pub active_team: Option<TeamResponse>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ActiveTeamRequest {
    pub team_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ActiveTeamResponse {
    pub team: Option<TeamResponse>,
}

/// Teams of the viewer, one entry per team however many roles they hold
async fn my_team_list(state: &AppState, access: &Access) -> Result<Vec<MyTeam>, ApiError> {
    let summaries = state.teams.list().await?;

    let teams = summaries
        .iter()
        .filter(|s| access.ctx.is_member_of_team(s.team.id()))
        .map(|s| {
            let team = &s.team;
            let has = |role: TeamRole| access.ctx.team_roles(team.id()).any(|r| r == role);
            MyTeam {
                id: team.id(),
                name: team.name().to_string(),
                logo_url: team.logo_url().map(str::to_string),
                team_color: team.team_color().map(|c| c.as_str().to_string()),
                is_president: has(TeamRole::President),
                is_vice_president: has(TeamRole::VicePresident),
                is_coordinator: has(TeamRole::Coordinator),
                is_member: has(TeamRole::Member),
            }
        })
        .collect();

    Ok(teams)
}

async fn my_squad_list(state: &AppState, access: &Access) -> Result<Vec<MySquad>, ApiError> {
    if access.ctx.squads.is_empty() {
        return Ok(Vec::new());
    }

    let team_ids: Vec<Uuid> = access.ctx.squads.iter().map(|m| m.team_id).collect();
    let summaries = state.squads.list(Some(&team_ids)).await?;

    let squads = access
        .ctx
        .squads
        .iter()
        .filter_map(|m| {
            summaries
                .iter()
                .find(|s| s.squad.id == m.squad_id)
                .map(|s| MySquad {
                    id: s.squad.id,
                    name: s.squad.name.clone(),
                    team_id: s.squad.team_id,
                    team_name: s.team_name.clone(),
                    role: m.role,
                })
        })
        .collect();

    Ok(squads)
}

/// Current user with memberships and active team
///
/// GET /api/me
pub async fn get_me(
    State(state): State<AppState>,
    access: Access,
) -> Result<Json<MeResponse>, ApiError> {
    let teams = my_team_list(&state, &access).await?;
    let squads = my_squad_list(&state, &access).await?;

    Ok(Json(MeResponse {
        initials: initials(&access.profile.name),
        is_admin: access.ctx.is_admin,
        can_invite: access.ctx.can_invite_users(),
        active_team: access.active_team.as_ref().map(TeamResponse::from),
        teams,
        squads,
        profile: access.profile,
    }))
}

/// Update the viewer's own profile
///
/// PUT /api/me
pub async fn update_me(
    State(state): State<AppState>,
    access: Access,
    Json(details): Json<ProfileDetails>,
) -> Result<Json<Profile>, ApiError> {
    let mut profile = access.profile;
    profile.apply(details)?;
    state.users.update(&profile, None).await?;

    tracing::info!(user_id = %profile.id, "Profile updated");
    Ok(Json(profile))
}

/// Change the viewer's password
///
/// PUT /api/me/password
pub async fn change_password(
    State(state): State<AppState>,
    access: Access,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    validate_new_password(&req.new_password, Some(&req.confirm_password))?;

    let account = state
        .users
        .find_account_by_id(access.user_id())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !verify_password(&req.current_password, &account.password_hash)? {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    let hash = hash_password(&req.new_password)?;
    state.users.update_password(access.user_id(), &hash).await?;

    tracing::info!(user_id = %access.user_id(), "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/me/teams
pub async fn my_teams(
    State(state): State<AppState>,
    access: Access,
) -> Result<Json<Vec<MyTeam>>, ApiError> {
    Ok(Json(my_team_list(&state, &access).await?))
}

/// GET /api/me/squads
pub async fn my_squads(
    State(state): State<AppState>,
    access: Access,
) -> Result<Json<Vec<MySquad>>, ApiError> {
    Ok(Json(my_squad_list(&state, &access).await?))
}

/// GET /api/me/active-team
pub async fn get_active_team(access: Access) -> Json<ActiveTeamResponse> {
    Json(ActiveTeamResponse {
        team: access.active_team.as_ref().map(TeamResponse::from),
    })
}

/// Select the active team and remember it in a cookie
///
/// PUT /api/me/active-team
pub async fn set_active_team(
    State(state): State<AppState>,
    access: Access,
    jar: CookieJar,
    Json(req): Json<ActiveTeamRequest>,
) -> Result<(CookieJar, Json<ActiveTeamResponse>), ApiError> {
    let team = state
        .teams
        .find_by_id(req.team_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Team not found: {}", req.team_id)))?;

    access.ensure(
        access.ctx.can_activate_team(team.id()),
        "You are not a member of this team",
    )?;

    let cookie = CookieBuilder::from_config(&state.config).active_team(team.id());
    tracing::debug!(user_id = %access.user_id(), team_id = %team.id(), "Active team selected");

    Ok((
        jar.add(cookie),
        Json(ActiveTeamResponse {
            team: Some(TeamResponse::from(&team)),
        }),
    ))
}

/// Forget the active team
///
/// DELETE /api/me/active-team
pub async fn clear_active_team(
    State(state): State<AppState>,
    _access: Access,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    let cookie = CookieBuilder::from_config(&state.config).expired(ACTIVE_TEAM_COOKIE);
    (jar.add(cookie), StatusCode::NO_CONTENT)
}
