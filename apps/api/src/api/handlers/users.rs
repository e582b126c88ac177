use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::Access;
use crate::api::state::AppState;
use crate::auth::password::{hash_password, validate_new_password};
use crate::domain::membership::{
    MembershipPlan, SquadAssignment, SquadMembership, TeamAssignment, TeamMembership,
};
use crate::domain::permissions::EditTarget;
use crate::domain::repositories::UserAccount;
use crate::domain::user::{first_last_name, initials, Email, Profile};

/// Placeholder shown when a user holds no role at all
const NO_ROLE: &str = "—";

#[derive(Debug, Clone, Serialize)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct UserListItem {
    pub id: Uuid,
    pub name: String,
    /// First and last name for compact listings
    pub short_name: String,
    pub email: String,
    pub is_admin: bool,
    pub avatar_url: Option<String>,
    pub initials: String,
    pub team: Option<NamedRef>,
    pub squad: Option<NamedRef>,
    pub role: String,
    pub can_edit: bool,
}

#[derive(Debug, Serialize)]
pub struct SelectableSquad {
    pub id: Uuid,
    pub name: String,
    pub team_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub profile: Profile,
    pub teams: Vec<TeamMembership>,
    pub squads: Vec<SquadMembership>,
    pub selectable_teams: Vec<NamedRef>,
    pub selectable_squads: Vec<SelectableSquad>,
    pub can_change_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub teams: Vec<TeamAssignment>,
    #[serde(default)]
    pub squads: Vec<SquadAssignment>,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub id: Uuid,
}

/// Request body for editing a user
///
/// Membership lists replace the current ones when present.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub is_admin: Option<bool>,
    pub teams: Option<Vec<TeamAssignment>>,
    pub squads: Option<Vec<SquadAssignment>>,
}

/// Role shown in listings: squad role first, then team role
fn display_role(teams: &[&TeamMembership], squads: &[&SquadMembership]) -> String {
    if let Some(seat) = squads.first() {
        return seat.role.to_string();
    }
    if let Some(seat) = teams.first() {
        return seat.role.label();
    }
    NO_ROLE.to_string()
}

async fn find_user(state: &AppState, id: Uuid) -> Result<Profile, ApiError> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User not found: {}", id)))
}

async fn ensure_can_edit(
    state: &AppState,
    access: &Access,
    user_id: Uuid,
) -> Result<(Vec<TeamMembership>, Vec<SquadMembership>), ApiError> {
    let teams = state.memberships.teams_for_user(user_id).await?;
    let squads = state.memberships.squads_for_user(user_id).await?;

    let target = EditTarget {
        user_id,
        teams: &teams,
        squads: &squads,
    };
    access.ensure(
        access.ctx.can_edit_user(target, access.active_team_id()),
        "You do not have permission to edit this user",
    )?;

    Ok((teams, squads))
}

/// All users with their first team, first squad and display role
///
/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    access: Access,
) -> Result<Json<Vec<UserListItem>>, ApiError> {
    access.ensure(access.ctx.can_invite_users(), "You do not have permission to view users")?;

    let profiles = state.users.list().await?;
    let team_seats = state.memberships.all_team_memberships().await?;
    let squad_seats = state.memberships.all_squad_memberships().await?;
    let teams = state.teams.list().await?;
    let squads = state.squads.list(None).await?;

    let team_ref = |id: Uuid| {
        teams.iter().find(|t| t.team.id() == id).map(|t| NamedRef {
            id,
            name: t.team.name().to_string(),
        })
    };
    let squad_ref = |id: Uuid| {
        squads.iter().find(|s| s.squad.id == id).map(|s| NamedRef {
            id,
            name: s.squad.name.clone(),
        })
    };

    let items = profiles
        .into_iter()
        .map(|p| {
            let user_teams: Vec<&TeamMembership> =
                team_seats.iter().filter(|m| m.user_id == p.id).collect();
            let user_squads: Vec<&SquadMembership> =
                squad_seats.iter().filter(|m| m.user_id == p.id).collect();

            let owned_teams: Vec<TeamMembership> = user_teams.iter().map(|m| **m).collect();
            let owned_squads: Vec<SquadMembership> = user_squads.iter().map(|m| **m).collect();
            let can_edit = access.ctx.can_edit_user(
                EditTarget {
                    user_id: p.id,
                    teams: &owned_teams,
                    squads: &owned_squads,
                },
                access.active_team_id(),
            );

            UserListItem {
                initials: initials(&p.name),
                short_name: first_last_name(&p.name),
                team: user_teams.first().and_then(|m| team_ref(m.team_id)),
                squad: user_squads.first().and_then(|m| squad_ref(m.squad_id)),
                role: display_role(&user_teams, &user_squads),
                can_edit,
                id: p.id,
                email: p.email.to_string(),
                is_admin: p.is_admin,
                avatar_url: p.avatar_url,
                name: p.name,
            }
        })
        .collect();

    Ok(Json(items))
}

/// Create a user directly, bypassing invitations
///
/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    access: Access,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    access.ensure(access.is_admin(), "Only admins can create users")?;

    validate_new_password(&req.password, None)?;
    let email = Email::new(&req.email)?;
    if state.users.find_account_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let account = UserAccount {
        profile: Profile::new(req.name, email, req.is_admin)?,
        password_hash: hash_password(&req.password)?,
    };
    let memberships = MembershipPlan {
        teams: req.teams,
        squads: req.squads,
    }
    .deduplicated();

    state.users.create(&account, &memberships, None).await?;

    tracing::info!(user_id = %account.profile.id, created_by = %access.user_id(), "User created");
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            id: account.profile.id,
        }),
    ))
}

/// User with memberships and the seats the viewer may hand out
///
/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDetail>, ApiError> {
    let profile = find_user(&state, id).await?;
    let (teams, squads) = ensure_can_edit(&state, &access, id).await?;

    let team_filter = if access.is_admin() {
        None
    } else {
        Some(access.active_team_id().into_iter().collect::<Vec<_>>())
    };

    let selectable_teams = state
        .teams
        .list()
        .await?
        .into_iter()
        .filter(|s| {
            team_filter
                .as_ref()
                .map_or(true, |ids| ids.contains(&s.team.id()))
        })
        .map(|s| NamedRef {
            id: s.team.id(),
            name: s.team.name().to_string(),
        })
        .collect();

    let selectable_squads = state
        .squads
        .list(team_filter.as_deref())
        .await?
        .into_iter()
        .map(|s| SelectableSquad {
            id: s.squad.id,
            name: s.squad.name,
            team_id: s.squad.team_id,
        })
        .collect();

    Ok(Json(UserDetail {
        profile,
        teams,
        squads,
        selectable_teams,
        selectable_squads,
        can_change_admin: access.is_admin(),
    }))
}

/// Edit a user's profile, admin flag and memberships
///
/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut profile = find_user(&state, id).await?;
    let (current_teams, current_squads) = ensure_can_edit(&state, &access, id).await?;

    if let Some(is_admin) = req.is_admin {
        if is_admin != profile.is_admin {
            access.ensure(access.is_admin(), "Only admins can change admin status")?;
            profile.is_admin = is_admin;
        }
    }

    profile.rename(req.name)?;
    profile.email = Email::new(&req.email)?;

    let plan = if req.teams.is_some() || req.squads.is_some() {
        // An omitted list keeps the seats the viewer manages
        let managed = |team_id: Uuid| access.is_admin() || Some(team_id) == access.active_team_id();
        let requested = MembershipPlan {
            teams: req.teams.unwrap_or_else(|| {
                current_teams
                    .iter()
                    .filter(|m| managed(m.team_id))
                    .map(|m| TeamAssignment {
                        team_id: m.team_id,
                        role: m.role,
                    })
                    .collect()
            }),
            squads: req.squads.unwrap_or_else(|| {
                current_squads
                    .iter()
                    .filter(|m| managed(m.team_id))
                    .map(|m| SquadAssignment {
                        squad_id: m.squad_id,
                        role: m.role,
                    })
                    .collect()
            }),
        }
        .deduplicated();

        Some(scoped_plan(&state, &access, requested, &current_teams, &current_squads).await?)
    } else {
        None
    };

    state.users.update(&profile, plan.as_ref()).await?;

    tracing::info!(user_id = %id, edited_by = %access.user_id(), "User updated");
    Ok(Json(profile))
}

/// Checks the requested seats and keeps seats the viewer cannot see
///
/// Admins replace everything. Staff of the active team manage its seats;
/// any other editor must send them back unchanged. Seats in other teams
/// are carried over untouched.
async fn scoped_plan(
    state: &AppState,
    access: &Access,
    requested: MembershipPlan,
    current_teams: &[TeamMembership],
    current_squads: &[SquadMembership],
) -> Result<MembershipPlan, ApiError> {
    let mut team_ids: Vec<Uuid> = requested.team_ids().collect();
    for squad_id in requested.squad_ids() {
        let squad = state
            .squads
            .find_by_id(squad_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Squad not found: {}", squad_id)))?;
        team_ids.push(squad.team_id);
    }

    if access.is_admin() {
        return Ok(requested);
    }

    let active_team = access.active_team_id();
    if access.ctx.can_change_memberships(active_team) {
        access.ensure(
            access.ctx.can_assign_memberships(team_ids, active_team),
            "You can only assign memberships within your active team",
        )?;
    } else {
        access.ensure(
            requested.matches_team_seats(active_team, current_teams, current_squads),
            "Only team staff can change memberships",
        )?;
    }

    let mut plan = requested;
    plan.teams.extend(
        current_teams
            .iter()
            .filter(|m| Some(m.team_id) != active_team)
            .map(|m| TeamAssignment {
                team_id: m.team_id,
                role: m.role,
            }),
    );
    plan.squads.extend(
        current_squads
            .iter()
            .filter(|m| Some(m.team_id) != active_team)
            .map(|m| SquadAssignment {
                squad_id: m.squad_id,
                role: m.role,
            }),
    );

    Ok(plan.deduplicated())
}

/// Delete a user
///
/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access.ensure(access.is_admin(), "Only admins can delete users")?;
    if id == access.user_id() {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    state.users.delete(id).await?;

    tracing::info!(user_id = %id, deleted_by = %access.user_id(), "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
