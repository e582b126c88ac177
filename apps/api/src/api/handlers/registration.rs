// Sign-up through an invitation link or a team link

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::auth::password::{hash_password, validate_new_password};
use crate::domain::invitation::InvitationError;
use crate::domain::membership::{MembershipPlan, SquadAssignment, TeamAssignment};
use crate::domain::repositories::{InvitationEntry, UserAccount};
use crate::domain::roles::{InvitationRole, TeamRole};
use crate::domain::team::Team;
use crate::domain::user::{Email, Profile};

/// Public view of an invitation, shown on the registration form
#[derive(Debug, Serialize)]
pub struct InvitationPreview {
    pub email: String,
    pub role: InvitationRole,
    pub team_name: Option<String>,
    pub squad_name: Option<String>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct InvitationValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation: Option<InvitationPreview>,
}

#[derive(Debug, Deserialize)]
pub struct InvitationRegisterRequest {
    pub invitation_id: Option<String>,
    pub full_name: String,
    pub password: String,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TeamRegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TeamRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TeamRegistrationInfo {
    pub valid: bool,
    pub team: TeamRef,
}

/// Looks up an invitation and checks it can still be redeemed
///
/// The outer error is a storage failure, the inner one the reason the
/// invitation cannot be used.
async fn redeemable_invitation(
    state: &AppState,
    raw_id: &str,
) -> Result<Result<InvitationEntry, InvitationError>, ApiError> {
    let Ok(id) = Uuid::parse_str(raw_id.trim()) else {
        return Ok(Err(InvitationError::NotFound));
    };

    let Some(entry) = state.invitations.find_by_id(id).await? else {
        return Ok(Err(InvitationError::NotFound));
    };

    Ok(entry.invitation.validate_at(Utc::now()).map(|()| entry))
}

async fn ensure_email_available(state: &AppState, email: &Email) -> Result<(), ApiError> {
    if state.users.find_account_by_email(email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }
    Ok(())
}

/// Checks an invitation link before the form is shown
///
/// GET /api/invitations/:id/validate
pub async fn validate_invitation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvitationValidation>, ApiError> {
    let validation = match redeemable_invitation(&state, &id).await? {
        Ok(entry) => InvitationValidation {
            valid: true,
            message: None,
            invitation: Some(InvitationPreview {
                email: entry.invitation.email.to_string(),
                role: entry.invitation.role,
                team_name: entry.team_name,
                squad_name: entry.squad_name,
                expires_at: entry.invitation.expires_at,
            }),
        },
        Err(e) => InvitationValidation {
            valid: false,
            message: Some(e.to_string()),
            invitation: None,
        },
    };

    Ok(Json(validation))
}

/// Registers the invitee with the role, team and squad of the invitation
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<InvitationRegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let invitation_id = req
        .invitation_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Registration is by invitation only"))?;

    let invitation = redeemable_invitation(&state, invitation_id).await??.invitation;

    validate_new_password(&req.password, req.confirm_password.as_deref())?;
    ensure_email_available(&state, &invitation.email).await?;

    let profile = Profile::new(
        req.full_name,
        invitation.email.clone(),
        invitation.role.grants_admin(),
    )?;

    let memberships = MembershipPlan {
        teams: invitation
            .team_id
            .map(|team_id| TeamAssignment {
                team_id,
                role: invitation.role.team_role(),
            })
            .into_iter()
            .collect(),
        squads: invitation
            .squad_id
            .map(|squad_id| SquadAssignment {
                squad_id,
                role: invitation.role.squad_role(),
            })
            .into_iter()
            .collect(),
    };

    let account = UserAccount {
        password_hash: hash_password(&req.password)?,
        profile,
    };
    state
        .users
        .create(&account, &memberships, Some(invitation.id))
        .await?;

    tracing::info!(
        user_id = %account.profile.id,
        invitation_id = %invitation.id,
        role = %invitation.role,
        "User registered through invitation"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: account.profile.id,
            message: "Registration successful".to_string(),
        }),
    ))
}

/// Team link check before the form is shown
///
/// GET /api/register/:team_id
pub async fn team_registration_info(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<TeamRegistrationInfo>, ApiError> {
    let team = find_registration_team(&state, &team_id).await?;

    Ok(Json(TeamRegistrationInfo {
        valid: true,
        team: TeamRef {
            id: team.id(),
            name: team.name().to_string(),
        },
    }))
}

async fn find_registration_team(state: &AppState, raw_id: &str) -> Result<Team, ApiError> {
    let invalid = || ApiError::not_found("Invalid team ID. Registration is not possible.");

    let team_id = Uuid::parse_str(raw_id.trim()).map_err(|_| invalid())?;
    state.teams.find_by_id(team_id).await?.ok_or_else(invalid)
}

/// Registers a plain member of the team behind the link
///
/// POST /api/register/:team_id
pub async fn register_with_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(req): Json<TeamRegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let team = find_registration_team(&state, &team_id).await?;

    validate_new_password(&req.password, Some(&req.confirm_password))?;
    let email = Email::new(&req.email)?;
    ensure_email_available(&state, &email).await?;

    let profile = Profile::new(req.full_name, email, false)?;
    let memberships = MembershipPlan {
        teams: vec![TeamAssignment {
            team_id: team.id(),
            role: TeamRole::Member,
        }],
        squads: Vec::new(),
    };

    let account = UserAccount {
        password_hash: hash_password(&req.password)?,
        profile,
    };
    state.users.create(&account, &memberships, None).await?;

    tracing::info!(user_id = %account.profile.id, team_id = %team.id(), "User registered through team link");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: account.profile.id,
            message: format!("Welcome to {}", team.name()),
        }),
    ))
}
