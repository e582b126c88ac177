use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::Access;
use crate::api::state::AppState;
use crate::domain::invitation::{Invitation, InvitationStatus};
use crate::domain::repositories::InvitationEntry;
use crate::domain::roles::InvitationRole;
use crate::domain::user::Email;

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub status: InvitationStatus,
    pub team_name: Option<String>,
    pub squad_name: Option<String>,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailto: Option<String>,
}

impl InvitationResponse {
    fn new(entry: InvitationEntry, app_url: &str) -> Self {
        Self {
            status: entry.invitation.status_at(Utc::now()),
            link: entry.invitation.registration_link(app_url),
            invitation: entry.invitation,
            team_name: entry.team_name,
            squad_name: entry.squad_name,
            mailto: None,
        }
    }

    fn with_mailto(mut self, app_url: &str) -> Self {
        self.mailto = Some(
            self.invitation
                .mailto_link(app_url, self.team_name.as_deref()),
        );
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    pub email: String,
    pub role: InvitationRole,
    pub team_id: Option<Uuid>,
    pub squad_id: Option<Uuid>,
}

/// Invitations created by the viewer, newest first
///
/// GET /api/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    access: Access,
) -> Result<Json<Vec<InvitationResponse>>, ApiError> {
    access.ensure(
        access.ctx.can_invite_users(),
        "You do not have permission to invite users",
    )?;

    let entries = state.invitations.list_by_creator(access.user_id()).await?;
    let app_url = &state.config.app_url;

    Ok(Json(
        entries
            .into_iter()
            .map(|e| InvitationResponse::new(e, app_url))
            .collect(),
    ))
}

/// Create an invitation
///
/// POST /api/invitations
///
/// A given squad fixes the team; a conflicting `team_id` is rejected.
pub async fn create_invitation(
    State(state): State<AppState>,
    access: Access,
    Json(req): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), ApiError> {
    access.ensure(
        access.ctx.can_invite_users(),
        "You do not have permission to invite users",
    )?;

    let email = Email::new(&req.email)?;

    let squad = match req.squad_id {
        Some(squad_id) => Some(
            state
                .squads
                .find_by_id(squad_id)
                .await?
                .ok_or_else(|| ApiError::not_found(format!("Squad not found: {}", squad_id)))?,
        ),
        None => None,
    };

    let team_id = match (&squad, req.team_id) {
        (Some(squad), Some(team_id)) if squad.team_id != team_id => {
            return Err(ApiError::bad_request("Squad does not belong to the team"));
        }
        (Some(squad), _) => Some(squad.team_id),
        (None, team_id) => team_id,
    };

    if let Some(team_id) = team_id {
        state
            .teams
            .find_by_id(team_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Team not found: {}", team_id)))?;
    }

    access.ctx.can_invite(req.role, team_id, squad.as_ref())?;

    let invitation = Invitation::new(
        email,
        req.role,
        team_id,
        squad.as_ref().map(|s| s.id),
        Some(access.user_id()),
        state.config.invitation_ttl_days,
    );
    state.invitations.create(&invitation).await?;

    tracing::info!(
        invitation_id = %invitation.id,
        role = %invitation.role,
        created_by = %access.user_id(),
        "Invitation created"
    );

    let entry = state
        .invitations
        .find_by_id(invitation.id)
        .await?
        .unwrap_or(InvitationEntry {
            invitation,
            team_name: None,
            squad_name: None,
        });

    Ok((
        StatusCode::CREATED,
        Json(InvitationResponse::new(entry, &state.config.app_url)),
    ))
}

/// Invitation details with its registration and mailto links
///
/// GET /api/invitations/:id
pub async fn get_invitation(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let entry = state
        .invitations
        .find_by_id(id)
        .await?
        .filter(|e| e.invitation.created_by == Some(access.user_id()))
        .ok_or_else(|| ApiError::not_found(format!("Invitation not found: {}", id)))?;

    let app_url = &state.config.app_url;
    Ok(Json(InvitationResponse::new(entry, app_url).with_mailto(app_url)))
}
