use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use super::auth::AuthUser;
use crate::api::cookies::ACTIVE_TEAM_COOKIE;
use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::domain::permissions::{parse_active_team_cookie, AccessContext, ContentScope};
use crate::domain::team::Team;
use crate::domain::user::Profile;

/// Authenticated viewer with memberships and active team loaded
///
/// Every permission check in the handlers runs against `ctx`.
pub struct Access {
    pub profile: Profile,
    pub ctx: AccessContext,
    pub active_team: Option<Team>,
}

impl Access {
    pub fn user_id(&self) -> Uuid {
        self.profile.id
    }

    pub fn is_admin(&self) -> bool {
        self.ctx.is_admin
    }

    pub fn active_team_id(&self) -> Option<Uuid> {
        self.active_team.as_ref().map(Team::id)
    }

    pub fn require_active_team(&self) -> Result<&Team, ApiError> {
        self.active_team
            .as_ref()
            .ok_or_else(|| ApiError::bad_request("No active team selected"))
    }

    pub fn content_scope(&self) -> ContentScope {
        self.ctx.content_scope(self.active_team_id())
    }

    /// Fails with 403 and `message` unless `allowed`
    pub fn ensure(&self, allowed: bool, message: &str) -> Result<(), ApiError> {
        if allowed {
            Ok(())
        } else {
            tracing::debug!(user_id = %self.profile.id, reason = message, "Access denied");
            Err(ApiError::forbidden(message))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Access {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;

        let profile = state
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

        let ctx = load_context(state, &profile).await?;

        let jar = CookieJar::from_headers(&parts.headers);
        let raw_team = jar.get(ACTIVE_TEAM_COOKIE).map(|c| c.value().to_string());
        let active_team = resolve_active_team(state, &ctx, raw_team.as_deref()).await?;

        Ok(Access {
            profile,
            ctx,
            active_team,
        })
    }
}

/// Loads the memberships of `profile` into an access context
pub async fn load_context(state: &AppState, profile: &Profile) -> Result<AccessContext, ApiError> {
    let teams = state.memberships.teams_for_user(profile.id).await?;
    let squads = state.memberships.squads_for_user(profile.id).await?;
    Ok(AccessContext::new(profile.id, profile.is_admin, teams, squads))
}

/// Resolves the raw `selectedTeamId` cookie to a team the viewer may use
///
/// Malformed ids, unknown teams and teams the viewer does not belong to
/// all resolve to `None`.
pub async fn resolve_active_team(
    state: &AppState,
    ctx: &AccessContext,
    raw: Option<&str>,
) -> Result<Option<Team>, ApiError> {
    let Some(team_id) = parse_active_team_cookie(raw) else {
        return Ok(None);
    };

    if !ctx.can_activate_team(team_id) {
        tracing::debug!(user_id = %ctx.user_id, team_id = %team_id, "Ignoring active team outside memberships");
        return Ok(None);
    }

    Ok(state.teams.find_by_id(team_id).await?)
}
