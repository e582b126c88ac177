// HTTP handlers, one module per resource

pub mod auth;
pub mod dashboard;
pub mod invitations;
pub mod me;
pub mod news;
pub mod projects;
pub mod registration;
pub mod squads;
pub mod teams;
pub mod uploads;
pub mod users;

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::Access;
use crate::api::state::AppState;
use crate::domain::user::Profile;

/// Minimal reference to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&Profile> for PersonRef {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
        }
    }
}

/// Loads the given profiles in one query, keyed by id
pub(crate) async fn profiles_by_id(
    state: &AppState,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, Profile>, ApiError> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let profiles = state.users.find_many(&ids).await?;
    Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
}

/// Resolves where news or a project is published
///
/// The team defaults to the active team. A squad must belong to that team.
pub(crate) async fn publication_target(
    state: &AppState,
    access: &Access,
    team_id: Option<Uuid>,
    squad_id: Option<Uuid>,
) -> Result<(Option<Uuid>, Option<Uuid>), ApiError> {
    let team_id = team_id.or_else(|| access.active_team_id());

    access.ensure(
        access.ctx.can_publish_to(team_id),
        "You cannot publish to this team",
    )?;

    if let Some(squad_id) = squad_id {
        let squad = state
            .squads
            .find_by_id(squad_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Squad not found: {}", squad_id)))?;
        if Some(squad.team_id) != team_id {
            return Err(ApiError::bad_request("Squad does not belong to the team"));
        }
    }

    Ok((team_id, squad_id))
}

/// Deletes a stored image, logging instead of failing
pub(crate) async fn remove_image(state: &AppState, url: &str) {
    if let Err(e) = state.storage.delete(url).await {
        tracing::warn!(url, error = %e, "Failed to remove stored image");
    }
}
