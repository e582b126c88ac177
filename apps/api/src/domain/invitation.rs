use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::roles::InvitationRole;
use crate::domain::user::Email;

/// Lifecycle state of an invitation as shown to its creator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Used,
    Expired,
}

/// Reasons an invitation cannot be redeemed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvitationError {
    #[error("Invitation not found")]
    NotFound,
    #[error("Invitation has already been used")]
    AlreadyUsed,
    #[error("Invitation has expired")]
    Expired,
}

/// Time-limited token granting registration rights with a predefined
/// role, team and squad
///
/// # Invariants
/// - An invitation can be redeemed once
/// - It cannot be redeemed after `expires_at`
/// - A used invitation reports `Used` even once past its expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invitation {
    pub id: Uuid,
    pub email: Email,
    pub role: InvitationRole,
    pub team_id: Option<Uuid>,
    pub squad_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// Creates an unused invitation expiring `ttl_days` from now
    ///
    /// # Example
    /// ```
    /// use teamhub_api::domain::invitation::{Invitation, InvitationStatus};
    /// use teamhub_api::domain::roles::InvitationRole;
    /// use teamhub_api::domain::user::Email;
    /// use chrono::Utc;
    ///
    /// let invitation = Invitation::new(
    ///     Email::new("new@example.com").unwrap(),
    ///     InvitationRole::Member,
    ///     None,
    ///     None,
    ///     None,
    ///     7,
    /// );
    /// assert_eq!(invitation.status_at(Utc::now()), InvitationStatus::Pending);
    /// ```
    pub fn new(
        email: Email,
        role: InvitationRole,
        team_id: Option<Uuid>,
        squad_id: Option<Uuid>,
        created_by: Option<Uuid>,
        ttl_days: i64,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            role,
            team_id,
            squad_id,
            created_by,
            expires_at: created_at + Duration::days(ttl_days),
            used: false,
            created_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.used {
            InvitationStatus::Used
        } else if self.is_expired_at(now) {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Pending
        }
    }

    /// Checks the invitation can still be redeemed
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), InvitationError> {
        match self.status_at(now) {
            InvitationStatus::Pending => Ok(()),
            InvitationStatus::Used => Err(InvitationError::AlreadyUsed),
            InvitationStatus::Expired => Err(InvitationError::Expired),
        }
    }

    /// `<app_url>/register?invitation=<id>`
    pub fn registration_link(&self, app_url: &str) -> String {
        format!(
            "{}/register?invitation={}",
            app_url.trim_end_matches('/'),
            self.id
        )
    }

    /// Pre-filled mail to the invitee containing the registration link
    pub fn mailto_link(&self, app_url: &str, team_name: Option<&str>) -> String {
        let body = format!(
            "You've been invited to join {}. Click the following link to register: {}",
            team_name.unwrap_or("the team"),
            self.registration_link(app_url)
        );
        format!(
            "mailto:{}?subject={}&body={}",
            self.email,
            mail_encode("Team Invitation"),
            mail_encode(&body)
        )
    }
}

/// Percent-encodes a mailto header value (spaces as %20, not '+')
fn mail_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation() -> Invitation {
        Invitation::new(
            Email::new("invitee@example.com").unwrap(),
            InvitationRole::Coordinator,
            Some(Uuid::new_v4()),
            None,
            Some(Uuid::new_v4()),
            7,
        )
    }

    #[test]
    fn new_invitation_expires_in_ttl() {
        let inv = invitation();
        assert_eq!(inv.expires_at - inv.created_at, Duration::days(7));
        assert!(!inv.used);
    }

    #[test]
    fn fresh_invitation_is_valid() {
        assert_eq!(invitation().validate_at(Utc::now()), Ok(()));
    }

    #[test]
    fn expired_invitation_is_rejected() {
        let inv = invitation();
        let later = inv.expires_at + Duration::seconds(1);
        assert_eq!(inv.status_at(later), InvitationStatus::Expired);
        assert_eq!(
            inv.validate_at(later).unwrap_err().to_string(),
            "Invitation has expired"
        );
    }

    #[test]
    fn exact_expiry_instant_is_still_valid() {
        let inv = invitation();
        assert!(inv.validate_at(inv.expires_at).is_ok());
    }

    #[test]
    fn used_wins_over_expired() {
        let mut inv = invitation();
        inv.used = true;
        let later = inv.expires_at + Duration::days(1);
        assert_eq!(inv.status_at(later), InvitationStatus::Used);
        assert_eq!(inv.validate_at(Utc::now()), Err(InvitationError::AlreadyUsed));
    }

    #[test]
    fn registration_link_format() {
        let inv = invitation();
        assert_eq!(
            inv.registration_link("https://app.example.com/"),
            format!("https://app.example.com/register?invitation={}", inv.id)
        );
    }

    #[test]
    fn mailto_link_is_encoded() {
        let inv = invitation();
        let link = inv.mailto_link("http://localhost:3000", Some("Robotics Club"));
        assert!(link.starts_with("mailto:invitee@example.com?subject=Team%20Invitation&body="));
        assert!(link.contains("Robotics%20Club"));
        assert!(!link.contains(' '));
    }
}
