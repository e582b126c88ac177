use super::events::TeamEvent;
use super::value_objects::TeamColor;
use crate::domain::errors::{non_blank, required};
use crate::domain::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Editable attributes of a team
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TeamDetails {
    pub name: String,
    pub description: Option<String>,
    pub banner_url: Option<String>,
    pub logo_url: Option<String>,
    pub team_color: Option<TeamColor>,
}

/// President and vice president of a team
///
/// Either seat may be vacant, but one user cannot hold both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leadership {
    pub president_id: Option<Uuid>,
    pub vice_president_id: Option<Uuid>,
}

impl Leadership {
    pub fn new(
        president_id: Option<Uuid>,
        vice_president_id: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        if president_id.is_some() && president_id == vice_president_id {
            return Err(DomainError::validation(
                "President and vice president must be different users",
            ));
        }
        Ok(Self {
            president_id,
            vice_president_id,
        })
    }

    pub fn is_vacant(&self) -> bool {
        self.president_id.is_none() && self.vice_president_id.is_none()
    }
}

/// Team aggregate root
///
/// Top-level organizational unit. Squads, memberships, news and projects
/// all hang off a team.
///
/// # Invariants
/// - Name cannot be empty
/// - Optional text fields are trimmed, blank values are stored as `None`
/// - Color, when present, is a valid hex color
///
/// # Example
/// ```
/// use teamhub_api::domain::team::{Team, TeamDetails};
///
/// let (team, events) = Team::new(TeamDetails {
///     name: "Robotics".to_string(),
///     ..Default::default()
/// })
/// .expect("valid team");
///
/// assert_eq!(team.name(), "Robotics");
/// assert_eq!(events.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    id: Uuid,
    name: String,
    description: Option<String>,
    banner_url: Option<String>,
    logo_url: Option<String>,
    team_color: Option<TeamColor>,
    created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new Team aggregate
    ///
    /// # Returns
    /// * `Ok((Team, Vec<TeamEvent>))` - New team and the Created event
    /// * `Err(DomainError)` - If the name is blank
    pub fn new(details: TeamDetails) -> Result<(Self, Vec<TeamEvent>), DomainError> {
        let name = required(details.name, "Team name cannot be empty")?;

        let team = Self {
            id: Uuid::new_v4(),
            name,
            description: non_blank(details.description),
            banner_url: non_blank(details.banner_url),
            logo_url: non_blank(details.logo_url),
            team_color: details.team_color,
            created_at: Utc::now(),
        };

        let events = vec![TeamEvent::Created {
            team_id: team.id,
            name: team.name.clone(),
        }];

        Ok((team, events))
    }

    /// Replaces the editable attributes
    pub fn update(&mut self, details: TeamDetails) -> Result<TeamEvent, DomainError> {
        self.name = required(details.name, "Team name cannot be empty")?;
        self.description = non_blank(details.description);
        self.banner_url = non_blank(details.banner_url);
        self.logo_url = non_blank(details.logo_url);
        self.team_color = details.team_color;

        Ok(TeamEvent::Updated { team_id: self.id })
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn banner_url(&self) -> Option<&str> {
        self.banner_url.as_deref()
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }

    pub fn team_color(&self) -> Option<&TeamColor> {
        self.team_color.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// Bypasses validation; only repository implementations should call this.
    pub fn from_persistence(
        id: Uuid,
        name: String,
        description: Option<String>,
        banner_url: Option<String>,
        logo_url: Option<String>,
        team_color: Option<TeamColor>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            banner_url,
            logo_url,
            team_color,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(name: &str) -> TeamDetails {
        TeamDetails {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn create_team_with_valid_name() {
        let (team, events) = Team::new(details("  Robotics  ")).unwrap();

        assert_eq!(team.name(), "Robotics");
        assert!(team.description().is_none());
        assert_eq!(
            events,
            vec![TeamEvent::Created {
                team_id: team.id(),
                name: "Robotics".to_string()
            }]
        );
    }

    #[test]
    fn create_team_with_empty_name_fails() {
        let result = Team::new(details("   "));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Team name cannot be empty"
        );
    }

    #[test]
    fn blank_optional_fields_are_dropped() {
        let (team, _) = Team::new(TeamDetails {
            name: "Design".to_string(),
            description: Some("  ".to_string()),
            logo_url: Some(" https://cdn/logo.png ".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert!(team.description().is_none());
        assert_eq!(team.logo_url(), Some("https://cdn/logo.png"));
    }

    #[test]
    fn update_replaces_details() {
        let (mut team, _) = Team::new(details("Old")).unwrap();
        let event = team
            .update(TeamDetails {
                name: "New".to_string(),
                team_color: Some(TeamColor::new("#000").unwrap()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(team.name(), "New");
        assert_eq!(team.team_color().map(|c| c.as_str()), Some("#000"));
        assert_eq!(event, TeamEvent::Updated { team_id: team.id() });
    }

    #[test]
    fn update_with_blank_name_keeps_error() {
        let (mut team, _) = Team::new(details("Old")).unwrap();
        assert!(team.update(details("")).is_err());
    }

    #[test]
    fn leadership_requires_distinct_users() {
        let user = Uuid::new_v4();
        assert!(Leadership::new(Some(user), Some(user)).is_err());
        assert!(Leadership::new(Some(user), None).is_ok());
        assert!(Leadership::new(None, None).unwrap().is_vacant());
    }
}
