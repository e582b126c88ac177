use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{non_blank, required};
use crate::domain::DomainError;

/// Project run by a team or squad
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub team_id: Option<Uuid>,
    pub squad_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Editable attributes of a project
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDetails {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    pub team_id: Option<Uuid>,
    pub squad_id: Option<Uuid>,
}

impl Project {
    pub fn new(details: ProjectDetails) -> Result<Self, DomainError> {
        let mut project = Self {
            id: Uuid::new_v4(),
            name: String::new(),
            description: String::new(),
            image_url: None,
            team_id: None,
            squad_id: None,
            created_at: Utc::now(),
        };
        project.apply(details)?;
        Ok(project)
    }

    pub fn apply(&mut self, details: ProjectDetails) -> Result<(), DomainError> {
        self.name = required(details.name, "Project name cannot be empty")?;
        self.description = details.description.trim().to_string();
        self.image_url = non_blank(details.image_url);
        self.team_id = details.team_id;
        self.squad_id = details.squad_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_required() {
        assert!(Project::new(ProjectDetails::default()).is_err());
    }

    #[test]
    fn project_keeps_description() {
        let project = Project::new(ProjectDetails {
            name: "Website".to_string(),
            description: " Rebuild the site ".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(project.description, "Rebuild the site");
        assert!(project.image_url.is_none());
    }
}
