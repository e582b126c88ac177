use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::required;
use crate::domain::DomainError;

/// Sub-group within a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Squad {
    pub id: Uuid,
    pub name: String,
    pub team_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Squad {
    pub fn new(name: impl Into<String>, team_id: Uuid) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: required(name, "Squad name cannot be empty")?,
            team_id,
            created_at: Utc::now(),
        })
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), DomainError> {
        self.name = required(name, "Squad name cannot be empty")?;
        Ok(())
    }
}
