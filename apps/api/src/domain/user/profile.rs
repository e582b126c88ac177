use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::Email;
use crate::domain::errors::{non_blank, required};
use crate::domain::DomainError;

/// Application-level user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub x: Option<String>,
    pub instagram: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields a user may edit on their own profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileDetails {
    pub name: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub x: Option<String>,
    pub instagram: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
}

impl Profile {
    /// Creates a fresh profile for a newly registered user
    pub fn new(name: impl Into<String>, email: Email, is_admin: bool) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: required(name, "Name cannot be empty")?,
            email,
            is_admin,
            bio: None,
            website: None,
            x: None,
            instagram: None,
            avatar_url: None,
            banner_url: None,
            created_at: Utc::now(),
        })
    }

    pub fn apply(&mut self, details: ProfileDetails) -> Result<(), DomainError> {
        self.name = required(details.name, "Name cannot be empty")?;
        self.bio = non_blank(details.bio);
        self.website = non_blank(details.website);
        self.x = non_blank(details.x);
        self.instagram = non_blank(details.instagram);
        self.avatar_url = non_blank(details.avatar_url);
        self.banner_url = non_blank(details.banner_url);
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), DomainError> {
        self.name = required(name, "Name cannot be empty")?;
        Ok(())
    }
}
