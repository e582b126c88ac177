use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::DomainError;

/// Brand color of a team, a CSS hex color
///
/// # Invariants
/// - Starts with '#'
/// - Followed by exactly 3 or 6 hex digits
/// - Stored lower-cased
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeamColor(String);

impl TeamColor {
    /// Creates a new TeamColor
    ///
    /// # Example
    /// ```
    /// use teamhub_api::domain::team::TeamColor;
    ///
    /// let color = TeamColor::new("#1E90FF").expect("valid color");
    /// assert_eq!(color.as_str(), "#1e90ff");
    /// assert!(TeamColor::new("blue").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_lowercase();
        let digits = value.strip_prefix('#').unwrap_or("");
        let valid = value.starts_with('#')
            && matches!(digits.len(), 3 | 6)
            && digits.chars().all(|c| c.is_ascii_hexdigit());

        if valid {
            Ok(Self(value))
        } else {
            Err(DomainError::validation(format!(
                "Invalid team color: {}",
                value
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TeamColor {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeamColor> for String {
    fn from(color: TeamColor) -> Self {
        color.0
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
