use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a user holds inside a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    President,
    VicePresident,
    Coordinator,
    Member,
}

impl TeamRole {
    /// Presidents and vice presidents make up a team's staff
    pub fn is_staff(&self) -> bool {
        matches!(self, TeamRole::President | TeamRole::VicePresident)
    }

    /// Human readable label, e.g. "vice president"
    pub fn label(&self) -> String {
        self.to_string().replace('_', " ")
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamRole::President => write!(f, "president"),
            TeamRole::VicePresident => write!(f, "vice_president"),
            TeamRole::Coordinator => write!(f, "coordinator"),
            TeamRole::Member => write!(f, "member"),
        }
    }
}

/// Role a user holds inside a squad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "squad_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SquadRole {
    Coordinator,
    Member,
}

impl fmt::Display for SquadRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquadRole::Coordinator => write!(f, "coordinator"),
            SquadRole::Member => write!(f, "member"),
        }
    }
}

/// Role granted to whoever registers through an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InvitationRole {
    Admin,
    President,
    VicePresident,
    Coordinator,
    Member,
}

impl InvitationRole {
    /// Team membership role created on registration
    ///
    /// Admins join the invited team as plain members; their privileges come
    /// from the profile flag instead.
    pub fn team_role(&self) -> TeamRole {
        match self {
            InvitationRole::Admin | InvitationRole::Member => TeamRole::Member,
            InvitationRole::President => TeamRole::President,
            InvitationRole::VicePresident => TeamRole::VicePresident,
            InvitationRole::Coordinator => TeamRole::Coordinator,
        }
    }

    /// Squad membership role created on registration
    pub fn squad_role(&self) -> SquadRole {
        match self {
            InvitationRole::Coordinator => SquadRole::Coordinator,
            _ => SquadRole::Member,
        }
    }

    pub fn grants_admin(&self) -> bool {
        matches!(self, InvitationRole::Admin)
    }
}

impl fmt::Display for InvitationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvitationRole::Admin => write!(f, "admin"),
            InvitationRole::President => write!(f, "president"),
            InvitationRole::VicePresident => write!(f, "vice_president"),
            InvitationRole::Coordinator => write!(f, "coordinator"),
            InvitationRole::Member => write!(f, "member"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_invitation_joins_team_as_member() {
        assert_eq!(InvitationRole::Admin.team_role(), TeamRole::Member);
        assert!(InvitationRole::Admin.grants_admin());
        assert!(!InvitationRole::President.grants_admin());
    }

    #[test]
    fn invitation_roles_map_to_team_roles() {
        assert_eq!(InvitationRole::President.team_role(), TeamRole::President);
        assert_eq!(
            InvitationRole::VicePresident.team_role(),
            TeamRole::VicePresident
        );
        assert_eq!(
            InvitationRole::Coordinator.team_role(),
            TeamRole::Coordinator
        );
        assert_eq!(InvitationRole::Member.team_role(), TeamRole::Member);
    }

    #[test]
    fn only_coordinators_coordinate_squads() {
        assert_eq!(
            InvitationRole::Coordinator.squad_role(),
            SquadRole::Coordinator
        );
        assert_eq!(InvitationRole::President.squad_role(), SquadRole::Member);
        assert_eq!(InvitationRole::Admin.squad_role(), SquadRole::Member);
    }

    #[test]
    fn staff_roles() {
        assert!(TeamRole::President.is_staff());
        assert!(TeamRole::VicePresident.is_staff());
        assert!(!TeamRole::Coordinator.is_staff());
        assert!(!TeamRole::Member.is_staff());
    }

    #[test]
    fn wire_format_is_snake_case() {
        let json = serde_json::to_string(&TeamRole::VicePresident).unwrap();
        assert_eq!(json, "\"vice_president\"");
        let role: InvitationRole = serde_json::from_str("\"vice_president\"").unwrap();
        assert_eq!(role, InvitationRole::VicePresident);
        assert_eq!(TeamRole::VicePresident.label(), "vice president");
    }
}
