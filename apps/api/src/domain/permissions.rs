// Authorization rules
//
// Every rule is a pure function of the viewer's memberships, loaded once
// per request into an `AccessContext`.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::membership::{SquadMembership, TeamMembership};
use crate::domain::roles::{InvitationRole, SquadRole, TeamRole};
use crate::domain::squad::Squad;

/// Raised when a permission rule rejects an action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct AccessDenied(pub String);

impl AccessDenied {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Which team-owned content (news, projects, stats) a viewer may see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentScope {
    All,
    Teams(Vec<Uuid>),
}

impl ContentScope {
    pub fn includes(&self, team_id: Option<Uuid>) -> bool {
        match self {
            ContentScope::All => true,
            ContentScope::Teams(ids) => team_id.is_some_and(|t| ids.contains(&t)),
        }
    }

    /// Team filter for repository queries, `None` meaning "no filter"
    pub fn team_filter(&self) -> Option<&[Uuid]> {
        match self {
            ContentScope::All => None,
            ContentScope::Teams(ids) => Some(ids),
        }
    }
}

/// Memberships of the user whose record is being edited
#[derive(Debug, Clone, Copy)]
pub struct EditTarget<'a> {
    pub user_id: Uuid,
    pub teams: &'a [TeamMembership],
    pub squads: &'a [SquadMembership],
}

impl EditTarget<'_> {
    fn belongs_to_team(&self, team_id: Uuid) -> bool {
        self.teams.iter().any(|m| m.team_id == team_id)
            || self.squads.iter().any(|m| m.team_id == team_id)
    }
}

/// The viewer of a request with everything needed to authorize it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    pub user_id: Uuid,
    pub is_admin: bool,
    pub teams: Vec<TeamMembership>,
    pub squads: Vec<SquadMembership>,
}

impl AccessContext {
    pub fn new(
        user_id: Uuid,
        is_admin: bool,
        teams: Vec<TeamMembership>,
        squads: Vec<SquadMembership>,
    ) -> Self {
        Self {
            user_id,
            is_admin,
            teams,
            squads,
        }
    }

    /// Roles held in `team_id`, possibly several (e.g. member + coordinator)
    pub fn team_roles(&self, team_id: Uuid) -> impl Iterator<Item = TeamRole> + '_ {
        self.teams
            .iter()
            .filter(move |m| m.team_id == team_id)
            .map(|m| m.role)
    }

    /// Member of the team directly or through one of its squads
    pub fn is_member_of_team(&self, team_id: Uuid) -> bool {
        self.teams.iter().any(|m| m.team_id == team_id)
            || self.squads.iter().any(|m| m.team_id == team_id)
    }

    pub fn can_view_team(&self, team_id: Uuid) -> bool {
        self.is_admin || self.is_member_of_team(team_id)
    }

    /// Admin, or president / vice president of the team
    pub fn is_team_staff(&self, team_id: Uuid) -> bool {
        self.is_admin || self.team_roles(team_id).any(|r| r.is_staff())
    }

    pub fn is_squad_coordinator(&self, squad_id: Uuid) -> bool {
        self.squads
            .iter()
            .any(|m| m.squad_id == squad_id && m.role == SquadRole::Coordinator)
    }

    fn is_staff_anywhere(&self) -> bool {
        self.teams.iter().any(|m| m.role.is_staff())
    }

    fn coordinates_any_squad(&self) -> bool {
        self.squads.iter().any(|m| m.role == SquadRole::Coordinator)
    }

    /// Leaders (admins, presidents, vice presidents, squad coordinators)
    ///
    /// Gates invitations as well as the team, squad and user listings.
    pub fn can_invite_users(&self) -> bool {
        self.is_admin || self.is_staff_anywhere() || self.coordinates_any_squad()
    }

    /// Whether the viewer may edit another user's profile and memberships
    ///
    /// Staff reach every member of the active team; squad coordinators reach
    /// the members of the squads they coordinate within the active team.
    pub fn can_edit_user(&self, target: EditTarget<'_>, active_team: Option<Uuid>) -> bool {
        if self.is_admin || target.user_id == self.user_id {
            return true;
        }

        let Some(team_id) = active_team else {
            return false;
        };

        if self.is_team_staff(team_id) && target.belongs_to_team(team_id) {
            return true;
        }

        target
            .squads
            .iter()
            .filter(|m| m.team_id == team_id)
            .any(|m| self.is_squad_coordinator(m.squad_id))
    }

    pub fn can_manage_squad(&self, squad: &Squad) -> bool {
        self.is_team_staff(squad.team_id) || self.is_squad_coordinator(squad.id)
    }

    /// Whether the viewer may hand out an invitation with this role and seat
    ///
    /// `squad`, when given, must already be known to belong to `team_id`.
    pub fn can_invite(
        &self,
        role: InvitationRole,
        team_id: Option<Uuid>,
        squad: Option<&Squad>,
    ) -> Result<(), AccessDenied> {
        if self.is_admin {
            return Ok(());
        }
        if role.grants_admin() {
            return Err(AccessDenied::new("Only admins can invite admins"));
        }
        let Some(team_id) = team_id else {
            return Err(AccessDenied::new("A team is required for this invitation"));
        };
        if self.is_team_staff(team_id) {
            return Ok(());
        }

        let coordinator_seat = matches!(role, InvitationRole::Coordinator | InvitationRole::Member);
        match squad {
            Some(squad)
                if coordinator_seat
                    && squad.team_id == team_id
                    && self.is_squad_coordinator(squad.id) =>
            {
                Ok(())
            }
            _ => Err(AccessDenied::new("You cannot invite users to this team")),
        }
    }

    /// Admins, and staff of the active team, may change a user's seats
    pub fn can_change_memberships(&self, active_team: Option<Uuid>) -> bool {
        self.is_admin || active_team.is_some_and(|t| self.is_team_staff(t))
    }

    /// Non-admins may only hand out seats inside the active team
    pub fn can_assign_memberships(
        &self,
        team_ids: impl IntoIterator<Item = Uuid>,
        active_team: Option<Uuid>,
    ) -> bool {
        if self.is_admin {
            return true;
        }
        match active_team {
            Some(active) => team_ids
                .into_iter()
                .all(|t| t == active && self.is_team_staff(active)),
            None => team_ids.into_iter().next().is_none(),
        }
    }

    /// Admins see everything, everyone else only the active team
    pub fn content_scope(&self, active_team: Option<Uuid>) -> ContentScope {
        if self.is_admin {
            ContentScope::All
        } else {
            ContentScope::Teams(active_team.into_iter().collect())
        }
    }

    /// May publish news or projects into `team_id`
    pub fn can_publish_to(&self, team_id: Option<Uuid>) -> bool {
        match team_id {
            Some(team_id) => self.can_view_team(team_id),
            None => self.is_admin,
        }
    }

    /// May edit or delete news / projects owned by `team_id`
    pub fn can_manage_content(&self, team_id: Option<Uuid>, author_id: Option<Uuid>) -> bool {
        self.is_admin
            || author_id == Some(self.user_id)
            || team_id.is_some_and(|t| self.is_team_staff(t))
    }

    /// Whether the team referenced by the `selectedTeamId` cookie may be
    /// activated by this viewer
    pub fn can_activate_team(&self, team_id: Uuid) -> bool {
        self.can_view_team(team_id)
    }
}

/// Parses the raw `selectedTeamId` cookie value
///
/// Returns `None` for missing or malformed values; callers additionally
/// check that the team exists and `AccessContext::can_activate_team`.
pub fn parse_active_team_cookie(raw: Option<&str>) -> Option<Uuid> {
    raw.and_then(|v| Uuid::parse_str(v.trim()).ok())
}
