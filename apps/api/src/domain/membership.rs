use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::roles::{SquadRole, TeamRole};

/// A row of `user_teams`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub role: TeamRole,
}

/// A row of `user_squads`, together with the team that owns the squad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadMembership {
    pub user_id: Uuid,
    pub squad_id: Uuid,
    pub team_id: Uuid,
    pub role: SquadRole,
}

/// Requested team seat for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAssignment {
    pub team_id: Uuid,
    pub role: TeamRole,
}

/// Requested squad seat for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadAssignment {
    pub squad_id: Uuid,
    pub role: SquadRole,
}

/// Full set of memberships written for a user in one go
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipPlan {
    #[serde(default)]
    pub teams: Vec<TeamAssignment>,
    #[serde(default)]
    pub squads: Vec<SquadAssignment>,
}

impl MembershipPlan {
    /// Drops repeated seats so unique constraints are never hit
    ///
    /// A team may appear more than once with different roles; a squad only
    /// once, the first assignment wins.
    pub fn deduplicated(mut self) -> Self {
        let mut seen_teams = Vec::new();
        self.teams.retain(|t| {
            let key = (t.team_id, t.role);
            if seen_teams.contains(&key) {
                false
            } else {
                seen_teams.push(key);
                true
            }
        });

        let mut seen_squads = Vec::new();
        self.squads.retain(|s| {
            if seen_squads.contains(&s.squad_id) {
                false
            } else {
                seen_squads.push(s.squad_id);
                true
            }
        });
        self
    }

    pub fn team_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.teams.iter().map(|t| t.team_id)
    }

    pub fn squad_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.squads.iter().map(|s| s.squad_id)
    }

    /// Whether the plan holds exactly the current seats of `team_id`,
    /// counting squad seats of squads owned by that team
    ///
    /// Expects a deduplicated plan that only names seats of `team_id`.
    pub fn matches_team_seats(
        &self,
        team_id: Option<Uuid>,
        teams: &[TeamMembership],
        squads: &[SquadMembership],
    ) -> bool {
        let current_teams: Vec<TeamAssignment> = teams
            .iter()
            .filter(|m| Some(m.team_id) == team_id)
            .map(|m| TeamAssignment {
                team_id: m.team_id,
                role: m.role,
            })
            .collect();
        let current_squads: Vec<SquadAssignment> = squads
            .iter()
            .filter(|m| Some(m.team_id) == team_id)
            .map(|m| SquadAssignment {
                squad_id: m.squad_id,
                role: m.role,
            })
            .collect();

        self.teams.len() == current_teams.len()
            && self.squads.len() == current_squads.len()
            && self.teams.iter().all(|t| current_teams.contains(t))
            && self.squads.iter().all(|s| current_squads.contains(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicate_keeps_distinct_team_roles() {
        let team_id = Uuid::new_v4();
        let squad_id = Uuid::new_v4();
        let plan = MembershipPlan {
            teams: vec![
                TeamAssignment {
                    team_id,
                    role: TeamRole::Member,
                },
                TeamAssignment {
                    team_id,
                    role: TeamRole::Coordinator,
                },
                TeamAssignment {
                    team_id,
                    role: TeamRole::Member,
                },
            ],
            squads: vec![
                SquadAssignment {
                    squad_id,
                    role: SquadRole::Coordinator,
                },
                SquadAssignment {
                    squad_id,
                    role: SquadRole::Member,
                },
            ],
        }
        .deduplicated();

        assert_eq!(plan.teams.len(), 2);
        assert_eq!(plan.squads.len(), 1);
        assert_eq!(plan.squads[0].role, SquadRole::Coordinator);
    }

    #[test]
    fn team_seats_match_only_when_unchanged() {
        let user_id = Uuid::new_v4();
        let team_id = Uuid::new_v4();
        let other_team = Uuid::new_v4();
        let squad_id = Uuid::new_v4();
        let teams = [
            TeamMembership {
                user_id,
                team_id,
                role: TeamRole::President,
            },
            TeamMembership {
                user_id,
                team_id: other_team,
                role: TeamRole::Member,
            },
        ];
        let squads = [SquadMembership {
            user_id,
            squad_id,
            team_id,
            role: SquadRole::Member,
        }];

        let same = MembershipPlan {
            teams: vec![TeamAssignment {
                team_id,
                role: TeamRole::President,
            }],
            squads: vec![SquadAssignment {
                squad_id,
                role: SquadRole::Member,
            }],
        };
        assert!(same.matches_team_seats(Some(team_id), &teams, &squads));

        let emptied = MembershipPlan::default();
        assert!(!emptied.matches_team_seats(Some(team_id), &teams, &squads));

        let demoted = MembershipPlan {
            teams: vec![TeamAssignment {
                team_id,
                role: TeamRole::Member,
            }],
            squads: same.squads.clone(),
        };
        assert!(!demoted.matches_team_seats(Some(team_id), &teams, &squads));

        // Seats elsewhere are not compared
        assert!(emptied.matches_team_seats(None, &teams, &squads));
    }

    #[test]
    fn missing_lists_deserialize_as_empty() {
        let plan: MembershipPlan = serde_json::from_str("{}").unwrap();
        assert!(plan.teams.is_empty());
        assert!(plan.squads.is_empty());
    }
}
