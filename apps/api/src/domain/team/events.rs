use uuid::Uuid;

/// Domain events that occur within the Team aggregate
///
/// Handlers log these once the corresponding write has been persisted.
///
/// # Example
/// ```
/// use teamhub_api::domain::team::TeamEvent;
/// use uuid::Uuid;
///
/// let event = TeamEvent::Created {
///     team_id: Uuid::new_v4(),
///     name: "Robotics".to_string(),
/// };
/// assert_eq!(event.name(), "team.created");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamEvent {
    /// Fired when a team is created
    Created { team_id: Uuid, name: String },
    /// Fired when name, description, images or color change
    Updated { team_id: Uuid },
    /// Fired when president / vice president are replaced
    LeadershipChanged {
        team_id: Uuid,
        president_id: Option<Uuid>,
        vice_president_id: Option<Uuid>,
    },
    CoordinatorAdded { team_id: Uuid, user_id: Uuid },
    CoordinatorRemoved { team_id: Uuid, user_id: Uuid },
    Deleted { team_id: Uuid },
}

impl TeamEvent {
    /// Returns the team_id for this event
    pub fn team_id(&self) -> Uuid {
        match self {
            TeamEvent::Created { team_id, .. }
            | TeamEvent::Updated { team_id }
            | TeamEvent::LeadershipChanged { team_id, .. }
            | TeamEvent::CoordinatorAdded { team_id, .. }
            | TeamEvent::CoordinatorRemoved { team_id, .. }
            | TeamEvent::Deleted { team_id } => *team_id,
        }
    }

    /// Stable event name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            TeamEvent::Created { .. } => "team.created",
            TeamEvent::Updated { .. } => "team.updated",
            TeamEvent::LeadershipChanged { .. } => "team.leadership_changed",
            TeamEvent::CoordinatorAdded { .. } => "team.coordinator_added",
            TeamEvent::CoordinatorRemoved { .. } => "team.coordinator_removed",
            TeamEvent::Deleted { .. } => "team.deleted",
        }
    }

    /// Emits the event through `tracing`
    pub fn record(&self) {
        tracing::info!(event = self.name(), team_id = %self.team_id(), details = ?self, "team event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_carries_its_team() {
        let team_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let events = vec![
            TeamEvent::Created {
                team_id,
                name: "Test".to_string(),
            },
            TeamEvent::Updated { team_id },
            TeamEvent::LeadershipChanged {
                team_id,
                president_id: Some(user_id),
                vice_president_id: None,
            },
            TeamEvent::CoordinatorAdded { team_id, user_id },
            TeamEvent::CoordinatorRemoved { team_id, user_id },
            TeamEvent::Deleted { team_id },
        ];

        for event in events {
            assert_eq!(event.team_id(), team_id);
        }
    }

    #[test]
    fn event_names() {
        let team_id = Uuid::new_v4();
        assert_eq!(TeamEvent::Updated { team_id }.name(), "team.updated");
        assert_eq!(TeamEvent::Deleted { team_id }.name(), "team.deleted");
    }
}
