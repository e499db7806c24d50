use uuid::Uuid;

use super::value_objects::{MemberRole, TeamField};

/// Domain events that occur within the Team aggregate
///
/// Each accepted mutation produces one event. The directory service logs
/// them as the audit trail of who changed which team.
///
/// # Example
/// ```
/// use teamdesk_api::domain::team::events::TeamEvent;
/// use uuid::Uuid;
///
/// let team_id = Uuid::new_v4();
/// let event = TeamEvent::Deleted { team_id, code: "OPS".to_string() };
/// assert_eq!(event.team_id(), team_id);
/// assert_eq!(event.name(), "team.deleted");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TeamEvent {
    /// Fired when a team is created
    Created {
        team_id: Uuid,
        code: String,
        department_id: Uuid,
        created_by: Uuid,
    },
    /// Fired when team attributes change
    Updated {
        team_id: Uuid,
        /// Fields whose value actually changed
        changed: Vec<TeamField>,
    },
    /// Fired when a user joins the team
    MemberAdded {
        team_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    },
    /// Fired when a user leaves the team
    MemberRemoved { team_id: Uuid, user_id: Uuid },
    /// Fired when the team is hard-deleted
    Deleted { team_id: Uuid, code: String },
}

impl TeamEvent {
    pub fn team_id(&self) -> Uuid {
        match self {
            TeamEvent::Created { team_id, .. }
            | TeamEvent::Updated { team_id, .. }
            | TeamEvent::MemberAdded { team_id, .. }
            | TeamEvent::MemberRemoved { team_id, .. }
            | TeamEvent::Deleted { team_id, .. } => *team_id,
        }
    }

    /// Stable event name used in log records
    pub fn name(&self) -> &'static str {
        match self {
            TeamEvent::Created { .. } => "team.created",
            TeamEvent::Updated { .. } => "team.updated",
            TeamEvent::MemberAdded { .. } => "team.member_added",
            TeamEvent::MemberRemoved { .. } => "team.member_removed",
            TeamEvent::Deleted { .. } => "team.deleted",
        }
    }
}
