// Access policy for team operations
// A single Operation -> Rule table decides who may do what. Evaluation is a
// pure function of (actor, team, operation).

use serde::Serialize;
use std::fmt;

use crate::domain::errors::DomainError;
use crate::domain::team::value_objects::TeamField;
use crate::domain::team::Team;
use crate::domain::user::Actor;
use crate::domain::user::Role;

/// Operations gated by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    CreateTeam,
    EditTeam,
    DeleteTeam,
    ManageMembers,
    ViewTeam,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::CreateTeam,
        Operation::EditTeam,
        Operation::DeleteTeam,
        Operation::ManageMembers,
        Operation::ViewTeam,
    ];

    /// The rule that governs this operation
    pub fn rule(&self) -> Rule {
        match self {
            Operation::CreateTeam | Operation::DeleteTeam => Rule::PrivilegedOnly,
            Operation::EditTeam | Operation::ManageMembers => Rule::PrivilegedOrAssignedManager,
            Operation::ViewTeam => Rule::AnyAuthenticated,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::CreateTeam => "create team",
            Operation::EditTeam => "edit team",
            Operation::DeleteTeam => "delete team",
            Operation::ManageMembers => "manage team members",
            Operation::ViewTeam => "view team",
        };
        f.write_str(s)
    }
}

/// Access rules an operation can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    PrivilegedOnly,
    /// Privileged roles, or a Team Manager who is the team's assigned manager
    PrivilegedOrAssignedManager,
    AnyAuthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn from_bool(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Which team fields an authorized editor may change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditScope {
    /// Privileged roles: every editable field
    Full,
    /// Assigned Team Manager: description and max size only
    Limited,
}

impl EditScope {
    pub fn permits(&self, field: TeamField) -> bool {
        match self {
            EditScope::Full => matches!(
                field,
                TeamField::Name
                    | TeamField::Description
                    | TeamField::MaxSize
                    | TeamField::TeamManager
                    | TeamField::TeamLeader
                    | TeamField::IsActive
            ),
            EditScope::Limited => matches!(field, TeamField::Description | TeamField::MaxSize),
        }
    }
}

fn is_assigned_manager(actor: &Actor, team: Option<&Team>) -> bool {
    actor.role == Role::TeamManager
        && team.and_then(Team::manager_id).is_some_and(|manager| manager == actor.id)
}

/// Decides whether `actor` may perform `operation` on `team`
///
/// Team-scoped rules deny when no team is given.
///
/// # Example
/// ```
/// use teamdesk_api::domain::policy::{evaluate, Decision, Operation};
/// use teamdesk_api::domain::user::{Actor, Role};
/// use uuid::Uuid;
///
/// let hr = Actor::new(Uuid::new_v4(), Role::HrManager);
/// assert_eq!(evaluate(&hr, None, Operation::CreateTeam), Decision::Allow);
///
/// let employee = Actor::new(Uuid::new_v4(), Role::Employee);
/// assert_eq!(evaluate(&employee, None, Operation::DeleteTeam), Decision::Deny);
/// ```
pub fn evaluate(actor: &Actor, team: Option<&Team>, operation: Operation) -> Decision {
    let allowed = match operation.rule() {
        Rule::PrivilegedOnly => actor.is_privileged(),
        Rule::PrivilegedOrAssignedManager => actor.is_privileged() || is_assigned_manager(actor, team),
        Rule::AnyAuthenticated => true,
    };
    Decision::from_bool(allowed)
}

/// Like [`evaluate`] but returns a `PolicyDenied` error on deny
pub fn authorize(actor: &Actor, team: Option<&Team>, operation: Operation) -> Result<(), DomainError> {
    if evaluate(actor, team, operation).is_allowed() {
        Ok(())
    } else {
        tracing::warn!(
            actor_id = %actor.id,
            role = %actor.role,
            team_id = ?team.map(Team::id),
            %operation,
            "policy denied"
        );
        Err(DomainError::PolicyDenied { operation })
    }
}

/// Edit scope of `actor` on `team`, or `None` when editing is denied
pub fn edit_scope(actor: &Actor, team: &Team) -> Option<EditScope> {
    if actor.is_privileged() {
        Some(EditScope::Full)
    } else if evaluate(actor, Some(team), Operation::EditTeam).is_allowed() {
        Some(EditScope::Limited)
    } else {
        None
    }
}
