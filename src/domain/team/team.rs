use super::events::TeamEvent;
use super::member::Member;
use super::value_objects::{MaxSize, MemberRole, TeamCode, TeamField};
use crate::domain::errors::{ConflictKind, DomainError};
use crate::domain::user::{Role, User};
use crate::domain::validation::{NewTeam, TeamUpdate};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Team aggregate root
///
/// A named, coded group of employees inside a department, with an optional
/// manager and leader.
///
/// # Invariants
/// - Code is non-empty upper-case alphanumeric
/// - Max size stays within 1..=50
/// - Member count never exceeds max size
/// - Each user appears at most once and only Employee-role users join
///
/// # Example
/// ```
/// use teamdesk_api::domain::team::Team;
/// use teamdesk_api::domain::validation::{validate_create, CreateTeamDraft};
/// use uuid::Uuid;
///
/// let draft = CreateTeamDraft {
///     name: "Payments".to_string(),
///     code: "pay".to_string(),
///     department: Some(Uuid::new_v4().to_string()),
///     ..Default::default()
/// };
/// let (team, events) = Team::new(validate_create(&draft).unwrap(), Uuid::new_v4());
///
/// assert_eq!(team.code().as_str(), "PAY");
/// assert_eq!(team.current_size(), 0);
/// assert_eq!(events.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    id: Uuid,
    name: String,
    code: TeamCode,
    description: Option<String>,
    department_id: Uuid,
    manager_id: Option<Uuid>,
    leader_id: Option<Uuid>,
    max_size: MaxSize,
    is_active: bool,
    members: Vec<Member>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Stored revision this copy was loaded at; guards concurrent writes
    version: i64,
}

impl Team {
    /// Creates a new active team with no members
    pub fn new(new_team: NewTeam, created_by: Uuid) -> (Self, Vec<TeamEvent>) {
        let now = Utc::now();
        let team = Self {
            id: Uuid::new_v4(),
            name: new_team.name,
            code: new_team.code,
            description: new_team.description,
            department_id: new_team.department_id,
            manager_id: new_team.manager_id,
            leader_id: new_team.leader_id,
            max_size: new_team.max_size,
            is_active: true,
            members: Vec::new(),
            created_by,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        let events = vec![TeamEvent::Created {
            team_id: team.id,
            code: team.code.to_string(),
            department_id: team.department_id,
            created_by,
        }];

        (team, events)
    }

    /// Applies a validated update
    ///
    /// # Business Rules
    /// - Max size may not drop below the current member count
    /// - Only fields whose value changes are reported in the event
    pub fn apply_update(&mut self, update: TeamUpdate) -> Result<TeamEvent, ConflictKind> {
        if let Some(max_size) = update.max_size {
            if max_size.get() < self.current_size() {
                return Err(ConflictKind::MaxSizeBelowMembership);
            }
        }

        let mut changed = Vec::new();

        if let Some(name) = update.name {
            if name != self.name {
                self.name = name;
                changed.push(TeamField::Name);
            }
        }
        if let Some(description) = update.description {
            if description != self.description {
                self.description = description;
                changed.push(TeamField::Description);
            }
        }
        if let Some(manager_id) = update.manager_id {
            if manager_id != self.manager_id {
                self.manager_id = manager_id;
                changed.push(TeamField::TeamManager);
            }
        }
        if let Some(leader_id) = update.leader_id {
            if leader_id != self.leader_id {
                self.leader_id = leader_id;
                changed.push(TeamField::TeamLeader);
            }
        }
        if let Some(max_size) = update.max_size {
            if max_size != self.max_size {
                self.max_size = max_size;
                changed.push(TeamField::MaxSize);
            }
        }
        if let Some(is_active) = update.is_active {
            if is_active != self.is_active {
                self.is_active = is_active;
                changed.push(TeamField::IsActive);
            }
        }

        if !changed.is_empty() {
            self.updated_at = Utc::now();
        }

        Ok(TeamEvent::Updated {
            team_id: self.id,
            changed,
        })
    }

    /// Checks whether `candidate` could join right now
    ///
    /// Rules are checked in order: capacity, duplicate, eligibility.
    pub fn check_member_addition(&self, candidate: &User) -> Result<(), ConflictKind> {
        if self.is_full() {
            return Err(ConflictKind::CapacityExceeded);
        }
        if self.is_member(candidate.id) {
            return Err(ConflictKind::DuplicateMember);
        }
        if candidate.role != Role::Employee {
            return Err(ConflictKind::NotEligible);
        }
        Ok(())
    }

    /// Adds `candidate` as a member; the team is untouched on rejection
    pub fn add_member(&mut self, candidate: &User, role: MemberRole) -> Result<TeamEvent, ConflictKind> {
        self.check_member_addition(candidate)?;

        let now = Utc::now();
        self.members.push(Member::new(candidate.id, role, now));
        self.updated_at = now;

        Ok(TeamEvent::MemberAdded {
            team_id: self.id,
            user_id: candidate.id,
            role,
        })
    }

    /// Removes a member
    ///
    /// Removing a user who is not a member is `NotFound`, including when
    /// another actor removed them first.
    pub fn remove_member(&mut self, user_id: Uuid) -> Result<TeamEvent, DomainError> {
        let position = self
            .members
            .iter()
            .position(|m| m.user_id == user_id)
            .ok_or_else(|| DomainError::NotFound(format!("User {} is not a member of this team", user_id)))?;

        self.members.remove(position);
        self.updated_at = Utc::now();

        Ok(TeamEvent::MemberRemoved {
            team_id: self.id,
            user_id,
        })
    }

    /// Consumes the team and yields its deletion event
    pub fn into_deleted(self) -> TeamEvent {
        TeamEvent::Deleted {
            team_id: self.id,
            code: self.code.into(),
        }
    }

    // ===== Queries =====

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    pub fn is_full(&self) -> bool {
        self.current_size() >= self.max_size.get()
    }

    /// Derived member count
    pub fn current_size(&self) -> u32 {
        self.members.len() as u32
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &TeamCode {
        &self.code
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn department_id(&self) -> Uuid {
        self.department_id
    }

    pub fn manager_id(&self) -> Option<Uuid> {
        self.manager_id
    }

    pub fn leader_id(&self) -> Option<Uuid> {
        self.leader_id
    }

    pub fn max_size(&self) -> MaxSize {
        self.max_size
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn created_by(&self) -> Uuid {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Records that the current state was stored as the next revision
    pub fn mark_persisted(&mut self) {
        self.version += 1;
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// Bypasses business rule checks; only repository implementations
    /// should call this.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        name: String,
        code: TeamCode,
        description: Option<String>,
        department_id: Uuid,
        manager_id: Option<Uuid>,
        leader_id: Option<Uuid>,
        max_size: MaxSize,
        is_active: bool,
        members: Vec<Member>,
        created_by: Uuid,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: i64,
    ) -> Self {
        Self {
            id,
            name,
            code,
            description,
            department_id,
            manager_id,
            leader_id,
            max_size,
            is_active,
            members,
            created_by,
            created_at,
            updated_at,
            version,
        }
    }
}
