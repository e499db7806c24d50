use async_trait::async_trait;
use uuid::Uuid;

use super::{Page, PageRequest, RepositoryError};
use crate::domain::team::{Team, TeamCode};
use crate::domain::user::{Actor, Role};

/// Which teams a listing may return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    All,
    ManagedBy(Uuid),
    LedBy(Uuid),
    MemberOf(Uuid),
}

impl Visibility {
    /// Read scope of an actor
    ///
    /// Privileged roles see every team, managers the teams they manage,
    /// leaders the teams they lead and employees the teams they belong to.
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            role if role.is_privileged() => Visibility::All,
            Role::TeamManager => Visibility::ManagedBy(actor.id),
            Role::TeamLeader => Visibility::LedBy(actor.id),
            _ => Visibility::MemberOf(actor.id),
        }
    }

    pub fn admits(&self, team: &Team) -> bool {
        match *self {
            Visibility::All => true,
            Visibility::ManagedBy(id) => team.manager_id() == Some(id),
            Visibility::LedBy(id) => team.leader_id() == Some(id),
            Visibility::MemberOf(id) => team.is_member(id),
        }
    }
}

/// Filters for a team listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamQuery {
    pub visibility: Visibility,
    /// Case-insensitive substring of name, code or description
    pub search: Option<String>,
    pub department_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub page: PageRequest,
}

impl TeamQuery {
    pub fn all() -> Self {
        Self {
            visibility: Visibility::All,
            search: None,
            department_id: None,
            is_active: None,
            page: PageRequest::default(),
        }
    }

    /// Applies every filter except paging
    pub fn matches(&self, team: &Team) -> bool {
        if !self.visibility.admits(team) {
            return false;
        }
        if let Some(department_id) = self.department_id {
            if team.department_id() != department_id {
                return false;
            }
        }
        if let Some(is_active) = self.is_active {
            if team.is_active() != is_active {
                return false;
            }
        }
        match &self.search {
            None => true,
            Some(search) => {
                let needle = search.to_lowercase();
                team.name().to_lowercase().contains(&needle)
                    || team.code().as_str().to_lowercase().contains(&needle)
                    || team
                        .description()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Repository trait for the Team aggregate
///
/// A team is persisted together with its members. Writes are optimistic:
/// `update` only succeeds against the revision the team was loaded at.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Store a new team; a code clash is `UniqueViolation`
    async fn insert(&self, team: &Team) -> Result<(), RepositoryError>;

    /// Replace a stored team and its member set
    ///
    /// Fails with `StaleWrite` when the stored revision differs from
    /// `team.version()` and with `NotFound` when the team no longer exists.
    /// On success the stored revision is `team.version() + 1`.
    async fn update(&self, team: &Team) -> Result<(), RepositoryError>;

    /// Find a team by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, RepositoryError>;

    /// Find a team by its unique code
    async fn find_by_code(&self, code: &TeamCode) -> Result<Option<Team>, RepositoryError>;

    /// Filtered page of teams, newest first
    async fn list(&self, query: &TeamQuery) -> Result<Page<Team>, RepositoryError>;

    /// Hard-delete a team; a missing id is `NotFound`
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
