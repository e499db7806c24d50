use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::department::Department;
use crate::domain::repositories::{
    DepartmentRepository, Page, PageRequest, RepositoryError, TeamQuery, TeamRepository, UserQuery,
    UserRepository,
};
use crate::domain::team::{Team, TeamCode};
use crate::domain::user::{Email, Role, User};

/// In-process TeamRepository backed by a map
///
/// Used when no database is configured and by the test suites.
#[derive(Default)]
pub struct InMemoryTeamRepository {
    teams: RwLock<HashMap<Uuid, Team>>,
}

impl InMemoryTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn insert(&self, team: &Team) -> Result<(), RepositoryError> {
        let mut teams = self.teams.write().await;
        if teams.contains_key(&team.id()) {
            return Err(RepositoryError::UniqueViolation(format!("team id {}", team.id())));
        }
        if teams.values().any(|other| other.code() == team.code()) {
            return Err(RepositoryError::UniqueViolation(format!(
                "team code {}",
                team.code()
            )));
        }
        teams.insert(team.id(), team.clone());
        Ok(())
    }

    async fn update(&self, team: &Team) -> Result<(), RepositoryError> {
        let mut teams = self.teams.write().await;
        let stored = teams
            .get_mut(&team.id())
            .ok_or_else(|| RepositoryError::NotFound(format!("Team {}", team.id())))?;
        if stored.version() != team.version() {
            return Err(RepositoryError::StaleWrite(format!("Team {}", team.id())));
        }

        let mut next = team.clone();
        next.mark_persisted();
        *stored = next;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, RepositoryError> {
        Ok(self.teams.read().await.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &TeamCode) -> Result<Option<Team>, RepositoryError> {
        Ok(self
            .teams
            .read()
            .await
            .values()
            .find(|team| team.code() == code)
            .cloned())
    }

    async fn list(&self, query: &TeamQuery) -> Result<Page<Team>, RepositoryError> {
        let mut matching: Vec<Team> = self
            .teams
            .read()
            .await
            .values()
            .filter(|team| query.matches(team))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(a.code().as_str().cmp(b.code().as_str())));
        Ok(query.page.slice(matching))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.teams
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("Team {}", id)))
    }
}

fn by_name(a: &User, b: &User) -> std::cmp::Ordering {
    (&a.first_name, &a.last_name).cmp(&(&b.first_name, &b.last_name))
}

/// In-process UserRepository
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<Uuid, RepositoryError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::UniqueViolation(format!(
                "user email {}",
                user.email
            )));
        }
        let id = user.id;
        users.insert(id, user);
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<User>, RepositoryError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        users.sort_by(by_name);
        Ok(users)
    }

    async fn list(&self, query: &UserQuery) -> Result<Page<User>, RepositoryError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| query.matches(u))
            .cloned()
            .collect();
        users.sort_by(by_name);
        Ok(query.page.slice(users))
    }
}

/// In-process DepartmentRepository
#[derive(Default)]
pub struct InMemoryDepartmentRepository {
    departments: RwLock<Vec<Department>>,
}

impl InMemoryDepartmentRepository {
    pub fn with_departments(departments: impl IntoIterator<Item = Department>) -> Self {
        let mut departments: Vec<Department> = departments.into_iter().collect();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            departments: RwLock::new(departments),
        }
    }
}

#[async_trait]
impl DepartmentRepository for InMemoryDepartmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Department>, RepositoryError> {
        Ok(self
            .departments
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Department>, RepositoryError> {
        Ok(page.slice(self.departments.read().await.clone()))
    }
}
