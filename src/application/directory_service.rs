use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::department::Department;
use crate::domain::errors::{ConflictKind, DomainError, DomainResult};
use crate::domain::policy::{self, Operation};
use crate::domain::repositories::{
    DepartmentRepository, Page, PageRequest, RepositoryError, TeamQuery, TeamRepository,
    UserRepository, Visibility, MAX_PAGE_SIZE,
};
use crate::domain::team::{Member, Team, TeamEvent, TeamField};
use crate::domain::user::{Actor, Role, User, UserSummary};
use crate::domain::validation::{
    self, AddMemberDraft, CreateTeamDraft, UpdateTeamDraft, ValidationErrors, ValidationReason,
};

/// Listing filters supplied by the caller; read scope is added by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamFilter {
    pub search: Option<String>,
    pub department_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub page: PageRequest,
}

/// A team with its references resolved for presentation
#[derive(Debug, Clone, PartialEq)]
pub struct TeamDetails {
    pub team: Team,
    pub department: Option<Department>,
    pub manager: Option<UserSummary>,
    pub leader: Option<UserSummary>,
    pub members: Vec<(Member, Option<UserSummary>)>,
}

/// Team Directory Service
///
/// The authoritative gate for team mutations. A use case on an existing
/// team first checks the read scope, then the access policy, then payload
/// validation and the aggregate rules. Writes are optimistic: a team
/// changed or deleted since it was loaded is rejected, never overwritten.
pub struct TeamDirectoryService {
    teams: Arc<dyn TeamRepository>,
    users: Arc<dyn UserRepository>,
    departments: Arc<dyn DepartmentRepository>,
}

impl TeamDirectoryService {
    pub fn new(
        teams: Arc<dyn TeamRepository>,
        users: Arc<dyn UserRepository>,
        departments: Arc<dyn DepartmentRepository>,
    ) -> Self {
        Self {
            teams,
            users,
            departments,
        }
    }

    // ===== Queries =====

    /// Lists the teams visible to `actor`
    pub async fn list_teams(&self, actor: &Actor, filter: TeamFilter) -> DomainResult<Page<Team>> {
        policy::authorize(actor, None, Operation::ViewTeam)?;

        let query = TeamQuery {
            visibility: Visibility::for_actor(actor),
            search: filter.search.filter(|s| !s.trim().is_empty()),
            department_id: filter.department_id,
            is_active: filter.is_active,
            page: filter.page,
        };
        debug!(actor_id = %actor.id, ?query, "listing teams");

        Ok(self.teams.list(&query).await?)
    }

    /// Fetches one team; teams outside the actor's read scope are `NotFound`
    pub async fn get_team(&self, actor: &Actor, team_id: Uuid) -> DomainResult<Team> {
        let team = self.load_visible(actor, team_id).await?;
        policy::authorize(actor, Some(&team), Operation::ViewTeam)?;
        Ok(team)
    }

    /// Teams whose assigned manager is `actor`
    pub async fn managed_teams(&self, actor: &Actor) -> DomainResult<Vec<Team>> {
        let query = TeamQuery {
            visibility: Visibility::ManagedBy(actor.id),
            page: PageRequest::new(Some(1), Some(MAX_PAGE_SIZE)),
            ..TeamQuery::all()
        };
        Ok(self.teams.list(&query).await?.items)
    }

    /// The team `actor` leads, or else the first team they belong to
    pub async fn my_team(&self, actor: &Actor) -> DomainResult<Team> {
        for visibility in [Visibility::LedBy(actor.id), Visibility::MemberOf(actor.id)] {
            let query = TeamQuery {
                visibility,
                page: PageRequest::new(Some(1), Some(1)),
                ..TeamQuery::all()
            };
            if let Some(team) = self.teams.list(&query).await?.items.into_iter().next() {
                return Ok(team);
            }
        }
        Err(DomainError::NotFound("You are not assigned to any team".to_string()))
    }

    /// Employees that can be added to the team
    pub async fn member_candidates(&self, actor: &Actor, team_id: Uuid) -> DomainResult<Vec<User>> {
        let team = self.load_visible(actor, team_id).await?;
        policy::authorize(actor, Some(&team), Operation::ManageMembers)?;

        let employees = self.users.find_by_role(Role::Employee).await?;
        Ok(validation::eligible_candidates(&team, &employees)
            .into_iter()
            .cloned()
            .collect())
    }

    // ===== Mutations =====

    pub async fn create_team(&self, actor: &Actor, draft: CreateTeamDraft) -> DomainResult<Team> {
        policy::authorize(actor, None, Operation::CreateTeam)?;

        let new_team = validation::validate_create(&draft)?;

        let mut errors = ValidationErrors::new();
        self.check_department(new_team.department_id, &mut errors).await?;
        self.check_assignee(TeamField::TeamManager, new_team.manager_id, &mut errors)
            .await?;
        self.check_assignee(TeamField::TeamLeader, new_team.leader_id, &mut errors)
            .await?;
        if !errors.is_empty() {
            return Err(errors.into());
        }

        if self.teams.find_by_code(&new_team.code).await?.is_some() {
            return Err(ConflictKind::DuplicateCode.into());
        }

        let (team, events) = Team::new(new_team, actor.id);
        self.teams.insert(&team).await.map_err(|e| -> DomainError { match e {
            RepositoryError::UniqueViolation(_) => ConflictKind::DuplicateCode.into(),
            other => other.into(),
        }})?;
        record(actor, &events);

        Ok(team)
    }

    /// Applies an edit within the actor's edit scope
    ///
    /// Fields outside the scope are dropped rather than rejected.
    pub async fn update_team(&self, actor: &Actor, team_id: Uuid, draft: UpdateTeamDraft) -> DomainResult<Team> {
        let mut team = self.load_visible(actor, team_id).await?;
        policy::authorize(actor, Some(&team), Operation::EditTeam)?;
        let scope = policy::edit_scope(actor, &team).ok_or(DomainError::PolicyDenied {
            operation: Operation::EditTeam,
        })?;

        let ignored: Vec<TeamField> = draft
            .supplied_fields()
            .into_iter()
            .filter(|field| !scope.permits(*field))
            .collect();
        if !ignored.is_empty() {
            debug!(actor_id = %actor.id, %team_id, ?ignored, "dropping fields outside edit scope");
        }

        let update = validation::validate_update(&draft, scope)?;

        let mut errors = ValidationErrors::new();
        if let Some(manager_id) = update.manager_id {
            self.check_assignee(TeamField::TeamManager, manager_id, &mut errors)
                .await?;
        }
        if let Some(leader_id) = update.leader_id {
            self.check_assignee(TeamField::TeamLeader, leader_id, &mut errors)
                .await?;
        }
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let event = team.apply_update(update)?;
        self.store(&mut team).await?;
        record(actor, &[event]);

        Ok(team)
    }

    /// Hard-deletes a team
    pub async fn delete_team(&self, actor: &Actor, team_id: Uuid) -> DomainResult<()> {
        policy::authorize(actor, None, Operation::DeleteTeam)?;

        let team = self.load(team_id).await?;
        self.teams.delete(team_id).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => team_not_found(team_id),
            other => other.into(),
        })?;
        record(actor, &[team.into_deleted()]);

        Ok(())
    }

    /// Adds an Employee to the team
    ///
    /// Rejections in order: missing user id, full team, existing member,
    /// non-Employee candidate. A rejected add leaves the team unchanged.
    pub async fn add_member(&self, actor: &Actor, team_id: Uuid, draft: AddMemberDraft) -> DomainResult<Team> {
        let mut team = self.load_visible(actor, team_id).await?;
        policy::authorize(actor, Some(&team), Operation::ManageMembers)?;

        let member = validation::validate_add_member(&draft)?;
        if team.is_full() {
            return Err(ConflictKind::CapacityExceeded.into());
        }

        let candidate = self
            .users
            .find_by_id(member.user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User not found: {}", member.user_id)))?;

        let event = team.add_member(&candidate, member.role)?;
        self.store(&mut team).await?;
        record(actor, &[event]);

        Ok(team)
    }

    /// Removes a member; a user who is not a member is `NotFound`
    pub async fn remove_member(&self, actor: &Actor, team_id: Uuid, user_id: Uuid) -> DomainResult<Team> {
        let mut team = self.load_visible(actor, team_id).await?;
        policy::authorize(actor, Some(&team), Operation::ManageMembers)?;

        let event = team.remove_member(user_id)?;
        self.store(&mut team).await?;
        record(actor, &[event]);

        Ok(team)
    }

    // ===== Presentation =====

    /// Resolves department and user references of one team
    pub async fn describe(&self, team: Team) -> DomainResult<TeamDetails> {
        let mut details = self.describe_all(vec![team]).await?;
        details
            .pop()
            .ok_or_else(|| DomainError::NotFound("Team not found".to_string()))
    }

    /// Resolves references of many teams, looking each record up once
    pub async fn describe_all(&self, teams: Vec<Team>) -> DomainResult<Vec<TeamDetails>> {
        let mut users: HashMap<Uuid, Option<UserSummary>> = HashMap::new();
        let mut departments: HashMap<Uuid, Option<Department>> = HashMap::new();

        for team in &teams {
            let referenced = team
                .manager_id()
                .into_iter()
                .chain(team.leader_id())
                .chain(team.members().iter().map(|m| m.user_id));
            for user_id in referenced {
                if !users.contains_key(&user_id) {
                    let user = self.users.find_by_id(user_id).await?;
                    users.insert(user_id, user.as_ref().map(UserSummary::from));
                }
            }
            if !departments.contains_key(&team.department_id()) {
                let department = self.departments.find_by_id(team.department_id()).await?;
                departments.insert(team.department_id(), department);
            }
        }

        let lookup = |id: Option<Uuid>| id.and_then(|id| users.get(&id).cloned().flatten());

        Ok(teams
            .into_iter()
            .map(|team| TeamDetails {
                department: departments.get(&team.department_id()).cloned().flatten(),
                manager: lookup(team.manager_id()),
                leader: lookup(team.leader_id()),
                members: team
                    .members()
                    .iter()
                    .map(|m| (m.clone(), lookup(Some(m.user_id))))
                    .collect(),
                team,
            })
            .collect())
    }

    // ===== Helpers =====

    async fn load(&self, team_id: Uuid) -> DomainResult<Team> {
        self.teams
            .find_by_id(team_id)
            .await?
            .ok_or_else(|| team_not_found(team_id))
    }

    /// Loads a team within the actor's read scope; other teams are `NotFound`
    async fn load_visible(&self, actor: &Actor, team_id: Uuid) -> DomainResult<Team> {
        let team = self.load(team_id).await?;
        if !Visibility::for_actor(actor).admits(&team) {
            return Err(team_not_found(team_id));
        }
        Ok(team)
    }

    /// Writes back a loaded team, failing if it changed or vanished since
    async fn store(&self, team: &mut Team) -> DomainResult<()> {
        let team_id = team.id();
        self.teams.update(team).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => team_not_found(team_id),
            RepositoryError::StaleWrite(_) => {
                debug!(%team_id, "rejected stale team write");
                ConflictKind::ConcurrentModification.into()
            }
            other => other.into(),
        })?;
        team.mark_persisted();
        Ok(())
    }

    async fn check_department(&self, department_id: Uuid, errors: &mut ValidationErrors) -> DomainResult<()> {
        if self.departments.find_by_id(department_id).await?.is_none() {
            errors.add_with_message(
                TeamField::Department,
                ValidationReason::Reference,
                "Department does not exist",
            );
        }
        Ok(())
    }

    /// Manager assignments must name a Team Manager, leader assignments a Team Leader
    async fn check_assignee(
        &self,
        field: TeamField,
        user_id: Option<Uuid>,
        errors: &mut ValidationErrors,
    ) -> DomainResult<()> {
        let Some(user_id) = user_id else {
            return Ok(());
        };
        let expected = match field {
            TeamField::TeamLeader => Role::TeamLeader,
            _ => Role::TeamManager,
        };

        match self.users.find_by_id(user_id).await? {
            Some(user) if user.role == expected => {}
            Some(_) => errors.add_with_message(
                field,
                ValidationReason::Reference,
                format!("Selected user is not a {}", expected),
            ),
            None => errors.add_with_message(
                field,
                ValidationReason::Reference,
                format!("Selected {} does not exist", expected),
            ),
        }
        Ok(())
    }
}

fn team_not_found(team_id: Uuid) -> DomainError {
    DomainError::NotFound(format!("Team not found: {}", team_id))
}

fn record(actor: &Actor, events: &[TeamEvent]) {
    for event in events {
        info!(
            event = event.name(),
            team_id = %event.team_id(),
            actor_id = %actor.id,
            role = %actor.role,
            "team changed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::Email;
    use crate::domain::validation::ValidationReason;
    use crate::infrastructure::repositories::{
        InMemoryDepartmentRepository, InMemoryTeamRepository, InMemoryUserRepository,
    };
    use crate::domain::team::TeamCode;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::Barrier;

    /// Team store that parks each gated load at its barriers, so several
    /// use cases can be made to work from the same snapshot
    struct GatedTeams {
        inner: InMemoryTeamRepository,
        gates: Mutex<VecDeque<Vec<Arc<Barrier>>>>,
    }

    impl GatedTeams {
        fn new() -> Self {
            Self {
                inner: InMemoryTeamRepository::new(),
                gates: Mutex::new(VecDeque::new()),
            }
        }

        fn hold_next_load(&self, barriers: Vec<Arc<Barrier>>) {
            self.gates.lock().unwrap().push_back(barriers);
        }
    }

    #[async_trait]
    impl TeamRepository for GatedTeams {
        async fn insert(&self, team: &Team) -> Result<(), RepositoryError> {
            self.inner.insert(team).await
        }

        async fn update(&self, team: &Team) -> Result<(), RepositoryError> {
            self.inner.update(team).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, RepositoryError> {
            let team = self.inner.find_by_id(id).await?;
            let gate = self.gates.lock().unwrap().pop_front();
            for barrier in gate.into_iter().flatten() {
                barrier.wait().await;
            }
            Ok(team)
        }

        async fn find_by_code(&self, code: &TeamCode) -> Result<Option<Team>, RepositoryError> {
            self.inner.find_by_code(code).await
        }

        async fn list(&self, query: &TeamQuery) -> Result<Page<Team>, RepositoryError> {
            self.inner.list(query).await
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
            self.inner.delete(id).await
        }
    }

    struct Fixture {
        service: TeamDirectoryService,
        department: Uuid,
        admin: Actor,
        manager: User,
        leader: User,
        employees: Vec<User>,
    }

    fn user(first_name: &str, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            email: Email::new(format!("{}@corp.io", first_name.to_lowercase())).unwrap(),
            password_hash: String::new(),
            role,
            department_id: None,
            is_active: true,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(InMemoryTeamRepository::new()))
    }

    fn fixture_with(teams: Arc<dyn TeamRepository>) -> Fixture {
        let department = Department {
            id: Uuid::new_v4(),
            name: "Engineering".to_string(),
            code: "ENG".to_string(),
            is_active: true,
        };
        let admin = user("Ada", Role::Admin);
        let manager = user("Max", Role::TeamManager);
        let leader = user("Lea", Role::TeamLeader);
        let employees: Vec<User> = ["Eve", "Eli", "Emo"]
            .iter()
            .map(|name| user(name, Role::Employee))
            .collect();

        let mut all = vec![admin.clone(), manager.clone(), leader.clone()];
        all.extend(employees.iter().cloned());

        Fixture {
            service: TeamDirectoryService::new(
                teams,
                Arc::new(InMemoryUserRepository::with_users(all)),
                Arc::new(InMemoryDepartmentRepository::with_departments(vec![department.clone()])),
            ),
            department: department.id,
            admin: admin.actor(),
            manager,
            leader,
            employees,
        }
    }

    fn draft(fx: &Fixture, code: &str, max_size: u32) -> CreateTeamDraft {
        CreateTeamDraft {
            name: format!("Team {}", code),
            code: code.to_string(),
            description: Some("Builds things".to_string()),
            department: Some(fx.department.to_string()),
            team_manager: Some(fx.manager.id.to_string()),
            team_leader: Some(fx.leader.id.to_string()),
            max_size: Some(json!(max_size)),
        }
    }

    fn add(user: &User) -> AddMemberDraft {
        AddMemberDraft {
            user_id: Some(user.id.to_string()),
            role: None,
        }
    }

    #[tokio::test]
    async fn admin_creates_team_with_normalized_code() {
        let fx = fixture();

        let team = fx.service.create_team(&fx.admin, draft(&fx, "dev1", 5)).await.unwrap();

        assert_eq!(team.code().as_str(), "DEV1");
        assert_eq!(team.manager_id(), Some(fx.manager.id));
        assert_eq!(team.created_by(), fx.admin.id);
        assert_eq!(team.current_size(), 0);
    }

    #[tokio::test]
    async fn non_privileged_cannot_create() {
        let fx = fixture();

        let result = fx
            .service
            .create_team(&fx.manager.actor(), draft(&fx, "DEV1", 5))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::PolicyDenied {
                operation: Operation::CreateTeam
            })
        ));
    }

    #[tokio::test]
    async fn duplicate_code_conflicts() {
        let fx = fixture();
        fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();

        let result = fx.service.create_team(&fx.admin, draft(&fx, "dev1", 5)).await;

        assert!(matches!(
            result,
            Err(DomainError::Conflict(ConflictKind::DuplicateCode))
        ));
    }

    #[tokio::test]
    async fn unknown_department_and_wrong_role_are_reference_errors() {
        let fx = fixture();
        let mut draft = draft(&fx, "DEV1", 5);
        draft.department = Some(Uuid::new_v4().to_string());
        draft.team_manager = Some(fx.employees[0].id.to_string());

        let Err(DomainError::Validation(errors)) = fx.service.create_team(&fx.admin, draft).await else {
            panic!("expected validation errors");
        };

        assert_eq!(errors.reason(TeamField::Department), Some(ValidationReason::Reference));
        assert_eq!(errors.reason(TeamField::TeamManager), Some(ValidationReason::Reference));
        assert_eq!(errors.get(TeamField::TeamLeader), None);
    }

    #[tokio::test]
    async fn assigned_manager_edits_only_limited_fields() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        let update = UpdateTeamDraft {
            name: Some("Renamed".to_string()),
            description: Some(Some("New focus".to_string())),
            max_size: Some(json!(8)),
            is_active: Some(false),
            ..Default::default()
        };

        let updated = fx
            .service
            .update_team(&fx.manager.actor(), team.id(), update)
            .await
            .unwrap();

        assert_eq!(updated.name(), "Team DEV1");
        assert!(updated.is_active());
        assert_eq!(updated.description(), Some("New focus"));
        assert_eq!(updated.max_size().get(), 8);
    }

    #[tokio::test]
    async fn other_manager_sees_team_as_missing() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        let stranger = Actor::new(Uuid::new_v4(), Role::TeamManager);

        let result = fx
            .service
            .update_team(&stranger, team.id(), UpdateTeamDraft::default())
            .await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn member_employee_cannot_edit() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[0])).await.unwrap();

        let result = fx
            .service
            .update_team(&fx.employees[0].actor(), team.id(), UpdateTeamDraft::default())
            .await;

        assert!(matches!(
            result,
            Err(DomainError::PolicyDenied {
                operation: Operation::EditTeam
            })
        ));
    }

    #[tokio::test]
    async fn member_routes_hide_teams_outside_read_scope() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[0])).await.unwrap();
        let outsider = fx.employees[1].actor();

        let added = fx.service.add_member(&outsider, team.id(), add(&fx.employees[2])).await;
        let removed = fx
            .service
            .remove_member(&outsider, team.id(), fx.employees[0].id)
            .await;
        let candidates = fx.service.member_candidates(&outsider, team.id()).await;

        assert!(matches!(added, Err(DomainError::NotFound(_))));
        assert!(matches!(removed, Err(DomainError::NotFound(_))));
        assert!(matches!(candidates, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_of_missing_team_is_not_found() {
        let fx = fixture();

        let result = fx
            .service
            .update_team(&fx.admin, Uuid::new_v4(), UpdateTeamDraft::default())
            .await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn members_are_capped_by_max_size() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 2)).await.unwrap();
        let manager = fx.manager.actor();

        fx.service.add_member(&manager, team.id(), add(&fx.employees[0])).await.unwrap();
        fx.service.add_member(&manager, team.id(), add(&fx.employees[1])).await.unwrap();
        let result = fx.service.add_member(&manager, team.id(), add(&fx.employees[2])).await;

        assert!(matches!(
            result,
            Err(DomainError::Conflict(ConflictKind::CapacityExceeded))
        ));
        let stored = fx.service.get_team(&fx.admin, team.id()).await.unwrap();
        assert_eq!(stored.current_size(), 2);
    }

    #[tokio::test]
    async fn duplicate_and_ineligible_members_are_rejected() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[0])).await.unwrap();

        let duplicate = fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[0])).await;
        let leader = fx.service.add_member(&fx.admin, team.id(), add(&fx.leader)).await;

        assert!(matches!(
            duplicate,
            Err(DomainError::Conflict(ConflictKind::DuplicateMember))
        ));
        assert!(matches!(
            leader,
            Err(DomainError::Conflict(ConflictKind::NotEligible))
        ));
    }

    #[tokio::test]
    async fn missing_user_id_is_required() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();

        let Err(DomainError::Validation(errors)) = fx
            .service
            .add_member(&fx.admin, team.id(), AddMemberDraft::default())
            .await
        else {
            panic!("expected validation errors");
        };

        assert_eq!(errors.reason(TeamField::UserId), Some(ValidationReason::Required));
    }

    #[tokio::test]
    async fn employee_cannot_manage_members() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[0])).await.unwrap();

        let result = fx
            .service
            .add_member(&fx.employees[0].actor(), team.id(), add(&fx.employees[1]))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::PolicyDenied {
                operation: Operation::ManageMembers
            })
        ));
    }

    #[tokio::test]
    async fn removing_non_member_is_not_found() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[0])).await.unwrap();

        let missing = fx
            .service
            .remove_member(&fx.admin, team.id(), fx.employees[1].id)
            .await;
        let removed = fx
            .service
            .remove_member(&fx.admin, team.id(), fx.employees[0].id)
            .await
            .unwrap();

        assert!(matches!(missing, Err(DomainError::NotFound(_))));
        assert_eq!(removed.current_size(), 0);
    }

    #[tokio::test]
    async fn candidates_exclude_members() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[0])).await.unwrap();

        let candidates = fx.service.member_candidates(&fx.admin, team.id()).await.unwrap();

        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|u| u.id != fx.employees[0].id));
        assert!(candidates.iter().all(|u| u.role == Role::Employee));
    }

    #[tokio::test]
    async fn listing_is_narrowed_by_role() {
        let fx = fixture();
        let managed = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        let mut other = draft(&fx, "OPS", 5);
        other.team_manager = None;
        other.team_leader = None;
        fx.service.create_team(&fx.admin, other).await.unwrap();
        fx.service.add_member(&fx.admin, managed.id(), add(&fx.employees[0])).await.unwrap();

        let admin_view = fx.service.list_teams(&fx.admin, TeamFilter::default()).await.unwrap();
        let manager_view = fx
            .service
            .list_teams(&fx.manager.actor(), TeamFilter::default())
            .await
            .unwrap();
        let outsider_view = fx
            .service
            .list_teams(&fx.employees[1].actor(), TeamFilter::default())
            .await
            .unwrap();

        assert_eq!(admin_view.total, 2);
        assert_eq!(manager_view.total, 1);
        assert_eq!(manager_view.items[0].id(), managed.id());
        assert_eq!(outsider_view.total, 0);

        let hidden = fx.service.get_team(&fx.employees[1].actor(), managed.id()).await;
        assert!(matches!(hidden, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn my_team_prefers_led_team() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[0])).await.unwrap();

        let led = fx.service.my_team(&fx.leader.actor()).await.unwrap();
        let joined = fx.service.my_team(&fx.employees[0].actor()).await.unwrap();
        let nothing = fx.service.my_team(&fx.employees[1].actor()).await;

        assert_eq!(led.id(), team.id());
        assert_eq!(joined.id(), team.id());
        assert!(matches!(nothing, Err(DomainError::NotFound(_))));
        assert_eq!(fx.service.managed_teams(&fx.manager.actor()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn only_privileged_delete() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();

        let denied = fx.service.delete_team(&fx.manager.actor(), team.id()).await;
        fx.service.delete_team(&fx.admin, team.id()).await.unwrap();
        let gone = fx.service.get_team(&fx.admin, team.id()).await;

        assert!(matches!(denied, Err(DomainError::PolicyDenied { .. })));
        assert!(matches!(gone, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn describe_resolves_references() {
        let fx = fixture();
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        let team = fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[0])).await.unwrap();

        let details = fx.service.describe(team).await.unwrap();

        assert_eq!(details.department.map(|d| d.code), Some("ENG".to_string()));
        assert_eq!(details.manager.map(|m| m.id), Some(fx.manager.id));
        assert_eq!(details.leader.map(|l| l.first_name), Some("Lea".to_string()));
        assert_eq!(details.members.len(), 1);
        assert_eq!(
            details.members[0].1.as_ref().map(|u| u.id),
            Some(fx.employees[0].id)
        );
    }

    #[tokio::test]
    async fn concurrent_adds_never_lose_a_member() {
        let teams = Arc::new(GatedTeams::new());
        let fx = fixture_with(teams.clone());
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        let both_loaded = Arc::new(Barrier::new(2));
        teams.hold_next_load(vec![both_loaded.clone()]);
        teams.hold_next_load(vec![both_loaded]);

        let (first, second) = tokio::join!(
            fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[0])),
            fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[1])),
        );

        let winner = match (&first, &second) {
            (Ok(_), Err(DomainError::Conflict(ConflictKind::ConcurrentModification))) => fx.employees[0].id,
            (Err(DomainError::Conflict(ConflictKind::ConcurrentModification)), Ok(_)) => fx.employees[1].id,
            other => panic!("expected exactly one add to win, got {:?}", other),
        };
        let stored = fx.service.get_team(&fx.admin, team.id()).await.unwrap();
        assert_eq!(stored.current_size(), 1);
        assert!(stored.is_member(winner));

        let retried = if winner == fx.employees[0].id { &fx.employees[1] } else { &fx.employees[0] };
        let after_retry = fx.service.add_member(&fx.admin, team.id(), add(retried)).await.unwrap();
        assert_eq!(after_retry.current_size(), 2);
    }

    #[tokio::test]
    async fn concurrent_removes_apply_once() {
        let teams = Arc::new(GatedTeams::new());
        let fx = fixture_with(teams.clone());
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        fx.service.add_member(&fx.admin, team.id(), add(&fx.employees[0])).await.unwrap();
        let both_loaded = Arc::new(Barrier::new(2));
        teams.hold_next_load(vec![both_loaded.clone()]);
        teams.hold_next_load(vec![both_loaded]);

        let manager = fx.manager.actor();
        let (first, second) = tokio::join!(
            fx.service.remove_member(&fx.admin, team.id(), fx.employees[0].id),
            fx.service.remove_member(&manager, team.id(), fx.employees[0].id),
        );

        let outcomes = [&first, &second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes.iter().any(|r| matches!(
            r,
            Err(DomainError::Conflict(ConflictKind::ConcurrentModification))
        )));
        let stored = fx.service.get_team(&fx.admin, team.id()).await.unwrap();
        assert_eq!(stored.current_size(), 0);
    }

    #[tokio::test]
    async fn update_racing_delete_does_not_recreate_team() {
        let teams = Arc::new(GatedTeams::new());
        let fx = fixture_with(teams.clone());
        let team = fx.service.create_team(&fx.admin, draft(&fx, "DEV1", 5)).await.unwrap();
        let loaded = Arc::new(Barrier::new(2));
        let deleted = Arc::new(Barrier::new(2));
        teams.hold_next_load(vec![loaded.clone(), deleted.clone()]);

        let update = UpdateTeamDraft {
            description: Some(Some("Late edit".to_string())),
            ..Default::default()
        };
        let (updated, removed) = tokio::join!(
            fx.service.update_team(&fx.admin, team.id(), update),
            async {
                loaded.wait().await;
                let removed = fx.service.delete_team(&fx.admin, team.id()).await;
                deleted.wait().await;
                removed
            },
        );

        removed.unwrap();
        assert!(matches!(updated, Err(DomainError::NotFound(_))));
        let gone = fx.service.get_team(&fx.admin, team.id()).await;
        assert!(matches!(gone, Err(DomainError::NotFound(_))));
        let listed = fx.service.list_teams(&fx.admin, TeamFilter::default()).await.unwrap();
        assert_eq!(listed.total, 0);
    }
}
