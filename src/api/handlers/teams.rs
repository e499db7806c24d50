use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::JwtAuth;
use crate::api::state::AppState;
use crate::application::{TeamDetails, TeamFilter};
use crate::domain::repositories::PageRequest;
use crate::domain::team::{MemberRole, Team};
use crate::domain::user::UserSummary;
use crate::domain::validation::{AddMemberDraft, CreateTeamDraft, UpdateTeamDraft};

/// Query string of `GET /api/teams`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTeamsParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub department: Option<String>,
    pub is_active: Option<String>,
}

impl ListTeamsParams {
    /// Blank filters are ignored; malformed ones are rejected
    pub fn into_filter(self) -> Result<TeamFilter, ApiError> {
        let department_id = match self.department.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| ApiError::bad_request("department must be a valid id"))?,
            ),
        };
        let is_active = match self.is_active.as_deref().map(str::trim) {
            None | Some("") => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(_) => return Err(ApiError::bad_request("isActive must be true or false")),
        };

        Ok(TeamFilter {
            search: self.search,
            department_id,
            is_active,
            page: PageRequest::new(self.page, self.limit),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRef {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub user_id: Uuid,
    pub role: MemberRole,
    pub joined_date: DateTime<Utc>,
    pub user: Option<UserSummary>,
}

/// A team as returned to clients, references resolved
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub department: DepartmentRef,
    pub team_manager: Option<UserSummary>,
    pub team_leader: Option<UserSummary>,
    pub max_size: u32,
    pub current_size: u32,
    pub is_full: bool,
    pub is_active: bool,
    pub members: Vec<MemberResponse>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TeamDetails> for TeamResponse {
    fn from(details: TeamDetails) -> Self {
        let team = details.team;
        Self {
            id: team.id(),
            name: team.name().to_string(),
            code: team.code().to_string(),
            description: team.description().map(str::to_string),
            department: DepartmentRef {
                id: team.department_id(),
                name: details.department.as_ref().map(|d| d.name.clone()),
                code: details.department.map(|d| d.code),
            },
            team_manager: details.manager,
            team_leader: details.leader,
            max_size: team.max_size().get(),
            current_size: team.current_size(),
            is_full: team.is_full(),
            is_active: team.is_active(),
            members: details
                .members
                .into_iter()
                .map(|(member, user)| MemberResponse {
                    user_id: member.user_id,
                    role: member.role,
                    joined_date: member.joined_date,
                    user,
                })
                .collect(),
            created_by: team.created_by(),
            created_at: team.created_at(),
            updated_at: team.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamListResponse {
    pub success: bool,
    pub teams: Vec<TeamResponse>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

#[derive(Debug, Serialize)]
pub struct TeamsResponse {
    pub success: bool,
    pub teams: Vec<TeamResponse>,
}

#[derive(Debug, Serialize)]
pub struct SingleTeamResponse {
    pub success: bool,
    pub team: TeamResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CandidatesResponse {
    pub success: bool,
    pub users: Vec<UserSummary>,
}

async fn single(state: &AppState, team: Team) -> Result<Json<SingleTeamResponse>, ApiError> {
    let details = state.directory.describe(team).await?;
    Ok(Json(SingleTeamResponse {
        success: true,
        team: details.into(),
    }))
}

/// List teams visible to the caller
///
/// GET /api/teams
pub async fn list_teams(
    State(state): State<AppState>,
    JwtAuth(actor): JwtAuth,
    params: Result<Query<ListTeamsParams>, QueryRejection>,
) -> Result<Json<TeamListResponse>, ApiError> {
    let Query(params) = params?;
    let page = state.directory.list_teams(&actor, params.into_filter()?).await?;

    let total_pages = page.total_pages();
    let teams = state.directory.describe_all(page.items).await?;

    Ok(Json(TeamListResponse {
        success: true,
        teams: teams.into_iter().map(TeamResponse::from).collect(),
        total: page.total,
        total_pages,
        current_page: page.page,
    }))
}

/// Teams the caller manages
///
/// GET /api/teams/my-teams
pub async fn my_teams(
    State(state): State<AppState>,
    JwtAuth(actor): JwtAuth,
) -> Result<Json<TeamsResponse>, ApiError> {
    let teams = state.directory.managed_teams(&actor).await?;
    let teams = state.directory.describe_all(teams).await?;

    Ok(Json(TeamsResponse {
        success: true,
        teams: teams.into_iter().map(TeamResponse::from).collect(),
    }))
}

/// The team the caller leads or belongs to
///
/// GET /api/teams/my-team
pub async fn my_team(
    State(state): State<AppState>,
    JwtAuth(actor): JwtAuth,
) -> Result<Json<SingleTeamResponse>, ApiError> {
    let team = state.directory.my_team(&actor).await?;
    single(&state, team).await
}

/// Get a team by ID
///
/// GET /api/teams/:id
pub async fn get_team(
    State(state): State<AppState>,
    JwtAuth(actor): JwtAuth,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SingleTeamResponse>, ApiError> {
    let Path(id) = id?;
    let team = state.directory.get_team(&actor, id).await?;
    single(&state, team).await
}

/// Create a new team
///
/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    JwtAuth(actor): JwtAuth,
    payload: Result<Json<CreateTeamDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<SingleTeamResponse>), ApiError> {
    let Json(draft) = payload?;
    let team = state.directory.create_team(&actor, draft).await?;

    Ok((StatusCode::CREATED, single(&state, team).await?))
}

/// Edit a team; fields outside the caller's edit scope are ignored
///
/// PUT /api/teams/:id
pub async fn update_team(
    State(state): State<AppState>,
    JwtAuth(actor): JwtAuth,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTeamDraft>, JsonRejection>,
) -> Result<Json<SingleTeamResponse>, ApiError> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    let team = state.directory.update_team(&actor, id, draft).await?;
    single(&state, team).await
}

/// Delete a team
///
/// DELETE /api/teams/:id
pub async fn delete_team(
    State(state): State<AppState>,
    JwtAuth(actor): JwtAuth,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    state.directory.delete_team(&actor, id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Team deleted successfully".to_string(),
    }))
}

/// Add an Employee to a team
///
/// POST /api/teams/:id/members
pub async fn add_member(
    State(state): State<AppState>,
    JwtAuth(actor): JwtAuth,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AddMemberDraft>, JsonRejection>,
) -> Result<Json<SingleTeamResponse>, ApiError> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    let team = state.directory.add_member(&actor, id, draft).await?;
    single(&state, team).await
}

/// Remove a member from a team
///
/// DELETE /api/teams/:id/members/:user_id
pub async fn remove_member(
    State(state): State<AppState>,
    JwtAuth(actor): JwtAuth,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<SingleTeamResponse>, ApiError> {
    let Path((id, user_id)) = ids?;
    let team = state.directory.remove_member(&actor, id, user_id).await?;
    single(&state, team).await
}

/// Employees that may be added to a team
///
/// GET /api/teams/:id/candidates
pub async fn candidates(
    State(state): State<AppState>,
    JwtAuth(actor): JwtAuth,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CandidatesResponse>, ApiError> {
    let Path(id) = id?;
    let users = state.directory.member_candidates(&actor, id).await?;

    Ok(Json(CandidatesResponse {
        success: true,
        users: users.iter().map(UserSummary::from).collect(),
    }))
}
