// Read-only reference data used to fill team forms

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::middleware::JwtAuth;
use crate::api::state::AppState;
use crate::domain::department::Department;
use crate::domain::repositories::{PageRequest, UserQuery};
use crate::domain::user::{Role, UserSummary};

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub role: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListDepartmentsParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserSummary>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentsResponse {
    pub success: bool,
    pub departments: Vec<Department>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    JwtAuth(_actor): JwtAuth,
    params: Result<Query<ListUsersParams>, QueryRejection>,
) -> Result<Json<UsersResponse>, ApiError> {
    let Query(params) = params?;
    let role = match params.role.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<Role>().map_err(ApiError::bad_request)?),
    };
    let query = UserQuery {
        role,
        search: params.search.filter(|s| !s.trim().is_empty()),
        page: PageRequest::new(params.page, params.limit),
    };

    let page = state
        .users
        .list(&query)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Database error: {}", e)))?;

    Ok(Json(UsersResponse {
        success: true,
        total_pages: page.total_pages(),
        total: page.total,
        current_page: page.page,
        users: page.items.iter().map(UserSummary::from).collect(),
    }))
}

/// GET /api/departments
pub async fn list_departments(
    State(state): State<AppState>,
    JwtAuth(_actor): JwtAuth,
    params: Result<Query<ListDepartmentsParams>, QueryRejection>,
) -> Result<Json<DepartmentsResponse>, ApiError> {
    let Query(params) = params?;
    let page = state
        .departments
        .list(PageRequest::new(params.page, params.limit))
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Database error: {}", e)))?;

    Ok(Json(DepartmentsResponse {
        success: true,
        total_pages: page.total_pages(),
        total: page.total,
        current_page: page.page,
        departments: page.items,
    }))
}
