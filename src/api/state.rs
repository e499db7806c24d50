use std::sync::Arc;

use crate::application::TeamDirectoryService;
use crate::domain::repositories::{DepartmentRepository, TeamRepository, UserRepository};

/// Session token settings shared by login and the auth extractor
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub ttl_hours: i64,
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<TeamDirectoryService>,
    pub users: Arc<dyn UserRepository>,
    pub departments: Arc<dyn DepartmentRepository>,
    pub tokens: Arc<TokenSettings>,
}

impl AppState {
    pub fn new(
        teams: Arc<dyn TeamRepository>,
        users: Arc<dyn UserRepository>,
        departments: Arc<dyn DepartmentRepository>,
        tokens: TokenSettings,
    ) -> Self {
        let directory = TeamDirectoryService::new(teams, users.clone(), departments.clone());
        Self {
            directory: Arc::new(directory),
            users,
            departments,
            tokens: Arc::new(tokens),
        }
    }
}
