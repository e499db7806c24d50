use async_trait::async_trait;
use uuid::Uuid;

use super::{Page, PageRequest, RepositoryError};
use crate::domain::department::Department;

/// Read-only repository for departments
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Department>, RepositoryError>;

    /// Page of departments ordered by name
    async fn list(&self, page: PageRequest) -> Result<Page<Department>, RepositoryError>;
}
