use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::map_sqlx_error;
use crate::domain::department::Department;
use crate::domain::repositories::{DepartmentRepository, Page, PageRequest, RepositoryError};

#[derive(sqlx::FromRow)]
struct DepartmentRow {
    id: Uuid,
    name: String,
    code: String,
    is_active: bool,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Department {
            id: row.id,
            name: row.name,
            code: row.code,
            is_active: row.is_active,
        }
    }
}

/// PostgreSQL implementation of DepartmentRepository
pub struct PostgresDepartmentRepository {
    pool: PgPool,
}

impl PostgresDepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DepartmentRepository for PostgresDepartmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Department>, RepositoryError> {
        let row = sqlx::query_as::<_, DepartmentRow>(
            "SELECT id, name, code, is_active FROM departments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "find department"))?;

        Ok(row.map(Department::from))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Department>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM departments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "count departments"))?;

        let rows = sqlx::query_as::<_, DepartmentRow>(
            r#"
            SELECT id, name, code, is_active
            FROM departments
            ORDER BY name
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "list departments"))?;

        Ok(Page::new(
            rows.into_iter().map(Department::from).collect(),
            total.max(0) as u64,
            page,
        ))
    }
}
