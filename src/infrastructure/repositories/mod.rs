// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory;
pub mod postgres_department_repository;
pub mod postgres_team_repository;
pub mod postgres_user_repository;

pub use in_memory::{InMemoryDepartmentRepository, InMemoryTeamRepository, InMemoryUserRepository};
pub use postgres_department_repository::PostgresDepartmentRepository;
pub use postgres_team_repository::PostgresTeamRepository;
pub use postgres_user_repository::PostgresUserRepository;

use crate::domain::repositories::RepositoryError;

/// Maps a sqlx error, keeping unique violations distinguishable
pub(crate) fn map_sqlx_error(error: sqlx::Error, context: &str) -> RepositoryError {
    if let Some(db_error) = error.as_database_error() {
        if db_error.is_unique_violation() {
            let constraint = db_error.constraint().unwrap_or("unique constraint");
            return RepositoryError::UniqueViolation(constraint.to_string());
        }
    }
    RepositoryError::Database(format!("Failed to {}: {}", context, error))
}

/// Builds an ILIKE pattern matching `search` as a literal substring
pub(crate) fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
