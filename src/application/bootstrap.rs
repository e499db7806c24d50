// First-run seeding
// Creates an Admin account from configuration so a fresh directory can be used

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::auth::{password, AuthError};
use crate::config::BootstrapAdmin;
use crate::domain::repositories::{RepositoryError, UserRepository};
use crate::domain::user::{Email, Role, User};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Invalid bootstrap admin email: {0}")]
    Email(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Ensures an Admin with the configured email exists
///
/// Returns `true` when an account was created. An existing account is left
/// untouched, including its password.
pub async fn ensure_admin(users: &dyn UserRepository, admin: &BootstrapAdmin) -> Result<bool, BootstrapError> {
    ensure_admin_with_cost(users, admin, bcrypt::DEFAULT_COST).await
}

pub(crate) async fn ensure_admin_with_cost(
    users: &dyn UserRepository,
    admin: &BootstrapAdmin,
    cost: u32,
) -> Result<bool, BootstrapError> {
    let email = Email::new(&admin.email).map_err(BootstrapError::Email)?;
    if users.find_by_email(&email).await?.is_some() {
        return Ok(false);
    }

    let user = User {
        id: Uuid::new_v4(),
        first_name: "System".to_string(),
        last_name: "Admin".to_string(),
        email,
        password_hash: password::hash_password_with_cost(&admin.password, cost)?,
        role: Role::Admin,
        department_id: None,
        is_active: true,
    };
    let id = users.create(user).await?;
    info!(user_id = %id, email = %admin.email, "Bootstrap admin created");

    Ok(true)
}
