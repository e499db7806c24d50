use async_trait::async_trait;
use uuid::Uuid;

use super::{Page, PageRequest, RepositoryError};
use crate::domain::user::{Email, Role, User};

/// Filters for a user listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub role: Option<Role>,
    /// Case-insensitive substring of first name, last name or email
    pub search: Option<String>,
    pub page: PageRequest,
}

impl UserQuery {
    pub fn matches(&self, user: &User) -> bool {
        if self.role.is_some_and(|role| role != user.role) {
            return false;
        }
        match &self.search {
            None => true,
            Some(search) => {
                let needle = search.to_lowercase();
                user.first_name.to_lowercase().contains(&needle)
                    || user.last_name.to_lowercase().contains(&needle)
                    || user.email.as_str().contains(&needle)
            }
        }
    }
}

/// Repository trait for users
///
/// The directory reads users; `create` exists for bootstrapping.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; a taken email is `UniqueViolation`
    async fn create(&self, user: User) -> Result<Uuid, RepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Find a user by email address
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// All users holding `role`, ordered by name
    async fn find_by_role(&self, role: Role) -> Result<Vec<User>, RepositoryError>;

    /// Filtered page of users, ordered by name
    async fn list(&self, query: &UserQuery) -> Result<Page<User>, RepositoryError>;
}
