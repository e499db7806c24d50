// User domain module
// Users are reference data here: the directory service reads them to resolve
// actors, team assignments and member candidates but never mutates them.

pub mod value_objects;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use value_objects::{Email, Role};

/// The authenticated caller of an operation
///
/// Built from the session token; identity and role do not change for the
/// lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

/// A user record as held by the directory
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub is_active: bool,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Public projection of a user, safe to serialize
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<Uuid>,
    pub is_active: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.to_string(),
            role: user.role,
            department: user.department_id,
            is_active: user.is_active,
        }
    }
}
