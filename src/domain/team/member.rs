use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::value_objects::MemberRole;

/// A user's membership in one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: Uuid,
    pub role: MemberRole,
    pub joined_date: DateTime<Utc>,
}

impl Member {
    pub fn new(user_id: Uuid, role: MemberRole, joined_date: DateTime<Utc>) -> Self {
        Self {
            user_id,
            role,
            joined_date,
        }
    }
}
