use serde::Serialize;
use uuid::Uuid;

/// Department reference data
///
/// Teams point at a department; departments themselves are maintained
/// elsewhere and only read by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub is_active: bool,
}
