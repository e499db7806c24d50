// Team mutation validation
// Turns loosely-typed request drafts into normalized payloads, or into a
// complete field -> error map. Validation is pure and never panics on
// malformed input: a non-numeric max size is a range failure, not a crash.

mod drafts;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::domain::policy::EditScope;
use crate::domain::team::value_objects::{MaxSize, MemberRole, TeamCode, TeamField};
use crate::domain::team::Team;
use crate::domain::user::{Role, User};

pub use drafts::{AddMemberDraft, CreateTeamDraft, UpdateTeamDraft};

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationReason {
    Required,
    Format,
    Range,
    /// The field names a record that does not exist or has the wrong role
    Reference,
}

/// One rejected field with its user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: TeamField,
    pub reason: ValidationReason,
    #[serde(rename = "msg")]
    pub message: String,
}

/// Complete map of field errors for one payload
///
/// Keeps the first error recorded per field, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<TeamField, FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error using the standard message for the field and reason
    pub fn add(&mut self, field: TeamField, reason: ValidationReason) {
        self.add_with_message(field, reason, default_message(field, reason));
    }

    pub fn add_with_message(
        &mut self,
        field: TeamField,
        reason: ValidationReason,
        message: impl Into<String>,
    ) {
        self.0.entry(field).or_insert_with(|| FieldError {
            field,
            reason,
            message: message.into(),
        });
    }

    pub fn single(field: TeamField, reason: ValidationReason, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add_with_message(field, reason, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: TeamField) -> Option<&FieldError> {
        self.0.get(&field)
    }

    pub fn reason(&self, field: TeamField) -> Option<ValidationReason> {
        self.get(field).map(|e| e.reason)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.values()
    }

    /// Returns `value` when no error was recorded
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

fn default_message(field: TeamField, reason: ValidationReason) -> String {
    use TeamField::*;
    use ValidationReason::*;

    match (field, reason) {
        (Name, Required) => "Team name is required".to_string(),
        (Code, Required) => "Team code is required".to_string(),
        (Code, Format) => "Team code must contain only uppercase letters and numbers".to_string(),
        (Department, Required) => "Department is required".to_string(),
        (MaxSize, Range) => "Max size must be between 1 and 50".to_string(),
        (UserId, Required) => "Please select a user to add".to_string(),
        (field, Required) => format!("{} is required", field),
        (field, Format) => format!("{} has an invalid format", field),
        (field, Range) => format!("{} is out of range", field),
        (field, Reference) => format!("{} does not reference a valid record", field),
    }
}

/// Normalized create payload, ready for persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub name: String,
    pub code: TeamCode,
    pub description: Option<String>,
    pub department_id: Uuid,
    pub manager_id: Option<Uuid>,
    pub leader_id: Option<Uuid>,
    pub max_size: MaxSize,
}

/// Normalized update payload
///
/// `None` leaves a field unchanged; the nested options on description and
/// assignments distinguish "clear" (`Some(None)`) from "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub manager_id: Option<Option<Uuid>>,
    pub leader_id: Option<Option<Uuid>>,
    pub max_size: Option<MaxSize>,
    pub is_active: Option<bool>,
}

/// Normalized add-member payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewMember {
    pub user_id: Uuid,
    pub role: MemberRole,
}

/// Validates a create payload
///
/// # Example
/// ```
/// use teamdesk_api::domain::validation::{validate_create, CreateTeamDraft};
///
/// let draft = CreateTeamDraft {
///     name: "Platform".to_string(),
///     code: "dev1".to_string(),
///     department: Some("6f1c9a56-8a55-4e4e-9a0a-1b1c54f0f1aa".to_string()),
///     ..Default::default()
/// };
/// let team = validate_create(&draft).expect("valid payload");
/// assert_eq!(team.code.as_str(), "DEV1");
/// ```
pub fn validate_create(draft: &CreateTeamDraft) -> Result<NewTeam, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = draft.name.trim().to_string();
    if name.is_empty() {
        errors.add(TeamField::Name, ValidationReason::Required);
    }

    let code = TeamCode::normalize(&draft.code);
    let code = if code.is_empty() {
        errors.add(TeamField::Code, ValidationReason::Required);
        None
    } else {
        match TeamCode::new(code) {
            Ok(code) => Some(code),
            Err(_) => {
                errors.add(TeamField::Code, ValidationReason::Format);
                None
            }
        }
    };

    let department = match non_blank(draft.department.as_deref()) {
        None => {
            errors.add(TeamField::Department, ValidationReason::Required);
            None
        }
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add(TeamField::Department, ValidationReason::Format);
                None
            }
        },
    };

    let max_size = match &draft.max_size {
        None => Some(MaxSize::default()),
        Some(raw) => {
            let parsed = parse_max_size(raw);
            if parsed.is_none() {
                errors.add(TeamField::MaxSize, ValidationReason::Range);
            }
            parsed
        }
    };

    let manager_id = parse_reference(TeamField::TeamManager, draft.team_manager.as_deref(), &mut errors);
    let leader_id = parse_reference(TeamField::TeamLeader, draft.team_leader.as_deref(), &mut errors);

    match (code, department, max_size) {
        (Some(code), Some(department_id), Some(max_size)) if errors.is_empty() => Ok(NewTeam {
            name,
            code,
            description: normalize_description(draft.description.as_deref()),
            department_id,
            manager_id: manager_id.flatten(),
            leader_id: leader_id.flatten(),
            max_size,
        }),
        _ => Err(errors),
    }
}

/// Validates an update payload under the caller's edit scope
///
/// Fields the scope does not permit are dropped before validation, so a
/// limited editor sending `isActive` gets the rest of the edit applied.
pub fn validate_update(draft: &UpdateTeamDraft, scope: EditScope) -> Result<TeamUpdate, ValidationErrors> {
    let draft = draft.restricted_to(scope);
    let mut errors = ValidationErrors::new();
    let mut update = TeamUpdate::default();

    if let Some(name) = &draft.name {
        let name = name.trim();
        if scope == EditScope::Full && name.is_empty() {
            errors.add(TeamField::Name, ValidationReason::Required);
        } else {
            update.name = Some(name.to_string());
        }
    }

    if let Some(description) = &draft.description {
        update.description = Some(normalize_description(description.as_deref()));
    }

    if let Some(raw) = &draft.max_size {
        match parse_max_size(raw) {
            Some(size) => update.max_size = Some(size),
            None => errors.add(TeamField::MaxSize, ValidationReason::Range),
        }
    }

    if let Some(manager) = &draft.team_manager {
        update.manager_id = parse_reference(TeamField::TeamManager, manager.as_deref(), &mut errors);
    }
    if let Some(leader) = &draft.team_leader {
        update.leader_id = parse_reference(TeamField::TeamLeader, leader.as_deref(), &mut errors);
    }

    update.is_active = draft.is_active;

    errors.into_result(|| update)
}

/// Validates the shape of an add-member request
///
/// Capacity, duplicate and eligibility checks need the team and the
/// candidate and live on [`Team::check_member_addition`].
pub fn validate_add_member(draft: &AddMemberDraft) -> Result<NewMember, ValidationErrors> {
    let role = draft.role.unwrap_or_default();
    match non_blank(draft.user_id.as_deref()) {
        None => Err(ValidationErrors::single(
            TeamField::UserId,
            ValidationReason::Required,
            default_message(TeamField::UserId, ValidationReason::Required),
        )),
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(user_id) => Ok(NewMember { user_id, role }),
            Err(_) => Err(ValidationErrors::single(
                TeamField::UserId,
                ValidationReason::Format,
                default_message(TeamField::UserId, ValidationReason::Format),
            )),
        },
    }
}

/// Users that may be offered when adding a member to `team`
///
/// Only Employee-role users who are not already members qualify.
pub fn eligible_candidates<'a>(team: &Team, users: &'a [User]) -> Vec<&'a User> {
    users
        .iter()
        .filter(|user| user.role == Role::Employee && !team.is_member(user.id))
        .collect()
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn normalize_description(raw: Option<&str>) -> Option<String> {
    non_blank(raw).map(str::to_string)
}

/// Empty means unassigned; anything else must be an id
fn parse_reference(field: TeamField, raw: Option<&str>, errors: &mut ValidationErrors) -> Option<Option<Uuid>> {
    match non_blank(raw) {
        None => Some(None),
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(Some(id)),
            Err(_) => {
                errors.add(field, ValidationReason::Format);
                None
            }
        },
    }
}

/// Accepts integral JSON numbers and numeric strings within 1..=50
fn parse_max_size(raw: &serde_json::Value) -> Option<MaxSize> {
    use serde_json::Value;

    let value: i64 = match raw {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => f as i64,
            _ => return None,
        },
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    u32::try_from(value).ok().and_then(|v| MaxSize::new(v).ok())
}
