use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::NewTeam;
use crate::domain::policy::EditScope;
use crate::domain::team::value_objects::{MemberRole, TeamField};

/// Maps a present JSON key (including `null`) to `Some`, so that a missing
/// key stays `None` under `#[serde(default)]`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Raw create request as submitted by a client
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTeamDraft {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub department: Option<String>,
    pub team_manager: Option<String>,
    pub team_leader: Option<String>,
    /// Left untyped so that `"abc"` or `true` become range errors
    pub max_size: Option<Value>,
}

impl From<&NewTeam> for CreateTeamDraft {
    fn from(team: &NewTeam) -> Self {
        Self {
            name: team.name.clone(),
            code: team.code.to_string(),
            description: team.description.clone(),
            department: Some(team.department_id.to_string()),
            team_manager: team.manager_id.map(|id| id.to_string()),
            team_leader: team.leader_id.map(|id| id.to_string()),
            max_size: Some(Value::from(team.max_size.get())),
        }
    }
}

/// Raw update request
///
/// Every field is optional. For description and assignments an explicit
/// `null` means "clear" while an absent key means "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTeamDraft {
    pub name: Option<String>,
    #[serde(deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub team_manager: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub team_leader: Option<Option<String>>,
    pub max_size: Option<Value>,
    pub is_active: Option<bool>,
}

impl UpdateTeamDraft {
    /// Fields present in the request
    pub fn supplied_fields(&self) -> Vec<TeamField> {
        [
            (self.name.is_some(), TeamField::Name),
            (self.description.is_some(), TeamField::Description),
            (self.team_manager.is_some(), TeamField::TeamManager),
            (self.team_leader.is_some(), TeamField::TeamLeader),
            (self.max_size.is_some(), TeamField::MaxSize),
            (self.is_active.is_some(), TeamField::IsActive),
        ]
        .into_iter()
        .filter_map(|(supplied, field)| supplied.then_some(field))
        .collect()
    }

    /// Copy of the draft with every field outside `scope` removed
    pub fn restricted_to(&self, scope: EditScope) -> Self {
        let keep = |field: TeamField| scope.permits(field);
        Self {
            name: self.name.clone().filter(|_| keep(TeamField::Name)),
            description: self.description.clone().filter(|_| keep(TeamField::Description)),
            team_manager: self.team_manager.clone().filter(|_| keep(TeamField::TeamManager)),
            team_leader: self.team_leader.clone().filter(|_| keep(TeamField::TeamLeader)),
            max_size: self.max_size.clone().filter(|_| keep(TeamField::MaxSize)),
            is_active: self.is_active.filter(|_| keep(TeamField::IsActive)),
        }
    }
}

/// Raw add-member request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddMemberDraft {
    pub user_id: Option<String>,
    pub role: Option<MemberRole>,
}
