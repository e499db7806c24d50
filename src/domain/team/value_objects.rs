use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Smallest permitted team capacity
pub const MIN_TEAM_SIZE: u32 = 1;
/// Largest permitted team capacity
pub const MAX_TEAM_SIZE: u32 = 50;
/// Capacity used when a create request does not choose one
pub const DEFAULT_TEAM_SIZE: u32 = 10;

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9]+$").expect("team code pattern compiles"))
}

/// Team code value object
///
/// # Invariants
/// - Non-empty
/// - Matches `^[A-Z0-9]+$`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeamCode(String);

impl TeamCode {
    /// Builds a code from already-normalized input
    ///
    /// No case folding happens here; callers that accept user input should
    /// go through [`TeamCode::normalize`] first.
    ///
    /// # Example
    /// ```
    /// use teamdesk_api::domain::team::value_objects::TeamCode;
    ///
    /// assert!(TeamCode::new("DEV1").is_ok());
    /// assert!(TeamCode::new("dev1").is_err());
    /// ```
    pub fn new(code: impl Into<String>) -> Result<Self, String> {
        let code = code.into();
        if Self::is_valid(&code) {
            Ok(TeamCode(code))
        } else {
            Err(format!("Invalid team code: {}", code))
        }
    }

    /// Trims and upper-cases raw user input
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    pub fn is_valid(code: &str) -> bool {
        code_pattern().is_match(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TeamCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TeamCode::new(value)
    }
}

impl From<TeamCode> for String {
    fn from(code: TeamCode) -> Self {
        code.0
    }
}

impl fmt::Display for TeamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Team capacity value object, always within 1..=50
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MaxSize(u32);

impl MaxSize {
    pub fn new(value: u32) -> Result<Self, String> {
        if (MIN_TEAM_SIZE..=MAX_TEAM_SIZE).contains(&value) {
            Ok(MaxSize(value))
        } else {
            Err(format!(
                "Max size must be between {} and {}",
                MIN_TEAM_SIZE, MAX_TEAM_SIZE
            ))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for MaxSize {
    fn default() -> Self {
        MaxSize(DEFAULT_TEAM_SIZE)
    }
}

impl TryFrom<u32> for MaxSize {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        MaxSize::new(value)
    }
}

impl From<MaxSize> for u32 {
    fn from(size: MaxSize) -> Self {
        size.0
    }
}

/// Role a member holds inside one team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MemberRole {
    #[default]
    #[serde(rename = "Member")]
    Member,
    #[serde(rename = "Senior Member")]
    SeniorMember,
    #[serde(rename = "Lead")]
    Lead,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Member => "Member",
            MemberRole::SeniorMember => "Senior Member",
            MemberRole::Lead => "Lead",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Member" => Ok(MemberRole::Member),
            "Senior Member" => Ok(MemberRole::SeniorMember),
            "Lead" => Ok(MemberRole::Lead),
            other => Err(format!("Unknown member role: {}", other)),
        }
    }
}

/// Editable team fields, named as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TeamField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "description")]
    Description,
    #[serde(rename = "department")]
    Department,
    #[serde(rename = "teamManager")]
    TeamManager,
    #[serde(rename = "teamLeader")]
    TeamLeader,
    #[serde(rename = "maxSize")]
    MaxSize,
    #[serde(rename = "isActive")]
    IsActive,
    #[serde(rename = "userId")]
    UserId,
}

impl TeamField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamField::Name => "name",
            TeamField::Code => "code",
            TeamField::Description => "description",
            TeamField::Department => "department",
            TeamField::TeamManager => "teamManager",
            TeamField::TeamLeader => "teamLeader",
            TeamField::MaxSize => "maxSize",
            TeamField::IsActive => "isActive",
            TeamField::UserId => "userId",
        }
    }
}

impl fmt::Display for TeamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
