use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Email value object used as the login identity of a user
///
/// # Invariants
/// - Must contain '@' character
/// - Must be at least 3 characters long
/// - Stored trimmed and lower-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Creates a new Email value object
    ///
    /// # Example
    /// ```
    /// use teamdesk_api::domain::user::value_objects::Email;
    ///
    /// let email = Email::new("  Jane.Doe@Example.com ").expect("valid email");
    /// assert_eq!(email.as_str(), "jane.doe@example.com");
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, String> {
        let email = email.as_ref().trim().to_lowercase();
        if email.contains('@') && email.len() >= 3 {
            Ok(Email(email))
        } else {
            Err(format!("Invalid email: {}", email))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Organizational role held by a user
///
/// Every authenticated actor carries exactly one role for the whole session.
/// The first five variants are the privileged roles with full administrative
/// rights over teams; the rest are scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Vice President")]
    VicePresident,
    #[serde(rename = "HR BP")]
    HrBp,
    #[serde(rename = "HR Manager")]
    HrManager,
    #[serde(rename = "HR Executive")]
    HrExecutive,
    #[serde(rename = "Team Manager")]
    TeamManager,
    #[serde(rename = "Team Leader")]
    TeamLeader,
    #[serde(rename = "Employee")]
    Employee,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Admin,
        Role::VicePresident,
        Role::HrBp,
        Role::HrManager,
        Role::HrExecutive,
        Role::TeamManager,
        Role::TeamLeader,
        Role::Employee,
    ];

    /// Returns true for Admin, Vice President, HR BP, HR Manager and HR Executive
    ///
    /// # Example
    /// ```
    /// use teamdesk_api::domain::user::value_objects::Role;
    ///
    /// assert!(Role::HrBp.is_privileged());
    /// assert!(!Role::TeamManager.is_privileged());
    /// ```
    pub fn is_privileged(&self) -> bool {
        matches!(
            self,
            Role::Admin | Role::VicePresident | Role::HrBp | Role::HrManager | Role::HrExecutive
        )
    }

    /// Human-readable name, identical to the wire and database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::VicePresident => "Vice President",
            Role::HrBp => "HR BP",
            Role::HrManager => "HR Manager",
            Role::HrExecutive => "HR Executive",
            Role::TeamManager => "Team Manager",
            Role::TeamLeader => "Team Leader",
            Role::Employee => "Employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("Unknown role: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email() {
        assert!(Email::new("test@example.com").is_ok());
    }

    #[test]
    fn valid_email_minimum_length() {
        assert!(Email::new("a@b").is_ok());
    }

    #[test]
    fn email_is_normalized() {
        let email = Email::new("  Test@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "test@example.com");
    }

    #[test]
    fn invalid_email_no_at_symbol() {
        assert!(Email::new("invalid").is_err());
    }

    #[test]
    fn invalid_email_too_short() {
        assert!(Email::new("a@").is_err());
    }

    #[test]
    fn email_deserializes_through_validation() {
        let ok: Result<Email, _> = serde_json::from_str("\"user@corp.io\"");
        assert!(ok.is_ok());

        let bad: Result<Email, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn privileged_roles() {
        let privileged: Vec<Role> = Role::ALL.into_iter().filter(Role::is_privileged).collect();
        assert_eq!(
            privileged,
            vec![
                Role::Admin,
                Role::VicePresident,
                Role::HrBp,
                Role::HrManager,
                Role::HrExecutive
            ]
        );
    }

    #[test]
    fn role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::VicePresident).unwrap(),
            "\"Vice President\""
        );
        let role: Role = serde_json::from_str("\"HR BP\"").unwrap();
        assert_eq!(role, Role::HrBp);
    }

    #[test]
    fn role_from_str_matches_display() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("Captain".parse::<Role>().is_err());
    }
}
