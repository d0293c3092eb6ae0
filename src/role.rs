use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Reads a stored `role` value. Anything that isn't a known elevated role
    /// is a student.
    pub fn parse(value: Option<&str>) -> Role {
        match value {
            Some("admin") => Role::Admin,
            Some("teacher") => Role::Teacher,
            _ => Role::Student,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl std::default::Default for Role {
    fn default() -> Self {
        Role::Student
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_roles_are_students() {
        assert_eq!(Role::parse(None), Role::Student);
        assert_eq!(Role::parse(Some("")), Role::Student);
        assert_eq!(Role::parse(Some("Admin")), Role::Student);
        assert_eq!(Role::parse(Some("moderator")), Role::Student);
        assert_eq!(Role::parse(Some("teacher")), Role::Teacher);
        assert_eq!(Role::parse(Some("admin")), Role::Admin);
    }

    #[test]
    fn roles_are_ordered_by_privilege() {
        assert!(Role::Student < Role::Teacher);
        assert!(Role::Teacher < Role::Admin);
        assert_eq!(Role::default(), Role::Student);
    }

    #[test]
    fn stored_form_is_lowercase() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(
            serde_json::to_string(&Role::Teacher).expect("serializable"),
            "\"teacher\""
        );
    }
}
