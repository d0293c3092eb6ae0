use bson::oid::ObjectId;
use bson::Document;
use serde::{Deserialize, Serialize};

use crate::role::Role;

pub mod db;

/// Signup/login payload. Any extra profile fields are stored as sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Absent for students.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(flatten)]
    pub extra: Document,
}

impl User {
    pub fn role(&self) -> Role {
        self.role.unwrap_or_default()
    }
}

impl From<NewUser> for User {
    fn from(mut value: NewUser) -> Self {
        // Roles are only ever granted by an admin.
        super::strip_reserved(&mut value.extra, &["role"]);

        User {
            id: None,
            email: value.email,
            name: value.name,
            photo: value.photo,
            role: None,
            extra: value.extra,
        }
    }
}
