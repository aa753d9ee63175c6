use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::Sub;

#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    pub sub: Sub,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>, password_hash: String) -> Self {
        Self {
            id: None,
            sub: Sub(format!("local|{}", uuid::Uuid::new_v4())),
            email: email.into(),
            name: name.into(),
            password_hash,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub sub: Sub,
    pub email: String,
    pub name: String,
}

impl UserInfo {
    /// Display label: the name when present, the email otherwise.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            sub: user.sub,
            email: user.email,
            name: user.name,
        }
    }
}
