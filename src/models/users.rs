use std::{fmt, str::FromStr};

use crate::schema::users;
use anyhow::bail;
use chrono::NaiveDateTime;

#[derive(Clone, Queryable, Insertable, Identifiable)]
#[diesel(table_name = users)]
pub struct UserData {
    pub id: String,
    pub password: String,
    pub name: String,
    pub role: String,
    pub student_id: Option<String>,
    pub telephone: Option<String>,
    pub is_banned: bool,
    pub created_at: NaiveDateTime,
}

impl UserData {
    /// Unknown role strings are treated as the least privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Client)
    }
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub student_id: Option<String>,
    pub telephone: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Client,
    Counselor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Counselor => "counselor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "counselor" => Ok(Role::Counselor),
            "admin" => Ok(Role::Admin),
            _ => bail!("Unknown role: {}", s),
        }
    }
}
