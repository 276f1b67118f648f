use diesel::SqliteConnection;

use crate::{
    models::users::{Role, UserData},
    onboarding::{self, DbFlagStore, Step},
};

/// Staff accounts never see the onboarding screens.
pub fn onboarding_step(conn: &mut SqliteConnection, user: &UserData) -> anyhow::Result<Step> {
    if user.role() != Role::Client {
        return Ok(Step::Done);
    }
    onboarding::current_step(&mut DbFlagStore::new(conn, &user.id))
}

pub fn optional_digits(
    value: Option<String>,
    validate: fn(&str) -> anyhow::Result<String>,
) -> anyhow::Result<Option<String>> {
    match value {
        Some(value) if !value.trim().is_empty() => validate(&value).map(Some),
        _ => Ok(None),
    }
}
