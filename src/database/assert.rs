use actix_web::web;
use anyhow::{bail, Context};
use diesel::prelude::*;

use crate::{database::get_db_conn, models::users::Role, DbPool};

pub async fn assert_user(pool: &DbPool, id: String) -> anyhow::Result<()> {
    use crate::schema::users;

    let mut conn = get_db_conn(pool)?;
    let res = web::block(move || {
        users::table
            .filter(users::id.eq(id))
            .count()
            .get_result::<i64>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    if res == 0 {
        bail!("No such user");
    }

    Ok(())
}

pub async fn assert_counselor(pool: &DbPool, id: String) -> anyhow::Result<()> {
    use crate::schema::users;

    let mut conn = get_db_conn(pool)?;
    let res = web::block(move || {
        users::table
            .filter(users::id.eq(id))
            .filter(users::role.eq(Role::Counselor.as_str()))
            .filter(users::is_banned.eq(false))
            .count()
            .get_result::<i64>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    if res == 0 {
        bail!("No such counselor");
    }

    Ok(())
}

pub fn assert_slot_configured(days: &[String], times: &[String], day: &str, time: &str) -> anyhow::Result<()> {
    if !days.iter().any(|d| d == day) {
        bail!("No sessions on {}", day);
    }
    if !times.iter().any(|t| t == time) {
        bail!("No session starts at {}", time);
    }
    Ok(())
}
