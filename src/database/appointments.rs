use std::collections::HashMap;

use anyhow::{bail, Context};
use diesel::prelude::*;

use crate::{
    database::slots,
    models::{
        appointments::{Appointment, AppointmentStatus, APPOINT_STATUS_UPCOMING},
        users::{Role, UserData},
    },
    schema::{appointments, users},
};

pub fn find_appointment(conn: &mut SqliteConnection, id: &str) -> anyhow::Result<Appointment> {
    appointments::table
        .filter(appointments::id.eq(id))
        .get_result::<Appointment>(conn)
        .optional()
        .context("DB error")?
        .ok_or_else(|| anyhow::anyhow!("No such appointment"))
}

pub fn count_upcoming(conn: &mut SqliteConnection, client_id: &str) -> QueryResult<i64> {
    appointments::table
        .filter(appointments::client_id.eq(client_id))
        .filter(appointments::status.eq(APPOINT_STATUS_UPCOMING))
        .count()
        .get_result::<i64>(conn)
}

/// Moves an upcoming appointment to `next` on behalf of `user` and frees its
/// slot. Must run inside a transaction.
pub fn transition_appointment(
    conn: &mut SqliteConnection,
    user: &UserData,
    id: &str,
    next: AppointmentStatus,
) -> anyhow::Result<Appointment> {
    let mut appo = find_appointment(conn, id)?;
    let allowed = match user.role() {
        Role::Client => appo.client_id == user.id && next == AppointmentStatus::Cancelled,
        Role::Counselor => appo.counselor_id == user.id,
        Role::Admin => false,
    };
    if !allowed {
        bail!("Not your appointment");
    }

    let status = appo.status.parse::<AppointmentStatus>()?;
    if !status.can_transition_to(next) {
        bail!("Appointment is already {}", status);
    }

    let updated = diesel::update(
        appointments::table
            .filter(appointments::id.eq(id))
            .filter(appointments::status.eq(APPOINT_STATUS_UPCOMING)),
    )
    .set(appointments::status.eq(next.as_str()))
    .execute(conn)
    .context("DB error")?;
    if updated != 1 {
        bail!("Appointment changed, please reload");
    }

    slots::release_block(conn, &appo.counselor_id, &appo.day, &appo.time, &appo.client_id)
        .context("DB error")?;

    appo.status = next.as_str().to_string();
    Ok(appo)
}

pub fn user_names<I>(conn: &mut SqliteConnection, ids: I) -> QueryResult<HashMap<String, String>>
where
    I: IntoIterator<Item = String>,
{
    let mut ids: Vec<String> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();
    let rows = users::table
        .filter(users::id.eq_any(ids))
        .select((users::id, users::name))
        .get_results::<(String, String)>(conn)?;
    Ok(rows.into_iter().collect())
}
