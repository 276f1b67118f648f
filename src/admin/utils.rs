use std::collections::HashMap;

use diesel::{dsl::count, prelude::*};

use crate::{
    models::{
        appointments::{APPOINT_STATUS_CANCELLED, APPOINT_STATUS_COMPLETED, APPOINT_STATUS_UPCOMING},
        users::Role,
    },
    report::{CounselorLoad, StatsSummary},
};

pub fn collect_stats(conn: &mut SqliteConnection) -> QueryResult<StatsSummary> {
    use crate::schema::{appointments, time_blocks, users};

    let mut stats = StatsSummary::default();

    let roles = users::table
        .group_by(users::role)
        .select((users::role, count(users::id)))
        .get_results::<(String, i64)>(conn)?;
    for (role, cnt) in roles {
        match role.parse::<Role>() {
            Ok(Role::Client) => stats.clients += cnt,
            Ok(Role::Counselor) => stats.counselors += cnt,
            Ok(Role::Admin) => stats.admins += cnt,
            Err(_) => {}
        }
    }

    let per_counselor = appointments::table
        .group_by((appointments::counselor_id, appointments::status))
        .select((
            appointments::counselor_id,
            appointments::status,
            count(appointments::id),
        ))
        .get_results::<(String, String, i64)>(conn)?;

    let open_slots: HashMap<String, i64> = time_blocks::table
        .filter(time_blocks::available.eq(true))
        .group_by(time_blocks::counselor_id)
        .select((time_blocks::counselor_id, count(time_blocks::day)))
        .get_results::<(String, i64)>(conn)?
        .into_iter()
        .collect();
    stats.available_slots = open_slots.values().sum();
    stats.booked_slots = time_blocks::table
        .filter(time_blocks::booked_by.is_not_null())
        .count()
        .get_result::<i64>(conn)?;

    let counselors = users::table
        .filter(users::role.eq(Role::Counselor.as_str()))
        .select((users::id, users::name))
        .order(users::name.asc())
        .get_results::<(String, String)>(conn)?;
    let mut loads: Vec<CounselorLoad> = counselors
        .into_iter()
        .map(|(counselor_id, name)| CounselorLoad {
            available_slots: open_slots.get(&counselor_id).copied().unwrap_or(0),
            counselor_id,
            name,
            ..Default::default()
        })
        .collect();

    for (counselor_id, status, cnt) in per_counselor {
        match status.as_str() {
            APPOINT_STATUS_UPCOMING => stats.upcoming += cnt,
            APPOINT_STATUS_COMPLETED => stats.completed += cnt,
            APPOINT_STATUS_CANCELLED => stats.cancelled += cnt,
            _ => continue,
        }
        if let Some(load) = loads.iter_mut().find(|l| l.counselor_id == counselor_id) {
            match status.as_str() {
                APPOINT_STATUS_UPCOMING => load.upcoming += cnt,
                APPOINT_STATUS_COMPLETED => load.completed += cnt,
                _ => {}
            }
        }
    }

    stats.counselors_load = loads;
    Ok(stats)
}
