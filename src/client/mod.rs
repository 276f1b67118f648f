mod requests;
pub(crate) mod responses;
pub(crate) mod utils;

use crate::{
    account::utils::onboarding_step,
    auth::{current_user, current_user_with_role},
    booking::{next_date_for_day, service_today, session_bounds, BookingForm},
    calendar::CalendarEvent,
    database::{appointments as appo_db, assert, get_db_conn, slots},
    models::{
        appointments::{Appointment, AppointmentStatus, APPOINT_STATUS_UPCOMING},
        users::Role,
    },
    onboarding::Step,
    protocol::SimpleResponse,
    AppState,
};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use anyhow::{bail, Context};
use chrono::Utc;
use diesel::prelude::*;
use tracing::{info, warn};

use self::{requests::*, responses::*, utils::appoint_item};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(search_counselor)
        .service(view_slots)
        .service(search_appoint)
        .service(appoint)
        .service(cancel_appoint);
}

crate::api_funcs! {
    (get, search_counselor, "/counselors", SearchCounselorRequest, SearchCounselorResponse),
    (get, view_slots, "/slots", ViewSlotsRequest, ViewSlotsResponse),
    (get, search_appoint, "/appointments", SearchAppointRequest, SearchAppointResponse),
    (post, appoint, "/appointments", AppointRequest, AppointResponse),
    (post, cancel_appoint, "/appointments/cancel", CancelAppointRequest, SimpleResponse),
}

async fn search_counselor_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: SearchCounselorRequest,
) -> anyhow::Result<SearchCounselorResponse> {
    use crate::schema::users;

    current_user(&state, &req).await?;

    let name_pattern = crate::utils::get_str_pattern_opt(info.name);
    let (first_index, limit) = crate::utils::page_bounds(info.first_index, info.limit);
    let mut conn = get_db_conn(&state.pool)?;
    let counselors = web::block(move || {
        users::table
            .filter(users::role.eq(Role::Counselor.as_str()))
            .filter(users::is_banned.eq(false))
            .filter(users::name.like(name_pattern))
            .select((users::id, users::name))
            .order(users::name.asc())
            .offset(first_index)
            .limit(limit)
            .get_results::<(String, String)>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    let counselors = counselors
        .into_iter()
        .map(|(id, name)| SearchCounselorItem { id, name })
        .collect();

    Ok(SearchCounselorResponse {
        success: true,
        err: "".to_string(),
        counselors,
    })
}

async fn view_slots_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: ViewSlotsRequest,
) -> anyhow::Result<ViewSlotsResponse> {
    current_user(&state, &req).await?;
    assert::assert_counselor(&state.pool, info.counselor_id.clone()).await?;

    let days = state.config.schedule_days.clone();
    let times = state.config.schedule_times.clone();
    let counselor_id = info.counselor_id.clone();
    let mut conn = get_db_conn(&state.pool)?;
    let schedule = web::block(move || slots::load_schedule(&mut conn, &counselor_id, &days, &times))
        .await
        .context("DB error")?
        .context("DB error")?;

    let slots = schedule
        .blocks
        .iter()
        .map(|block| SlotItem {
            day: block.day.clone(),
            time: block.time.clone(),
            available: block.available,
            booked: block.is_booked(),
        })
        .collect();

    Ok(ViewSlotsResponse {
        success: true,
        err: "".to_string(),
        counselor_id: info.counselor_id,
        days: schedule.days,
        times: schedule.times,
        slots,
    })
}

async fn search_appoint_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: SearchAppointRequest,
) -> anyhow::Result<SearchAppointResponse> {
    use crate::schema::appointments;

    let user = current_user(&state, &req).await?;
    if info.status != "all" {
        info.status.parse::<AppointmentStatus>()?;
    }

    let (first_index, limit) = crate::utils::page_bounds(info.first_index, info.limit);
    let status = info.status;
    let mut conn = get_db_conn(&state.pool)?;
    let (appos, names) = web::block(move || {
        let mut query = appointments::table.into_boxed();
        if status != "all" {
            query = query.filter(appointments::status.eq(status));
        }
        match user.role() {
            Role::Client => query = query.filter(appointments::client_id.eq(user.id.clone())),
            Role::Counselor => query = query.filter(appointments::counselor_id.eq(user.id.clone())),
            Role::Admin => {}
        }
        let appos = query
            .order((appointments::date.desc(), appointments::time.desc()))
            .offset(first_index)
            .limit(limit)
            .get_results::<Appointment>(&mut conn)?;

        let ids = appos
            .iter()
            .flat_map(|appo| [appo.client_id.clone(), appo.counselor_id.clone()]);
        let names = appo_db::user_names(&mut conn, ids)?;
        QueryResult::Ok((appos, names))
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    Ok(SearchAppointResponse {
        success: true,
        err: "".to_string(),
        appointments: appos
            .into_iter()
            .map(|appo| appoint_item(appo, &names))
            .collect(),
    })
}

async fn appoint_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: AppointRequest,
) -> anyhow::Result<AppointResponse> {
    let user = current_user_with_role(&state, &req, &[Role::Client]).await?;

    let form = BookingForm {
        student_id: info.student_id,
        telephone: info.telephone,
    }
    .validate()?;
    assert::assert_slot_configured(
        &state.config.schedule_days,
        &state.config.schedule_times,
        &info.day,
        &info.time,
    )?;
    assert::assert_counselor(&state.pool, info.counselor_id.clone()).await?;

    let date = next_date_for_day(
        service_today(Utc::now(), state.config.service_utc_offset),
        &info.day,
    )?;
    let appo = Appointment {
        id: crate::utils::new_id(),
        client_id: user.id.clone(),
        counselor_id: info.counselor_id,
        day: info.day,
        time: info.time,
        date,
        status: APPOINT_STATUS_UPCOMING.to_string(),
        student_id: form.student_id,
        telephone: form.telephone,
        notes: info.notes.filter(|notes| !notes.trim().is_empty()),
        google_event_id: None,
        created_at: Utc::now().naive_utc(),
    };

    let mut conn = get_db_conn(&state.pool)?;
    let appo = web::block(move || {
        use crate::schema::appointments;

        conn.immediate_transaction(|conn| {
            if onboarding_step(conn, &user)? != Step::Done {
                bail!("Complete onboarding before booking");
            }
            if appo_db::count_upcoming(conn, &user.id).context("DB error")? > 0 {
                bail!("You already have an upcoming appointment");
            }
            let reserved =
                slots::reserve_block(conn, &appo.counselor_id, &appo.day, &appo.time, &user.id)
                    .context("DB error")?;
            if !reserved {
                bail!("This slot is not available");
            }

            diesel::insert_into(appointments::table)
                .values(&appo)
                .execute(conn)
                .context("DB error")?;
            Ok(appo)
        })
    })
    .await
    .context("DB error")??;

    info!(
        appointment = %appo.id,
        client = %appo.client_id,
        counselor = %appo.counselor_id,
        "appointment booked"
    );

    let mut calendar_synced = false;
    if let Some(token) = info.calendar_access_token.filter(|t| !t.is_empty()) {
        calendar_synced = sync_calendar(&state, &appo, &token).await;
    }

    Ok(AppointResponse {
        success: true,
        err: "".to_string(),
        id: appo.id,
        date: crate::utils::format_date_str(&appo.date),
        calendar_synced,
    })
}

/// Adds the booked session to the client's calendar. Failures are logged and
/// leave the booking as it is.
async fn sync_calendar(state: &AppState, appo: &Appointment, token: &str) -> bool {
    use crate::schema::appointments;

    let event = match session_bounds(appo.date, &appo.time, state.config.session_minutes) {
        Ok((start, end)) => CalendarEvent {
            summary: "Counseling session".to_string(),
            description: appo.notes.clone().unwrap_or_default(),
            start,
            end,
        },
        Err(err) => {
            warn!(appointment = %appo.id, %err, "cannot build calendar event");
            return false;
        }
    };

    let event_id = match state.calendar.create_event(token, &event).await {
        Ok(event_id) => event_id,
        Err(err) => {
            warn!(appointment = %appo.id, err = %format!("{:#}", err), "calendar sync failed");
            return false;
        }
    };

    let id = appo.id.clone();
    let stored = match get_db_conn(&state.pool) {
        Ok(mut conn) => web::block(move || {
            diesel::update(appointments::table.filter(appointments::id.eq(id)))
                .set(appointments::google_event_id.eq(Some(event_id)))
                .execute(&mut conn)
        })
        .await
        .map_err(anyhow::Error::from)
        .and_then(|res| res.map_err(anyhow::Error::from)),
        Err(err) => Err(err),
    };
    match stored {
        Ok(_) => true,
        Err(err) => {
            warn!(appointment = %appo.id, %err, "failed to store calendar event id");
            false
        }
    }
}

async fn cancel_appoint_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: CancelAppointRequest,
) -> anyhow::Result<SimpleResponse> {
    let user = current_user_with_role(&state, &req, &[Role::Client, Role::Counselor]).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let appo = web::block(move || {
        conn.immediate_transaction(|conn| {
            appo_db::transition_appointment(conn, &user, &info.id, AppointmentStatus::Cancelled)
        })
    })
    .await
    .context("DB error")??;

    info!(appointment = %appo.id, "appointment cancelled");
    Ok(SimpleResponse::ok())
}
