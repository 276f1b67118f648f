mod requests;
mod responses;

use crate::{
    auth::current_user_with_role,
    booking::service_today,
    client::utils::appoint_item,
    database::{appointments as appo_db, get_db_conn, slots},
    models::{
        appointments::{
            Appointment, AppointmentStatus, APPOINT_STATUS_CANCELLED, APPOINT_STATUS_UPCOMING,
        },
        case_notes::CaseNote,
        users::Role,
    },
    protocol::{EmptyRequest, SimpleResponse},
    schedule::WeekSchedule,
    AppState,
};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use anyhow::{bail, Context};
use chrono::Utc;
use diesel::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(view_schedule)
        .service(toggle_slot)
        .service(set_all_slots)
        .service(generate_schedule)
        .service(today_appoint)
        .service(waiting_client)
        .service(finish_appoint)
        .service(search_note)
        .service(add_note);
}

crate::api_funcs! {
    (get, view_schedule, "/schedule", EmptyRequest, ViewScheduleResponse),
    (post, toggle_slot, "/schedule/toggle", ToggleSlotRequest, UpdateSlotsResponse),
    (post, set_all_slots, "/schedule/set_all", SetAllSlotsRequest, UpdateSlotsResponse),
    (post, generate_schedule, "/schedule/generate", GenerateScheduleRequest, UpdateSlotsResponse),
    (get, today_appoint, "/counselor/today", EmptyRequest, TodayAppointResponse),
    (get, waiting_client, "/counselor/waiting", EmptyRequest, WaitingClientResponse),
    (post, finish_appoint, "/appointments/complete", FinishAppointRequest, SimpleResponse),
    (get, search_note, "/cases/notes", SearchNoteRequest, SearchNoteResponse),
    (post, add_note, "/cases/notes", AddNoteRequest, AddNoteResponse),
}

async fn view_schedule_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    _info: EmptyRequest,
) -> anyhow::Result<ViewScheduleResponse> {
    let user = current_user_with_role(&state, &req, &[Role::Counselor]).await?;

    let days = state.config.schedule_days.clone();
    let times = state.config.schedule_times.clone();
    let mut conn = get_db_conn(&state.pool)?;
    let schedule = web::block(move || slots::load_schedule(&mut conn, &user.id, &days, &times))
        .await
        .context("DB error")?
        .context("DB error")?;

    Ok(ViewScheduleResponse {
        success: true,
        err: "".to_string(),
        available: schedule.available_count(),
        booked: schedule.booked_count(),
        days: schedule.days,
        times: schedule.times,
        blocks: schedule.blocks,
    })
}

fn updated(changed: usize) -> UpdateSlotsResponse {
    UpdateSlotsResponse {
        success: true,
        err: "".to_string(),
        changed,
    }
}

async fn toggle_slot_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: ToggleSlotRequest,
) -> anyhow::Result<UpdateSlotsResponse> {
    let user = current_user_with_role(&state, &req, &[Role::Counselor]).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let changed = web::block(move || slots::toggle_block(&mut conn, &user.id, &info.day, &info.time))
        .await
        .context("DB error")??;

    Ok(updated(changed as usize))
}

async fn set_all_slots_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: SetAllSlotsRequest,
) -> anyhow::Result<UpdateSlotsResponse> {
    let user = current_user_with_role(&state, &req, &[Role::Counselor]).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let changed = web::block(move || slots::set_all(&mut conn, &user.id, info.available))
        .await
        .context("DB error")?
        .context("DB error")?;

    Ok(updated(changed))
}

async fn generate_schedule_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: GenerateScheduleRequest,
) -> anyhow::Result<UpdateSlotsResponse> {
    let user = current_user_with_role(&state, &req, &[Role::Counselor]).await?;

    let days = &state.config.schedule_days;
    let times = &state.config.schedule_times;
    let generated = if info.randomize {
        let mut rng = match info.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        WeekSchedule::generate(days, times, &mut rng, &[])
    } else {
        WeekSchedule::uniform(days, times, true)
    };

    let mut conn = get_db_conn(&state.pool)?;
    let counselor_id = user.id.clone();
    let written = web::block(move || slots::store_generated(&mut conn, &counselor_id, &generated))
        .await
        .context("DB error")??;

    info!(counselor = %user.id, written, randomize = info.randomize, "schedule generated");
    Ok(updated(written))
}

async fn today_appoint_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    _info: EmptyRequest,
) -> anyhow::Result<TodayAppointResponse> {
    use crate::schema::appointments;

    let user = current_user_with_role(&state, &req, &[Role::Counselor]).await?;

    let today = service_today(Utc::now(), state.config.service_utc_offset);
    let mut conn = get_db_conn(&state.pool)?;
    let (appos, names) = web::block(move || {
        let appos = appointments::table
            .filter(appointments::counselor_id.eq(&user.id))
            .filter(appointments::date.eq(today))
            .filter(appointments::status.ne(APPOINT_STATUS_CANCELLED))
            .order(appointments::time.asc())
            .get_results::<Appointment>(&mut conn)?;
        let names = appo_db::user_names(&mut conn, appos.iter().map(|a| a.client_id.clone()))?;
        QueryResult::Ok((appos, names))
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    Ok(TodayAppointResponse {
        success: true,
        err: "".to_string(),
        date: crate::utils::format_date_str(&today),
        appointments: appos
            .into_iter()
            .map(|appo| appoint_item(appo, &names))
            .collect(),
    })
}

async fn waiting_client_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    _info: EmptyRequest,
) -> anyhow::Result<WaitingClientResponse> {
    use crate::schema::appointments;

    let user = current_user_with_role(&state, &req, &[Role::Counselor]).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let (appos, names) = web::block(move || {
        let appos = appointments::table
            .filter(appointments::counselor_id.eq(&user.id))
            .filter(appointments::status.eq(APPOINT_STATUS_UPCOMING))
            .order((appointments::date.asc(), appointments::time.asc()))
            .get_results::<Appointment>(&mut conn)?;
        let names = appo_db::user_names(&mut conn, appos.iter().map(|a| a.client_id.clone()))?;
        QueryResult::Ok((appos, names))
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    let clients = appos
        .into_iter()
        .map(|appo| WaitingClientItem {
            client_name: names.get(&appo.client_id).cloned().unwrap_or_default(),
            date: crate::utils::format_date_str(&appo.date),
            appointment_id: appo.id,
            client_id: appo.client_id,
            student_id: appo.student_id,
            telephone: appo.telephone,
            time: appo.time,
            notes: appo.notes,
        })
        .collect();

    Ok(WaitingClientResponse {
        success: true,
        err: "".to_string(),
        clients,
    })
}

async fn finish_appoint_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: FinishAppointRequest,
) -> anyhow::Result<SimpleResponse> {
    let user = current_user_with_role(&state, &req, &[Role::Counselor]).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let appo = web::block(move || {
        conn.immediate_transaction(|conn| {
            appo_db::transition_appointment(conn, &user, &info.id, AppointmentStatus::Completed)
        })
    })
    .await
    .context("DB error")??;

    info!(appointment = %appo.id, "appointment completed");
    Ok(SimpleResponse::ok())
}

async fn search_note_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: SearchNoteRequest,
) -> anyhow::Result<SearchNoteResponse> {
    use crate::schema::case_notes;

    let user = current_user_with_role(&state, &req, &[Role::Counselor]).await?;

    let (first_index, limit) = crate::utils::page_bounds(info.first_index, info.limit);
    let mut conn = get_db_conn(&state.pool)?;
    let notes = web::block(move || {
        let mut query = case_notes::table
            .filter(case_notes::counselor_id.eq(user.id))
            .into_boxed();
        if let Some(client_id) = info.client_id {
            query = query.filter(case_notes::client_id.eq(client_id));
        }
        if let Some(appointment_id) = info.appointment_id {
            query = query.filter(case_notes::appointment_id.eq(appointment_id));
        }
        query
            .order(case_notes::created_at.desc())
            .offset(first_index)
            .limit(limit)
            .get_results::<CaseNote>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    let notes = notes
        .into_iter()
        .map(|note| SearchNoteItem {
            time: crate::utils::format_time_str(&note.created_at),
            id: note.id,
            appointment_id: note.appointment_id,
            client_id: note.client_id,
            content: note.content,
        })
        .collect();

    Ok(SearchNoteResponse {
        success: true,
        err: "".to_string(),
        notes,
    })
}

async fn add_note_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: AddNoteRequest,
) -> anyhow::Result<AddNoteResponse> {
    use crate::schema::case_notes;

    let user = current_user_with_role(&state, &req, &[Role::Counselor]).await?;
    let content = info.content.trim().to_string();
    if content.is_empty() {
        bail!("Note is empty");
    }

    let mut conn = get_db_conn(&state.pool)?;
    let id = web::block(move || {
        let appo = appo_db::find_appointment(&mut conn, &info.appointment_id)?;
        if appo.counselor_id != user.id {
            bail!("Not your appointment");
        }

        let note = CaseNote {
            id: crate::utils::new_id(),
            appointment_id: appo.id,
            counselor_id: user.id,
            client_id: appo.client_id,
            content,
            created_at: Utc::now().naive_utc(),
        };
        diesel::insert_into(case_notes::table)
            .values(&note)
            .execute(&mut conn)
            .context("DB error")?;
        Ok(note.id)
    })
    .await
    .context("DB error")??;

    Ok(AddNoteResponse {
        success: true,
        err: "".to_string(),
        id,
    })
}
