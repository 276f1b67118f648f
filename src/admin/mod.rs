mod requests;
mod responses;
mod utils;

use crate::{
    account::utils::optional_digits,
    auth::current_user_with_role,
    booking::{validate_student_id, validate_telephone},
    database::{assert, get_db_conn},
    models::{
        appointments::APPOINT_STATUS_UPCOMING,
        case_codes::NewCaseCode,
        users::{Role, UserData},
    },
    protocol::{EmptyRequest, SimpleResponse},
    report::render_stats_report,
    utils::{generate_case_code, hash_password},
    AppState,
};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use anyhow::{bail, Context};
use chrono::Utc;
use diesel::prelude::*;
use tracing::info;

use self::{requests::*, responses::*, utils::collect_stats};

const MAX_CASE_CODES: u32 = 100;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(view_stats)
        .service(view_report)
        .service(issue_case_code)
        .service(search_user)
        .service(add_user)
        .service(modify_role)
        .service(ban_user);
}

crate::api_funcs! {
    (get, view_stats, "/admin/stats", EmptyRequest, ViewStatsResponse),
    (post, issue_case_code, "/admin/case_codes", IssueCaseCodeRequest, IssueCaseCodeResponse),
    (get, search_user, "/users", SearchUserRequest, SearchUserResponse),
    (post, add_user, "/users", AddUserRequest, SimpleResponse),
    (post, modify_role, "/users/role", ModifyRoleRequest, SimpleResponse),
    (post, ban_user, "/users/ban", BanUserRequest, SimpleResponse),
}

async fn view_stats_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    _info: EmptyRequest,
) -> anyhow::Result<ViewStatsResponse> {
    current_user_with_role(&state, &req, &[Role::Admin]).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let stats = web::block(move || collect_stats(&mut conn))
        .await
        .context("DB error")?
        .context("DB error")?;

    Ok(ViewStatsResponse {
        success: true,
        err: "".to_string(),
        stats,
    })
}

#[get("/admin/report")]
async fn view_report(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: web::Query<ViewReportRequest>,
) -> HttpResponse {
    match view_report_impl(state, req, info.into_inner()).await {
        Ok(html) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(err) => crate::protocol::error_response::<SimpleResponse>(err),
    }
}

async fn view_report_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: ViewReportRequest,
) -> anyhow::Result<String> {
    let user = current_user_with_role(&state, &req, &[Role::Admin]).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let stats = web::block(move || collect_stats(&mut conn))
        .await
        .context("DB error")?
        .context("DB error")?;

    let title = info
        .title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| "Counseling service report".to_string());
    info!(admin = %user.id, "report rendered");
    Ok(render_stats_report(
        &title,
        &stats,
        Utc::now().naive_utc(),
        info.auto_print,
    )
    .into_string())
}

async fn issue_case_code_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: IssueCaseCodeRequest,
) -> anyhow::Result<IssueCaseCodeResponse> {
    use crate::schema::case_codes;

    let user = current_user_with_role(&state, &req, &[Role::Admin]).await?;
    let count = info.count.unwrap_or(1);
    if count == 0 || count > MAX_CASE_CODES {
        bail!("Can issue between 1 and {} codes at once", MAX_CASE_CODES);
    }

    let now = Utc::now().naive_utc();
    let data: Vec<NewCaseCode> = (0..count)
        .map(|_| NewCaseCode {
            code: generate_case_code(),
            issued_by: user.id.clone(),
            created_at: now,
        })
        .collect();
    let codes = data.iter().map(|code| code.code.clone()).collect();

    let mut conn = get_db_conn(&state.pool)?;
    web::block(move || {
        diesel::insert_into(case_codes::table)
            .values(&data)
            .execute(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    info!(admin = %user.id, count, "case codes issued");
    Ok(IssueCaseCodeResponse {
        success: true,
        err: "".to_string(),
        codes,
    })
}

async fn search_user_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: SearchUserRequest,
) -> anyhow::Result<SearchUserResponse> {
    use crate::schema::users;

    current_user_with_role(&state, &req, &[Role::Admin]).await?;
    let role = info
        .role
        .map(|role| role.parse::<Role>())
        .transpose()?;

    let name_pattern = crate::utils::get_str_pattern_opt(info.name);
    let (first_index, limit) = crate::utils::page_bounds(info.first_index, info.limit);
    let mut conn = get_db_conn(&state.pool)?;
    let usrs = web::block(move || {
        let mut query = users::table
            .filter(users::name.like(name_pattern.clone()).or(users::id.like(name_pattern)))
            .into_boxed();
        if let Some(role) = role {
            query = query.filter(users::role.eq(role.as_str()));
        }
        if let Some(banned) = info.banned {
            query = query.filter(users::is_banned.eq(banned));
        }
        query
            .order(users::id.asc())
            .offset(first_index)
            .limit(limit)
            .get_results::<UserData>(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    let usrs = usrs
        .into_iter()
        .map(|data| SearchUserItem {
            id: data.id,
            name: data.name,
            role: data.role,
            student_id: data.student_id.unwrap_or_default(),
            telephone: data.telephone.unwrap_or_default(),
            is_banned: data.is_banned,
        })
        .collect();

    Ok(SearchUserResponse {
        success: true,
        err: "".to_string(),
        users: usrs,
    })
}

async fn add_user_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: AddUserRequest,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::users;

    let admin = current_user_with_role(&state, &req, &[Role::Admin]).await?;
    let role = info.role.parse::<Role>()?;
    let username = info.username.trim().to_string();
    if username.is_empty() || info.password.is_empty() {
        bail!("Username and password are required");
    }
    let student_id = optional_digits(info.student_id, validate_student_id)?;
    let telephone = optional_digits(info.telephone, validate_telephone)?;

    let mut conn = get_db_conn(&state.pool)?;
    web::block(move || {
        conn.transaction(|conn| {
            let res = users::table
                .filter(users::id.eq(&username))
                .count()
                .get_result::<i64>(conn)
                .context("DB error")?;
            if res > 0 {
                bail!("Username already taken");
            }

            let data = UserData {
                id: username,
                password: hash_password(&info.password),
                name: info.name,
                role: role.as_str().to_string(),
                student_id,
                telephone,
                is_banned: false,
                created_at: Utc::now().naive_utc(),
            };
            diesel::insert_into(users::table)
                .values(&data)
                .execute(conn)
                .context("DB error")?;

            info!(admin = %admin.id, user = %data.id, %role, "user created");
            Ok(())
        })
    })
    .await
    .context("DB error")??;

    Ok(SimpleResponse::ok())
}

async fn modify_role_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: ModifyRoleRequest,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::{appointments, users};

    let admin = current_user_with_role(&state, &req, &[Role::Admin]).await?;
    let role = info.role.parse::<Role>()?;
    if info.user_id == admin.id {
        bail!("Cannot change your own role");
    }
    assert::assert_user(&state.pool, info.user_id.clone()).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let user_id = info.user_id;
    web::block(move || {
        conn.immediate_transaction(|conn| {
            let data = users::table
                .filter(users::id.eq(&user_id))
                .get_result::<UserData>(conn)
                .context("DB error")?;
            if data.role() == role {
                return Ok(());
            }
            if data.role() == Role::Counselor {
                let upcoming = appointments::table
                    .filter(appointments::counselor_id.eq(&user_id))
                    .filter(appointments::status.eq(APPOINT_STATUS_UPCOMING))
                    .count()
                    .get_result::<i64>(conn)
                    .context("DB error")?;
                if upcoming > 0 {
                    bail!("Counselor still has upcoming appointments");
                }
            }

            diesel::update(users::table.filter(users::id.eq(&user_id)))
                .set(users::role.eq(role.as_str()))
                .execute(conn)
                .context("DB error")?;

            info!(admin = %admin.id, user = %user_id, %role, "role changed");
            Ok(())
        })
    })
    .await
    .context("DB error")??;

    Ok(SimpleResponse::ok())
}

async fn ban_user_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: BanUserRequest,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::{user_logins, users};

    let admin = current_user_with_role(&state, &req, &[Role::Admin]).await?;
    if info.user_id == admin.id {
        bail!("Cannot ban yourself");
    }
    assert::assert_user(&state.pool, info.user_id.clone()).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let user_id = info.user_id;
    let is_banned = info.banned;
    web::block(move || {
        conn.transaction(|conn| {
            let data = users::table
                .filter(users::id.eq(&user_id))
                .get_result::<UserData>(conn)
                .context("DB error")?;

            if data.is_banned && is_banned {
                bail!("User is already banned");
            }
            if !data.is_banned && !is_banned {
                bail!("User is not banned");
            }

            diesel::update(users::table.filter(users::id.eq(&user_id)))
                .set(users::is_banned.eq(is_banned))
                .execute(conn)
                .context("DB error")?;
            if is_banned {
                diesel::delete(user_logins::table.filter(user_logins::user_id.eq(&user_id)))
                    .execute(conn)
                    .context("DB error")?;
            }

            info!(admin = %admin.id, user = %user_id, banned = is_banned, "ban state changed");
            Ok(())
        })
    })
    .await
    .context("DB error")??;

    Ok(SimpleResponse::ok())
}
