mod requests;
mod responses;
pub(crate) mod utils;

use crate::{
    auth::{bearer_token, current_user, current_user_with_role},
    booking::{validate_student_id, validate_telephone},
    database::get_db_conn,
    models::{
        user_logins::UserLoginData,
        users::{Role, UpdateUser, UserData},
    },
    onboarding::{self, DbFlagStore, Step},
    protocol::{EmptyRequest, SimpleResponse},
    utils::{generate_login_token, hash_password},
    AppState,
};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use anyhow::{bail, Context};
use chrono::Utc;
use diesel::prelude::*;
use tracing::info;

use self::{requests::*, responses::*, utils::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(view_info)
        .service(modify_info)
        .service(modify_password)
        .service(view_onboarding)
        .service(complete_onboarding)
        .service(skip_onboarding)
        .service(verify_code);
}

crate::api_funcs! {
    (post, register, "/auth/register", RegisterRequest, SimpleResponse),
    (post, login, "/auth/login", LoginRequest, LoginResponse),
    (post_empty, logout, "/auth/logout", EmptyRequest, SimpleResponse),
    (get, view_info, "/users/me", EmptyRequest, ViewInfoResponse),
    (post, modify_info, "/users/me", ModifyInfoRequest, SimpleResponse),
    (post, modify_password, "/users/me/password", ModifyPasswordRequest, SimpleResponse),
    (get, view_onboarding, "/onboarding", EmptyRequest, OnboardingResponse),
    (post, complete_onboarding, "/onboarding/complete", CompleteStepRequest, OnboardingResponse),
    (post_empty, skip_onboarding, "/onboarding/skip", EmptyRequest, OnboardingResponse),
    (post, verify_code, "/cases/verify-code", VerifyCodeRequest, OnboardingResponse),
}

async fn register_impl(
    state: web::Data<AppState>,
    _req: HttpRequest,
    info: RegisterRequest,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::users;

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
                role: Role::Client.as_str().to_string(),
                student_id,
                telephone,
                is_banned: false,
                created_at: Utc::now().naive_utc(),
            };
            diesel::insert_into(users::table)
                .values(&data)
                .execute(conn)
                .context("DB error")?;

            info!(user = %data.id, "registered client");
            Ok(())
        })
    })
    .await
    .context("DB error")??;

    Ok(SimpleResponse::ok())
}

async fn login_impl(
    state: web::Data<AppState>,
    _req: HttpRequest,
    info: LoginRequest,
) -> anyhow::Result<LoginResponse> {
    use crate::schema::{user_logins, users};

    let mut conn = get_db_conn(&state.pool)?;
    let (login_token, role) = web::block(move || {
        conn.transaction(|conn| {
            let hashed_password = hash_password(&info.password);
            let user = users::table
                .filter(users::id.eq(&info.username))
                .filter(users::password.eq(&hashed_password))
                .filter(users::is_banned.eq(false))
                .get_result::<UserData>(conn)
                .optional()
                .context("DB error")?;
            let user = match user {
                Some(user) => user,
                None => bail!("Wrong username or password"),
            };

            let login_token = generate_login_token(&user.id, &user.role);
            let token_data = UserLoginData {
                token: login_token.clone(),
                user_id: user.id.clone(),
                login_time: Utc::now().naive_utc(),
            };
            diesel::insert_into(user_logins::table)
                .values(&token_data)
                .execute(conn)
                .context("DB error")?;

            info!(user = %user.id, role = %user.role, "logged in");
            Ok((login_token, user.role))
        })
    })
    .await
    .context("DB error")??;

    Ok(LoginResponse {
        success: true,
        err: "".to_string(),
        login_token,
        role,
    })
}

async fn logout_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    _info: EmptyRequest,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::user_logins;

    let token = bearer_token(&req)?;
    let mut conn = get_db_conn(&state.pool)?;
    web::block(move || {
        diesel::delete(user_logins::table.filter(user_logins::token.eq(token))).execute(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    Ok(SimpleResponse::ok())
}

async fn view_info_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    _info: EmptyRequest,
) -> anyhow::Result<ViewInfoResponse> {
    let user = current_user(&state, &req).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let (user, step) = web::block(move || {
        let step = onboarding_step(&mut conn, &user)?;
        anyhow::Ok((user, step))
    })
    .await
    .context("DB error")??;

    Ok(ViewInfoResponse {
        success: true,
        err: "".to_string(),
        id: user.id,
        name: user.name,
        role: user.role,
        student_id: user.student_id.unwrap_or_default(),
        telephone: user.telephone.unwrap_or_default(),
        onboarding: step.to_string(),
    })
}

async fn modify_info_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: ModifyInfoRequest,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::users;

    let user = current_user(&state, &req).await?;

    let data = UpdateUser {
        name: info.name.filter(|name| !name.trim().is_empty()),
        student_id: optional_digits(info.student_id, validate_student_id)?,
        telephone: optional_digits(info.telephone, validate_telephone)?,
    };
    if data.name.is_none() && data.student_id.is_none() && data.telephone.is_none() {
        return Ok(SimpleResponse::ok());
    }

    let mut conn = get_db_conn(&state.pool)?;
    web::block(move || {
        diesel::update(users::table.filter(users::id.eq(user.id)))
            .set(&data)
            .execute(&mut conn)
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    Ok(SimpleResponse::ok())
}

async fn modify_password_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: ModifyPasswordRequest,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::users;

    let user = current_user(&state, &req).await?;
    if info.password_new.is_empty() {
        bail!("New password is empty");
    }

    let mut conn = get_db_conn(&state.pool)?;
    web::block(move || {
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(&user.id))
                .filter(users::password.eq(hash_password(&info.password_old))),
        )
        .set(users::password.eq(hash_password(&info.password_new)))
        .execute(&mut conn)
        .context("DB error")?;
        if updated != 1 {
            bail!("Wrong password");
        }
        Ok(())
    })
    .await
    .context("DB error")??;

    Ok(SimpleResponse::ok())
}

fn step_response(step: Step) -> OnboardingResponse {
    OnboardingResponse {
        success: true,
        err: "".to_string(),
        step: step.to_string(),
    }
}

async fn view_onboarding_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    _info: EmptyRequest,
) -> anyhow::Result<OnboardingResponse> {
    let user = current_user(&state, &req).await?;

    let mut conn = get_db_conn(&state.pool)?;
    let step = web::block(move || onboarding_step(&mut conn, &user))
        .await
        .context("DB error")??;

    Ok(step_response(step))
}

async fn complete_onboarding_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: CompleteStepRequest,
) -> anyhow::Result<OnboardingResponse> {
    let user = current_user_with_role(&state, &req, &[Role::Client]).await?;
    let step = info.step.parse::<Step>()?;
    if step == Step::Token {
        bail!("The token step is completed by verifying a case code");
    }

    let mut conn = get_db_conn(&state.pool)?;
    let next = web::block(move || {
        conn.transaction(|conn| onboarding::complete(&mut DbFlagStore::new(conn, &user.id), step))
    })
    .await
    .context("DB error")??;

    Ok(step_response(next))
}

async fn skip_onboarding_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    _info: EmptyRequest,
) -> anyhow::Result<OnboardingResponse> {
    let user = current_user_with_role(&state, &req, &[Role::Client]).await?;
    if !state.config.onboarding_debug_skip {
        bail!("Skipping onboarding is disabled");
    }

    let mut conn = get_db_conn(&state.pool)?;
    let next = web::block(move || {
        conn.transaction(|conn| onboarding::skip_all(&mut DbFlagStore::new(conn, &user.id)))
    })
    .await
    .context("DB error")??;

    Ok(step_response(next))
}

async fn verify_code_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: VerifyCodeRequest,
) -> anyhow::Result<OnboardingResponse> {
    use crate::schema::case_codes;

    let user = current_user_with_role(&state, &req, &[Role::Client]).await?;
    let code = info.code.trim().to_uppercase();
    if code.is_empty() {
        bail!("Case code is required");
    }

    let mut conn = get_db_conn(&state.pool)?;
    let next = web::block(move || {
        conn.immediate_transaction(|conn| {
            let current = onboarding::current_step(&mut DbFlagStore::new(conn, &user.id))?;
            match current {
                Step::Token => {}
                Step::Done => bail!("Case code already verified"),
                _ => bail!("Finish the {} step first", current),
            }

            let claimed = diesel::update(
                case_codes::table
                    .filter(case_codes::code.eq(&code))
                    .filter(case_codes::used_by.is_null()),
            )
            .set((
                case_codes::used_by.eq(Some(user.id.as_str())),
                case_codes::used_at.eq(Some(Utc::now().naive_utc())),
            ))
            .execute(conn)
            .context("DB error")?;
            if claimed != 1 {
                bail!("Invalid or used case code");
            }

            let next = onboarding::complete(&mut DbFlagStore::new(conn, &user.id), Step::Token)?;
            info!(user = %user.id, "case code verified");
            Ok(next)
        })
    })
    .await
    .context("DB error")??;

    Ok(step_response(next))
}
