use actix_web::{http::header, web, HttpRequest};
use anyhow::Context;
use chrono::Utc;
use diesel::prelude::*;

use crate::{
    database::get_db_conn,
    models::{
        user_logins::UserLoginData,
        users::{Role, UserData},
    },
    protocol::AccessError,
    AppState,
};

pub fn bearer_token(req: &HttpRequest) -> Result<String, AccessError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AccessError::Unauthorized("missing bearer token"))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim().to_string())
        }
        _ => Err(AccessError::Unauthorized("malformed authorization header")),
    }
}

/// Resolves the session behind the request's bearer token.
pub async fn current_user(state: &AppState, req: &HttpRequest) -> anyhow::Result<UserData> {
    use crate::schema::{user_logins, users};

    let token = bearer_token(req)?;
    let max_login_secs = state.config.session_ttl_secs;

    let mut conn = get_db_conn(&state.pool)?;
    let found = web::block(move || {
        user_logins::table
            .filter(user_logins::token.eq(token))
            .inner_join(users::table.on(user_logins::user_id.eq(users::id)))
            .get_result::<(UserLoginData, UserData)>(&mut conn)
            .optional()
    })
    .await
    .context("DB error")?
    .context("DB error")?;

    let (login, user) = found.ok_or(AccessError::Unauthorized("you are not logged in"))?;
    let time_diff = Utc::now()
        .naive_utc()
        .signed_duration_since(login.login_time);
    if time_diff.num_seconds() > max_login_secs {
        return Err(AccessError::Unauthorized("login has expired").into());
    }
    if user.is_banned {
        return Err(AccessError::Unauthorized("account is banned").into());
    }

    Ok(user)
}

pub fn require_role(user: &UserData, roles: &[Role]) -> Result<(), AccessError> {
    if roles.contains(&user.role()) {
        Ok(())
    } else {
        Err(AccessError::Forbidden("not allowed for this role"))
    }
}

pub async fn current_user_with_role(
    state: &AppState,
    req: &HttpRequest,
    roles: &[Role],
) -> anyhow::Result<UserData> {
    let user = current_user(state, req).await?;
    require_role(&user, roles)?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn reads_bearer_token() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc123"))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), "abc123");

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "bearer  xyz "))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), "xyz");
    }

    #[test]
    fn rejects_missing_or_foreign_schemes() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(
            bearer_token(&req),
            Err(AccessError::Unauthorized(_))
        ));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwdw=="))
            .to_http_request();
        assert!(bearer_token(&req).is_err());

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert!(bearer_token(&req).is_err());
    }
}
