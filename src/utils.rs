/// Declares actix handlers that unpack the request, call `<name>_impl` and turn
/// its `anyhow::Result` into a JSON response. `get` routes read their request
/// from the query string, `post` routes from the JSON body. `post_empty` routes
/// ignore the body, so a bare POST is accepted.
#[macro_export]
macro_rules! api_funcs {
    ( $( ( $method:ident, $func_name:ident, $url:literal, $request:ty, $response:ty ) ),+ $(,)? ) => {
        $(
            $crate::api_funcs!(@handler $method, $func_name, $url, $request, $response);
        )+
    };
    (@handler get, $func_name:ident, $url:literal, $request:ty, $response:ty) => {
        paste::paste! {
            #[get($url)]
            async fn $func_name(
                state: web::Data<AppState>,
                req: HttpRequest,
                info: web::Query<$request>,
            ) -> HttpResponse {
                match [<$func_name _impl>](state, req, info.into_inner()).await {
                    Ok(response) => HttpResponse::Ok().json(response),
                    Err(err) => $crate::protocol::error_response::<$response>(err),
                }
            }
        }
    };
    (@handler post, $func_name:ident, $url:literal, $request:ty, $response:ty) => {
        paste::paste! {
            #[post($url)]
            async fn $func_name(
                state: web::Data<AppState>,
                req: HttpRequest,
                info: web::Json<$request>,
            ) -> HttpResponse {
                match [<$func_name _impl>](state, req, info.into_inner()).await {
                    Ok(response) => HttpResponse::Ok().json(response),
                    Err(err) => $crate::protocol::error_response::<$response>(err),
                }
            }
        }
    };
    (@handler post_empty, $func_name:ident, $url:literal, $request:ty, $response:ty) => {
        paste::paste! {
            #[post($url)]
            async fn $func_name(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
                match [<$func_name _impl>](state, req, <$request>::default()).await {
                    Ok(response) => HttpResponse::Ok().json(response),
                    Err(err) => $crate::protocol::error_response::<$response>(err),
                }
            }
        }
    };
}

use blake2::{Blake2b, Digest};
use chrono::{NaiveDate, NaiveDateTime};

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Blake2b::digest(password.as_bytes()))
}

/// Session tokens mix the user id with a random nonce so repeated logins
/// never collide.
pub fn generate_login_token(user_id: &str, role: &str) -> String {
    let nonce = uuid::Uuid::new_v4();
    let seed = format!("{}:{}:{}", role, user_id, nonce);
    format!("{:x}", Blake2b::digest(seed.as_bytes()))
}

/// Case codes are short enough to read out over the phone.
pub fn generate_case_code() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn format_time_str(time: &NaiveDateTime) -> String {
    const TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";

    format!("{}+00:00", time.format(TIME_FMT))
}

pub fn format_date_str(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn get_str_pattern<S: AsRef<str>>(s: S) -> String {
    format!("%{}%", s.as_ref())
}

pub fn get_str_pattern_opt<S: AsRef<str>>(s: Option<S>) -> String {
    match s {
        Some(s) => get_str_pattern(s),
        None => "%".to_string(),
    }
}

pub fn page_bounds(first_index: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let first_index = first_index.unwrap_or(0).max(0);
    let limit = limit.unwrap_or(30).clamp(0, 200);
    (first_index, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_stable_hex() {
        let hash = hash_password("secret");
        assert_eq!(hash, hash_password("secret"));
        assert_ne!(hash, hash_password("Secret"));
        assert_eq!(hash.len(), 128);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn login_tokens_differ_per_login() {
        assert_ne!(
            generate_login_token("u1", "client"),
            generate_login_token("u1", "client")
        );
    }

    #[test]
    fn case_codes_are_eight_uppercase_chars() {
        let code = generate_case_code();
        assert_eq!(code.len(), 8);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn patterns_wrap_like_wildcards() {
        assert_eq!(get_str_pattern("ann"), "%ann%");
        assert_eq!(get_str_pattern_opt::<&str>(None), "%");
    }

    #[test]
    fn page_bounds_clamp() {
        assert_eq!(page_bounds(None, None), (0, 30));
        assert_eq!(page_bounds(Some(-5), Some(1000)), (0, 200));
        assert_eq!(page_bounds(Some(10), Some(5)), (10, 5));
    }
}
