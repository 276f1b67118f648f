#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use actix_web::{http::header, test::TestRequest};
use anyhow::bail;
use async_trait::async_trait;
use chrono::Utc;
use counsel::{
    booking::service_today,
    calendar::{CalendarEvent, CalendarSync},
    config::Config,
    database::{self, get_db_conn, slots},
    models::{
        user_logins::UserLoginData,
        users::{Role, UserData},
    },
    onboarding::{self, DbFlagStore},
    schedule::WeekSchedule,
    utils::{generate_login_token, hash_password},
    AppState,
};
use diesel::prelude::*;
use serde_json::Value;

pub const PASSWORD: &str = "password";
pub const STUDENT_ID: &str = "650610001";
pub const TELEPHONE: &str = "0812345678";
pub const ALL_DAYS: &str = "Monday,Tuesday,Wednesday,Thursday,Friday,Saturday,Sunday";

/// Calendar provider that records calls instead of talking to the network.
#[derive(Default)]
pub struct StubCalendar {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CalendarSync for StubCalendar {
    async fn create_event(&self, access_token: &str, event: &CalendarEvent) -> anyhow::Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if access_token == "bad-token" {
            bail!("calendar rejected the token");
        }
        assert!(event.end > event.start);
        Ok(format!("evt-{}", n))
    }
}

pub struct TestContext {
    pub state: AppState,
    pub calendar: Arc<StubCalendar>,
    db_path: PathBuf,
}

fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!(
        "counsel-test-{}-{}.db",
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ))
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(configure: impl FnOnce(&mut Config)) -> Self {
        let db_path = temp_db_path();
        let mut config = Config {
            database_url: db_path.to_string_lossy().to_string(),
            schedule_days: ALL_DAYS.split(',').map(str::to_string).collect(),
            ..Default::default()
        };
        configure(&mut config);
        config.validate().expect("valid test config");

        let pool = database::build_pool(&config.database_url, 4).expect("pool");
        database::init_schema(&pool).expect("schema");

        let calendar = Arc::new(StubCalendar::default());
        let state = AppState {
            pool,
            config: Arc::new(config),
            calendar: calendar.clone(),
        };
        Self {
            state,
            calendar,
            db_path,
        }
    }

    pub fn conn(
        &self,
    ) -> r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>> {
        get_db_conn(&self.state.pool).expect("connection")
    }

    pub fn add_user(&self, id: &str, role: Role) {
        use counsel::schema::users;

        let data = UserData {
            id: id.to_string(),
            password: hash_password(PASSWORD),
            name: format!("{} name", id),
            role: role.as_str().to_string(),
            student_id: None,
            telephone: None,
            is_banned: false,
            created_at: Utc::now().naive_utc(),
        };
        diesel::insert_into(users::table)
            .values(&data)
            .execute(&mut self.conn())
            .expect("insert user");
    }

    /// Opens a session for `id` and returns its bearer token.
    pub fn login(&self, id: &str) -> String {
        use counsel::schema::{user_logins, users};

        let role = users::table
            .filter(users::id.eq(id))
            .select(users::role)
            .get_result::<String>(&mut self.conn())
            .expect("user exists");
        let data = UserLoginData {
            token: generate_login_token(id, &role),
            user_id: id.to_string(),
            login_time: Utc::now().naive_utc(),
        };
        diesel::insert_into(user_logins::table)
            .values(&data)
            .execute(&mut self.conn())
            .expect("insert login");
        data.token
    }

    pub fn finish_onboarding(&self, id: &str) {
        let mut conn = self.conn();
        onboarding::skip_all(&mut DbFlagStore::new(&mut conn, id)).expect("onboarding");
    }

    /// A client that may book right away.
    pub fn ready_client(&self, id: &str) -> String {
        self.add_user(id, Role::Client);
        self.finish_onboarding(id);
        self.login(id)
    }

    /// A counselor whose whole grid is open.
    pub fn open_counselor(&self, id: &str) -> String {
        self.add_user(id, Role::Counselor);
        let grid = WeekSchedule::uniform(
            &self.state.config.schedule_days,
            &self.state.config.schedule_times,
            true,
        );
        slots::store_generated(&mut self.conn(), id, &grid).expect("grid");
        self.login(id)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub fn get(uri: &str, token: &str) -> TestRequest {
    TestRequest::get()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

pub fn post(uri: &str, token: &str, body: Value) -> TestRequest {
    TestRequest::post()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .set_json(body)
}

/// A POST carrying only the bearer header, with no body or content type.
pub fn post_bare(uri: &str, token: &str) -> TestRequest {
    TestRequest::post()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

pub fn booking(counselor: &str, day: &str, time: &str) -> Value {
    serde_json::json!({
        "counselor_id": counselor,
        "day": day,
        "time": time,
        "student_id": STUDENT_ID,
        "telephone": TELEPHONE,
    })
}

/// Today's weekday in the service's offset.
pub fn today_name(ctx: &TestContext) -> String {
    service_today(Utc::now(), ctx.state.config.service_utc_offset)
        .format("%A")
        .to_string()
}

/// Builds the app service around the context's state.
#[allow(unused_macros)]
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($ctx.state.clone()))
                .configure(counsel::app_config),
        )
        .await
    };
}
