use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use counsel::{calendar::GoogleCalendar, config::Config, database, AppState};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::load()?;

    let pool = database::build_pool(&config.database_url, 8)?;
    database::init_schema(&pool)?;
    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        database::ensure_admin(&pool, username, password)?;
    }

    let calendar = GoogleCalendar::new(&config.calendar_api_base, &config.calendar_timezone);
    let bind = config.bind_addr.clone();
    let state = AppState {
        pool,
        config: Arc::new(config),
        calendar: Arc::new(calendar),
    };

    info!("Binding to {bind}");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(middleware::Logger::default())
            .configure(counsel::app_config)
    })
    .bind(&bind)
    .with_context(|| format!("Failed to bind {}", bind))?
    .run()
    .await
    .context("Server error")
}
