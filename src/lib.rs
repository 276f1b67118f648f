#[macro_use]
extern crate diesel;

pub mod account;
pub mod admin;
pub mod auth;
pub mod booking;
pub mod calendar;
pub mod client;
pub mod config;
pub mod counselor;
pub mod database;
pub mod models;
pub mod onboarding;
pub mod protocol;
pub mod report;
pub mod schedule;
pub mod schema;
pub mod utils;

use std::sync::Arc;

use actix_web::web;
use diesel::{r2d2::ConnectionManager, SqliteConnection};

use crate::{calendar::CalendarSync, config::Config};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub calendar: Arc<dyn CalendarSync>,
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(account::config)
            .configure(client::config)
            .configure(counselor::config)
            .configure(admin::config),
    );
}
