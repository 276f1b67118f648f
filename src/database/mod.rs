pub mod appointments;
pub mod assert;
pub mod slots;

use crate::{
    models::users::{Role, UserData},
    utils::hash_password,
    DbPool,
};
use anyhow::Context;
use chrono::Utc;
use diesel::{
    connection::SimpleConnection,
    prelude::*,
    r2d2::{ConnectionManager, CustomizeConnection},
};
use r2d2::PooledConnection;
use tracing::info;

const SCHEMA_SQL: &str = include_str!("schema.sql");

#[derive(Debug)]
struct SqliteSetup;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteSetup {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn build_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqliteSetup))
        .build(manager)
        .context("Failed to create pool")
}

pub fn get_db_conn(
    pool: &DbPool,
) -> anyhow::Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
    pool.get().context("DB connection")
}

pub fn init_schema(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = get_db_conn(pool)?;
    conn.batch_execute(SCHEMA_SQL).context("Failed to create schema")
}

/// Creates the admin account if it is missing. An existing account is left
/// untouched.
pub fn ensure_admin(pool: &DbPool, username: &str, password: &str) -> anyhow::Result<()> {
    use crate::schema::users;

    let mut conn = get_db_conn(pool)?;
    let exists = users::table
        .filter(users::id.eq(username))
        .count()
        .get_result::<i64>(&mut conn)
        .context("DB error")?;
    if exists > 0 {
        return Ok(());
    }

    let data = UserData {
        id: username.to_string(),
        password: hash_password(password),
        name: username.to_string(),
        role: Role::Admin.as_str().to_string(),
        student_id: None,
        telephone: None,
        is_banned: false,
        created_at: Utc::now().naive_utc(),
    };
    diesel::insert_into(users::table)
        .values(&data)
        .execute(&mut conn)
        .context("DB error")?;
    info!(admin = %username, "created bootstrap admin");

    Ok(())
}
