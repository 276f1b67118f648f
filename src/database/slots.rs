//! Persistent weekly grids. Every write that could touch a booked block is a
//! conditional update on `booked_by IS NULL`, so concurrent requests cannot
//! double-book a slot or unblock a booked one.

use anyhow::Context;
use diesel::prelude::*;

use crate::{
    models::time_blocks::TimeBlockData,
    schedule::{TimeBlock, WeekSchedule},
    schema::time_blocks,
};

pub fn load_schedule(
    conn: &mut SqliteConnection,
    counselor_id: &str,
    days: &[String],
    times: &[String],
) -> QueryResult<WeekSchedule> {
    let blocks = time_blocks::table
        .filter(time_blocks::counselor_id.eq(counselor_id))
        .get_results::<TimeBlockData>(conn)?
        .into_iter()
        .map(TimeBlock::from)
        .collect();
    Ok(WeekSchedule::from_blocks(days, times, blocks))
}

pub fn find_block(
    conn: &mut SqliteConnection,
    counselor_id: &str,
    day: &str,
    time: &str,
) -> QueryResult<Option<TimeBlock>> {
    time_blocks::table
        .filter(time_blocks::counselor_id.eq(counselor_id))
        .filter(time_blocks::day.eq(day))
        .filter(time_blocks::time.eq(time))
        .get_result::<TimeBlockData>(conn)
        .optional()
        .map(|data| data.map(TimeBlock::from))
}

/// Flips a free block. Booked or unknown blocks are skipped without error.
pub fn toggle_block(
    conn: &mut SqliteConnection,
    counselor_id: &str,
    day: &str,
    time: &str,
) -> anyhow::Result<bool> {
    conn.immediate_transaction(|conn| {
        let mut block = match find_block(conn, counselor_id, day, time)? {
            Some(block) => block,
            None => return Ok(false),
        };
        if !block.toggle() {
            return Ok(false);
        }

        let updated = diesel::update(
            time_blocks::table
                .filter(time_blocks::counselor_id.eq(counselor_id))
                .filter(time_blocks::day.eq(day))
                .filter(time_blocks::time.eq(time))
                .filter(time_blocks::booked_by.is_null()),
        )
        .set(time_blocks::available.eq(block.available))
        .execute(conn)
        .context("DB error")?;
        Ok(updated == 1)
    })
}

pub fn set_all(
    conn: &mut SqliteConnection,
    counselor_id: &str,
    available: bool,
) -> QueryResult<usize> {
    diesel::update(
        time_blocks::table
            .filter(time_blocks::counselor_id.eq(counselor_id))
            .filter(time_blocks::booked_by.is_null())
            .filter(time_blocks::available.ne(available)),
    )
    .set(time_blocks::available.eq(available))
    .execute(conn)
}

/// Compare-and-swap from available to booked. Returns false when somebody
/// else got there first or the block is not open.
pub fn reserve_block(
    conn: &mut SqliteConnection,
    counselor_id: &str,
    day: &str,
    time: &str,
    client_id: &str,
) -> QueryResult<bool> {
    let updated = diesel::update(
        time_blocks::table
            .filter(time_blocks::counselor_id.eq(counselor_id))
            .filter(time_blocks::day.eq(day))
            .filter(time_blocks::time.eq(time))
            .filter(time_blocks::available.eq(true))
            .filter(time_blocks::booked_by.is_null()),
    )
    .set((
        time_blocks::available.eq(false),
        time_blocks::booked_by.eq(Some(client_id)),
    ))
    .execute(conn)?;
    Ok(updated == 1)
}

pub fn release_block(
    conn: &mut SqliteConnection,
    counselor_id: &str,
    day: &str,
    time: &str,
    client_id: &str,
) -> QueryResult<bool> {
    let updated = diesel::update(
        time_blocks::table
            .filter(time_blocks::counselor_id.eq(counselor_id))
            .filter(time_blocks::day.eq(day))
            .filter(time_blocks::time.eq(time))
            .filter(time_blocks::booked_by.eq(client_id)),
    )
    .set((
        time_blocks::available.eq(true),
        time_blocks::booked_by.eq(None::<String>),
    ))
    .execute(conn)?;
    Ok(updated == 1)
}

/// Writes a freshly generated grid over the stored one. Booked blocks keep
/// their booking, and generated bookings are ignored: only real reservations
/// may book a stored block. Returns the number of blocks written.
pub fn store_generated(
    conn: &mut SqliteConnection,
    counselor_id: &str,
    generated: &WeekSchedule,
) -> anyhow::Result<usize> {
    conn.immediate_transaction(|conn| {
        let mut written = 0;
        for block in &generated.blocks {
            let available = block.available && !block.is_booked();
            match find_block(conn, counselor_id, &block.day, &block.time)? {
                Some(existing) if existing.is_booked() => continue,
                Some(_) => {
                    written += diesel::update(
                        time_blocks::table
                            .filter(time_blocks::counselor_id.eq(counselor_id))
                            .filter(time_blocks::day.eq(&block.day))
                            .filter(time_blocks::time.eq(&block.time))
                            .filter(time_blocks::booked_by.is_null()),
                    )
                    .set(time_blocks::available.eq(available))
                    .execute(conn)
                    .context("DB error")?;
                }
                None => {
                    let mut data = TimeBlockData::from_block(counselor_id, block);
                    data.available = available;
                    data.booked_by = None;
                    written += diesel::insert_into(time_blocks::table)
                        .values(&data)
                        .execute(conn)
                        .context("DB error")?;
                }
            }
        }
        Ok(written)
    })
}
