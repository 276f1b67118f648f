mod common;

use std::{
    sync::{Arc, Barrier},
    thread,
};

use common::*;
use counsel::{
    database::{get_db_conn, slots},
    models::users::Role,
};

const CLIENTS: usize = 8;

#[test]
fn concurrent_reservations_yield_one_booking() {
    let ctx = TestContext::new();
    ctx.open_counselor("dr_a");
    for i in 0..CLIENTS {
        ctx.add_user(&format!("client{}", i), Role::Client);
    }

    let barrier = Arc::new(Barrier::new(CLIENTS));
    let handles: Vec<_> = (0..CLIENTS)
        .map(|i| {
            let pool = ctx.state.pool.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let client = format!("client{}", i);
                barrier.wait();
                let mut conn = get_db_conn(&pool).expect("connection");
                conn.immediate_transaction(|conn| {
                    slots::reserve_block(conn, "dr_a", "Monday", "09:00", &client)
                })
                .expect("reservation")
            })
        })
        .collect();

    let wins = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread"))
        .filter(|won| *won)
        .count();
    assert_eq!(wins, 1);

    let block = slots::find_block(&mut ctx.conn(), "dr_a", "Monday", "09:00")
        .expect("query")
        .expect("block");
    assert!(!block.available);
    assert!(block.booked_by.as_deref().unwrap().starts_with("client"));
}

#[test]
fn release_only_frees_own_booking() {
    let ctx = TestContext::new();
    ctx.open_counselor("dr_a");
    ctx.add_user("amy", Role::Client);
    ctx.add_user("ben", Role::Client);
    let mut conn = ctx.conn();

    assert!(slots::reserve_block(&mut conn, "dr_a", "Friday", "14:00", "amy").unwrap());
    assert!(!slots::reserve_block(&mut conn, "dr_a", "Friday", "14:00", "ben").unwrap());
    assert!(!slots::release_block(&mut conn, "dr_a", "Friday", "14:00", "ben").unwrap());
    assert!(slots::release_block(&mut conn, "dr_a", "Friday", "14:00", "amy").unwrap());

    let block = slots::find_block(&mut conn, "dr_a", "Friday", "14:00")
        .unwrap()
        .unwrap();
    assert!(block.available);
    assert_eq!(block.booked_by, None);
}
