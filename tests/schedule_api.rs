#[macro_use]
mod common;

use actix_web::test;
use common::*;
use counsel::models::users::Role;
use serde_json::{json, Value};

fn block<'a>(res: &'a Value, day: &str, time: &str) -> &'a Value {
    res["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["day"] == day && b["time"] == time)
        .unwrap()
}

#[actix_web::test]
async fn fresh_counselor_generates_grid() {
    let ctx = TestContext::new();
    ctx.add_user("dr_a", Role::Counselor);
    let counselor = ctx.login("dr_a");
    let app = init_app!(ctx);

    let res: Value =
        test::call_and_read_body_json(&app, get("/api/schedule", &counselor).to_request()).await;
    let cells = 7 * ctx.state.config.schedule_times.len();
    assert_eq!(res["blocks"].as_array().unwrap().len(), cells);
    assert_eq!(res["available"], 0);

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/schedule/generate", &counselor, json!({})).to_request(),
    )
    .await;
    assert_eq!(res["changed"], cells);

    let res: Value =
        test::call_and_read_body_json(&app, get("/api/schedule", &counselor).to_request()).await;
    assert_eq!(res["available"], cells);
    assert_eq!(res["booked"], 0);
}

#[actix_web::test]
async fn seeded_random_grid_is_reproducible() {
    let ctx = TestContext::new();
    ctx.add_user("dr_a", Role::Counselor);
    ctx.add_user("dr_b", Role::Counselor);
    let a = ctx.login("dr_a");
    let b = ctx.login("dr_b");
    let app = init_app!(ctx);

    let mut grids = Vec::new();
    for token in [&a, &b] {
        let res: Value = test::call_and_read_body_json(
            &app,
            post(
                "/api/schedule/generate",
                token,
                json!({ "randomize": true, "seed": 42 }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(res["success"], true);
        let res: Value =
            test::call_and_read_body_json(&app, get("/api/schedule", token).to_request()).await;
        // Generated grids never carry bookings.
        assert_eq!(res["booked"], 0);
        grids.push(res["blocks"].clone());
    }
    assert_eq!(grids[0], grids[1]);
}

#[actix_web::test]
async fn bulk_and_single_edits_skip_booked_blocks() {
    let ctx = TestContext::new();
    let counselor = ctx.open_counselor("dr_a");
    let amy = ctx.ready_client("amy");
    let app = init_app!(ctx);

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/appointments", &amy, booking("dr_a", "Monday", "09:00")).to_request(),
    )
    .await;
    assert_eq!(res["success"], true);

    let res: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/schedule/toggle",
            &counselor,
            json!({ "day": "Monday", "time": "09:00" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(res["changed"], 0);

    let res: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/schedule/set_all",
            &counselor,
            json!({ "available": false }),
        )
        .to_request(),
    )
    .await;
    let cells = 7 * ctx.state.config.schedule_times.len();
    assert_eq!(res["changed"], cells - 1);

    let res: Value =
        test::call_and_read_body_json(&app, get("/api/schedule", &counselor).to_request()).await;
    assert_eq!(res["available"], 0);
    assert_eq!(res["booked"], 1);
    let booked = block(&res, "Monday", "09:00");
    assert_eq!(booked["booked_by"], "amy");
    assert_eq!(booked["available"], false);

    // Regenerating keeps the booking too.
    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/schedule/generate", &counselor, json!({})).to_request(),
    )
    .await;
    assert_eq!(res["changed"], cells - 1);
    let res: Value =
        test::call_and_read_body_json(&app, get("/api/schedule", &counselor).to_request()).await;
    assert_eq!(block(&res, "Monday", "09:00")["booked_by"], "amy");
}

#[actix_web::test]
async fn toggle_flips_one_free_block() {
    let ctx = TestContext::new();
    let counselor = ctx.open_counselor("dr_a");
    let app = init_app!(ctx);

    let toggle = json!({ "day": "Wednesday", "time": "13:00" });
    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/schedule/toggle", &counselor, toggle.clone()).to_request(),
    )
    .await;
    assert_eq!(res["changed"], 1);

    let res: Value =
        test::call_and_read_body_json(&app, get("/api/schedule", &counselor).to_request()).await;
    assert_eq!(block(&res, "Wednesday", "13:00")["available"], false);
    assert_eq!(block(&res, "Wednesday", "14:00")["available"], true);

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/schedule/toggle", &counselor, toggle).to_request(),
    )
    .await;
    assert_eq!(res["changed"], 1);
    let res: Value =
        test::call_and_read_body_json(&app, get("/api/schedule", &counselor).to_request()).await;
    assert_eq!(block(&res, "Wednesday", "13:00")["available"], true);
}

#[actix_web::test]
async fn closed_slot_cannot_be_booked() {
    let ctx = TestContext::new();
    let counselor = ctx.open_counselor("dr_a");
    let amy = ctx.ready_client("amy");
    let app = init_app!(ctx);

    let res: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/schedule/toggle",
            &counselor,
            json!({ "day": "Thursday", "time": "15:00" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(res["changed"], 1);

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/appointments", &amy, booking("dr_a", "Thursday", "15:00")).to_request(),
    )
    .await;
    assert_eq!(res["err"], "This slot is not available");
}
