#[macro_use]
mod common;

use actix_web::test;
use common::*;
use counsel::models::users::Role;
use serde_json::{json, Value};

#[actix_web::test]
async fn new_client_walks_through_onboarding() {
    let ctx = TestContext::new();
    ctx.add_user("root", Role::Admin);
    let admin = ctx.login("root");
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "amy",
            "name": "Amy",
            "password": "hunter22",
            "student_id": STUDENT_ID,
        }))
        .to_request();
    let res: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(res["success"], true, "{}", res);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "amy", "password": "hunter22" }))
        .to_request();
    let res: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(res["role"], "client");
    let amy = res["login_token"].as_str().unwrap().to_string();

    let res: Value =
        test::call_and_read_body_json(&app, get("/api/onboarding", &amy).to_request()).await;
    assert_eq!(res["step"], "urgency");

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/onboarding/complete", &amy, json!({ "step": "pdpa" })).to_request(),
    )
    .await;
    assert_eq!(res["err"], "Finish the urgency step first");

    for (step, next) in [("urgency", "pdpa"), ("pdpa", "token")] {
        let res: Value = test::call_and_read_body_json(
            &app,
            post("/api/onboarding/complete", &amy, json!({ "step": step })).to_request(),
        )
        .await;
        assert_eq!(res["step"], next, "{}", res);
    }

    // Going back over a finished step does not reopen it.
    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/onboarding/complete", &amy, json!({ "step": "urgency" })).to_request(),
    )
    .await;
    assert_eq!(res["step"], "token");

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/onboarding/complete", &amy, json!({ "step": "token" })).to_request(),
    )
    .await;
    assert_eq!(res["success"], false);

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/cases/verify-code", &amy, json!({ "code": "NOPE1234" })).to_request(),
    )
    .await;
    assert_eq!(res["err"], "Invalid or used case code");

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/admin/case_codes", &admin, json!({ "count": 2 })).to_request(),
    )
    .await;
    let codes = res["codes"].as_array().unwrap();
    assert_eq!(codes.len(), 2);
    let code = codes[0].as_str().unwrap().to_lowercase();

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/cases/verify-code", &amy, json!({ "code": code })).to_request(),
    )
    .await;
    assert_eq!(res["step"], "done", "{}", res);

    let res: Value =
        test::call_and_read_body_json(&app, get("/api/users/me", &amy).to_request()).await;
    assert_eq!(res["onboarding"], "done");
    assert_eq!(res["student_id"], STUDENT_ID);
}

#[actix_web::test]
async fn case_code_is_single_use() {
    let ctx = TestContext::new();
    ctx.add_user("root", Role::Admin);
    let admin = ctx.login("root");
    let app = init_app!(ctx);

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/admin/case_codes", &admin, json!({})).to_request(),
    )
    .await;
    let code = res["codes"][0].as_str().unwrap().to_string();

    let mut tokens = Vec::new();
    for id in ["amy", "ben"] {
        ctx.add_user(id, Role::Client);
        let token = ctx.login(id);
        for step in ["urgency", "pdpa"] {
            let res: Value = test::call_and_read_body_json(
                &app,
                post("/api/onboarding/complete", &token, json!({ "step": step })).to_request(),
            )
            .await;
            assert_eq!(res["success"], true);
        }
        tokens.push(token);
    }

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/cases/verify-code", &tokens[0], json!({ "code": code })).to_request(),
    )
    .await;
    assert_eq!(res["step"], "done");

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/cases/verify-code", &tokens[1], json!({ "code": code })).to_request(),
    )
    .await;
    assert_eq!(res["err"], "Invalid or used case code");
}

#[actix_web::test]
async fn code_before_consent_is_rejected() {
    let ctx = TestContext::new();
    ctx.add_user("amy", Role::Client);
    let amy = ctx.login("amy");
    let app = init_app!(ctx);

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/cases/verify-code", &amy, json!({ "code": "ABCD1234" })).to_request(),
    )
    .await;
    assert_eq!(res["err"], "Finish the urgency step first");
}

#[actix_web::test]
async fn skip_needs_debug_switch() {
    let ctx = TestContext::new();
    ctx.add_user("amy", Role::Client);
    let amy = ctx.login("amy");
    let app = init_app!(ctx);

    let res: Value = test::call_and_read_body_json(
        &app,
        post("/api/onboarding/skip", &amy, json!({})).to_request(),
    )
    .await;
    assert_eq!(res["err"], "Skipping onboarding is disabled");

    let ctx = TestContext::with_config(|config| config.onboarding_debug_skip = true);
    ctx.add_user("amy", Role::Client);
    let amy = ctx.login("amy");
    let app = init_app!(ctx);

    let resp =
        test::call_service(&app, post_bare("/api/onboarding/skip", &amy).to_request()).await;
    assert_eq!(resp.status(), 200);
    let res: Value = test::read_body_json(resp).await;
    assert_eq!(res["step"], "done");
}

#[actix_web::test]
async fn staff_skip_onboarding() {
    let ctx = TestContext::new();
    let counselor = ctx.open_counselor("dr_a");
    let app = init_app!(ctx);

    let res: Value =
        test::call_and_read_body_json(&app, get("/api/onboarding", &counselor).to_request()).await;
    assert_eq!(res["step"], "done");
}
