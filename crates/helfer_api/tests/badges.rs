use actix_http::{Request, StatusCode};
use actix_web::test;
use entity::{badge, event};
use helfer_api_lib::REMOTE_USER_HEADER;
use sea_orm::{ActiveValue::Set, ColumnTrait as _, EntityTrait as _, QueryFilter as _};
use test_env::fixtures;


fn get(uri: &str) -> Request {
    test::TestRequest::get()
        .uri(uri)
        .insert_header((REMOTE_USER_HEADER, base::ADMIN))
        .to_request()
}

fn post(uri: &str, body: serde_json::Value) -> Request {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((REMOTE_USER_HEADER, base::ADMIN))
        .set_json(body)
        .to_request()
}

/// Creates an event administrated by [`base::ADMIN`].
async fn admin_event(db: &helfer_lib::Database, badges: bool) -> anyhow::Result<event::Model> {
    let event = fixtures::create_event(&db.sql_conn, "Festival", |e| {
        e.badges = Set(badges);
    })
    .await?;
    let user = fixtures::create_user(&db.sql_conn, base::ADMIN, false).await?;
    fixtures::add_admin(&db.sql_conn, event.id, user.id).await?;
    Ok(event)
}

#[tokio::test]
async fn badges_not_active() -> anyhow::Result<()> {
    base::with_db(async |db| {
        admin_event(&db, false).await?;
        let app = base::get_app(db).await;

        let resp = test::call_service(&app, get("/events/Festival/badges")).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let error: base::ErrorResponse = serde_json::from_slice(&body)?;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(error.r#type, 402);

        anyhow::Ok(())
    })
    .await
}

#[derive(Debug, serde::Deserialize)]
struct CheckInResponse {
    status: String,
    name: String,
    message: String,
}

#[tokio::test]
async fn check_in() -> anyhow::Result<()> {
    base::with_db(async |db| {
        let event = admin_event(&db, true).await?;
        let bar = fixtures::create_job(&db.sql_conn, event.id, "Bar", false).await?;
        let shift = fixtures::create_shift(&db.sql_conn, bar.id, fixtures::at(24, 10), 2).await?;
        let alice = fixtures::add_helper(&db.sql_conn, "Alice", &[shift.id]).await?;
        let barcode = badge::Entity::find()
            .filter(badge::Column::HelperId.eq(alice.id))
            .one(&db.sql_conn)
            .await?
            .map(|b| b.barcode)
            .expect("helper should have a badge");

        let app = base::get_app(db).await;

        // The barcodes are disabled by default.
        let resp = test::call_service(
            &app,
            post(
                "/events/Festival/badges/register",
                serde_json::json!({ "barcode": barcode }),
            ),
        )
        .await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let error: base::ErrorResponse = serde_json::from_slice(&body)?;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(error.r#type, 403);

        let resp = test::call_service(
            &app,
            post(
                "/events/Festival/badges/settings",
                serde_json::json!({ "barcodes": true }),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(
            &app,
            post(
                "/events/Festival/badges/register",
                serde_json::json!({ "barcode": barcode }),
            ),
        )
        .await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let first = base::try_from_slice::<CheckInResponse>(&body)?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first.status, "registered");
        assert_eq!(first.name, "Alice Doe");

        let resp = test::call_service(
            &app,
            post(
                "/events/Festival/badges/register",
                serde_json::json!({ "barcode": barcode }),
            ),
        )
        .await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let second = base::try_from_slice::<CheckInResponse>(&body)?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second.status, "already_printed");
        assert!(second.message.starts_with("Warning"));

        let resp = test::call_service(
            &app,
            post(
                "/events/Festival/badges/register",
                serde_json::json!({ "barcode": 1 }),
            ),
        )
        .await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let error: base::ErrorResponse = serde_json::from_slice(&body)?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error.r#type, 310);

        anyhow::Ok(())
    })
    .await
}

#[derive(Debug, serde::Deserialize)]
struct Created {
    id: i32,
}

#[derive(Debug, serde::Deserialize)]
struct JobOverview {
    name: String,
    num_warnings: usize,
}

#[derive(Debug, serde::Deserialize)]
struct BadgeOverview {
    possible: bool,
    jobs: Vec<JobOverview>,
}

#[tokio::test]
async fn configure_and_generate() -> anyhow::Result<()> {
    base::with_db(async |db| {
        let event = admin_event(&db, true).await?;
        let bar = fixtures::create_job(&db.sql_conn, event.id, "Bar", false).await?;
        let shift = fixtures::create_shift(&db.sql_conn, bar.id, fixtures::at(24, 10), 2).await?;
        fixtures::add_helper(&db.sql_conn, "Alice", &[shift.id]).await?;

        let app = base::get_app(db).await;

        let resp = test::call_service(&app, get("/events/Festival/badges/pdf")).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let error: base::ErrorResponse = serde_json::from_slice(&body)?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error.r#type, 404);

        let resp = test::call_service(
            &app,
            post(
                "/events/Festival/badges/roles",
                serde_json::json!({ "name": "Helper", "latex_name": "helper" }),
            ),
        )
        .await;
        let body = test::read_body(resp).await;
        let role = base::try_from_slice::<Created>(&body)?;

        let resp = test::call_service(
            &app,
            post(
                "/events/Festival/badges/designs",
                serde_json::json!({ "name": "Plain", "font_color": "#000000" }),
            ),
        )
        .await;
        let body = test::read_body(resp).await;
        let design = base::try_from_slice::<Created>(&body)?;

        let resp = test::call_service(&app, get("/events/Festival/badges")).await;
        let body = test::read_body(resp).await;
        let overview = base::try_from_slice::<BadgeOverview>(&body)?;
        assert!(!overview.possible);
        assert_eq!(overview.jobs.len(), 1);
        assert_eq!(overview.jobs[0].name, "Bar");
        assert_eq!(overview.jobs[0].num_warnings, 1);

        let resp = test::call_service(
            &app,
            post(
                "/events/Festival/badges/defaults",
                serde_json::json!({ "event": { "role": role.id, "design": design.id } }),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(&app, get("/events/Festival/badges")).await;
        let body = test::read_body(resp).await;
        let overview = base::try_from_slice::<BadgeOverview>(&body)?;
        assert!(overview.possible);
        assert_eq!(overview.jobs[0].num_warnings, 0);

        // The typesetting engine of the tests doesn't exist.
        let resp = test::call_service(
            &app,
            get(&format!("/events/Festival/badges/jobs/{}/pdf", bar.id)),
        )
        .await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let error: base::ErrorResponse = serde_json::from_slice(&body)?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.r#type, 106);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn invalid_design() -> anyhow::Result<()> {
    base::with_db(async |db| {
        admin_event(&db, true).await?;
        let app = base::get_app(db).await;

        let resp = test::call_service(
            &app,
            post(
                "/events/Festival/badges/designs",
                serde_json::json!({ "name": "", "font_color": "black" }),
            ),
        )
        .await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let error: base::ErrorResponse = serde_json::from_slice(&body)?;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error.r#type, 501);
        assert_eq!(error.errors.len(), 2);

        anyhow::Ok(())
    })
    .await
}
