use std::sync::Arc;

use actix_web::{
    Responder, Scope,
    web::{self, Json, Path},
};
use helfer_lib::{
    Database,
    event::{get_jobs, public_view},
    export::export_jobs,
    helper::{Registration, register},
    mail::Mailer,
    must,
    shift::delete_shift,
};
use tracing_actix_web::RequestId;
use uuid::Uuid;

use super::badges::badges_scope;
use crate::{
    FitRequestId as _, HelferResponse, Res,
    must::have_event_admin,
    utils::{RemoteUser, XLSX_CONTENT_TYPE, attachment, json},
};

pub fn event_scope() -> Scope {
    web::scope("/events/{event}")
        .route("", web::get().to(view))
        .route("/register", web::post().to(register_helper))
        .route("/export", web::get().to(export_event))
        .route("/jobs/{job}/export", web::get().to(export_job))
        .route("/shifts/{shift}", web::delete().to(remove_shift))
        .service(badges_scope())
}

async fn view(
    req_id: RequestId,
    db: Res<Database>,
    event: Path<String>,
) -> HelferResponse<impl Responder> {
    let event = must::have_event(&db.sql_conn, &event).await.fit(req_id)?;
    let view = public_view(&db.sql_conn, event).await.fit(req_id)?;
    json(view)
}

#[derive(serde::Serialize)]
struct RegisterResponse {
    helper_id: Uuid,
    /// The text of the event shown after a registration.
    registered: String,
}

async fn register_helper(
    req_id: RequestId,
    db: Res<Database>,
    Res(mailer): Res<Arc<dyn Mailer>>,
    event: Path<String>,
    Json(body): Json<Registration>,
) -> HelferResponse<impl Responder> {
    let event = must::have_event(&db.sql_conn, &event).await.fit(req_id)?;
    let helper = register(&db.sql_conn, mailer.as_ref(), &event, body)
        .await
        .fit(req_id)?;

    json(RegisterResponse {
        helper_id: helper.id,
        registered: event.registered,
    })
}

async fn export_event(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
) -> HelferResponse<impl Responder> {
    let event = have_event_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let jobs = get_jobs(&db.sql_conn, event.id).await.fit(req_id)?;
    let content = export_jobs(&db.sql_conn, &event, jobs).await.fit(req_id)?;
    attachment(content, XLSX_CONTENT_TYPE, &event.name, "xlsx")
}

async fn export_job(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    path: Path<(String, i32)>,
) -> HelferResponse<impl Responder> {
    let (event, job_id) = path.into_inner();
    let event = have_event_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let job = must::have_job(&db.sql_conn, &event, job_id)
        .await
        .fit(req_id)?;
    let name = job.name.clone();
    let content = export_jobs(&db.sql_conn, &event, vec![job])
        .await
        .fit(req_id)?;
    attachment(content, XLSX_CONTENT_TYPE, &name, "xlsx")
}

async fn remove_shift(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    path: Path<(String, i32)>,
) -> HelferResponse<impl Responder> {
    let (event, shift_id) = path.into_inner();
    let event = have_event_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let shift = must::have_shift(&db.sql_conn, &event, shift_id)
        .await
        .fit(req_id)?;
    let deleted = delete_shift(&db.sql_conn, shift.id).await.fit(req_id)?;
    json(deleted)
}
