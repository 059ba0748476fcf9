//! The routes of the badge system of an event.
//!
//! All of them need the remote user to be an admin of the event, and the badges to be
//! enabled for it.

use actix_web::{
    HttpResponse, Responder, Scope,
    web::{self, Json, Path},
};
use entity::{event, job};
use helfer_lib::{
    Database,
    badges::{
        self, BadgeConfig, BadgeForm, CheckIn, DefaultsForm, DesignForm, EventBadges, PdfLatex,
        PermissionForm, RoleForm, SettingsForm,
    },
    event::get_jobs,
    must,
};
use tracing_actix_web::RequestId;
use uuid::Uuid;

use crate::{
    FitRequestId as _, HelferResponse, Res,
    must::{have_badges_admin, have_event_admin},
    utils::{PDF_CONTENT_TYPE, RemoteUser, attachment, json},
};

pub fn badges_scope() -> Scope {
    web::scope("/badges")
        .route("", web::get().to(overview))
        .route("/jobs/{job}/warnings", web::get().to(job_warnings))
        .route("/jobs/{job}/pdf", web::get().to(job_pdf))
        .route("/pdf", web::get().to(event_pdf))
        .route("/pdf/all", web::get().to(event_pdf_all))
        .route("/settings", web::get().to(settings))
        .route("/settings", web::post().to(edit_settings))
        .route("/defaults", web::get().to(defaults))
        .route("/defaults", web::post().to(edit_defaults))
        .route("/permissions", web::get().to(permissions))
        .route("/permissions", web::post().to(new_permission))
        .route("/permissions/{id}", web::post().to(edit_permission))
        .route("/roles", web::get().to(roles))
        .route("/roles", web::post().to(new_role))
        .route("/roles/{id}", web::post().to(edit_role))
        .route("/designs", web::get().to(designs))
        .route("/designs", web::post().to(new_design))
        .route("/designs/{id}", web::post().to(edit_design))
        .route("/helpers/{helper}", web::post().to(edit_badge))
        .route("/register", web::post().to(check_in))
}

async fn overview(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let overview = badges::overview(&db.sql_conn, &event).await.fit(req_id)?;
    json(overview)
}

async fn job_warnings(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    path: Path<(String, i32)>,
) -> HelferResponse<impl Responder> {
    let (event, job_id) = path.into_inner();
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let job = must::have_job(&db.sql_conn, &event, job_id)
        .await
        .fit(req_id)?;

    let ctx = EventBadges::load(&db.sql_conn, event.id).await.fit(req_id)?;
    let warnings = badges::warnings_for_job(&db.sql_conn, &ctx, job.id)
        .await
        .fit(req_id)?;
    json(warnings)
}

async fn pdf(
    req_id: RequestId,
    db: &Database,
    config: &BadgeConfig,
    event: &event::Model,
    jobs: &[job::Model],
    generate_all: bool,
    name: &str,
) -> HelferResponse<HttpResponse> {
    let typesetter = PdfLatex::new(config.pdflatex.clone());
    let content =
        badges::generate_badges(&db.sql_conn, config, typesetter, event, jobs, generate_all)
            .await
            .fit(req_id)?;
    attachment(content, PDF_CONTENT_TYPE, name, "pdf")
}

async fn job_pdf(
    req_id: RequestId,
    db: Res<Database>,
    Res(config): Res<BadgeConfig>,
    user: RemoteUser,
    path: Path<(String, i32)>,
) -> HelferResponse<impl Responder> {
    let (event, job_id) = path.into_inner();
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let job = must::have_job(&db.sql_conn, &event, job_id)
        .await
        .fit(req_id)?;
    let name = job.name.clone();
    pdf(req_id, &db, &config, &event, &[job], false, &name).await
}

async fn event_pdf(
    req_id: RequestId,
    db: Res<Database>,
    Res(config): Res<BadgeConfig>,
    user: RemoteUser,
    event: Path<String>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let jobs = get_jobs(&db.sql_conn, event.id).await.fit(req_id)?;
    pdf(req_id, &db, &config, &event, &jobs, false, &event.name).await
}

async fn event_pdf_all(
    req_id: RequestId,
    db: Res<Database>,
    Res(config): Res<BadgeConfig>,
    user: RemoteUser,
    event: Path<String>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let jobs = get_jobs(&db.sql_conn, event.id).await.fit(req_id)?;
    pdf(req_id, &db, &config, &event, &jobs, true, &event.name).await
}

async fn settings(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let settings = badges::get_settings(&db.sql_conn, event.id)
        .await
        .fit(req_id)?;
    json(settings)
}

async fn edit_settings(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
    Json(body): Json<SettingsForm>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let settings = badges::save_settings(&db.sql_conn, event.id, body)
        .await
        .fit(req_id)?;
    json(settings)
}

async fn defaults(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let defaults = badges::get_defaults(&db.sql_conn, event.id)
        .await
        .fit(req_id)?;
    json(defaults)
}

async fn edit_defaults(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
    Json(body): Json<DefaultsForm>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let defaults = badges::save_defaults(&db.sql_conn, &event, body)
        .await
        .fit(req_id)?;
    json(defaults)
}

async fn permissions(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let permissions = badges::get_permissions(&db.sql_conn, event.id)
        .await
        .fit(req_id)?;
    json(permissions)
}

async fn new_permission(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
    Json(body): Json<PermissionForm>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let permission = badges::save_permission(&db.sql_conn, &event, None, body)
        .await
        .fit(req_id)?;
    json(permission)
}

async fn edit_permission(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    path: Path<(String, i32)>,
    Json(body): Json<PermissionForm>,
) -> HelferResponse<impl Responder> {
    let (event, id) = path.into_inner();
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let permission = badges::save_permission(&db.sql_conn, &event, Some(id), body)
        .await
        .fit(req_id)?;
    json(permission)
}

async fn roles(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let roles = badges::get_roles(&db.sql_conn, event.id).await.fit(req_id)?;
    json(roles)
}

async fn new_role(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
    Json(body): Json<RoleForm>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let role = badges::save_role(&db.sql_conn, &event, None, body)
        .await
        .fit(req_id)?;
    json(role)
}

async fn edit_role(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    path: Path<(String, i32)>,
    Json(body): Json<RoleForm>,
) -> HelferResponse<impl Responder> {
    let (event, id) = path.into_inner();
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let role = badges::save_role(&db.sql_conn, &event, Some(id), body)
        .await
        .fit(req_id)?;
    json(role)
}

async fn designs(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let designs = badges::get_designs(&db.sql_conn, event.id)
        .await
        .fit(req_id)?;
    json(designs)
}

async fn new_design(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
    Json(body): Json<DesignForm>,
) -> HelferResponse<impl Responder> {
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let design = badges::save_design(&db.sql_conn, &event, None, body)
        .await
        .fit(req_id)?;
    json(design)
}

async fn edit_design(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    path: Path<(String, i32)>,
    Json(body): Json<DesignForm>,
) -> HelferResponse<impl Responder> {
    let (event, id) = path.into_inner();
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let design = badges::save_design(&db.sql_conn, &event, Some(id), body)
        .await
        .fit(req_id)?;
    json(design)
}

async fn edit_badge(
    req_id: RequestId,
    db: Res<Database>,
    Res(config): Res<BadgeConfig>,
    user: RemoteUser,
    path: Path<(String, Uuid)>,
    Json(body): Json<BadgeForm>,
) -> HelferResponse<impl Responder> {
    let (event, helper_id) = path.into_inner();
    let event = have_badges_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let badge = badges::save_badge(&db.sql_conn, &config, &event, helper_id, body)
        .await
        .fit(req_id)?;
    json(badge)
}

#[derive(serde::Deserialize)]
struct CheckInBody {
    barcode: i32,
}

#[derive(serde::Serialize)]
struct CheckInResponse {
    #[serde(flatten)]
    result: CheckIn,
    message: String,
}

async fn check_in(
    req_id: RequestId,
    db: Res<Database>,
    user: RemoteUser,
    event: Path<String>,
    Json(body): Json<CheckInBody>,
) -> HelferResponse<impl Responder> {
    let event = have_event_admin(&db.sql_conn, &event, &user)
        .await
        .fit(req_id)?;
    let result = badges::register_badge(&db.sql_conn, &event, body.barcode)
        .await
        .fit(req_id)?;

    let message = match &result {
        CheckIn::Registered { name } => format!("Badge of {name} registered."),
        CheckIn::AlreadyPrinted { name } => {
            format!("Warning: the badge of {name} was already registered.")
        }
    };
    json(CheckInResponse { result, message })
}
