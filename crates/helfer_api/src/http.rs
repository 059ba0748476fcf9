//! Module used to serve the routes of the API. Each submodule is specific for a route segment.

use actix_web::{HttpResponse, Responder, Scope, web, web::JsonConfig};
use mkenv::prelude::*;

use self::event::event_scope;
use crate::HelferErrorKind;

pub mod badges;
pub mod event;

pub fn api_route() -> Scope {
    let json_config = JsonConfig::default()
        .limit(crate::env().json_limit.get())
        .error_handler(|err, _req| HelferErrorKind::InvalidBody(err.to_string()).into());

    web::scope("")
        .app_data(json_config)
        .route("/nopermission", web::get().to(no_permission))
        .service(event_scope())
}

#[derive(serde::Serialize)]
struct NoPermissionResponse {
    message: &'static str,
}

/// The target of the redirections when the user isn't allowed to see a page.
async fn no_permission() -> impl Responder {
    HttpResponse::Forbidden().json(NoPermissionResponse {
        message: "You don't have the permission to access this page.",
    })
}
