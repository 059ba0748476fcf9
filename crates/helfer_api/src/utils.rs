use std::{
    convert::Infallible,
    future::{Ready, ready},
    ops::Deref,
};

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header};
use helfer_lib::utils::escape_filename;
use serde::Serialize;

/// The header set by the authentication proxy with the name of the logged in user.
pub const REMOTE_USER_HEADER: &str = "RemoteUser";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Converts the provided body to a `200 OK` JSON responses.
pub fn json<T: Serialize, E>(obj: T) -> Result<HttpResponse, E> {
    Ok(HttpResponse::Ok().json(obj))
}

/// Returns a `200 OK` response with the provided file to download.
///
/// The `name` is escaped to be used as the file name, and the `extension` is appended to it.
pub fn attachment<E>(
    content: Vec<u8>,
    content_type: &'static str,
    name: &str,
    extension: &str,
) -> Result<HttpResponse, E> {
    let filename = format!("{}.{extension}", escape_filename(name));
    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(header::ContentDisposition::attachment(filename))
        .body(content))
}

/// A resource handler, like [`Data`][d].
///
/// The difference with [`Data`][d] is that it doesn't use an [`Arc`](std::sync::Arc)
/// internally, but the [`Clone`] implementation of the inner type to implement [`FromRequest`].
///
/// [d]: actix_web::web::Data
#[derive(Clone)]
pub struct Res<T>(pub T);

impl<T> From<T> for Res<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Deref for Res<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Clone + 'static> FromRequest for Res<T> {
    type Error = Infallible;

    type Future = Ready<Result<Self, Infallible>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let res = req
            .app_data::<T>()
            .unwrap_or_else(|| panic!("{} should be present", std::any::type_name::<T>()))
            .clone();
        ready(Ok(Self(res)))
    }
}

/// The user authenticated by the proxy in front of the API, if any.
#[derive(Debug, Clone, Default)]
pub struct RemoteUser(pub Option<String>);

impl RemoteUser {
    /// Returns the username, or `None` if the request is anonymous.
    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequest for RemoteUser {
    type Error = Infallible;

    type Future = Ready<Result<Self, Infallible>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let username = req
            .headers()
            .get(REMOTE_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned);
        ready(Ok(Self(username)))
    }
}
