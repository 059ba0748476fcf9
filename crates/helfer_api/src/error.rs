use std::fmt;

use actix_web::{
    HttpResponse,
    http::{StatusCode, header},
};
use helfer_lib::error::HelferError;
use sea_orm::DbErr;
use tracing_actix_web::RequestId;

/// The page the users are redirected to when they aren't allowed to see a page.
pub const NO_PERMISSION_PATH: &str = "/nopermission";

#[derive(thiserror::Error, Debug)]
#[repr(i32)] // i32 to be used with clients that don't support unsigned integers
#[rustfmt::skip]
pub enum HelferErrorKind {
    // Caution: when creating a new error, you must ensure its code isn't
    // in conflict with another one in `helfer_lib::error::HelferError`.

    // --------
    // --- Internal server errors
    // --------

    // ...Errors from helfer_lib

    #[error("unknown error: {0}")]
    Unknown(String) = 105,

    // ...Errors from helfer_lib

    // --------
    // --- Logical errors
    // --------

    #[error("not found")]
    EndpointNotFound = 301,

    // ...Errors from helfer_lib

    #[error("invalid request body: {0}")]
    InvalidBody(String) = 502,

    #[error(transparent)]
    Lib(#[from] HelferError),
}

#[derive(serde::Serialize)]
pub struct HelferErrorKindResponse {
    pub r#type: i32,
    pub message: String,
}

impl actix_web::ResponseError for HelferErrorKind {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let (r#type, status_code) = self.get_err_type_and_status_code();
        let mut res = HttpResponse::build(status_code);

        let message = self.to_string();
        res.extensions_mut().insert(Some(HelferErrorKindResponse {
            r#type,
            message: message.clone(),
        }));

        res.json(HelferErrorKindResponse { r#type, message })
    }
}

impl HelferErrorKind {
    pub fn get_err_type_and_status_code(&self) -> (i32, StatusCode) {
        use HelferErrorKind as E;
        use StatusCode as S;
        use helfer_lib::error::HelferError as LE;

        match self {
            E::Lib(LE::Internal(_)) => (101, S::INTERNAL_SERVER_ERROR),
            E::Lib(LE::DbError(_)) => (102, S::INTERNAL_SERVER_ERROR),
            E::Lib(LE::Io(_)) => (103, S::INTERNAL_SERVER_ERROR),
            E::Lib(LE::Xlsx(_)) => (104, S::INTERNAL_SERVER_ERROR),
            E::Unknown(_) => (105, S::INTERNAL_SERVER_ERROR),
            E::Lib(LE::Typeset(_)) => (106, S::INTERNAL_SERVER_ERROR),

            E::EndpointNotFound => (301, S::NOT_FOUND),
            E::Lib(LE::PermissionDenied(..)) => (302, S::SEE_OTHER),
            E::Lib(LE::EventNotFound(_)) => (303, S::NOT_FOUND),
            E::Lib(LE::JobNotFound(..)) => (304, S::NOT_FOUND),
            E::Lib(LE::ShiftNotFound(..)) => (305, S::NOT_FOUND),
            E::Lib(LE::HelperNotFound(..)) => (306, S::NOT_FOUND),
            E::Lib(LE::BadgePermissionNotFound(..)) => (307, S::NOT_FOUND),
            E::Lib(LE::BadgeRoleNotFound(..)) => (308, S::NOT_FOUND),
            E::Lib(LE::BadgeDesignNotFound(..)) => (309, S::NOT_FOUND),
            E::Lib(LE::BadgeNotFound(..)) => (310, S::NOT_FOUND),

            E::Lib(LE::RegistrationClosed(_)) => (401, S::FORBIDDEN),
            E::Lib(LE::BadgesNotActive(_)) => (402, S::FORBIDDEN),
            E::Lib(LE::BarcodesNotActive(_)) => (403, S::FORBIDDEN),
            E::Lib(LE::BadgesNotConfigured(_)) => (404, S::BAD_REQUEST),

            E::Lib(LE::Validation(_)) => (501, S::BAD_REQUEST),
            E::InvalidBody(_) => (502, S::BAD_REQUEST),
        }
    }

    /// Returns the output of the typesetting engine, if the error comes from it.
    pub fn latex_output(&self) -> Option<&str> {
        match self {
            Self::Lib(HelferError::Typeset(e)) => e.latex_output(),
            _ => None,
        }
    }

    /// Returns the validation messages, if the submitted data was invalid.
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            Self::Lib(HelferError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }
}

impl From<DbErr> for HelferErrorKind {
    fn from(value: DbErr) -> Self {
        Self::Lib(value.into())
    }
}

#[derive(Debug)]
pub struct TracedError {
    pub status_code: Option<StatusCode>,
    pub r#type: Option<i32>,
    pub request_id: RequestId,
    pub latex_output: Option<String>,
    pub errors: Option<Vec<String>>,
    pub error: actix_web::Error,
}

impl fmt::Display for TracedError {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for TracedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl TracedError {
    fn to_err_res(&self, r#type: i32) -> ErrorResponse {
        ErrorResponse {
            request_id: self.request_id.to_string(),
            r#type,
            message: self.error.to_string(),
            errors: self.errors.clone(),
            latex_output: self.latex_output.clone(),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub r#type: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latex_output: Option<String>,
}

impl actix_web::ResponseError for TracedError {
    fn error_response(&self) -> HttpResponse {
        let r#type = self.r#type.unwrap_or(105);
        let status_code = self
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut res = HttpResponse::build(status_code);
        if status_code == StatusCode::SEE_OTHER {
            res.insert_header((header::LOCATION, NO_PERMISSION_PATH));
        }
        res.json(self.to_err_res(r#type))
    }
}

pub type HelferResult<T> = Result<T, HelferErrorKind>;

pub type HelferResponse<T> = Result<T, TracedError>;

/// Attaches the ID of the current request to an error, so that it appears in the response.
pub trait FitRequestId<T> {
    fn fit(self, request_id: RequestId) -> HelferResponse<T>;
}

impl<T, E> FitRequestId<T> for Result<T, E>
where
    HelferErrorKind: From<E>,
{
    fn fit(self, request_id: RequestId) -> HelferResponse<T> {
        self.map_err(|e| {
            let e = HelferErrorKind::from(e);
            let (r#type, status_code) = e.get_err_type_and_status_code();

            if status_code.is_server_error() {
                tracing::error!(%request_id, "{e}");
            } else {
                tracing::info!(%request_id, "{e}");
            }

            TracedError {
                status_code: Some(status_code),
                r#type: Some(r#type),
                request_id,
                latex_output: e.latex_output().map(ToOwned::to_owned),
                errors: e.validation_errors().map(ToOwned::to_owned),
                error: e.into(),
            }
        })
    }
}
