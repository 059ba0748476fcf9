//! A module containing the [`HelferError`] enum, which contains various basic error types.

use sea_orm::TransactionError;

use crate::badges::TypesetError;

/// Represents any type of error that could happen when using this crate.
#[derive(thiserror::Error, Debug)]
#[rustfmt::skip]
pub enum HelferError {
    // --------
    // --- Internal server errors
    // --------

    /// An internal error.
    #[error("internal error: {0}")]
    Internal(String),
    /// An error from the database.
    #[error(transparent)]
    DbError(#[from] sea_orm::DbErr),
    /// An I/O error, when handling the files of the badges or of the exports.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// An error when writing a spreadsheet.
    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    /// The typesetting of the badges failed.
    #[error(transparent)]
    Typeset(#[from] TypesetError),

    // --------
    // --- Logical errors
    // --------

    /// The user doesn't have the permission to administrate the event.
    #[error("user `{0}` is not an admin of event `{1}`")]
    PermissionDenied(
        /// The username.
        String,
        /// The URL name of the event.
        String,
    ),
    /// The event with the provided URL name was not found.
    #[error("event `{0}` not found")]
    EventNotFound(
        /// The URL name of the event.
        String,
    ),
    /// The job wasn't found in the event.
    #[error("job with id `{0}` not found in event `{1}`")]
    JobNotFound(i32, String),
    /// The shift wasn't found in the event.
    #[error("shift with id `{0}` not found in event `{1}`")]
    ShiftNotFound(i32, String),
    /// The helper isn't registered in the event.
    #[error("helper with id `{0}` not found in event `{1}`")]
    HelperNotFound(uuid::Uuid, String),
    /// The badge permission wasn't found in the event.
    #[error("badge permission with id `{0}` not found in event `{1}`")]
    BadgePermissionNotFound(i32, String),
    /// The badge role wasn't found in the event.
    #[error("badge role with id `{0}` not found in event `{1}`")]
    BadgeRoleNotFound(i32, String),
    /// The badge design wasn't found in the event.
    #[error("badge design with id `{0}` not found in event `{1}`")]
    BadgeDesignNotFound(i32, String),
    /// No badge has the scanned barcode in the event.
    #[error("no badge with barcode `{0}` in event `{1}`")]
    BadgeNotFound(i32, String),
    /// The badge system is disabled for the event.
    #[error("badges are not active for event `{0}`")]
    BadgesNotActive(
        /// The URL name of the event.
        String,
    ),
    /// The barcodes are disabled for the event, so no check-in is possible.
    #[error("barcodes are not enabled for event `{0}`")]
    BarcodesNotActive(String),
    /// The default role or design of the event is missing, so no badge can be created.
    #[error("the default role and design of the badges of event `{0}` must be set")]
    BadgesNotConfigured(String),
    /// The registration for the event is closed.
    #[error("the registration for event `{0}` is closed")]
    RegistrationClosed(String),
    /// The submitted data is invalid.
    #[error("invalid submission: {}", .0.join(", "))]
    Validation(
        /// The validation messages.
        Vec<String>,
    ),
}

impl AsRef<HelferError> for HelferError {
    fn as_ref(&self) -> &HelferError {
        self
    }
}

/// Shortcut for creating an internal error, by formatting a message.
///
/// See [`HelferError::Internal`].
#[macro_export]
macro_rules! internal {
    ($($t:tt)*) => {{
        $crate::error::HelferError::Internal($crate::error::__private::format!($($t)*))
    }};
}

#[doc(hidden)]
pub mod __private {
    pub use std::format;
}

impl<E> From<TransactionError<E>> for HelferError
where
    HelferError: From<E>,
{
    fn from(value: TransactionError<E>) -> Self {
        match value {
            TransactionError::Connection(db_err) => From::from(db_err),
            TransactionError::Transaction(e) => From::from(e),
        }
    }
}

/// Represents the result of a computation that could return a [`HelferError`].
pub type HelferResult<T = ()> = Result<T, HelferError>;
