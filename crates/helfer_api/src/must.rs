//! See [`helfer_lib::must`] module documentation.

use entity::event;
use helfer_lib::error::{HelferError, HelferResult};
use sea_orm::ConnectionTrait;

use crate::utils::RemoteUser;

/// Returns the event bound to the provided URL name, if the remote user is one of its admins.
///
/// An anonymous request is never allowed.
pub async fn have_event_admin<C: ConnectionTrait>(
    conn: &C,
    url_name: &str,
    user: &RemoteUser,
) -> HelferResult<event::Model> {
    match user.name() {
        Some(username) => helfer_lib::must::have_event_admin(conn, url_name, username).await,
        None => {
            let event = helfer_lib::must::have_event(conn, url_name).await?;
            Err(HelferError::PermissionDenied(
                "anonymous".to_owned(),
                event.url_name,
            ))
        }
    }
}

/// Returns the event bound to the provided URL name, if the remote user is one of its admins
/// and the badges are enabled for it.
pub async fn have_badges_admin<C: ConnectionTrait>(
    conn: &C,
    url_name: &str,
    user: &RemoteUser,
) -> HelferResult<event::Model> {
    let event = have_event_admin(conn, url_name, user).await?;
    helfer_lib::must::have_badges(&event)?;
    Ok(event)
}
