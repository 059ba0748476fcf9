//! This module contains utility functions used to retrieve some objects from the database,
//! that must exist. This is why it is called `must`.
//!
//! When such an object doesn't exist, or doesn't belong to the requested event, the returned
//! value isn't `Option::None` but the corresponding error (for example,
//! [`HelferError::JobNotFound`]). The same goes for the checks of the permissions and of the
//! enabled features of an event.

use entity::{badge_design, badge_permission, badge_role, event, helper, job, shift};
use sea_orm::{ColumnTrait as _, ConnectionTrait, EntityTrait as _, QueryFilter as _};

use crate::{
    error::{HelferError, HelferResult},
    event::{get_event_by_url_name, get_job, is_admin},
    helper::get_event,
};

/// Returns the event bound to the provided URL name.
pub async fn have_event<C: ConnectionTrait>(conn: &C, url_name: &str) -> HelferResult<event::Model> {
    get_event_by_url_name(conn, url_name)
        .await?
        .ok_or_else(|| HelferError::EventNotFound(url_name.to_owned()))
}

/// Returns the event bound to the provided URL name, if the user is one of its admins.
pub async fn have_event_admin<C: ConnectionTrait>(
    conn: &C,
    url_name: &str,
    username: &str,
) -> HelferResult<event::Model> {
    let event = have_event(conn, url_name).await?;

    if !is_admin(conn, event.id, username).await? {
        return Err(HelferError::PermissionDenied(
            username.to_owned(),
            event.url_name,
        ));
    }

    Ok(event)
}

/// Checks that the badge system is enabled for the provided event.
pub fn have_badges(event: &event::Model) -> HelferResult<()> {
    if event.badges {
        Ok(())
    } else {
        Err(HelferError::BadgesNotActive(event.url_name.clone()))
    }
}

/// Returns the job with the provided ID, if it belongs to the event.
pub async fn have_job<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    job_id: i32,
) -> HelferResult<job::Model> {
    get_job(conn, event.id, job_id)
        .await?
        .ok_or_else(|| HelferError::JobNotFound(job_id, event.url_name.clone()))
}

/// Returns the shift with the provided ID, if it belongs to a job of the event.
pub async fn have_shift<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    shift_id: i32,
) -> HelferResult<shift::Model> {
    shift::Entity::find_by_id(shift_id)
        .inner_join(job::Entity)
        .filter(job::Column::EventId.eq(event.id))
        .one(conn)
        .await?
        .ok_or_else(|| HelferError::ShiftNotFound(shift_id, event.url_name.clone()))
}

/// Returns the helper with the provided ID, if they are registered in the event.
pub async fn have_helper<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    helper_id: uuid::Uuid,
) -> HelferResult<helper::Model> {
    let not_found = || HelferError::HelperNotFound(helper_id, event.url_name.clone());

    let helper = helper::Entity::find_by_id(helper_id)
        .one(conn)
        .await?
        .ok_or_else(not_found)?;
    match get_event(conn, helper.id).await? {
        Some(helper_event) if helper_event.id == event.id => Ok(helper),
        _ => Err(not_found()),
    }
}

/// Returns the badge permission with the provided ID, if it belongs to the event.
pub async fn have_badge_permission<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    permission_id: i32,
) -> HelferResult<badge_permission::Model> {
    badge_permission::Entity::find_by_id(permission_id)
        .filter(badge_permission::Column::EventId.eq(event.id))
        .one(conn)
        .await?
        .ok_or_else(|| HelferError::BadgePermissionNotFound(permission_id, event.url_name.clone()))
}

/// Returns the badge role with the provided ID, if it belongs to the event.
pub async fn have_badge_role<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    role_id: i32,
) -> HelferResult<badge_role::Model> {
    badge_role::Entity::find_by_id(role_id)
        .filter(badge_role::Column::EventId.eq(event.id))
        .one(conn)
        .await?
        .ok_or_else(|| HelferError::BadgeRoleNotFound(role_id, event.url_name.clone()))
}

/// Returns the badge design with the provided ID, if it belongs to the event.
pub async fn have_badge_design<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    design_id: i32,
) -> HelferResult<badge_design::Model> {
    badge_design::Entity::find_by_id(design_id)
        .filter(badge_design::Column::EventId.eq(event.id))
        .one(conn)
        .await?
        .ok_or_else(|| HelferError::BadgeDesignNotFound(design_id, event.url_name.clone()))
}
