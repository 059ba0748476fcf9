//! The check-in of the printed badges, by scanning their barcode.

use entity::{badge, event, helper};
use sea_orm::{
    ColumnTrait as _, ConnectionTrait, EntityTrait as _, QueryFilter as _, prelude::Expr,
};

use super::get_settings;
use crate::{
    error::{HelferError, HelferResult},
    helper::get_event,
    must,
};

/// The result of the scan of a badge.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckIn {
    /// The badge is now marked as printed.
    Registered {
        /// The full name of the helper.
        name: String,
    },
    /// The badge was already marked as printed, nothing changed.
    AlreadyPrinted {
        /// The full name of the helper.
        name: String,
    },
}

/// Marks the badge with the provided barcode as printed.
///
/// The barcodes must be enabled for the event, and the badge must belong to a helper
/// of the event. Scanning a badge twice doesn't change anything.
#[tracing::instrument(skip(conn, event), fields(event = %event.url_name))]
pub async fn register_badge<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    barcode: i32,
) -> HelferResult<CheckIn> {
    must::have_badges(event)?;
    if !get_settings(conn, event.id).await?.barcodes {
        return Err(HelferError::BarcodesNotActive(event.url_name.clone()));
    }

    let not_found = || HelferError::BadgeNotFound(barcode, event.url_name.clone());

    let Some((badge, Some(helper))) = badge::Entity::find()
        .filter(badge::Column::Barcode.eq(barcode))
        .find_also_related(helper::Entity)
        .one(conn)
        .await?
    else {
        return Err(not_found());
    };

    match get_event(conn, helper.id).await? {
        Some(helper_event) if helper_event.id == event.id => (),
        _ => return Err(not_found()),
    }

    let name = helper.full_name();
    if badge.printed {
        tracing::info!("Badge of {name} was already printed");
        return Ok(CheckIn::AlreadyPrinted { name });
    }

    // A concurrent scan may have marked it in between.
    let updated = badge::Entity::update_many()
        .col_expr(badge::Column::Printed, Expr::value(true))
        .filter(badge::Column::Id.eq(badge.id))
        .filter(badge::Column::Printed.eq(false))
        .exec(conn)
        .await?;

    if updated.rows_affected == 0 {
        return Ok(CheckIn::AlreadyPrinted { name });
    }

    tracing::info!("Registered badge of {name}");
    Ok(CheckIn::Registered { name })
}
