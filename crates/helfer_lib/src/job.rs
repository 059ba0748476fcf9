//! This module contains anything related to the jobs of an event and their shifts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use entity::{helper, shift};
use itertools::Itertools as _;
use sea_orm::{
    ColumnTrait as _, ConnectionTrait, EntityTrait as _, ModelTrait as _, QueryFilter as _,
    QueryOrder as _, QuerySelect as _,
};

use crate::error::HelferResult;

/// Groups the provided shifts by the day they begin.
///
/// The days are sorted in ascending order, and the shifts of each day are sorted by their
/// begin. Shifts beginning at the same time keep their original order.
pub fn shifts_by_day<I>(shifts: I) -> BTreeMap<NaiveDate, Vec<shift::Model>>
where
    I: IntoIterator<Item = shift::Model>,
{
    let mut days: BTreeMap<_, Vec<_>> = BTreeMap::new();
    for shift in shifts.into_iter().sorted_by_key(|shift| shift.begin) {
        days.entry(shift.begin.date()).or_default().push(shift);
    }
    days
}

/// Returns the shifts of the provided job, sorted by their begin.
pub async fn get_shifts<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
) -> HelferResult<Vec<shift::Model>> {
    let shifts = shift::Entity::find()
        .filter(shift::Column::JobId.eq(job_id))
        .order_by_asc(shift::Column::Begin)
        .order_by_asc(shift::Column::Id)
        .all(conn)
        .await?;
    Ok(shifts)
}

/// Returns the shifts of the provided job grouped by day.
///
/// See [`shifts_by_day`].
pub async fn get_shifts_by_day<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
) -> HelferResult<BTreeMap<NaiveDate, Vec<shift::Model>>> {
    let shifts = get_shifts(conn, job_id).await?;
    Ok(shifts_by_day(shifts))
}

/// Returns the helpers registered in at least one shift of the provided job,
/// in the order of their registration.
pub async fn get_helpers<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
) -> HelferResult<Vec<helper::Model>> {
    let helpers = helper::Entity::find()
        .inner_join(shift::Entity)
        .filter(shift::Column::JobId.eq(job_id))
        .distinct()
        .order_by_asc(helper::Column::Timestamp)
        .order_by_asc(helper::Column::Id)
        .all(conn)
        .await?;
    Ok(helpers)
}

/// Returns the helpers of the provided shift, in the order of their registration.
pub async fn get_shift_helpers<C: ConnectionTrait>(
    conn: &C,
    shift: &shift::Model,
) -> HelferResult<Vec<helper::Model>> {
    let helpers = shift
        .find_related(helper::Entity)
        .order_by_asc(helper::Column::Timestamp)
        .order_by_asc(helper::Column::Id)
        .all(conn)
        .await?;
    Ok(helpers)
}
