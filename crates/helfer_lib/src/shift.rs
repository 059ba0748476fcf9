//! This module contains the bookkeeping of the shifts: their fill ratio, their display,
//! and their creation and deletion.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use entity::{badge, helper, helper_shifts, shift};
use sea_orm::{
    ActiveModelTrait as _, ActiveValue::Set, ColumnTrait as _, ConnectionTrait, EntityTrait as _,
    PaginatorTrait as _, QueryFilter as _, QuerySelect as _, TransactionTrait, prelude::Expr,
};
use uuid::Uuid;

use crate::{
    error::{HelferError, HelferResult},
    sync,
};

/// Returns the date and the time range of the shift, like `24.08.2024, 18:00 - 22:00`.
pub fn time(shift: &shift::Model) -> String {
    format!(
        "{}, {}",
        shift.begin.format("%d.%m.%Y"),
        time_hours(shift)
    )
}

/// Returns the time range of the shift without the date, like `18:00 - 22:00`.
pub fn time_hours(shift: &shift::Model) -> String {
    format!("{} - {}", shift.begin.format("%H:%M"), shift.end.format("%H:%M"))
}

/// Returns the percentage of the registered helpers of a shift, rounded to the nearest integer.
///
/// Halves are rounded to the even neighbour. If the shift has no place, 0 is returned.
pub fn helpers_percent(num_helpers: u64, number: i32) -> i64 {
    if number <= 0 {
        return 0;
    }

    (num_helpers as f64 / number as f64 * 100.).round_ties_even() as i64
}

/// The filling state of a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct FillRatio {
    /// The number of registered helpers.
    pub num_helpers: u64,
    /// The maximal number of helpers.
    pub number: i32,
    /// Is the shift full?
    pub is_full: bool,
    /// The percentage of registered helpers.
    pub helpers_percent: i64,
}

impl FillRatio {
    /// Computes the filling state of a shift from its number of helpers and its capacity.
    pub fn new(num_helpers: u64, number: i32) -> Self {
        Self {
            num_helpers,
            number,
            is_full: num_helpers as i64 >= number as i64,
            helpers_percent: helpers_percent(num_helpers, number),
        }
    }
}

/// Returns the number of helpers registered in the provided shift.
pub async fn count_helpers<C: ConnectionTrait>(conn: &C, shift_id: i32) -> HelferResult<u64> {
    let count = helper_shifts::Entity::find()
        .filter(helper_shifts::Column::ShiftId.eq(shift_id))
        .count(conn)
        .await?;
    Ok(count)
}

/// Returns the filling state of the provided shift.
pub async fn fill_ratio<C: ConnectionTrait>(
    conn: &C,
    shift: &shift::Model,
) -> HelferResult<FillRatio> {
    let num_helpers = count_helpers(conn, shift.id).await?;
    Ok(FillRatio::new(num_helpers, shift.number))
}

/// Returns the number of helpers of each provided shift, in a single query.
///
/// The shifts without any helper are absent from the returned map.
pub async fn count_helpers_by_shift<C, I>(conn: &C, shift_ids: I) -> HelferResult<HashMap<i32, u64>>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = i32>,
{
    let counts = helper_shifts::Entity::find()
        .select_only()
        .column(helper_shifts::Column::ShiftId)
        .column_as(Expr::col(helper_shifts::Column::HelperId).count(), "num_helpers")
        .filter(helper_shifts::Column::ShiftId.is_in(shift_ids))
        .group_by(helper_shifts::Column::ShiftId)
        .into_tuple::<(i32, i64)>()
        .all(conn)
        .await?;

    Ok(counts
        .into_iter()
        .map(|(shift_id, count)| (shift_id, count as u64))
        .collect())
}

/// Creates a new shift in the provided job.
///
/// The capacity must not be negative, and the shift must not end before it begins.
pub async fn create_shift<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
    begin: NaiveDateTime,
    end: NaiveDateTime,
    number: i32,
) -> HelferResult<shift::Model> {
    let mut errors = Vec::new();
    if number < 0 {
        errors.push(format!("the number of helpers must not be negative, got {number}"));
    }
    if end < begin {
        errors.push("the shift must not end before it begins".to_owned());
    }
    if !errors.is_empty() {
        return Err(HelferError::Validation(errors));
    }

    let shift = shift::ActiveModel {
        job_id: Set(job_id),
        begin: Set(begin),
        end: Set(end),
        number: Set(number),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(shift)
}

/// The result of the deletion of a shift.
#[derive(Debug, Default, serde::Serialize)]
pub struct DeletedShift {
    /// The IDs of the helpers that were deleted with the shift, because it was their only shift.
    pub deleted_helpers: Vec<Uuid>,
}

/// Deletes the provided shift.
///
/// Every helper whose only shift was this one is deleted too, with their badge.
/// The helpers registered in other shifts are kept.
#[tracing::instrument(skip(conn))]
pub async fn delete_shift<C: TransactionTrait + Sync>(
    conn: &C,
    shift_id: i32,
) -> HelferResult<DeletedShift> {
    let deleted = crate::assert_future_send(sync::transaction(conn, async |txn| {
        let helper_ids: Vec<Uuid> = helper_shifts::Entity::find()
            .select_only()
            .column(helper_shifts::Column::HelperId)
            .filter(helper_shifts::Column::ShiftId.eq(shift_id))
            .into_tuple()
            .all(txn)
            .await?;

        helper_shifts::Entity::delete_many()
            .filter(helper_shifts::Column::ShiftId.eq(shift_id))
            .exec(txn)
            .await?;
        shift::Entity::delete_by_id(shift_id).exec(txn).await?;

        let mut deleted = DeletedShift::default();
        for helper_id in helper_ids {
            let remaining = helper_shifts::Entity::find()
                .filter(helper_shifts::Column::HelperId.eq(helper_id))
                .count(txn)
                .await?;
            if remaining > 0 {
                continue;
            }

            badge::Entity::delete_many()
                .filter(badge::Column::HelperId.eq(helper_id))
                .exec(txn)
                .await?;
            helper::Entity::delete_by_id(helper_id).exec(txn).await?;
            deleted.deleted_helpers.push(helper_id);
        }

        HelferResult::Ok(deleted)
    }))
    .await?;

    tracing::info!(
        "Deleted shift with {} orphan helper(s)",
        deleted.deleted_helpers.len()
    );

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use entity::shift;

    use super::{FillRatio, helpers_percent, time, time_hours};

    fn shift(begin: (u32, u32), end: (u32, u32), number: i32) -> shift::Model {
        let day = NaiveDate::from_ymd_opt(2024, 8, 3).unwrap();
        shift::Model {
            id: 1,
            job_id: 1,
            begin: day.and_hms_opt(begin.0, begin.1, 0).unwrap(),
            end: day.and_hms_opt(end.0, end.1, 0).unwrap(),
            number,
        }
    }

    #[test]
    fn empty_capacity_is_full_with_zero_percent() {
        let ratio = FillRatio::new(0, 0);
        assert!(ratio.is_full);
        assert_eq!(ratio.helpers_percent, 0);

        let ratio = FillRatio::new(3, 0);
        assert!(ratio.is_full);
        assert_eq!(ratio.helpers_percent, 0);
    }

    #[test]
    fn percent_rounding() {
        assert_eq!(helpers_percent(1, 3), 33);
        assert_eq!(helpers_percent(2, 3), 67);
        assert_eq!(helpers_percent(4, 4), 100);
        assert_eq!(helpers_percent(6, 4), 150);
        // 12.5 and 37.5
        assert_eq!(helpers_percent(1, 8), 12);
        assert_eq!(helpers_percent(3, 8), 38);
    }

    #[test]
    fn not_full_below_capacity() {
        let ratio = FillRatio::new(2, 5);
        assert!(!ratio.is_full);
        assert_eq!(ratio.helpers_percent, 40);
        assert!(FillRatio::new(5, 5).is_full);
    }

    #[test]
    fn time_formats() {
        let shift = shift((8, 5), (12, 30), 2);
        assert_eq!(time(&shift), "03.08.2024, 08:05 - 12:30");
        assert_eq!(time_hours(&shift), "08:05 - 12:30");
    }
}
