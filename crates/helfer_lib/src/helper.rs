//! This module contains anything related to the helpers: their registration and the
//! properties derived from their shifts.

use chrono::Utc;
use entity::{
    event, helper, helper_shifts, job, shift,
    types::{FoodInstruction, ShirtSize},
};
use itertools::Itertools as _;
use sea_orm::{
    ActiveValue::Set, ColumnTrait as _, ConnectionTrait, EntityTrait as _, JoinType,
    QueryFilter as _, QueryOrder as _, QuerySelect as _, RelationTrait as _, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    badges,
    error::{HelferError, HelferResult},
    mail::{Mailer, confirmation_mail},
    shift::{FillRatio, count_helpers_by_shift},
    sync,
};

/// Returns the event of the helper, which is the event of their first shift.
///
/// If the helper isn't registered in any shift, `None` is returned.
pub async fn get_event<C: ConnectionTrait>(
    conn: &C,
    helper_id: Uuid,
) -> HelferResult<Option<event::Model>> {
    let Some(first_shift) = shift::Entity::find()
        .inner_join(helper_shifts::Entity)
        .filter(helper_shifts::Column::HelperId.eq(helper_id))
        .order_by_asc(shift::Column::Id)
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let event = event::Entity::find()
        .inner_join(job::Entity)
        .filter(job::Column::Id.eq(first_shift.job_id))
        .one(conn)
        .await?;
    Ok(event)
}

/// Returns the distinct jobs of the shifts of the helper.
pub async fn get_jobs<C: ConnectionTrait>(
    conn: &C,
    helper_id: Uuid,
) -> HelferResult<Vec<job::Model>> {
    let jobs = job::Entity::find()
        .inner_join(shift::Entity)
        .join(JoinType::InnerJoin, shift::Relation::HelperShifts.def())
        .filter(helper_shifts::Column::HelperId.eq(helper_id))
        .distinct()
        .order_by_asc(job::Column::Id)
        .all(conn)
        .await?;
    Ok(jobs)
}

/// The data submitted by a helper to register.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Registration {
    /// The IDs of the chosen shifts.
    pub shifts: Vec<i32>,
    /// The first name.
    pub prename: String,
    /// The last name.
    pub surname: String,
    /// The address of the confirmation e-mail.
    pub email: String,
    /// The mobile phone number.
    pub phone: String,
    /// A free comment for the organizers.
    #[serde(default)]
    pub comment: String,
    /// The t-shirt size, required if the event asks for it.
    #[serde(default)]
    pub shirt: Option<ShirtSize>,
    /// Whether the helper eats vegetarian food.
    #[serde(default)]
    pub vegetarian: bool,
    /// The status of the food handling instruction, required if a chosen job needs it.
    #[serde(default)]
    pub infection_instruction: Option<FoodInstruction>,
}

impl Registration {
    fn check_fields(&self, event: &event::Model, errors: &mut Vec<String>) {
        if self.shifts.is_empty() {
            errors.push("at least one shift must be chosen".to_owned());
        }
        if self.prename.trim().is_empty() {
            errors.push("the prename is required".to_owned());
        }
        if self.surname.trim().is_empty() {
            errors.push("the surname is required".to_owned());
        }
        if !self.email.contains('@') {
            errors.push(format!("invalid e-mail address `{}`", self.email));
        }
        if self.phone.trim().is_empty() {
            errors.push("the mobile phone number is required".to_owned());
        }
        if event.ask_shirt && self.shirt.is_none() {
            errors.push("the t-shirt size is required".to_owned());
        }
    }
}

/// Checks the chosen shifts of a registration, and returns them with their job.
async fn check_shifts<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    registration: &Registration,
    errors: &mut Vec<String>,
) -> HelferResult<Vec<(job::Model, shift::Model)>> {
    let shift_ids = registration.shifts.iter().copied().unique().collect_vec();

    let shifts = shift::Entity::find()
        .filter(shift::Column::Id.is_in(shift_ids.iter().copied()))
        .find_also_related(job::Entity)
        .order_by_asc(shift::Column::Begin)
        .all(conn)
        .await?
        .into_iter()
        .filter_map(|(shift, job)| job.filter(|j| j.event_id == event.id).map(|j| (j, shift)))
        .collect_vec();

    for id in &shift_ids {
        if !shifts.iter().any(|(_, shift)| shift.id == *id) {
            errors.push(format!("shift {id} doesn't exist in this event"));
        }
    }

    let counts = count_helpers_by_shift(conn, shifts.iter().map(|(_, shift)| shift.id)).await?;
    for (job, shift) in &shifts {
        let count = counts.get(&shift.id).copied().unwrap_or_default();
        if FillRatio::new(count, shift.number).is_full {
            errors.push(format!(
                "the shift {} of {} is already full",
                crate::shift::time(shift),
                job.name
            ));
        }
    }

    if registration.infection_instruction.is_none()
        && shifts.iter().any(|(job, _)| job.infection_instruction)
    {
        errors.push("the status of the food handling instruction is required".to_owned());
    }

    Ok(shifts)
}

/// Registers a new helper in the provided event.
///
/// The submitted data is checked: the chosen shifts must belong to the event and must not be
/// full, the t-shirt size is required if the event asks for it, and the status of the food
/// handling instruction is required if one of the chosen jobs needs it.
///
/// The helper is saved with their shifts and their badge, then the confirmation e-mail
/// is sent with the provided mailer.
#[tracing::instrument(skip_all, fields(event = %event.url_name))]
pub async fn register<C: TransactionTrait + Sync>(
    conn: &C,
    mailer: &dyn Mailer,
    event: &event::Model,
    registration: Registration,
) -> HelferResult<helper::Model> {
    if !event.active {
        return Err(HelferError::RegistrationClosed(event.url_name.clone()));
    }

    let (helper, shifts) = crate::assert_future_send(sync::transaction(conn, async |txn| {
        let mut errors = Vec::new();
        registration.check_fields(event, &mut errors);
        let shifts = check_shifts(txn, event, &registration, &mut errors).await?;
        if !errors.is_empty() {
            return Err(HelferError::Validation(errors));
        }

        let helper = helper::Model {
            id: Uuid::new_v4(),
            prename: registration.prename.trim().to_owned(),
            surname: registration.surname.trim().to_owned(),
            email: registration.email.trim().to_owned(),
            phone: registration.phone.trim().to_owned(),
            comment: registration.comment.clone(),
            shirt: registration.shirt.unwrap_or_default(),
            vegetarian: registration.vegetarian,
            infection_instruction: registration.infection_instruction,
            timestamp: Utc::now().naive_utc(),
        };
        helper::Entity::insert(helper::ActiveModel::from(helper.clone()))
            .exec_without_returning(txn)
            .await?;

        helper_shifts::Entity::insert_many(shifts.iter().map(|(_, shift)| {
            helper_shifts::ActiveModel {
                helper_id: Set(helper.id),
                shift_id: Set(shift.id),
            }
        }))
        .exec_without_returning(txn)
        .await?;

        badges::create_badge(txn, helper.id).await?;

        HelferResult::Ok((helper, shifts))
    }))
    .await?;

    tracing::info!("Registered helper {} in {} shift(s)", helper.id, shifts.len());

    if let Some(mail) = confirmation_mail(event, &helper, &shifts) {
        mailer.send(&mail).await?;
    }

    Ok(helper)
}
