//! Shortcuts to fill the test databases.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use entity::{
    event, event_admins, helper, helper_shifts, job, shift,
    types::{FoodInstruction, ShirtSize},
    users,
};
use sea_orm::{ActiveModelTrait as _, ActiveValue::Set, ConnectionTrait, EntityTrait as _};
use uuid::Uuid;

/// Returns the date and time of the provided day of august 2024.
pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 8, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("invalid fixture date")
}

/// Creates an active event with all the optional features disabled.
///
/// The `edit` function can change the event before it is inserted.
pub async fn create_event<C, F>(conn: &C, url_name: &str, edit: F) -> anyhow::Result<event::Model>
where
    C: ConnectionTrait,
    F: FnOnce(&mut event::ActiveModel),
{
    let mut event = event::ActiveModel {
        url_name: Set(url_name.to_owned()),
        name: Set(format!("Event {url_name}")),
        text: Set(String::new()),
        imprint: Set(String::new()),
        registered: Set(String::new()),
        email: Set(format!("orga@{url_name}.example")),
        active: Set(true),
        ask_shirt: Set(false),
        ask_vegetarian: Set(false),
        show_public_numbers: Set(false),
        badges: Set(false),
        ..Default::default()
    };
    edit(&mut event);
    Ok(event.insert(conn).await?)
}

/// Creates a user.
pub async fn create_user<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    is_superuser: bool,
) -> anyhow::Result<users::Model> {
    let user = users::ActiveModel {
        username: Set(username.to_owned()),
        is_superuser: Set(is_superuser),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(user)
}

/// Makes the user an admin of the event.
pub async fn add_admin<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
    user_id: i32,
) -> anyhow::Result<()> {
    event_admins::Entity::insert(event_admins::ActiveModel {
        event_id: Set(event_id),
        user_id: Set(user_id),
    })
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

/// Creates a job in the event.
pub async fn create_job<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
    name: &str,
    infection_instruction: bool,
) -> anyhow::Result<job::Model> {
    let job = job::ActiveModel {
        event_id: Set(event_id),
        name: Set(name.to_owned()),
        infection_instruction: Set(infection_instruction),
        description: Set(String::new()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(job)
}

/// Creates a shift of two hours in the job.
pub async fn create_shift<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
    begin: NaiveDateTime,
    number: i32,
) -> anyhow::Result<shift::Model> {
    let shift = helfer_lib::shift::create_shift(
        conn,
        job_id,
        begin,
        begin + TimeDelta::hours(2),
        number,
    )
    .await?;
    Ok(shift)
}

static REGISTRATION_ORDER: AtomicI64 = AtomicI64::new(0);

/// Registers a helper in the provided shifts, with a badge, without any check.
///
/// The helpers are registered one second after each other, in the order of the calls.
pub async fn add_helper<C: ConnectionTrait>(
    conn: &C,
    prename: &str,
    shift_ids: &[i32],
) -> anyhow::Result<helper::Model> {
    let order = REGISTRATION_ORDER.fetch_add(1, Ordering::Relaxed);

    let helper = helper::Model {
        id: Uuid::new_v4(),
        prename: prename.to_owned(),
        surname: "Doe".to_owned(),
        email: format!("{}@example.org", prename.to_lowercase()),
        phone: "0123456".to_owned(),
        comment: String::new(),
        shirt: ShirtSize::M,
        vegetarian: false,
        infection_instruction: Some(FoodInstruction::Yes),
        timestamp: at(1, 0) + TimeDelta::seconds(order),
    };
    helper::Entity::insert(helper::ActiveModel::from(helper.clone()))
        .exec_without_returning(conn)
        .await?;

    for shift_id in shift_ids {
        helper_shifts::Entity::insert(helper_shifts::ActiveModel {
            helper_id: Set(helper.id),
            shift_id: Set(*shift_id),
        })
        .exec_without_returning(conn)
        .await?;
    }

    helfer_lib::badges::create_badge(conn, helper.id).await?;

    Ok(helper)
}
