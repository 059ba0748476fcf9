//! This module contains anything related to the events in this library.

use entity::{event, event_admins, job, users};
use sea_orm::{
    ColumnTrait as _, ConnectionTrait, EntityTrait as _, PaginatorTrait as _, QueryFilter as _,
    QueryOrder as _,
};

use crate::{
    error::HelferResult,
    job::get_shifts_by_day,
    shift::{self, FillRatio, count_helpers_by_shift},
};

/// Returns the event bound to the provided URL name.
pub async fn get_event_by_url_name<C: ConnectionTrait>(
    conn: &C,
    url_name: &str,
) -> HelferResult<Option<event::Model>> {
    let event = event::Entity::find()
        .filter(event::Column::UrlName.eq(url_name))
        .one(conn)
        .await?;
    Ok(event)
}

/// Returns whether the provided URL name is valid, meaning it only contains
/// the characters `a-zA-Z0-9`.
pub fn is_valid_url_name(url_name: &str) -> bool {
    !url_name.is_empty() && url_name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Returns whether the user with the provided username can administrate the event.
///
/// A superuser is the admin of every event. An unknown user is admin of nothing.
pub async fn is_admin<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
    username: &str,
) -> HelferResult<bool> {
    let Some(user) = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(conn)
        .await?
    else {
        return Ok(false);
    };

    if user.is_superuser {
        return Ok(true);
    }

    let count = event_admins::Entity::find_by_id((event_id, user.id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// Returns the jobs of the provided event, in the order of their creation.
pub async fn get_jobs<C: ConnectionTrait>(conn: &C, event_id: i32) -> HelferResult<Vec<job::Model>> {
    let jobs = job::Entity::find()
        .filter(job::Column::EventId.eq(event_id))
        .order_by_asc(job::Column::Id)
        .all(conn)
        .await?;
    Ok(jobs)
}

/// Returns the job with the provided ID, if it belongs to the event.
pub async fn get_job<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
    job_id: i32,
) -> HelferResult<Option<job::Model>> {
    let job = job::Entity::find_by_id(job_id)
        .filter(job::Column::EventId.eq(event_id))
        .one(conn)
        .await?;
    Ok(job)
}

/// A shift as shown on the registration page.
#[derive(Debug, serde::Serialize)]
pub struct PublicShift {
    /// The ID of the shift.
    pub id: i32,
    /// The time range of the shift.
    pub time: String,
    /// Is the shift full? A full shift can't be chosen.
    pub is_full: bool,
    /// The filling state of the shift, if the event shows it.
    #[serde(flatten)]
    pub numbers: Option<PublicNumbers>,
}

/// The numbers of a shift that are only shown when the event allows it.
#[derive(Debug, serde::Serialize)]
pub struct PublicNumbers {
    /// The number of registered helpers.
    pub num_helpers: u64,
    /// The maximal number of helpers.
    pub number: i32,
    /// The percentage of registered helpers.
    pub helpers_percent: i64,
}

/// The shifts of a job that begin on the same day.
#[derive(Debug, serde::Serialize)]
pub struct PublicDay {
    /// The day, like `24.08.2024`.
    pub day: String,
    /// The shifts of the day, sorted by their begin.
    pub shifts: Vec<PublicShift>,
}

/// A job as shown on the registration page.
#[derive(Debug, serde::Serialize)]
pub struct PublicJob {
    /// The job itself.
    #[serde(flatten)]
    pub job: job::Model,
    /// The shifts of the job grouped by day.
    pub days: Vec<PublicDay>,
}

/// The registration page of an event.
#[derive(Debug, serde::Serialize)]
pub struct PublicEvent {
    /// The event itself.
    #[serde(flatten)]
    pub event: event::Model,
    /// The jobs of the event.
    pub jobs: Vec<PublicJob>,
}

/// Returns the registration page of the provided event.
///
/// The numbers of helpers are only included if the event shows them publicly.
pub async fn public_view<C: ConnectionTrait>(
    conn: &C,
    event: event::Model,
) -> HelferResult<PublicEvent> {
    let mut jobs = Vec::new();

    for job in get_jobs(conn, event.id).await? {
        let days = get_shifts_by_day(conn, job.id).await?;
        let counts =
            count_helpers_by_shift(conn, days.values().flatten().map(|shift| shift.id)).await?;

        let days = days
            .into_iter()
            .map(|(day, shifts)| PublicDay {
                day: day.format("%d.%m.%Y").to_string(),
                shifts: shifts
                    .iter()
                    .map(|s| {
                        let ratio =
                            FillRatio::new(counts.get(&s.id).copied().unwrap_or_default(), s.number);
                        PublicShift {
                            id: s.id,
                            time: shift::time_hours(s),
                            is_full: ratio.is_full,
                            numbers: event.show_public_numbers.then_some(PublicNumbers {
                                num_helpers: ratio.num_helpers,
                                number: ratio.number,
                                helpers_percent: ratio.helpers_percent,
                            }),
                        }
                    })
                    .collect(),
            })
            .collect();

        jobs.push(PublicJob { job, days });
    }

    Ok(PublicEvent { event, jobs })
}
