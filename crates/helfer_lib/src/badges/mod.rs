//! This module contains the badge system: its configuration per event, the resolution
//! of what is printed on each badge, the generation of the PDF files and the check-in
//! of the printed badges.

use std::{path::PathBuf, time::Duration};

use entity::{badge, event, job};
use rand::Rng as _;
use sea_orm::{
    ActiveModelTrait as _, ActiveValue::Set, ColumnTrait as _, ConnectionTrait, EntityTrait as _,
    PaginatorTrait as _, QueryFilter as _,
};
use uuid::Uuid;

use crate::{error::HelferResult, event::get_jobs, internal};

mod checkin;
mod creator;
mod latex;
mod resolve;
mod settings;

pub use checkin::*;
pub use creator::*;
pub use latex::*;
pub use resolve::*;
pub use settings::*;

/// The configuration of the generation of the badges, common to all the events.
#[derive(Debug, Clone)]
pub struct BadgeConfig {
    /// The directory containing the uploaded templates, photos and backgrounds.
    pub media_root: PathBuf,
    /// The path to the pdflatex binary.
    pub pdflatex: PathBuf,
    /// The template used by the events without a custom one.
    pub default_template: PathBuf,
    /// If set, the generated data file is copied there.
    pub debug_file: Option<PathBuf>,
    /// The language code given to the template.
    pub language: String,
    /// The maximum duration of the typesetting.
    pub timeout: Duration,
    /// The delay before the temporary files of a generation are removed.
    pub rm_delay: Duration,
    /// The maximum size of a photo, in bytes.
    pub photo_max_size: u64,
}

const BARCODE_RANGE: std::ops::Range<i32> = 10_000_000..100_000_000;

/// Creates the badge of a new helper, with a random unique barcode.
pub async fn create_badge<C: ConnectionTrait>(conn: &C, helper_id: Uuid) -> HelferResult<badge::Model> {
    for _ in 0..16 {
        let barcode = rand::rng().random_range(BARCODE_RANGE);

        let taken = badge::Entity::find()
            .filter(badge::Column::Barcode.eq(barcode))
            .count(conn)
            .await?;
        if taken > 0 {
            continue;
        }

        let badge = badge::ActiveModel {
            helper_id: Set(helper_id),
            barcode: Set(barcode),
            printed: Set(false),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        return Ok(badge);
    }

    Err(internal!("could not find a free barcode for helper {helper_id}"))
}

/// A job in the overview of the badges, with its number of warnings.
#[derive(Debug, serde::Serialize)]
pub struct JobOverview {
    /// The job itself.
    #[serde(flatten)]
    pub job: job::Model,
    /// The number of helpers of the job with a badge warning.
    pub num_warnings: usize,
}

/// The overview of the badges of an event.
#[derive(Debug, serde::Serialize)]
pub struct BadgeOverview {
    /// Can the badges be generated, meaning the default role and design are set?
    pub possible: bool,
    /// The jobs of the event.
    pub jobs: Vec<JobOverview>,
}

/// Returns the overview of the badges of the provided event.
pub async fn overview<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
) -> HelferResult<BadgeOverview> {
    let ctx = EventBadges::load(conn, event.id).await?;

    let mut jobs = Vec::new();
    for job in get_jobs(conn, event.id).await? {
        let num_warnings = warnings_for_job(conn, &ctx, job.id).await?.len();
        jobs.push(JobOverview { job, num_warnings });
    }

    Ok(BadgeOverview {
        possible: ctx.creation_possible(),
        jobs,
    })
}
