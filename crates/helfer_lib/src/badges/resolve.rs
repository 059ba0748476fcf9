//! The resolution of what is printed on the badge of a helper, and the warnings about
//! badges that can't be fully resolved.

use std::collections::HashMap;

use entity::{
    badge, badge_defaults, badge_design, badge_permission, badge_role, helper, helper_shifts, job,
    shift,
};
use sea_orm::{
    ColumnTrait as _, ConnectionTrait, EntityTrait as _, JoinType, QueryFilter as _,
    QueryOrder as _, QuerySelect as _, RelationTrait as _,
};
use uuid::Uuid;

use super::{Defaults, create_badge, get_settings};
use crate::{error::HelferResult, job::get_helpers};

/// The badge configuration of an event, loaded once to resolve many badges.
#[derive(Debug)]
pub struct EventBadges {
    /// The badge settings of the event.
    pub settings: entity::badge_settings::Model,
    event_defaults: Defaults,
    job_defaults: HashMap<i32, Defaults>,
    jobs: HashMap<i32, job::Model>,
    roles: HashMap<i32, (badge_role::Model, Vec<badge_permission::Model>)>,
    designs: HashMap<i32, badge_design::Model>,
    helper_jobs: HashMap<Uuid, Vec<i32>>,
}

impl EventBadges {
    /// Loads the badge configuration of the provided event.
    pub async fn load<C: ConnectionTrait>(conn: &C, event_id: i32) -> HelferResult<Self> {
        let settings = get_settings(conn, event_id).await?;

        let mut event_defaults = Defaults::default();
        let mut job_defaults = HashMap::new();
        for row in badge_defaults::Entity::find()
            .filter(badge_defaults::Column::EventId.eq(event_id))
            .all(conn)
            .await?
        {
            match row.job_id {
                Some(job_id) => {
                    job_defaults.insert(job_id, Defaults::from(&row));
                }
                None => event_defaults = Defaults::from(&row),
            }
        }

        let jobs = job::Entity::find()
            .filter(job::Column::EventId.eq(event_id))
            .all(conn)
            .await?
            .into_iter()
            .map(|job| (job.id, job))
            .collect();

        let roles = badge_role::Entity::find()
            .filter(badge_role::Column::EventId.eq(event_id))
            .order_by_asc(badge_role::Column::Id)
            .find_with_related(badge_permission::Entity)
            .all(conn)
            .await?
            .into_iter()
            .map(|(role, permissions)| (role.id, (role, permissions)))
            .collect();

        let designs = badge_design::Entity::find()
            .filter(badge_design::Column::EventId.eq(event_id))
            .all(conn)
            .await?
            .into_iter()
            .map(|design| (design.id, design))
            .collect();

        let mut helper_jobs: HashMap<Uuid, Vec<i32>> = HashMap::new();
        for (helper_id, job_id) in helper_shifts::Entity::find()
            .select_only()
            .column(helper_shifts::Column::HelperId)
            .column(shift::Column::JobId)
            .inner_join(shift::Entity)
            .join(JoinType::InnerJoin, shift::Relation::Job.def())
            .filter(job::Column::EventId.eq(event_id))
            .distinct()
            .order_by_asc(shift::Column::JobId)
            .into_tuple::<(Uuid, i32)>()
            .all(conn)
            .await?
        {
            helper_jobs.entry(helper_id).or_default().push(job_id);
        }

        Ok(Self {
            settings,
            event_defaults,
            job_defaults,
            jobs,
            roles,
            designs,
            helper_jobs,
        })
    }

    /// Returns whether the badges can be generated, meaning the default role and design
    /// of the event are set.
    pub fn creation_possible(&self) -> bool {
        self.event_defaults.role.is_some() && self.event_defaults.design.is_some()
    }

    /// Returns the job printed on the badge: the primary job if set, else the only job of
    /// the helper. If the helper has several jobs and no primary one, `None` is returned.
    pub fn resolve_job(&self, badge: &badge::Model) -> Option<&job::Model> {
        if let Some(primary) = badge.primary_job_id {
            return self.jobs.get(&primary);
        }

        match self.helper_jobs.get(&badge.helper_id).map(Vec::as_slice) {
            Some([only]) => self.jobs.get(only),
            _ => None,
        }
    }

    fn resolve_default<F>(&self, over: Option<i32>, job: Option<&job::Model>, f: F) -> Option<i32>
    where
        F: Fn(&Defaults) -> Option<i32>,
    {
        over.or_else(|| {
            job.and_then(|job| self.job_defaults.get(&job.id))
                .and_then(&f)
        })
        .or_else(|| f(&self.event_defaults))
    }

    /// Resolves everything printed on the badge of the provided helper.
    ///
    /// The role and the design are taken from the badge, else from the defaults of its job,
    /// else from the defaults of the event.
    pub fn resolve(&self, helper: &helper::Model, badge: &badge::Model) -> ResolvedBadge {
        let job = self.resolve_job(badge);

        let role = self
            .resolve_default(badge.role_id, job, |d| d.role)
            .and_then(|id| self.roles.get(&id));
        let design = self
            .resolve_default(badge.design_id, job, |d| d.design)
            .and_then(|id| self.designs.get(&id))
            .cloned();

        ResolvedBadge {
            helper_id: helper.id,
            firstname: badge
                .firstname
                .clone()
                .unwrap_or_else(|| helper.prename.clone()),
            surname: badge
                .surname
                .clone()
                .unwrap_or_else(|| helper.surname.clone()),
            job: job.cloned(),
            permissions: role.map(|(_, perms)| perms.clone()).unwrap_or_default(),
            role: role.map(|(role, _)| role.clone()),
            design,
            photo: badge.photo.clone(),
            barcode: self.settings.barcodes.then_some(badge.barcode),
            printed: badge.printed,
        }
    }
}

/// Everything printed on the badge of a helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBadge {
    /// The ID of the helper.
    pub helper_id: Uuid,
    /// The printed first name.
    pub firstname: String,
    /// The printed last name.
    pub surname: String,
    /// The printed job, if it is unambiguous.
    pub job: Option<job::Model>,
    /// The printed role.
    pub role: Option<badge_role::Model>,
    /// The design of the badge.
    pub design: Option<badge_design::Model>,
    /// The permissions granted by the role.
    pub permissions: Vec<badge_permission::Model>,
    /// The path to the photo, relative to the media root.
    pub photo: Option<String>,
    /// The barcode, if the barcodes are enabled.
    pub barcode: Option<i32>,
    /// Was the badge already printed?
    pub printed: bool,
}

/// Returns the helpers of the provided job with their badges.
///
/// A missing badge is created.
pub async fn helpers_with_badges<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
) -> HelferResult<Vec<(helper::Model, badge::Model)>> {
    let helpers = get_helpers(conn, job_id).await?;

    let mut badges: HashMap<Uuid, badge::Model> = badge::Entity::find()
        .filter(badge::Column::HelperId.is_in(helpers.iter().map(|h| h.id)))
        .all(conn)
        .await?
        .into_iter()
        .map(|badge| (badge.helper_id, badge))
        .collect();

    let mut out = Vec::with_capacity(helpers.len());
    for helper in helpers {
        let badge = match badges.remove(&helper.id) {
            Some(badge) => badge,
            None => {
                tracing::warn!("Helper {} had no badge, creating it", helper.id);
                create_badge(conn, helper.id).await?
            }
        };
        out.push((helper, badge));
    }
    Ok(out)
}

/// A reason why a badge can't be fully resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeWarning {
    /// The helper has several jobs and no primary one.
    AmbiguousJob,
    /// No role could be resolved.
    MissingRole,
    /// No design could be resolved.
    MissingDesign,
}

/// The badge warnings of a helper.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HelperWarnings {
    /// The ID of the helper.
    pub helper_id: Uuid,
    /// The full name of the helper.
    pub name: String,
    /// The warnings.
    pub warnings: Vec<BadgeWarning>,
}

/// Returns the warnings of a resolved badge.
pub fn warnings(resolved: &ResolvedBadge) -> Vec<BadgeWarning> {
    let mut out = Vec::new();
    if resolved.job.is_none() {
        out.push(BadgeWarning::AmbiguousJob);
    }
    if resolved.role.is_none() {
        out.push(BadgeWarning::MissingRole);
    }
    if resolved.design.is_none() {
        out.push(BadgeWarning::MissingDesign);
    }
    out
}

/// Returns the helpers of the provided job whose badge has at least one warning.
pub async fn warnings_for_job<C: ConnectionTrait>(
    conn: &C,
    ctx: &EventBadges,
    job_id: i32,
) -> HelferResult<Vec<HelperWarnings>> {
    Ok(helpers_with_badges(conn, job_id)
        .await?
        .iter()
        .filter_map(|(helper, badge)| {
            let warnings = warnings(&ctx.resolve(helper, badge));
            (!warnings.is_empty()).then(|| HelperWarnings {
                helper_id: helper.id,
                name: helper.full_name(),
                warnings,
            })
        })
        .collect())
}

/// Returns whether a helper should be added to the badges of a job.
///
/// A printed badge is skipped if requested. Otherwise, the helper is added if the job is
/// their resolved one, or if their job is ambiguous.
pub fn should_print(job_id: i32, skip_printed: bool, resolved: &ResolvedBadge) -> bool {
    if skip_printed && resolved.printed {
        return false;
    }
    resolved.job.as_ref().is_none_or(|job| job.id == job_id)
}
