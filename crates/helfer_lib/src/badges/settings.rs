//! The configuration of the badges of an event: settings, permissions, roles, designs
//! and defaults.

use entity::{
    badge, badge_defaults, badge_design, badge_permission, badge_role, badge_role_permissions,
    badge_settings, event,
};
use sea_orm::{
    ActiveModelTrait as _, ActiveValue::Set, ColumnTrait as _, ConnectionTrait, EntityTrait as _,
    QueryFilter as _, QueryOrder as _, TransactionTrait, TryIntoModel as _,
};

use super::{BadgeConfig, create_badge};
use crate::{
    error::{HelferError, HelferResult},
    helper::get_jobs,
    must, sync,
};

/// Returns the badge settings of the provided event, creating them if they don't exist yet.
pub async fn get_settings<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
) -> HelferResult<badge_settings::Model> {
    if let Some(settings) = badge_settings::Entity::find_by_id(event_id).one(conn).await? {
        return Ok(settings);
    }

    let settings = badge_settings::ActiveModel {
        event_id: Set(event_id),
        latex_template: Set(None),
        barcodes: Set(false),
    }
    .insert(conn)
    .await?;
    Ok(settings)
}

/// The submitted badge settings of an event.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SettingsForm {
    /// The path to a custom template, relative to the media root.
    #[serde(default)]
    pub latex_template: Option<String>,
    /// Are barcodes printed on the badges?
    #[serde(default)]
    pub barcodes: bool,
}

/// Saves the badge settings of the provided event.
pub async fn save_settings<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
    form: SettingsForm,
) -> HelferResult<badge_settings::Model> {
    let latex_template = form.latex_template.filter(|path| !path.trim().is_empty());
    if let Some(path) = &latex_template {
        check_media_path(path)?;
    }

    let mut settings: badge_settings::ActiveModel = get_settings(conn, event_id).await?.into();
    settings.latex_template = Set(latex_template);
    settings.barcodes = Set(form.barcodes);
    Ok(settings.update(conn).await?)
}

/// Checks that the provided media path stays inside the media root.
fn check_media_path(path: &str) -> HelferResult<()> {
    let path = std::path::Path::new(path);
    if path.is_absolute()
        || path
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
    {
        return Err(HelferError::Validation(vec![format!(
            "invalid media path `{}`",
            path.display()
        )]));
    }
    Ok(())
}

fn check_latex_name(latex_name: &str, errors: &mut Vec<String>) {
    if latex_name.is_empty()
        || !latex_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        errors.push(format!(
            "the LaTeX name `{latex_name}` must only contain letters, digits and `-`"
        ));
    }
}

fn check_name(name: &str, errors: &mut Vec<String>) {
    if name.trim().is_empty() {
        errors.push("the name is required".to_owned());
    }
}

/// Returns the badge permissions of the provided event.
pub async fn get_permissions<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
) -> HelferResult<Vec<badge_permission::Model>> {
    let permissions = badge_permission::Entity::find()
        .filter(badge_permission::Column::EventId.eq(event_id))
        .order_by_asc(badge_permission::Column::Id)
        .all(conn)
        .await?;
    Ok(permissions)
}

/// The submitted badge permission.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PermissionForm {
    /// The displayed name.
    pub name: String,
    /// The name used in the template, without the `perm-` prefix.
    pub latex_name: String,
}

/// Creates a badge permission in the event, or edits it if an ID is provided.
pub async fn save_permission<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    permission_id: Option<i32>,
    form: PermissionForm,
) -> HelferResult<badge_permission::Model> {
    let mut errors = Vec::new();
    check_name(&form.name, &mut errors);
    check_latex_name(&form.latex_name, &mut errors);
    if !errors.is_empty() {
        return Err(HelferError::Validation(errors));
    }

    let mut permission: badge_permission::ActiveModel = match permission_id {
        Some(id) => must::have_badge_permission(conn, event, id).await?.into(),
        None => badge_permission::ActiveModel {
            event_id: Set(event.id),
            ..Default::default()
        },
    };
    permission.name = Set(form.name);
    permission.latex_name = Set(form.latex_name);
    Ok(permission.save(conn).await?.try_into_model()?)
}

/// A badge role with the IDs of its permissions.
#[derive(Debug, serde::Serialize)]
pub struct RoleWithPermissions {
    /// The role itself.
    #[serde(flatten)]
    pub role: badge_role::Model,
    /// The IDs of the permissions granted by the role.
    pub permissions: Vec<i32>,
}

/// Returns the badge roles of the provided event, with their permissions.
pub async fn get_roles<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
) -> HelferResult<Vec<RoleWithPermissions>> {
    let roles = badge_role::Entity::find()
        .filter(badge_role::Column::EventId.eq(event_id))
        .order_by_asc(badge_role::Column::Id)
        .find_with_related(badge_permission::Entity)
        .all(conn)
        .await?;

    Ok(roles
        .into_iter()
        .map(|(role, permissions)| RoleWithPermissions {
            role,
            permissions: permissions.into_iter().map(|p| p.id).collect(),
        })
        .collect())
}

/// The submitted badge role.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RoleForm {
    /// The displayed name.
    pub name: String,
    /// The name used in the template.
    pub latex_name: String,
    /// The IDs of the permissions granted by the role.
    #[serde(default)]
    pub permissions: Vec<i32>,
}

/// Creates a badge role in the event, or edits it if an ID is provided.
///
/// The permissions of the role are replaced by the submitted ones, which must belong
/// to the event.
pub async fn save_role<C: TransactionTrait + Sync>(
    conn: &C,
    event: &event::Model,
    role_id: Option<i32>,
    form: RoleForm,
) -> HelferResult<RoleWithPermissions> {
    let mut errors = Vec::new();
    check_name(&form.name, &mut errors);
    check_latex_name(&form.latex_name, &mut errors);
    if !errors.is_empty() {
        return Err(HelferError::Validation(errors));
    }

    crate::assert_future_send(sync::transaction(conn, async |txn| {
        let mut permissions = Vec::with_capacity(form.permissions.len());
        for id in &form.permissions {
            let permission = must::have_badge_permission(txn, event, *id).await?;
            if !permissions.contains(&permission.id) {
                permissions.push(permission.id);
            }
        }

        let mut role: badge_role::ActiveModel = match role_id {
            Some(id) => must::have_badge_role(txn, event, id).await?.into(),
            None => badge_role::ActiveModel {
                event_id: Set(event.id),
                ..Default::default()
            },
        };
        role.name = Set(form.name.clone());
        role.latex_name = Set(form.latex_name.clone());
        let role = role.save(txn).await?.try_into_model()?;

        badge_role_permissions::Entity::delete_many()
            .filter(badge_role_permissions::Column::RoleId.eq(role.id))
            .exec(txn)
            .await?;
        if !permissions.is_empty() {
            badge_role_permissions::Entity::insert_many(permissions.iter().map(|permission_id| {
                badge_role_permissions::ActiveModel {
                    role_id: Set(role.id),
                    permission_id: Set(*permission_id),
                }
            }))
            .exec_without_returning(txn)
            .await?;
        }

        HelferResult::Ok(RoleWithPermissions { role, permissions })
    }))
    .await
}

/// Returns the badge designs of the provided event.
pub async fn get_designs<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
) -> HelferResult<Vec<badge_design::Model>> {
    let designs = badge_design::Entity::find()
        .filter(badge_design::Column::EventId.eq(event_id))
        .order_by_asc(badge_design::Column::Id)
        .all(conn)
        .await?;
    Ok(designs)
}

/// The submitted badge design.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DesignForm {
    /// The displayed name.
    pub name: String,
    /// The font color, as 6 hexadecimal digits, with or without the leading `#`.
    pub font_color: String,
    /// The background of the front side, relative to the media root.
    #[serde(default)]
    pub bg_front: Option<String>,
    /// The background of the back side, relative to the media root.
    #[serde(default)]
    pub bg_back: Option<String>,
}

/// Returns the normalized font color, without `#` and in uppercase, if it is valid.
pub fn parse_font_color(color: &str) -> Option<String> {
    let color = color.strip_prefix('#').unwrap_or(color);
    (color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| color.to_ascii_uppercase())
}

/// Creates a badge design in the event, or edits it if an ID is provided.
pub async fn save_design<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    design_id: Option<i32>,
    form: DesignForm,
) -> HelferResult<badge_design::Model> {
    let mut errors = Vec::new();
    check_name(&form.name, &mut errors);
    let font_color = parse_font_color(&form.font_color);
    if font_color.is_none() {
        errors.push(format!("invalid font color `{}`", form.font_color));
    }
    let bg_front = form.bg_front.filter(|p| !p.trim().is_empty());
    let bg_back = form.bg_back.filter(|p| !p.trim().is_empty());
    for path in bg_front.iter().chain(&bg_back) {
        if let Err(HelferError::Validation(e)) = check_media_path(path) {
            errors.extend(e);
        }
    }
    let (Some(font_color), true) = (font_color, errors.is_empty()) else {
        return Err(HelferError::Validation(errors));
    };

    let mut design: badge_design::ActiveModel = match design_id {
        Some(id) => must::have_badge_design(conn, event, id).await?.into(),
        None => badge_design::ActiveModel {
            event_id: Set(event.id),
            ..Default::default()
        },
    };
    design.name = Set(form.name);
    design.font_color = Set(font_color);
    design.bg_front = Set(bg_front);
    design.bg_back = Set(bg_back);
    Ok(design.save(conn).await?.try_into_model()?)
}

/// A default role and design.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Defaults {
    /// The ID of the default role.
    #[serde(default)]
    pub role: Option<i32>,
    /// The ID of the default design.
    #[serde(default)]
    pub design: Option<i32>,
}

/// The default role and design of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JobDefaults {
    /// The ID of the job.
    pub job_id: i32,
    /// The defaults of the job.
    #[serde(flatten)]
    pub defaults: Defaults,
}

/// The defaults of the badges of an event and of its jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DefaultsForm {
    /// The defaults of the whole event.
    #[serde(default)]
    pub event: Defaults,
    /// The defaults of some jobs. The jobs that are absent keep their defaults.
    #[serde(default)]
    pub jobs: Vec<JobDefaults>,
}

impl From<&badge_defaults::Model> for Defaults {
    fn from(value: &badge_defaults::Model) -> Self {
        Self {
            role: value.role_id,
            design: value.design_id,
        }
    }
}

/// Returns the defaults of the badges of the provided event and of its jobs.
pub async fn get_defaults<C: ConnectionTrait>(conn: &C, event_id: i32) -> HelferResult<DefaultsForm> {
    let rows = badge_defaults::Entity::find()
        .filter(badge_defaults::Column::EventId.eq(event_id))
        .order_by_asc(badge_defaults::Column::JobId)
        .all(conn)
        .await?;

    let mut out = DefaultsForm::default();
    for row in &rows {
        match row.job_id {
            None => out.event = row.into(),
            Some(job_id) => out.jobs.push(JobDefaults {
                job_id,
                defaults: row.into(),
            }),
        }
    }
    Ok(out)
}

async fn check_defaults<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    defaults: Defaults,
) -> HelferResult<()> {
    if let Some(role) = defaults.role {
        must::have_badge_role(conn, event, role).await?;
    }
    if let Some(design) = defaults.design {
        must::have_badge_design(conn, event, design).await?;
    }
    Ok(())
}

async fn save_defaults_row<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
    job_id: Option<i32>,
    defaults: Defaults,
) -> HelferResult<()> {
    let existing = badge_defaults::Entity::find()
        .filter(badge_defaults::Column::EventId.eq(event_id))
        .filter(match job_id {
            Some(id) => badge_defaults::Column::JobId.eq(id),
            None => badge_defaults::Column::JobId.is_null(),
        })
        .one(conn)
        .await?;

    let mut row: badge_defaults::ActiveModel = match existing {
        Some(row) => row.into(),
        None => badge_defaults::ActiveModel {
            event_id: Set(event_id),
            job_id: Set(job_id),
            ..Default::default()
        },
    };
    row.role_id = Set(defaults.role);
    row.design_id = Set(defaults.design);
    row.save(conn).await?;
    Ok(())
}

/// Saves the defaults of the badges of the provided event and of the submitted jobs.
///
/// The roles, designs and jobs must belong to the event.
pub async fn save_defaults<C: TransactionTrait + Sync>(
    conn: &C,
    event: &event::Model,
    form: DefaultsForm,
) -> HelferResult<DefaultsForm> {
    crate::assert_future_send(sync::transaction(conn, async |txn| {
        check_defaults(txn, event, form.event).await?;
        save_defaults_row(txn, event.id, None, form.event).await?;

        for job in &form.jobs {
            must::have_job(txn, event, job.job_id).await?;
            check_defaults(txn, event, job.defaults).await?;
            save_defaults_row(txn, event.id, Some(job.job_id), job.defaults).await?;
        }

        get_defaults(txn, event.id).await
    }))
    .await
}

/// The submitted overrides of the badge of a helper.
///
/// An empty field means that the value is resolved from the helper or from the defaults.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct BadgeForm {
    /// The first name printed instead of the prename of the helper.
    #[serde(default)]
    pub firstname: Option<String>,
    /// The surname printed instead of the one of the helper.
    #[serde(default)]
    pub surname: Option<String>,
    /// The job printed on the badge, among the jobs of the helper.
    #[serde(default)]
    pub primary_job: Option<i32>,
    /// The role of the badge, overriding the defaults.
    #[serde(default)]
    pub role: Option<i32>,
    /// The design of the badge, overriding the defaults.
    #[serde(default)]
    pub design: Option<i32>,
    /// The path to the photo, relative to the media root.
    #[serde(default)]
    pub photo: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

async fn check_photo(config: &BadgeConfig, photo: &str, errors: &mut Vec<String>) {
    if let Err(HelferError::Validation(e)) = check_media_path(photo) {
        errors.extend(e);
        return;
    }

    match tokio::fs::metadata(config.media_root.join(photo)).await {
        Ok(meta) if meta.len() > config.photo_max_size => errors.push(format!(
            "the photo is too big ({} kB, at most {} kB)",
            meta.len().div_ceil(1000),
            config.photo_max_size / 1000
        )),
        Ok(_) => (),
        Err(e) => errors.push(format!("cannot read the photo `{photo}`: {e}")),
    }
}

/// Saves the overrides of the badge of a helper of the event.
///
/// The primary job must be one of the jobs of the helper, and the role and design must
/// belong to the event. The photo must exist in the media root and must not be bigger
/// than the configured maximum size.
#[tracing::instrument(skip(conn, config, event, form), fields(event = %event.url_name))]
pub async fn save_badge<C: ConnectionTrait>(
    conn: &C,
    config: &BadgeConfig,
    event: &event::Model,
    helper_id: uuid::Uuid,
    form: BadgeForm,
) -> HelferResult<badge::Model> {
    must::have_badges(event)?;
    let helper = must::have_helper(conn, event, helper_id).await?;

    let mut errors = Vec::new();
    if let Some(job_id) = form.primary_job {
        if !get_jobs(conn, helper.id).await?.iter().any(|job| job.id == job_id) {
            errors.push(format!("the helper has no shift in the job {job_id}"));
        }
    }
    let photo = non_empty(form.photo);
    if let Some(photo) = &photo {
        check_photo(config, photo, &mut errors).await;
    }
    if !errors.is_empty() {
        return Err(HelferError::Validation(errors));
    }

    if let Some(role) = form.role {
        must::have_badge_role(conn, event, role).await?;
    }
    if let Some(design) = form.design {
        must::have_badge_design(conn, event, design).await?;
    }

    let existing = badge::Entity::find()
        .filter(badge::Column::HelperId.eq(helper.id))
        .one(conn)
        .await?;
    let mut badge: badge::ActiveModel = match existing {
        Some(badge) => badge,
        None => create_badge(conn, helper.id).await?,
    }
    .into();
    badge.firstname = Set(non_empty(form.firstname));
    badge.surname = Set(non_empty(form.surname));
    badge.primary_job_id = Set(form.primary_job);
    badge.role_id = Set(form.role);
    badge.design_id = Set(form.design);
    badge.photo = Set(photo);
    Ok(badge.update(conn).await?)
}
