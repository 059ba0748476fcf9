use std::{io, path::Path, time::Duration};

use entity::{badge, event, helper};
use helfer_lib::{
    badges::{
        BadgeConfig, BadgeForm, BadgeWarning, CheckIn, Defaults, DefaultsForm, DesignForm, EventBadges,
        JobDefaults, PermissionForm, RoleForm, SettingsForm, TypesetOutput, Typesetter,
        generate_badges, get_roles, overview, register_badge, save_defaults, save_design, save_permission,
        save_badge, save_role, save_settings, warnings_for_job,
    },
    error::HelferError,
};
use sea_orm::{
    ActiveModelTrait as _, ActiveValue::Set, ColumnTrait as _, ConnectionTrait, EntityTrait as _,
    QueryFilter as _,
};
use test_env::fixtures::{add_helper, at, create_event, create_job, create_shift};

/// Writes the data file as the PDF file, to check what would be printed.
struct DataEngine;

impl Typesetter for DataEngine {
    async fn typeset(&self, workdir: &Path, document: &str) -> io::Result<TypesetOutput> {
        let data = tokio::fs::read(workdir.join("badgedata.tex")).await?;
        tokio::fs::write(workdir.join(document.replace(".tex", ".pdf")), data).await?;
        Ok(TypesetOutput {
            success: true,
            status: "exit status: 0".to_owned(),
            log: String::new(),
        })
    }
}

fn config() -> BadgeConfig {
    BadgeConfig {
        media_root: std::env::temp_dir(),
        pdflatex: "pdflatex".into(),
        default_template: concat!(env!("CARGO_MANIFEST_DIR"), "/latex/badge.tex").into(),
        debug_file: None,
        language: "en".to_owned(),
        timeout: Duration::from_secs(10),
        rm_delay: Duration::ZERO,
        photo_max_size: 1_000_000,
    }
}

async fn badges_event<C: ConnectionTrait>(conn: &C, url_name: &str) -> anyhow::Result<event::Model> {
    create_event(conn, url_name, |e| e.badges = Set(true)).await
}

async fn badge_of<C: ConnectionTrait>(conn: &C, helper: &helper::Model) -> anyhow::Result<badge::Model> {
    Ok(badge::Entity::find()
        .filter(badge::Column::HelperId.eq(helper.id))
        .one(conn)
        .await?
        .unwrap_or_else(|| panic!("Helper {} should have a badge", helper.prename)))
}

fn role(name: &str, permissions: Vec<i32>) -> RoleForm {
    RoleForm {
        name: name.to_owned(),
        latex_name: name.to_lowercase(),
        permissions,
    }
}

fn design(name: &str) -> DesignForm {
    DesignForm {
        name: name.to_owned(),
        font_color: "#ff0000".to_owned(),
        bg_front: None,
        bg_back: None,
    }
}

#[tokio::test]
async fn defaults_resolution_order() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let fest = badges_event(conn, "fest").await?;
        let bar = create_job(conn, fest.id, "Bar", false).await?;
        let stage = create_job(conn, fest.id, "Stage", false).await?;
        let bar_shift = create_shift(conn, bar.id, at(3, 8), 5).await?;
        let stage_shift = create_shift(conn, stage.id, at(3, 8), 5).await?;

        let backstage = save_permission(
            conn,
            &fest,
            None,
            PermissionForm {
                name: "Backstage".to_owned(),
                latex_name: "backstage".to_owned(),
            },
        )
        .await?;
        let helper_role = save_role(conn, &fest, None, role("Helper", vec![])).await?;
        let crew_role = save_role(conn, &fest, None, role("Crew", vec![backstage.id])).await?;
        let plain = save_design(conn, &fest, None, design("Plain")).await?;
        assert_eq!(plain.font_color, "FF0000");

        let saved = save_defaults(
            conn,
            &fest,
            DefaultsForm {
                event: Defaults {
                    role: Some(helper_role.role.id),
                    design: Some(plain.id),
                },
                jobs: vec![JobDefaults {
                    job_id: stage.id,
                    defaults: Defaults {
                        role: Some(crew_role.role.id),
                        design: None,
                    },
                }],
            },
        )
        .await?;
        assert_eq!(saved.jobs.len(), 1);

        let barkeeper = add_helper(conn, "Ada", &[bar_shift.id]).await?;
        let roadie = add_helper(conn, "Grace", &[stage_shift.id]).await?;
        let both = add_helper(conn, "Linus", &[bar_shift.id, stage_shift.id]).await?;

        let ctx = EventBadges::load(conn, fest.id).await?;
        assert!(ctx.creation_possible());

        let resolved = ctx.resolve(&barkeeper, &badge_of(conn, &barkeeper).await?);
        assert_eq!(resolved.job.map(|j| j.id), Some(bar.id));
        assert_eq!(resolved.role.map(|r| r.name).as_deref(), Some("Helper"));
        assert!(resolved.permissions.is_empty());

        let resolved = ctx.resolve(&roadie, &badge_of(conn, &roadie).await?);
        assert_eq!(resolved.role.map(|r| r.name).as_deref(), Some("Crew"));
        assert_eq!(resolved.design.map(|d| d.id), Some(plain.id));
        assert_eq!(
            resolved.permissions.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![backstage.id]
        );
        assert_eq!(resolved.barcode, None);

        // Several jobs without a primary one: only the event defaults apply.
        let both_badge = badge_of(conn, &both).await?;
        let resolved = ctx.resolve(&both, &both_badge);
        assert!(resolved.job.is_none());
        assert_eq!(resolved.role.map(|r| r.name).as_deref(), Some("Helper"));

        let warnings = warnings_for_job(conn, &ctx, bar.id).await?;
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].helper_id, both.id);
        assert_eq!(warnings[0].warnings, vec![BadgeWarning::AmbiguousJob]);

        // The primary job and the overrides of the badge win.
        let mut edited: badge::ActiveModel = both_badge.into();
        edited.primary_job_id = Set(Some(stage.id));
        edited.role_id = Set(Some(helper_role.role.id));
        let both_badge = edited.update(conn).await?;
        let ctx = EventBadges::load(conn, fest.id).await?;
        let resolved = ctx.resolve(&both, &both_badge);
        assert_eq!(resolved.job.map(|j| j.id), Some(stage.id));
        assert_eq!(resolved.role.map(|r| r.name).as_deref(), Some("Helper"));

        let overview = overview(conn, &fest).await?;
        assert!(overview.possible);
        assert!(overview.jobs.iter().all(|job| job.num_warnings == 0));

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn role_permissions_are_replaced() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let fest = badges_event(conn, "fest").await?;
        let permission = |name: &str| PermissionForm {
            name: name.to_owned(),
            latex_name: name.to_lowercase(),
        };
        let backstage = save_permission(conn, &fest, None, permission("Backstage")).await?;
        let bar = save_permission(conn, &fest, None, permission("Bar")).await?;

        let crew = save_role(conn, &fest, None, role("Crew", vec![backstage.id, bar.id, bar.id])).await?;
        assert_eq!(crew.permissions, vec![backstage.id, bar.id]);
        save_role(conn, &fest, None, role("Helper", vec![])).await?;

        let roles = get_roles(conn, fest.id).await?;
        assert_eq!(roles.len(), 2);
        let mut granted = roles[0].permissions.clone();
        granted.sort_unstable();
        assert_eq!(granted, vec![backstage.id, bar.id]);
        assert!(roles[1].permissions.is_empty());

        save_role(conn, &fest, Some(crew.role.id), role("Crew", vec![bar.id])).await?;
        let roles = get_roles(conn, fest.id).await?;
        assert_eq!(roles[0].permissions, vec![bar.id]);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn defaults_of_another_event_are_rejected() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let fest = badges_event(conn, "fest").await?;
        let other = badges_event(conn, "other").await?;
        let foreign_role = save_role(conn, &other, None, role("Crew", vec![])).await?;

        let res = save_defaults(
            conn,
            &fest,
            DefaultsForm {
                event: Defaults {
                    role: Some(foreign_role.role.id),
                    design: None,
                },
                jobs: Vec::new(),
            },
        )
        .await;
        assert!(matches!(res, Err(HelferError::BadgeRoleNotFound(..))));

        let res = save_role(conn, &fest, None, role("Bad name!", vec![])).await;
        assert!(matches!(res, Err(HelferError::Validation(_))));

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn check_in_by_barcode() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let fest = badges_event(conn, "fest").await?;
        let other = badges_event(conn, "other").await?;
        let bar = create_job(conn, fest.id, "Bar", false).await?;
        let stage = create_job(conn, other.id, "Stage", false).await?;
        let ada = add_helper(conn, "Ada", &[create_shift(conn, bar.id, at(3, 8), 2).await?.id]).await?;
        let grace =
            add_helper(conn, "Grace", &[create_shift(conn, stage.id, at(3, 8), 2).await?.id])
                .await?;
        let barcode = badge_of(conn, &ada).await?.barcode;

        assert!(matches!(
            register_badge(conn, &fest, barcode).await,
            Err(HelferError::BarcodesNotActive(_))
        ));

        save_settings(
            conn,
            fest.id,
            SettingsForm {
                latex_template: None,
                barcodes: true,
            },
        )
        .await?;

        assert_eq!(
            register_badge(conn, &fest, barcode).await?,
            CheckIn::Registered {
                name: "Ada Doe".to_owned()
            }
        );
        assert!(badge_of(conn, &ada).await?.printed);
        assert_eq!(
            register_badge(conn, &fest, barcode).await?,
            CheckIn::AlreadyPrinted {
                name: "Ada Doe".to_owned()
            }
        );

        let foreign_barcode = badge_of(conn, &grace).await?.barcode;
        assert!(matches!(
            register_badge(conn, &fest, foreign_barcode).await,
            Err(HelferError::BadgeNotFound(..))
        ));
        assert!(matches!(
            register_badge(conn, &fest, 1).await,
            Err(HelferError::BadgeNotFound(1, _))
        ));

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn check_in_needs_badges() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let fest = create_event(conn, "fest", |_| ()).await?;
        assert!(matches!(
            register_badge(conn, &fest, 12345678).await,
            Err(HelferError::BadgesNotActive(_))
        ));
        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn generate_skips_printed_and_duplicates() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let config = config();
        let fest = badges_event(conn, "fest").await?;
        let bar = create_job(conn, fest.id, "Bar", false).await?;
        let stage = create_job(conn, fest.id, "Stage", false).await?;
        let bar_shift = create_shift(conn, bar.id, at(3, 8), 5).await?;
        let stage_shift = create_shift(conn, stage.id, at(3, 8), 5).await?;

        let ada = add_helper(conn, "Ada", &[bar_shift.id]).await?;
        add_helper(conn, "Grace", &[bar_shift.id, stage_shift.id]).await?;
        add_helper(conn, "Linus", &[stage_shift.id]).await?;

        let jobs = [bar.clone(), stage.clone()];
        assert!(matches!(
            generate_badges(conn, &config, DataEngine, &fest, &jobs, false).await,
            Err(HelferError::BadgesNotConfigured(_))
        ));

        let role = save_role(conn, &fest, None, role("Helper", vec![])).await?;
        let design = save_design(conn, &fest, None, design("Plain")).await?;
        save_defaults(
            conn,
            &fest,
            DefaultsForm {
                event: Defaults {
                    role: Some(role.role.id),
                    design: Some(design.id),
                },
                jobs: Vec::new(),
            },
        )
        .await?;
        save_settings(
            conn,
            fest.id,
            SettingsForm {
                latex_template: None,
                barcodes: true,
            },
        )
        .await?;

        let ada_barcode = badge_of(conn, &ada).await?.barcode;
        register_badge(conn, &fest, ada_barcode).await?;

        let data = String::from_utf8(
            generate_badges(conn, &config, DataEngine, &fest, &jobs, false).await?,
        )?;
        assert!(!data.contains("{Ada}"));
        assert_eq!(data.matches(r"\badgeset{firstname}{Grace}").count(), 1);
        assert!(data.contains(r"\badgeset{firstname}{Linus}"));
        assert!(data.contains(r"\badgeset{fontcolor}{FF0000}"));
        assert!(data.contains(r"\badgeset{barcode}{"));

        let data = String::from_utf8(
            generate_badges(conn, &config, DataEngine, &fest, &[bar], true).await?,
        )?;
        assert!(data.contains(r"\badgeset{firstname}{Ada}"));
        assert!(data.contains(r"\badgeset{firstname}{Grace}"));
        assert!(!data.contains("{Linus}"));

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn badge_overrides() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let media = tempfile::tempdir()?;
        std::fs::write(media.path().join("small.jpg"), [0u8; 10])?;
        std::fs::write(media.path().join("big.jpg"), [0u8; 2000])?;
        let config = BadgeConfig {
            media_root: media.path().to_owned(),
            photo_max_size: 1000,
            ..config()
        };

        let fest = badges_event(conn, "fest").await?;
        let other = badges_event(conn, "other").await?;
        let bar = create_job(conn, fest.id, "Bar", false).await?;
        let stage = create_job(conn, fest.id, "Stage", false).await?;
        let ada = add_helper(conn, "Ada", &[create_shift(conn, bar.id, at(3, 8), 2).await?.id]).await?;
        let crew = save_role(conn, &fest, None, role("Crew", vec![])).await?;

        let badge = save_badge(
            conn,
            &config,
            &fest,
            ada.id,
            BadgeForm {
                firstname: Some(" Countess ".to_owned()),
                surname: Some(String::new()),
                primary_job: Some(bar.id),
                role: Some(crew.role.id),
                photo: Some("small.jpg".to_owned()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(badge.firstname.as_deref(), Some("Countess"));
        assert_eq!(badge.surname, None);
        assert_eq!(badge.primary_job_id, Some(bar.id));
        assert_eq!(badge.role_id, Some(crew.role.id));
        assert_eq!(badge.photo.as_deref(), Some("small.jpg"));

        let res = save_badge(
            conn,
            &config,
            &fest,
            ada.id,
            BadgeForm {
                primary_job: Some(stage.id),
                photo: Some("big.jpg".to_owned()),
                ..Default::default()
            },
        )
        .await;
        match res {
            Err(HelferError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("Unexpected result: {other:?}"),
        }

        assert!(matches!(
            save_badge(conn, &config, &other, ada.id, BadgeForm::default()).await,
            Err(HelferError::HelperNotFound(..))
        ));

        anyhow::Ok(())
    })
    .await
}
