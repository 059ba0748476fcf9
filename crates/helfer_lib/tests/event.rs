use helfer_lib::{error::HelferError, event, must};
use sea_orm::ActiveValue::Set;
use test_env::fixtures::{add_admin, add_helper, at, create_event, create_job, create_shift, create_user};

#[tokio::test]
async fn admins_of_an_event() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let fest = create_event(conn, "fest", |_| ()).await?;
        let other = create_event(conn, "other", |_| ()).await?;

        let root = create_user(conn, "root", true).await?;
        let orga = create_user(conn, "orga", false).await?;
        create_user(conn, "nobody", false).await?;
        add_admin(conn, fest.id, orga.id).await?;

        assert!(event::is_admin(conn, fest.id, &root.username).await?);
        assert!(event::is_admin(conn, other.id, &root.username).await?);
        assert!(event::is_admin(conn, fest.id, "orga").await?);
        assert!(!event::is_admin(conn, other.id, "orga").await?);
        assert!(!event::is_admin(conn, fest.id, "nobody").await?);
        assert!(!event::is_admin(conn, fest.id, "stranger").await?);

        let found = must::have_event_admin(conn, "fest", "orga").await?;
        assert_eq!(found.id, fest.id);

        match must::have_event_admin(conn, "other", "orga").await {
            Err(HelferError::PermissionDenied(user, event)) => {
                assert_eq!(user, "orga");
                assert_eq!(event, "other");
            }
            res => panic!("Unexpected result: {res:?}"),
        }
        assert!(matches!(
            must::have_event_admin(conn, "missing", "root").await,
            Err(HelferError::EventNotFound(_))
        ));

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn job_of_another_event_is_not_found() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let fest = create_event(conn, "fest", |_| ()).await?;
        let other = create_event(conn, "other", |_| ()).await?;
        let stage = create_job(conn, other.id, "Stage", false).await?;
        let shift = create_shift(conn, stage.id, at(3, 8), 2).await?;

        assert!(matches!(
            must::have_job(conn, &fest, stage.id).await,
            Err(HelferError::JobNotFound(id, _)) if id == stage.id
        ));
        assert!(matches!(
            must::have_shift(conn, &fest, shift.id).await,
            Err(HelferError::ShiftNotFound(id, _)) if id == shift.id
        ));
        assert_eq!(must::have_shift(conn, &other, shift.id).await?.id, shift.id);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn public_view_hides_numbers() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let fest = create_event(conn, "fest", |_| ()).await?;
        let bar = create_job(conn, fest.id, "Bar", false).await?;
        let second_day = create_shift(conn, bar.id, at(4, 8), 2).await?;
        let first_day = create_shift(conn, bar.id, at(3, 8), 1).await?;
        add_helper(conn, "Ada", &[first_day.id]).await?;

        let view = event::public_view(conn, fest).await?;
        assert_eq!(view.jobs.len(), 1);
        let days = &view.jobs[0].days;
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, "03.08.2024");
        assert_eq!(days[0].shifts[0].id, first_day.id);
        assert_eq!(days[0].shifts[0].time, "08:00 - 10:00");
        assert!(days[0].shifts[0].is_full);
        assert!(days[0].shifts[0].numbers.is_none());
        assert_eq!(days[1].shifts[0].id, second_day.id);
        assert!(!days[1].shifts[0].is_full);

        let json = serde_json::to_value(&view)?;
        assert!(json["jobs"][0]["days"][0]["shifts"][0].get("num_helpers").is_none());

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn public_view_shows_numbers() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let fest = create_event(conn, "fest", |e| e.show_public_numbers = Set(true)).await?;
        let bar = create_job(conn, fest.id, "Bar", false).await?;
        let shift = create_shift(conn, bar.id, at(3, 8), 3).await?;
        add_helper(conn, "Ada", &[shift.id]).await?;

        let view = event::public_view(conn, fest).await?;
        let numbers = view.jobs[0].days[0].shifts[0]
            .numbers
            .as_ref()
            .unwrap_or_else(|| panic!("The numbers should be shown"));
        assert_eq!(numbers.num_helpers, 1);
        assert_eq!(numbers.number, 3);
        assert_eq!(numbers.helpers_percent, 33);

        let json = serde_json::to_value(&view)?;
        assert_eq!(json["url_name"], "fest");
        assert_eq!(json["jobs"][0]["days"][0]["shifts"][0]["num_helpers"], 1);

        anyhow::Ok(())
    })
    .await
}
