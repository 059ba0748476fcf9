use entity::{badge, helper, helper_shifts, shift};
use helfer_lib::{error::HelferError, helper::get_event, job, shift as shifts};
use sea_orm::{ColumnTrait as _, EntityTrait as _, PaginatorTrait as _, QueryFilter as _};
use test_env::fixtures::{add_helper, at, create_event, create_job, create_shift};

#[tokio::test]
async fn delete_shift_removes_orphan_helpers() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let event = create_event(conn, "fest", |_| ()).await?;
        let bar = create_job(conn, event.id, "Bar", false).await?;
        let early = create_shift(conn, bar.id, at(3, 8), 2).await?;
        let late = create_shift(conn, bar.id, at(3, 12), 2).await?;

        let only_early = add_helper(conn, "Ada", &[early.id]).await?;
        let both = add_helper(conn, "Grace", &[early.id, late.id]).await?;

        let deleted = shifts::delete_shift(conn, early.id).await?;
        assert_eq!(deleted.deleted_helpers, vec![only_early.id]);

        assert!(shift::Entity::find_by_id(early.id).one(conn).await?.is_none());
        assert!(helper::Entity::find_by_id(only_early.id).one(conn).await?.is_none());
        assert_eq!(
            badge::Entity::find()
                .filter(badge::Column::HelperId.eq(only_early.id))
                .count(conn)
                .await?,
            0
        );

        assert!(helper::Entity::find_by_id(both.id).one(conn).await?.is_some());
        let links = helper_shifts::Entity::find()
            .filter(helper_shifts::Column::HelperId.eq(both.id))
            .all(conn)
            .await?;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].shift_id, late.id);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn fill_ratio_counts_helpers() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let event = create_event(conn, "fest", |_| ()).await?;
        let bar = create_job(conn, event.id, "Bar", false).await?;
        let shift = create_shift(conn, bar.id, at(3, 8), 3).await?;
        let empty = create_shift(conn, bar.id, at(3, 10), 0).await?;

        add_helper(conn, "Ada", &[shift.id]).await?;
        add_helper(conn, "Grace", &[shift.id]).await?;

        let ratio = shifts::fill_ratio(conn, &shift).await?;
        assert_eq!(ratio.num_helpers, 2);
        assert!(!ratio.is_full);
        assert_eq!(ratio.helpers_percent, 67);

        let ratio = shifts::fill_ratio(conn, &empty).await?;
        assert!(ratio.is_full);
        assert_eq!(ratio.helpers_percent, 0);

        let counts = shifts::count_helpers_by_shift(conn, [shift.id, empty.id]).await?;
        assert_eq!(counts.get(&shift.id).copied(), Some(2));
        assert_eq!(counts.get(&empty.id).copied().unwrap_or_default(), 0);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn invalid_shift_is_rejected() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let event = create_event(conn, "fest", |_| ()).await?;
        let bar = create_job(conn, event.id, "Bar", false).await?;

        match shifts::create_shift(conn, bar.id, at(3, 10), at(3, 8), -1).await {
            Err(HelferError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("Unexpected result: {other:?}"),
        }

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn shifts_and_helpers_of_a_job() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let event = create_event(conn, "fest", |_| ()).await?;
        let bar = create_job(conn, event.id, "Bar", false).await?;
        let day2 = create_shift(conn, bar.id, at(4, 8), 2).await?;
        let day1_late = create_shift(conn, bar.id, at(3, 18), 2).await?;
        let day1 = create_shift(conn, bar.id, at(3, 8), 2).await?;

        let ada = add_helper(conn, "Ada", &[day2.id, day1.id]).await?;
        let grace = add_helper(conn, "Grace", &[day1_late.id]).await?;

        let by_day = job::get_shifts_by_day(conn, bar.id).await?;
        let ids = by_day
            .values()
            .map(|shifts| shifts.iter().map(|s| s.id).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![vec![day1.id, day1_late.id], vec![day2.id]]);

        let helpers = job::get_helpers(conn, bar.id).await?;
        assert_eq!(
            helpers.iter().map(|h| h.id).collect::<Vec<_>>(),
            vec![ada.id, grace.id]
        );

        let event_of_ada = get_event(conn, ada.id).await?;
        assert_eq!(event_of_ada.map(|e| e.id), Some(event.id));

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn helper_without_shift_has_no_event() -> anyhow::Result<()> {
    test_env::wrap(async |db| {
        let conn = &db.sql_conn;
        let lonely = add_helper(conn, "Ada", &[]).await?;
        assert!(get_event(conn, lonely.id).await?.is_none());
        anyhow::Ok(())
    })
    .await
}
