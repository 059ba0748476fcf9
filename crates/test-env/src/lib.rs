use std::panic;

use anyhow::Context as _;
use futures::FutureExt as _;
use helfer_lib::Database;
use migration::MigratorTrait as _;
use tracing_subscriber::fmt::TestWriter;

pub mod fixtures;

pub trait IntoResult {
    type Out;

    fn into_result(self) -> anyhow::Result<Self::Out>;
}

impl IntoResult for () {
    type Out = ();

    fn into_result(self) -> anyhow::Result<Self::Out> {
        Ok(())
    }
}

impl<T, E> IntoResult for Result<T, E>
where
    anyhow::Error: From<E>,
{
    type Out = T;

    fn into_result(self) -> anyhow::Result<Self::Out> {
        self.map_err(From::from)
    }
}

pub fn init_env() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Err(err) if !err.not_found() => return Err(err).context("cannot retrieve .env files"),
        _ => (),
    }

    let _ = tracing_subscriber::fmt()
        .with_writer(TestWriter::new())
        .try_init();

    Ok(())
}

/// Runs the provided test with a fresh in-memory database, with all the migrations applied.
///
/// The database is dropped with its connection at the end of the test.
pub async fn wrap<F, R>(test: F) -> anyhow::Result<<R as IntoResult>::Out>
where
    F: AsyncFnOnce(Database) -> R,
    R: IntoResult,
{
    init_env()?;

    let db = Database::from_db_url("sqlite::memory:".to_owned()).await?;
    migration::Migrator::up(&db.sql_conn, None).await?;

    let r = panic::AssertUnwindSafe(test(db)).catch_unwind().await;

    match r {
        Ok(r) => r.into_result(),
        Err(e) => {
            tracing::info!("Test failed");
            panic::resume_unwind(e)
        }
    }
}
