//! The helper registration API program.
//!
//! The program also includes a [library](helfer_api_lib). Overall, it uses the [`helfer_lib`]
//! crate as a main dependency.

use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use helfer_api_lib::{configure, env, init_env};
use helfer_lib::{
    Database,
    mail::{LogMailer, Mailer},
};
use migration::MigratorTrait;
use mkenv::prelude::*;
use tracing::level_filters::LevelFilter;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// The main entry point.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The .env file is optional, the variables may come from the environment.
    let _ = dotenvy::dotenv();
    init_env()?;

    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let db = Database::from_db_url(env().db_env.db_url.get())
        .await
        .context("Cannot connect to the database")?;

    migration::Migrator::up(&db.sql_conn, None).await?;

    let badges = helfer_lib::env().badge_config();
    tracing::info!(
        "Using pdflatex at {}, media files in {}",
        badges.pdflatex.display(),
        badges.media_root.display()
    );

    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::<configure::CustomRootSpanBuilder>::new())
            .configure(|cfg| {
                configure::configure(cfg, db.clone(), badges.clone(), mailer.clone())
            })
    })
    .bind(("0.0.0.0", env().port.get()))
    .context("Cannot bind 0.0.0.0 address")?
    .run()
    .await
    .context("Cannot create actix-web server")?;

    Ok(())
}
