use clap::Parser;
use helfer_lib::{Database, DbEnv, LibEnv};
use migration::MigratorTrait as _;
use mkenv::prelude::*;

use self::{badges::BadgesCommand, event::EventCommand};

mod badges;
mod event;

#[derive(clap::Parser)]
enum Command {
    #[clap(subcommand)]
    Event(EventCommand),
    #[clap(subcommand)]
    Badges(BadgesCommand),
}

mkenv::make_config! {
    struct Env {
        db_env: { DbEnv },
        lib_env: { LibEnv },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Err(err) if !err.not_found() => return Err(err.into()),
        _ => (),
    }
    tracing_subscriber::fmt()
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("unable to init tracing_subscriber: {e}"))?;
    let env = Env::define();
    env.init();
    helfer_lib::init_env(env.lib_env);

    let db = Database::from_db_url(env.db_env.db_url.get()).await?;
    migration::Migrator::up(&db.sql_conn, None).await?;

    let cmd = Command::parse();

    match cmd {
        Command::Event(cmd) => event::event(db, cmd).await,
        Command::Badges(cmd) => badges::badges(db, cmd).await,
    }
}
