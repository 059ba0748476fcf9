use std::path::PathBuf;

use entity::{event, event_admins, users};
use helfer_lib::{
    Database, event as helfer_event, export, job, must,
    shift::{self, FillRatio},
    utils::escape_filename,
};
use sea_orm::{
    ActiveModelTrait as _, ActiveValue::Set, ColumnTrait as _, EntityTrait as _,
    QueryFilter as _, QueryOrder as _,
};

#[derive(clap::Subcommand)]
pub enum EventCommand {
    /// Lists the events.
    List,
    /// Shows the shifts of an event grouped by day, with their filling state.
    Shifts(EventArg),
    /// Exports the helpers of an event to a spreadsheet.
    Export(ExportCmd),
    /// Makes a user an admin of an event.
    AddAdmin(AddAdminCmd),
}

#[derive(clap::Args)]
pub struct EventArg {
    /// The URL name of the event.
    event: String,
}

#[derive(clap::Args)]
pub struct ExportCmd {
    /// The URL name of the event.
    event: String,

    /// Only export this job.
    #[arg(long)]
    job: Option<i32>,

    /// The output file. Defaults to the name of the event or of the job.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct AddAdminCmd {
    /// The URL name of the event.
    event: String,

    /// The username, created if it doesn't exist yet.
    username: String,
}

async fn list(db: &Database) -> anyhow::Result<()> {
    let events = event::Entity::find()
        .order_by_asc(event::Column::UrlName)
        .all(&db.sql_conn)
        .await?;

    let mut table = prettytable::Table::init(vec![prettytable::row![
        "URL name", "Name", "Active", "Badges", "Jobs"
    ]]);

    for event in events {
        let jobs = helfer_event::get_jobs(&db.sql_conn, event.id).await?;
        table.add_row(prettytable::row![
            event.url_name,
            event.name,
            event.active,
            event.badges,
            jobs.len()
        ]);
    }

    println!("{table}");
    Ok(())
}

async fn shifts(db: &Database, cmd: EventArg) -> anyhow::Result<()> {
    let event = must::have_event(&db.sql_conn, &cmd.event).await?;

    for job in helfer_event::get_jobs(&db.sql_conn, event.id).await? {
        println!("{}", job.name);

        let days = job::get_shifts_by_day(&db.sql_conn, job.id).await?;
        let counts = shift::count_helpers_by_shift(
            &db.sql_conn,
            days.values().flatten().map(|s| s.id),
        )
        .await?;

        let mut table = prettytable::Table::init(vec![prettytable::row![
            "Day", "Time", "Helpers", "Filled"
        ]]);
        for (day, shifts) in days {
            for s in shifts {
                let ratio = FillRatio::new(counts.get(&s.id).copied().unwrap_or_default(), s.number);
                table.add_row(prettytable::row![
                    day.format("%d.%m.%Y"),
                    shift::time_hours(&s),
                    format!("{}/{}", ratio.num_helpers, ratio.number),
                    if ratio.is_full {
                        "full".to_owned()
                    } else {
                        format!("{}%", ratio.helpers_percent)
                    }
                ]);
            }
        }
        println!("{table}");
    }

    Ok(())
}

async fn export(db: &Database, cmd: ExportCmd) -> anyhow::Result<()> {
    let event = must::have_event(&db.sql_conn, &cmd.event).await?;

    let (jobs, name) = match cmd.job {
        Some(job_id) => {
            let job = must::have_job(&db.sql_conn, &event, job_id).await?;
            let name = job.name.clone();
            (vec![job], name)
        }
        None => (
            helfer_event::get_jobs(&db.sql_conn, event.id).await?,
            event.name.clone(),
        ),
    };

    let content = export::export_jobs(&db.sql_conn, &event, jobs).await?;
    let output = cmd
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.xlsx", escape_filename(&name))));
    tokio::fs::write(&output, content).await?;

    tracing::info!("Exported {} to {}", event.url_name, output.display());
    Ok(())
}

async fn add_admin(db: &Database, cmd: AddAdminCmd) -> anyhow::Result<()> {
    let event = must::have_event(&db.sql_conn, &cmd.event).await?;

    let user = match users::Entity::find()
        .filter(users::Column::Username.eq(cmd.username.as_str()))
        .one(&db.sql_conn)
        .await?
    {
        Some(user) => user,
        None => {
            users::ActiveModel {
                username: Set(cmd.username.clone()),
                is_superuser: Set(false),
                ..Default::default()
            }
            .insert(&db.sql_conn)
            .await?
        }
    };

    if helfer_event::is_admin(&db.sql_conn, event.id, &user.username).await? {
        tracing::info!("{} is already an admin of {}", user.username, event.url_name);
        return Ok(());
    }

    event_admins::Entity::insert(event_admins::ActiveModel {
        event_id: Set(event.id),
        user_id: Set(user.id),
    })
    .exec_without_returning(&db.sql_conn)
    .await?;

    tracing::info!("{} is now an admin of {}", user.username, event.url_name);
    Ok(())
}

pub async fn event(db: Database, cmd: EventCommand) -> anyhow::Result<()> {
    match cmd {
        EventCommand::List => list(&db).await,
        EventCommand::Shifts(cmd) => shifts(&db, cmd).await,
        EventCommand::Export(cmd) => export(&db, cmd).await,
        EventCommand::AddAdmin(cmd) => add_admin(&db, cmd).await,
    }
}
