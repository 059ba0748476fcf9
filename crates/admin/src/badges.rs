use std::path::PathBuf;

use helfer_lib::{
    Database,
    badges::{self, CheckIn, EventBadges, PdfLatex},
    event::get_jobs,
    must,
    utils::escape_filename,
};

#[derive(clap::Subcommand)]
pub enum BadgesCommand {
    /// Generates the PDF file of the badges of an event.
    Pdf(PdfCmd),
    /// Lists the helpers whose badge can't be fully resolved.
    Warnings(WarningsCmd),
    /// Marks a badge as printed, like a scan at the entrance.
    CheckIn(CheckInCmd),
}

#[derive(clap::Args)]
pub struct PdfCmd {
    /// The URL name of the event.
    event: String,

    /// Only generate the badges of this job.
    #[arg(long)]
    job: Option<i32>,

    /// Also generate the badges that were already printed.
    #[arg(long)]
    all: bool,

    /// The output file. Defaults to the name of the event or of the job.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct WarningsCmd {
    /// The URL name of the event.
    event: String,
}

#[derive(clap::Args)]
pub struct CheckInCmd {
    /// The URL name of the event.
    event: String,

    /// The scanned barcode.
    barcode: i32,
}

async fn pdf(db: &Database, cmd: PdfCmd) -> anyhow::Result<()> {
    let event = must::have_event(&db.sql_conn, &cmd.event).await?;

    let (jobs, name) = match cmd.job {
        Some(job_id) => {
            let job = must::have_job(&db.sql_conn, &event, job_id).await?;
            let name = job.name.clone();
            (vec![job], name)
        }
        None => (get_jobs(&db.sql_conn, event.id).await?, event.name.clone()),
    };

    let config = helfer_lib::env().badge_config();
    let typesetter = PdfLatex::new(config.pdflatex.clone());
    let content = match badges::generate_badges(
        &db.sql_conn,
        &config,
        typesetter,
        &event,
        &jobs,
        cmd.all,
    )
    .await
    {
        Ok(content) => content,
        Err(helfer_lib::error::HelferError::Typeset(e)) => {
            if let Some(output) = e.latex_output() {
                eprintln!("{output}");
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let output = cmd
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.pdf", escape_filename(&name))));
    tokio::fs::write(&output, content).await?;

    tracing::info!("Badges of {} written to {}", event.url_name, output.display());
    Ok(())
}

async fn warnings(db: &Database, cmd: WarningsCmd) -> anyhow::Result<()> {
    let event = must::have_event(&db.sql_conn, &cmd.event).await?;
    must::have_badges(&event)?;

    let ctx = EventBadges::load(&db.sql_conn, event.id).await?;
    if !ctx.creation_possible() {
        println!("The default role and design of the event are not set.");
    }

    let mut table = prettytable::Table::init(vec![prettytable::row!["Job", "Helper", "Warnings"]]);
    for job in get_jobs(&db.sql_conn, event.id).await? {
        for helper in badges::warnings_for_job(&db.sql_conn, &ctx, job.id).await? {
            let warnings = helper
                .warnings
                .iter()
                .map(|w| format!("{w:?}"))
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(prettytable::row![job.name, helper.name, warnings]);
        }
    }

    println!("{table}");
    Ok(())
}

async fn check_in(db: &Database, cmd: CheckInCmd) -> anyhow::Result<()> {
    let event = must::have_event(&db.sql_conn, &cmd.event).await?;

    match badges::register_badge(&db.sql_conn, &event, cmd.barcode).await? {
        CheckIn::Registered { name } => println!("Badge of {name} registered."),
        CheckIn::AlreadyPrinted { name } => {
            println!("Warning: the badge of {name} was already registered.")
        }
    }

    Ok(())
}

pub async fn badges(db: Database, cmd: BadgesCommand) -> anyhow::Result<()> {
    match cmd {
        BadgesCommand::Pdf(cmd) => pdf(&db, cmd).await,
        BadgesCommand::Warnings(cmd) => warnings(&db, cmd).await,
        BadgesCommand::CheckIn(cmd) => check_in(&db, cmd).await,
    }
}
