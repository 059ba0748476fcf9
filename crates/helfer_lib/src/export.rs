//! The export of the helpers of an event as a spreadsheet, with one sheet per job.

use std::collections::HashSet;

use entity::{event, helper, job, shift};
use rust_xlsxwriter::{Format, Workbook};

use crate::{
    error::HelferResult,
    job::{get_shift_helpers, get_shifts},
    shift::time,
};

/// The maximum length of a sheet name.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Removes the characters that are forbidden in a sheet name: `[ ] : * ? / \`.
pub fn clean_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect()
}

fn truncate(name: &str, len: usize) -> String {
    name.chars().take(len).collect()
}

/// A sheet name can't start or end with an apostrophe.
fn trim_name(name: &str) -> &str {
    name.trim_matches(|c: char| c == '\'' || c.is_whitespace())
}

/// Returns the name of the sheet of a job, unique among the `used` names.
///
/// The forbidden characters are removed, the surrounding apostrophes and spaces
/// are trimmed and the name is truncated. An empty name is replaced by `Job <id>`,
/// and a name that is already used gets a numbered suffix.
pub fn sheet_name(job: &job::Model, used: &mut HashSet<String>) -> String {
    let cleaned = clean_name(&job.name);
    let mut base = trim_name(&truncate(trim_name(&cleaned), MAX_SHEET_NAME_LEN)).to_owned();
    if base.is_empty() {
        base = format!("Job {}", job.id);
    }

    let mut name = base.clone();
    let mut n = 2;
    // The names of the sheets are case-insensitive.
    while !used.insert(name.to_lowercase()) {
        let suffix = format!(" ({n})");
        name = format!(
            "{}{suffix}",
            truncate(&base, MAX_SHEET_NAME_LEN - suffix.chars().count())
        );
        n += 1;
    }
    name
}

/// A column of a sheet.
///
/// The variants are in the order of the columns.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Prename,
    Surname,
    Email,
    Phone,
    Shirt,
    Vegetarian,
    FoodHandling,
    Comment,
}

impl Column {
    /// Returns the header of the column.
    pub fn header(self) -> &'static str {
        match self {
            Self::Prename => "Prename",
            Self::Surname => "Surname",
            Self::Email => "E-Mail",
            Self::Phone => "Mobile phone",
            Self::Shirt => "T-shirt",
            Self::Vegetarian => "Vegetarian",
            Self::FoodHandling => "Food handling",
            Self::Comment => "Comment",
        }
    }

    /// Returns the width of the column.
    pub fn width(self) -> f64 {
        match self {
            Self::Prename | Self::Surname | Self::Email => 30.,
            Self::Phone | Self::FoodHandling => 20.,
            Self::Shirt => 10.,
            Self::Vegetarian => 13.,
            Self::Comment => 50.,
        }
    }

    /// Returns the content of the column for the provided helper.
    pub fn value(self, helper: &helper::Model) -> String {
        match self {
            Self::Prename => helper.prename.clone(),
            Self::Surname => helper.surname.clone(),
            Self::Email => helper.email.clone(),
            Self::Phone => helper.phone.clone(),
            Self::Shirt => helper.shirt.label().to_owned(),
            Self::Vegetarian => if helper.vegetarian { "yes" } else { "no" }.to_owned(),
            Self::FoodHandling => helper.infection_instruction_short().to_owned(),
            Self::Comment => helper.comment.clone(),
        }
    }
}

/// Returns the columns of the sheet of a job.
///
/// The t-shirt and vegetarian columns are present if the event asks for them, the food
/// handling column if the job needs an instruction.
pub fn columns(event: &event::Model, job: &job::Model) -> Vec<Column> {
    let mut columns = vec![Column::Prename, Column::Surname, Column::Email, Column::Phone];
    if event.ask_shirt {
        columns.push(Column::Shirt);
    }
    if event.ask_vegetarian {
        columns.push(Column::Vegetarian);
    }
    if job.infection_instruction {
        columns.push(Column::FoodHandling);
    }
    columns.push(Column::Comment);
    columns
}

/// The data of a job to export.
#[derive(Debug, Clone)]
pub struct JobExport {
    /// The job itself.
    pub job: job::Model,
    /// The shifts of the job sorted by their begin, with their helpers.
    pub shifts: Vec<(shift::Model, Vec<helper::Model>)>,
}

/// Loads the data of the provided job to export.
pub async fn load_job<C: sea_orm::ConnectionTrait>(
    conn: &C,
    job: job::Model,
) -> HelferResult<JobExport> {
    let mut shifts = Vec::new();
    for shift in get_shifts(conn, job.id).await? {
        let helpers = get_shift_helpers(conn, &shift).await?;
        shifts.push((shift, helpers));
    }
    Ok(JobExport { job, shifts })
}

/// A row of a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// The banner of a shift, merged over all the columns.
    Banner(String),
    /// The data of a helper.
    Helper(Vec<String>),
}

/// Returns the rows of the sheet of a job, after the header.
pub fn rows(columns: &[Column], export: &JobExport) -> Vec<Row> {
    let mut rows = Vec::new();
    for (shift, helpers) in &export.shifts {
        rows.push(Row::Banner(time(shift)));
        for helper in helpers {
            rows.push(Row::Helper(
                columns.iter().map(|column| column.value(helper)).collect(),
            ));
        }
    }
    rows
}

/// Writes the spreadsheet of the provided jobs, and returns its content.
pub fn xlsx(event: &event::Model, jobs: &[JobExport]) -> HelferResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let mut used = HashSet::new();

    for export in jobs {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(&export.job, &mut used))?;

        let columns = columns(event, &export.job);
        let last_column = (columns.len() - 1) as u16;

        for (i, column) in columns.iter().enumerate() {
            worksheet.write_string_with_format(0, i as u16, column.header(), &bold)?;
            worksheet.set_column_width(i as u16, column.width())?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        for (row, content) in (1u32..).zip(rows(&columns, export)) {
            match content {
                Row::Banner(time) => {
                    worksheet.merge_range(row, 0, row, last_column, &time, &bold)?;
                }
                Row::Helper(values) => {
                    for (i, value) in values.iter().enumerate() {
                        worksheet.write_string(row, i as u16, value)?;
                    }
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Exports the helpers of the provided jobs of the event, and returns the spreadsheet.
#[tracing::instrument(skip_all, fields(event = %event.url_name, jobs = jobs.len()))]
pub async fn export_jobs<C: sea_orm::ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    jobs: Vec<job::Model>,
) -> HelferResult<Vec<u8>> {
    let mut exports = Vec::with_capacity(jobs.len());
    for job in jobs {
        exports.push(load_job(conn, job).await?);
    }
    xlsx(event, &exports)
}
