//! The generation of the PDF file of the badges.
//!
//! A [`BadgeCreator`] collects the badges, then writes them in a temporary directory next to
//! a copy of the template and of the images, and runs a [`Typesetter`] on it. The temporary
//! directory is removed by [`BadgeCreator::finish`], or when the creator is dropped.

use std::{
    collections::HashSet,
    ffi::OsStr,
    future::Future,
    io,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use entity::{badge_settings, event, job};
use tempfile::TempDir;
use tokio::process::Command;

use super::{
    BadgeConfig, BadgeEntry, DATA_FILE_NAME, EventBadges, ResolvedBadge, helpers_with_badges,
    render_data, should_print,
};
use crate::{
    error::{HelferError, HelferResult},
    must,
};

const DOCUMENT_NAME: &str = "badges";

/// The output of a typesetting run.
#[derive(Debug, Clone)]
pub struct TypesetOutput {
    /// Did the engine exit successfully?
    pub success: bool,
    /// The exit status, for the error messages.
    pub status: String,
    /// The output of the engine.
    pub log: String,
}

/// Represents an engine compiling a LaTeX document to a PDF file.
pub trait Typesetter {
    /// Compiles the `document` file located in `workdir`.
    ///
    /// The PDF file is expected next to the document, with the `.pdf` extension.
    fn typeset(
        &self,
        workdir: &Path,
        document: &str,
    ) -> impl Future<Output = io::Result<TypesetOutput>> + Send;
}

/// The pdflatex engine, run as an external process.
#[derive(Debug, Clone)]
pub struct PdfLatex {
    binary: PathBuf,
}

impl PdfLatex {
    /// Returns the engine located at the provided path.
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

impl Typesetter for PdfLatex {
    async fn typeset(&self, workdir: &Path, document: &str) -> io::Result<TypesetOutput> {
        let output = Command::new(&self.binary)
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg(document)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(TypesetOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            log,
        })
    }
}

/// An error that happened while generating the badges.
#[derive(Debug, thiserror::Error)]
pub enum TypesetError {
    /// A file needed by the template could not be copied.
    #[error("could not prepare the file `{path}`: {source}")]
    Prepare {
        /// The path to the file.
        path: PathBuf,
        /// The source error.
        source: io::Error,
    },
    /// The engine could not be started.
    #[error("could not run the typesetting engine: {0}")]
    Spawn(#[source] io::Error),
    /// The engine took too long.
    #[error("the typesetting of the badges took more than {0:?}")]
    Timeout(Duration),
    /// The engine failed.
    #[error("the typesetting engine failed ({status})")]
    Failed {
        /// The exit status.
        status: String,
        /// The output of the engine.
        output: String,
    },
    /// The engine exited successfully but no PDF file was produced.
    #[error("the typesetting engine produced no PDF file")]
    MissingOutput {
        /// The output of the engine.
        output: String,
    },
    /// The creator already generated its file.
    #[error("the badges were already generated")]
    AlreadyGenerated,
}

impl TypesetError {
    /// Returns the raw output of the engine, if any.
    pub fn latex_output(&self) -> Option<&str> {
        match self {
            Self::Failed { output, .. } | Self::MissingOutput { output } => Some(output),
            _ => None,
        }
    }
}

/// Returns the name of the copy of a media file in the temporary directory.
fn media_file_name(source: &Path, name: String) -> String {
    match source.extension().and_then(OsStr::to_str) {
        Some(ext) => format!("{name}.{}", ext.to_ascii_lowercase()),
        None => name,
    }
}

#[derive(Debug)]
enum State {
    Collecting,
    Done(PathBuf),
    Failed,
}

/// Collects badges and generates their PDF file.
///
/// The temporary files are removed exactly once, either by [`finish`](Self::finish) or
/// when the creator is dropped.
#[derive(Debug)]
pub struct BadgeCreator<'a, T> {
    config: &'a BadgeConfig,
    typesetter: T,
    template: PathBuf,
    workdir: TempDir,
    state: State,
    badges: Vec<ResolvedBadge>,
    added: HashSet<uuid::Uuid>,
}

impl<'a, T: Typesetter> BadgeCreator<'a, T> {
    /// Creates a badge creator for an event with the provided settings.
    ///
    /// The custom template of the event is used if set, else the default one.
    pub fn new(
        config: &'a BadgeConfig,
        typesetter: T,
        settings: &badge_settings::Model,
    ) -> io::Result<Self> {
        let template = match &settings.latex_template {
            Some(path) => config.media_root.join(path),
            None => config.default_template.clone(),
        };

        let workdir = tempfile::Builder::new().prefix("badges-").tempdir()?;
        tracing::debug!("Created badge directory {}", workdir.path().display());

        Ok(Self {
            config,
            typesetter,
            template,
            workdir,
            state: State::Collecting,
            badges: Vec::new(),
            added: HashSet::new(),
        })
    }

    /// Returns the path to the temporary directory.
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Returns the number of collected badges.
    pub fn len(&self) -> usize {
        self.badges.len()
    }

    /// Returns the path to the generated PDF file, if the generation succeeded.
    pub fn pdf(&self) -> Option<&Path> {
        match &self.state {
            State::Done(pdf) => Some(pdf),
            State::Collecting | State::Failed => None,
        }
    }

    /// Returns whether no badge was collected.
    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }

    /// Adds a badge to the output.
    ///
    /// Returns `false` if the badge of this helper was already added, or if the
    /// creator isn't collecting anymore.
    pub fn add_badge(&mut self, badge: ResolvedBadge) -> bool {
        if !matches!(self.state, State::Collecting) || !self.added.insert(badge.helper_id) {
            return false;
        }
        self.badges.push(badge);
        true
    }

    async fn copy_media(&self, source: &Path, name: String) -> Result<String, TypesetError> {
        let name = media_file_name(source, name);
        tokio::fs::copy(source, self.workdir.path().join(&name))
            .await
            .map_err(|source_err| TypesetError::Prepare {
                path: source.to_owned(),
                source: source_err,
            })?;
        Ok(name)
    }

    async fn entries(&self) -> Result<Vec<BadgeEntry>, TypesetError> {
        let mut designs_done = HashSet::new();
        let mut entries = Vec::with_capacity(self.badges.len());

        for (i, badge) in self.badges.iter().enumerate() {
            let photo = match &badge.photo {
                Some(photo) => Some(
                    self.copy_media(&self.config.media_root.join(photo), format!("photo{i}"))
                        .await?,
                ),
                None => None,
            };

            let mut entry = BadgeEntry {
                firstname: badge.firstname.clone(),
                surname: badge.surname.clone(),
                job: badge.job.as_ref().map(|j| j.name.clone()).unwrap_or_default(),
                role: badge.role.as_ref().map(|r| r.name.clone()).unwrap_or_default(),
                role_latex: badge
                    .role
                    .as_ref()
                    .map(|r| r.latex_name.clone())
                    .unwrap_or_default(),
                photo,
                font_color: "000000".to_owned(),
                barcode: badge.barcode,
                permissions: badge
                    .permissions
                    .iter()
                    .map(|p| p.latex_name.clone())
                    .collect(),
                ..Default::default()
            };

            if let Some(design) = &badge.design {
                entry.font_color = design.font_color.clone();
                let first_use = designs_done.insert(design.id);
                for (bg, side, slot) in [
                    (&design.bg_front, "front", &mut entry.bg_front),
                    (&design.bg_back, "back", &mut entry.bg_back),
                ] {
                    let Some(bg) = bg else { continue };
                    let name = format!("design{}{side}", design.id);
                    *slot = Some(if first_use {
                        self.copy_media(&self.config.media_root.join(bg), name).await?
                    } else {
                        media_file_name(Path::new(bg), name)
                    });
                }
            }

            entries.push(entry);
        }

        Ok(entries)
    }

    async fn prepare(&self) -> Result<(), TypesetError> {
        let document = self.workdir.path().join(format!("{DOCUMENT_NAME}.tex"));
        tokio::fs::copy(&self.template, &document)
            .await
            .map_err(|source| TypesetError::Prepare {
                path: self.template.clone(),
                source,
            })?;

        let data = render_data(&self.config.language, &self.entries().await?);
        let data_path = self.workdir.path().join(format!("{DATA_FILE_NAME}.tex"));
        tokio::fs::write(&data_path, &data)
            .await
            .map_err(|source| TypesetError::Prepare {
                path: data_path.clone(),
                source,
            })?;

        if let Some(debug_file) = &self.config.debug_file {
            if let Err(e) = tokio::fs::write(debug_file, &data).await {
                tracing::warn!("Could not write the badge debug file {}: {e}", debug_file.display());
            }
        }

        Ok(())
    }

    async fn run(&self) -> Result<PathBuf, TypesetError> {
        self.prepare().await?;

        let document = format!("{DOCUMENT_NAME}.tex");
        let run = self.typesetter.typeset(self.workdir.path(), &document);
        let output = match tokio::time::timeout(self.config.timeout, run).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(TypesetError::Spawn(e)),
            Err(_) => return Err(TypesetError::Timeout(self.config.timeout)),
        };

        if !output.success {
            return Err(TypesetError::Failed {
                status: output.status,
                output: output.log,
            });
        }

        let pdf = self.workdir.path().join(format!("{DOCUMENT_NAME}.pdf"));
        if !tokio::fs::try_exists(&pdf).await.unwrap_or(false) {
            return Err(TypesetError::MissingOutput { output: output.log });
        }

        Ok(pdf)
    }

    /// Generates the PDF file of the collected badges, and returns its path.
    ///
    /// The file lives in the temporary directory, so it must be read before
    /// [`finish`](Self::finish) is called.
    #[tracing::instrument(skip(self), fields(badges = self.badges.len()))]
    pub async fn generate(&mut self) -> Result<PathBuf, TypesetError> {
        if !matches!(self.state, State::Collecting) {
            return Err(TypesetError::AlreadyGenerated);
        }

        match self.run().await {
            Ok(pdf) => {
                self.state = State::Done(pdf.clone());
                Ok(pdf)
            }
            Err(e) => {
                tracing::warn!("Badge generation failed: {e}");
                self.state = State::Failed;
                Err(e)
            }
        }
    }

    /// Removes the temporary files.
    pub fn finish(self) {
        tracing::debug!("Finishing badge creation ({:?})", self.state);
        remove_workdir(self.workdir);
    }

    /// Removes the temporary files after the provided delay, in a background task.
    ///
    /// The files are removed right away if the delay is zero.
    pub fn finish_after(self, delay: Duration) {
        if delay.is_zero() {
            return self.finish();
        }

        tracing::debug!(
            "Finishing badge creation ({:?}) in {}s",
            self.state,
            delay.as_secs()
        );
        let workdir = self.workdir;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            remove_workdir(workdir);
        });
    }
}

fn remove_workdir(workdir: TempDir) {
    let path = workdir.path().to_owned();
    if let Err(e) = workdir.close() {
        tracing::warn!("Could not remove the badge directory {}: {e}", path.display());
    }
}

/// Generates the PDF file of the badges of the provided jobs, and returns its content.
///
/// If `generate_all` is false and the barcodes are enabled, the badges that were already
/// printed are skipped. A helper is only added to the badges of their resolved job, or to
/// the badges of all their jobs if it is ambiguous, and never twice.
pub async fn generate_badges<C, T>(
    conn: &C,
    config: &BadgeConfig,
    typesetter: T,
    event: &event::Model,
    jobs: &[job::Model],
    generate_all: bool,
) -> HelferResult<Vec<u8>>
where
    C: sea_orm::ConnectionTrait,
    T: Typesetter,
{
    must::have_badges(event)?;

    let ctx = EventBadges::load(conn, event.id).await?;
    if !ctx.creation_possible() {
        return Err(HelferError::BadgesNotConfigured(event.url_name.clone()));
    }

    let skip_printed = ctx.settings.barcodes && !generate_all;

    let mut creator = BadgeCreator::new(config, typesetter, &ctx.settings)?;
    for job in jobs {
        for (helper, badge) in helpers_with_badges(conn, job.id).await? {
            let resolved = ctx.resolve(&helper, &badge);
            if should_print(job.id, skip_printed, &resolved) {
                creator.add_badge(resolved);
            }
        }
    }
    tracing::info!("Generating {} badge(s) for {}", creator.len(), event.url_name);

    let pdf = match creator.generate().await {
        Ok(path) => tokio::fs::read(path).await.map_err(HelferError::from),
        Err(e) => Err(e.into()),
    };
    creator.finish_after(config.rm_delay);
    pdf
}

#[cfg(test)]
mod tests {
    use std::{io, path::Path, time::Duration};

    use entity::badge_settings;
    use uuid::Uuid;

    use super::{BadgeCreator, TypesetError, TypesetOutput, Typesetter};
    use crate::badges::{BadgeConfig, ResolvedBadge};

    /// Writes a fake PDF file containing the data file.
    struct FakeEngine;

    impl Typesetter for FakeEngine {
        async fn typeset(&self, workdir: &Path, document: &str) -> io::Result<TypesetOutput> {
            let data = tokio::fs::read_to_string(workdir.join("badgedata.tex")).await?;
            let pdf = workdir.join(document.replace(".tex", ".pdf"));
            tokio::fs::write(pdf, data).await?;
            Ok(TypesetOutput {
                success: true,
                status: "exit status: 0".to_owned(),
                log: String::new(),
            })
        }
    }

    struct FailingEngine;

    impl Typesetter for FailingEngine {
        async fn typeset(&self, _: &Path, _: &str) -> io::Result<TypesetOutput> {
            Ok(TypesetOutput {
                success: false,
                status: "exit status: 1".to_owned(),
                log: "! Undefined control sequence.".to_owned(),
            })
        }
    }

    struct SilentEngine;

    impl Typesetter for SilentEngine {
        async fn typeset(&self, _: &Path, _: &str) -> io::Result<TypesetOutput> {
            Ok(TypesetOutput {
                success: true,
                status: "exit status: 0".to_owned(),
                log: "no pages of output".to_owned(),
            })
        }
    }

    struct SlowEngine;

    impl Typesetter for SlowEngine {
        async fn typeset(&self, _: &Path, _: &str) -> io::Result<TypesetOutput> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            unreachable!()
        }
    }

    struct Fixture {
        _media: tempfile::TempDir,
        config: BadgeConfig,
    }

    fn fixture() -> Fixture {
        let media = tempfile::tempdir().unwrap();
        let template = media.path().join("template.tex");
        std::fs::write(&template, "\\input{badgedata}\n").unwrap();
        Fixture {
            config: BadgeConfig {
                media_root: media.path().to_owned(),
                pdflatex: "pdflatex".into(),
                default_template: template,
                debug_file: None,
                language: "en".to_owned(),
                timeout: Duration::from_millis(200),
                rm_delay: Duration::ZERO,
                photo_max_size: 1_000_000,
            },
            _media: media,
        }
    }

    fn settings() -> badge_settings::Model {
        badge_settings::Model {
            event_id: 1,
            latex_template: None,
            barcodes: false,
        }
    }

    fn badge(firstname: &str) -> ResolvedBadge {
        ResolvedBadge {
            helper_id: Uuid::new_v4(),
            firstname: firstname.to_owned(),
            surname: "Doe".to_owned(),
            job: None,
            role: None,
            design: None,
            permissions: Vec::new(),
            photo: None,
            barcode: None,
            printed: false,
        }
    }

    #[tokio::test]
    async fn generate_and_cleanup() {
        let fixture = fixture();
        let mut creator = BadgeCreator::new(&fixture.config, FakeEngine, &settings()).unwrap();
        let workdir = creator.workdir().to_owned();

        let jane = badge("Jane");
        assert!(creator.add_badge(jane.clone()));
        assert!(!creator.add_badge(jane));
        assert!(creator.add_badge(badge("John")));

        assert!(creator.pdf().is_none());
        let pdf = creator.generate().await.unwrap();
        assert_eq!(creator.pdf(), Some(pdf.as_path()));
        let content = std::fs::read_to_string(&pdf).unwrap();
        assert_eq!(content.matches("\\printbadge").count(), 2);
        assert!(content.contains("\\badgeset{firstname}{Jane}"));

        // no more collecting after the generation
        assert!(!creator.add_badge(badge("Late")));
        assert!(matches!(
            creator.generate().await,
            Err(TypesetError::AlreadyGenerated)
        ));

        creator.finish();
        assert!(!workdir.exists());
    }

    #[tokio::test]
    async fn failure_keeps_output_and_cleans_up() {
        let fixture = fixture();
        let mut creator = BadgeCreator::new(&fixture.config, FailingEngine, &settings()).unwrap();
        let workdir = creator.workdir().to_owned();
        creator.add_badge(badge("Jane"));

        let err = creator.generate().await.unwrap_err();
        assert_eq!(err.latex_output(), Some("! Undefined control sequence."));
        assert!(creator.pdf().is_none());

        creator.finish();
        assert!(!workdir.exists());
    }

    #[tokio::test]
    async fn missing_pdf_is_a_failure() {
        let fixture = fixture();
        let mut creator = BadgeCreator::new(&fixture.config, SilentEngine, &settings()).unwrap();
        let workdir = creator.workdir().to_owned();

        let err = creator.generate().await.unwrap_err();
        assert!(matches!(err, TypesetError::MissingOutput { .. }));
        assert_eq!(err.latex_output(), Some("no pages of output"));

        drop(creator);
        assert!(!workdir.exists());
    }

    #[tokio::test]
    async fn timeout_is_a_failure() {
        let fixture = fixture();
        let mut creator = BadgeCreator::new(&fixture.config, SlowEngine, &settings()).unwrap();
        let workdir = creator.workdir().to_owned();

        let err = creator.generate().await.unwrap_err();
        assert!(matches!(err, TypesetError::Timeout(_)));

        creator.finish();
        assert!(!workdir.exists());
    }

    #[tokio::test]
    async fn delayed_cleanup() {
        let fixture = fixture();
        let mut creator = BadgeCreator::new(&fixture.config, FakeEngine, &settings()).unwrap();
        let workdir = creator.workdir().to_owned();
        creator.add_badge(badge("Jane"));
        creator.generate().await.unwrap();

        creator.finish_after(Duration::from_millis(50));
        assert!(workdir.join("badges.pdf").exists());
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!workdir.exists());
    }

    #[tokio::test]
    async fn missing_photo_fails_preparation() {
        let fixture = fixture();
        let mut creator = BadgeCreator::new(&fixture.config, FakeEngine, &settings()).unwrap();
        creator.add_badge(ResolvedBadge {
            photo: Some("photos/missing.jpg".to_owned()),
            ..badge("Jane")
        });

        let err = creator.generate().await.unwrap_err();
        assert!(matches!(err, TypesetError::Prepare { .. }));
        creator.finish();
    }

    #[tokio::test]
    async fn custom_template_and_images_are_copied() {
        let fixture = fixture();
        let media = &fixture.config.media_root;
        std::fs::write(media.join("custom.tex"), "custom").unwrap();
        std::fs::write(media.join("me.JPG"), "jpeg").unwrap();

        let settings = badge_settings::Model {
            latex_template: Some("custom.tex".to_owned()),
            ..settings()
        };
        let mut creator = BadgeCreator::new(&fixture.config, FakeEngine, &settings).unwrap();
        creator.add_badge(ResolvedBadge {
            photo: Some("me.JPG".to_owned()),
            ..badge("Jane")
        });

        let pdf = creator.generate().await.unwrap();
        let workdir = creator.workdir();
        assert_eq!(
            std::fs::read_to_string(workdir.join("badges.tex")).unwrap(),
            "custom"
        );
        assert!(workdir.join("photo0.jpg").exists());
        assert!(std::fs::read_to_string(pdf)
            .unwrap()
            .contains("\\badgeset{photo}{photo0.jpg}"));
        creator.finish();
    }
}
