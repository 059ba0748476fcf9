use std::{path::PathBuf, time::Duration};

use mkenv::prelude::*;
use once_cell::sync::OnceCell;

use crate::badges::BadgeConfig;

mkenv::make_config! {
    /// The environment used to set up a connection to the database.
    pub struct DbEnv {
        /// The database URL.
        pub db_url: {
            var_name: "DATABASE_URL",
            layers: [
                or_default_val(|| "sqlite://helfertool.sqlite?mode=rwc".to_owned()),
            ],
            description: "The URL to the SQL database",
            default_val_fmt: "sqlite://helfertool.sqlite?mode=rwc",
        }
    }
}

mkenv::make_config! {
    /// The environment used by this crate.
    pub struct LibEnv {
        /// The directory containing the uploaded files (templates, photos, backgrounds).
        pub media_root: {
            var_name: "HELFERTOOL_MEDIA_ROOT",
            layers: [
                or_default_val(|| "media".to_owned()),
            ],
            description: "The directory containing the uploaded files",
            default_val_fmt: "media",
        },

        /// The path to the pdflatex binary.
        pub badge_pdflatex: {
            var_name: "BADGE_PDFLATEX",
            layers: [
                or_default_val(|| "/usr/bin/pdflatex".to_owned()),
            ],
            description: "The path to the pdflatex binary used to typeset the badges",
            default_val_fmt: "/usr/bin/pdflatex",
        },

        /// The maximum duration of a badge generation.
        pub badge_pdf_timeout: {
            var_name: "BADGE_PDF_TIMEOUT",
            layers: [
                parsed<Duration>(|input| {
                    input.parse().map(Duration::from_secs).map_err(From::from)
                }),
                or_default_val(|| Duration::from_secs(30 * 60)),
            ],
            description: "The maximum duration of the typesetting of the badges, in seconds",
            default_val_fmt: "30 minutes",
        },

        /// The maximum size of the photo of a badge, in kilobytes.
        pub badge_photo_max_size: {
            var_name: "BADGE_PHOTO_MAX_SIZE",
            layers: [
                parsed_from_str<u64>(),
                or_default_val(|| 1000),
            ],
            description: "The maximum size of the photo of a badge, in kilobytes",
            default_val_fmt: "1000",
        },

        /// The delay before the working directory of a generation is removed.
        pub badge_rm_delay: {
            var_name: "BADGE_RM_DELAY",
            layers: [
                parsed<Duration>(|input| {
                    input.parse().map(Duration::from_secs).map_err(From::from)
                }),
                or_default_val(|| Duration::from_secs(2 * 60)),
            ],
            description: "The delay before the temporary files of the badges are removed, in seconds",
            default_val_fmt: "2 minutes",
        },

        /// The language of the texts printed on the badges.
        pub badge_language: {
            var_name: "BADGE_LANGUAGE_CODE",
            layers: [
                or_default_val(|| "de".to_owned()),
            ],
            description: "The language code of the texts printed on the badges",
            default_val_fmt: "de",
        },

        /// The template used when an event doesn't have a custom one.
        pub badge_default_template: {
            var_name: "BADGE_DEFAULT_TEMPLATE",
            layers: [
                or_default_val(|| concat!(env!("CARGO_MANIFEST_DIR"), "/latex/badge.tex").to_owned()),
            ],
            description: "The path to the default LaTeX template of the badges",
            default_val_fmt: "latex/badge.tex of the helfer-lib package",
        },

        /// The file the generated LaTeX code is copied to, for debugging purposes.
        pub badge_template_debug_file: {
            var_name: "BADGE_TEMPLATE_DEBUG_FILE",
            layers: [or_default()],
            description: "The file the generated LaTeX code of the badges is copied to",
            default_val_fmt: "empty, disabled",
        },
    }
}

impl LibEnv {
    /// Returns the configuration of the badge creation from this environment.
    pub fn badge_config(&self) -> BadgeConfig {
        let debug_file = self.badge_template_debug_file.get();
        BadgeConfig {
            media_root: PathBuf::from(self.media_root.get()),
            pdflatex: PathBuf::from(self.badge_pdflatex.get()),
            default_template: PathBuf::from(self.badge_default_template.get()),
            debug_file: (!debug_file.is_empty()).then(|| PathBuf::from(debug_file)),
            language: self.badge_language.get(),
            timeout: self.badge_pdf_timeout.get(),
            rm_delay: self.badge_rm_delay.get(),
            photo_max_size: self.badge_photo_max_size.get() * 1000,
        }
    }
}

static ENV: OnceCell<LibEnv> = OnceCell::new();

/// Initializes the provided library environment as global.
///
/// If this function has already been called, the provided environment will be ignored.
pub fn init_env(env: LibEnv) {
    let _ = ENV.set(env);
}

/// Returns a static reference to the global library environment.
///
/// **Caution**: To use this function, the [`init_env()`] function must have been called at the start
/// of the program.
pub fn env() -> &'static LibEnv {
    ENV.get().unwrap()
}
