//! The LaTeX data file given to the badge template.
//!
//! The template includes the file `badgedata.tex`, which contains one block per badge:
//!
//! ```tex
//! \badgeinit
//! \badgeset{firstname}{Ada}
//! \badgeset{surname}{Lovelace}
//! \badgeperm{perm-backstage}
//! \printbadge
//! ```
//!
//! The template defines these macros.

use std::fmt::Write as _;

/// The name of the data file, without its extension, as included by the templates.
pub const DATA_FILE_NAME: &str = "badgedata";

/// Escapes the provided text so that it is printed as is by LaTeX.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '{' | '}' | '$' | '&' | '#' | '_' | '%' => {
                out.push('\\');
                out.push(c);
            }
            '^' => out.push_str(r"\textasciicircum{}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '\n' | '\r' | '\t' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// A badge as written in the data file.
///
/// The file names of the images are relative to the directory of the template.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BadgeEntry {
    /// The printed first name.
    pub firstname: String,
    /// The printed last name.
    pub surname: String,
    /// The name of the printed job, empty if there is none.
    pub job: String,
    /// The name of the role.
    pub role: String,
    /// The LaTeX name of the role.
    pub role_latex: String,
    /// The file name of the copied photo.
    pub photo: Option<String>,
    /// The font color, as 6 hexadecimal digits.
    pub font_color: String,
    /// The file name of the copied front background.
    pub bg_front: Option<String>,
    /// The file name of the copied back background.
    pub bg_back: Option<String>,
    /// The barcode, if the barcodes are enabled for the event.
    pub barcode: Option<i32>,
    /// The LaTeX names of the permissions, without the prefix.
    pub permissions: Vec<String>,
}

fn set(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, r"\badgeset{{{key}}}{{{}}}", escape_latex(value));
}

/// Renders the content of the data file.
pub fn render_data(language: &str, badges: &[BadgeEntry]) -> String {
    let mut out = String::from("% generated file, do not edit\n");
    let _ = writeln!(out, r"\badgelanguage{{{}}}", escape_latex(language));

    for badge in badges {
        out.push_str("\n\\badgeinit\n");
        set(&mut out, "firstname", &badge.firstname);
        set(&mut out, "surname", &badge.surname);
        set(&mut out, "job", &badge.job);
        set(&mut out, "role", &badge.role);
        set(&mut out, "rolelatex", &badge.role_latex);
        set(&mut out, "fontcolor", &badge.font_color);
        if let Some(photo) = &badge.photo {
            set(&mut out, "photo", photo);
        }
        if let Some(bg) = &badge.bg_front {
            set(&mut out, "bgfront", bg);
        }
        if let Some(bg) = &badge.bg_back {
            set(&mut out, "bgback", bg);
        }
        if let Some(barcode) = badge.barcode {
            set(&mut out, "barcode", &barcode.to_string());
        }
        for perm in &badge.permissions {
            let _ = writeln!(out, r"\badgeperm{{perm-{}}}", escape_latex(perm));
        }
        out.push_str("\\printbadge\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{BadgeEntry, escape_latex, render_data};

    #[test]
    fn escape_special_characters() {
        assert_eq!(escape_latex("Bar & Grill"), r"Bar \& Grill");
        assert_eq!(escape_latex("100%"), r"100\%");
        assert_eq!(escape_latex(r"a\b"), r"a\textbackslash{}b");
        assert_eq!(escape_latex("x_1^2"), r"x\_1\textasciicircum{}2");
        assert_eq!(escape_latex("line\nbreak"), "line break");
    }

    #[test]
    fn one_block_per_badge() {
        let badges = [
            BadgeEntry {
                firstname: "Ada".to_owned(),
                surname: "Lovelace".to_owned(),
                job: "Bar".to_owned(),
                role: "Helper".to_owned(),
                role_latex: "helper".to_owned(),
                font_color: "000000".to_owned(),
                barcode: Some(12345678),
                permissions: vec!["backstage".to_owned()],
                ..Default::default()
            },
            BadgeEntry {
                firstname: "Grace".to_owned(),
                surname: "Hopper".to_owned(),
                photo: Some("photo-1.jpg".to_owned()),
                ..Default::default()
            },
        ];

        let data = render_data("de", &badges);
        assert!(data.contains(r"\badgelanguage{de}"));
        assert_eq!(data.matches(r"\badgeinit").count(), 2);
        assert_eq!(data.matches(r"\printbadge").count(), 2);
        assert!(data.contains(r"\badgeset{firstname}{Ada}"));
        assert!(data.contains(r"\badgeset{barcode}{12345678}"));
        assert!(data.contains(r"\badgeperm{perm-backstage}"));
        assert!(data.contains(r"\badgeset{photo}{photo-1.jpg}"));
        assert_eq!(data.matches(r"\badgeset{barcode}").count(), 1);
    }
}
