//! Small helpers shared by the modules of this crate and the services.

/// Returns the provided name as a file name safe to use in a `Content-Disposition` header.
///
/// Every character that isn't an ASCII letter, a digit, `.`, `-` or `_` is replaced by `_`.
pub fn escape_filename(name: &str) -> String {
    let escaped: String = name
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    if escaped.trim_matches(['_', '.']).is_empty() {
        "download".to_owned()
    } else {
        escaped
    }
}
