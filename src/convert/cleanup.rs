//! Markdown post-processing.

use regex::Regex;
use std::sync::OnceLock;

static EXTRA_BLANKS: OnceLock<Regex> = OnceLock::new();

/// Collapses runs of blank lines to a single blank line and guarantees a
/// trailing newline.
pub fn tidy(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }
    let extra_blanks =
        EXTRA_BLANKS.get_or_init(|| Regex::new(r"\n{3,}").expect("pattern is valid"));
    let mut out = extra_blanks
        .replace_all(markdown.trim_end(), "\n\n")
        .into_owned();
    out.push('\n');
    out
}
