use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use crate::{PAPER_EXTENSION, PAPER_YEAR};

static FORBIDDEN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("Invalid filename regex"));
static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Uppercase first letter of every whitespace-separated word.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Replace characters that are not portable in filenames, and turn
/// whitespace runs into a single underscore.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned = FORBIDDEN_CHARS.replace_all(filename, "_");
    WHITESPACE_RUNS.replace_all(&cleaned, "_").into_owned()
}

/// `ABBR_examtype_2024.pdf`, before collision handling and sanitization.
pub fn paper_filename(abbreviation: &str, exam_type: &str) -> String {
    format!("{}_{}_{}.{}", abbreviation, exam_type, PAPER_YEAR, PAPER_EXTENSION)
}

/// Pick the first free name in `dir` for `base`, trying `base`, then
/// `stem_1.pdf`, `stem_2.pdf`, ... Every candidate is sanitized before the
/// check, so the returned name is exactly the one that is free.
///
/// A name is taken if it exists on disk or is already in `claimed`.
pub fn unique_filename(dir: &Path, base: &str, claimed: &HashSet<PathBuf>) -> String {
    let is_taken = |name: &str| {
        let candidate = dir.join(name);
        candidate.exists() || claimed.contains(&candidate)
    };

    let mut filename = sanitize_filename(base);
    if !is_taken(&filename) {
        return filename;
    }

    let suffix = format!(".{}", PAPER_EXTENSION);
    let stem = base.strip_suffix(&suffix).unwrap_or(base);
    let mut counter = 1;
    loop {
        filename = sanitize_filename(&format!("{}_{}{}", stem, counter, suffix));
        if !is_taken(&filename) {
            return filename;
        }
        counter += 1;
    }
}
