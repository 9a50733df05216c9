use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters not allowed in a stored filename
    /// Anything outside ASCII letters, digits, dot, underscore and hyphen
    /// - "Data Structures (CAT).pdf" -> "Data_Structures__CAT_.pdf"
    pub static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();

    /// Runs of dots, so a sanitized name can never contain ".."
    pub static ref DOT_RUNS: Regex = Regex::new(r"\.{2,}").unwrap();
}

/// Fallback name for uploads whose filename sanitizes to nothing
pub const DEFAULT_UPLOAD_FILENAME: &str = "paper.pdf";

/// Longest sanitized filename, leaving room for the 37-byte UUID key prefix
/// under the usual 255-byte file name limit
pub const MAX_FILENAME_LEN: usize = 200;

/// Extensions longer than this are treated as part of the stem
const MAX_EXTENSION_LEN: usize = 16;

/// Reduce a client-supplied filename to a safe single path component.
///
/// Directory parts (either separator) are discarded, unsafe characters are
/// replaced by `_` and leading dots are stripped so the result is never
/// hidden or a traversal.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let replaced = UNSAFE_FILENAME_CHARS.replace_all(base, "_");
    let collapsed = DOT_RUNS.replace_all(&replaced, ".");
    let cleaned = collapsed.trim_start_matches('.');

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        DEFAULT_UPLOAD_FILENAME.to_string()
    } else {
        truncate_filename(cleaned)
    }
}

/// Cut an already-sanitized (ASCII) name down to `MAX_FILENAME_LEN` bytes,
/// keeping a short extension intact.
fn truncate_filename(name: &str) -> String {
    if name.len() <= MAX_FILENAME_LEN {
        return name.to_string();
    }

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() <= MAX_EXTENSION_LEN => {
            (stem, Some(ext))
        }
        _ => (name, None),
    };

    let stem_budget = extension.map_or(MAX_FILENAME_LEN, |ext| MAX_FILENAME_LEN - ext.len() - 1);
    let stem = stem[..stem.len().min(stem_budget)].trim_end_matches('.');

    match extension {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem.to_string(),
    }
}
