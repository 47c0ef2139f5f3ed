//! Filename derivation and sanitization for downloaded resources.
//!
//! Destinations must be deterministic across runs: the skip check keys the
//! metadata map by filename, so the same URL has to land on the same name
//! every time.

use std::borrow::Cow;

use url::Url;

/// Fallback name when neither the URL nor the resource title yields one.
pub const FALLBACK_FILENAME: &str = "unknown_file.dat";

/// Maximum length of a title-derived filename stem, before the `.dat` suffix.
const MAX_TITLE_STEM: usize = 80;

/// Derives a filename from a resource URL, falling back to its title.
///
/// Precedence:
/// 1. A `fichier` query parameter (BDPM-style endpoints put the real
///    filename there), percent-decoded.
/// 2. The final path segment, percent-decoded, when it contains a `.`.
/// 3. The sanitized title, truncated, with a `.dat` suffix.
/// 4. [`FALLBACK_FILENAME`].
#[must_use]
pub fn derive_filename(url: &str, title: Option<&str>) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some((_, value)) = parsed.query_pairs().find(|(key, _)| key == "fichier")
            && !value.is_empty()
        {
            return value.into_owned();
        }

        if let Some(basename) = last_path_segment(&parsed)
            && basename.contains('.')
        {
            return sanitize_filename(&basename);
        }
    }

    match title {
        Some(title) if !title.is_empty() => {
            let stem: String = sanitize_filename(title)
                .chars()
                .take(MAX_TITLE_STEM)
                .collect();
            format!("{stem}.dat")
        }
        _ => FALLBACK_FILENAME.to_string(),
    }
}

/// Last non-empty path segment, percent-decoded.
fn last_path_segment(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).next_back()?;
    let decoded = urlencoding::decode(segment)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| segment.to_string());
    (!decoded.is_empty()).then_some(decoded)
}

/// Cleans a string for use as a filename.
///
/// Keeps alphanumerics and `.-_`, replaces everything else with `_`.
/// Idempotent: sanitizing a sanitized name is a no-op.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
