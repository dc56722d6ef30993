//! # Layer name normalization
//!
//! Layer names come straight from the artist and routinely contain spaces,
//! slashes, or punctuation. Exported image files (and any identifier derived
//! from them downstream) need a filesystem-safe form. Normalization happens
//! at export time only - the layers and paths inside the document keep their
//! original names so round-tripping back into the host stays lossless.

/// Map a layer name to a filesystem- and identifier-safe equivalent.
///
/// - A leading ASCII digit gets an underscore prepended.
/// - Every run of characters outside `[A-Za-z0-9_]` collapses to a single
///   underscore.
/// - Trailing underscores are stripped, as long as at least one character
///   remains.
///
/// The result is deterministic and idempotent:
/// `normalize(&normalize(x)) == normalize(x)` for every input.
#[must_use]
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.push('_');
    }
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    while out.len() > 1 && out.ends_with('_') {
        out.pop();
    }
    out
}
