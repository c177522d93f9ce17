//! Reference-name helpers shared by the import pipeline.
//!
//! Reference names are the stable identifiers stored on models, columns and
//! relations. They are derived from whatever label the diagram carried, so
//! everything here has to cope with arbitrary input.

use std::collections::HashSet;

/// Reduce a display name to a lowercase identifier seed.
///
/// Runs of characters outside `[A-Za-z0-9]` collapse into a single
/// underscore, leading and trailing underscores are trimmed, and the result
/// is lowercased. Names with nothing left after scrubbing fall back to
/// `fallback`.
pub fn sanitize_reference_name(name: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_underscore = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            pending_underscore = false;
        } else if !pending_underscore {
            out.push('_');
            pending_underscore = true;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Uppercase the first character, leaving the rest untouched. Empty input
/// stays empty.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Resolve `seed` against the names already taken, appending `_2`, `_3`, ...
/// until a free name is found. The winner is recorded in `used`.
pub fn unique_name(seed: &str, used: &mut HashSet<String>) -> String {
    if used.insert(seed.to_string()) {
        return seed.to_string();
    }
    let mut suffix = 2usize;
    loop {
        let candidate = format!("{}_{}", seed, suffix);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}
