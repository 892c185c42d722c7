use super::types::ValidationMode;

const ATEXT_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c)
}

/// RFC 5322 dot-atom: non-empty runs of atext joined by single dots.
fn is_dot_atom(local: &str) -> bool {
    local
        .split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(is_atext))
}

/// Quoted string without embedded quotes or line breaks.
fn is_simple_quoted(local: &str) -> bool {
    local
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .is_some_and(|inner| !inner.contains(['"', '\r', '\n']))
}

pub(crate) fn local_part_ok(local: &str, mode: ValidationMode) -> bool {
    match mode {
        ValidationMode::Strict => is_dot_atom(local),
        ValidationMode::Relaxed => is_dot_atom(local) || is_simple_quoted(local),
    }
}

/// Lower-cased local part as used for role-based classification.
pub(crate) fn local_key(local: &str) -> String {
    local.trim().to_lowercase()
}
