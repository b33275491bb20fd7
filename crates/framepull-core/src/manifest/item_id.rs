//! Filesystem-safe path component derived from a manifest item id.

/// Sanitizes an item id for use as a directory and file name prefix on Linux.
///
/// - Replaces NUL, `/`, `\`, whitespace and control characters with `_`
/// - Trims leading/trailing dots and underscores (no `..`, no hidden dirs)
/// - Collapses consecutive underscores
/// - Limits length to 200 bytes so `{id}_temp.{ext}` still fits NAME_MAX
///
/// Returns `None` when nothing usable is left.
pub fn path_component(item_id: &str) -> Option<String> {
    const MAX_ID_BYTES: usize = 200;

    let mut out = String::with_capacity(item_id.len());
    let mut prev_underscore = false;

    for c in item_id.chars() {
        let replacement = if c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');

    let mut take = trimmed.len().min(MAX_ID_BYTES);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    let component = &trimmed[..take];
    if component.is_empty() {
        None
    } else {
        Some(component.to_string())
    }
}
