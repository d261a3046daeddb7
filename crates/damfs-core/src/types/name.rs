//! Display-name to path-segment sanitizing.

/// Characters that cannot appear in a path segment.
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Turn a remote display name into a filesystem-safe path segment.
///
/// Reserved and control characters become `_`, trailing dots and
/// whitespace are trimmed, and an empty result becomes `_`.
pub fn sanitize_segment(display_name: &str) -> String {
    let replaced: String = display_name
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}
