use sha2::{Digest, Sha256};

const MAX_SEGMENT_LEN: usize = 80;
const MAX_EXTENSION_LEN: usize = 10;

/// Windows-safe version of one path segment. May return an empty string.
pub fn sanitize_segment(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);

    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }

    let mut final_name = truncate_keeping_extension(compacted);
    if is_reserved_windows_name(&final_name) {
        final_name.push('_');
    }
    final_name
}

/// Shortens `name` to [`MAX_SEGMENT_LEN`] bytes, cutting the stem so a short
/// extension survives.
fn truncate_keeping_extension(mut name: String) -> String {
    if name.len() <= MAX_SEGMENT_LEN {
        return name;
    }
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= MAX_EXTENSION_LEN)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let mut end = MAX_SEGMENT_LEN - extension.len();
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name.truncate(end);
    name.push_str(&extension);
    name
}

/// File name without its extension: everything from the first `.` is dropped.
pub fn strip_extension(name: &str) -> &str {
    name.split_once('.').map_or(name, |(stem, _)| stem)
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// First four bytes of the SHA-256 of `input`, as hex. Stable across runs.
pub fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
