//! Lookup over raw `name: value` header lines.

use bytes::Bytes;

/// Returns the trimmed value of the first line whose field name matches `name`
/// case-insensitively. Lines without a colon, or with an empty name, are skipped.
pub fn field_value<'a>(lines: &'a [Bytes], name: &str) -> Option<&'a [u8]> {
    lines.iter().find_map(|line| {
        let colon = line.iter().position(|b| *b == b':')?;
        let field_name = line[..colon].trim_ascii();
        if field_name.is_empty() || !field_name.eq_ignore_ascii_case(name.as_bytes()) {
            return None;
        }
        Some(line[colon + 1..].trim_ascii())
    })
}
