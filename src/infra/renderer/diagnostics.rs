//! Translation of external compiler error text into typed failures.
//!
//! The upstream compilers only expose positions through their error strings,
//! so extraction here is pattern-based. The formats are pinned by unit tests
//! below; re-verify them whenever the renderer dependency changes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::application::render::RenderFailure;

// e.g. "Line 4 of /app/document (mj-text) — Attribute foo is illegal"
static VALIDATION_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Line (?P<line>\d+) of [^(]*\((?P<tag>[^)]+)\)\s*(?:—|-)\s*(?P<message>.+)")
        .expect("validation message pattern")
});

// e.g. "unexpected token at position 18..24"
static POSITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"position (?P<offset>\d+)").expect("position pattern"));

/// Translate a failure raised while parsing `source` into a typed failure.
///
/// The parse phase itself establishes the failure class; sniffing only
/// recovers location detail. Unrecognized messages therefore still come back
/// as a parse failure, anchored at the document start.
pub fn translate_parse_failure(source: &str, message: &str) -> RenderFailure {
    if let Some(caps) = VALIDATION_MESSAGE.captures(message) {
        let line = caps["line"].parse().unwrap_or(1);
        return RenderFailure::Validation {
            line,
            tag_name: caps["tag"].to_string(),
            message: caps["message"].trim().to_string(),
            formatted_message: message.to_string(),
        };
    }

    if let Some(caps) = POSITION.captures(message) {
        let offset = caps["offset"].parse().unwrap_or(0);
        let (line, column) = offset_to_position(source, offset);
        return RenderFailure::Parse {
            line,
            column,
            message: message.to_string(),
        };
    }

    RenderFailure::Parse {
        line: 1,
        column: 1,
        message: message.to_string(),
    }
}

fn offset_to_position(source: &str, offset: usize) -> (u32, u32) {
    let clamped = offset.min(source.len());
    let prefix = &source.as_bytes()[..clamped];
    let line = prefix.iter().filter(|byte| **byte == b'\n').count() as u32 + 1;
    let column = prefix
        .iter()
        .rev()
        .take_while(|byte| **byte != b'\n')
        .count() as u32
        + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_validation_diagnostics_from_formatted_messages() {
        let message = "Line 1 of /app (mj-text) — Attribute foo is illegal";
        match translate_parse_failure("<mjml></mjml>", message) {
            RenderFailure::Validation {
                line,
                tag_name,
                message,
                formatted_message,
            } => {
                assert_eq!(line, 1);
                assert_eq!(tag_name, "mj-text");
                assert_eq!(message, "Attribute foo is illegal");
                assert!(formatted_message.contains("Line 1"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn converts_byte_offsets_into_line_and_column() {
        let source = "<mjml>\n  <mj-body>\n    broken";
        let message = "unexpected token at position 23..29";
        match translate_parse_failure(source, message) {
            RenderFailure::Parse { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, 5);
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_messages_stay_parse_failures() {
        match translate_parse_failure("x", "no root node found") {
            RenderFailure::Parse {
                line,
                column,
                message,
            } => {
                assert_eq!((line, column), (1, 1));
                assert_eq!(message, "no root node found");
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }
}
