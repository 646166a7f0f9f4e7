//! Line-oriented document parser.

use std::collections::HashMap;

use crate::section::{OptionLine, SectionRecord};
use crate::{ParseError, ParseResult};

/// Parse a whole configuration source into ordered section records.
///
/// Declaration order is preserved: later stages depend on it for
/// reference resolution. Structural problems (bad header, option outside
/// any section, duplicate section, duplicate option key) abort the parse.
pub fn parse_document(source: &str) -> ParseResult<Vec<SectionRecord>> {
    let mut records: Vec<SectionRecord> = Vec::new();
    // (kind, name) -> header line, for duplicate detection
    let mut seen: HashMap<(String, String), usize> = HashMap::new();

    for (idx, raw) in source.lines().enumerate() {
        let lineno = idx + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            let (kind, name) = parse_header(line, lineno)?;
            if let Some(&first_line) = seen.get(&(kind.clone(), name.clone())) {
                let section = if name.is_empty() {
                    kind
                } else {
                    format!("{} {}", kind, name)
                };
                return Err(ParseError::DuplicateDefinition {
                    line: lineno,
                    first_line,
                    section,
                });
            }
            seen.insert((kind.clone(), name.clone()), lineno);
            records.push(SectionRecord {
                kind,
                name,
                line: lineno,
                options: Vec::new(),
            });
            continue;
        }

        let Some(record) = records.last_mut() else {
            return Err(ParseError::MalformedSection {
                line: lineno,
                reason: format!("option '{}' appears before any section header", line),
            });
        };

        let Some((key, value)) = line.split_once(':') else {
            return Err(ParseError::MalformedSection {
                line: lineno,
                reason: format!("expected 'key: value', got '{}'", line),
            });
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(ParseError::MalformedSection {
                line: lineno,
                reason: format!("invalid option key '{}'", key),
            });
        }
        if record.options.iter().any(|o| o.key == key) {
            return Err(ParseError::MalformedSection {
                line: lineno,
                reason: format!("duplicate option '{}' in section [{}]", key, record.key()),
            });
        }
        record.options.push(OptionLine {
            key: key.to_string(),
            value: value.to_string(),
            line: lineno,
        });
    }

    Ok(records)
}

/// Split `[kind name]` into its tokens. At most two tokens are accepted;
/// whether a given kind may omit its name is a registry question, not a
/// parser question.
fn parse_header(line: &str, lineno: usize) -> ParseResult<(String, String)> {
    let Some(inner) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
        return Err(ParseError::MalformedSection {
            line: lineno,
            reason: format!("unterminated section header '{}'", line),
        });
    };
    let mut tokens = inner.split_whitespace();
    let Some(kind) = tokens.next() else {
        return Err(ParseError::MalformedSection {
            line: lineno,
            reason: "empty section header".to_string(),
        });
    };
    let name = tokens.next().unwrap_or("");
    if tokens.next().is_some() {
        return Err(ParseError::MalformedSection {
            line: lineno,
            reason: format!("section header '[{}]' has more than two tokens", inner),
        });
    }
    Ok((kind.to_string(), name.to_string()))
}

/// Drop everything from the first `#` on.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_in_order() {
        let src = "\
[mcu alpha]
serial: /dev/ttyACM0

# gantry hardware
[stepper sx]
pin_step: alpha:PA1
pin_dir: alpha:PA2
";
        let records = parse_document(src).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, "mcu");
        assert_eq!(records[0].name, "alpha");
        assert_eq!(records[0].get("serial"), Some("/dev/ttyACM0"));
        assert_eq!(records[1].kind, "stepper");
        assert_eq!(records[1].options.len(), 2);
        assert_eq!(records[1].options[0].line, 6);
    }

    #[test]
    fn unnamed_section_is_allowed() {
        let records = parse_document("[printer]\nmcu: alpha\n").unwrap();
        assert_eq!(records[0].kind, "printer");
        assert_eq!(records[0].name, "");
    }

    #[test]
    fn trailing_comment_is_stripped() {
        let records = parse_document("[mcu a] # primary\nserial: /dev/x # usb\n").unwrap();
        assert_eq!(records[0].get("serial"), Some("/dev/x"));
    }

    #[test]
    fn duplicate_section_is_rejected() {
        let err = parse_document("[mcu a]\nserial: x\n[mcu a]\n").unwrap_err();
        match err {
            ParseError::DuplicateDefinition {
                line,
                first_line,
                section,
            } => {
                assert_eq!(line, 3);
                assert_eq!(first_line, 1);
                assert_eq!(section, "mcu a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_option_is_rejected() {
        let err = parse_document("[mcu a]\nserial: x\nserial: y\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedSection { line: 3, .. }));
    }

    #[test]
    fn option_before_section_is_rejected() {
        let err = parse_document("serial: x\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedSection { line: 1, .. }));
    }

    #[test]
    fn overlong_header_is_rejected() {
        let err = parse_document("[rail x y]\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedSection { .. }));
    }

    #[test]
    fn unterminated_header_is_rejected() {
        let err = parse_document("[mcu a\nserial: x\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedSection { line: 1, .. }));
    }

    #[test]
    fn line_without_colon_is_rejected() {
        let err = parse_document("[mcu a]\nserial /dev/x\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedSection { line: 2, .. }));
    }
}
