//! Field extraction from the status page body
//!
//! The firmware embeds its tables as JavaScript string literals, e.g.
//! `var tagValueList = '8|Locked|QAM256|...';`. Extraction picks one line
//! by index and splits the first quoted literal on `|`.

use crate::error::MonitorError;

/// Extract the pipe-delimited fields of the quoted literal on `line_index`
pub fn extract_fields(page_body: &str, line_index: usize) -> Result<Vec<String>, MonitorError> {
    let line = page_body
        .split('\n')
        .nth(line_index)
        .ok_or_else(|| MonitorError::LineOutOfRange {
            line: line_index,
            available: page_body.split('\n').count(),
        })?;

    let mut quoted = line.split('\'');
    // The text before the first quote is discarded; the literal must be closed.
    let content = match (quoted.next(), quoted.next(), quoted.next()) {
        (Some(_), Some(content), Some(_)) => content,
        _ => return Err(MonitorError::MissingQuotedField { line: line_index }),
    };

    Ok(content.split('|').map(str::to_string).collect())
}

/// Fetch a single positional field, reporting which table it was missing from
pub(crate) fn field_at<'a>(
    fields: &'a [String],
    index: usize,
    section: &'static str,
) -> Result<&'a str, MonitorError> {
    fields
        .get(index)
        .map(String::as_str)
        .ok_or(MonitorError::FieldOutOfRange {
            section,
            index,
            available: fields.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fields_from_quoted_literal() {
        let body = "<html>\n<script>\nvar tagValueList = 'A|B|C|D';\n</script>";
        let fields = extract_fields(body, 2).unwrap();
        assert_eq!(fields, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_extract_keeps_empty_fields() {
        let body = "x = '|1||Locked|';";
        let fields = extract_fields(body, 0).unwrap();
        assert_eq!(fields, vec!["", "1", "", "Locked", ""]);
    }

    #[test]
    fn test_extract_uses_first_literal_only() {
        let body = "a = 'one|two'; b = 'three';";
        assert_eq!(extract_fields(body, 0).unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_extract_empty_literal() {
        let body = "a = '';";
        assert_eq!(extract_fields(body, 0).unwrap(), vec![""]);
    }

    #[test]
    fn test_line_out_of_range() {
        let body = "line0\nline1";
        let err = extract_fields(body, 5).unwrap_err();
        assert!(matches!(
            err,
            MonitorError::LineOutOfRange {
                line: 5,
                available: 2
            }
        ));
    }

    #[test]
    fn test_missing_quotes() {
        let err = extract_fields("no quotes here", 0).unwrap_err();
        assert!(matches!(err, MonitorError::MissingQuotedField { line: 0 }));

        // A single quote does not delimit a literal
        let err = extract_fields("var x = 'unterminated", 0).unwrap_err();
        assert!(matches!(err, MonitorError::MissingQuotedField { line: 0 }));
    }

    #[test]
    fn test_crlf_line_endings() {
        let body = "first\r\nvar t = 'a|b';\r\nlast";
        assert_eq!(extract_fields(body, 1).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let body = "x\ny = 'p|q|r';";
        assert_eq!(extract_fields(body, 1).unwrap(), extract_fields(body, 1).unwrap());
    }

    #[test]
    fn test_field_at_out_of_range() {
        let fields = vec!["a".to_string()];
        assert_eq!(field_at(&fields, 0, "summary").unwrap(), "a");
        let err = field_at(&fields, 10, "summary").unwrap_err();
        assert!(matches!(
            err,
            MonitorError::FieldOutOfRange {
                section: "summary",
                index: 10,
                available: 1
            }
        ));
    }
}
