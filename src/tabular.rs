// Delimited-text ingestion.
//
// The tokenizer is deliberately forgiving: malformed quoting never produces
// an error, it just accumulates characters as best it can.
use std::collections::HashMap;
use tracing::debug;

/// One data line keyed by header name.
pub type Row = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    /// Lines dropped because their token count did not match the header.
    pub dropped_rows: usize,
}

/// Drop a leading UTF-8 byte-order mark.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Split a single line on commas, honoring double-quoted fields.
///
/// A doubled quote inside a quoted field is an escaped literal quote. An
/// unterminated quoted field is closed at end of line.
pub fn parse_delimited_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => values.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    values.push(current);
    values
}

/// Parse newline-separated text whose first line names the columns.
///
/// Header names and values are trimmed. Lines with a token count different
/// from the header length are dropped and counted in `dropped_rows`.
pub fn parse_table(text: &str) -> ParsedTable {
    let mut lines = strip_bom(text)
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return ParsedTable::default();
    };
    let headers: Vec<String> = parse_delimited_line(header_line)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    let mut dropped_rows = 0usize;
    for (line_no, line) in lines {
        let values = parse_delimited_line(line);
        if values.len() != headers.len() {
            debug!(
                line = line_no + 1,
                expected = headers.len(),
                found = values.len(),
                "dropping row with mismatched column count"
            );
            dropped_rows += 1;
            continue;
        }
        let row: Row = headers
            .iter()
            .cloned()
            .zip(values.into_iter().map(|v| v.trim().to_string()))
            .collect();
        rows.push(row);
    }

    ParsedTable { headers, rows, dropped_rows }
}
