//! Minimal CSV reader for published spreadsheet exports.
//!
//! Each line is one row; quoted fields may contain commas and `""` escapes but
//! never line breaks. Malformed quoting degrades instead of failing.

/// One spreadsheet line, one cell per column.
pub type RawRow = Vec<String>;

/// Parse CSV text into rows of trimmed cells.
///
/// Blank lines and rows whose cells are all empty are dropped.
pub fn parse(text: &str) -> Vec<RawRow> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).trim())
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect()
}

fn parse_line(line: &str) -> RawRow {
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(ch);
            }
        } else {
            match ch {
                '"' => in_quotes = true,
                ',' => row.push(std::mem::take(&mut cell).trim().to_string()),
                _ => cell.push(ch),
            }
        }
    }

    // Unterminated quotes simply run to the end of the line.
    row.push(cell.trim().to_string());
    row
}
