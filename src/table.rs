pub const HEADER: [&str; 6] = [
    "Center Code",
    "Center Name",
    "District",
    "State",
    "Student Roll No",
    "Class (10/12)",
];

const LINE_END: &str = "\r\n";

pub fn quote_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn format_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str(LINE_END);
    line
}

pub fn header_row() -> String {
    format_row(&HEADER)
}

/// Splits delimited text into rows. Quoted fields may carry commas, doubled
/// quotes and line breaks. Blank lines are dropped.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let mut row_has_content = false;
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        let ch = chars[i];
        if in_quotes {
            if ch == '"' {
                if i + 1 < chars.len() && chars[i + 1] == '"' {
                    buf.push('"');
                    i += 2;
                    continue;
                }
                in_quotes = false;
            } else {
                buf.push(ch);
            }
            i += 1;
            continue;
        }
        match ch {
            '"' => {
                in_quotes = true;
                row_has_content = true;
            }
            ',' => {
                row.push(std::mem::take(&mut buf));
                row_has_content = true;
            }
            '\r' | '\n' => {
                if row_has_content || !buf.is_empty() {
                    row.push(std::mem::take(&mut buf));
                    rows.push(std::mem::take(&mut row));
                }
                row_has_content = false;
                if ch == '\r' && i + 1 < chars.len() && chars[i + 1] == '\n' {
                    i += 1;
                }
            }
            _ => {
                buf.push(ch);
                row_has_content = true;
            }
        }
        i += 1;
    }
    if row_has_content || !buf.is_empty() {
        row.push(buf);
        rows.push(row);
    }
    rows
}
