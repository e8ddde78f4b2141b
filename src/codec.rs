//! CSV encoding and decoding of task collections.
//!
//! The header row lists the field names in natural key order and every row,
//! the header included, ends with `\n`. Values containing a comma, a double
//! quote or a line break are quoted with embedded quotes doubled; all other
//! values are written bare.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::error::CodecError;
use crate::fields::TaskType;
use crate::task::{Task, FIELD_NAMES};

/// Encode tasks as CSV text. An empty collection encodes to an empty string.
pub fn encode(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return String::new();
    }

    let mut out = FIELD_NAMES.join(",");
    out.push('\n');
    for task in tasks {
        let values = task.values();
        let row: Vec<Cow<'_, str>> = values.iter().map(|v| escape_field(v)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Decode CSV text into tasks.
///
/// Blank input yields an empty collection. The header is matched by name, so
/// columns may appear in any order, but every field must be present exactly
/// once and no other columns are allowed.
pub fn decode(text: &str) -> Result<Vec<Task>, CodecError> {
    let mut records = split_records(text)?
        .into_iter()
        .filter(|r| !r.is_blank());

    let Some(header) = records.next() else {
        return Ok(Vec::new());
    };
    let columns = ColumnMap::from_header(&header.fields)?;

    let mut seen = HashSet::new();
    let mut tasks = Vec::new();
    for record in records {
        if record.fields.len() != columns.width {
            return Err(CodecError::FieldCount {
                line: record.line,
                expected: columns.width,
                found: record.fields.len(),
            });
        }

        let raw_id = record.fields[columns.id].trim();
        let id = raw_id.parse::<u64>().map_err(|_| CodecError::InvalidId {
            line: record.line,
            value: raw_id.to_string(),
        })?;
        if !seen.insert(id) {
            return Err(CodecError::DuplicateId { line: record.line, id });
        }

        let kind = record.fields[columns.kind]
            .parse::<TaskType>()
            .map_err(|message| CodecError::InvalidType { line: record.line, message })?;

        tasks.push(Task {
            id,
            date: record.fields[columns.date].clone(),
            kind,
            content: record.fields[columns.content].clone(),
        });
    }
    Ok(tasks)
}

/// Quote a value when it contains a delimiter, a quote or a line break.
fn escape_field(s: &str) -> Cow<'_, str> {
    if s.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(s)
    }
}

/// Positions of each field within a row.
struct ColumnMap {
    id: usize,
    date: usize,
    kind: usize,
    content: usize,
    width: usize,
}

impl ColumnMap {
    fn from_header(names: &[String]) -> Result<Self, CodecError> {
        let mut slots: [Option<usize>; 4] = [None; 4];
        for (pos, raw) in names.iter().enumerate() {
            let name = raw.trim().to_lowercase();
            let Some(field) = FIELD_NAMES.iter().position(|f| *f == name) else {
                return Err(CodecError::UnknownColumn(raw.trim().to_string()));
            };
            if slots[field].replace(pos).is_some() {
                return Err(CodecError::DuplicateColumn(name));
            }
        }

        let slot = |i: usize| slots[i].ok_or(CodecError::MissingColumn(FIELD_NAMES[i]));
        Ok(ColumnMap {
            id: slot(0)?,
            date: slot(1)?,
            kind: slot(2)?,
            content: slot(3)?,
            width: names.len(),
        })
    }
}

/// One logical CSV record and the line it starts on.
#[derive(Debug)]
struct Record {
    line: usize,
    fields: Vec<String>,
    quoted: bool,
}

impl Record {
    fn is_blank(&self) -> bool {
        !self.quoted && self.fields.len() == 1 && self.fields[0].trim().is_empty()
    }
}

/// Split text into records, honouring quoted fields that span lines.
fn split_records(text: &str) -> Result<Vec<Record>, CodecError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut field_quoted = false;
    let mut line = 1;
    let mut start_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            // Quotes only open a quoted field at its start; elsewhere they are literal.
            '"' if field.is_empty() && !field_quoted => {
                in_quotes = true;
                quoted = true;
                field_quoted = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                field_quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                records.push(Record {
                    line: start_line,
                    fields: std::mem::take(&mut fields),
                    quoted,
                });
                quoted = false;
                field_quoted = false;
                line += 1;
                start_line = line;
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err(CodecError::UnterminatedQuote { line: start_line });
    }
    if quoted || !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push(Record { line: start_line, fields, quoted });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64, date: &str, kind: TaskType, content: &str) -> Task {
        Task {
            id,
            date: date.to_string(),
            kind,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_encode_single_record() {
        let tasks = vec![task(0, "2024-01-01", TaskType::Other, "fix bug")];
        assert_eq!(encode(&tasks), "id,date,type,content\n0,2024-01-01,other,fix bug\n");
    }

    #[test]
    fn test_encode_empty_is_empty_string() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), Vec::<Task>::new());
    }

    #[test]
    fn test_round_trip_plain_values() {
        let tasks = vec![
            task(0, "2024-01-01 09:00:00", TaskType::Meeting, "standup"),
            task(4, "2024-01-01 09:30:00", TaskType::Development, "parser work"),
            task(2, "2024-01-01 12:00:00", TaskType::Break, ""),
        ];
        assert_eq!(decode(&encode(&tasks)).unwrap(), tasks);
    }

    #[test]
    fn test_round_trip_escaped_values() {
        let tasks = vec![
            task(0, "2024-01-01", TaskType::Review, "a, b and \"c\""),
            task(1, "2024-01-02", TaskType::Other, "line one\nline two\r\nline three"),
        ];
        let text = encode(&tasks);
        assert!(text.contains("\"a, b and \"\"c\"\"\""));
        assert_eq!(decode(&text).unwrap(), tasks);
    }

    #[test]
    fn test_decode_reordered_header_and_crlf() {
        let text = "content,type,id,date\r\nhello,meeting,7,2024-05-05\r\n\r\n";
        let tasks = decode(text).unwrap();
        assert_eq!(tasks, vec![task(7, "2024-05-05", TaskType::Meeting, "hello")]);
    }

    #[test]
    fn test_decode_skips_blank_lines() {
        let text = "\nid,date,type,content\n\n1,2024-01-01,other,x\n   \n2,2024-01-02,other,y";
        let tasks = decode(text).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].content, "y");
    }

    #[test]
    fn test_decode_header_only() {
        assert!(decode("id,date,type,content\n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert_eq!(
            decode("id,date,content\n0,2024-01-01,x\n").unwrap_err(),
            CodecError::MissingColumn("type")
        );
        assert_eq!(
            decode("id,date,time,type,content\n").unwrap_err(),
            CodecError::UnknownColumn("time".to_string())
        );
        assert_eq!(
            decode("id,id,date,type,content\n").unwrap_err(),
            CodecError::DuplicateColumn("id".to_string())
        );
        assert_eq!(
            decode("id,date,type,content\n0,2024-01-01,other\n").unwrap_err(),
            CodecError::FieldCount { line: 2, expected: 4, found: 3 }
        );
        assert_eq!(
            decode("id,date,type,content\nzero,2024-01-01,other,x\n").unwrap_err(),
            CodecError::InvalidId { line: 2, value: "zero".to_string() }
        );
        assert!(matches!(
            decode("id,date,type,content\n0,2024-01-01,lunch,x\n").unwrap_err(),
            CodecError::InvalidType { line: 2, .. }
        ));
        assert_eq!(
            decode("id,date,type,content\n0,a,other,x\n0,b,other,y\n").unwrap_err(),
            CodecError::DuplicateId { line: 3, id: 0 }
        );
        assert_eq!(
            decode("id,date,type,content\n0,a,other,\"open\n").unwrap_err(),
            CodecError::UnterminatedQuote { line: 2 }
        );
    }

    #[test]
    fn test_field_count_line_accounts_for_multiline_values() {
        let text = "id,date,type,content\n0,a,other,\"two\nlines\"\n1,b,other\n";
        assert_eq!(
            decode(text).unwrap_err(),
            CodecError::FieldCount { line: 4, expected: 4, found: 3 }
        );
    }

    #[test]
    fn test_decode_keeps_quotes_inside_bare_fields() {
        let text = "id,date,type,content\n0,d,other,say \"hi\" now\n1,e,other,5\" pipe\n";
        let tasks = decode(text).unwrap();
        assert_eq!(tasks[0].content, "say \"hi\" now");
        assert_eq!(tasks[1].content, "5\" pipe");
    }
}
