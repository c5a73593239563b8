//! Newline-delimited JSON record source.

use std::io::{BufRead, Lines};

use thiserror::Error;

use super::RecordSource;
use crate::tracker::FrameRecord;

#[derive(Debug, Error)]
pub enum JsonSourceError {
    #[error("failed to read record stream")]
    Io(#[from] std::io::Error),
    #[error("line {line}: malformed frame record")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads one JSON frame record per line. Blank lines are skipped.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> RecordSource for JsonLinesSource<R> {
    type Error = JsonSourceError;

    fn next_record(&mut self) -> Result<Option<FrameRecord>, Self::Error> {
        for text in self.lines.by_ref() {
            let text = text?;
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            return serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| JsonSourceError::Parse {
                    line: self.line,
                    source,
                });
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_records_and_skips_blank_lines() {
        let input = concat!(
            r#"{"windows": "", "camera_id": "camera-1", "date_created": 1533227583.0, "id": 1140, "no_faces": 0}"#,
            "\n\n",
            r#"{"windows": "348,241,669,562", "date_created": 1533227749.0, "no_faces": 1}"#,
            "\n",
        );
        let mut source = JsonLinesSource::new(Cursor::new(input));

        let first = source.next_record().unwrap().unwrap();
        assert_eq!(first.no_faces, 0);
        let second = source.next_record().unwrap().unwrap();
        assert_eq!(second.boxes().unwrap().len(), 1);
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_reports_line_of_bad_record() {
        let input = "{\"no_faces\": 1, \"date_created\": 1.0}\n{\"no_faces\": \"one\"}\n";
        let mut source = JsonLinesSource::new(Cursor::new(input));
        assert!(source.next_record().is_ok());
        match source.next_record() {
            Err(JsonSourceError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
