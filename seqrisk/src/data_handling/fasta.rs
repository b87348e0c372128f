use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::data_handling::Dataset;
use crate::errors::{AnalysisError, Result};
use crate::models::SequenceRecord;

/// A FASTA file on disk.
pub struct FastaDataset {
    pub path: PathBuf,
}

impl Dataset for FastaDataset {
    type Output = Vec<SequenceRecord>;

    fn load(&self) -> Result<Vec<SequenceRecord>> {
        info!("Reading sequences from {}", self.path.display());
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                error!("Failed to open FASTA file {}: {}", self.path.display(), e);
                return Err(e.into());
            }
        };
        let records = parse_fasta(BufReader::new(file))?;
        info!("Number of sequences read: {}", records.len());
        Ok(records)
    }
}

/// Record under construction: header line number, id, description, residues.
struct Pending {
    line: usize,
    id: String,
    description: Option<String>,
    sequence: String,
}

impl Pending {
    fn finish(self) -> Result<SequenceRecord> {
        if self.sequence.is_empty() {
            return Err(parse_error(
                self.line,
                format!("record '{}' has an empty sequence", self.id),
            ));
        }
        Ok(SequenceRecord {
            id: self.id,
            description: self.description,
            sequence: self.sequence,
        })
    }
}

/// Parses FASTA text into records, preserving order and duplicate ids.
pub fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<SequenceRecord>> {
    let mut records = Vec::new();
    let mut current: Option<Pending> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(done) = current.take() {
                records.push(done.finish()?);
            }
            let mut parts = header.trim().splitn(2, char::is_whitespace);
            let id = parts.next().unwrap_or_default().to_string();
            if id.is_empty() {
                return Err(parse_error(line_no, "header has no identifier".to_string()));
            }
            let description = parts
                .next()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string);
            current = Some(Pending { line: line_no, id, description, sequence: String::new() });
            continue;
        }

        let pending = current
            .as_mut()
            .ok_or_else(|| parse_error(line_no, "sequence data before the first header".to_string()))?;

        if let Some(bad) = line.chars().find(|c| !c.is_ascii_graphic()) {
            return Err(parse_error(
                line_no,
                format!("unexpected character {:?} in sequence '{}'", bad, pending.id),
            ));
        }
        pending.sequence.push_str(line);
    }

    if let Some(done) = current.take() {
        records.push(done.finish()?);
    }

    if records.is_empty() {
        return Err(parse_error(0, "no FASTA records found".to_string()));
    }
    debug!("Parsed {} FASTA records", records.len());
    Ok(records)
}

fn parse_error(line: usize, reason: String) -> AnalysisError {
    AnalysisError::Parse { line, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn parse(text: &str) -> Result<Vec<SequenceRecord>> {
        parse_fasta(Cursor::new(text))
    }

    #[test]
    fn parses_multiline_records_in_order() {
        let text = ">seq1 first one\nACGT\nGG\n\n>seq2\nTTTT\n>seq1\nC\n";
        let records = parse(text).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].description.as_deref(), Some("first one"));
        assert_eq!(records[0].sequence, "ACGTGG");
        assert_eq!(records[1], SequenceRecord::new("seq2", "TTTT"));
        // duplicate ids are kept as separate records
        assert_eq!(records[2].id, "seq1");
        assert_eq!(records[2].sequence, "C");
    }

    #[test]
    fn reparsing_is_idempotent() {
        let text = ">a\nACGTN\n>b\nggcc\n";
        assert_eq!(parse(text).unwrap(), parse(text).unwrap());
    }

    #[test]
    fn tolerates_crlf_and_comments() {
        let records = parse(";comment\r\n>x desc\r\nAC\r\nGT\r\n").unwrap();
        assert_eq!(records, vec![SequenceRecord {
            id: "x".to_string(),
            description: Some("desc".to_string()),
            sequence: "ACGT".to_string(),
        }]);
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert!(matches!(parse(""), Err(AnalysisError::Parse { line: 0, .. })));
        assert!(matches!(parse("\n\n"), Err(AnalysisError::Parse { .. })));
    }

    #[test]
    fn record_without_sequence_is_rejected() {
        let err = parse(">a\nACGT\n>b\n>c\nGG\n").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { line: 3, .. }));

        let err = parse(">only\n").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { line: 1, .. }));
    }

    #[test]
    fn data_before_header_is_rejected() {
        assert!(matches!(parse("ACGT\n>a\nAC\n"), Err(AnalysisError::Parse { line: 1, .. })));
    }

    #[test]
    fn header_without_id_is_rejected() {
        assert!(matches!(parse(">\nACGT\n"), Err(AnalysisError::Parse { line: 1, .. })));
    }

    #[test]
    fn embedded_whitespace_is_rejected() {
        assert!(matches!(parse(">a\nAC GT\n"), Err(AnalysisError::Parse { line: 2, .. })));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ">seq1").unwrap();
        writeln!(file, "ATCGATCG").unwrap();
        writeln!(file, ">seq2").unwrap();
        writeln!(file, "GCGCGCGC").unwrap();
        file.flush().unwrap();

        let records = FastaDataset { path: file.path().to_path_buf() }.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sequence, "GCGCGCGC");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dataset = FastaDataset { path: PathBuf::from("/nonexistent/file.fasta") };
        assert!(matches!(dataset.load(), Err(AnalysisError::Io(_))));
    }
}
