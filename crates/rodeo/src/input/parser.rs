//! CSV/TSV reader with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{Result, RodeoError};
use super::source::DataTable;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Bytes buffered from the start of a file for delimiter detection.
const PEEK_CAPACITY: usize = 64 * 1024;

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses tabular data files.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Same parser, reading at most `max_rows` data rows.
    pub fn limited(&self, max_rows: usize) -> Self {
        let mut config = self.config.clone();
        config.max_rows = Some(max_rows);
        Self { config }
    }

    /// Parse a file into a header row and data rows.
    ///
    /// The file is streamed: only the buffered prefix used for delimiter
    /// detection and the rows up to `max_rows` are read.
    /// A file without columns or without a single data row is an extraction error.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<DataTable> {
        let path = path.as_ref();
        let io_err = |e| RodeoError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let file = File::open(path).map_err(io_err)?;
        let mut reader = BufReader::with_capacity(PEEK_CAPACITY, file);

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => {
                let peeked = reader.fill_buf().map_err(io_err)?;
                let complete = complete_lines(peeked, peeked.len() == PEEK_CAPACITY);
                detect_delimiter(complete)
                    .ok_or_else(|| RodeoError::extraction(path, "no lines to analyze"))?
            }
        };

        let table = self.parse_reader(reader, delimiter)?;

        if table.column_count() == 0 {
            return Err(RodeoError::extraction(path, "no columns found"));
        }
        if table.row_count() == 0 {
            return Err(RodeoError::extraction(path, "no data rows found"));
        }

        Ok(table)
    }

    /// Parse bytes directly.
    #[cfg(test)]
    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        self.parse_reader(bytes, delimiter)
    }

    fn parse_reader<R: Read>(&self, source: R, delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(source);

        let mut headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            if headers.is_empty() {
                // Generate column names
                headers = (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect();
            }

            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(DataTable::new(headers, rows, delimiter))
    }
}

/// Drop a trailing partial line when the peek window was filled.
fn complete_lines(bytes: &[u8], truncated: bool) -> &[u8] {
    if !truncated {
        return bytes;
    }
    match bytes.iter().rposition(|&b| b == b'\n') {
        Some(end) => &bytes[..=end],
        None => bytes,
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Option<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return None;
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Higher count with consistent lines wins; tab breaks ties.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Some(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
