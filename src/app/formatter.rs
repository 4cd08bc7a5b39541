use crate::app::error::{SearchError, SearchResult};
use crate::app::models::{MatchRecord, OutputFormat, OutputTarget, RawSearchArgs};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

pub const TIME_FORMAT: &str = "%Y/%m/%d, %H:%M:%S%.6f";

/// Search parameters and timings written alongside JSON results.
#[derive(Debug, Serialize)]
pub struct ExportEnvelope<'a> {
    pub search_args: &'a RawSearchArgs,
    pub start: String,
    pub end: String,
    pub total_time_seconds: f64,
    pub results: &'a [MatchRecord],
}

pub struct OutputGenerator;

impl OutputGenerator {
    /// Left-justified table with a header row. Every column is one wider
    /// than its longest cell.
    pub fn generate_table(records: &[MatchRecord]) -> String {
        let mut widths = MatchRecord::HEADER.map(|h| h.chars().count());
        for record in records {
            for (w, cell) in widths.iter_mut().zip(record.cells()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut output = String::new();
        push_row(&mut output, &MatchRecord::HEADER, &widths);
        for record in records {
            push_row(&mut output, &record.cells(), &widths);
        }
        output
    }

    /// Header plus one line per record, `delimiter` separated.
    pub fn write_delimited<W: Write>(
        writer: &mut W,
        records: &[MatchRecord],
        delimiter: char,
    ) -> io::Result<()> {
        writeln!(writer, "{}", delimited_line(&MatchRecord::HEADER, delimiter))?;
        for record in records {
            writeln!(writer, "{}", delimited_line(&record.cells(), delimiter))?;
        }
        Ok(())
    }

    pub fn generate_json(envelope: &ExportEnvelope) -> serde_json::Result<String> {
        serde_json::to_string_pretty(envelope)
    }

    /// Writes the file-based formats to the target and returns the path.
    pub fn export(envelope: &ExportEnvelope, target: &OutputTarget) -> SearchResult<PathBuf> {
        let Some(path) = target.file_path() else {
            return Err(SearchError::OutputTarget(format!(
                "{:?} output is not written to a file",
                target.format
            )));
        };

        let file = File::create(&path).map_err(|e| SearchError::io(&path, e))?;
        let mut writer = BufWriter::new(file);

        match target.format {
            OutputFormat::Json => {
                let json = Self::generate_json(envelope)
                    .map_err(|e| SearchError::io(&path, io::Error::other(e)))?;
                writer
                    .write_all(json.as_bytes())
                    .map_err(|e| SearchError::io(&path, e))?;
            }
            _ => Self::write_delimited(&mut writer, envelope.results, target.delimiter)
                .map_err(|e| SearchError::io(&path, e))?,
        }

        writer.flush().map_err(|e| SearchError::io(&path, e))?;
        Ok(path)
    }
}

fn push_row(output: &mut String, cells: &[&str], widths: &[usize]) {
    let line: String = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = w + 1))
        .collect();
    output.push_str(line.trim_end());
    output.push('\n');
}

fn delimited_line(cells: &[&str], delimiter: char) -> String {
    cells
        .iter()
        .map(|cell| quote(cell, delimiter))
        .collect::<Vec<_>>()
        .join(&delimiter.to_string())
}

fn quote(cell: &str, delimiter: char) -> String {
    if cell.contains(delimiter) || cell.contains(['"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
