//! Reading JSON-lines documents into records.

use super::{ActivityEvent, CatalogRecord, LogBatch};
use crate::error::{EtlError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::warn;

/// The two kinds of input documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Catalog,
    Log,
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Catalog => "song catalog",
            RecordKind::Log => "activity log",
        }
    }
}

/// A parsed input document.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedDocument {
    Catalog(CatalogRecord),
    Log(LogBatch),
}

pub fn read_document(path: &Path, kind: RecordKind) -> Result<ParsedDocument> {
    match kind {
        RecordKind::Catalog => read_catalog_record(path).map(ParsedDocument::Catalog),
        RecordKind::Log => read_log_batch(path).map(ParsedDocument::Log),
    }
}

pub fn read_catalog_record(path: &Path) -> Result<CatalogRecord> {
    parse_catalog_record(path, &read_text(path)?)
}

pub fn read_log_batch(path: &Path) -> Result<LogBatch> {
    parse_log_batch(path, &read_text(path)?)
}

/// Parses a catalog document. Only the first record is used.
pub fn parse_catalog_record(source: &Path, text: &str) -> Result<CatalogRecord> {
    let mut records = parse_lines::<CatalogRecord>(source, text)?;
    if records.len() > 1 {
        warn!(
            "{} records in catalog file {:?}, only the first is loaded",
            records.len(),
            source
        );
    }
    if records.is_empty() {
        return Err(EtlError::parse(source, 1, "empty catalog document"));
    }
    Ok(records.swap_remove(0).1)
}

pub fn parse_log_batch(source: &Path, text: &str) -> Result<LogBatch> {
    let events = parse_lines::<ActivityEvent>(source, text)?
        .into_iter()
        .map(|(line, mut event)| {
            event.line = line;
            event
        })
        .collect();

    Ok(LogBatch {
        source: source.to_path_buf(),
        events,
    })
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| EtlError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|err| {
        let valid = &err.as_bytes()[..err.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        EtlError::parse(path, line, format!("invalid UTF-8: {}", err.utf8_error()))
    })
}

/// Parses every non-blank line, pairing each value with its 1-based line number.
fn parse_lines<T: DeserializeOwned>(source: &Path, text: &str) -> Result<Vec<(usize, T)>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .map(|value| (index + 1, value))
                .map_err(|e| EtlError::parse(source, index + 1, e.to_string()))
        })
        .collect()
}
