//! End-to-end statement parsing: file → source document → `ParseResult`.

use std::fs;
use std::path::Path;

use crate::csv_reader;
use crate::detect;
use crate::error::FaturaError;
use crate::mapper::{self, MapperConfig};
use crate::model::{InputKind, ParseResult, SourceDocument};
use crate::normalize::StatementPeriod;
use crate::pdf;

/// Per-invocation options, supplied by the CLI layer.
#[derive(Debug, Default, Clone)]
pub struct ParseOptions {
    /// Explicit input-type override; otherwise detection runs.
    pub kind: Option<InputKind>,
    /// Password for encrypted PDFs.
    pub password: Option<String>,
    /// Reference month/year for sources that omit transaction years and do
    /// not declare their own statement date.
    pub period: Option<StatementPeriod>,
}

/// Loads a statement file into a `SourceDocument` of raw rows.
///
/// The file is read once into memory; no handle outlives this call,
/// whatever the exit path.
pub fn load_source(path: &Path, opts: &ParseOptions) -> Result<SourceDocument, FaturaError> {
    let kind = detect::detect_input_kind(path, opts.kind)?;
    let bytes = fs::read(path)?;

    match kind {
        InputKind::Csv => {
            let content = String::from_utf8_lossy(&bytes);
            Ok(SourceDocument::Csv(csv_reader::read_csv(&content)?))
        }
        InputKind::Pdf => Ok(SourceDocument::Pdf(pdf::read_pdf(
            &bytes,
            opts.password.as_deref(),
        )?)),
    }
}

/// Maps an already-loaded source document into transactions.
pub fn parse_source(
    source: &SourceDocument,
    opts: &ParseOptions,
) -> Result<ParseResult, FaturaError> {
    mapper::map_rows(source, &MapperConfig { period: opts.period })
}

/// Full pipeline for one file.
pub fn parse_statement(path: &Path, opts: &ParseOptions) -> Result<ParseResult, FaturaError> {
    let source = load_source(path, opts)?;
    parse_source(&source, opts)
}
