use thiserror::Error;

/// File-level failures. Any of these aborts the current statement; in batch
/// mode the run moves on to the next file.
#[derive(Error, Debug)]
pub enum FaturaError {
    #[error("unsupported input type: {0}")]
    UnsupportedInputType(String),

    #[error("malformed CSV: {0}")]
    MalformedCsv(String),

    /// Distinct from generic parse failures so callers can prompt for a
    /// password or abort cleanly.
    #[error("PDF decryption failed: {0}")]
    PdfDecryption(String),

    #[error("no transactions found: {0}")]
    NoTransactionsFound(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Row-level failures. These never abort a file; the mapper records them as
/// warnings and drops the offending row.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RowError {
    #[error("ambiguous date '{0}': no reference month to infer the year")]
    AmbiguousDate(String),

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("unparsable amount '{0}'")]
    UnparsableAmount(String),
}

pub type Result<T> = std::result::Result<T, FaturaError>;
