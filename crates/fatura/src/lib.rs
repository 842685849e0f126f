//! Convert Brazilian credit-card statement exports (faturas) into a
//! normalized transaction list and serialize it as CSV, JSON or
//! YNAB-import CSV.
//!
//! The pipeline: input-type detection, raw-row recovery (CSV reader or PDF
//! extractor), locale normalization, column-role mapping, export. Row-level
//! problems become warnings; file-level problems are typed errors.

pub mod checksum;
pub mod columns;
pub mod csv_reader;
pub mod detect;
pub mod error;
pub mod export;
pub mod mapper;
pub mod model;
pub mod normalize;
pub mod pdf;
pub mod pipeline;

pub use error::{FaturaError, RowError};
pub use model::{
    CsvSource, ExportFormat, InputKind, Installment, ParseResult, PdfSource, RawRow,
    SourceDocument, StatementSummary, Transaction,
};
pub use normalize::StatementPeriod;
pub use pipeline::{load_source, parse_source, parse_statement, ParseOptions};
