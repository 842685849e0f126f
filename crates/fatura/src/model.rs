use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::normalize::{format_amount, StatementPeriod};

/// Installment marker as printed on statements, e.g. "3/12".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Installment {
    pub current: u32,
    pub total: u32,
}

impl fmt::Display for Installment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// A normalized statement line. Amounts are integer cents in the statement's
/// currency, sign convention: charges positive, payments/refunds negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount_cents: i64,
    pub installment: Option<Installment>,
    /// Original row content, kept for traceability in warnings and reviews.
    pub raw: String,
}

impl Transaction {
    pub fn amount_display(&self) -> String {
        format_amount(self.amount_cents)
    }
}

/// Outcome of parsing one statement: the transactions that normalized
/// cleanly, plus one warning per row that did not.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub transactions: Vec<Transaction>,
    pub warnings: Vec<String>,
}

impl ParseResult {
    pub fn total_cents(&self) -> i64 {
        self.transactions.iter().map(|t| t.amount_cents).sum()
    }
}

/// One raw row as recovered from the input, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub cells: Vec<String>,
    /// The original record text.
    pub source: String,
}

/// A file providing rows. Owned by one pipeline invocation and discarded
/// once the `ParseResult` is produced.
#[derive(Debug)]
pub enum SourceDocument {
    Csv(CsvSource),
    Pdf(PdfSource),
}

impl SourceDocument {
    pub fn rows(&self) -> &[RawRow] {
        match self {
            SourceDocument::Csv(s) => &s.rows,
            SourceDocument::Pdf(s) => &s.rows,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceDocument::Csv(_) => "csv",
            SourceDocument::Pdf(_) => "pdf",
        }
    }
}

#[derive(Debug)]
pub struct CsvSource {
    pub delimiter: u8,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug)]
pub struct PdfSource {
    pub page_count: usize,
    /// Reference month/year recovered from the statement itself, used to
    /// infer years for day/month-only dates.
    pub period: Option<StatementPeriod>,
    pub summary: StatementSummary,
    pub rows: Vec<RawRow>,
}

/// Header figures a statement PDF declares about itself. All optional;
/// issuers differ in what they print.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StatementSummary {
    pub total_cents: Option<i64>,
    pub payment_cents: Option<i64>,
    pub statement_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Ynab,
}

impl ExportFormat {
    pub fn from_arg(s: &str) -> Option<ExportFormat> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            "ynab" => Some(ExportFormat::Ynab),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Ynab => "ynab",
        }
    }

    pub fn output_extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv | ExportFormat::Ynab => "csv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Csv,
    Pdf,
}

impl InputKind {
    pub fn from_arg(s: &str) -> Option<InputKind> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(InputKind::Csv),
            "pdf" => Some(InputKind::Pdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Csv => "csv",
            InputKind::Pdf => "pdf",
        }
    }
}
