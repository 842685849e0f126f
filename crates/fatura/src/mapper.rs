//! Raw rows to canonical transactions.
//!
//! Best-effort semantics: a row that fails normalization on any required
//! field is excluded and recorded as a warning with its original content;
//! one bad row never aborts the file. Producing zero transactions does.

use crate::columns::{self, ColumnMap};
use crate::error::FaturaError;
use crate::model::{Installment, ParseResult, RawRow, SourceDocument, Transaction};
use crate::normalize::{self, StatementPeriod};

/// Explicit per-invocation configuration; nothing here is process-global.
#[derive(Debug, Default, Clone, Copy)]
pub struct MapperConfig {
    /// Reference month/year for `DD/MM` dates. A PDF's own statement
    /// period, when detected, takes precedence.
    pub period: Option<StatementPeriod>,
}

/// Maps a source document's raw rows into a `ParseResult`.
pub fn map_rows(source: &SourceDocument, cfg: &MapperConfig) -> Result<ParseResult, FaturaError> {
    let mut result = ParseResult::default();

    match source {
        SourceDocument::Csv(csv) => {
            match columns::resolve(&csv.headers) {
                Some(map) => {
                    for (idx, row) in csv.rows.iter().enumerate() {
                        map_row(row, idx, &map, cfg.period, &mut result);
                    }
                }
                None => {
                    // No recognizable header: the file is headerless and the
                    // "header" record is really the first data row.
                    let width = csv
                        .rows
                        .iter()
                        .map(|r| r.cells.len())
                        .max()
                        .unwrap_or(csv.headers.len());
                    let map = columns::positional(width);
                    let first = RawRow {
                        cells: csv.headers.clone(),
                        source: csv.headers.join(&(csv.delimiter as char).to_string()),
                    };
                    map_row(&first, 0, &map, cfg.period, &mut result);
                    for (idx, row) in csv.rows.iter().enumerate() {
                        map_row(row, idx + 1, &map, cfg.period, &mut result);
                    }
                }
            }
        }
        SourceDocument::Pdf(pdf) => {
            let map = columns::positional(4);
            let period = pdf.period.or(cfg.period);
            for (idx, row) in pdf.rows.iter().enumerate() {
                map_row(row, idx, &map, period, &mut result);
            }
        }
    }

    if result.transactions.is_empty() {
        return Err(FaturaError::NoTransactionsFound(format!(
            "{} source yielded no usable transaction rows",
            source.label()
        )));
    }

    Ok(result)
}

fn map_row(
    row: &RawRow,
    idx: usize,
    map: &ColumnMap,
    period: Option<StatementPeriod>,
    result: &mut ParseResult,
) {
    let cell = |i: usize| row.cells.get(i).map(|c| c.trim()).unwrap_or("");

    let date = match normalize::parse_date(cell(map.date), period) {
        Ok(date) => date,
        Err(e) => {
            result
                .warnings
                .push(format!("row {} skipped ({e}): {}", idx + 1, row.source));
            return;
        }
    };

    let amount_cents = match normalize::parse_amount(cell(map.amount)) {
        Ok(cents) => cents,
        Err(e) => {
            result
                .warnings
                .push(format!("row {} skipped ({e}): {}", idx + 1, row.source));
            return;
        }
    };

    let (description, inline_installment) = split_installment(cell(map.description));
    if description.len() < 2 {
        result.warnings.push(format!(
            "row {} skipped (missing description): {}",
            idx + 1,
            row.source
        ));
        return;
    }

    let installment = map
        .installment
        .and_then(|i| parse_installment(cell(i)))
        .or(inline_installment);

    result.transactions.push(Transaction {
        date,
        description,
        amount_cents,
        installment,
        raw: row.source.clone(),
    });
}

/// Splits a trailing `NN/NN` installment marker off a description, the way
/// faturas embed it ("AUTOJAPAN 03/10").
fn split_installment(description: &str) -> (String, Option<Installment>) {
    let trimmed = description.trim();
    if let Some((head, tail)) = trimmed.rsplit_once(' ') {
        if let Some(installment) = parse_installment(tail) {
            return (head.trim().to_string(), Some(installment));
        }
    }
    (trimmed.to_string(), None)
}

/// `"03/10"` → 3 of 10. Rejects tokens that cannot be an installment
/// (zero, single-installment, current past total) so dates are not eaten.
fn parse_installment(token: &str) -> Option<Installment> {
    let (current_s, total_s) = token.trim().split_once('/')?;
    if current_s.is_empty() || current_s.len() > 2 || total_s.is_empty() || total_s.len() > 2 {
        return None;
    }
    let current: u32 = current_s.parse().ok()?;
    let total: u32 = total_s.parse().ok()?;
    if current >= 1 && total > 1 && current <= total {
        Some(Installment { current, total })
    } else {
        None
    }
}
