//! Serialize a `ParseResult` into one of the supported output formats.
//!
//! All exporters are deterministic, keep insertion order, and produce
//! header-only output for an empty transaction list.

use serde::Serialize;

use crate::error::FaturaError;
use crate::model::{ExportFormat, ParseResult, Transaction};
use crate::normalize::format_amount;

/// Renders the transactions in `format`.
pub fn render(result: &ParseResult, format: ExportFormat) -> Result<String, FaturaError> {
    match format {
        ExportFormat::Csv => render_csv(&result.transactions),
        ExportFormat::Json => render_json(&result.transactions),
        ExportFormat::Ynab => render_ynab(&result.transactions),
    }
}

/// Canonical CSV: `date,description,amount`, ISO dates, decimal amounts.
fn render_csv(transactions: &[Transaction]) -> Result<String, FaturaError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["date", "description", "amount"])
        .map_err(|e| FaturaError::Export(e.to_string()))?;

    for tx in transactions {
        writer
            .write_record([
                tx.date.format("%Y-%m-%d").to_string(),
                tx.description.clone(),
                format_amount(tx.amount_cents),
            ])
            .map_err(|e| FaturaError::Export(e.to_string()))?;
    }

    into_string(writer)
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    date: String,
    description: &'a str,
    amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    installment: Option<String>,
}

/// JSON array of transaction objects. Amounts are exact two-decimal values
/// derived from integer cents; no arithmetic ever ran on floats.
fn render_json(transactions: &[Transaction]) -> Result<String, FaturaError> {
    let records: Vec<JsonRecord> = transactions
        .iter()
        .map(|tx| JsonRecord {
            date: tx.date.format("%Y-%m-%d").to_string(),
            description: &tx.description,
            amount: tx.amount_cents as f64 / 100.0,
            installment: tx.installment.map(|i| i.to_string()),
        })
        .collect();

    serde_json::to_string_pretty(&records).map_err(|e| FaturaError::Export(e.to_string()))
}

/// YNAB import CSV: `Date,Payee,Memo,Amount`, dates `MM/DD/YYYY`.
///
/// YNAB's 4-column contract reads negative amounts as outflow, so the
/// canonical sign (charges positive) is negated on the way out. The memo
/// carries the installment marker when there is one.
fn render_ynab(transactions: &[Transaction]) -> Result<String, FaturaError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Date", "Payee", "Memo", "Amount"])
        .map_err(|e| FaturaError::Export(e.to_string()))?;

    for tx in transactions {
        let memo = tx
            .installment
            .map(|i| format!("parcela {i}"))
            .unwrap_or_default();
        writer
            .write_record([
                tx.date.format("%m/%d/%Y").to_string(),
                tx.description.clone(),
                memo,
                format_amount(-tx.amount_cents),
            ])
            .map_err(|e| FaturaError::Export(e.to_string()))?;
    }

    into_string(writer)
}

fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String, FaturaError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| FaturaError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| FaturaError::Export(e.to_string()))
}
