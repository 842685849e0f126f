//! Transaction-row recovery from statement PDFs.
//!
//! Opening, decryption and page accounting go through `lopdf`; text comes
//! out of `pdf-extract`. Row reconstruction from the extracted text is a
//! line-based heuristic kept behind `extract_rows()` so it can be tested
//! against captured page text and swapped without touching the mapper.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::FaturaError;
use crate::model::{PdfSource, RawRow, StatementSummary};
use crate::normalize::{self, StatementPeriod};

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{2}/\d{2}(?:/\d{4})?)\s+").expect("date pattern"))
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"((?:-\s*)?\d{1,3}(?:\.\d{3})*,\d{2})\s*$").expect("amount pattern")
    })
}

fn installment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{1,2}/\d{1,2})\s+((?:-\s*)?\d{1,3}(?:\.\d{3})*,\d{2})\s*$")
            .expect("installment pattern")
    })
}

fn total_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Total\s+desta\s+fatura\s+(-?\s?\d{1,3}(?:\.\d{3})*,\d{2})")
            .expect("total pattern")
    })
}

fn payment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Pagamento\s+efetuado\s+em\s+(\d{2}/\d{2}/\d{4})[\s-]+(\d{1,3}(?:\.\d{3})*,\d{2})")
            .expect("payment pattern")
    })
}

fn statement_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Emissão\s*:?\s*(\d{2}/\d{2}/\d{4})").expect("emissão pattern"))
}

fn due_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Vencimento\s*:?\s*(\d{2}/\d{2}/\d{4})").expect("vencimento pattern")
    })
}

/// Opens a statement PDF and recovers raw transaction rows.
///
/// Encrypted documents need `password`; a missing or wrong one fails with
/// `PdfDecryption` so callers can prompt and retry instead of treating it
/// as a parse failure.
pub fn read_pdf(bytes: &[u8], password: Option<&str>) -> Result<PdfSource, FaturaError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| FaturaError::UnsupportedInputType(format!("not a readable PDF: {e}")))?;
    let page_count = doc.get_pages().len();

    let text = if doc.is_encrypted() {
        let password = password.ok_or_else(|| {
            FaturaError::PdfDecryption("document is encrypted and no password was supplied".into())
        })?;
        pdf_extract::extract_text_from_mem_encrypted(bytes, password).map_err(|e| {
            FaturaError::PdfDecryption(format!("could not decrypt with the supplied password: {e}"))
        })?
    } else {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| FaturaError::UnsupportedInputType(format!("PDF text extraction failed: {e}")))?
    };

    let summary = read_summary(&text);
    let period = detect_statement_period(&summary);

    Ok(PdfSource {
        page_count,
        period,
        summary,
        rows: extract_rows(&text),
    })
}

/// Reconstructs raw rows from extracted page text.
///
/// A transaction line starts with a `DD/MM` (or `DD/MM/YYYY`) token and
/// ends with a Brazilian-format amount; an optional `NN/NN` installment
/// marker sits right before the amount. Everything else (headers, card
/// banners, totals, summary pages) matches nothing and contributes zero
/// rows. Cell order is fixed: date, description, amount, installment.
pub fn extract_rows(text: &str) -> Vec<RawRow> {
    let mut rows = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(date_match) = date_re().captures(line) else {
            continue;
        };
        let date = date_match[1].to_string();
        let rest = line[date_match[0].len()..].trim();

        let (description, amount, installment) = if let Some(caps) = installment_re().captures(rest)
        {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            (rest[..start].trim(), caps[2].to_string(), caps[1].to_string())
        } else if let Some(caps) = amount_re().captures(rest) {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            (rest[..start].trim(), caps[1].to_string(), String::new())
        } else {
            continue;
        };

        // Subtotal remnants and stray markers produce empty descriptions.
        if description.len() < 2 {
            continue;
        }

        rows.push(RawRow {
            cells: vec![date, description.to_string(), amount, installment],
            source: line.to_string(),
        });
    }

    rows
}

/// Reads the figures the statement declares about itself on the summary
/// page. All fields optional; issuers differ in what they print.
pub fn read_summary(text: &str) -> StatementSummary {
    let mut summary = StatementSummary::default();

    if let Some(caps) = total_re().captures(text) {
        summary.total_cents = normalize::parse_amount(&caps[1]).ok();
    }
    if let Some(caps) = payment_re().captures(text) {
        summary.payment_cents = normalize::parse_amount(&caps[2]).ok();
    }
    if let Some(caps) = statement_date_re().captures(text) {
        summary.statement_date = normalize::parse_date(&caps[1], None).ok();
    }
    if let Some(caps) = due_date_re().captures(text) {
        summary.due_date = normalize::parse_date(&caps[1], None).ok();
    }

    summary
}

/// Derives the reference period for `DD/MM` year inference: the emission
/// date when printed, otherwise the due date.
pub fn detect_statement_period(summary: &StatementSummary) -> Option<StatementPeriod> {
    use chrono::Datelike;

    summary
        .statement_date
        .or(summary.due_date)
        .map(|d| StatementPeriod::new(d.year(), d.month()))
}
