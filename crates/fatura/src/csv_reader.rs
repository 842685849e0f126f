//! Raw-row recovery from issuer CSV exports.
//!
//! Issuer layouts vary: comma or semicolon delimiters, byte-order marks,
//! greeting/preamble lines before the header, footer and blank rows. The
//! reader recovers an ordered row list and leaves all value interpretation
//! to the mapper.

use csv::ReaderBuilder;

use crate::error::FaturaError;
use crate::model::{CsvSource, RawRow};

/// Reads CSV content into headers plus ordered raw rows.
///
/// The header is the first record whose cell count equals the maximum cell
/// count seen in the file; anything before it is preamble and dropped.
/// Blank records are skipped. Fails with `MalformedCsv` only when no record
/// has at least two cells.
pub fn read_csv(content: &str) -> Result<CsvSource, FaturaError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let delimiter = sniff_delimiter(content);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| FaturaError::MalformedCsv(e.to_string()))?;
        let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        records.push(cells);
    }

    let max_cells = records.iter().map(|r| r.len()).max().unwrap_or(0);
    if max_cells < 2 {
        return Err(FaturaError::MalformedCsv(
            "no row with at least two columns".to_string(),
        ));
    }

    // First row at full width is the header; earlier narrow rows are preamble.
    let header_idx = records
        .iter()
        .position(|r| r.len() == max_cells)
        .unwrap_or(0);

    let headers: Vec<String> = records[header_idx]
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let sep = (delimiter as char).to_string();
    let rows: Vec<RawRow> = records
        .into_iter()
        .skip(header_idx + 1)
        .map(|cells| RawRow {
            source: cells.join(&sep),
            cells,
        })
        .collect();

    Ok(CsvSource {
        delimiter,
        headers,
        rows,
    })
}

/// Picks `,` or `;` by counting occurrences over the first lines.
fn sniff_delimiter(content: &str) -> u8 {
    let mut commas = 0usize;
    let mut semicolons = 0usize;
    for line in content.lines().filter(|l| !l.trim().is_empty()).take(10) {
        commas += line.matches(',').count();
        semicolons += line.matches(';').count();
    }
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_delimited_with_header() {
        let source = read_csv("date,description,amount\n05/03/2024,PADARIA,10.50\n").unwrap();
        assert_eq!(source.delimiter, b',');
        assert_eq!(source.headers, vec!["date", "description", "amount"]);
        assert_eq!(source.rows.len(), 1);
        assert_eq!(source.rows[0].cells[1], "PADARIA");
    }

    #[test]
    fn test_semicolon_delimited() {
        let source =
            read_csv("data;lançamento;valor\n05/03/2024;PADARIA DONA MARIA;12,50\n").unwrap();
        assert_eq!(source.delimiter, b';');
        assert_eq!(source.headers[1], "lançamento");
        assert_eq!(source.rows[0].cells[2], "12,50");
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let source = read_csv("\u{feff}date,description,amount\n01/01/2024,X,1.00\n").unwrap();
        assert_eq!(source.headers[0], "date");
    }

    #[test]
    fn test_preamble_lines_before_header_are_skipped() {
        let content = "Fatura de março\n\nOlá cliente\ndata,lançamento,valor\n\
                       05/03/2024,PADARIA,\"10,50\"\n06/03/2024,MERCADO,\"20,00\"\n";
        let source = read_csv(content).unwrap();
        assert_eq!(source.headers, vec!["data", "lançamento", "valor"]);
        assert_eq!(source.rows.len(), 2);
        assert_eq!(source.rows[1].cells[2], "20,00");
    }

    #[test]
    fn test_blank_rows_are_skipped_not_errored() {
        let content = "date,description,amount\n01/01/2024,A,1.00\n,,\n\n02/01/2024,B,2.00\n";
        let source = read_csv(content).unwrap();
        assert_eq!(source.rows.len(), 2);
    }

    #[test]
    fn test_row_order_is_preserved() {
        let content = "date,description,amount\n03/01/2024,C,3.00\n01/01/2024,A,1.00\n\
                       02/01/2024,B,2.00\n";
        let source = read_csv(content).unwrap();
        let descriptions: Vec<&str> = source.rows.iter().map(|r| r.cells[1].as_str()).collect();
        assert_eq!(descriptions, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_header_only_yields_zero_rows() {
        let source = read_csv("date,description,amount\n").unwrap();
        assert!(source.rows.is_empty());
    }

    #[test]
    fn test_no_tabular_structure_is_malformed() {
        let err = read_csv("this is not a statement\njust prose\n").unwrap_err();
        assert!(matches!(err, FaturaError::MalformedCsv(_)));
    }
}
