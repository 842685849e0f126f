//! Column-role detection.
//!
//! Issuer layouts are described declaratively: one synonym list per role,
//! resolved in a deterministic order (exact match pass, then substring
//! pass, headers scanned left to right). New issuer headers are added to
//! the tables; the mapper never grows issuer-specific branches.

/// Header synonyms per role, Portuguese first since that is what faturas
/// actually print.
const DATE_HEADERS: &[&str] = &[
    "data",
    "date",
    "data da compra",
    "data de compra",
    "data mov.",
    "data mov",
    "dt. compra",
];

const DESCRIPTION_HEADERS: &[&str] = &[
    "descrição",
    "descricao",
    "description",
    "estabelecimento",
    "lançamento",
    "lancamento",
    "histórico",
    "historico",
    "movimentação",
    "movimentacao",
    "title",
];

const AMOUNT_HEADERS: &[&str] = &[
    "valor",
    "valor (r$)",
    "valor em r$",
    "valor_brl",
    "amount",
    "montante",
    "quantia",
    "value",
];

const INSTALLMENT_HEADERS: &[&str] = &["parcela", "parcelas", "parcelamento", "installment"];

/// Resolved cell indices for the fields a `Transaction` needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub description: usize,
    pub amount: usize,
    pub installment: Option<usize>,
}

/// Matches headers against the synonym tables. Returns `None` when either
/// the date or the amount column cannot be named, which sends the mapper
/// down the positional path.
pub fn resolve(headers: &[String]) -> Option<ColumnMap> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    let date = find_role(&normalized, DATE_HEADERS, &[])?;
    let amount = find_role(&normalized, AMOUNT_HEADERS, &[date])?;
    let description = find_role(&normalized, DESCRIPTION_HEADERS, &[date, amount])
        // Three columns but no recognizable description header: take the
        // first column not already claimed.
        .or_else(|| (0..headers.len()).find(|i| *i != date && *i != amount))?;
    let installment = find_role(&normalized, INSTALLMENT_HEADERS, &[date, amount, description]);

    Some(ColumnMap {
        date,
        description,
        amount,
        installment,
    })
}

/// Positional fallback for headerless rows: the order the PDF extractor
/// emits cells in.
pub fn positional(cell_count: usize) -> ColumnMap {
    ColumnMap {
        date: 0,
        description: 1,
        amount: 2,
        installment: if cell_count >= 4 { Some(3) } else { None },
    }
}

fn find_role(headers: &[String], synonyms: &[&str], taken: &[usize]) -> Option<usize> {
    // Exact pass first so "data" beats "data limite" style collisions.
    for (idx, header) in headers.iter().enumerate() {
        if !taken.contains(&idx) && synonyms.contains(&header.as_str()) {
            return Some(idx);
        }
    }
    for (idx, header) in headers.iter().enumerate() {
        if !taken.contains(&idx) && synonyms.iter().any(|s| header.contains(s)) {
            return Some(idx);
        }
    }
    None
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_english_headers() {
        let map = resolve(&headers(&["date", "description", "amount"])).unwrap();
        assert_eq!(map.date, 0);
        assert_eq!(map.description, 1);
        assert_eq!(map.amount, 2);
        assert_eq!(map.installment, None);
    }

    #[test]
    fn test_resolve_portuguese_headers_any_order() {
        let map = resolve(&headers(&["Valor", "Estabelecimento", "Data"])).unwrap();
        assert_eq!(map.amount, 0);
        assert_eq!(map.description, 1);
        assert_eq!(map.date, 2);
    }

    #[test]
    fn test_resolve_substring_headers() {
        let map = resolve(&headers(&["Data da compra", "Lançamento", "Valor em R$"])).unwrap();
        assert_eq!(map.date, 0);
        assert_eq!(map.description, 1);
        assert_eq!(map.amount, 2);
    }

    #[test]
    fn test_resolve_installment_column() {
        let map = resolve(&headers(&["data", "lançamento", "parcela", "valor"])).unwrap();
        assert_eq!(map.installment, Some(2));
        assert_eq!(map.amount, 3);
    }

    #[test]
    fn test_unnamed_description_falls_back_to_unclaimed_column() {
        let map = resolve(&headers(&["data", "loja", "valor"])).unwrap();
        assert_eq!(map.description, 1);
    }

    #[test]
    fn test_unrecognizable_headers_return_none() {
        assert!(resolve(&headers(&["05/03/2024", "PADARIA", "10,50"])).is_none());
    }

    #[test]
    fn test_positional_fallback() {
        let map = positional(3);
        assert_eq!((map.date, map.description, map.amount), (0, 1, 2));
        assert_eq!(map.installment, None);
        assert_eq!(positional(4).installment, Some(3));
    }
}
