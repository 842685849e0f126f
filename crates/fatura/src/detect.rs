use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::FaturaError;
use crate::model::InputKind;

/// Decides whether a file goes down the CSV or the PDF path.
///
/// Resolution order: explicit override, then file extension, then content
/// sniffing (`%PDF-` magic bytes; delimiter-bearing text means CSV). Fails
/// with `UnsupportedInputType` when none of the signals resolve.
pub fn detect_input_kind(
    path: &Path,
    explicit: Option<InputKind>,
) -> Result<InputKind, FaturaError> {
    if let Some(kind) = explicit {
        return Ok(kind);
    }

    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        match ext.to_lowercase().as_str() {
            "csv" => return Ok(InputKind::Csv),
            "pdf" => return Ok(InputKind::Pdf),
            _ => {}
        }
    }

    sniff_content(path)
}

fn sniff_content(path: &Path) -> Result<InputKind, FaturaError> {
    let mut prefix = [0u8; 512];
    let read = {
        let mut file = File::open(path)?;
        file.read(&mut prefix)?
    };
    let prefix = &prefix[..read];

    if prefix.starts_with(b"%PDF-") {
        return Ok(InputKind::Pdf);
    }

    // Plausible CSV: decodable text with at least one delimiter and newline.
    if let Ok(text) = std::str::from_utf8(prefix) {
        if text.contains('\n') && (text.contains(',') || text.contains(';')) {
            return Ok(InputKind::Csv);
        }
    }

    Err(FaturaError::UnsupportedInputType(format!(
        "{}: unknown extension and unrecognized content",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_by_extension() {
        let kind = detect_input_kind(Path::new("fatura.CSV"), None).unwrap();
        assert_eq!(kind, InputKind::Csv);

        let kind = detect_input_kind(Path::new("fatura.pdf"), None).unwrap();
        assert_eq!(kind, InputKind::Pdf);
    }

    #[test]
    fn test_explicit_override_wins() {
        let kind = detect_input_kind(Path::new("fatura.pdf"), Some(InputKind::Csv)).unwrap();
        assert_eq!(kind, InputKind::Csv);
    }

    #[test]
    fn test_sniff_pdf_magic_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"%PDF-1.4\nrest of the document").unwrap();
        drop(file);

        assert_eq!(detect_input_kind(&path, None).unwrap(), InputKind::Pdf);
    }

    #[test]
    fn test_sniff_delimited_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement");
        std::fs::write(&path, "data;valor\n05/03/2024;10,00\n").unwrap();

        assert_eq!(detect_input_kind(&path, None).unwrap(), InputKind::Csv);
    }

    #[test]
    fn test_unresolvable_content_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.xlsx");
        std::fs::write(&path, [0x50u8, 0x4b, 0x03, 0x04]).unwrap();

        assert!(matches!(
            detect_input_kind(&path, None),
            Err(FaturaError::UnsupportedInputType(_))
        ));
    }
}
