//! Content hashing for batch-mode file identity.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::FaturaError;

/// SHA-256 of raw bytes as lowercase hex. Pure and deterministic; batch
/// mode uses it to recognize files across repeated runs.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 of a file's raw bytes.
pub fn file_sha256(path: &Path) -> Result<String, FaturaError> {
    Ok(sha256_hex(&fs::read(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_deterministic_over_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "date,description,amount\n").unwrap();
        fs::write(&b, "date,description,amount\n").unwrap();

        assert_eq!(file_sha256(&a).unwrap(), file_sha256(&b).unwrap());
        assert_eq!(sha256_hex(b""), sha256_hex(b""));
        assert_ne!(sha256_hex(b"a"), sha256_hex(b"b"));
    }
}
