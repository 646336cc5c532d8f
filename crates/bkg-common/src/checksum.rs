//! Checksum utilities for download traceability
//!
//! Downloaded payloads are digested before they are written into the cache
//! root so that a run log always records exactly which upstream bytes it
//! processed.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Compute the SHA-256 digest of a byte slice as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute the SHA-256 digest of a file as lowercase hex
pub fn sha256_file(path: impl AsRef<Path>) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sha256_hex() {
        let digest = sha256_hex(b"hello world");
        assert_eq!(digest, "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9");
    }

    #[test]
    fn test_sha256_file_matches_slice_digest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();

        let digest = sha256_file(file.path()).unwrap();
        assert_eq!(digest, sha256_hex(b"hello world"));
    }

    #[test]
    fn test_sha256_file_missing() {
        let result = sha256_file("/nonexistent/path/to/file");
        assert!(result.is_err());
    }
}
