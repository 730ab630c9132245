//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] computes two content fingerprints:
//!
//! - **Quick hash**: the first and last [`QUICK_HASH_SAMPLE`] bytes of a file
//!   plus its decimal size. Cheap; only used to rule out files that cannot
//!   match.
//! - **Full hash**: the whole file, streamed in [`HASH_CHUNK_SIZE`] chunks so
//!   memory stays bounded regardless of file size.
//!
//! Both are content identities, not security primitives.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use super::HashError;

/// A 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Bytes sampled from each end of a file for the quick hash.
pub const QUICK_HASH_SAMPLE: usize = 1024;

/// Read buffer size for streaming full hashes.
pub const HASH_CHUNK_SIZE: usize = 8 * 1024;

/// Streaming content hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    chunk_size: usize,
    sample_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default chunk and sample sizes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: HASH_CHUNK_SIZE,
            sample_size: QUICK_HASH_SAMPLE,
        }
    }

    /// Set the streaming chunk size (minimum 1 byte).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the number of bytes sampled from each end for the quick hash.
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }

    /// Streaming chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Compute the quick fingerprint of a file.
    ///
    /// Hashes the first `sample_size` bytes, then the last `sample_size`
    /// bytes when the file is larger than twice the sample, then the file
    /// size as decimal text. Files of different sizes never collide.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the file cannot be opened or read.
    pub fn quick_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let mut file = open(path)?;
        let size = file
            .metadata()
            .map_err(|e| HashError::from_io(path, e))?
            .len();

        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.sample_size];

        let head = read_up_to(&mut file, &mut buffer).map_err(|e| HashError::from_io(path, e))?;
        hasher.update(&buffer[..head]);

        let sample = self.sample_size as u64;
        if size > sample * 2 {
            file.seek(SeekFrom::End(-(self.sample_size as i64)))
                .map_err(|e| HashError::from_io(path, e))?;
            let tail =
                read_up_to(&mut file, &mut buffer).map_err(|e| HashError::from_io(path, e))?;
            hasher.update(&buffer[..tail]);
        }

        hasher.update(size.to_string().as_bytes());
        Ok(*hasher.finalize().as_bytes())
    }

    /// Compute the full-content hash of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let mut file = open(path)?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            }
        }

        Ok(*hasher.finalize().as_bytes())
    }
}

fn open(path: &Path) -> Result<File, HashError> {
    File::open(path).map_err(|e| HashError::from_io(path, e))
}

/// Fill as much of `buf` as the reader allows, stopping at EOF.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Render a hash as lowercase hexadecimal.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_full_hash_identical_content() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.bin", b"same bytes");
        let b = write(&dir, "b.bin", b"same bytes");
        let c = write(&dir, "c.bin", b"diff bytes");

        let hasher = Hasher::new();
        assert_eq!(hasher.full_hash(&a).unwrap(), hasher.full_hash(&b).unwrap());
        assert_ne!(hasher.full_hash(&a).unwrap(), hasher.full_hash(&c).unwrap());
    }

    #[test]
    fn test_full_hash_matches_blake3_reference() {
        let dir = TempDir::new().unwrap();
        let content: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        let path = write(&dir, "big.bin", &content);

        let hasher = Hasher::new().with_chunk_size(1000);
        assert_eq!(
            hasher.full_hash(&path).unwrap(),
            *blake3::hash(&content).as_bytes()
        );
    }

    #[test]
    fn test_quick_hash_ignores_middle_bytes() {
        let dir = TempDir::new().unwrap();
        let mut first = vec![7u8; 10_000];
        let mut second = first.clone();
        first[5_000] = 1;
        second[5_000] = 2;
        let a = write(&dir, "a.bin", &first);
        let b = write(&dir, "b.bin", &second);

        let hasher = Hasher::new();
        assert_eq!(hasher.quick_hash(&a).unwrap(), hasher.quick_hash(&b).unwrap());
        assert_ne!(hasher.full_hash(&a).unwrap(), hasher.full_hash(&b).unwrap());
    }

    #[test]
    fn test_quick_hash_sees_tail_bytes() {
        let dir = TempDir::new().unwrap();
        let mut first = vec![0u8; 4_000];
        let mut second = first.clone();
        first[3_999] = 1;
        second[3_999] = 2;
        let a = write(&dir, "a.bin", &first);
        let b = write(&dir, "b.bin", &second);

        let hasher = Hasher::new();
        assert_ne!(hasher.quick_hash(&a).unwrap(), hasher.quick_hash(&b).unwrap());
    }

    #[test]
    fn test_quick_hash_includes_size() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.bin", b"");
        let b = write(&dir, "b.bin", b"x");

        let hasher = Hasher::new();
        assert_ne!(hasher.quick_hash(&a).unwrap(), hasher.quick_hash(&b).unwrap());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let hasher = Hasher::new();
        let err = hasher
            .full_hash(Path::new("/nonexistent/file/12345.bin"))
            .unwrap_err();
        assert!(matches!(err, HashError::NotFound(_)));
    }

    #[test]
    fn test_hash_to_hex() {
        let hash = *blake3::hash(b"hello").as_bytes();
        let hex = hash_to_hex(&hash);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(hash_to_hex(&[0xab; 32]), "ab".repeat(32));
    }
}
