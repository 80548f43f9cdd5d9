//! Content fingerprints
//!
//! A fingerprint is a SHA-256 digest over a file's raw bytes. It does not
//! look at PDF structure at all, so malformed files hash just as well as
//! valid ones. Files are streamed in fixed-size chunks rather than read into
//! memory.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Size of each read when hashing a file
pub const CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 digest of a file's bytes, used as a duplicate-detection key
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full lowercase hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 12 hex digits, for log lines and listings
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short())
    }
}

/// Compute the fingerprint of the file at `path`
///
/// # Example
///
/// ```no_run
/// use pdf_collate::fingerprint::fingerprint;
/// use std::path::Path;
///
/// let a = fingerprint(Path::new("a.pdf")).expect("hash a");
/// let b = fingerprint(Path::new("copy-of-a.pdf")).expect("hash b");
/// println!("same content: {}", a == b);
/// ```
pub fn fingerprint(path: &Path) -> Result<ContentHash> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| Error::load(path, e))?;
    let hash = fingerprint_reader(file).map_err(|e| Error::load(path, e))?;
    log::debug!("Fingerprinted {} as {}", path.display(), hash.short());
    Ok(hash)
}

/// Compute the fingerprint of everything `reader` yields
pub fn fingerprint_reader<R: Read>(mut reader: R) -> io::Result<ContentHash> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }

    Ok(ContentHash(hasher.finalize().into()))
}
