//! Header sniffing. A host file is one of a closed set of kinds, decided from its first
//! eight bytes; callers dispatch on the result instead of probing formats one by one.

use std::{fmt::Display, fmt::Formatter, fs::File, io::Read, path::Path};

use crate::error::Result;

/// MRG container signature, at offset 0.
pub const MRG_SIGNATURE: &[u8; 4] = b"MRG\x1a";
/// BPE stream signature, at offset 4 (after the total-size word).
pub const BPE_SIGNATURE: &[u8; 4] = b"BPE\x1a";
/// Bytes needed to classify a file.
pub const HEADER_PREFIX: usize = 8;

/// What a file is, as far as its header can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Container,
    CompressedStream,
    Unknown,
}

impl FileKind {
    /// Classify from the start of a file. Containers are checked first since some of them
    /// hold compressed subfiles.
    pub fn classify(prefix: &[u8]) -> Self {
        if prefix.len() >= 4 && &prefix[0..4] == MRG_SIGNATURE {
            FileKind::Container
        } else if prefix.len() >= HEADER_PREFIX && &prefix[4..8] == BPE_SIGNATURE {
            FileKind::CompressedStream
        } else {
            FileKind::Unknown
        }
    }

    /// Classify a file on disk by reading only its header.
    pub fn of_file(path: &Path) -> Result<Self> {
        let mut prefix = Vec::with_capacity(HEADER_PREFIX);
        File::open(path)?
            .take(HEADER_PREFIX as u64)
            .read_to_end(&mut prefix)?;
        Ok(Self::classify(&prefix))
    }
}

impl Display for FileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Container => write!(f, "MRG container"),
            FileKind::CompressedStream => write!(f, "BPE stream"),
            FileKind::Unknown => write!(f, "unknown"),
        }
    }
}

#[test]
fn classify_test() {
    assert_eq!(FileKind::classify(b"MRG\x1a\x02\0\0\0"), FileKind::Container);
    assert_eq!(FileKind::classify(b"MRG\x1a"), FileKind::Container);
    assert_eq!(
        FileKind::classify(b"\x00\x10\0\0BPE\x1a"),
        FileKind::CompressedStream
    );
    assert_eq!(FileKind::classify(b"\x10\0\0\0\x01"), FileKind::Unknown);
    assert_eq!(FileKind::classify(b""), FileKind::Unknown);
}
