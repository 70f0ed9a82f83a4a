use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while reading or writing BPE streams and MRG containers.
///
/// Format errors leave the source untouched and are never retried. `SizeExceeded` is only
/// returned after the host bytes have been restored.
#[derive(Error, Debug)]
pub enum LodError {
    /// Expected signature was not found where the format requires it.
    #[error("{0} signature not found")]
    BadSignature(&'static str),

    /// A block size prefix larger than 0x800.
    #[error("0x{size:08x} at offset 0x{offset:08x} is an invalid block size")]
    InvalidBlockSize { size: u32, offset: usize },

    /// Ran out of data in the middle of a structure.
    #[error("unexpected end of data at offset 0x{0:08x}")]
    Truncated(usize),

    /// A dictionary whose pairs refer back to themselves.
    #[error("cyclic byte-pair dictionary in block {0}")]
    CyclicDictionary(usize),

    /// A block whose symbols expand to far more bytes than its size prefix allows.
    #[error("block {0} expands past its declared size")]
    Overexpansion(usize),

    /// Malformed metadata sidecar.
    #[error("bad metadata: {0}")]
    Metadata(String),

    /// Compression could not get under the size ceiling.
    #[error("could not compress to original size ({new} > {original} bytes after {attempts} attempts)")]
    SizeExceeded {
        original: usize,
        new: usize,
        attempts: u32,
    },

    /// Requested subfile index is not in the table, or its part file is missing.
    #[error("subfile {index} not available: {reason}")]
    MissingIndex { index: usize, reason: String },

    /// A file that should exist does not.
    #[error("file {} not found", .0.display())]
    NotFound(PathBuf),

    /// Worker pool for block compression could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LodError {
    /// True for the errors that mean "this file is not what we expected".
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            LodError::BadSignature(_)
                | LodError::InvalidBlockSize { .. }
                | LodError::Truncated(_)
                | LodError::CyclicDictionary(_)
                | LodError::Overexpansion(_)
                | LodError::Metadata(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LodError>;
