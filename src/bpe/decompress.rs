//! BPE decompression, and the "dry run" used by the compressor to find where a block range
//! sits inside its host.
//!
//! Blocks before `start` are decoded but not kept; decoding stops at the size prefix of block
//! `end`, or at the stream terminator, whichever comes first.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::{dictionary::Dictionary, metadata::CompressionMetadata};
use crate::bytestream::reader::ByteReader;
use crate::error::{LodError, Result};
use crate::tools::{
    classify::BPE_SIGNATURE,
    layout::SECTOR_SIZE,
    paths::{decompressed_path, metadata_path},
};

/// End block used when none (or a nonsensical one) is given.
pub const DEFAULT_END_BLOCK: u16 = 512;
/// Largest decompressed size of a single block.
pub const MAX_BLOCK_SIZE: usize = SECTOR_SIZE;

/// Where things are inside a host, as found by walking its BPE stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLayout {
    /// Offset of the total-size word.
    pub stream_start: usize,
    /// Total decompressed size from the stream header.
    pub total_size: u32,
    /// Offset of the first selected block's size prefix.
    pub region_start: usize,
    /// Offset where the walk stopped: the size prefix of the end block, or the terminator.
    pub region_end: usize,
    /// Decompressed size of each selected block.
    pub block_sizes: Vec<u32>,
    /// Block index at which the walk stopped.
    pub end_block: u16,
}

/// A decompressed block range along with its sidecar and position in the host.
#[derive(Debug)]
pub struct Decompressed {
    pub data: Vec<u8>,
    pub metadata: CompressionMetadata,
    pub layout: StreamLayout,
}

/// Offset of the stream header. A standalone stream starts at offset 0; an embedded one is
/// found by scanning aligned words for the signature.
pub fn locate_stream(host: &[u8], embedded: bool) -> Result<usize> {
    if !embedded {
        return match host.get(4..8) {
            Some(sig) if sig == BPE_SIGNATURE => Ok(0),
            _ => Err(LodError::BadSignature("BPE")),
        };
    }
    let mut br = ByteReader::new(host);
    while let Some(found) = br.scan_word(BPE_SIGNATURE) {
        if found >= 4 {
            debug!("BPE stream found at 0x{:08x}", found - 4);
            return Ok(found - 4);
        }
    }
    Err(LodError::BadSignature("BPE"))
}

/// Decode one block whose size prefix has already been read. Output goes to `out` when given;
/// otherwise the block is only parsed. The last symbol is always expanded in full, so a block
/// may produce slightly more than `size` bytes, but never more than `size + MAX_BLOCK_SIZE`.
pub fn decompress_block(
    br: &mut ByteReader<'_>,
    block: usize,
    size: u32,
    mut out: Option<&mut Vec<u8>>,
) -> Result<()> {
    let dict = Dictionary::read(br)?;
    let mut remaining = size as usize;
    let mut stack = Vec::with_capacity(64);
    while remaining > 0 {
        let byte = br.byte().ok_or(LodError::Truncated(br.loc()))?;
        let emitted = dict
            .expand(byte, &mut stack, remaining + MAX_BLOCK_SIZE, |b| {
                if let Some(o) = out.as_mut() {
                    o.push(b);
                }
            })
            .map_err(|e| match e {
                LodError::CyclicDictionary(_) => LodError::CyclicDictionary(block),
                LodError::Overexpansion(_) => LodError::Overexpansion(block),
                e => e,
            })?;
        remaining = remaining.saturating_sub(emitted);
    }
    Ok(())
}

/// Walk the stream, decoding blocks `[start, end)` into `out` when given.
fn walk(
    host: &[u8],
    start: u16,
    end: u16,
    embedded: bool,
    mut out: Option<&mut Vec<u8>>,
) -> Result<StreamLayout> {
    let end = if end <= start {
        warn!(
            "End block {} is not after start block {}, using {}",
            end, start, DEFAULT_END_BLOCK
        );
        DEFAULT_END_BLOCK
    } else {
        end
    };
    let (start, end) = (start as usize, end as usize);

    let stream_start = locate_stream(host, embedded)?;
    let mut br = ByteReader::at(host, stream_start);
    let total_size = br.u32le().ok_or(LodError::Truncated(br.loc()))?;
    br.bytes(4).ok_or(LodError::Truncated(br.loc()))?;

    let mut block = 0_usize;
    let mut region_start = None;
    let mut block_sizes = Vec::new();
    let region_end = loop {
        let prefix_at = br.loc();
        if block == start {
            region_start = Some(prefix_at);
        }
        let size = match br.u32le() {
            None | Some(0) => break prefix_at,
            Some(size) => size,
        };
        if size as usize > MAX_BLOCK_SIZE {
            return Err(LodError::InvalidBlockSize {
                size,
                offset: prefix_at,
            });
        }
        if block >= end {
            break prefix_at;
        }
        let keep = block >= start;
        if keep {
            block_sizes.push(size);
        }
        decompress_block(&mut br, block, size, if keep { out.as_deref_mut() } else { None })?;
        br.align4();
        block += 1;
    };

    Ok(StreamLayout {
        stream_start,
        total_size,
        region_start: region_start.unwrap_or(region_end),
        region_end,
        block_sizes,
        end_block: u16::try_from(block).unwrap_or(u16::MAX),
    })
}

/// Find the block range `[start, end)` in `host` without keeping any output.
pub fn scan_layout(host: &[u8], start: u16, end: u16, embedded: bool) -> Result<StreamLayout> {
    walk(host, start, end, embedded, None)
}

/// Decompress blocks `[start, end)` of the stream in `host`.
pub fn decompress(host: &[u8], start: u16, end: u16, embedded: bool) -> Result<Decompressed> {
    let mut data = Vec::with_capacity(MAX_BLOCK_SIZE * 16);
    let layout = walk(host, start, end, embedded, Some(&mut data))?;
    let metadata = CompressionMetadata {
        total_size: data.len() as u32,
        start_block: start,
        end_block: layout.end_block,
        block_sizes: layout.block_sizes.clone(),
        orders: Vec::new(),
    };
    Ok(Decompressed {
        data,
        metadata,
        layout,
    })
}

/// Decompress a file into `NAME_dir/NAME_{start-end}.EXT` and write its sidecar.
/// Returns the path of the decompressed file.
pub fn decompress_file(path: &Path, start: u16, end: u16, embedded: bool) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(LodError::NotFound(path.to_path_buf()));
    }
    info!("Decompressing {}", path.display());
    let host = fs::read(path)?;
    let result = decompress(&host, start, end, embedded)?;

    let out_path = decompressed_path(path, start, result.metadata.end_block);
    if let Some(dir) = out_path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&out_path, &result.data)?;
    result.metadata.save(&metadata_path(&out_path))?;
    info!(
        "Decompressed blocks {}-{} to {} ({} bytes)",
        start,
        result.metadata.end_block,
        out_path.display(),
        result.data.len()
    );
    Ok(out_path)
}
