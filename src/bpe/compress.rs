//! File-level BPE compression and the attempt scheduler.
//!
//! One attempt re-encodes every block of the decompressed data and splices the result into a
//! copy of the host in place of the original block range. Under the `Original` ceiling attempts
//! repeat with different tie-breaks until the new range is no larger than the old one. The host
//! passed in is only replaced once an attempt is accepted.

use std::fs;
use std::path::Path;
use std::sync::mpsc;

use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use super::{
    compress_block::{compress_block, EncodedBlock},
    decompress::{scan_layout, MAX_BLOCK_SIZE},
    metadata::CompressionMetadata,
    tie_break::TieBreak,
};
use crate::error::{LodError, Result};
use crate::tools::paths::{host_for_decompressed, metadata_path};

/// Above this many blocks, encoding is spread over a thread pool.
pub const PARALLEL_XPOINT: usize = 15;
/// Default attempt limit for files larger than one block.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;
/// Files of a single block only get one try per tie-break ordering.
const SMALL_FILE_ATTEMPTS: u32 = 5;
/// Blocks past this one are only checked for the stream end.
const STREAM_END_SEARCH: u16 = u16::MAX;

/// How large the recompressed block range is allowed to get.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCeiling {
    /// No larger than the range it replaces. Needed whenever something follows the stream.
    Original,
    /// Any size. One attempt is made.
    Unbounded,
}

#[derive(Debug, Clone)]
pub struct CompressOptions {
    pub ceiling: SizeCeiling,
    /// The stream sits inside a larger host rather than at offset 0.
    pub embedded: bool,
    pub max_attempts: u32,
    pub parallel_threshold: usize,
    /// Seed for the tie-break RNG. Entropy when None.
    pub seed: Option<u64>,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            ceiling: SizeCeiling::Unbounded,
            embedded: false,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            parallel_threshold: PARALLEL_XPOINT,
            seed: None,
        }
    }
}

impl CompressOptions {
    /// Options for a plain or mod-mode compression. Embedded streams always keep the
    /// original size since the rest of the host follows them.
    pub fn new(mod_mode: bool, embedded: bool) -> Self {
        let ceiling = if mod_mode || embedded {
            SizeCeiling::Original
        } else {
            SizeCeiling::Unbounded
        };
        Self {
            ceiling,
            embedded,
            ..Self::default()
        }
    }
}

/// Outcome of an accepted compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressReport {
    pub original_size: usize,
    pub new_size: usize,
    pub attempts: u32,
    pub orders: Vec<TieBreak>,
}

/// Result of one attempt, not yet accepted.
#[derive(Debug)]
pub struct Attempt {
    pub host: Vec<u8>,
    pub original_size: usize,
    pub new_size: usize,
    pub orders: Vec<TieBreak>,
}

/// Cut the decompressed data back into blocks. Block `i` keeps its original size while
/// `i < sizes.len() - 1`; the last original block and anything added after it go in 0x800 byte
/// chunks. No empty blocks are produced, since a zero size ends the stream.
pub fn split_blocks<'a>(data: &'a [u8], sizes: &[u32]) -> Vec<&'a [u8]> {
    let fixed = sizes.len().saturating_sub(1);
    let mut blocks = Vec::with_capacity(sizes.len().max(data.len() / MAX_BLOCK_SIZE + 1));
    let mut rest = data;
    for &size in &sizes[..fixed] {
        if rest.is_empty() {
            break;
        }
        let (block, tail) = rest.split_at((size as usize).min(rest.len()));
        blocks.push(block);
        rest = tail;
    }
    blocks.extend(rest.chunks(MAX_BLOCK_SIZE));
    blocks
}

/// Encode every block with its ordering. Results come back in block order.
pub fn encode_blocks(
    blocks: &[&[u8]],
    orders: &[TieBreak],
    parallel_threshold: usize,
) -> Result<Vec<EncodedBlock>> {
    if blocks.len() <= parallel_threshold {
        return Ok(blocks
            .iter()
            .zip(orders)
            .enumerate()
            .map(|(i, (block, &order))| compress_block(i, block, order))
            .collect());
    }

    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    debug!("Encoding {} blocks on {} threads", blocks.len(), threads);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;

    let (tx, rx) = mpsc::channel();
    let jobs: Vec<_> = blocks
        .iter()
        .zip(orders)
        .enumerate()
        .map(|(i, (&block, &order))| (i, block, order, tx.clone()))
        .collect();
    drop(tx);
    pool.scope(move |s| {
        for (i, block, order, tx) in jobs {
            s.spawn(move |_| {
                // The receiver outlives the scope, so a send can only fail if we are unwinding.
                let _ = tx.send(compress_block(i, block, order));
            });
        }
    });

    let mut encoded: Vec<EncodedBlock> = rx.into_iter().collect();
    encoded.sort_by_key(|b| b.index);
    Ok(encoded)
}

/// One attempt: encode `data` with the given orders and splice it into a copy of `host` over
/// the block range described by `meta`.
pub fn compress_attempt(
    host: &[u8],
    data: &[u8],
    meta: &CompressionMetadata,
    orders: &[TieBreak],
    opts: &CompressOptions,
) -> Result<Attempt> {
    let layout = scan_layout(host, meta.start_block, meta.end_block, opts.embedded)?;
    let blocks = split_blocks(data, &meta.block_sizes);
    let encoded = encode_blocks(&blocks, orders, opts.parallel_threshold)?;

    let new_size: usize = encoded.iter().map(|b| b.data.len()).sum();
    let original_size = layout.region_end - layout.region_start;

    let mut out = Vec::with_capacity(host.len() + new_size);
    out.extend_from_slice(&host[..layout.region_start]);
    let total = i64::from(layout.total_size) + data.len() as i64 - i64::from(meta.total_size);
    let total = u32::try_from(total.max(0)).unwrap_or(u32::MAX);
    out[layout.stream_start..layout.stream_start + 4].copy_from_slice(&total.to_le_bytes());
    encoded.iter().for_each(|b| out.extend_from_slice(&b.data));

    let tail = &host[layout.region_end..];
    if opts.embedded && new_size < original_size {
        // Zero fill after the stream terminator so whatever follows the stream stays put.
        let stream_end = scan_layout(host, 0, STREAM_END_SEARCH, true)?.region_end;
        let keep = (stream_end + 4).min(host.len()).saturating_sub(layout.region_end);
        out.extend_from_slice(&tail[..keep]);
        out.resize(out.len() + original_size - new_size, 0);
        out.extend_from_slice(&tail[keep..]);
    } else {
        out.extend_from_slice(tail);
    }

    Ok(Attempt {
        host: out,
        original_size,
        new_size,
        orders: encoded.iter().map(|b| b.order).collect(),
    })
}

/// Compress `data` back into `host`, retrying as the ceiling requires. On success `host` is
/// replaced and `meta` is brought up to date with the blocks just written, so the next
/// compression finds the whole new range. Under the `Original` ceiling the winning orders are
/// stored too. On failure `host` and `meta` are untouched.
pub fn compress(
    host: &mut Vec<u8>,
    data: &[u8],
    meta: &mut CompressionMetadata,
    opts: &CompressOptions,
) -> Result<CompressReport> {
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let constrained = opts.ceiling == SizeCeiling::Original;
    let block_sizes: Vec<u32> = split_blocks(data, &meta.block_sizes)
        .iter()
        .map(|b| b.len() as u32)
        .collect();
    let block_count = block_sizes.len();
    let mut attempt: u32 = if constrained { 1 } else { 0 };
    let mut previous: Option<(usize, usize)> = None;

    loop {
        if constrained {
            match previous {
                Some((original, new)) => info!(
                    "Attempt {}/{} (previous: original size {}, new size {})",
                    attempt, opts.max_attempts, original, new
                ),
                None => info!("Attempt {}/{}", attempt, opts.max_attempts),
            }
        }

        let orders: Vec<TieBreak> = (0..block_count)
            .map(|i| match meta.orders.get(i) {
                Some(&known) if constrained && attempt == 1 => known,
                _ => TieBreak::choose(attempt, &mut rng),
            })
            .collect();

        // Every attempt starts from the untouched host.
        let result = compress_attempt(host, data, meta, &orders, opts)?;

        if !constrained || result.new_size <= result.original_size {
            info!(
                "Original size: {}, new size: {}",
                result.original_size, result.new_size
            );
            meta.total_size = u32::try_from(data.len()).unwrap_or(u32::MAX);
            meta.end_block = u16::try_from(block_count)
                .map_or(u16::MAX, |n| meta.start_block.saturating_add(n));
            meta.block_sizes = block_sizes;
            meta.orders = if constrained {
                result.orders.clone()
            } else {
                Vec::new()
            };
            *host = result.host;
            return Ok(CompressReport {
                original_size: result.original_size,
                new_size: result.new_size,
                attempts: attempt.max(1),
                orders: result.orders,
            });
        }

        let may_retry = if data.len() > MAX_BLOCK_SIZE {
            attempt < opts.max_attempts
        } else {
            attempt <= SMALL_FILE_ATTEMPTS
        };
        if !may_retry {
            warn!(
                "Could not compress to original size ({} > {}), host left unchanged",
                result.new_size, result.original_size
            );
            return Err(LodError::SizeExceeded {
                original: result.original_size,
                new: result.new_size,
                attempts: attempt,
            });
        }
        previous = Some((result.original_size, result.new_size));
        attempt += 1;
    }
}

/// Compress a decompressed file back into its host. The host is found from the naming
/// convention unless given. The host file and the sidecar are only rewritten when compression
/// succeeds.
pub fn compress_file(
    decompressed: &Path,
    host: Option<&Path>,
    opts: &CompressOptions,
) -> Result<CompressReport> {
    if !decompressed.is_file() {
        return Err(LodError::NotFound(decompressed.to_path_buf()));
    }
    let host_path = match host {
        Some(h) => h.to_path_buf(),
        None => host_for_decompressed(decompressed)
            .ok_or_else(|| LodError::NotFound(decompressed.to_path_buf()))?,
    };
    if !host_path.is_file() {
        return Err(LodError::NotFound(host_path));
    }

    let meta_path = metadata_path(decompressed);
    let mut meta = CompressionMetadata::load(&meta_path)?;
    let data = fs::read(decompressed)?;
    let mut host_data = fs::read(&host_path)?;
    info!(
        "Compressing {} into {}",
        decompressed.display(),
        host_path.display()
    );

    let report = compress(&mut host_data, &data, &mut meta, opts)?;
    fs::write(&host_path, &host_data)?;
    meta.save(&meta_path)?;
    Ok(report)
}
