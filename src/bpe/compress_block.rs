use super::{dictionary::Dictionary, tie_break::TieBreak};
use crate::bytestream::writer::ByteWriter;
use crate::tools::freq_count::{freqs, pair_freqs};
use crate::tools::layout::WORD_SIZE;

/// A pair has to occur at least this often before it earns a dictionary key.
pub const MIN_PAIR_COUNT: u32 = 5;

/// One compressed block ready to be written into a stream, tagged with its position so
/// results from worker threads can be put back in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBlock {
    pub index: usize,
    pub order: TieBreak,
    /// Size prefix, dictionary instructions, payload and padding.
    pub data: Vec<u8>,
}

/// Repeatedly replace the most common pair with a key that does not occur in the block.
/// Returns the dictionary and the substituted payload.
pub fn build_dictionary(block: &[u8], order: TieBreak) -> (Dictionary, Vec<u8>) {
    let counts = freqs(block);
    // Keys absent from the block, lowest first; they are handed out from the top.
    // 0xFF is never used as a pair key.
    let mut free: Vec<u8> = (0..0xff_u8).filter(|&k| counts[k as usize] == 0).collect();

    let mut dict = Dictionary::new();
    let mut data = block.to_vec();
    while let Some(&key) = free.last() {
        let best = match order.best(&pair_freqs(&data)) {
            Some(best) if best.count >= MIN_PAIR_COUNT => best,
            _ => break,
        };
        free.pop();
        let (left, right) = best.pair;
        dict.set_pair(key, left, right);
        data = replace_pair(&data, best.pair, key);
    }
    (dict, data)
}

/// Replace non-overlapping occurrences of `pair`, scanning left to right.
fn replace_pair(data: &[u8], pair: (u8, u8), key: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if i + 1 < data.len() && (data[i], data[i + 1]) == pair {
            out.push(key);
            i += 2;
        } else {
            out.push(data[i]);
            i += 1;
        }
    }
    out
}

/// Compress one block of at most 0x800 bytes.
pub fn compress_block(index: usize, block: &[u8], order: TieBreak) -> EncodedBlock {
    let (dict, payload) = build_dictionary(block, order);
    let mut bw = ByteWriter::new(block.len() + 64);
    bw.out32(block.len() as u32);
    dict.write(&mut bw);
    bw.out_bytes(&payload);
    bw.pad_to(WORD_SIZE);
    EncodedBlock {
        index,
        order,
        data: bw.output,
    }
}
