//! The 256 entry byte-pair dictionary used by every BPE block.
//!
//! Every key starts out as a literal standing for itself. A block's instructions turn some keys
//! into pairs of other keys. Expansion is done with an explicit stack, and a dictionary that
//! would expand forever, or past a byte budget, is reported rather than followed.
//!
//! Instruction format, with a fill cursor starting at key 0:
//! - control < 0x80: fill `control + 1` entries from the cursor,
//! - control >= 0x80: move the cursor forward by `control - 0x7F`, then fill one entry.
//!
//! Filling key k reads one byte l. If l == k the key stays a literal, otherwise a second byte r
//! is read and k becomes the pair (l, r). The build ends when the cursor passes 0xFF.

use crate::bytestream::{reader::ByteReader, writer::ByteWriter};
use crate::error::{LodError, Result};
use crate::tools::layout::SECTOR_SIZE;

/// Number of keys in a dictionary.
pub const DICT_SIZE: usize = 0x100;
/// Largest control byte that starts a sequential run.
const MAX_RUN_CONTROL: u8 = 0x7f;
/// Longest run one control byte can describe.
const MAX_RUN: usize = MAX_RUN_CONTROL as usize + 1;
/// Longest cursor move one jump control can describe.
const MAX_JUMP: usize = 0xff - MAX_RUN_CONTROL as usize;
/// An acyclic dictionary never needs a deeper expansion stack than this.
const MAX_STACK: usize = DICT_SIZE + 1;
/// Byte budget for resolving a single key outside of a block.
const MAX_RESOLVE: usize = 2 * SECTOR_SIZE;

/// What one key stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Literal,
    Pair(u8, u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    entries: [Entry; DICT_SIZE],
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    /// A dictionary where every key is a literal.
    pub fn new() -> Self {
        Self {
            entries: [Entry::Literal; DICT_SIZE],
        }
    }

    pub fn get(&self, key: u8) -> Entry {
        self.entries[key as usize]
    }

    /// Make `key` expand to `left` followed by `right`.
    pub fn set_pair(&mut self, key: u8, left: u8, right: u8) {
        debug_assert!(key != left && key != right);
        self.entries[key as usize] = Entry::Pair(left, right);
    }

    pub fn is_pair(&self, key: usize) -> bool {
        matches!(self.entries[key], Entry::Pair(..))
    }

    /// Number of keys holding pairs.
    pub fn pair_count(&self) -> usize {
        (0..DICT_SIZE).filter(|&k| self.is_pair(k)).count()
    }

    /// Build a dictionary from the instruction stream at the reader's position.
    pub fn read(br: &mut ByteReader<'_>) -> Result<Self> {
        let mut dict = Self::new();
        let mut key = 0_usize;
        while key < DICT_SIZE {
            let control = br.byte().ok_or(LodError::Truncated(br.loc()))?;
            let fill = if control > MAX_RUN_CONTROL {
                key += (control - MAX_RUN_CONTROL) as usize;
                1
            } else {
                control as usize + 1
            };
            if key >= DICT_SIZE {
                break;
            }
            for _ in 0..fill {
                let left = br.byte().ok_or(LodError::Truncated(br.loc()))?;
                if key != left as usize {
                    let right = br.byte().ok_or(LodError::Truncated(br.loc()))?;
                    // A run may spill past the last key; those bytes are consumed and dropped.
                    if key < DICT_SIZE {
                        dict.entries[key] = Entry::Pair(left, right);
                    }
                }
                key += 1;
            }
        }
        Ok(dict)
    }

    /// Serialize the dictionary as build instructions. Only pairs are written; literal keys are
    /// stepped over with jumps, or written as single bytes when that keeps a run going.
    pub fn write(&self, bw: &mut ByteWriter) {
        let mut key = 0_usize;
        loop {
            match (key..DICT_SIZE).find(|&k| self.is_pair(k)) {
                // No pairs left: jump the cursor past the end of the dictionary.
                None => {
                    let remaining = DICT_SIZE - key;
                    if remaining == 0 {
                        break;
                    }
                    if remaining <= MAX_JUMP {
                        bw.out8(MAX_RUN_CONTROL + remaining as u8);
                        break;
                    }
                    key = self.write_jump(bw, key, MAX_JUMP);
                }
                // A pair at the cursor starts a sequential run.
                Some(pair) if pair == key => {
                    let len = self.run_len(key);
                    bw.out8((len - 1) as u8);
                    (key..key + len).for_each(|k| self.write_entry(bw, k));
                    key += len;
                }
                Some(pair) => {
                    key = self.write_jump(bw, key, (pair - key).min(MAX_JUMP));
                }
            }
        }
    }

    /// Jump `distance` keys from `key` and fill the entry landed on. Returns the new cursor.
    fn write_jump(&self, bw: &mut ByteWriter, key: usize, distance: usize) -> usize {
        bw.out8(MAX_RUN_CONTROL + distance as u8);
        self.write_entry(bw, key + distance);
        key + distance + 1
    }

    /// Length of the run starting at `key` (a pair). Single literals between pairs cost one byte
    /// inside a run, the same as the jump that would skip them, so they are bridged.
    fn run_len(&self, key: usize) -> usize {
        let mut end = key;
        while end < DICT_SIZE && end - key < MAX_RUN {
            if self.is_pair(end) {
                end += 1;
            } else if end + 1 < DICT_SIZE && self.is_pair(end + 1) && end + 2 - key <= MAX_RUN {
                end += 2;
            } else {
                break;
            }
        }
        end - key
    }

    fn write_entry(&self, bw: &mut ByteWriter, key: usize) {
        match self.entries[key] {
            Entry::Literal => bw.out8(key as u8),
            Entry::Pair(left, right) => {
                bw.out8(left);
                bw.out8(right);
            }
        }
    }

    /// Expand one compressed byte, calling `emit` for every literal in order, and return how
    /// many were emitted. Fails if the expansion does not terminate or would emit more than
    /// `limit` bytes.
    pub fn expand<F: FnMut(u8)>(
        &self,
        byte: u8,
        stack: &mut Vec<u8>,
        limit: usize,
        mut emit: F,
    ) -> Result<usize> {
        let mut emitted = 0_usize;
        stack.clear();
        stack.push(byte);
        while let Some(key) = stack.pop() {
            match self.entries[key as usize] {
                Entry::Literal => {
                    if emitted == limit {
                        return Err(LodError::Overexpansion(0));
                    }
                    emit(key);
                    emitted += 1;
                }
                Entry::Pair(left, right) => {
                    if stack.len() >= MAX_STACK {
                        return Err(LodError::CyclicDictionary(0));
                    }
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        Ok(emitted)
    }

    /// The literal bytes a key stands for.
    pub fn resolve(&self, key: u8) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        self.expand(key, &mut stack, MAX_RESOLVE, |b| out.push(b))?;
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip(dict: &Dictionary) -> (Dictionary, usize) {
        let mut bw = ByteWriter::new(64);
        dict.write(&mut bw);
        let mut br = ByteReader::new(&bw.output);
        let read = Dictionary::read(&mut br).unwrap();
        assert!(br.is_empty(), "instructions not fully consumed");
        (read, bw.output.len())
    }

    #[test]
    fn all_literal_test() {
        let dict = Dictionary::new();
        let mut bw = ByteWriter::new(4);
        dict.write(&mut bw);
        // jump 0x80 onto key 0x80 (literal), then jump off the end
        assert_eq!(bw.output, vec![0xff, 0x80, 0xfe]);
        assert_eq!(round_trip(&dict).0, dict);
    }

    #[test]
    fn read_run_and_jump_test() {
        // run of 2 from key 0: key 0 literal, key 1 = (2, 3); jump 0x40 to key 0x42 = (1, 1);
        // jump 0x80 to key 0xc3 (literal), then jump off the end
        let data = [
            0x01, 0x00, 0x02, 0x03, 0xbf, 0x01, 0x01, 0xff, 0xc3, 0xbb, 0xaa,
        ];
        let mut br = ByteReader::new(&data);
        let dict = Dictionary::read(&mut br).unwrap();
        assert_eq!(dict.get(0), Entry::Literal);
        assert_eq!(dict.get(1), Entry::Pair(2, 3));
        assert_eq!(dict.get(0x42), Entry::Pair(1, 1));
        assert_eq!(dict.pair_count(), 2);
        assert_eq!(br.loc(), 10);
    }

    #[test]
    fn truncated_test() {
        let mut br = ByteReader::new(&[0x05, 0x00]);
        assert!(matches!(
            Dictionary::read(&mut br),
            Err(LodError::Truncated(_))
        ));
    }

    #[test]
    fn write_round_trip_test() {
        let mut dict = Dictionary::new();
        // scattered pairs, adjacent pairs, pairs separated by one literal, and the top keys
        for (k, l, r) in [
            (0x00, 1, 2),
            (0x05, 6, 7),
            (0x06, 0, 5),
            (0x08, 9, 9),
            (0x90, 1, 1),
            (0xfe, 0x90, 0x06),
            (0xff, 0xfe, 0xfe),
        ] {
            dict.set_pair(k, l, r);
        }
        assert_eq!(round_trip(&dict).0, dict);
    }

    #[test]
    fn dense_round_trip_test() {
        let mut dict = Dictionary::new();
        for k in 0x10..0xf0 {
            if k % 7 != 0 {
                dict.set_pair(k as u8, 1, 2);
            }
        }
        let (read, _) = round_trip(&dict);
        assert_eq!(read, dict);
    }

    #[test]
    fn resolve_test() {
        let mut dict = Dictionary::new();
        dict.set_pair(0x41, 0x10, 0x20);
        dict.set_pair(0x42, 0x41, 0x41);
        assert_eq!(dict.resolve(0x10).unwrap(), vec![0x10]);
        assert_eq!(dict.resolve(0x42).unwrap(), vec![0x10, 0x20, 0x10, 0x20]);
    }

    #[test]
    fn cyclic_test() {
        let mut dict = Dictionary::new();
        dict.set_pair(1, 2, 0);
        dict.set_pair(2, 1, 0);
        assert!(matches!(
            dict.resolve(1),
            Err(LodError::CyclicDictionary(_))
        ));
    }

    #[test]
    fn expansion_limit_test() {
        // every key doubles the one below it, so key n expands to 2^n bytes
        let mut dict = Dictionary::new();
        for k in 1..=0xff_u8 {
            dict.set_pair(k, k - 1, k - 1);
        }
        let mut stack = Vec::new();
        assert_eq!(dict.expand(3, &mut stack, 8, |_| ()).unwrap(), 8);
        assert!(matches!(
            dict.expand(4, &mut stack, 8, |_| ()),
            Err(LodError::Overexpansion(_))
        ));
        assert!(matches!(
            dict.resolve(0x30),
            Err(LodError::Overexpansion(_))
        ));
    }
}
