use log::trace;

use crate::bytestream::reader::ByteReader;
use crate::error::{LodError, Result};
use crate::tools::classify::MRG_SIGNATURE;
use crate::tools::layout::{SubfileSpan, SECTOR_SIZE};

/// Size of the signature plus the entry count.
pub const TABLE_START: usize = 8;
/// Size of one `[offset][size]` table entry.
pub const ENTRY_SIZE: usize = 8;

/// One subfile, remembering which table slot describes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LbaEntry {
    /// Offset of the entry in the table.
    pub table_pos: usize,
    /// Byte offset of the subfile.
    pub offset: usize,
    pub size: usize,
}

impl LbaEntry {
    pub fn span(&self) -> SubfileSpan {
        SubfileSpan::new(self.offset, self.size)
    }
}

/// The entries of an MRG table, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LbaTable {
    pub sector_padding: bool,
    pub entries: Vec<LbaEntry>,
}

impl LbaTable {
    /// Read the table at the start of `data`. Returns None when `data` is not an MRG container.
    pub fn read(data: &[u8], sector_padding: bool) -> Result<Option<Self>> {
        let mut br = ByteReader::new(data);
        match br.bytes(4) {
            Some(sig) if sig == MRG_SIGNATURE => {}
            _ => return Ok(None),
        }
        let count = br.u32le().ok_or(LodError::Truncated(br.loc()))? as usize;
        if TABLE_START + count.saturating_mul(ENTRY_SIZE) > data.len() {
            return Err(LodError::Truncated(data.len()));
        }

        let scale = if sector_padding { SECTOR_SIZE } else { 1 };
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let table_pos = br.loc();
            let offset = br.u32le().ok_or(LodError::Truncated(br.loc()))? as usize * scale;
            let size = br.u32le().ok_or(LodError::Truncated(br.loc()))? as usize;
            entries.push(LbaEntry {
                table_pos,
                offset,
                size,
            });
        }
        entries.sort_by_key(|e| (e.offset, e.size));
        trace!("MRG table with {} entries", entries.len());
        Ok(Some(Self {
            sector_padding,
            entries,
        }))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes taken by the signature, count and entries.
    pub fn table_len(&self) -> usize {
        TABLE_START + ENTRY_SIZE * self.entries.len()
    }

    /// Where subfile `n` lives. 0 is the table itself; None past the last entry.
    pub fn span(&self, n: usize) -> Option<SubfileSpan> {
        match n {
            0 => Some(SubfileSpan::new(0, self.table_len())),
            n => self.entries.get(n - 1).map(LbaEntry::span),
        }
    }

    /// Write every entry back to its slot in `data`.
    pub fn write(&self, data: &mut [u8]) {
        let scale = if self.sector_padding { SECTOR_SIZE } else { 1 };
        for entry in &self.entries {
            let offset = (entry.offset / scale) as u32;
            let pos = entry.table_pos;
            data[pos..pos + 4].copy_from_slice(&offset.to_le_bytes());
            data[pos + 4..pos + 8].copy_from_slice(&(entry.size as u32).to_le_bytes());
        }
    }
}
