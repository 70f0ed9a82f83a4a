//! The sidecar written next to every decompressed file.
//!
//! Layout, all little-endian:
//! `[u32 total decompressed size][u16 start block][u16 end block][u32 block size]*`
//! `[0xFFFFFFFF][u8 tie-break]*`
//!
//! The tie-break bytes are only present once a size-constrained compression has succeeded.

use std::fs;
use std::path::Path;

use log::debug;

use super::tie_break::TieBreak;
use crate::bytestream::{reader::ByteReader, writer::ByteWriter};
use crate::error::{LodError, Result};

const SIZES_END: u32 = 0xffff_ffff;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompressionMetadata {
    /// Total decompressed size of the whole stream, from its header.
    pub total_size: u32,
    pub start_block: u16,
    /// Block index at which decompression stopped.
    pub end_block: u16,
    /// Decompressed size of each block in `start_block..end_block`.
    pub block_sizes: Vec<u32>,
    /// Tie-break that produced each block the last time it fit.
    pub orders: Vec<TieBreak>,
}

impl CompressionMetadata {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bw = ByteWriter::new(12 + 4 * self.block_sizes.len() + self.orders.len());
        bw.out32(self.total_size);
        bw.out16(self.start_block);
        bw.out16(self.end_block);
        self.block_sizes.iter().for_each(|&s| bw.out32(s));
        bw.out32(SIZES_END);
        self.orders.iter().for_each(|o| bw.out8(o.as_u8()));
        bw.output
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let short = || LodError::Metadata("header too short".to_string());
        let mut br = ByteReader::new(data);
        let total_size = br.u32le().ok_or_else(short)?;
        let start_block = br.u16le().ok_or_else(short)?;
        let end_block = br.u16le().ok_or_else(short)?;

        let mut block_sizes = Vec::new();
        loop {
            match br.u32le() {
                Some(SIZES_END) => break,
                Some(size) => block_sizes.push(size),
                None => {
                    return Err(LodError::Metadata(
                        "block size list is not terminated".to_string(),
                    ))
                }
            }
        }

        let mut orders = Vec::new();
        while let Some(byte) = br.byte() {
            let order = TieBreak::from_u8(byte)
                .ok_or_else(|| LodError::Metadata(format!("unknown tie-break {}", byte)))?;
            orders.push(order);
        }

        Ok(Self {
            total_size,
            start_block,
            end_block,
            block_sizes,
            orders,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(LodError::NotFound(path.to_path_buf()));
        }
        debug!("Reading metadata {}", path.display());
        Self::from_bytes(&fs::read(path)?)
    }

    /// Write the sidecar, creating its directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout_test() {
        let meta = CompressionMetadata {
            total_size: 0x1234,
            start_block: 1,
            end_block: 3,
            block_sizes: vec![0x800, 0x10],
            orders: vec![TieBreak::LeftDescRightAsc, TieBreak::FirstSeen],
        };
        let bytes = meta.to_bytes();
        assert_eq!(
            bytes,
            vec![
                0x34, 0x12, 0, 0, 1, 0, 3, 0, 0, 8, 0, 0, 0x10, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 2,
                0
            ]
        );
        assert_eq!(CompressionMetadata::from_bytes(&bytes).unwrap(), meta);
    }

    #[test]
    fn bad_metadata_test() {
        assert!(CompressionMetadata::from_bytes(&[1, 2, 3]).is_err());
        assert!(CompressionMetadata::from_bytes(&[0, 0, 0, 0, 0, 0, 1, 0, 5, 0, 0, 0]).is_err());
        let unknown = [0, 0, 0, 0, 0, 0, 1, 0, 0xff, 0xff, 0xff, 0xff, 9];
        assert!(matches!(
            CompressionMetadata::from_bytes(&unknown),
            Err(LodError::Metadata(_))
        ));
    }
}
