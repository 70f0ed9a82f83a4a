//! ByteWriter: assembles BPE blocks and container regions in memory before they are spliced
//! into a host file.
//!

use crate::tools::layout::PAD_BYTE;

/// Output buffer for little-endian data.
#[derive(Debug, Default)]
pub struct ByteWriter {
    /// Output buffer.
    pub output: Vec<u8>,
}

impl ByteWriter {
    /// Create a new ByteWriter with room for `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
        }
    }

    /// Put a byte on the stream.
    pub fn out8(&mut self, data: u8) {
        self.output.push(data);
    }

    /// Put a little-endian u16 on the stream.
    pub fn out16(&mut self, data: u16) {
        self.output.extend_from_slice(&data.to_le_bytes());
    }

    /// Put a little-endian u32 on the stream.
    pub fn out32(&mut self, data: u32) {
        self.output.extend_from_slice(&data.to_le_bytes());
    }

    /// Put a run of bytes on the stream.
    pub fn out_bytes(&mut self, data: &[u8]) {
        self.output.extend_from_slice(data);
    }

    /// Pad with PAD_BYTE until the length is a multiple of `align`.
    pub fn pad_to(&mut self, align: usize) {
        let rem = self.output.len() % align;
        if rem != 0 {
            self.output
                .resize(self.output.len() + align - rem, PAD_BYTE);
        }
    }
}
