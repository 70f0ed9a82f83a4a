//! ByteReader: positioned little-endian reads over an in-memory host file.
//!
//! All reads return `None` when the data runs out; callers turn that into a
//! `LodError::Truncated` carrying `loc()`.
//!

/// Reads a host file held in memory.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new ByteReader positioned at the start of the buffer.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    /// Creates a new ByteReader positioned at `offset`.
    pub fn at(buffer: &'a [u8], offset: usize) -> Self {
        Self {
            buffer,
            cursor: offset.min(buffer.len()),
        }
    }

    /// Return the next byte, or None if there is no more data to read.
    pub fn byte(&mut self) -> Option<u8> {
        let byte = *self.buffer.get(self.cursor)?;
        self.cursor += 1;
        Some(byte)
    }

    /// Return the next n bytes as a slice, or None (without moving) if fewer than n remain.
    pub fn bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.cursor.checked_add(n)?;
        let slice = self.buffer.get(self.cursor..end)?;
        self.cursor = end;
        Some(slice)
    }

    /// Return the next little-endian u16.
    pub fn u16le(&mut self) -> Option<u16> {
        self.bytes(2).map(|b| u16::from_le_bytes([b[0], b[1]]))
    }

    /// Return the next little-endian u32.
    pub fn u32le(&mut self) -> Option<u32> {
        self.bytes(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Move the cursor forward to the next multiple of four (host relative).
    pub fn align4(&mut self) {
        let rem = self.cursor % 4;
        if rem != 0 {
            self.cursor = (self.cursor + 4 - rem).min(self.buffer.len());
        }
    }

    /// Read 4-byte words from the cursor until one equals `sig`. Returns the offset of the
    /// matching word and leaves the cursor just past it, or None if the data ran out.
    pub fn scan_word(&mut self, sig: &[u8; 4]) -> Option<usize> {
        while let Some(word) = self.bytes(4) {
            if word == sig {
                return Some(self.cursor - 4);
            }
        }
        None
    }

    /// Current absolute position in the host.
    pub fn loc(&self) -> usize {
        self.cursor
    }

    /// True when every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.cursor >= self.buffer.len()
    }
}

#[cfg(test)]
mod test {
    use super::ByteReader;

    #[test]
    fn byte_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = ByteReader::new(x);
        assert_eq!(br.byte(), Some(b'H'));
        assert_eq!(br.byte(), Some(b'e'));
        assert_eq!(br.loc(), 2);
    }

    #[test]
    fn bytes_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = ByteReader::new(x);
        assert_eq!(br.bytes(5), Some("Hello".as_bytes()));
        assert_eq!(br.bytes(50), None);
        assert_eq!(br.loc(), 5);
    }

    #[test]
    fn words_test() {
        let x = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xff];
        let mut br = ByteReader::new(&x);
        assert_eq!(br.u16le(), Some(0x1234));
        assert_eq!(br.u32le(), Some(0x1234_5678));
        assert_eq!(br.u32le(), None);
        assert_eq!(br.byte(), Some(0xff));
        assert!(br.is_empty());
    }

    #[test]
    fn align_test() {
        let x = [0_u8; 9];
        let mut br = ByteReader::at(&x, 5);
        br.align4();
        assert_eq!(br.loc(), 8);
        br.align4();
        assert_eq!(br.loc(), 8);
        br.byte();
        br.align4();
        assert_eq!(br.loc(), 9);
    }

    #[test]
    fn scan_test() {
        let x = b"\0\0\0\0BPE\x1a\x10\0\0\0BPE\x1a";
        let mut br = ByteReader::at(x, 8);
        assert_eq!(br.scan_word(b"BPE\x1a"), Some(12));
        assert_eq!(br.loc(), 16);
        assert_eq!(br.scan_word(b"BPE\x1a"), None);
    }
}
