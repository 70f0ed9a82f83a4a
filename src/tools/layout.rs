//! Offset and size bookkeeping used by both the BPE and MRG handlers.

/// Filler byte the game uses between blocks and subfiles.
pub const PAD_BYTE: u8 = 0x8c;
/// Size of a CD sector, and of the largest decompressed BPE block.
pub const SECTOR_SIZE: usize = 0x800;
/// Word size used for non-sector alignment.
pub const WORD_SIZE: usize = 4;

/// Round `value` up to the next multiple of `align`.
pub fn align_up(value: usize, align: usize) -> usize {
    match value % align {
        0 => value,
        rem => value + align - rem,
    }
}

/// A `(start, len)` view into a host file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubfileSpan {
    pub start: usize,
    pub len: usize,
}

impl SubfileSpan {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// One past the last byte of the span.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Borrow the span from `host`, clamped to the host length.
    pub fn slice<'a>(&self, host: &'a [u8]) -> &'a [u8] {
        let start = self.start.min(host.len());
        let end = self.end().min(host.len());
        &host[start..end]
    }

    /// Length rounded up to the allocation unit of the container.
    pub fn allocation(&self, sector_padding: bool) -> usize {
        if sector_padding {
            align_up(self.len, SECTOR_SIZE)
        } else {
            align_up(self.len, WORD_SIZE)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn align_up_test() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(5, 4), 8);
        assert_eq!(align_up(0x800, SECTOR_SIZE), 0x800);
        assert_eq!(align_up(0x801, SECTOR_SIZE), 0x1000);
    }

    #[test]
    fn span_test() {
        let host = [0_u8, 1, 2, 3, 4, 5];
        let span = SubfileSpan::new(4, 8);
        assert_eq!(span.end(), 12);
        assert_eq!(span.slice(&host), &[4, 5]);
        assert_eq!(SubfileSpan::new(0, 5).allocation(false), 8);
        assert_eq!(SubfileSpan::new(0, 5).allocation(true), 0x800);
    }
}
