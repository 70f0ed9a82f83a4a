//! The bytestream module forms the I/O subsystem for the BPE and MRG handlers.
//!
//! Everything in these formats is byte aligned and little endian, so unlike a bit-packed codec we
//! only need a cursor over a byte slice that knows its absolute position in the host file.
//! Positions matter: BPE blocks are re-aligned to a 4-byte boundary of the *host*, not of the
//! stream, and error reports quote host offsets.
//!
//! - reader: positioned reads of bytes and little-endian words, word alignment, signature scans.
//! - writer: output buffer with little-endian puts and 0x8C padding.
//!
pub mod reader;
pub mod writer;
