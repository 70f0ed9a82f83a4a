//! The mrg module splits MRG containers into subfiles and writes them back.
//!
//! An MRG file starts with `MRG\x1a`, a u32 entry count N, then N `[u32 offset][u32 size]`
//! entries, then the subfile data. Some containers on the disc count offsets in 0x800 byte
//! sectors ("sector padding") and keep every subfile sector aligned; the rest count bytes and
//! align subfiles to four bytes. Gaps are filled with 0x8C.
//!
//! Subfiles are numbered from 1 in file order. Number 0 refers to the table itself.
//!
//! Writing back either rebuilds the whole container, when every subfile is available, or
//! patches the selected subfiles in place and shifts whatever follows a subfile that outgrew
//! its space.
//!
pub mod extract;
pub mod insert;
pub mod table;
