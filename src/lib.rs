//! Tools for modding Legend of Dragoon game files.
//!
//! Version 0.1.0
//!
//! The game packs most of its data in two formats:
//! - BPE, a blocked byte-pair encoding used for overlays and the executable,
//! - MRG, a simple archive of subfiles with an offset/size table.
//!
//! This crate decompresses BPE data for editing and compresses it back, optionally keeping it
//! within its original size so it can go straight back on the disc. It also extracts MRG
//! subfiles and inserts edited ones, moving later subfiles when one grows.
//!
//! Basic usage to pull a file apart and put it back:
//!
//! `$> lodmod unpack DRGN0.BIN`
//!
//! `$> lodmod decompress OV_/S_ITEM.OV_`
//!
//! `$> lodmod compress --mod OV_/S_ITEM_dir/S_ITEM_{0-73}.OV_`
//!
pub mod bpe;
pub mod bytestream;
pub mod error;
pub mod mrg;
pub mod tools;
pub mod unpack;

pub use error::{LodError, Result};
