//! The tools module provides helper functions shared by the BPE and MRG handlers.
//!
//! The tools are:
//! - classify: Header sniffing to tell containers, compressed streams and plain files apart.
//! - cli: Command line interface for lodmod.
//! - freq_count: Byte-pair frequency counting for dictionary construction.
//! - layout: Spans, alignment and padding constants common to both formats.
//! - paths: Naming conventions for extracted/decompressed files, and backups.
//! - selection: Parsing of subfile selections ("*", "3", "5-9").
//!
pub mod classify;
pub mod cli;
pub mod freq_count;
pub mod layout;
pub mod paths;
pub mod selection;
