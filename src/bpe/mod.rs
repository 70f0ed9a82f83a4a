//! The bpe module handles the game's blocked byte-pair encoding.
//!
//! A BPE stream starts with an eight byte header: the total decompressed size (u32 LE) followed by
//! the signature `BPE\x1a`. Blocks follow, each holding at most 0x800 decompressed bytes:
//! - a u32 LE decompressed size (zero ends the stream),
//! - instructions for filling out a 256 entry byte-pair dictionary,
//! - the compressed bytes, each of which expands through the dictionary,
//! - 0x8C padding up to the next word boundary.
//!
//! Decompression is single threaded and also records the per-block sizes in a metadata sidecar.
//! The compressor needs those sizes to put block boundaries back where they were, since the game
//! loads some blocks into fixed RAM locations.
//!
//! Compression rebuilds a dictionary for every block by repeatedly replacing the most common byte
//! pair with a free key. Ties between equally common pairs can be broken five different ways, and
//! the choice changes the compressed size. When a mod has to fit in the original space the
//! compressor retries with different tie-breaks until it fits, or gives up and leaves the host
//! untouched. Blocks are independent, so large files are compressed on a thread pool.
//!
pub mod compress;
pub mod compress_block;
pub mod decompress;
pub mod dictionary;
pub mod metadata;
pub mod tie_break;
