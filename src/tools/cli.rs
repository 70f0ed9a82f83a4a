use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use crate::bpe::compress::DEFAULT_MAX_ATTEMPTS;
use crate::bpe::decompress::DEFAULT_END_BLOCK;

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "BPE and MRG tools for Legend of Dragoon game files",
    long_about = "
    Decompresses and recompresses the game's byte-pair encoded (BPE) files and splits MRG
    archives into their subfiles and back again.

    Recompressed files can be held to their original size so they drop back into the disc
    image without moving anything else."
)]
pub struct Args {
    /// Sets verbosity. -v0 is silent, -v5 is chatty
    #[clap(short = 'v', default_value_t = 3)]
    v: u8,

    #[clap(subcommand)]
    command: Command,
}

/// What to do, and to which file.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Decompress a BPE file, or a BPE stream embedded in a larger file
    Decompress {
        file: PathBuf,
        /// First block to keep
        #[clap(short, long, default_value_t = 0)]
        start: u16,
        /// Block to stop at
        #[clap(short, long, default_value_t = DEFAULT_END_BLOCK)]
        end: u16,
        /// The stream is embedded in the file rather than starting it
        #[clap(short = 'b', long)]
        subfile: bool,
    },
    /// Compress a decompressed file back into the file it came from
    Compress {
        file: PathBuf,
        /// Host to write into, when not found by name
        #[clap(long)]
        host: Option<PathBuf>,
        /// The stream is embedded in the host rather than starting it
        #[clap(short = 'b', long)]
        subfile: bool,
        /// Keep the compressed blocks within their original size
        #[clap(short, long = "mod")]
        mod_mode: bool,
        /// Attempt limit when keeping the original size
        #[clap(short, long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        attempts: u32,
        /// Seed for the tie-break search
        #[clap(long)]
        seed: Option<u64>,
        /// Remove the decompressed files afterwards
        #[clap(short, long)]
        delete: bool,
    },
    /// Extract subfiles from an MRG container
    Extract {
        file: PathBuf,
        /// Offsets in the table are counted in 0x800 byte sectors
        #[clap(short, long)]
        padding: bool,
        /// Subfiles to extract: *, n, or a-b
        #[clap(default_value = "*")]
        selection: Vec<String>,
    },
    /// Insert subfiles back into an MRG container
    Insert {
        file: PathBuf,
        /// Offsets in the table are counted in 0x800 byte sectors
        #[clap(short, long)]
        padding: bool,
        /// Subfiles to insert: *, n, or a-b
        #[clap(default_value = "*")]
        selection: Vec<String>,
        /// Remove the extracted subfiles afterwards
        #[clap(short, long)]
        delete: bool,
    },
    /// Extract an MRG container, then everything inside it, until only plain files remain
    Unpack {
        file: PathBuf,
        /// Offsets in the outer table are counted in 0x800 byte sectors
        #[clap(short, long)]
        padding: bool,
        /// Remove extracted files of 8 bytes or less
        #[clap(long)]
        delete_small: bool,
    },
    /// Report what kind of file each input is
    Identify { files: Vec<PathBuf> },
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Decompress { .. } => "Decompress",
            Command::Compress { .. } => "Compress",
            Command::Extract { .. } => "Extract",
            Command::Insert { .. } => "Insert",
            Command::Unpack { .. } => "Unpack",
            Command::Identify { .. } => "Identify",
        };
        write!(f, "{}", name)
    }
}

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn from_level(v: u8) -> Self {
        match v {
            0 => Verbosity::Quiet,
            1 => Verbosity::Errors,
            2 => Verbosity::Warnings,
            3 => Verbosity::Info,
            4 => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }

    pub fn level_filter(self) -> log::LevelFilter {
        match self {
            Verbosity::Quiet => log::LevelFilter::Off,
            Verbosity::Errors => log::LevelFilter::Error,
            Verbosity::Warnings => log::LevelFilter::Warn,
            Verbosity::Info => log::LevelFilter::Info,
            Verbosity::Debug => log::LevelFilter::Debug,
            Verbosity::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug)]
pub struct LodOpts {
    /// Operation requested on the command line
    pub command: Command,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl LodOpts {
    pub fn from_args(args: Args) -> Self {
        Self {
            command: args.command,
            verbose: Verbosity::from_level(args.v),
        }
    }
}

/// Parse the command line, set the log level and report the settings.
pub fn init_lod_opts() -> LodOpts {
    let opts = LodOpts::from_args(Args::parse());
    log::set_max_level(opts.verbose.level_filter());

    info!("---- lodmod Initialization Start ----");
    info!("Verbosity: {:?}", opts.verbose);
    info!("Command: {}", opts.command);
    info!("---- lodmod Initialization End ----");
    opts
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_extract_test() {
        let args = Args::parse_from(["lodmod", "extract", "-p", "DRGN0.BIN", "1", "3-5"]);
        let opts = LodOpts::from_args(args);
        assert_eq!(opts.verbose, Verbosity::Info);
        assert_eq!(
            opts.command,
            Command::Extract {
                file: PathBuf::from("DRGN0.BIN"),
                padding: true,
                selection: vec!["1".to_string(), "3-5".to_string()],
            }
        );
    }

    #[test]
    fn parse_defaults_test() {
        let args = Args::parse_from(["lodmod", "-v", "5", "insert", "S_ITEM.OV_"]);
        let opts = LodOpts::from_args(args);
        assert_eq!(opts.verbose, Verbosity::Trace);
        assert_eq!(
            opts.command,
            Command::Insert {
                file: PathBuf::from("S_ITEM.OV_"),
                padding: false,
                selection: vec!["*".to_string()],
                delete: false,
            }
        );

        let args = Args::parse_from(["lodmod", "compress", "-m", "--seed", "9", "a_dir/a.BIN"]);
        match LodOpts::from_args(args).command {
            Command::Compress {
                mod_mode,
                attempts,
                seed,
                host,
                ..
            } => {
                assert!(mod_mode);
                assert_eq!(attempts, DEFAULT_MAX_ATTEMPTS);
                assert_eq!(seed, Some(9));
                assert_eq!(host, None);
            }
            other => panic!("unexpected command {}", other),
        }
    }
}
