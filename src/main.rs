//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::fs;
use std::path::Path;

use log::{error, info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use lodmod::bpe::compress::{compress_file, CompressOptions};
use lodmod::bpe::decompress::decompress_file;
use lodmod::mrg::{extract::extract_files, insert::insert_files};
use lodmod::tools::classify::FileKind;
use lodmod::tools::cli::{init_lod_opts, Command};
use lodmod::tools::paths::{backup_file, host_for_decompressed, subfile_dir};
use lodmod::unpack::unpack;
use lodmod::Result;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    // Available log levels are Error, Warn, Info, Debug, Trace
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not start logging: {}", e);
    }

    let options = init_lod_opts();
    if let Err(e) = run(options.command) {
        if e.is_format() {
            error!("{} (nothing was changed)", e);
        } else {
            error!("{}", e);
        }
        std::process::exit(1);
    }
    info!("Done.");
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Decompress {
            file,
            start,
            end,
            subfile,
        } => {
            let out = decompress_file(&file, start, end, subfile)?;
            println!("{}", out.display());
        }
        Command::Compress {
            file,
            host,
            subfile,
            mod_mode,
            attempts,
            seed,
            delete,
        } => {
            let opts = CompressOptions {
                max_attempts: attempts,
                seed,
                ..CompressOptions::new(mod_mode, subfile)
            };
            if let Some(target) = host.clone().or_else(|| host_for_decompressed(&file)) {
                backup_file(&target)?;
            }
            let report = compress_file(&file, host.as_deref(), &opts)?;
            println!(
                "Original size: {}, new size: {}",
                report.original_size, report.new_size
            );
            if delete {
                remove_dir_of(&file)?;
            }
        }
        Command::Extract {
            file,
            padding,
            selection,
        } => {
            let report = extract_files(&file, padding, &selection, None)?;
            for path in &report.written {
                println!("{}", path.display());
            }
        }
        Command::Insert {
            file,
            padding,
            selection,
            delete,
        } => {
            backup_file(&file)?;
            let report = insert_files(&file, padding, &selection, None)?;
            println!("Inserted {} subfiles", report.inserted.len());
            if delete {
                let dir = subfile_dir(&file);
                if dir.is_dir() {
                    fs::remove_dir_all(dir)?;
                }
            }
        }
        Command::Unpack {
            file,
            padding,
            delete_small,
        } => {
            let report = unpack(&file, padding, delete_small)?;
            println!("{} files unpacked", report.files);
        }
        Command::Identify { files } => {
            for file in files {
                match FileKind::of_file(&file) {
                    Ok(kind) => println!("{}: {}", file.display(), kind),
                    Err(e) => warn!("{}: {}", file.display(), e),
                }
            }
        }
    }
    Ok(())
}

/// Remove the directory holding a decompressed file, metadata included.
fn remove_dir_of(file: &Path) -> Result<()> {
    if let Some(dir) = file.parent().filter(|d| d.is_dir()) {
        info!("Removing {}", dir.display());
        fs::remove_dir_all(dir)?;
    }
    Ok(())
}
