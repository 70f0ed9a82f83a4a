//! Recursive unpacking of an MRG container: subfiles that are themselves containers are
//! extracted, compressed subfiles are decompressed, until only plain files are left.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rustc_hash::FxHashSet;

use crate::bpe::decompress::{decompress_file, DEFAULT_END_BLOCK};
use crate::error::Result;
use crate::mrg::extract::extract_files;
use crate::tools::classify::{FileKind, HEADER_PREFIX};
use crate::tools::paths::subfile_dir;

const META_DIR: &str = "meta";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnpackReport {
    pub containers: usize,
    pub decompressed: usize,
    /// Files left once nothing more could be unpacked.
    pub files: usize,
}

/// Every file and directory under `root`, directories listed parents first.
fn walk_tree(root: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
        dirs.push(dir);
    }
    files.sort();
    Ok((files, dirs))
}

/// Extract `container` and everything inside it. Files that fail to unpack are reported and
/// left as they are.
pub fn unpack(container: &Path, sector_padding: bool, delete_small: bool) -> Result<UnpackReport> {
    let root = subfile_dir(container);
    extract_files(container, sector_padding, &["*"], Some(root.as_path()))?;
    let mut report = UnpackReport {
        containers: 1,
        ..UnpackReport::default()
    };

    let mut failed: FxHashSet<PathBuf> = FxHashSet::default();
    loop {
        let mut finished = true;
        let (files, _) = walk_tree(&root)?;
        for file in files {
            if failed.contains(&file) {
                continue;
            }
            let len = fs::metadata(&file)?.len();
            if delete_small && len <= HEADER_PREFIX as u64 {
                debug!("Removing {} ({} bytes)", file.display(), len);
                fs::remove_file(&file)?;
                continue;
            }
            let outcome = match FileKind::of_file(&file)? {
                FileKind::Container => extract_files(&file, false, &["*"], None).map(|_| {
                    report.containers += 1;
                }),
                FileKind::CompressedStream => {
                    decompress_file(&file, 0, DEFAULT_END_BLOCK, false).and_then(|out| {
                        report.decompressed += 1;
                        match out.parent().map(|d| d.join(META_DIR)) {
                            Some(meta) if meta.is_dir() => fs::remove_dir_all(meta).map_err(Into::into),
                            _ => Ok(()),
                        }
                    })
                }
                FileKind::Unknown => continue,
            };
            match outcome {
                Ok(()) => {
                    fs::remove_file(&file)?;
                    finished = false;
                }
                Err(e) => {
                    warn!("Could not unpack {}: {}", file.display(), e);
                    failed.insert(file);
                }
            }
        }
        if finished {
            break;
        }
    }

    // Deepest directories first, so parents emptied by their children go too.
    let (files, dirs) = walk_tree(&root)?;
    for dir in dirs.iter().rev() {
        if fs::read_dir(dir)?.next().is_none() {
            fs::remove_dir(dir)?;
        }
    }
    report.files = files.len();
    info!(
        "Unpacked {}: {} containers, {} compressed files, {} files left",
        container.display(),
        report.containers,
        report.decompressed,
        report.files
    );
    Ok(report)
}
