//! File naming conventions shared with the other modding tools.
//!
//! A host `DIR/NAME.EXT` keeps everything derived from it in `DIR/NAME_dir/`:
//! - MRG parts as `NAME_<n>.bin`,
//! - decompressed BPE ranges as `NAME_{<start>-<end>}.EXT`,
//! - their metadata sidecars under `meta/` with the same file name.
//!
use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;

use crate::error::{LodError, Result};

const DIR_SUFFIX: &str = "_dir";
const META_DIR: &str = "meta";
const BACKUP_EXT: &str = "orig";

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `DIR/NAME.EXT` -> `DIR/NAME_dir`
pub fn subfile_dir(host: &Path) -> PathBuf {
    let mut name = stem_of(host);
    name.push_str(DIR_SUFFIX);
    host.with_file_name(name)
}

/// Location of MRG part `n` of `container` inside `dir`.
pub fn part_path(dir: &Path, container: &Path, n: usize) -> PathBuf {
    dir.join(format!("{}_{}.bin", stem_of(container), n))
}

/// Location of the decompressed blocks `[start, end)` of `host`.
pub fn decompressed_path(host: &Path, start: u16, end: u16) -> PathBuf {
    let mut name = format!("{}_{{{}-{}}}", stem_of(host), start, end);
    if let Some(ext) = host.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    subfile_dir(host).join(name)
}

/// Sidecar metadata for a decompressed file.
pub fn metadata_path(decompressed: &Path) -> PathBuf {
    let name = decompressed.file_name().unwrap_or_default();
    decompressed
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(META_DIR)
        .join(name)
}

/// The host a decompressed file was taken from: `DIR/NAME_dir/x.EXT` -> `DIR/NAME.EXT`.
pub fn host_for_decompressed(decompressed: &Path) -> Option<PathBuf> {
    let dir = decompressed.parent()?;
    let dir_name = dir.file_name()?.to_string_lossy().into_owned();
    let stem = dir_name.strip_suffix(DIR_SUFFIX)?;
    let mut name = stem.to_string();
    if let Some(ext) = decompressed.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    Some(dir.with_file_name(name))
}

/// Subfile numbers of every `NAME_<n>.bin` part present in `dir`, sorted.
pub fn part_numbers(dir: &Path, container: &Path) -> Result<Vec<usize>> {
    let prefix = format!("{}_", stem_of(container)).to_uppercase();
    let mut nums = Vec::new();
    if !dir.is_dir() {
        return Ok(nums);
    }
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name().to_string_lossy().to_uppercase();
        let n = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".BIN"))
            .and_then(|n| n.parse::<usize>().ok());
        if let Some(n) = n {
            nums.push(n);
        }
    }
    nums.sort_unstable();
    Ok(nums)
}

/// Copy `path` to `path.orig` unless a backup already exists. Returns true if one was made.
/// Existing backups are never overwritten: they are the clean reference for later patches.
pub fn backup_file(path: &Path) -> Result<bool> {
    if !path.is_file() {
        return Err(LodError::NotFound(path.to_path_buf()));
    }
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(BACKUP_EXT);
    let backup = path.with_file_name(name);
    if backup.exists() {
        return Ok(false);
    }
    info!("Backing up {}", path.display());
    fs::copy(path, &backup)?;
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn naming_test() {
        let host = Path::new("game/OV_/S_ITEM.OV_");
        assert_eq!(subfile_dir(host), PathBuf::from("game/OV_/S_ITEM_dir"));
        let dec = decompressed_path(host, 0, 73);
        assert_eq!(dec, PathBuf::from("game/OV_/S_ITEM_dir/S_ITEM_{0-73}.OV_"));
        assert_eq!(
            metadata_path(&dec),
            PathBuf::from("game/OV_/S_ITEM_dir/meta/S_ITEM_{0-73}.OV_")
        );
        assert_eq!(host_for_decompressed(&dec), Some(host.to_path_buf()));
    }

    #[test]
    fn part_path_test() {
        let mrg = Path::new("SECT/DRGN21.BIN");
        let dir = subfile_dir(mrg);
        assert_eq!(dir, PathBuf::from("SECT/DRGN21_dir"));
        assert_eq!(
            part_path(&dir, mrg, 12),
            PathBuf::from("SECT/DRGN21_dir/DRGN21_12.bin")
        );
    }

    #[test]
    fn no_host_for_plain_dir() {
        assert_eq!(host_for_decompressed(Path::new("x/y/file.bin")), None);
    }
}
