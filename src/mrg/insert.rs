//! Writing subfiles back into an MRG container.
//!
//! The container is edited in memory and written out once at the end.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::table::LbaTable;
use crate::error::{LodError, Result};
use crate::tools::{
    layout::{align_up, PAD_BYTE, SECTOR_SIZE, WORD_SIZE},
    paths::{part_numbers, part_path, subfile_dir},
    selection::{parse_selection, selects_all},
};

/// What an insertion changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InsertReport {
    pub inserted: Vec<usize>,
    pub skipped: Vec<usize>,
    /// The container was rebuilt from scratch rather than patched.
    pub rebuilt: bool,
}

fn alignment(sector_padding: bool) -> usize {
    if sector_padding {
        SECTOR_SIZE
    } else {
        WORD_SIZE
    }
}

/// Copy `bytes` to `at`, growing `data` if needed.
fn write_at(data: &mut Vec<u8>, at: usize, bytes: &[u8]) {
    let end = at + bytes.len();
    if data.len() < end {
        data.resize(end, PAD_BYTE);
    }
    data[at..end].copy_from_slice(bytes);
}

/// Pad from `end` up to the next multiple of `align`. Returns the padded end.
fn pad_at(data: &mut Vec<u8>, end: usize, align: usize) -> usize {
    let padded = align_up(end, align);
    write_at(data, end, &vec![PAD_BYTE; padded - end]);
    padded
}

/// Replace subfile `n` (1-based). A subfile that no longer fits its allocation pushes
/// everything after it back, and the following table entries move with it.
pub fn insert_subfile(data: &mut Vec<u8>, table: &mut LbaTable, n: usize, part: &[u8]) -> Result<()> {
    if n == 0 || n > table.len() {
        return Err(LodError::MissingIndex {
            index: n,
            reason: format!("container has {} subfiles", table.len()),
        });
    }
    let i = n - 1;
    let entry = table.entries[i];
    let is_last = n == table.len();
    let sector = table.sector_padding;

    if is_last || part.len() <= entry.span().allocation(sector) {
        write_at(data, entry.offset, part);
        if !sector && !is_last {
            pad_at(data, entry.offset + part.len(), WORD_SIZE);
        }
    } else {
        let next = table.entries[i + 1].offset.min(data.len());
        let tail = data.split_off(next);
        write_at(data, entry.offset, part);
        pad_at(data, entry.offset + part.len(), alignment(sector));
        // Only grows; a part that still ends before the next subfile leaves the gap as it was.
        let delta = data.len() - next;
        data.extend_from_slice(&tail);
        debug!("Subfile {} grew, moving {} later subfiles by {}", n, table.len() - n, delta);
        table.entries[i + 1..]
            .iter_mut()
            .for_each(|e| e.offset += delta);
    }
    table.entries[i].size = part.len();
    table.write(data);
    Ok(())
}

/// Lay the container out again from `parts`, one per table entry in file order. Entries that
/// shared an offset keep sharing one.
pub fn rebuild(data: &mut Vec<u8>, table: &mut LbaTable, parts: &[Vec<u8>]) -> Result<()> {
    if parts.len() != table.len() {
        return Err(LodError::MissingIndex {
            index: parts.len().min(table.len()) + 1,
            reason: format!("{} parts for {} subfiles", parts.len(), table.len()),
        });
    }
    let align = alignment(table.sector_padding);
    let data_start = align_up(table.table_len(), align);
    data.truncate(data_start);
    data.resize(data_start, PAD_BYTE);

    let count = table.len();
    let mut previous: Option<(usize, usize)> = None;
    for (i, part) in parts.iter().enumerate() {
        let original = table.entries[i].offset;
        let at = match previous {
            Some((prev_original, prev_new)) if prev_original == original => prev_new,
            _ => data.len(),
        };
        write_at(data, at, part);
        if table.sector_padding || i + 1 != count {
            pad_at(data, at + part.len(), align);
        }
        table.entries[i].offset = at;
        table.entries[i].size = part.len();
        previous = Some((original, at));
    }
    table.write(data);
    Ok(())
}

/// Insert subfiles from `source_dir` (by default `NAME_dir` next to the container) back into
/// the container. Selecting `*` with every part present rebuilds the container; anything else
/// patches the selected subfiles one at a time.
pub fn insert_files<S: AsRef<str>>(
    container: &Path,
    sector_padding: bool,
    selection: &[S],
    source_dir: Option<&Path>,
) -> Result<InsertReport> {
    if !container.is_file() {
        return Err(LodError::NotFound(container.to_path_buf()));
    }
    let mut data = fs::read(container)?;
    let mut table =
        LbaTable::read(&data, sector_padding)?.ok_or(LodError::BadSignature("MRG"))?;
    let dir: PathBuf = source_dir.map_or_else(|| subfile_dir(container), Path::to_path_buf);
    let count = table.len();
    let mut report = InsertReport::default();

    let present = part_numbers(&dir, container)?;
    if selects_all(selection) && present.iter().copied().eq(1..=count) {
        info!("Rebuilding {} from {} subfiles", container.display(), count);
        let parts = (1..=count)
            .map(|n| fs::read(part_path(&dir, container, n)))
            .collect::<std::io::Result<Vec<_>>>()?;
        rebuild(&mut data, &mut table, &parts)?;
        report.inserted.extend(1..=count);
        report.rebuilt = true;
    } else {
        for n in parse_selection(selection, count) {
            let path = part_path(&dir, container, n);
            if n == 0 || n > count {
                warn!("Subfile {} is not in {}, skipping", n, container.display());
                report.skipped.push(n);
            } else if !path.is_file() {
                warn!("{} not found, skipping", path.display());
                report.skipped.push(n);
            } else {
                insert_subfile(&mut data, &mut table, n, &fs::read(&path)?)?;
                report.inserted.push(n);
            }
        }
    }

    fs::write(container, &data)?;
    info!(
        "Inserted {} subfiles into {}",
        report.inserted.len(),
        container.display()
    );
    Ok(report)
}
