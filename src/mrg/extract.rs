use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::table::LbaTable;
use crate::error::{LodError, Result};
use crate::tools::{
    paths::{part_path, subfile_dir},
    selection::parse_selection,
};

/// What an extraction produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractReport {
    pub written: Vec<PathBuf>,
    /// Selected numbers with no table entry.
    pub skipped: Vec<usize>,
}

/// Bytes of subfile `n` (0 being the table).
pub fn subfile<'a>(data: &'a [u8], table: &LbaTable, n: usize) -> Result<&'a [u8]> {
    table
        .span(n)
        .map(|span| span.slice(data))
        .ok_or_else(|| LodError::MissingIndex {
            index: n,
            reason: format!("container has {} subfiles", table.len()),
        })
}

/// Extract the selected subfiles of `container` into `out_dir`, by default `NAME_dir` next to
/// it. Numbers past the end of the table are reported and skipped.
pub fn extract_files<S: AsRef<str>>(
    container: &Path,
    sector_padding: bool,
    selection: &[S],
    out_dir: Option<&Path>,
) -> Result<ExtractReport> {
    if !container.is_file() {
        return Err(LodError::NotFound(container.to_path_buf()));
    }
    let data = fs::read(container)?;
    let table = LbaTable::read(&data, sector_padding)?.ok_or(LodError::BadSignature("MRG"))?;

    let dir = out_dir.map_or_else(|| subfile_dir(container), Path::to_path_buf);
    fs::create_dir_all(&dir)?;
    info!(
        "Extracting from {} ({} subfiles)",
        container.display(),
        table.len()
    );

    let mut report = ExtractReport::default();
    for n in parse_selection(selection, table.len()) {
        match subfile(&data, &table, n) {
            Ok(bytes) => {
                let path = part_path(&dir, container, n);
                fs::write(&path, bytes)?;
                report.written.push(path);
            }
            Err(e) => {
                warn!("{}, skipping", e);
                report.skipped.push(n);
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tools::classify::MRG_SIGNATURE;

    fn sample() -> Vec<u8> {
        let mut data = MRG_SIGNATURE.to_vec();
        for word in [2_u32, 0x18, 4, 0x1c, 8] {
            data.extend_from_slice(&word.to_le_bytes());
        }
        data.extend_from_slice(b"abcd01234567");
        data
    }

    #[test]
    fn subfile_test() {
        let data = sample();
        let table = LbaTable::read(&data, false).unwrap().unwrap();
        assert_eq!(subfile(&data, &table, 2).unwrap(), b"01234567");
        assert_eq!(subfile(&data, &table, 0).unwrap().len(), 0x18);
        assert!(matches!(
            subfile(&data, &table, 3),
            Err(LodError::MissingIndex { index: 3, .. })
        ));
    }
}
