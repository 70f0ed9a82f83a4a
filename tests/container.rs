use std::fs;
use std::path::Path;

use lodmod::mrg::extract::extract_files;
use lodmod::mrg::insert::insert_files;
use lodmod::mrg::table::LbaTable;
use lodmod::tools::classify::MRG_SIGNATURE;
use lodmod::tools::layout::{align_up, PAD_BYTE, SECTOR_SIZE, WORD_SIZE};
use lodmod::LodError;

/// A container laid out with no slack: parts in order, each padded to the alignment unit
/// except the last in byte mode.
fn container(parts: &[&[u8]], sector: bool) -> Vec<u8> {
    let align = if sector { SECTOR_SIZE } else { WORD_SIZE };
    let scale = if sector { SECTOR_SIZE } else { 1 };
    let header = 8 + 8 * parts.len();
    let mut data = MRG_SIGNATURE.to_vec();
    data.extend_from_slice(&(parts.len() as u32).to_le_bytes());
    let mut offset = align_up(header, align);
    let mut body = vec![PAD_BYTE; offset - header];
    for (i, part) in parts.iter().enumerate() {
        data.extend_from_slice(&((offset / scale) as u32).to_le_bytes());
        data.extend_from_slice(&(part.len() as u32).to_le_bytes());
        body.extend_from_slice(part);
        offset += part.len();
        if sector || i + 1 != parts.len() {
            let end = align_up(offset, align);
            body.resize(body.len() + end - offset, PAD_BYTE);
            offset = end;
        }
    }
    data.extend_from_slice(&body);
    data
}

fn write(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

#[test]
fn two_entry_extract() {
    let dir = tempfile::tempdir().unwrap();
    let mut data = MRG_SIGNATURE.to_vec();
    for word in [2_u32, 0x18, 4, 0x1c, 8] {
        data.extend_from_slice(&word.to_le_bytes());
    }
    data.extend_from_slice(b"abcd01234567");
    let path = write(dir.path(), "SMALL.MRG", &data);

    let report = extract_files(&path, false, &["*"], None).unwrap();
    assert_eq!(report.written.len(), 2);
    let second = dir.path().join("SMALL_dir").join("SMALL_2.bin");
    assert_eq!(fs::read(second).unwrap(), b"01234567");
    assert_eq!(
        fs::read(dir.path().join("SMALL_dir/SMALL_1.bin")).unwrap(),
        b"abcd"
    );

    let report = extract_files(&path, false, &["0", "5"], None).unwrap();
    assert_eq!(report.skipped, vec![5]);

    let report = extract_files(&path, false, &["2-4000000000"], None).unwrap();
    assert_eq!(report.written.len(), 1);
    assert!(report.skipped.is_empty());
    assert_eq!(
        fs::read(dir.path().join("SMALL_dir/SMALL_0.bin")).unwrap(),
        &data[..0x18]
    );
}

#[test]
fn round_trip_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let original = container(&[b"first part", b"2", b"", b"the last one"], false);
    let path = write(dir.path(), "DRGN.MRG", &original);

    extract_files(&path, false, &["*"], None).unwrap();
    let report = insert_files(&path, false, &["*"], None).unwrap();
    assert!(report.rebuilt);
    assert_eq!(report.inserted, vec![1, 2, 3, 4]);
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn sector_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let original = container(&[&[7_u8; 0x900], b"sector two"], true);
    assert_eq!(original.len(), 0x2000);
    let path = write(dir.path(), "SECT.BIN", &original);

    extract_files(&path, true, &["*"], None).unwrap();
    assert_eq!(
        fs::read(dir.path().join("SECT_dir/SECT_1.bin")).unwrap().len(),
        0x900
    );
    insert_files(&path, true, &["*"], None).unwrap();
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn grown_subfile_shifts_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let original = container(&[b"abcd", b"01234567", b"tail data"], false);
    let path = write(dir.path(), "GROW.MRG", &original);
    extract_files(&path, false, &["*"], None).unwrap();
    let before = LbaTable::read(&original, false).unwrap().unwrap();

    fs::write(dir.path().join("GROW_dir/GROW_2.bin"), b"0123456789AB").unwrap();
    let report = insert_files(&path, false, &["2"], None).unwrap();
    assert!(!report.rebuilt);
    assert_eq!(report.inserted, vec![2]);

    let data = fs::read(&path).unwrap();
    let after = LbaTable::read(&data, false).unwrap().unwrap();
    assert_eq!(after.entries[1].size, 12);
    assert_eq!(after.entries[2].offset, before.entries[2].offset + 4);
    assert_eq!(after.span(1).unwrap().slice(&data), b"abcd");
    assert_eq!(after.span(2).unwrap().slice(&data), b"0123456789AB");
    assert_eq!(after.span(3).unwrap().slice(&data), b"tail data");
}

#[test]
fn missing_parts_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let original = container(&[b"abcd", b"efgh", b"ijkl"], false);
    let path = write(dir.path(), "PART.MRG", &original);
    extract_files(&path, false, &["1", "3"], None).unwrap();
    fs::write(dir.path().join("PART_dir/PART_3.bin"), b"IJKL").unwrap();

    // Not every part is present, so "*" patches what it finds.
    let report = insert_files(&path, false, &["*"], None).unwrap();
    assert!(!report.rebuilt);
    assert_eq!(report.inserted, vec![1, 3]);
    assert_eq!(report.skipped, vec![2]);
    let data = fs::read(&path).unwrap();
    assert_eq!(data.len(), original.len());
    assert_eq!(&data[data.len() - 4..], b"IJKL");
}

#[test]
fn not_a_container() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "PLAIN.BIN", b"just some bytes");
    assert!(matches!(
        extract_files(&path, false, &["*"], None),
        Err(LodError::BadSignature(_))
    ));
    assert!(matches!(
        extract_files(&dir.path().join("NONE.BIN"), false, &["*"], None),
        Err(LodError::NotFound(_))
    ));
}
