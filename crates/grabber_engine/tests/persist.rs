use std::fs;

use bytes::Bytes;
use grabber_engine::{ArchiveWriter, FinishedArchive, PersistError};
use pretty_assertions::assert_eq;

#[test]
fn save_creates_the_directory_and_writes_the_archive() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("out");
    let archive = FinishedArchive {
        bytes: Bytes::from_static(b"PK\x05\x06zip"),
        suggested_name: "images_123.zip".into(),
        entry_count: 0,
    };

    let path = ArchiveWriter::new(&out).save(&archive).unwrap();

    assert_eq!(path, out.join("images_123.zip"));
    assert_eq!(fs::read(&path).unwrap(), b"PK\x05\x06zip");
    let leftovers: Vec<_> = fs::read_dir(&out).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn write_replaces_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ArchiveWriter::new(dir.path());

    writer.write("images_1.zip", b"old").unwrap();
    let path = writer.write("images_1.zip", b"new").unwrap();
    assert_eq!(fs::read(path).unwrap(), b"new");
}

#[test]
fn path_like_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ArchiveWriter::new(dir.path());

    for name in ["", "../escape.zip", "sub/images.zip"] {
        let err = writer.write(name, b"x").unwrap_err();
        assert!(matches!(err, PersistError::FileName(_)), "{name}: {err}");
    }
}

#[test]
fn file_in_place_of_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"").unwrap();

    let err = ArchiveWriter::new(&blocker)
        .write("images_1.zip", b"x")
        .unwrap_err();
    assert!(matches!(err, PersistError::OutputDir(_)));
}
