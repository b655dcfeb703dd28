use std::io::{Cursor, Read};

use bytes::Bytes;
use grabber_engine::{suggested_archive_name, ArchiveBuilder, ArchiveEntry};
use pretty_assertions::assert_eq;
use zip::{CompressionMethod, ZipArchive};

fn open(bytes: &Bytes) -> ZipArchive<Cursor<Vec<u8>>> {
    ZipArchive::new(Cursor::new(bytes.to_vec())).expect("valid zip")
}

#[test]
fn empty_builder_finalizes_to_an_empty_zip() {
    let builder = ArchiveBuilder::new(6);
    assert!(builder.is_empty());

    let finished = builder.finalize("images_1.zip".into()).unwrap();
    assert_eq!(finished.entry_count, 0);
    assert_eq!(finished.suggested_name, "images_1.zip");
    assert_eq!(open(&finished.bytes).len(), 0);
}

#[test]
fn entries_are_deflated_and_readable_by_name() {
    let builder = ArchiveBuilder::new(6);
    let payload = Bytes::from(vec![7u8; 4096]);
    builder.add(ArchiveEntry::for_task(0, "https://x.test/a.png", payload.clone()));
    builder.add(ArchiveEntry::for_task(
        1,
        "https://x.test/b.jpeg?v=2",
        Bytes::from_static(b"jpeg"),
    ));
    assert_eq!(builder.len(), 2);

    let finished = builder.finalize(suggested_archive_name(42)).unwrap();
    assert_eq!(finished.suggested_name, "images_42.zip");
    assert_eq!(finished.entry_count, 2);

    let mut zip = open(&finished.bytes);
    let mut first = zip.by_name("image_1.png").unwrap();
    assert_eq!(first.compression(), CompressionMethod::Deflated);
    assert!(first.compressed_size() < first.size());
    let mut body = Vec::new();
    first.read_to_end(&mut body).unwrap();
    assert_eq!(body, payload.to_vec());
    drop(first);

    let mut body = Vec::new();
    zip.by_name("image_2.jpeg")
        .unwrap()
        .read_to_end(&mut body)
        .unwrap();
    assert_eq!(body, b"jpeg");
}

#[test]
fn repeated_name_keeps_the_last_payload() {
    let builder = ArchiveBuilder::new(0);
    builder.add(ArchiveEntry {
        name: "image_1.png".into(),
        bytes: Bytes::from_static(b"first"),
    });
    builder.add(ArchiveEntry {
        name: "image_1.png".into(),
        bytes: Bytes::from_static(b"second"),
    });
    assert_eq!(builder.len(), 1);

    let finished = builder.finalize("images_0.zip".into()).unwrap();
    let mut body = String::new();
    open(&finished.bytes)
        .by_name("image_1.png")
        .unwrap()
        .read_to_string(&mut body)
        .unwrap();
    assert_eq!(body, "second");
}

#[test]
fn concurrent_adds_are_all_kept() {
    let builder = ArchiveBuilder::new(6);
    std::thread::scope(|scope| {
        for index in 0..16 {
            let builder = &builder;
            scope.spawn(move || {
                builder.add(ArchiveEntry::for_task(
                    index,
                    "https://x.test/p.gif",
                    Bytes::from(vec![index as u8; 8]),
                ));
            });
        }
    });

    let finished = builder.finalize("images_9.zip".into()).unwrap();
    assert_eq!(finished.entry_count, 16);
    assert_eq!(open(&finished.bytes).len(), 16);
}
