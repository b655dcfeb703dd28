use std::collections::HashSet;

use grabber_core::{archive_entry_name, infer_extension, DEFAULT_EXTENSION};
use pretty_assertions::assert_eq;

#[test]
fn names_are_one_based_with_url_extension() {
    assert_eq!(
        archive_entry_name(0, "https://cdn.example.com/a/photo.png"),
        "image_1.png"
    );
    assert_eq!(
        archive_entry_name(9, "https://cdn.example.com/a/photo.JPEG?w=200"),
        "image_10.jpeg"
    );
    assert_eq!(
        archive_entry_name(2, "https://cdn.example.com/anim.gif#frame"),
        "image_3.gif"
    );
}

#[test]
fn unknown_or_missing_extension_defaults_to_jpg() {
    assert_eq!(infer_extension("https://example.com/pic.webp"), DEFAULT_EXTENSION);
    assert_eq!(infer_extension("https://example.com/pic"), DEFAULT_EXTENSION);
    assert_eq!(infer_extension("https://example.com/"), DEFAULT_EXTENSION);
    assert_eq!(
        infer_extension("https://example.com/dir.png/render"),
        DEFAULT_EXTENSION
    );
    // Query strings never contribute the extension.
    assert_eq!(
        infer_extension("https://example.com/render?format=.png"),
        DEFAULT_EXTENSION
    );
}

#[test]
fn unparseable_urls_still_get_an_extension() {
    assert_eq!(infer_extension("not a url/cat.png?x=1"), ".png");
    assert_eq!(infer_extension(""), DEFAULT_EXTENSION);
}

#[test]
fn names_are_unique_even_for_identical_urls() {
    let url = "https://example.com/same.png";
    let names: HashSet<String> = (0..50).map(|i| archive_entry_name(i, url)).collect();
    assert_eq!(names.len(), 50);
}
