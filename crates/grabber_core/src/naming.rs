use url::Url;

use crate::TaskIndex;

pub const DEFAULT_EXTENSION: &str = ".jpg";

const KNOWN_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];

/// Archive entry name for the task at `index`: `image_<index + 1><ext>`.
///
/// Unique per index, so concurrent completion order never causes collisions.
pub fn archive_entry_name(index: TaskIndex, url: &str) -> String {
    format!("image_{}{}", index + 1, infer_extension(url))
}

/// Extension (with leading dot, lower-cased) taken from the URL path.
///
/// Only `jpg`, `jpeg`, `png` and `gif` are recognised; anything else
/// yields [`DEFAULT_EXTENSION`].
pub fn infer_extension(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => strip_query_and_fragment(url).to_string(),
    };
    let Some((_, suffix)) = path.rsplit_once('.') else {
        return DEFAULT_EXTENSION.to_string();
    };
    let suffix = suffix.to_ascii_lowercase();
    if KNOWN_EXTENSIONS.contains(&suffix.as_str()) {
        format!(".{suffix}")
    } else {
        DEFAULT_EXTENSION.to_string()
    }
}

fn strip_query_and_fragment(raw: &str) -> &str {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    &raw[..end]
}

#[cfg(test)]
mod tests {
    use super::strip_query_and_fragment;

    #[test]
    fn strips_query_and_fragment() {
        assert_eq!(strip_query_and_fragment("a/b.png?x=1#y"), "a/b.png");
        assert_eq!(strip_query_and_fragment("a/b.png#y"), "a/b.png");
        assert_eq!(strip_query_and_fragment("a/b.png"), "a/b.png");
    }
}
