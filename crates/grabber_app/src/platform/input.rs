//! Reads image URLs out of one column of a CSV or TSV file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use engine_logging::engine_info;
use thiserror::Error;

const HEADER_HINTS: &[&str] = &["url", "image", "link"];

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed table: {0}")]
    Csv(#[from] csv::Error),
    #[error("column {0:?} not found")]
    ColumnNotFound(String),
    #[error("no column looks like it holds image URLs")]
    NoUrlColumn,
}

/// Tab for `.tsv`/`.tab` files, comma otherwise.
pub fn delimiter_for(path: &Path) -> u8 {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}

pub fn load_urls(path: &Path, column: Option<&str>) -> Result<Vec<String>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let urls = read_urls(file, delimiter_for(path), column)?;
    engine_info!("loaded {} urls from {}", urls.len(), path.display());
    Ok(urls)
}

/// Picks the URL column and returns its non-empty cells in row order.
///
/// Without an explicit `column` the first header mentioning url, image or
/// link wins; failing that, the first column whose first non-empty value is
/// an http(s) URL.
pub fn read_urls<R: Read>(
    reader: R,
    delimiter: u8,
    column: Option<&str>,
) -> Result<Vec<String>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    let rows = reader
        .records()
        .collect::<Result<Vec<csv::StringRecord>, _>>()?;

    let index = match column {
        Some(name) => headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| InputError::ColumnNotFound(name.to_string()))?,
        None => detect_column(&headers, &rows).ok_or(InputError::NoUrlColumn)?,
    };

    Ok(rows
        .iter()
        .filter_map(|row| row.get(index))
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect())
}

fn detect_column(headers: &[String], rows: &[csv::StringRecord]) -> Option<usize> {
    let by_header = headers.iter().position(|header| {
        let lower = header.to_ascii_lowercase();
        HEADER_HINTS.iter().any(|hint| lower.contains(hint))
    });
    by_header.or_else(|| {
        (0..headers.len()).find(|&index| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(str::trim)
                .find(|cell| !cell.is_empty())
                .is_some_and(looks_like_http_url)
        })
    })
}

fn looks_like_http_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
