//! Last-resort retrieval by decoding pixels and re-encoding them.
//!
//! There is no browser image pipeline here, so this stage is best-effort:
//! [`DecodeRenderer`] reloads the URL without CORS-style headers or
//! content-type checks, sniffs the format from the bytes, and re-encodes the
//! pixels as JPEG. It rescues images served with a misleading content type;
//! it cannot rescue an origin that refuses the request outright.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;

use crate::fetch::{FetchRequest, Fetcher};
use crate::{FailureKind, FetchError};

pub const RENDERED_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub bytes: Bytes,
    pub content_type: String,
}

#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RenderedImage, FetchError>;
}

/// Always fails; used where no decode surface is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRenderer;

#[async_trait]
impl Renderer for DisabledRenderer {
    async fn render(&self, url: &str) -> Result<RenderedImage, FetchError> {
        Err(FetchError::new(
            FailureKind::Disabled,
            format!("rendered fallback unavailable for {url}"),
        ))
    }
}

pub struct DecodeRenderer {
    fetcher: Arc<dyn Fetcher>,
    jpeg_quality: u8,
}

impl DecodeRenderer {
    pub fn new(fetcher: Arc<dyn Fetcher>, jpeg_quality: u8) -> Self {
        Self {
            fetcher,
            jpeg_quality,
        }
    }
}

#[async_trait]
impl Renderer for DecodeRenderer {
    async fn render(&self, url: &str) -> Result<RenderedImage, FetchError> {
        let output = self.fetcher.fetch(FetchRequest::get(url)).await?;
        let quality = self.jpeg_quality;
        let encoded = tokio::task::spawn_blocking(move || reencode_as_jpeg(&output.bytes, quality))
            .await
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))??;
        Ok(RenderedImage {
            bytes: Bytes::from(encoded),
            content_type: RENDERED_CONTENT_TYPE.to_string(),
        })
    }
}

/// Decodes any supported format and writes the pixels back out as JPEG.
///
/// Alpha is dropped since JPEG has no transparency.
pub fn reencode_as_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>, FetchError> {
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?
        .decode()
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
    let rgb = decoded.to_rgb8();

    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality)
        .encode_image(&rgb)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn tiny_png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(3, 2, Rgba([200, 10, 10, 128]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn png_with_alpha_becomes_jpeg() {
        let jpeg = reencode_as_jpeg(&tiny_png(), 95).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let back = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((back.width(), back.height()), (3, 2));
    }

    #[test]
    fn html_is_a_decode_error() {
        let err = reencode_as_jpeg(b"<html>nope</html>", 95).unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
    }
}
