/// Custom image sources
///
/// Uploads are stored inline in the snapshot as `data:` URIs. Large
/// collections with many uploads grow the snapshot accordingly.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;

/// Where a custom image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A URL or an already-encoded `data:` URI, stored verbatim
    Url(String),
    /// Raw uploaded bytes, encoded inline
    Upload(Vec<u8>),
}

impl ImageSource {
    /// The string to store, or `None` when there is nothing to set
    pub fn into_reference(self) -> Option<String> {
        match self {
            ImageSource::Url(url) => {
                let url = url.trim();
                (!url.is_empty()).then(|| url.to_string())
            }
            ImageSource::Upload(bytes) => {
                if bytes.is_empty() {
                    return None;
                }
                Some(format!("data:{};base64,{}", sniff_mime(&bytes), STANDARD.encode(&bytes)))
            }
        }
    }
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Bmp) => "image/bmp",
        Ok(ImageFormat::Tiff) => "image/tiff",
        Ok(ImageFormat::Avif) => "image/avif",
        _ => "application/octet-stream",
    }
}
