//! Picking, previewing and re-encoding the image a user submits.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;

/// File extensions accepted by the picker.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// Errors raised while accepting an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type for {name}; expected a .jpg or .jpeg image")]
    UnsupportedType { name: String },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not decode {name}: {source}")]
    Decode {
        name: String,
        source: image::ImageError,
    },
    #[error("Failed to encode JPEG: {0}")]
    Encode(image::ImageError),
}

/// A decoded image waiting to be submitted.
#[derive(Clone, Debug)]
pub struct UploadedImage {
    name: String,
    image: DynamicImage,
}

impl UploadedImage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// RGBA pixels for the preview texture.
    pub fn preview(&self) -> RgbaImage {
        self.image.to_rgba8()
    }

    /// Re-encode as baseline JPEG, dropping any alpha channel.
    pub fn to_jpeg(&self) -> Result<Vec<u8>, UploadError> {
        let rgb = DynamicImage::ImageRgb8(self.image.to_rgb8());
        let mut buf = Cursor::new(Vec::new());
        rgb.write_to(&mut buf, ImageFormat::Jpeg)
            .map_err(UploadError::Encode)?;
        Ok(buf.into_inner())
    }
}

/// True if the picker should accept `path`.
pub fn is_supported_upload(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Read and decode an image file chosen by the user.
pub fn load_upload(path: &Path) -> Result<UploadedImage, UploadError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    if !is_supported_upload(path) {
        return Err(UploadError::UnsupportedType { name });
    }
    let bytes = std::fs::read(path).map_err(|source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_upload(name, &bytes)
}

/// Decode an in-memory upload named `name`.
pub fn decode_upload(name: impl Into<String>, bytes: &[u8]) -> Result<UploadedImage, UploadError> {
    let name = name.into();
    if !is_supported_upload(Path::new(&name)) {
        return Err(UploadError::UnsupportedType { name });
    }
    let image = image::load_from_memory(bytes).map_err(|source| UploadError::Decode {
        name: name.clone(),
        source,
    })?;
    Ok(UploadedImage { name, image })
}

#[cfg(test)]
impl UploadedImage {
    pub(crate) fn from_image(name: &str, image: DynamicImage) -> Self {
        Self {
            name: name.to_string(),
            image,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 16) as u8, (y * 16) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}
