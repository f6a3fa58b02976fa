use crate::{enums::OutputFormat, transform::DisplayBuffer};

use image::{ImageFormat, codecs::jpeg::JpegEncoder};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::info;

/// Default JPEG quality of exported images.
pub const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Cannot infer an image format from {}", .0.display())]
    UnsupportedExtension(PathBuf),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode `buffer` to `path` as an 8-bit grayscale PNG or JPEG.
pub fn save(
    buffer: &DisplayBuffer,
    path: impl AsRef<Path>,
    format: OutputFormat,
) -> Result<(), ExportError> {
    save_with_quality(buffer, path, format, JPEG_QUALITY)
}

/// Like [`save`], with an explicit JPEG quality (ignored for PNG).
pub fn save_with_quality(
    buffer: &DisplayBuffer,
    path: impl AsRef<Path>,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    match format {
        OutputFormat::Png => buffer.write_to(&mut writer, ImageFormat::Png)?,
        OutputFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, jpeg_quality);
            encoder.encode_image(buffer)?;
        }
    }
    writer.flush()?;

    let (width, height) = buffer.dimensions();
    info!(path = %path.display(), ?format, width, height, "Saved display buffer");
    Ok(())
}

/// Encode `buffer` with the format implied by the extension of `path`.
pub fn save_by_extension(buffer: &DisplayBuffer, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path)
        .ok_or_else(|| ExportError::UnsupportedExtension(path.to_path_buf()))?;
    save(buffer, path, format)
}

/// Read an exported raster back as 8-bit grayscale.
pub fn load_display_buffer(path: impl AsRef<Path>) -> Result<DisplayBuffer, ExportError> {
    Ok(image::open(path)?.into_luma8())
}
