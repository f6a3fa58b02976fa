//! Stateless 2D operations turning a [`CanonicalSlice`] into a [`DisplayBuffer`].
//!
//! Every operation allocates a new buffer. [`render`] chains them in display
//! order: normalize, contrast, rotate, flip, zoom.

use crate::enums::Rotation;
use crate::interpolator::Interpolator;
use crate::view_state::ViewState;
use crate::volume::CanonicalSlice;

use image::{GrayImage, ImageBuffer, Luma, imageops};
use ndarray::Array2;
use thiserror::Error;

/// 8-bit grayscale image ready for display or export.
pub type DisplayBuffer = GrayImage;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Cannot normalize a slice with value range [{min}, {max}]")]
    DegenerateRange { min: f32, max: f32 },

    #[error("Invalid zoom factor {0}")]
    InvalidZoomFactor(f32),

    #[error("Zoom factor {factor} too large for a {width}x{height} image")]
    ZoomTooLarge { factor: f32, height: u32, width: u32 },

    #[error("Slice index {index} out of range, volume has {count} slices")]
    SliceIndexOutOfRange { index: usize, count: usize },

    #[error("Channel {channel} out of range, volume has {count} channels")]
    ChannelOutOfRange { channel: usize, count: usize },

    #[error("Cannot take a 2D slice from a volume of rank {0}")]
    UnsupportedRank(usize),
}

/// Linearly map the slice's `[min, max]` onto `[0, 255]`.
///
/// # Errors
///
/// Returns [`TransformError::DegenerateRange`] for constant or empty slices.
pub fn normalize(slice: &CanonicalSlice) -> Result<DisplayBuffer, TransformError> {
    let view = slice.view();
    let (min, max) = view
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !(max > min) || !min.is_finite() || !max.is_finite() {
        return Err(TransformError::DegenerateRange { min, max });
    }

    // the span of two finite f32 values can overflow f32
    let (min, range) = (f64::from(min), f64::from(max) - f64::from(min));
    let normalized = view.mapv(|v| ((f64::from(v) - min) / range * 255.0) as u8);
    Ok(array_to_image(normalized))
}

/// Scale every sample by `factor`, saturating at 255.
pub fn adjust_contrast(buffer: &DisplayBuffer, factor: f32) -> DisplayBuffer {
    let mut adjusted = buffer.clone();
    for pixel in adjusted.pixels_mut() {
        pixel.0[0] = (pixel.0[0] as f32 * factor).clamp(0.0, 255.0) as u8;
    }
    adjusted
}

/// Rotate counter-clockwise; quarter turns swap width and height.
pub fn rotate(buffer: &DisplayBuffer, rotation: Rotation) -> DisplayBuffer {
    match rotation {
        Rotation::Deg0 => buffer.clone(),
        Rotation::Deg90 => imageops::rotate270(buffer),
        Rotation::Deg180 => imageops::rotate180(buffer),
        Rotation::Deg270 => imageops::rotate90(buffer),
    }
}

/// Mirror across the horizontal midline.
pub fn flip(buffer: &DisplayBuffer) -> DisplayBuffer {
    imageops::flip_vertical(buffer)
}

/// Center-crop to `1 / factor` of each side, then resample back to the input
/// size with bicubic interpolation.
///
/// # Errors
///
/// Returns [`TransformError::InvalidZoomFactor`] for factors below 1 or not
/// finite, and [`TransformError::ZoomTooLarge`] when the crop would be empty.
pub fn zoom(buffer: &DisplayBuffer, factor: f32) -> Result<DisplayBuffer, TransformError> {
    if !factor.is_finite() || factor < 1.0 {
        return Err(TransformError::InvalidZoomFactor(factor));
    }

    let (width, height) = buffer.dimensions();
    let crop_width = (width as f32 / factor) as u32;
    let crop_height = (height as f32 / factor) as u32;
    if crop_width == 0 || crop_height == 0 {
        return Err(TransformError::ZoomTooLarge {
            factor,
            height,
            width,
        });
    }
    if (crop_width, crop_height) == (width, height) {
        return Ok(buffer.clone());
    }

    let x = (width - crop_width) / 2;
    let y = (height - crop_height) / 2;
    let cropped = imageops::crop_imm(buffer, x, y, crop_width, crop_height).to_image();
    let samples = image_to_array(&cropped);

    let resampled =
        Interpolator::resample_bicubic(&samples.view(), height as usize, width as usize);
    Ok(array_to_image(
        resampled.mapv(|v| v.round().clamp(0.0, 255.0) as u8),
    ))
}

/// Produce the display buffer for `slice` under `view` from scratch.
pub fn render(slice: &CanonicalSlice, view: &ViewState) -> Result<DisplayBuffer, TransformError> {
    let oriented = orient(&adjust_contrast(&normalize(slice)?, view.contrast), view);
    zoom(&oriented, view.zoom)
}

/// Apply the rotation and flip of `view`, leaving zoom aside.
pub(crate) fn orient(buffer: &DisplayBuffer, view: &ViewState) -> DisplayBuffer {
    let rotated = rotate(buffer, view.rotation);
    if view.flipped { flip(&rotated) } else { rotated }
}

fn array_to_image(array: Array2<u8>) -> DisplayBuffer {
    let (height, width) = array.dim();
    let pixel_data: Vec<u8> = array.iter().copied().collect();
    ImageBuffer::<Luma<u8>, _>::from_fn(width as u32, height as u32, |x, y| {
        Luma([pixel_data[y as usize * width + x as usize]])
    })
}

fn image_to_array(buffer: &DisplayBuffer) -> Array2<f32> {
    let (width, height) = buffer.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        buffer.get_pixel(x as u32, y as u32).0[0] as f32
    })
}
