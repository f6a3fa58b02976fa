use crate::{enums::SortBy, export::JPEG_QUALITY};

/// Tunables shared by the session, the exporter and the CLI.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Lower bound applied to contrast factors
    pub min_contrast: f32,
    /// Upper bound applied to contrast factors
    pub max_contrast: f32,
    /// Zoom factors below this are raised to it
    pub min_zoom: f32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Stacking order of DICOM series files
    pub sort_by: SortBy,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_contrast: 0.01,
            max_contrast: 3.0,
            min_zoom: 1.0,
            jpeg_quality: JPEG_QUALITY,
            sort_by: SortBy::InstanceNumber,
        }
    }
}

impl ViewerConfig {
    pub fn clamp_contrast(&self, factor: f32) -> f32 {
        if factor.is_nan() {
            return 1.0_f32.clamp(self.min_contrast, self.max_contrast);
        }
        factor.clamp(self.min_contrast, self.max_contrast)
    }

    /// Non-finite factors pass through so the zoom transform can reject them.
    pub fn clamp_zoom(&self, factor: f32) -> f32 {
        if factor.is_finite() {
            factor.max(self.min_zoom)
        } else {
            factor
        }
    }
}
