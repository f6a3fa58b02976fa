use crate::{
    enums::{SortBy, SourceKind},
    volume::Volume,
};

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::{Array3, Array4, ArrayD, Axis, IxDyn, stack};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("Inconsistent image dimensions")]
    InconsistentDimensions,

    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Unsupported volume rank {0}, expected 2, 3 or 4")]
    UnsupportedRank(usize),

    #[error("Volume of shape {0:?} holds no samples")]
    EmptyVolume(Vec<usize>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),

    #[error("Could not decode pixel data: {0}")]
    PixelData(String),

    #[error("NIfTI error: {0}")]
    Nifti(#[from] nifti::error::NiftiError),
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from a DICOM file, a DICOM series directory or a NIfTI
    /// file.
    ///
    /// A single-frame DICOM file pulls in every other `.dcm` file next to it
    /// as one series.
    ///
    /// # Errors
    ///
    /// Returns error if the path is not a supported source or cannot be decoded
    pub fn load(path: impl AsRef<Path>, sort_by: SortBy) -> Result<Volume, VolumeLoaderError> {
        let path = path.as_ref();
        let volume = if path.is_dir() {
            Self::load_from_directory(path, sort_by)?
        } else {
            match SourceKind::from_path(path) {
                Some(SourceKind::Dicom) => Self::load_dicom_file(path, sort_by)?,
                Some(SourceKind::Nifti) => Self::load_nifti(path)?,
                None => return Err(VolumeLoaderError::UnsupportedFormat(path.to_path_buf())),
            }
        };
        info!(path = %path.display(), shape = ?volume.dim(), "Loaded volume");
        Ok(volume)
    }

    /// Load a volume from the DICOM file at `path`
    ///
    /// Multi-frame objects become a volume on their own, otherwise the file is
    /// treated as a member of the series in its directory.
    pub fn load_dicom_file(
        path: impl AsRef<Path>,
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let path = path.as_ref();
        let dicom_object = open_file(path)?;

        if dicom_object.element(tags::NUMBER_OF_FRAMES).is_ok() {
            debug!(path = %path.display(), "Reading multi-frame object");
            let frames = Self::decode_frames(&dicom_object)?;
            return Volume::new(Self::frames_to_volume_array(frames));
        }

        let siblings = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => Self::dicom_paths_in(dir)?,
            _ => Self::dicom_paths_in(Path::new("."))?,
        };
        if siblings.len() <= 1 {
            let frames = Self::decode_frames(&dicom_object)?;
            let image = frames.index_axis_move(Axis(0), 0);
            return Volume::new(Self::single_image_array(image));
        }

        debug!(count = siblings.len(), "Reading DICOM series");
        Self::load_from_file_paths(&siblings, sort_by)
    }

    /// Load a volume from DICOM objects
    ///
    /// # Arguments
    ///
    /// * `dicom_objects` - Slice of DICOM file objects
    /// * `sort_by` - Method to sort the slices
    ///
    /// # Errors
    ///
    /// Returns error if no valid images found or dimensions are inconsistent
    pub fn load_from_dicom_objects(
        dicom_objects: &[FileDicomObject<InMemDicomObject>],
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let mut images_with_order: Vec<_> = dicom_objects
            .iter()
            .filter_map(|dicom_object| Self::extract_image_with_order(dicom_object, sort_by))
            .collect();

        if images_with_order.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        Self::sort_images(&mut images_with_order, sort_by);

        let images: Vec<_> = images_with_order
            .into_iter()
            .map(|(_, image)| image)
            .collect();

        Self::validate_dimensions(&images)?;

        if let [image] = images.as_slice() {
            return Volume::new(Self::single_image_array(image.clone()));
        }
        Volume::new(Self::build_volume_array(&images)?)
    }

    /// Load a volume from file paths
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path>],
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let objects: Result<Vec<_>, _> =
            paths.iter().map(|path| open_file(path.as_ref())).collect();

        Self::load_from_dicom_objects(&objects?, sort_by)
    }

    /// Load a volume from a directory containing .dcm files
    ///
    /// A directory holding a single file loads exactly like that file.
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let paths = Self::dicom_paths_in(path.as_ref())?;

        match paths.as_slice() {
            [] => Err(VolumeLoaderError::NoValidImages),
            [single] => Self::load_dicom_file(single, sort_by),
            _ => Self::load_from_file_paths(&paths, sort_by),
        }
    }

    /// Load a NIfTI-1 file (`.nii` or `.nii.gz`) keeping its native axis order
    pub fn load_nifti(path: impl AsRef<Path>) -> Result<Volume, VolumeLoaderError> {
        let object = ReaderOptions::new().read_file(path.as_ref())?;
        let array = object.into_volume().into_ndarray::<f32>()?;

        let shape = array.shape().to_vec();
        let values: Vec<f32> = array.iter().copied().collect();
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|_| VolumeLoaderError::InconsistentDimensions)?;

        Volume::new(Self::squeeze_low_rank(data))
    }

    fn dicom_paths_in(dir: &Path) -> Result<Vec<PathBuf>, VolumeLoaderError> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && SourceKind::from_path(path) == Some(SourceKind::Dicom))
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn extract_image_with_order(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        sort_by: SortBy,
    ) -> Option<(i32, Array3<f32>)> {
        let order = Self::get_sort_order(dicom_object, sort_by);
        match Self::decode_frames(dicom_object) {
            Ok(frames) => Some((order, frames.index_axis_move(Axis(0), 0))),
            Err(e) => {
                warn!("Skipping DICOM object without usable pixel data: {}", e);
                None
            }
        }
    }

    fn get_sort_order(dicom_object: &FileDicomObject<InMemDicomObject>, sort_by: SortBy) -> i32 {
        match sort_by {
            SortBy::InstanceNumber => dicom_object
                .element(tags::INSTANCE_NUMBER)
                .ok()
                .and_then(|element| element.to_int::<i32>().ok())
                .unwrap_or(0),
            SortBy::None => 0,
        }
    }

    /// Decode all frames as `(frames, rows, columns, samples)` without
    /// applying any VOI LUT, so the stored intensity range is kept.
    fn decode_frames(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<Array4<f32>, VolumeLoaderError> {
        let pixel_data = dicom_object
            .decode_pixel_data()
            .map_err(|e| VolumeLoaderError::PixelData(e.to_string()))?;
        let options = ConvertOptions::new().with_voi_lut(VoiLutOption::Identity);
        pixel_data
            .to_ndarray_with_options::<f32>(&options)
            .map_err(|e| VolumeLoaderError::PixelData(e.to_string()))
    }

    fn sort_images(images_with_order: &mut [(i32, Array3<f32>)], sort_by: SortBy) {
        if !matches!(sort_by, SortBy::None) {
            images_with_order.sort_by_key(|(order, _)| *order);
        }
    }

    fn validate_dimensions(images: &[Array3<f32>]) -> Result<(), VolumeLoaderError> {
        let first_dim = images[0].dim();
        if images.iter().any(|img| img.dim() != first_dim) {
            return Err(VolumeLoaderError::InconsistentDimensions);
        }
        Ok(())
    }

    /// Stack `(rows, columns, samples)` images along a new slice axis.
    fn build_volume_array(images: &[Array3<f32>]) -> Result<ArrayD<f32>, VolumeLoaderError> {
        let views: Vec<_> = images.iter().map(|image| image.view()).collect();
        let volume = stack(Axis(2), &views).map_err(|_| VolumeLoaderError::InconsistentDimensions)?;
        Ok(Self::drop_single_sample_axis(volume.into_dyn()))
    }

    /// `(frames, rows, columns, samples)` to `(rows, columns, frames[, samples])`.
    fn frames_to_volume_array(frames: Array4<f32>) -> ArrayD<f32> {
        Self::drop_single_sample_axis(frames.permuted_axes([1, 2, 0, 3]).into_dyn())
    }

    /// A lone image is 2D, or a single-slice 4D volume when it has several
    /// samples per pixel.
    fn single_image_array(image: Array3<f32>) -> ArrayD<f32> {
        if image.dim().2 == 1 {
            image.index_axis_move(Axis(2), 0).into_dyn()
        } else {
            image.insert_axis(Axis(2)).into_dyn()
        }
    }

    fn drop_single_sample_axis(data: ArrayD<f32>) -> ArrayD<f32> {
        if data.ndim() == 4 && data.shape()[3] == 1 {
            data.index_axis_move(Axis(3), 0)
        } else {
            data
        }
    }

    /// Volumes with fewer than three axes lose their singleton axes.
    fn squeeze_low_rank(data: ArrayD<f32>) -> ArrayD<f32> {
        if data.ndim() >= 3 {
            return data;
        }
        let shape: Vec<usize> = data.shape().iter().copied().filter(|&len| len != 1).collect();
        let values: Vec<f32> = data.iter().copied().collect();
        ArrayD::from_shape_vec(IxDyn(&shape), values).unwrap_or(data)
    }
}
