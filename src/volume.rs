use crate::transform::TransformError;
use crate::volume_loader::VolumeLoaderError;

use ndarray::{Array2, ArrayD, ArrayView2, Axis, Ix2, s};
use tracing::debug;

/// Decoded scan data with axis order `(height, width[, slices[, channels]])`.
#[derive(Debug, Clone)]
pub struct Volume {
    data: ArrayD<f32>,
}

/// Untouched 2D copy of a volume at one slice (and channel) index.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSlice(Array2<f32>);

impl CanonicalSlice {
    pub fn new(data: Array2<f32>) -> Self {
        Self(data)
    }

    /// Get the dimensions of the slice (height, width)
    pub fn dim(&self) -> (usize, usize) {
        self.0.dim()
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.0.view()
    }

    pub fn into_inner(self) -> Array2<f32> {
        self.0
    }
}

impl Volume {
    /// Wrap decoded data, dropping trailing singleton axes beyond the fourth.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeLoaderError::UnsupportedRank`] unless the data ends up
    /// with 2, 3 or 4 axes, and [`VolumeLoaderError::EmptyVolume`] when any
    /// axis has length zero.
    pub fn new(mut data: ArrayD<f32>) -> Result<Self, VolumeLoaderError> {
        while data.ndim() > 4 && data.shape().last() == Some(&1) {
            let last = Axis(data.ndim() - 1);
            data = data.index_axis_move(last, 0);
        }
        if !(2..=4).contains(&data.ndim()) {
            return Err(VolumeLoaderError::UnsupportedRank(data.ndim()));
        }
        if data.is_empty() {
            return Err(VolumeLoaderError::EmptyVolume(data.shape().to_vec()));
        }
        Ok(Self { data })
    }

    /// Get the shape of the volume
    pub fn dim(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    /// Number of selectable slices; a 2D volume has exactly one.
    pub fn slice_count(&self) -> usize {
        self.data.shape().get(2).copied().unwrap_or(1)
    }

    /// Number of channels; 1 unless the volume is 4D.
    pub fn channel_count(&self) -> usize {
        self.data.shape().get(3).copied().unwrap_or(1)
    }

    /// The middle slice, shown right after loading.
    pub fn default_slice_index(&self) -> usize {
        self.slice_count() / 2
    }

    /// Copy out the 2D slice at `index` (and `channel` for 4D volumes).
    ///
    /// Both indices are ignored for 2D volumes and `channel` is ignored for
    /// 3D volumes.
    pub fn select_slice(
        &self,
        index: usize,
        channel: usize,
    ) -> Result<CanonicalSlice, TransformError> {
        if self.rank() == 2 {
            let plane = self
                .data
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(|_| TransformError::UnsupportedRank(self.rank()))?;
            return Ok(CanonicalSlice::new(plane.to_owned()));
        }

        let count = self.slice_count();
        if index >= count {
            return Err(TransformError::SliceIndexOutOfRange { index, count });
        }

        let plane: ArrayView2<'_, f32> = if self.rank() == 4 {
            let count = self.channel_count();
            if channel >= count {
                return Err(TransformError::ChannelOutOfRange { channel, count });
            }
            self.data.slice(s![.., .., index, channel])
        } else {
            self.data.slice(s![.., .., index])
        };

        debug!(index, channel, dim = ?plane.dim(), "Selected slice");
        Ok(CanonicalSlice::new(plane.to_owned()))
    }
}
