//! Viewer state owned by the UI layer.
//!
//! A [`Session`] keeps the [`CanonicalSlice`] that normalize and contrast are
//! always derived from, separately from the [`WorkingBuffer`] that rotate, flip
//! and zoom keep editing. Those three act on whatever is currently shown, so
//! zooming twice by 2 zooms the zoomed image again. Every transition computes
//! its new buffer first and only then commits it, so a failed transition leaves
//! the session untouched.

use crate::{
    config::ViewerConfig,
    enums::{OutputFormat, Rotation},
    export::{self, ExportError},
    transform::{self, DisplayBuffer, TransformError},
    view_state::ViewState,
    volume::{CanonicalSlice, Volume},
    volume_loader::{VolumeLoader, VolumeLoaderError},
};

use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] VolumeLoaderError),

    #[error(transparent)]
    InvalidInput(#[from] TransformError),

    #[error(transparent)]
    Encode(#[from] ExportError),
}

/// The currently displayed buffer, edited in place by rotate, flip and zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingBuffer(DisplayBuffer);

impl WorkingBuffer {
    /// Rebuild from the canonical slice, replaying `view` once.
    fn seed(slice: &CanonicalSlice, view: &ViewState) -> Result<Self, TransformError> {
        transform::render(slice, view).map(Self)
    }

    fn rotated(&self, step: Rotation) -> Self {
        Self(transform::rotate(&self.0, step))
    }

    fn flipped(&self) -> Self {
        Self(transform::flip(&self.0))
    }

    fn zoomed(&self, factor: f32) -> Result<Self, TransformError> {
        transform::zoom(&self.0, factor).map(Self)
    }

    pub fn image(&self) -> &DisplayBuffer {
        &self.0
    }
}

pub struct Session {
    config: ViewerConfig,
    volume: Volume,
    slice_index: usize,
    channel: usize,
    canonical: CanonicalSlice,
    working: WorkingBuffer,
    view: ViewState,
}

impl Session {
    /// Load the file at `path` and show its middle slice.
    pub fn open(path: impl AsRef<Path>, config: ViewerConfig) -> Result<Self, SessionError> {
        let volume = VolumeLoader::load(path, config.sort_by)?;
        Self::from_volume(volume, config)
    }

    /// Start a session on an already decoded volume, showing its middle slice.
    pub fn from_volume(volume: Volume, config: ViewerConfig) -> Result<Self, SessionError> {
        let slice_index = volume.default_slice_index();
        let canonical = volume.select_slice(slice_index, 0)?;
        let view = ViewState::default();
        let working = WorkingBuffer::seed(&canonical, &view)?;

        debug!(slice_index, slice_count = volume.slice_count(), "Started session");
        Ok(Self {
            config,
            volume,
            slice_index,
            channel: 0,
            canonical,
            working,
            view,
        })
    }

    /// Replace the volume with the file at `path`, resetting the view.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        *self = Self::open(path, self.config.clone())?;
        Ok(())
    }

    /// Show another slice of the volume, resetting the view.
    pub fn change_slice(&mut self, index: usize) -> Result<(), SessionError> {
        self.select(index, self.channel)
    }

    /// Show another channel of a 4D volume, resetting the view.
    pub fn change_channel(&mut self, channel: usize) -> Result<(), SessionError> {
        self.select(self.slice_index, channel)
    }

    fn select(&mut self, index: usize, channel: usize) -> Result<(), SessionError> {
        let canonical = self.volume.select_slice(index, channel)?;
        let view = ViewState::default();
        let working = WorkingBuffer::seed(&canonical, &view)?;

        debug!(index, channel, "Changed slice");
        self.slice_index = index;
        self.channel = channel;
        self.canonical = canonical;
        self.commit(view, working);
        Ok(())
    }

    /// Set the contrast factor, clamped to the configured bounds.
    ///
    /// The working buffer is rebuilt from the canonical slice, so contrast
    /// edits never compound. The current rotation and flip are replayed and
    /// the last zoom factor is applied once.
    pub fn set_contrast(&mut self, factor: f32) -> Result<(), SessionError> {
        let view = ViewState {
            contrast: self.config.clamp_contrast(factor),
            ..self.view
        };
        let working = WorkingBuffer::seed(&self.canonical, &view)?;

        debug!(contrast = view.contrast, "Set contrast");
        self.commit(view, working);
        Ok(())
    }

    /// Rotate the displayed image a quarter turn counter-clockwise.
    pub fn rotate_step(&mut self) -> Result<(), SessionError> {
        let view = self.view.rotated_by(Rotation::Deg90);
        let working = self.working.rotated(Rotation::Deg90);

        debug!(rotation = view.rotation.degrees(), "Rotated");
        self.commit(view, working);
        Ok(())
    }

    /// Mirror the displayed image across its horizontal midline.
    pub fn flip_toggle(&mut self) -> Result<(), SessionError> {
        let view = self.view.toggled_flip();
        let working = self.working.flipped();

        debug!(flipped = view.flipped, "Flipped");
        self.commit(view, working);
        Ok(())
    }

    /// Zoom into the displayed image; factors below the configured minimum
    /// are raised to it.
    ///
    /// The factor applies to the current buffer, so successive calls compound.
    pub fn set_zoom(&mut self, factor: f32) -> Result<(), SessionError> {
        let view = ViewState {
            zoom: self.config.clamp_zoom(factor),
            ..self.view
        };
        let working = self.working.zoomed(view.zoom)?;

        debug!(zoom = view.zoom, "Set zoom");
        self.commit(view, working);
        Ok(())
    }

    /// Encode the current display buffer.
    pub fn save(&self, path: impl AsRef<Path>, format: OutputFormat) -> Result<(), SessionError> {
        export::save_with_quality(self.display(), path, format, self.config.jpeg_quality)?;
        Ok(())
    }

    fn commit(&mut self, view: ViewState, working: WorkingBuffer) {
        self.view = view;
        self.working = working;
    }

    pub fn display(&self) -> &DisplayBuffer {
        self.working.image()
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn canonical_slice(&self) -> &CanonicalSlice {
        &self.canonical
    }

    pub fn working_buffer(&self) -> &WorkingBuffer {
        &self.working
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn slice_index(&self) -> usize {
        self.slice_index
    }

    pub fn slice_count(&self) -> usize {
        self.volume.slice_count()
    }

    pub fn channel(&self) -> usize {
        self.channel
    }
}
