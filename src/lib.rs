//! # Slice viewer library
//!
//! This crate serves the display pipeline of a medical image viewer: it
//! loads DICOM and NIfTI volumes, picks a single 2D slice and turns it into an
//! 8-bit grayscale buffer ready to be shown or exported.
//!
//! Volumes can either be loaded from a single DICOM file, a multi-frame DICOM
//! object, a directory holding a DICOM series or a NIfTI-1 file (`.nii` or
//! `.nii.gz`). Decoded data always has the axis order
//! `(height, width[, slices[, channels]])`. The displayed slice is adjusted
//! with a small set of 2D operations:
//!  - Normalize
//!  - Contrast
//!  - Rotate (quarter turns)
//!  - Flip
//!  - Zoom (center crop and bicubic resample)
//!
//! A [`Session`] holds the state a viewer needs between user actions. The
//! untouched slice and the rotated/flipped working buffer are kept apart, so
//! contrast edits never compound while rotations do.
//!
//! # Examples
//!
//! ## Rendering the middle slice of a series
//!
//! ```no_run
//! # use slice_viewer::{OutputFormat, Session, ViewerConfig};
//! let mut session = Session::open("dicom/IM0001.dcm", ViewerConfig::default())
//!     .expect("should have loaded the series");
//! session.set_contrast(1.5).expect("should have adjusted contrast");
//! session.rotate_step().expect("should have rotated");
//! session.set_zoom(2.0).expect("should have zoomed");
//! session
//!     .save("result.png", OutputFormat::Png)
//!     .expect("should have written the image");
//! ```
//!
//! ## Using the transforms directly
//!
//! ```no_run
//! # use slice_viewer::{SortBy, ViewState, VolumeLoader, transform};
//! let volume = VolumeLoader::load("brain.nii.gz", SortBy::default())
//!     .expect("should have loaded the volume");
//! let slice = volume
//!     .select_slice(volume.default_slice_index(), 0)
//!     .expect("should have selected the middle slice");
//! let image = transform::render(&slice, &ViewState::default())
//!     .expect("should have rendered a non-constant slice");
//! ```

pub mod config;
pub mod enums;
pub mod export;
mod interpolator;
pub mod session;
pub mod transform;
pub mod view_state;
pub mod volume;
pub mod volume_loader;

pub use config::ViewerConfig;
pub use enums::{OutputFormat, Rotation, SortBy, SourceKind};
pub use session::{Session, SessionError, WorkingBuffer};
pub use transform::{DisplayBuffer, TransformError};
pub use view_state::ViewState;
pub use volume::{CanonicalSlice, Volume};
pub use volume_loader::{VolumeLoader, VolumeLoaderError};
