use std::path::Path;

/// Order in which the files of a DICOM series are stacked into a volume.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Ascending InstanceNumber, missing numbers sort as 0.
    #[default]
    InstanceNumber,
    /// Directory listing order.
    None,
}

/// Raster format of an exported display buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Pick the format from the file extension of `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("png") {
            Some(OutputFormat::Png)
        } else if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            Some(OutputFormat::Jpeg)
        } else {
            None
        }
    }
}

/// Kind of source file, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Dicom,
    Nifti,
}

impl SourceKind {
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".dcm") {
            Some(SourceKind::Dicom)
        } else if name.ends_with(".nii") || name.ends_with(".nii.gz") {
            Some(SourceKind::Nifti)
        } else {
            None
        }
    }
}

/// Counter-clockwise rotation in quarter turns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Returns `None` unless `degrees` is a multiple of 90. Negative angles
    /// wrap around, so `-90` is `Deg270`.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(Self::from_quarter_turns(degrees / 90))
    }

    fn from_quarter_turns(turns: i32) -> Self {
        match turns.rem_euclid(4) {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    fn quarter_turns(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    pub fn degrees(self) -> i32 {
        self.quarter_turns() * 90
    }

    /// Rotation equivalent to applying `self` and then `other`.
    pub fn compose(self, other: Rotation) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }

    pub fn inverse(self) -> Self {
        Self::from_quarter_turns(-self.quarter_turns())
    }

    /// Whether the rotation swaps width and height.
    pub fn is_transposing(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}
