use crate::enums::Rotation;

/// Display parameters applied on top of the canonical slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub contrast: f32,
    pub zoom: f32,
    pub rotation: Rotation,
    pub flipped: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            zoom: 1.0,
            rotation: Rotation::Deg0,
            flipped: false,
        }
    }
}

impl ViewState {
    /// State after rotating the currently displayed image by `step`.
    ///
    /// Rendering rotates before flipping, so on a flipped image the step is
    /// recorded in the opposite direction.
    pub fn rotated_by(self, step: Rotation) -> Self {
        let step = if self.flipped { step.inverse() } else { step };
        Self {
            rotation: self.rotation.compose(step),
            ..self
        }
    }

    /// State after mirroring the currently displayed image.
    pub fn toggled_flip(self) -> Self {
        Self {
            flipped: !self.flipped,
            ..self
        }
    }
}
