use ndarray::{Array2, ArrayView2};

/// Keys cubic convolution coefficient, as used by common bicubic resizers.
const CUBIC_A: f32 = -0.75;

pub(crate) struct Interpolator;

impl Interpolator {
    /// Resample `slice` to `(height, width)` with bicubic interpolation.
    ///
    /// Output pixel centers are mapped back onto the source grid with a
    /// half-pixel offset; samples outside the source are clamped to the edge.
    pub(crate) fn resample_bicubic(
        slice: &ArrayView2<f32>,
        height: usize,
        width: usize,
    ) -> Array2<f32> {
        let (slice_height, slice_width) = slice.dim();
        let scale_y = slice_height as f32 / height as f32;
        let scale_x = slice_width as f32 / width as f32;

        Array2::from_shape_fn((height, width), |(y, x)| {
            let src_y = (y as f32 + 0.5) * scale_y - 0.5;
            let src_x = (x as f32 + 0.5) * scale_x - 0.5;
            Self::bicubic_interpolate(slice, src_y, src_x)
        })
    }

    #[inline]
    pub(crate) fn bicubic_interpolate(slice: &ArrayView2<f32>, y: f32, x: f32) -> f32 {
        let (height, width) = slice.dim();

        let y0 = y.floor();
        let x0 = x.floor();
        let wy = Self::cubic_weights(y - y0);
        let wx = Self::cubic_weights(x - x0);

        let clamp = |v: isize, len: usize| v.clamp(0, len as isize - 1) as usize;

        let mut value = 0.0_f32;
        for (j, weight_y) in wy.iter().enumerate() {
            let row = clamp(y0 as isize + j as isize - 1, height);
            let mut row_value = 0.0_f32;
            for (i, weight_x) in wx.iter().enumerate() {
                let col = clamp(x0 as isize + i as isize - 1, width);
                row_value = slice[[row, col]].mul_add(*weight_x, row_value);
            }
            value = row_value.mul_add(*weight_y, value);
        }
        value
    }

    /// Weights of the four taps at offsets -1, 0, 1, 2 for fractional position `t`.
    #[inline]
    fn cubic_weights(t: f32) -> [f32; 4] {
        let a = CUBIC_A;
        let near = |d: f32| ((a + 2.0) * d - (a + 3.0)) * d * d + 1.0;
        let far = |d: f32| ((a * d - 5.0 * a) * d + 8.0 * a) * d - 4.0 * a;

        let w0 = far(t + 1.0);
        let w1 = near(t);
        let w2 = near(1.0 - t);
        let w3 = 1.0 - w0 - w1 - w2;
        [w0, w1, w2, w3]
    }
}
