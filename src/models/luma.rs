/// Dense row-major grid of 8-bit luminance samples.
///
/// Produced by the luminance converter from a frame view; immutable once
/// built and consumed by the binarizer.
#[derive(Debug, Clone)]
pub struct LuminanceGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl LuminanceGrid {
    /// Wrap an already row-major sample buffer.
    ///
    /// Panics in debug builds if the buffer does not match the dimensions.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self { width, height, data }
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// One row of samples.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// The whole sample buffer, row-major.
    pub fn samples(&self) -> &[u8] {
        &self.data
    }

    /// Minimum and maximum sample value over the whole grid.
    pub fn dynamic_range(&self) -> (u8, u8) {
        let mut min = u8::MAX;
        let mut max = u8::MIN;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
        }
        (min, max)
    }
}
