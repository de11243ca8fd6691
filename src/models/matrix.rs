/// Compact binary bitmap for one decode attempt.
///
/// Row-major bitset where `true` marks a foreground (dark) pixel. Immutable
/// once the binarizer has filled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBitmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryBitmap {
    /// Create an all-background bitmap with the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Bitmap width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bitmap height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the bit at (x, y); out-of-bounds reads return false.
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Set the bit at (x, y); out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        if value {
            self.data[byte_index] |= 1 << bit_index;
        } else {
            self.data[byte_index] &= !(1 << bit_index);
        }
    }

    /// One row expanded to booleans, for the scan-line decoders.
    pub fn row_bits(&self, y: usize) -> Vec<bool> {
        (0..self.width).map(|x| self.get(x, y)).collect()
    }

    /// One column expanded to booleans.
    pub fn col_bits(&self, x: usize) -> Vec<bool> {
        (0..self.height).map(|y| self.get(x, y)).collect()
    }
}
