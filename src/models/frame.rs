//! Zero-copy view of one captured preview frame.
//!
//! The capture subsystem owns the pixel buffer; a [`FrameBufferView`] merely
//! borrows it for the duration of the frame callback. Anything the pipeline
//! needs beyond that point is copied into a [`crate::models::LuminanceGrid`].

/// Pixel layout of a captured frame.
///
/// For planar and semi-planar YUV layouts only the leading luma plane is
/// read; chroma is ignored by the scanning pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single 8-bit luminance plane.
    Gray8,
    /// Semi-planar YUV 4:2:0 (luma plane followed by interleaved chroma).
    Nv12,
    /// Planar YUV 4:2:0 (luma plane followed by two chroma planes).
    Yuv420,
    /// Packed 8-bit RGB, 3 bytes per pixel.
    Rgb24,
}

impl PixelFormat {
    /// Bytes per sample in the plane the converter reads.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            PixelFormat::Gray8 | PixelFormat::Nv12 | PixelFormat::Yuv420 => 1,
            PixelFormat::Rgb24 => 3,
        }
    }
}

/// Rectangular crop window in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge, in pixels.
    pub x: usize,
    /// Top edge, in pixels.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl CropRect {
    /// Whether the rectangle lies fully inside a `width` x `height` frame.
    pub fn fits(&self, width: usize, height: usize) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }
}

/// Read-only description of one captured frame.
///
/// `stride` is the byte distance between the starts of consecutive rows of
/// the primary plane and may exceed `width * bytes_per_sample` when the
/// capture subsystem pads rows.
#[derive(Debug, Clone, Copy)]
pub struct FrameBufferView<'a> {
    /// Raw pixel bytes, owned by the capture subsystem.
    pub data: &'a [u8],
    /// Pixel layout of `data`.
    pub format: PixelFormat,
    /// Logical width in pixels.
    pub width: usize,
    /// Logical height in pixels.
    pub height: usize,
    /// Bytes per row of the primary plane.
    pub stride: usize,
}

impl<'a> FrameBufferView<'a> {
    /// Convenience constructor for a tightly packed single-plane gray frame.
    pub fn gray(data: &'a [u8], width: usize, height: usize) -> Self {
        Self {
            data,
            format: PixelFormat::Gray8,
            width,
            height,
            stride: width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_containment() {
        let c = CropRect { x: 10, y: 10, width: 20, height: 20 };
        assert!(c.fits(30, 30));
        assert!(!c.fits(29, 30));
        assert!(!c.fits(30, 29));

        let zero = CropRect { x: 0, y: 0, width: 0, height: 5 };
        assert!(!zero.fits(10, 10));
    }

    #[test]
    fn gray_view_is_tightly_packed() {
        let buf = vec![0u8; 12];
        let view = FrameBufferView::gray(&buf, 4, 3);
        assert_eq!(view.stride, 4);
        assert_eq!(view.format.bytes_per_sample(), 1);
    }
}
