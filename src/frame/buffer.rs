// SPDX-License-Identifier: GPL-3.0-only

//! Stride-padded 2D frame storage with typed views

use super::format::{FrameFormat, Pixel};
use crate::errors::{ReprojectError, ReprojectResult};

/// A width x height grid of pixels in one [`FrameFormat`]
///
/// Rows are `stride` bytes apart and may carry padding. The stride is always a
/// multiple of the pixel size, so a typed view can address pixels directly.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    format: FrameFormat,
    width: u32,
    height: u32,
    stride: usize,
    // u16 words keep every pixel type castable in place (all pixel sizes are even)
    data: Vec<u16>,
}

impl FrameBuffer {
    /// Allocate a zero-filled frame with a tight stride
    pub fn new(format: FrameFormat, width: u32, height: u32) -> Self {
        let stride = width as usize * format.bytes_per_pixel();
        let words = stride * height as usize / 2;
        Self {
            format,
            width,
            height,
            stride,
            data: vec![0; words],
        }
    }

    /// Copy a frame out of raw sensor bytes
    ///
    /// `bytes` must hold at least `stride * height` bytes; anything past that
    /// is ignored.
    pub fn from_bytes(
        format: FrameFormat,
        width: u32,
        height: u32,
        stride: usize,
        bytes: &[u8],
    ) -> ReprojectResult<Self> {
        let bpp = format.bytes_per_pixel();
        let row_bytes = width as usize * bpp;
        if stride < row_bytes {
            return Err(ReprojectError::InvalidBuffer(format!(
                "stride {} is shorter than a {} row of {} pixels",
                stride, format, width
            )));
        }
        if stride % bpp != 0 {
            return Err(ReprojectError::InvalidBuffer(format!(
                "stride {} is not a multiple of the {} pixel size {}",
                stride, format, bpp
            )));
        }
        let len = stride * height as usize;
        if bytes.len() < len {
            return Err(ReprojectError::InvalidBuffer(format!(
                "{}x{} {} frame needs {} bytes, got {}",
                width,
                height,
                format,
                len,
                bytes.len()
            )));
        }

        let mut data = vec![0u16; len / 2];
        bytemuck::cast_slice_mut::<u16, u8>(&mut data).copy_from_slice(&bytes[..len]);

        Ok(Self {
            format,
            width,
            height,
            stride,
            data,
        })
    }

    /// Build a tightly packed frame from typed pixels in row-major order
    pub fn from_pixels<P: Pixel>(
        format: FrameFormat,
        width: u32,
        height: u32,
        pixels: &[P],
    ) -> ReprojectResult<Self> {
        if !P::accepts(format) {
            return Err(ReprojectError::FormatMismatch {
                expected: P::DESCRIPTION,
                actual: format,
            });
        }
        let count = width as usize * height as usize;
        if pixels.len() != count {
            return Err(ReprojectError::InvalidBuffer(format!(
                "{}x{} frame needs {} pixels, got {}",
                width,
                height,
                count,
                pixels.len()
            )));
        }
        Self::from_bytes(
            format,
            width,
            height,
            width as usize * format.bytes_per_pixel(),
            bytemuck::cast_slice(pixels),
        )
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the starts of two consecutive rows
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn has_dimensions(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw bytes including row padding
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Reset every byte to zero
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Fail unless the frame is exactly `format`
    pub fn expect_format(
        &self,
        format: FrameFormat,
        expected: &'static str,
    ) -> ReprojectResult<()> {
        if self.format == format {
            Ok(())
        } else {
            Err(ReprojectError::FormatMismatch {
                expected,
                actual: self.format,
            })
        }
    }

    /// Fail unless the frame is `width x height`
    pub fn expect_dimensions(
        &self,
        what: &'static str,
        width: u32,
        height: u32,
    ) -> ReprojectResult<()> {
        if self.has_dimensions(width, height) {
            Ok(())
        } else {
            Err(ReprojectError::ResolutionMismatch {
                what,
                expected: (width, height),
                actual: self.dimensions(),
            })
        }
    }

    fn check_pixel<P: Pixel>(&self) -> ReprojectResult<()> {
        if P::accepts(self.format) {
            debug_assert_eq!(std::mem::size_of::<P>(), self.format.bytes_per_pixel());
            Ok(())
        } else {
            Err(ReprojectError::FormatMismatch {
                expected: P::DESCRIPTION,
                actual: self.format,
            })
        }
    }

    fn pitch<P: Pixel>(&self) -> usize {
        self.stride / std::mem::size_of::<P>()
    }

    /// Typed read-only view; the format is checked once here, not per pixel
    pub fn view<P: Pixel>(&self) -> ReprojectResult<FrameView<'_, P>> {
        self.check_pixel::<P>()?;
        let pitch = self.pitch::<P>();
        let pixels = bytemuck::try_cast_slice(&self.data)
            .map_err(|e| ReprojectError::InvalidBuffer(format!("{:?}", e)))?;
        Ok(FrameView {
            pixels,
            width: self.width as usize,
            height: self.height as usize,
            pitch,
        })
    }

    /// Typed mutable view
    pub fn view_mut<P: Pixel>(&mut self) -> ReprojectResult<FrameViewMut<'_, P>> {
        self.check_pixel::<P>()?;
        let pitch = self.pitch::<P>();
        let (width, height) = (self.width as usize, self.height as usize);
        let pixels = bytemuck::try_cast_slice_mut(&mut self.data)
            .map_err(|e| ReprojectError::InvalidBuffer(format!("{:?}", e)))?;
        Ok(FrameViewMut {
            pixels,
            width,
            height,
            pitch,
        })
    }

    /// Copy the pixels out without row padding
    pub fn to_vec<P: Pixel>(&self) -> ReprojectResult<Vec<P>> {
        let view = self.view::<P>()?;
        let mut out = Vec::with_capacity(self.pixel_count());
        for row in view.rows() {
            out.extend_from_slice(row);
        }
        Ok(out)
    }
}

/// Read-only typed access to a frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a, P> {
    pixels: &'a [P],
    width: usize,
    height: usize,
    pitch: usize,
}

impl<'a, P: Pixel> FrameView<'a, P> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at (x, y), or None outside the frame
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<P> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.pitch + x])
        } else {
            None
        }
    }

    /// Row `y` without padding
    ///
    /// Panics if `y` is outside the frame.
    pub fn row(&self, y: usize) -> &'a [P] {
        let start = y * self.pitch;
        &self.pixels[start..start + self.width]
    }

    /// Rows top to bottom, without padding
    pub fn rows(self) -> impl Iterator<Item = &'a [P]> {
        let width = self.width;
        self.pixels
            .chunks_exact(self.pitch.max(1))
            .map(move |row| &row[..width])
    }
}

/// Mutable typed access to a frame
#[derive(Debug)]
pub struct FrameViewMut<'a, P> {
    pixels: &'a mut [P],
    width: usize,
    height: usize,
    pitch: usize,
}

impl<P: Pixel> FrameViewMut<'_, P> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows top to bottom, without padding
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [P]> {
        let width = self.width;
        self.pixels
            .chunks_exact_mut(self.pitch.max(1))
            .map(move |row| &mut row[..width])
    }

    /// Write every pixel in the frame
    pub fn fill(&mut self, value: P) {
        for row in self.rows_mut() {
            row.fill(value);
        }
    }
}
