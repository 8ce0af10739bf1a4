// SPDX-License-Identifier: GPL-3.0-only

//! Frame buffers for depth, infrared, color, point-cloud and visualization data
//!
//! All frames share one storage type, [`FrameBuffer`], tagged with a
//! [`FrameFormat`]. Operations obtain a typed view once and then walk rows of
//! contiguous pixels.

mod buffer;
mod format;

pub use buffer::{FrameBuffer, FrameView, FrameViewMut};
pub use format::{Bgra, FrameFormat, Pixel, Short3};

use crate::errors::{ReprojectError, ReprojectResult};
use image::RgbaImage;

/// Convert a BGRA frame (color capture, aligned color or visualization) to an
/// RGBA image for display
pub fn to_rgba_image(frame: &FrameBuffer) -> ReprojectResult<RgbaImage> {
    let view = frame.view::<Bgra>()?;
    let mut rgba = Vec::with_capacity(frame.pixel_count() * 4);
    for row in view.rows() {
        for px in row {
            rgba.extend_from_slice(&[px.r, px.g, px.b, px.a]);
        }
    }
    RgbaImage::from_raw(frame.width(), frame.height(), rgba).ok_or_else(|| {
        ReprojectError::InvalidBuffer(format!(
            "{}x{} frame does not fit an RGBA image",
            frame.width(),
            frame.height()
        ))
    })
}
