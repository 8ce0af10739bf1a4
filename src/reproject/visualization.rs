// SPDX-License-Identifier: GPL-3.0-only

//! Raw depth/IR to grayscale visualization
//!
//! Samples are clamped to a [min, max] window and stretched linearly to
//! 0-255 (dark = min, bright = max). The result is for human inspection only.

use crate::config::VisualizationRange;
use crate::errors::{ReprojectError, ReprojectResult};
use crate::frame::{Bgra, FrameBuffer, FrameFormat};

/// Map one raw sample into 0-255
///
/// Values at or below `min` give 0, at or above `max` give 255. The range
/// must already be validated.
#[inline]
pub fn normalize_sample(sample: u16, range: &VisualizationRange) -> u8 {
    let value = sample as f64;
    if value <= range.min {
        0
    } else if value >= range.max {
        255
    } else {
        ((value - range.min) / (range.max - range.min) * 255.0) as u8
    }
}

/// Range and input format checks, independent of the output buffer
pub(crate) fn check_visualization_input(
    frame: &FrameBuffer,
    range: &VisualizationRange,
) -> ReprojectResult<()> {
    range.validate()?;
    if !frame.format().is_single_channel() {
        return Err(ReprojectError::FormatMismatch {
            expected: "Depth16 or IR16",
            actual: frame.format(),
        });
    }
    Ok(())
}

/// Render a single-channel frame as opaque grayscale BGRA into `out`
///
/// Nothing is written unless the range, the formats and the output size are
/// all valid.
pub fn visualize(
    frame: &FrameBuffer,
    range: &VisualizationRange,
    out: &mut FrameBuffer,
) -> ReprojectResult<()> {
    check_visualization_input(frame, range)?;
    out.expect_format(FrameFormat::ColorBgra32, "BGRA32 visualization buffer")?;
    out.expect_dimensions("visualization output", frame.width(), frame.height())?;

    let input = frame.view::<u16>()?;
    let mut output = out.view_mut::<Bgra>()?;
    for (src_row, dst_row) in input.rows().zip(output.rows_mut()) {
        for (&sample, px) in src_row.iter().zip(dst_row.iter_mut()) {
            *px = Bgra::gray(normalize_sample(sample, range));
        }
    }
    Ok(())
}
