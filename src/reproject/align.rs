// SPDX-License-Identifier: GPL-3.0-only

//! Color to depth-grid alignment

use super::tables::CalibrationTables;
use crate::errors::ReprojectResult;
use crate::frame::{Bgra, FrameBuffer};

/// For every depth pixel, copy the color pixel that sees the same point
///
/// Pixels without valid depth, with points behind the color camera, or that
/// land outside the color frame get [`Bgra::INVALID`].
pub(super) fn align_color_to_depth(
    tables: &CalibrationTables,
    depth: &FrameBuffer,
    color: &FrameBuffer,
    out: &mut FrameBuffer,
) -> ReprojectResult<()> {
    let depth = depth.view::<u16>()?;
    let color = color.view::<Bgra>()?;
    let mut out = out.view_mut::<Bgra>()?;

    for ((depth_row, out_row), ray_row) in depth
        .rows()
        .zip(out.rows_mut())
        .zip(tables.ray_rows())
    {
        for ((&d, px), ray) in depth_row.iter().zip(out_row.iter_mut()).zip(ray_row) {
            *px = CalibrationTables::back_project(d, ray)
                .and_then(|p| tables.color_pixel(&p))
                .and_then(|(x, y)| color.get(x, y))
                .unwrap_or(Bgra::INVALID);
        }
    }
    Ok(())
}
