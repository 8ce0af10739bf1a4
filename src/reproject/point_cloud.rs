// SPDX-License-Identifier: GPL-3.0-only

//! Depth to point cloud back-projection

use super::tables::CalibrationTables;
use crate::errors::ReprojectResult;
use crate::frame::{FrameBuffer, Short3};

/// Millimeters to i16, rounded to nearest (`as` saturates out-of-range values)
#[inline]
fn to_mm_i16(value: f32) -> i16 {
    value.round() as i16
}

/// Write one point per depth pixel into `out`
///
/// Points are emitted as (x, -y, -z): the sensor's Y-down / Z-forward frame
/// flipped to Y-up with the camera looking down -Z.
pub(super) fn depth_to_point_cloud(
    tables: &CalibrationTables,
    depth: &FrameBuffer,
    out: &mut FrameBuffer,
) -> ReprojectResult<()> {
    let depth = depth.view::<u16>()?;
    let mut out = out.view_mut::<Short3>()?;

    for ((depth_row, out_row), ray_row) in depth
        .rows()
        .zip(out.rows_mut())
        .zip(tables.ray_rows())
    {
        for ((&d, point), ray) in depth_row.iter().zip(out_row.iter_mut()).zip(ray_row) {
            *point = match CalibrationTables::back_project(d, ray) {
                Some(p) => Short3::new(to_mm_i16(p.x), to_mm_i16(-p.y), to_mm_i16(-p.z)),
                None => Short3::INVALID,
            };
        }
    }
    Ok(())
}
