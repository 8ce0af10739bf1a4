// SPDX-License-Identifier: GPL-3.0-only

//! Reprojection engine
//!
//! Three independent per-tick transforms, each writing into a caller supplied
//! buffer (normally from [`BufferCache`](crate::cache::BufferCache)):
//!
//! - depth -> point cloud on the depth grid
//! - color -> depth grid alignment
//! - raw depth/IR -> grayscale visualization
//!
//! The engine keeps the unprojection table of the last calibration it saw and
//! rebuilds it only when a calibration with a different identity arrives.
//! Inputs are validated before anything is written.

mod align;
mod point_cloud;
mod tables;
mod visualization;

pub use tables::CalibrationTables;
pub use visualization::{normalize_sample, visualize};
pub(crate) use visualization::check_visualization_input;

use crate::calibration::{Calibration, CalibrationId};
use crate::config::VisualizationRange;
use crate::errors::ReprojectResult;
use crate::frame::{FrameBuffer, FrameFormat};
use tracing::{info, warn};

/// Calibration-aware depth reprojection
#[derive(Debug, Default)]
pub struct ReprojectionEngine {
    tables: Option<CalibrationTables>,
    table_builds: usize,
}

impl ReprojectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of the calibration the current tables were built from
    pub fn cached_calibration(&self) -> Option<CalibrationId> {
        self.tables.as_ref().map(CalibrationTables::id)
    }

    /// Number of table rebuilds so far
    pub fn table_builds(&self) -> usize {
        self.table_builds
    }

    /// Tables for `calibration`, rebuilt only when its identity changed
    fn tables_for(&mut self, calibration: &Calibration) -> &CalibrationTables {
        let stale = self
            .tables
            .as_ref()
            .is_none_or(|tables| tables.id() != calibration.id());
        if stale {
            let (width, height) = calibration.depth().resolution();
            info!(
                calibration_id = ?calibration.id(),
                width,
                height,
                "Calibration changed, rebuilding unprojection tables"
            );
            self.table_builds += 1;
            return self.tables.insert(CalibrationTables::build(calibration));
        }
        self.tables
            .get_or_insert_with(|| CalibrationTables::build(calibration))
    }

    /// Back-project a depth frame into `out` (a point-cloud buffer with the
    /// depth resolution)
    ///
    /// Invalid depth samples become (0, 0, 0). Valid ones become (x, -y, -z)
    /// millimeters in the depth camera frame.
    pub fn depth_to_point_cloud(
        &mut self,
        depth: &FrameBuffer,
        calibration: &Calibration,
        out: &mut FrameBuffer,
    ) -> ReprojectResult<()> {
        check_point_cloud_inputs(depth, calibration, out)
            .inspect_err(|e| warn!(error = %e, "Rejected depth to point cloud input"))?;
        let tables = self.tables_for(calibration);
        point_cloud::depth_to_point_cloud(tables, depth, out)
    }

    /// Resample `color` onto the depth grid into `out` (a BGRA buffer with
    /// the depth resolution)
    pub fn align_color_to_depth(
        &mut self,
        depth: &FrameBuffer,
        color: &FrameBuffer,
        calibration: &Calibration,
        out: &mut FrameBuffer,
    ) -> ReprojectResult<()> {
        check_alignment_inputs(depth, color, calibration, out)
            .inspect_err(|e| warn!(error = %e, "Rejected color alignment input"))?;
        let tables = self.tables_for(calibration);
        align::align_color_to_depth(tables, depth, color, out)
    }

    /// Grayscale visualization of a depth or IR frame; needs no calibration
    pub fn visualize(
        &self,
        frame: &FrameBuffer,
        range: &VisualizationRange,
        out: &mut FrameBuffer,
    ) -> ReprojectResult<()> {
        visualize(frame, range, out)
            .inspect_err(|e| warn!(error = %e, "Rejected visualization input"))
    }
}

/// Depth frame checks shared by both calibrated passes
pub(crate) fn check_depth_input(
    depth: &FrameBuffer,
    calibration: &Calibration,
) -> ReprojectResult<()> {
    depth.expect_format(
        FrameFormat::Depth16,
        "Depth16 (passive IR frames can't be converted to 3D points)",
    )?;
    let (width, height) = calibration.depth().resolution();
    depth.expect_dimensions("depth frame vs depth calibration", width, height)
}

/// Color frame checks for alignment
pub(crate) fn check_color_input(
    color: &FrameBuffer,
    calibration: &Calibration,
) -> ReprojectResult<()> {
    color.expect_format(FrameFormat::ColorBgra32, "BGRA32 color frame")?;
    let (width, height) = calibration.color().resolution();
    color.expect_dimensions("color frame vs color calibration", width, height)
}

fn check_point_cloud_inputs(
    depth: &FrameBuffer,
    calibration: &Calibration,
    out: &FrameBuffer,
) -> ReprojectResult<()> {
    check_depth_input(depth, calibration)?;
    out.expect_format(FrameFormat::PointCloudXyz16, "XYZ16 point cloud buffer")?;
    out.expect_dimensions("point cloud output", depth.width(), depth.height())
}

fn check_alignment_inputs(
    depth: &FrameBuffer,
    color: &FrameBuffer,
    calibration: &Calibration,
    out: &FrameBuffer,
) -> ReprojectResult<()> {
    check_depth_input(depth, calibration)?;
    check_color_input(color, calibration)?;
    out.expect_format(FrameFormat::ColorBgra32, "BGRA32 aligned color buffer")?;
    out.expect_dimensions("aligned color output", depth.width(), depth.height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ReprojectError;
    use crate::frame::{Bgra, Short3};

    fn depth_frame(width: u32, height: u32, values: &[u16]) -> FrameBuffer {
        FrameBuffer::from_pixels(FrameFormat::Depth16, width, height, values).unwrap()
    }

    #[test]
    fn test_tables_reused_for_same_calibration() {
        let calibration = Calibration::identity((2, 2), (2, 2)).unwrap();
        let depth = depth_frame(2, 2, &[100, 200, 300, 400]);
        let mut out = FrameBuffer::new(FrameFormat::PointCloudXyz16, 2, 2);
        let mut engine = ReprojectionEngine::new();
        for _ in 0..5 {
            engine
                .depth_to_point_cloud(&depth, &calibration, &mut out)
                .unwrap();
        }
        assert_eq!(engine.table_builds(), 1);
        assert_eq!(engine.cached_calibration(), Some(calibration.id()));
    }

    #[test]
    fn test_new_identity_forces_rebuild() {
        let first = Calibration::identity((2, 2), (2, 2)).unwrap();
        let second = Calibration::new(first.data().clone()).unwrap();
        let depth = depth_frame(2, 2, &[100, 200, 300, 400]);
        let mut out = FrameBuffer::new(FrameFormat::PointCloudXyz16, 2, 2);
        let mut engine = ReprojectionEngine::new();
        engine.depth_to_point_cloud(&depth, &first, &mut out).unwrap();
        engine.depth_to_point_cloud(&depth, &second, &mut out).unwrap();
        engine.depth_to_point_cloud(&depth, &second, &mut out).unwrap();
        assert_eq!(engine.table_builds(), 2);
    }

    #[test]
    fn test_axis_convention() {
        let calibration = Calibration::identity((2, 2), (2, 2)).unwrap();
        let depth = depth_frame(2, 2, &[0, 0, 0, 250]);
        let mut out = FrameBuffer::new(FrameFormat::PointCloudXyz16, 2, 2);
        ReprojectionEngine::new()
            .depth_to_point_cloud(&depth, &calibration, &mut out)
            .unwrap();
        // pixel (1, 1) back-projects to (250, 250, 250)
        assert_eq!(out.to_vec::<Short3>().unwrap()[3], Short3::new(250, -250, -250));
    }

    #[test]
    fn test_infrared_rejected_for_point_cloud() {
        let calibration = Calibration::identity((2, 2), (2, 2)).unwrap();
        let ir = FrameBuffer::from_pixels(FrameFormat::Ir16, 2, 2, &[1u16; 4]).unwrap();
        let mut out = FrameBuffer::new(FrameFormat::PointCloudXyz16, 2, 2);
        let mut engine = ReprojectionEngine::new();
        let err = engine
            .depth_to_point_cloud(&ir, &calibration, &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            ReprojectError::FormatMismatch {
                actual: FrameFormat::Ir16,
                ..
            }
        ));
        assert_eq!(engine.table_builds(), 0);
    }

    #[test]
    fn test_output_size_must_match_depth() {
        let calibration = Calibration::identity((2, 2), (2, 2)).unwrap();
        let depth = depth_frame(2, 2, &[1; 4]);
        let mut out = FrameBuffer::new(FrameFormat::PointCloudXyz16, 3, 2);
        assert!(matches!(
            ReprojectionEngine::new().depth_to_point_cloud(&depth, &calibration, &mut out),
            Err(ReprojectError::ResolutionMismatch { .. })
        ));
    }

    #[test]
    fn test_alignment_identity_copies_color() {
        let calibration = Calibration::identity((2, 2), (2, 2)).unwrap();
        let depth = depth_frame(2, 2, &[0, 800, 800, 800]);
        let colors = [
            Bgra::new(1, 1, 1, 255),
            Bgra::new(2, 2, 2, 255),
            Bgra::new(3, 3, 3, 255),
            Bgra::new(4, 4, 4, 255),
        ];
        let color = FrameBuffer::from_pixels(FrameFormat::ColorBgra32, 2, 2, &colors).unwrap();
        let mut out = FrameBuffer::new(FrameFormat::ColorBgra32, 2, 2);
        ReprojectionEngine::new()
            .align_color_to_depth(&depth, &color, &calibration, &mut out)
            .unwrap();
        let aligned = out.to_vec::<Bgra>().unwrap();
        assert_eq!(aligned[0], Bgra::INVALID);
        assert_eq!(&aligned[1..], &colors[1..]);
    }

    #[test]
    fn test_alignment_out_of_bounds_is_invalid() {
        let mut data = Calibration::identity((2, 1), (2, 1)).unwrap().data().clone();
        // Shift everything one color pixel to the right
        data.color.intrinsics.cx = 1.0;
        let calibration = Calibration::new(data).unwrap();
        let depth = depth_frame(2, 1, &[500, 500]);
        let color = FrameBuffer::from_pixels(
            FrameFormat::ColorBgra32,
            2,
            1,
            &[Bgra::new(9, 9, 9, 255), Bgra::new(7, 7, 7, 255)],
        )
        .unwrap();
        let mut out = FrameBuffer::new(FrameFormat::ColorBgra32, 2, 1);
        ReprojectionEngine::new()
            .align_color_to_depth(&depth, &color, &calibration, &mut out)
            .unwrap();
        assert_eq!(
            out.to_vec::<Bgra>().unwrap(),
            vec![Bgra::new(7, 7, 7, 255), Bgra::INVALID]
        );
    }

    #[test]
    fn test_alignment_rejects_color_resolution_mismatch() {
        let calibration = Calibration::identity((2, 2), (4, 4)).unwrap();
        let depth = depth_frame(2, 2, &[1; 4]);
        let color = FrameBuffer::new(FrameFormat::ColorBgra32, 2, 2);
        let mut out = FrameBuffer::new(FrameFormat::ColorBgra32, 2, 2);
        out.view_mut::<Bgra>().unwrap().fill(Bgra::gray(9));
        let err = ReprojectionEngine::new()
            .align_color_to_depth(&depth, &color, &calibration, &mut out)
            .unwrap_err();
        assert!(matches!(err, ReprojectError::ResolutionMismatch { .. }));
        assert_eq!(out.to_vec::<Bgra>().unwrap(), vec![Bgra::gray(9); 4]);
    }
}
