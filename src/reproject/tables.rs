// SPDX-License-Identifier: GPL-3.0-only

//! Calibration-derived lookup state
//!
//! Inverting the depth lens model is iterative and far too expensive to run
//! per pixel per frame. It only depends on the calibration, so the ray for
//! every depth pixel is solved once and reused until the calibration changes.

use crate::calibration::{Calibration, CalibrationId, Extrinsics, Lens};
use crate::constants::DEPTH_INVALID_MM;
use nalgebra::Vector3;
use tracing::debug;

/// Per-calibration tables shared by the point-cloud and alignment passes
#[derive(Debug, Clone)]
pub struct CalibrationTables {
    id: CalibrationId,
    width: usize,
    height: usize,
    /// Normalized (x/z, y/z) ray per depth pixel, NaN where the lens model has no inverse
    rays: Vec<[f32; 2]>,
    color_lens: Lens,
    depth_to_color: Extrinsics,
}

impl CalibrationTables {
    pub fn build(calibration: &Calibration) -> Self {
        let (width, height) = calibration.depth().resolution();
        let (width, height) = (width as usize, height as usize);
        let depth_lens = Lens::from(&calibration.depth().intrinsics);

        let mut rays = Vec::with_capacity(width * height);
        let mut invalid = 0usize;
        for v in 0..height {
            for u in 0..width {
                match depth_lens.unproject([u as f64, v as f64]) {
                    Some([x, y]) => rays.push([x as f32, y as f32]),
                    None => {
                        invalid += 1;
                        rays.push([f32::NAN; 2]);
                    }
                }
            }
        }

        debug!(
            width,
            height,
            invalid_rays = invalid,
            "Built depth unprojection table"
        );

        Self {
            id: calibration.id(),
            width,
            height,
            rays,
            color_lens: Lens::from(&calibration.color().intrinsics),
            depth_to_color: calibration.depth_to_color().clone(),
        }
    }

    pub fn id(&self) -> CalibrationId {
        self.id
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Table rows matching depth frame rows
    pub fn ray_rows(&self) -> std::slice::ChunksExact<'_, [f32; 2]> {
        self.rays.chunks_exact(self.width.max(1))
    }

    /// Depth camera point (mm, native axes) for a sample, None for the
    /// invalid sentinel or a pixel without a ray
    #[inline]
    pub fn back_project(depth_mm: u16, ray: &[f32; 2]) -> Option<Vector3<f32>> {
        if depth_mm == DEPTH_INVALID_MM || ray[0].is_nan() {
            return None;
        }
        let z = depth_mm as f32;
        Some(Vector3::new(ray[0] * z, ray[1] * z, z))
    }

    /// Nearest color pixel seen by a depth camera point
    #[inline]
    pub fn color_pixel(&self, point: &Vector3<f32>) -> Option<(usize, usize)> {
        let p = self.depth_to_color.apply(point);
        if p.z <= 0.0 {
            return None;
        }
        let z = p.z as f64;
        let [u, v] = self
            .color_lens
            .project([p.x as f64 / z, p.y as f64 / z])?;
        let (u, v) = (u.round(), v.round());
        if u < 0.0 || v < 0.0 || !u.is_finite() || !v.is_finite() {
            return None;
        }
        Some((u as usize, v as usize))
    }
}
