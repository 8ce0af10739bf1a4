// SPDX-License-Identifier: GPL-3.0-only

//! Camera intrinsics and the lens distortion model
//!
//! Parameters follow the device order
//! `cx, cy, fx, fy, k1, k2, k3, k4, k5, k6, codx, cody, p2, p1, metric_radius`.
//! Pixel coordinates address pixel centers at integer positions.

use crate::constants::{
    LENS_PARAMETER_COUNT_DEFAULT, LENS_PARAMETER_SLOTS, UNPROJECT_CONVERGENCE_SQ,
    UNPROJECT_MAX_ERROR_PX, UNPROJECT_MAX_ITERATIONS,
};
use crate::errors::CalibrationError;
use serde::{Deserialize, Serialize};

/// Lens distortion model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LensModel {
    /// Rational radial + tangential distortion
    #[default]
    BrownConrady,
    /// Legacy variant of the rational model with single-weight tangential cross terms
    Rational6Kt,
}

fn default_parameter_count() -> u32 {
    LENS_PARAMETER_COUNT_DEFAULT
}

/// Intrinsic parameters of one camera, as reported by the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    #[serde(default)]
    pub model: LensModel,
    /// Principal point X (pixels)
    pub cx: f32,
    /// Principal point Y (pixels)
    pub cy: f32,
    /// Focal length X (pixels)
    pub fx: f32,
    /// Focal length Y (pixels)
    pub fy: f32,
    #[serde(default)]
    pub k1: f32,
    #[serde(default)]
    pub k2: f32,
    #[serde(default)]
    pub k3: f32,
    #[serde(default)]
    pub k4: f32,
    #[serde(default)]
    pub k5: f32,
    #[serde(default)]
    pub k6: f32,
    /// Center of distortion X (normalized image plane)
    #[serde(default)]
    pub codx: f32,
    /// Center of distortion Y (normalized image plane)
    #[serde(default)]
    pub cody: f32,
    #[serde(default)]
    pub p2: f32,
    #[serde(default)]
    pub p1: f32,
    /// Largest valid radius on the normalized image plane, 0 = unlimited
    #[serde(default)]
    pub metric_radius: f32,
    /// Number of meaningful entries in the parameter vector
    #[serde(default = "default_parameter_count")]
    pub parameter_count: u32,
}

impl Intrinsics {
    /// Distortion-free pinhole camera
    pub fn pinhole(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self {
            model: LensModel::BrownConrady,
            cx,
            cy,
            fx,
            fy,
            k1: 0.0,
            k2: 0.0,
            k3: 0.0,
            k4: 0.0,
            k5: 0.0,
            k6: 0.0,
            codx: 0.0,
            cody: 0.0,
            p2: 0.0,
            p1: 0.0,
            metric_radius: 0.0,
            parameter_count: LENS_PARAMETER_COUNT_DEFAULT,
        }
    }

    /// Build from a device parameter vector; missing trailing entries are zero
    pub fn from_parameters(
        model: LensModel,
        parameters: &[f32],
        parameter_count: u32,
    ) -> Result<Self, CalibrationError> {
        if parameters.len() < 4 {
            return Err(CalibrationError::InvalidParameter(format!(
                "need at least cx, cy, fx, fy, got {} parameters",
                parameters.len()
            )));
        }
        if parameters.len() > LENS_PARAMETER_SLOTS {
            return Err(CalibrationError::InvalidParameter(format!(
                "at most {} lens parameters, got {}",
                LENS_PARAMETER_SLOTS,
                parameters.len()
            )));
        }
        let mut p = [0.0f32; LENS_PARAMETER_SLOTS];
        p[..parameters.len()].copy_from_slice(parameters);
        let intrinsics = Self {
            model,
            cx: p[0],
            cy: p[1],
            fx: p[2],
            fy: p[3],
            k1: p[4],
            k2: p[5],
            k3: p[6],
            k4: p[7],
            k5: p[8],
            k6: p[9],
            codx: p[10],
            cody: p[11],
            p2: p[12],
            p1: p[13],
            metric_radius: p[14],
            parameter_count,
        };
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    /// All parameter slots in device order
    pub fn parameter_vector(&self) -> [f32; LENS_PARAMETER_SLOTS] {
        [
            self.cx,
            self.cy,
            self.fx,
            self.fy,
            self.k1,
            self.k2,
            self.k3,
            self.k4,
            self.k5,
            self.k6,
            self.codx,
            self.cody,
            self.p2,
            self.p1,
            self.metric_radius,
        ]
    }

    /// The meaningful parameters, truncated to `parameter_count`
    pub fn parameters(&self) -> Vec<f32> {
        let count = (self.parameter_count as usize).min(LENS_PARAMETER_SLOTS);
        self.parameter_vector()[..count].to_vec()
    }

    pub fn validate(&self) -> Result<(), CalibrationError> {
        if let Some(bad) = self.parameter_vector().iter().find(|v| !v.is_finite()) {
            return Err(CalibrationError::InvalidParameter(format!(
                "non-finite lens parameter {}",
                bad
            )));
        }
        if self.fx <= 0.0 || self.fy <= 0.0 {
            return Err(CalibrationError::InvalidParameter(format!(
                "focal lengths must be positive (fx={}, fy={})",
                self.fx, self.fy
            )));
        }
        if self.metric_radius < 0.0 {
            return Err(CalibrationError::InvalidParameter(format!(
                "negative metric radius {}",
                self.metric_radius
            )));
        }
        if self.parameter_count as usize > LENS_PARAMETER_SLOTS {
            return Err(CalibrationError::InvalidParameter(format!(
                "parameter count {} exceeds {}",
                self.parameter_count, LENS_PARAMETER_SLOTS
            )));
        }
        Ok(())
    }

    /// Project a point on the normalized image plane (x/z, y/z) to pixels
    pub fn project(&self, point: [f64; 2]) -> Option<[f64; 2]> {
        Lens::from(self).project(point)
    }

    /// Ray through pixel (u, v) on the normalized image plane
    pub fn unproject(&self, pixel: [f64; 2]) -> Option<[f64; 2]> {
        Lens::from(self).unproject(pixel)
    }
}

/// Working copy of [`Intrinsics`] in f64, built once per calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    cross: f64,
    cx: f64,
    cy: f64,
    fx: f64,
    fy: f64,
    k: [f64; 6],
    codx: f64,
    cody: f64,
    p1: f64,
    p2: f64,
    max_radius_sq: Option<f64>,
}

impl From<&Intrinsics> for Lens {
    fn from(i: &Intrinsics) -> Self {
        let radius = i.metric_radius as f64;
        Self {
            cross: match i.model {
                LensModel::BrownConrady => 2.0,
                LensModel::Rational6Kt => 1.0,
            },
            cx: i.cx as f64,
            cy: i.cy as f64,
            fx: i.fx as f64,
            fy: i.fy as f64,
            k: [
                i.k1 as f64,
                i.k2 as f64,
                i.k3 as f64,
                i.k4 as f64,
                i.k5 as f64,
                i.k6 as f64,
            ],
            codx: i.codx as f64,
            cody: i.cody as f64,
            p1: i.p1 as f64,
            p2: i.p2 as f64,
            max_radius_sq: (radius > 0.0).then_some(radius * radius),
        }
    }
}

impl Lens {
    /// Distorted normalized coordinates and their Jacobian with respect to (x, y)
    fn distort(&self, x: f64, y: f64) -> Option<([f64; 2], [[f64; 2]; 2])> {
        let [k1, k2, k3, k4, k5, k6] = self.k;
        let (p1, p2, c) = (self.p1, self.p2, self.cross);

        let xp = x - self.codx;
        let yp = y - self.cody;
        let xp2 = xp * xp;
        let yp2 = yp * yp;
        let xyp = xp * yp;
        let rs = xp2 + yp2;
        if self.max_radius_sq.is_some_and(|max| rs > max) {
            return None;
        }
        let rss = rs * rs;
        let rsc = rss * rs;

        let a = 1.0 + k1 * rs + k2 * rss + k3 * rsc;
        let b = 1.0 + k4 * rs + k5 * rss + k6 * rsc;
        if b.abs() < f64::EPSILON {
            return None;
        }
        let d = a / b;
        let da = k1 + 2.0 * k2 * rs + 3.0 * k3 * rss;
        let db = k4 + 2.0 * k5 * rs + 3.0 * k6 * rss;
        // d(radial factor) / d(r^2)
        let dd = (da * b - a * db) / (b * b);

        let xd = xp * d + (rs + 2.0 * xp2) * p2 + c * xyp * p1 + self.codx;
        let yd = yp * d + (rs + 2.0 * yp2) * p1 + c * xyp * p2 + self.cody;

        let jacobian = [
            [
                d + 2.0 * xp2 * dd + 6.0 * xp * p2 + c * yp * p1,
                2.0 * xyp * dd + 2.0 * yp * p2 + c * xp * p1,
            ],
            [
                2.0 * xyp * dd + 2.0 * xp * p1 + c * yp * p2,
                d + 2.0 * yp2 * dd + 6.0 * yp * p1 + c * xp * p2,
            ],
        ];
        Some(([xd, yd], jacobian))
    }

    /// Normalized image plane to pixels
    #[inline]
    pub fn project(&self, point: [f64; 2]) -> Option<[f64; 2]> {
        let ([xd, yd], _) = self.distort(point[0], point[1])?;
        Some([xd * self.fx + self.cx, yd * self.fy + self.cy])
    }

    /// Pixels to the normalized image plane (Gauss-Newton on the lens model)
    pub fn unproject(&self, pixel: [f64; 2]) -> Option<[f64; 2]> {
        let target = [
            (pixel[0] - self.cx) / self.fx,
            (pixel[1] - self.cy) / self.fy,
        ];
        let mut p = target;

        for _ in 0..UNPROJECT_MAX_ITERATIONS {
            let (f, j) = self.distort(p[0], p[1])?;
            let e = [target[0] - f[0], target[1] - f[1]];
            if e[0] * e[0] + e[1] * e[1] < UNPROJECT_CONVERGENCE_SQ {
                return Some(p);
            }
            let det = j[0][0] * j[1][1] - j[0][1] * j[1][0];
            if det.abs() < 1e-12 {
                return None;
            }
            p[0] += (j[1][1] * e[0] - j[0][1] * e[1]) / det;
            p[1] += (j[0][0] * e[1] - j[1][0] * e[0]) / det;
        }

        let (f, _) = self.distort(p[0], p[1])?;
        let ex = (target[0] - f[0]) * self.fx;
        let ey = (target[1] - f[1]) * self.fy;
        (ex * ex + ey * ey <= UNPROJECT_MAX_ERROR_PX * UNPROJECT_MAX_ERROR_PX).then_some(p)
    }
}
