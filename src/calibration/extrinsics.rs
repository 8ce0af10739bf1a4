// SPDX-License-Identifier: GPL-3.0-only

//! Rigid transform between two camera coordinate systems

use crate::errors::CalibrationError;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Rotation + translation mapping points from a source camera into a target camera
///
/// Translation is in millimeters, matching depth samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extrinsics {
    pub rotation: Matrix3<f32>,
    pub translation: Vector3<f32>,
}

impl Default for Extrinsics {
    fn default() -> Self {
        Self::identity()
    }
}

impl Extrinsics {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn new(rotation: Matrix3<f32>, translation: Vector3<f32>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Build from a row-major 3x3 rotation and a translation in millimeters
    pub fn from_row_major(rotation: [f32; 9], translation_mm: [f32; 3]) -> Self {
        Self {
            rotation: Matrix3::from_row_slice(&rotation),
            translation: Vector3::from(translation_mm),
        }
    }

    /// Map a point from the source camera into the target camera
    #[inline]
    pub fn apply(&self, point: &Vector3<f32>) -> Vector3<f32> {
        self.rotation * point + self.translation
    }

    /// Transform going the other way (target camera back into source)
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.transpose();
        let translation = -(rotation * self.translation);
        Self {
            rotation,
            translation,
        }
    }

    pub fn validate(&self) -> Result<(), CalibrationError> {
        let finite = self.rotation.iter().all(|v| v.is_finite())
            && self.translation.iter().all(|v| v.is_finite());
        if !finite {
            return Err(CalibrationError::InvalidParameter(
                "extrinsics contain non-finite values".to_string(),
            ));
        }
        // Device rotations are close to, not exactly, orthonormal
        let det = self.rotation.determinant();
        if (det - 1.0).abs() > 1e-2 {
            return Err(CalibrationError::InvalidParameter(format!(
                "rotation determinant {} is not 1",
                det
            )));
        }
        Ok(())
    }
}
