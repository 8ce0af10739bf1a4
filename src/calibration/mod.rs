// SPDX-License-Identifier: GPL-3.0-only

//! Calibration model for the depth and color cameras
//!
//! A [`Calibration`] is immutable once built. Every construction, including
//! deserialization, assigns a fresh [`CalibrationId`]; consumers that derive
//! lookup state from a calibration compare ids, not parameter values. Two
//! calibrations with identical numbers are therefore distinct.

mod extrinsics;
mod intrinsics;

pub use extrinsics::Extrinsics;
pub use intrinsics::{Intrinsics, Lens, LensModel};

use crate::errors::CalibrationError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CALIBRATION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a [`Calibration`] instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalibrationId(u64);

impl CalibrationId {
    fn next() -> Self {
        Self(NEXT_CALIBRATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Intrinsics and native resolution of one camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraCalibration {
    pub intrinsics: Intrinsics,
    pub resolution_width: u32,
    pub resolution_height: u32,
}

impl CameraCalibration {
    pub fn new(intrinsics: Intrinsics, resolution_width: u32, resolution_height: u32) -> Self {
        Self {
            intrinsics,
            resolution_width,
            resolution_height,
        }
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.resolution_width, self.resolution_height)
    }

    fn validate(&self, camera: &str) -> Result<(), CalibrationError> {
        if self.resolution_width == 0 || self.resolution_height == 0 {
            return Err(CalibrationError::InvalidParameter(format!(
                "{} camera resolution {}x{} is empty",
                camera, self.resolution_width, self.resolution_height
            )));
        }
        self.intrinsics.validate()
    }
}

/// Plain calibration values, the serialized form of a [`Calibration`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationData {
    pub depth: CameraCalibration,
    pub color: CameraCalibration,
    /// Maps depth camera points (mm) into the color camera
    #[serde(default)]
    pub depth_to_color: Extrinsics,
}

/// Immutable calibration with an identity token
#[derive(Debug)]
pub struct Calibration {
    id: CalibrationId,
    data: CalibrationData,
}

impl Calibration {
    pub fn new(data: CalibrationData) -> Result<Self, CalibrationError> {
        data.depth.validate("depth")?;
        data.color.validate("color")?;
        data.depth_to_color.validate()?;
        Ok(Self {
            id: CalibrationId::next(),
            data,
        })
    }

    /// Distortion-free unit cameras (fx = fy = 1, principal point at the
    /// origin) sharing one coordinate system
    pub fn identity(depth: (u32, u32), color: (u32, u32)) -> Result<Self, CalibrationError> {
        let unit = Intrinsics::pinhole(1.0, 1.0, 0.0, 0.0);
        Self::new(CalibrationData {
            depth: CameraCalibration::new(unit.clone(), depth.0, depth.1),
            color: CameraCalibration::new(unit, color.0, color.1),
            depth_to_color: Extrinsics::identity(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CalibrationError> {
        let data: CalibrationData = serde_json::from_str(json)?;
        Self::new(data)
    }

    pub fn to_json(&self) -> Result<String, CalibrationError> {
        Ok(serde_json::to_string_pretty(&self.data)?)
    }

    pub fn id(&self) -> CalibrationId {
        self.id
    }

    /// Whether `other` is this very calibration (not merely equal values)
    pub fn is_same(&self, other: &Calibration) -> bool {
        self.id == other.id
    }

    pub fn depth(&self) -> &CameraCalibration {
        &self.data.depth
    }

    pub fn color(&self) -> &CameraCalibration {
        &self.data.color
    }

    pub fn depth_to_color(&self) -> &Extrinsics {
        &self.data.depth_to_color
    }

    pub fn data(&self) -> &CalibrationData {
        &self.data
    }
}
