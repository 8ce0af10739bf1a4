// SPDX-License-Identifier: GPL-3.0-only

//! Error types for depth reprojection
//!
//! Every error is synchronous and local to the call that produced it. A failed
//! tick yields no updated output; the caller decides whether to skip the frame.

use crate::frame::FrameFormat;
use std::fmt;

/// Result type alias using ReprojectError
pub type ReprojectResult<T> = Result<T, ReprojectError>;

/// Main error type
#[derive(Debug, Clone, PartialEq)]
pub enum ReprojectError {
    /// Visualization range with `min >= max` (or a NaN bound)
    InvalidRange { min: f64, max: f64 },
    /// Frame has the wrong channel layout / bit depth for the operation
    FormatMismatch {
        expected: &'static str,
        actual: FrameFormat,
    },
    /// Two frames (or a frame and its calibration / output buffer) disagree on size
    ResolutionMismatch {
        what: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// Raw buffer does not describe a valid frame (stride, length)
    InvalidBuffer(String),
    /// Calibration errors
    Calibration(CalibrationError),
    /// Device configuration errors
    Device(DeviceError),
    /// Config file could not be parsed or serialized
    Config(String),
}

/// Calibration-specific errors
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// A parameter is out of its valid domain
    InvalidParameter(String),
    /// Calibration data could not be parsed or serialized
    Parse(String),
}

/// Device configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Integer option outside the list offered to the host
    OptionOutOfRange {
        option: &'static str,
        index: usize,
        max: usize,
    },
    /// Frame rate not supported by the selected depth/color mode
    UnsupportedFrameRate { mode: &'static str, fps: u32 },
}

impl fmt::Display for ReprojectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReprojectError::InvalidRange { min, max } => {
                write!(f, "Max must be larger than min (min={}, max={})", min, max)
            }
            ReprojectError::FormatMismatch { expected, actual } => {
                write!(f, "Format mismatch: expected {}, got {}", expected, actual)
            }
            ReprojectError::ResolutionMismatch {
                what,
                expected,
                actual,
            } => write!(
                f,
                "Resolution mismatch for {}: expected {}x{}, got {}x{}",
                what, expected.0, expected.1, actual.0, actual.1
            ),
            ReprojectError::InvalidBuffer(msg) => write!(f, "Invalid buffer: {}", msg),
            ReprojectError::Calibration(e) => write!(f, "Calibration error: {}", e),
            ReprojectError::Device(e) => write!(f, "Device error: {}", e),
            ReprojectError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            CalibrationError::Parse(msg) => write!(f, "Parse failed: {}", msg),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::OptionOutOfRange { option, index, max } => {
                write!(f, "{} options 0-{} (got {})", option, max, index)
            }
            DeviceError::UnsupportedFrameRate { mode, fps } => {
                write!(f, "{} only works with up to 15 FPS (requested {})", mode, fps)
            }
        }
    }
}

impl std::error::Error for ReprojectError {}
impl std::error::Error for CalibrationError {}
impl std::error::Error for DeviceError {}

impl From<CalibrationError> for ReprojectError {
    fn from(err: CalibrationError) -> Self {
        ReprojectError::Calibration(err)
    }
}

impl From<DeviceError> for ReprojectError {
    fn from(err: DeviceError) -> Self {
        ReprojectError::Device(err)
    }
}

impl From<serde_json::Error> for CalibrationError {
    fn from(err: serde_json::Error) -> Self {
        CalibrationError::Parse(err.to_string())
    }
}
