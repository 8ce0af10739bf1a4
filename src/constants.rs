// SPDX-License-Identifier: GPL-3.0-only

//! Sensor and reprojection constants
//!
//! Sentinels, visualization defaults and solver limits shared by the
//! reprojection pipeline.

/// Depth value meaning "no valid measurement" (not a distance of zero)
pub const DEPTH_INVALID_MM: u16 = 0;

/// Default lower clamp bound for depth/IR visualization
pub const VISUALIZATION_MIN_DEFAULT: f64 = 0.0;
/// Default upper clamp bound for depth/IR visualization
pub const VISUALIZATION_MAX_DEFAULT: f64 = 2000.0;

/// Number of lens parameters stored per camera
pub const LENS_PARAMETER_SLOTS: usize = 15;
/// Number of lens parameters the device reports as meaningful
pub const LENS_PARAMETER_COUNT_DEFAULT: u32 = 14;

/// Gauss-Newton iteration cap for lens unprojection
pub const UNPROJECT_MAX_ITERATIONS: usize = 20;
/// Squared residual (normalized image plane) at which unprojection has converged
pub const UNPROJECT_CONVERGENCE_SQ: f64 = 1e-14;
/// Largest accepted residual, in pixels, after the last iteration
pub const UNPROJECT_MAX_ERROR_PX: f64 = 0.5;
