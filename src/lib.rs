// SPDX-License-Identifier: MPL-2.0

//! Depth Reproject - depth sensor reprojection core
//!
//! This library turns raw depth-camera frames into 3D point clouds,
//! resamples color frames onto the depth grid and renders depth/IR frames as
//! grayscale images, all driven by a factory calibration.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`frame`]: Frame buffers, pixel formats and typed views
//! - [`calibration`]: Lens models, extrinsics and calibration identity
//! - [`cache`]: Output buffers reused across ticks
//! - [`reproject`]: Point cloud, color alignment and visualization
//! - [`source`]: Frame source trait, replay source and device modes
//! - [`pipeline`]: Per-tick glue producing point/color lists
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```
//! use depth_reproject::{Calibration, DepthToPoints, FrameBuffer, FrameFormat};
//!
//! let calibration = Calibration::identity((2, 1), (2, 1)).unwrap();
//! let depth = FrameBuffer::from_pixels(FrameFormat::Depth16, 2, 1, &[0u16, 500]).unwrap();
//! let points = DepthToPoints::new().process(&depth, None, &calibration).unwrap();
//! assert_eq!(points.len(), 1);
//! ```

pub mod cache;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod errors;
pub mod frame;
pub mod pipeline;
pub mod reproject;
pub mod source;

// Re-export commonly used types
pub use cache::{BufferCache, BufferKind};
pub use calibration::{Calibration, CalibrationData, CalibrationId};
pub use config::{Config, VisualizationRange};
pub use errors::{ReprojectError, ReprojectResult};
pub use frame::{Bgra, FrameBuffer, FrameFormat, Short3};
pub use pipeline::{DepthToPoints, PointSet, Session, SessionFrame};
pub use reproject::ReprojectionEngine;
pub use source::{Capture, FrameSource, ReplaySource};
