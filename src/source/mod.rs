// SPDX-License-Identifier: GPL-3.0-only

//! Frame source abstraction
//!
//! A source hands out one calibration and a stream of captures. Hardware
//! drivers live outside this crate; they implement [`FrameSource`] the same
//! way [`ReplaySource`] does for recorded data.

mod device;
mod replay;

pub use device::{ColorResolution, DepthMode, DeviceConfig, Fps};
pub use replay::ReplaySource;

use crate::calibration::Calibration;
use crate::errors::ReprojectResult;
use crate::frame::FrameBuffer;
use std::sync::Arc;

/// Frames captured together at one instant
#[derive(Debug, Clone, Default)]
pub struct Capture {
    /// Depth16 frame, absent in passive IR mode
    pub depth: Option<FrameBuffer>,
    /// IR16 frame
    pub infrared: Option<FrameBuffer>,
    /// BGRA32 color frame, absent with color disabled
    pub color: Option<FrameBuffer>,
}

impl Capture {
    /// Depth when present, otherwise infrared
    pub fn depth_or_infrared(&self) -> Option<&FrameBuffer> {
        self.depth.as_ref().or(self.infrared.as_ref())
    }
}

/// Anything that produces captures with a fixed calibration
pub trait FrameSource {
    /// Calibration shared by every capture of this source
    fn calibration(&self) -> Arc<Calibration>;

    /// Next capture, or None when nothing is available right now
    fn next_capture(&mut self) -> ReprojectResult<Option<Capture>>;
}
