// SPDX-License-Identifier: GPL-3.0-only

//! In-memory capture playback

use super::{Capture, FrameSource};
use crate::calibration::Calibration;
use crate::errors::ReprojectResult;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Plays back pre-recorded captures in order, then runs dry
#[derive(Debug)]
pub struct ReplaySource {
    calibration: Arc<Calibration>,
    captures: VecDeque<Capture>,
}

impl ReplaySource {
    pub fn new(calibration: Arc<Calibration>, captures: impl IntoIterator<Item = Capture>) -> Self {
        Self {
            calibration,
            captures: captures.into_iter().collect(),
        }
    }

    /// Queue another capture after the pending ones
    pub fn push(&mut self, capture: Capture) {
        self.captures.push_back(capture);
    }

    pub fn remaining(&self) -> usize {
        self.captures.len()
    }
}

impl FrameSource for ReplaySource {
    fn calibration(&self) -> Arc<Calibration> {
        Arc::clone(&self.calibration)
    }

    fn next_capture(&mut self) -> ReprojectResult<Option<Capture>> {
        let capture = self.captures.pop_front();
        if capture.is_none() {
            debug!("Replay source exhausted");
        }
        Ok(capture)
    }
}
