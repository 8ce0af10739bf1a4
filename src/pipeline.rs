// SPDX-License-Identifier: GPL-3.0-only

//! Per-tick processing
//!
//! [`DepthToPoints`] owns the buffer cache and the reprojection engine and
//! turns one depth (+ color) capture into plain point and color lists that
//! outlive the tick. [`Session`] drives it from a [`FrameSource`].

use crate::cache::{BufferCache, BufferKind};
use crate::calibration::Calibration;
use crate::config::{Config, VisualizationRange};
use crate::errors::{ReprojectError, ReprojectResult};
use crate::frame::{self, Bgra, FrameBuffer, Short3};
use crate::reproject::{self, ReprojectionEngine};
use crate::source::FrameSource;
use image::{Rgb, RgbaImage};
use nalgebra::Point3;
use tracing::{debug, warn};

/// Points (mm, Y up, camera looking down -Z) with optional per-point colors
///
/// `colors` is either empty or exactly as long as `points`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    pub points: Vec<Point3<f32>>,
    pub colors: Vec<Rgb<u8>>,
}

impl PointSet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }
}

/// Cache + engine pair used once per tick
#[derive(Debug, Default)]
pub struct DepthToPoints {
    cache: BufferCache,
    engine: ReprojectionEngine,
}

impl DepthToPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &BufferCache {
        &self.cache
    }

    pub fn engine(&self) -> &ReprojectionEngine {
        &self.engine
    }

    /// Reproject `depth` and copy out every valid point
    ///
    /// With `color`, the color frame is aligned to the depth grid first and
    /// points whose aligned color is black (no color seen) are dropped too.
    pub fn process(
        &mut self,
        depth: &FrameBuffer,
        color: Option<&FrameBuffer>,
        calibration: &Calibration,
    ) -> ReprojectResult<PointSet> {
        // Reject before touching the cache so the last good outputs survive
        reproject::check_depth_input(depth, calibration)
            .and_then(|()| match color {
                Some(color) => reproject::check_color_input(color, calibration),
                None => Ok(()),
            })
            .inspect_err(|e| warn!(error = %e, "Rejected depth to points input"))?;
        let (width, height) = depth.dimensions();

        if let Some(color) = color {
            let aligned = self.cache.ensure(width, height, BufferKind::AlignedColor);
            self.engine
                .align_color_to_depth(depth, color, calibration, aligned)?;
        }
        let cloud = self.cache.ensure(width, height, BufferKind::PointCloud);
        self.engine.depth_to_point_cloud(depth, calibration, cloud)?;

        let cloud = self
            .cache
            .get(BufferKind::PointCloud)
            .ok_or_else(|| ReprojectError::InvalidBuffer("point cloud buffer missing".into()))?
            .view::<Short3>()?;
        let aligned = match color {
            Some(_) => Some(
                self.cache
                    .get(BufferKind::AlignedColor)
                    .ok_or_else(|| {
                        ReprojectError::InvalidBuffer("aligned color buffer missing".into())
                    })?
                    .view::<Bgra>()?,
            ),
            None => None,
        };

        let mut set = PointSet::default();
        match aligned {
            Some(aligned) => {
                for (point_row, color_row) in cloud.rows().zip(aligned.rows()) {
                    for (point, px) in point_row.iter().zip(color_row) {
                        if point.is_invalid() || px.is_black() {
                            continue;
                        }
                        set.points.push(to_point(point));
                        set.colors.push(Rgb([px.r, px.g, px.b]));
                    }
                }
            }
            None => {
                for point in cloud.rows().flatten() {
                    if !point.is_invalid() {
                        set.points.push(to_point(point));
                    }
                }
            }
        }

        debug!(
            width,
            height,
            points = set.len(),
            colored = set.has_colors(),
            "Depth frame converted to points"
        );
        Ok(set)
    }

    /// Grayscale visualization of a depth or IR frame, held in the cache
    /// until the next call
    pub fn visualize(
        &mut self,
        frame: &FrameBuffer,
        range: &VisualizationRange,
    ) -> ReprojectResult<&FrameBuffer> {
        reproject::check_visualization_input(frame, range)
            .inspect_err(|e| warn!(error = %e, "Rejected visualization input"))?;
        let (width, height) = frame.dimensions();
        let out = self.cache.ensure(width, height, BufferKind::Visualization);
        self.engine.visualize(frame, range, out)?;
        Ok(out)
    }
}

fn to_point(point: &Short3) -> Point3<f32> {
    Point3::new(point.x as f32, point.y as f32, point.z as f32)
}

/// Output of one [`Session::tick`]
#[derive(Debug, Clone)]
pub struct SessionFrame {
    /// Reprojected points, None when the capture carried only infrared
    pub points: Option<PointSet>,
    /// Visualization of the depth (or infrared) frame
    pub preview: RgbaImage,
}

/// Pulls captures from a source and processes them with one config
pub struct Session<S: FrameSource> {
    source: S,
    config: Config,
    pipeline: DepthToPoints,
}

impl<S: FrameSource> Session<S> {
    pub fn new(source: S, config: Config) -> ReprojectResult<Self> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            pipeline: DepthToPoints::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pipeline(&self) -> &DepthToPoints {
        &self.pipeline
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Process the next capture, or return None if the source had nothing
    pub fn tick(&mut self) -> ReprojectResult<Option<SessionFrame>> {
        let Some(capture) = self.source.next_capture()? else {
            return Ok(None);
        };
        let Some(raw) = capture.depth_or_infrared() else {
            debug!("Capture without depth or infrared, skipping");
            return Ok(None);
        };

        let calibration = self.source.calibration();
        let points = match &capture.depth {
            Some(depth) => {
                let color = capture
                    .color
                    .as_ref()
                    .filter(|_| self.config.color_output);
                Some(self.pipeline.process(depth, color, &calibration)?)
            }
            None => None,
        };

        let visualization = self.pipeline.visualize(raw, &self.config.visualization)?;
        let preview = frame::to_rgba_image(visualization)?;

        Ok(Some(SessionFrame { points, preview }))
    }
}
