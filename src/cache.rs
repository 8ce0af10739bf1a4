// SPDX-License-Identifier: GPL-3.0-only

//! Reusable output buffers sized to the current depth resolution
//!
//! Output frames are large and produced every tick, so they are allocated
//! once and overwritten in place. A buffer is only replaced when the requested
//! dimensions change.

use crate::frame::{FrameBuffer, FrameFormat};
use tracing::debug;

/// Semantic role of a cached buffer; one live buffer per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Point cloud on the depth grid
    PointCloud,
    /// Color resampled onto the depth grid
    AlignedColor,
    /// Grayscale depth/IR visualization
    Visualization,
}

impl BufferKind {
    pub const ALL: [BufferKind; 3] = [
        BufferKind::PointCloud,
        BufferKind::AlignedColor,
        BufferKind::Visualization,
    ];

    /// Frame format stored in buffers of this kind
    pub fn format(&self) -> FrameFormat {
        match self {
            BufferKind::PointCloud => FrameFormat::PointCloudXyz16,
            BufferKind::AlignedColor | BufferKind::Visualization => FrameFormat::ColorBgra32,
        }
    }
}

/// Owned scratch buffers keyed by kind
#[derive(Debug, Default)]
pub struct BufferCache {
    point_cloud: Option<FrameBuffer>,
    aligned_color: Option<FrameBuffer>,
    visualization: Option<FrameBuffer>,
    allocations: usize,
}

impl BufferCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer of `kind` sized exactly `width x height`
    ///
    /// Matching dimensions return the existing buffer with last tick's
    /// contents. Different dimensions release it and allocate a zeroed one.
    pub fn ensure(&mut self, width: u32, height: u32, kind: BufferKind) -> &mut FrameBuffer {
        let slot = match kind {
            BufferKind::PointCloud => &mut self.point_cloud,
            BufferKind::AlignedColor => &mut self.aligned_color,
            BufferKind::Visualization => &mut self.visualization,
        };

        let stale = slot
            .as_ref()
            .is_none_or(|buffer| !buffer.has_dimensions(width, height));
        if stale {
            debug!(?kind, width, height, "Allocating cached frame buffer");
            self.allocations += 1;
            return slot.insert(FrameBuffer::new(kind.format(), width, height));
        }

        slot.get_or_insert_with(|| FrameBuffer::new(kind.format(), width, height))
    }

    /// Current buffer of `kind`, if one was ever ensured
    pub fn get(&self, kind: BufferKind) -> Option<&FrameBuffer> {
        match kind {
            BufferKind::PointCloud => self.point_cloud.as_ref(),
            BufferKind::AlignedColor => self.aligned_color.as_ref(),
            BufferKind::Visualization => self.visualization.as_ref(),
        }
    }

    /// Number of buffers allocated over the cache's lifetime
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Drop every buffer (e.g. when the device closes)
    pub fn clear(&mut self) {
        self.point_cloud = None;
        self.aligned_color = None;
        self.visualization = None;
    }
}
