// SPDX-License-Identifier: GPL-3.0-only

//! Frame formats and pixel types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout of the samples stored in a [`FrameBuffer`](super::FrameBuffer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameFormat {
    /// 16-bit depth in millimeters, 0 = no measurement
    Depth16,
    /// 16-bit passive/active infrared intensity
    Ir16,
    /// 8-bit blue, green, red, alpha
    ColorBgra32,
    /// Signed 16-bit x, y, z in millimeters
    PointCloudXyz16,
}

impl FrameFormat {
    /// Bytes occupied by one pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FrameFormat::Depth16 | FrameFormat::Ir16 => 2,
            FrameFormat::ColorBgra32 => 4,
            FrameFormat::PointCloudXyz16 => 6,
        }
    }

    /// Whether the format carries a single 16-bit channel
    pub fn is_single_channel(&self) -> bool {
        matches!(self, FrameFormat::Depth16 | FrameFormat::Ir16)
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameFormat::Depth16 => "Depth16",
            FrameFormat::Ir16 => "IR16",
            FrameFormat::ColorBgra32 => "BGRA32",
            FrameFormat::PointCloudXyz16 => "XYZ16",
        };
        f.write_str(name)
    }
}

/// One BGRA color sample
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Bgra {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Bgra {
    /// "No color" marker written where alignment has no sample
    pub const INVALID: Bgra = Bgra {
        b: 0,
        g: 0,
        r: 0,
        a: 0,
    };

    pub const fn new(b: u8, g: u8, r: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// Opaque gray pixel
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value, 255)
    }

    /// True when the color channels are all zero (alpha is ignored)
    pub fn is_black(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// One point-cloud sample in millimeters
///
/// All-zero is the "no geometry" marker. A genuine point at the origin is
/// indistinguishable from it.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Short3 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Short3 {
    pub const INVALID: Short3 = Short3 { x: 0, y: 0, z: 0 };

    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    pub fn is_invalid(&self) -> bool {
        *self == Self::INVALID
    }
}

/// Pixel types that can be viewed out of a frame buffer
pub trait Pixel: bytemuck::Pod {
    /// Human readable description used in format mismatch errors
    const DESCRIPTION: &'static str;

    /// Whether frames of `format` store pixels of this type
    fn accepts(format: FrameFormat) -> bool;
}

impl Pixel for u16 {
    const DESCRIPTION: &'static str = "16-bit single channel (Depth16 or IR16)";

    fn accepts(format: FrameFormat) -> bool {
        format.is_single_channel()
    }
}

impl Pixel for Bgra {
    const DESCRIPTION: &'static str = "BGRA32";

    fn accepts(format: FrameFormat) -> bool {
        format == FrameFormat::ColorBgra32
    }
}

impl Pixel for Short3 {
    const DESCRIPTION: &'static str = "XYZ16 point cloud";

    fn accepts(format: FrameFormat) -> bool {
        format == FrameFormat::PointCloudXyz16
    }
}
