// SPDX-License-Identifier: GPL-3.0-only

//! Sensor mode selection
//!
//! Hosts expose these as small integer option lists, so every enum converts
//! from a list index and reports the valid range when the index is off.

use crate::errors::DeviceError;
use serde::{Deserialize, Serialize};

/// Camera frame rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Fps {
    Fps5,
    #[default]
    Fps15,
    Fps30,
}

impl Fps {
    pub const ALL: [Fps; 3] = [Fps::Fps5, Fps::Fps15, Fps::Fps30];

    pub fn from_index(index: usize) -> Result<Self, DeviceError> {
        from_index("FPS", &Self::ALL, index)
    }

    pub fn frames_per_second(&self) -> u32 {
        match self {
            Fps::Fps5 => 5,
            Fps::Fps15 => 15,
            Fps::Fps30 => 30,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Fps::Fps5 => "5",
            Fps::Fps15 => "15",
            Fps::Fps30 => "30",
        }
    }
}

/// Depth sensor operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DepthMode {
    /// Wide field of view, 2x2 binned
    #[default]
    WfovBinned,
    /// Wide field of view, full resolution
    WfovUnbinned,
    /// Narrow field of view, 2x2 binned
    NfovBinned,
    /// Narrow field of view, full resolution
    NfovUnbinned,
    /// IR only, no depth
    PassiveIr,
}

impl DepthMode {
    pub const ALL: [DepthMode; 5] = [
        DepthMode::WfovBinned,
        DepthMode::WfovUnbinned,
        DepthMode::NfovBinned,
        DepthMode::NfovUnbinned,
        DepthMode::PassiveIr,
    ];

    pub fn from_index(index: usize) -> Result<Self, DeviceError> {
        from_index("Depth mode", &Self::ALL, index)
    }

    /// Native depth/IR frame size
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            DepthMode::WfovBinned => (512, 512),
            DepthMode::WfovUnbinned => (1024, 1024),
            DepthMode::NfovBinned => (320, 288),
            DepthMode::NfovUnbinned => (640, 576),
            DepthMode::PassiveIr => (1024, 1024),
        }
    }

    /// Whether the mode produces depth (passive IR only yields infrared)
    pub fn has_depth(&self) -> bool {
        !matches!(self, DepthMode::PassiveIr)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DepthMode::WfovBinned => "WFOV 2x2 Binned",
            DepthMode::WfovUnbinned => "WFOV",
            DepthMode::NfovBinned => "NFOV 2x2 Binned",
            DepthMode::NfovUnbinned => "NFOV",
            DepthMode::PassiveIr => "Passive IR",
        }
    }
}

/// Color camera resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorResolution {
    #[default]
    R720p,
    R1080p,
    R1440p,
    R2160p,
    R3072p,
}

impl ColorResolution {
    pub const ALL: [ColorResolution; 5] = [
        ColorResolution::R720p,
        ColorResolution::R1080p,
        ColorResolution::R1440p,
        ColorResolution::R2160p,
        ColorResolution::R3072p,
    ];

    pub fn from_index(index: usize) -> Result<Self, DeviceError> {
        from_index("Color mode", &Self::ALL, index)
    }

    pub fn resolution(&self) -> (u32, u32) {
        match self {
            ColorResolution::R720p => (1280, 720),
            ColorResolution::R1080p => (1920, 1080),
            ColorResolution::R1440p => (2560, 1440),
            ColorResolution::R2160p => (3840, 2160),
            ColorResolution::R3072p => (4096, 3072),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ColorResolution::R720p => "720p",
            ColorResolution::R1080p => "1080p",
            ColorResolution::R1440p => "1440p",
            ColorResolution::R2160p => "2160p",
            ColorResolution::R3072p => "3072p",
        }
    }
}

fn from_index<T: Copy>(option: &'static str, all: &[T], index: usize) -> Result<T, DeviceError> {
    all.get(index)
        .copied()
        .ok_or(DeviceError::OptionOutOfRange {
            option,
            index,
            max: all.len() - 1,
        })
}

/// Requested sensor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub fps: Fps,
    pub depth_mode: DepthMode,
    pub color_enabled: bool,
    pub color_resolution: ColorResolution,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            depth_mode: DepthMode::default(),
            color_enabled: true,
            color_resolution: ColorResolution::default(),
        }
    }
}

impl DeviceConfig {
    /// Build from host option indices
    pub fn from_indices(
        fps: usize,
        depth_mode: usize,
        color_enabled: bool,
        color_resolution: usize,
    ) -> Result<Self, DeviceError> {
        let config = Self {
            fps: Fps::from_index(fps)?,
            depth_mode: DepthMode::from_index(depth_mode)?,
            color_enabled,
            color_resolution: ColorResolution::from_index(color_resolution)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject mode combinations the sensor can't run
    ///
    /// Full-resolution wide depth and 3072p color are limited to 15 FPS.
    /// These follow the sensor's documented limits, so NFOV unbinned runs at 30.
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.fps != Fps::Fps30 {
            return Ok(());
        }
        if self.depth_mode == DepthMode::WfovUnbinned {
            return Err(DeviceError::UnsupportedFrameRate {
                mode: "WFOV_Unbinned",
                fps: self.fps.frames_per_second(),
            });
        }
        if self.color_enabled && self.color_resolution == ColorResolution::R3072p {
            return Err(DeviceError::UnsupportedFrameRate {
                mode: "3072p color",
                fps: self.fps.frames_per_second(),
            });
        }
        Ok(())
    }

    /// Depth/IR frame size for this configuration
    pub fn depth_resolution(&self) -> (u32, u32) {
        self.depth_mode.resolution()
    }

    /// Color frame size, None with color disabled
    pub fn color_resolution(&self) -> Option<(u32, u32)> {
        self.color_enabled
            .then(|| self.color_resolution.resolution())
    }
}
