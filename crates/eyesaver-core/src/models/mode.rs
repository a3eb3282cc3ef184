//! Render modes for the background layer.

use serde::{Deserialize, Serialize};

/// Overlay alpha used when none is configured.
pub const DEFAULT_INTENSITY: f32 = 0.3;

/// How the color layer is composited onto each page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RenderMode {
    /// Opaque fill beneath the existing content. Best for digital PDFs.
    Standard,
    /// Translucent tint above the existing content. Best for scans.
    Overlay {
        /// Fill alpha of the tint.
        intensity: f32,
    },
}

/// Where a layer goes relative to the existing page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stacking {
    Below,
    Above,
}

impl RenderMode {
    /// Build a mode from an overlay toggle and an intensity slider.
    ///
    /// The intensity is ignored when `overlay` is false.
    pub fn from_flags(overlay: bool, intensity: f32) -> Self {
        if overlay {
            RenderMode::Overlay { intensity }
        } else {
            RenderMode::Standard
        }
    }

    pub fn stacking(self) -> Stacking {
        match self {
            RenderMode::Standard => Stacking::Below,
            RenderMode::Overlay { .. } => Stacking::Above,
        }
    }

    /// Fill alpha written to the PDF, clamped to `[0, 1]`.
    ///
    /// Non-finite intensities produce a fully transparent tint.
    pub fn fill_alpha(self) -> f32 {
        match self {
            RenderMode::Standard => 1.0,
            RenderMode::Overlay { intensity } if intensity.is_finite() => intensity.clamp(0.0, 1.0),
            RenderMode::Overlay { .. } => 0.0,
        }
    }

    /// Whether the rectangle border is stroked as well as filled.
    pub fn strokes_border(self) -> bool {
        matches!(self, RenderMode::Standard)
    }

    pub fn is_overlay(self) -> bool {
        matches!(self, RenderMode::Overlay { .. })
    }
}

impl Default for RenderMode {
    fn default() -> Self {
        RenderMode::Standard
    }
}
