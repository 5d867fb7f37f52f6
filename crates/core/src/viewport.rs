//! Drawing surface dimensions in CSS pixels plus the device pixel ratio.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Size of the drawing surface as reported by the host.
///
/// Simulation coordinates are CSS pixels; the backing store is scaled by
/// `device_pixel_ratio` so glyphs stay crisp on dense displays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    width: f64,
    height: f64,
    device_pixel_ratio: f64,
}

impl Viewport {
    /// Creates a viewport. A zero-sized surface is a host contract
    /// violation and fails with `EngineError::InvalidDimensions`.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Result<Self, EngineError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) || !valid(device_pixel_ratio) {
            return Err(EngineError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            device_pixel_ratio,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Backing-store width in device pixels (at least 1).
    pub fn backing_width(&self) -> u32 {
        backing(self.width, self.device_pixel_ratio)
    }

    /// Backing-store height in device pixels (at least 1).
    pub fn backing_height(&self) -> u32 {
        backing(self.height, self.device_pixel_ratio)
    }

    /// Center of the surface in CSS pixels.
    pub fn center(&self) -> (f64, f64) {
        (self.width * 0.5, self.height * 0.5)
    }
}

fn backing(css: f64, dpr: f64) -> u32 {
    (css * dpr).round().clamp(1.0, u32::MAX as f64) as u32
}
