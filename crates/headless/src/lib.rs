#![deny(unsafe_code)]
//! Headless host for the glyph field: drives a [`Simulation`] from a scripted
//! pointer path and renders onto a CPU [`RasterSurface`].
//!
//! This crate sits between `glyph-field-core` (which knows nothing about
//! where pointer input or pixels come from) and the CLI.

pub mod raster;
pub mod script;

#[cfg(feature = "png")]
pub mod snapshot;

pub use raster::RasterSurface;
pub use script::PointerScript;

use glyph_field_core::error::EngineError;
use glyph_field_core::{Simulation, Surface};
use log::debug;
use serde::Serialize;

/// Totals over a headless run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub frames: usize,
    pub spawned: usize,
    /// Spawn requests dropped because the pool was full.
    pub dropped: usize,
    pub peak_alive: usize,
    pub final_alive: usize,
}

/// Runs `frames` frames at a fixed `fps`, feeding the script's pointer
/// position before each one. The surface holds the last frame afterwards.
///
/// Returns `EngineError::InvalidParam` if `fps` is not positive and finite.
pub fn run(
    sim: &mut Simulation,
    script: PointerScript,
    frames: usize,
    fps: f64,
    surface: &mut dyn Surface,
) -> Result<RunSummary, EngineError> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(EngineError::invalid_param("fps", "must be positive and finite"));
    }
    let start = sim.time();
    let mut summary = RunSummary {
        frames,
        ..RunSummary::default()
    };
    for i in 0..frames {
        let t = start + i as f64 / fps;
        if let Some((x, y)) = script.position(t, sim.viewport()) {
            sim.pointer_moved(x, y);
        }
        let stats = sim.frame(t, surface);
        summary.spawned += stats.spawned;
        summary.dropped += stats.dropped;
        summary.peak_alive = summary.peak_alive.max(stats.alive);
    }
    summary.final_alive = sim.pool().alive_count();
    debug!(
        "ran {} for {frames} frames at {fps} fps: {summary:?}",
        script.name()
    );
    Ok(summary)
}
