#![deny(unsafe_code)]
//! Core simulation for the glyph field.
//!
//! Provides the seeded `NoiseField`, the structure-of-arrays `ParticlePool`,
//! the `PointerTracker`, and the `Simulation` frame loop that ties them
//! together and draws through the `Surface` trait. Also hosts the shared
//! `FieldConfig`, color and glyph tables, `Xorshift64` PRNG and JSON
//! parameter helpers.

pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod glyph;
pub mod noise;
pub mod params;
pub mod pointer;
pub mod pool;
pub mod prng;
pub mod simulation;
pub mod surface;
pub mod viewport;

pub use clock::FrameClock;
pub use color::{ColorTable, Srgb};
pub use config::{DampingMode, FieldConfig};
pub use error::EngineError;
pub use glyph::GLYPHS;
pub use crate::noise::NoiseField;
pub use pointer::{PointerSample, PointerTracker};
pub use pool::{Particle, ParticlePool};
pub use prng::Xorshift64;
pub use simulation::{alpha_envelope, FrameStats, Simulation};
pub use surface::{DrawCommand, RecordingSurface, Surface};
pub use viewport::Viewport;
