//! Tunable constants for the glyph field.
//!
//! [`FieldConfig::default`] carries the production values. Hosts pass a JSON
//! object of overrides to [`FieldConfig::from_json`]; unknown keys are
//! ignored, keys of the wrong JSON type keep their default, and the merged
//! result is range-checked before a simulation will accept it.

use crate::color::{ColorTable, Srgb};
use crate::error::EngineError;
use crate::params::{param_f64, param_string, param_string_list, param_usize};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// How velocity damping relates to the frame rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DampingMode {
    /// Multiply velocity by `damping` once per frame, whatever `dt` is.
    /// Drift is therefore slightly frame-rate dependent.
    #[default]
    PerFrame,
    /// Multiply by `damping^(dt · reference_frame_rate)`, which matches
    /// `PerFrame` at the reference rate and is frame-rate independent.
    FrameRateIndependent,
}

impl DampingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DampingMode::PerFrame => "per_frame",
            DampingMode::FrameRateIndependent => "frame_rate_independent",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "per_frame" => Ok(DampingMode::PerFrame),
            "frame_rate_independent" => Ok(DampingMode::FrameRateIndependent),
            other => Err(EngineError::invalid_param(
                "damping_mode",
                format!("unknown mode '{other}'"),
            )),
        }
    }
}

/// Largest particle pool a config may ask for.
pub const MAX_CAPACITY: usize = 1 << 20;

/// Every constant the simulation reads. Lengths are CSS pixels, times seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Number of particle slots (`MAX_PARTICLES`), fixed for the pool's lifetime.
    pub capacity: usize,
    pub spawn_radius_min: f64,
    pub spawn_radius_max: f64,
    pub spawn_speed_min: f64,
    pub spawn_speed_max: f64,
    /// Fraction of the pointer velocity a new particle inherits.
    pub momentum_transfer: f64,
    pub min_lifespan: f64,
    pub max_lifespan: f64,
    pub min_size: f64,
    pub max_size: f64,
    /// Particles per reference frame while the pointer moves.
    pub base_spawn_rate: f64,
    /// Extra rate per px/frame of pointer speed.
    pub speed_gain: f64,
    pub max_spawn_rate: f64,
    pub reference_frame_rate: f64,
    /// Pointer speed (px/frame) below which nothing spawns.
    pub spawn_speed_threshold: f64,
    pub noise_scale: f64,
    pub noise_time_scale: f64,
    /// Spatial offset separating the x-axis and y-axis noise samples.
    pub noise_axis_offset: f64,
    /// Acceleration per unit of noise (px/s²).
    pub drift_force: f64,
    pub damping: f64,
    pub damping_mode: DampingMode,
    pub repulsion_radius: f64,
    /// Outward acceleration at zero distance (px/s²).
    pub repulsion_strength: f64,
    /// Squared distance below which repulsion is skipped.
    pub repulsion_epsilon: f64,
    /// Share of the lifetime spent fading in.
    pub fade_in_fraction: f64,
    pub max_opacity: f64,
    /// Upper bound for a frame's `dt`.
    pub max_dt: f64,
    pub colors: ColorTable,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            capacity: 400,
            spawn_radius_min: 8.0,
            spawn_radius_max: 40.0,
            spawn_speed_min: 10.0,
            spawn_speed_max: 40.0,
            momentum_transfer: 0.1,
            min_lifespan: 1.5,
            max_lifespan: 3.5,
            min_size: 10.0,
            max_size: 18.0,
            base_spawn_rate: 0.25,
            speed_gain: 0.05,
            max_spawn_rate: 2.0,
            reference_frame_rate: 60.0,
            spawn_speed_threshold: 0.5,
            noise_scale: 0.005,
            noise_time_scale: 0.3,
            noise_axis_offset: 100.0,
            drift_force: 30.0,
            damping: 0.98,
            damping_mode: DampingMode::PerFrame,
            repulsion_radius: 120.0,
            repulsion_strength: 400.0,
            repulsion_epsilon: 0.01,
            fade_in_fraction: 0.1,
            max_opacity: 0.35,
            max_dt: 0.1,
            colors: default_colors(),
        }
    }
}

fn default_colors() -> ColorTable {
    ColorTable::single(Srgb {
        r: 0xa7 as f64 / 255.0,
        g: 0x8b as f64 / 255.0,
        b: 0xfa as f64 / 255.0,
    })
}

impl FieldConfig {
    /// Merges JSON overrides onto the defaults and validates the result.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let d = Self::default();
        let colors = match param_string_list(params, "colors") {
            Some(hexes) => ColorTable::from_hex(&hexes)?,
            None => d.colors.clone(),
        };
        let damping_mode = DampingMode::from_name(&param_string(
            params,
            "damping_mode",
            d.damping_mode.as_str(),
        ))?;
        let config = Self {
            capacity: param_usize(params, "capacity", d.capacity),
            spawn_radius_min: param_f64(params, "spawn_radius_min", d.spawn_radius_min),
            spawn_radius_max: param_f64(params, "spawn_radius_max", d.spawn_radius_max),
            spawn_speed_min: param_f64(params, "spawn_speed_min", d.spawn_speed_min),
            spawn_speed_max: param_f64(params, "spawn_speed_max", d.spawn_speed_max),
            momentum_transfer: param_f64(params, "momentum_transfer", d.momentum_transfer),
            min_lifespan: param_f64(params, "min_lifespan", d.min_lifespan),
            max_lifespan: param_f64(params, "max_lifespan", d.max_lifespan),
            min_size: param_f64(params, "min_size", d.min_size),
            max_size: param_f64(params, "max_size", d.max_size),
            base_spawn_rate: param_f64(params, "base_spawn_rate", d.base_spawn_rate),
            speed_gain: param_f64(params, "speed_gain", d.speed_gain),
            max_spawn_rate: param_f64(params, "max_spawn_rate", d.max_spawn_rate),
            reference_frame_rate: param_f64(params, "reference_frame_rate", d.reference_frame_rate),
            spawn_speed_threshold: param_f64(
                params,
                "spawn_speed_threshold",
                d.spawn_speed_threshold,
            ),
            noise_scale: param_f64(params, "noise_scale", d.noise_scale),
            noise_time_scale: param_f64(params, "noise_time_scale", d.noise_time_scale),
            noise_axis_offset: param_f64(params, "noise_axis_offset", d.noise_axis_offset),
            drift_force: param_f64(params, "drift_force", d.drift_force),
            damping: param_f64(params, "damping", d.damping),
            damping_mode,
            repulsion_radius: param_f64(params, "repulsion_radius", d.repulsion_radius),
            repulsion_strength: param_f64(params, "repulsion_strength", d.repulsion_strength),
            repulsion_epsilon: param_f64(params, "repulsion_epsilon", d.repulsion_epsilon),
            fade_in_fraction: param_f64(params, "fade_in_fraction", d.fade_in_fraction),
            max_opacity: param_f64(params, "max_opacity", d.max_opacity),
            max_dt: param_f64(params, "max_dt", d.max_dt),
            colors,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every value against its allowed range.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.capacity == 0 {
            return Err(EngineError::invalid_param("capacity", "must be at least 1"));
        }
        if self.capacity > MAX_CAPACITY {
            return Err(EngineError::invalid_param(
                "capacity",
                format!("must be at most {MAX_CAPACITY}"),
            ));
        }
        non_negative("spawn_radius_min", self.spawn_radius_min)?;
        ordered("spawn_radius", self.spawn_radius_min, self.spawn_radius_max)?;
        non_negative("spawn_speed_min", self.spawn_speed_min)?;
        ordered("spawn_speed", self.spawn_speed_min, self.spawn_speed_max)?;
        finite("momentum_transfer", self.momentum_transfer)?;
        positive("min_lifespan", self.min_lifespan)?;
        ordered("lifespan", self.min_lifespan, self.max_lifespan)?;
        positive("min_size", self.min_size)?;
        ordered("size", self.min_size, self.max_size)?;
        non_negative("base_spawn_rate", self.base_spawn_rate)?;
        non_negative("speed_gain", self.speed_gain)?;
        non_negative("max_spawn_rate", self.max_spawn_rate)?;
        positive("reference_frame_rate", self.reference_frame_rate)?;
        non_negative("spawn_speed_threshold", self.spawn_speed_threshold)?;
        finite("noise_scale", self.noise_scale)?;
        finite("noise_time_scale", self.noise_time_scale)?;
        finite("noise_axis_offset", self.noise_axis_offset)?;
        finite("drift_force", self.drift_force)?;
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(EngineError::invalid_param("damping", "must be in (0, 1]"));
        }
        positive("repulsion_radius", self.repulsion_radius)?;
        non_negative("repulsion_strength", self.repulsion_strength)?;
        non_negative("repulsion_epsilon", self.repulsion_epsilon)?;
        if !(self.fade_in_fraction > 0.0 && self.fade_in_fraction < 1.0) {
            return Err(EngineError::invalid_param(
                "fade_in_fraction",
                "must be in (0, 1)",
            ));
        }
        if !(0.0..=1.0).contains(&self.max_opacity) {
            return Err(EngineError::invalid_param("max_opacity", "must be in [0, 1]"));
        }
        positive("max_dt", self.max_dt)?;
        Ok(())
    }

    /// Number of particles to spawn this frame for a pointer moving at
    /// `speed` px/frame.
    ///
    /// `ceil(min(max_rate, base_rate + speed · gain) · dt · reference_rate)`,
    /// or 0 when the pointer is slower than the spawn threshold.
    pub fn spawn_count(&self, speed: f64, dt: f64) -> usize {
        if speed.is_nan() || speed < self.spawn_speed_threshold || dt.is_nan() || dt <= 0.0 {
            return 0;
        }
        let rate = (self.base_spawn_rate + speed * self.speed_gain).min(self.max_spawn_rate);
        let count = (rate * dt * self.reference_frame_rate).ceil();
        if count.is_finite() && count > 0.0 {
            count as usize
        } else {
            0
        }
    }

    /// Velocity multiplier for a frame of length `dt`.
    pub fn damping_factor(&self, dt: f64) -> f64 {
        match self.damping_mode {
            DampingMode::PerFrame => self.damping,
            DampingMode::FrameRateIndependent => {
                self.damping.powf(dt * self.reference_frame_rate)
            }
        }
    }

    /// Current values as a JSON object.
    pub fn params(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Schema describing each key: type, default, range and description.
    pub fn param_schema() -> Value {
        let d = Self::default();
        json!({
            "capacity": {
                "type": "integer", "default": d.capacity, "min": 1, "max": MAX_CAPACITY,
                "description": "Number of particle slots, allocated once"
            },
            "spawn_radius_min": number(d.spawn_radius_min, 0.0, 500.0, "Inner radius of the spawn ring (px)"),
            "spawn_radius_max": number(d.spawn_radius_max, 0.0, 500.0, "Outer radius of the spawn ring (px)"),
            "spawn_speed_min": number(d.spawn_speed_min, 0.0, 1000.0, "Slowest initial speed (px/s)"),
            "spawn_speed_max": number(d.spawn_speed_max, 0.0, 1000.0, "Fastest initial speed (px/s)"),
            "momentum_transfer": number(d.momentum_transfer, 0.0, 1.0, "Fraction of pointer velocity inherited at spawn"),
            "min_lifespan": number(d.min_lifespan, 0.01, 60.0, "Shortest lifespan (s)"),
            "max_lifespan": number(d.max_lifespan, 0.01, 60.0, "Longest lifespan (s)"),
            "min_size": number(d.min_size, 0.1, 200.0, "Smallest glyph size (px)"),
            "max_size": number(d.max_size, 0.1, 200.0, "Largest glyph size (px)"),
            "base_spawn_rate": number(d.base_spawn_rate, 0.0, 10.0, "Particles per reference frame while moving"),
            "speed_gain": number(d.speed_gain, 0.0, 1.0, "Extra rate per px/frame of pointer speed"),
            "max_spawn_rate": number(d.max_spawn_rate, 0.0, 20.0, "Ceiling on the spawn rate"),
            "reference_frame_rate": number(d.reference_frame_rate, 1.0, 240.0, "Frame rate the rates are expressed against"),
            "spawn_speed_threshold": number(d.spawn_speed_threshold, 0.0, 50.0, "Pointer speed (px/frame) below which nothing spawns"),
            "noise_scale": number(d.noise_scale, 0.0, 1.0, "Spatial frequency of the drift field"),
            "noise_time_scale": number(d.noise_time_scale, 0.0, 10.0, "Temporal frequency of the drift field"),
            "noise_axis_offset": number(d.noise_axis_offset, 0.0, 10_000.0, "Offset decorrelating the two drift axes"),
            "drift_force": number(d.drift_force, 0.0, 1000.0, "Drift acceleration per unit noise (px/s^2)"),
            "damping": number(d.damping, 0.0, 1.0, "Velocity multiplier applied each frame"),
            "damping_mode": {
                "type": "string", "default": d.damping_mode.as_str(),
                "enum": ["per_frame", "frame_rate_independent"],
                "description": "Whether damping is a flat per-frame factor or normalized by dt"
            },
            "repulsion_radius": number(d.repulsion_radius, 1.0, 2000.0, "Pointer repulsion reach (px)"),
            "repulsion_strength": number(d.repulsion_strength, 0.0, 10_000.0, "Repulsion acceleration at the pointer (px/s^2)"),
            "repulsion_epsilon": number(d.repulsion_epsilon, 0.0, 10.0, "Squared distance below which repulsion is skipped"),
            "fade_in_fraction": number(d.fade_in_fraction, 0.0, 1.0, "Share of lifetime spent fading in"),
            "max_opacity": number(d.max_opacity, 0.0, 1.0, "Peak glyph opacity"),
            "max_dt": number(d.max_dt, 0.001, 1.0, "Largest frame step (s)"),
            "colors": {
                "type": "array", "items": "string", "default": d.colors,
                "description": "Glyph color table as #rrggbb strings"
            }
        })
    }
}

fn number(default: f64, min: f64, max: f64, description: &str) -> Value {
    json!({
        "type": "number",
        "default": default,
        "min": min,
        "max": max,
        "description": description
    })
}

fn finite(name: &str, v: f64) -> Result<(), EngineError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(EngineError::invalid_param(name, "must be finite"))
    }
}

fn non_negative(name: &str, v: f64) -> Result<(), EngineError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid_param(name, "must be finite and >= 0"))
    }
}

fn positive(name: &str, v: f64) -> Result<(), EngineError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid_param(name, "must be finite and > 0"))
    }
}

fn ordered(name: &str, min: f64, max: f64) -> Result<(), EngineError> {
    if max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(EngineError::invalid_param(
            name,
            format!("min ({min}) must not exceed max ({max})"),
        ))
    }
}
