//! The per-frame glyph field loop.
//!
//! Each frame runs to completion in three phases:
//!
//! 1. **Spawn**: sample the pointer, turn its speed into a spawn count and
//!    fill free pool slots until the count is met or the pool is full.
//! 2. **Update**: age every live particle, free the ones that reached their
//!    lifespan, then apply noise drift, damping and pointer repulsion,
//!    integrate, and compute the draw alpha.
//! 3. **Draw**: hand each surviving particle to the [`Surface`].
//!
//! Nothing in a frame allocates: all particle storage is the pool's
//! preallocated slices, and pointer input only records positions that the
//! next frame reads.

use crate::clock::FrameClock;
use crate::config::FieldConfig;
use crate::error::EngineError;
use crate::glyph::glyph;
use crate::noise::NoiseField;
use crate::pointer::PointerTracker;
use crate::pool::ParticlePool;
use crate::prng::Xorshift64;
use crate::surface::Surface;
use crate::viewport::Viewport;
use glam::DVec2;
use log::{debug, trace};
use serde::Serialize;

/// What happened during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameStats {
    /// Step length actually simulated (s).
    pub dt: f64,
    /// Spawns the pointer speed asked for.
    pub requested: usize,
    pub spawned: usize,
    /// Requests dropped because the pool was full.
    pub dropped: usize,
    /// Particles that reached their lifespan this frame.
    pub expired: usize,
    /// Live particles after the update.
    pub alive: usize,
    /// Glyphs handed to the surface (0 when only `tick` ran).
    pub drawn: usize,
}

/// Opacity for a particle at normalized lifetime `t`.
///
/// Rises linearly from 0 to `max_opacity` over `[0, fade_in]`, then falls
/// linearly back to 0 at `t = 1`. `t` is clamped to [0, 1].
pub fn alpha_envelope(t: f64, fade_in: f64, max_opacity: f64) -> f64 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let level = if t < fade_in {
        t / fade_in
    } else {
        (1.0 - t) / (1.0 - fade_in)
    };
    level.clamp(0.0, 1.0) * max_opacity
}

/// One glyph field bound to one drawing surface.
///
/// Owns the pool, pointer tracker, noise field and random source. Hosts
/// create one per mounted surface and drop it on unmount; independent
/// instances share nothing.
pub struct Simulation {
    config: FieldConfig,
    pool: ParticlePool,
    pointer: PointerTracker,
    noise: NoiseField,
    rng: Xorshift64,
    clock: FrameClock,
    viewport: Viewport,
    time: f64,
}

impl Simulation {
    /// Validates `config` and allocates the particle pool.
    pub fn new(config: FieldConfig, viewport: Viewport, seed: u64) -> Result<Self, EngineError> {
        config.validate()?;
        let mut rng = Xorshift64::new(seed);
        let noise = NoiseField::new(rng.next_u64());
        debug!(
            "glyph field: {} slots on {}x{} @{}x",
            config.capacity,
            viewport.width(),
            viewport.height(),
            viewport.device_pixel_ratio()
        );
        Ok(Self {
            pool: ParticlePool::new(config.capacity),
            pointer: PointerTracker::new(),
            noise,
            rng,
            clock: FrameClock::new(config.max_dt),
            viewport,
            time: 0.0,
            config,
        })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Time passed to the most recent `tick`.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Records a pointer position. No simulation work happens until the
    /// next frame.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer.move_to(x, y);
    }

    /// Adopts a new surface size. Particle state is left untouched.
    pub fn resize(&mut self, viewport: Viewport) {
        debug!(
            "glyph field resized to {}x{} @{}x",
            viewport.width(),
            viewport.height(),
            viewport.device_pixel_ratio()
        );
        self.viewport = viewport;
    }

    /// Swaps in new tunables. The capacity is fixed for the simulation's
    /// lifetime, so a config with a different capacity is rejected.
    pub fn reconfigure(&mut self, config: FieldConfig) -> Result<(), EngineError> {
        config.validate()?;
        if config.capacity != self.config.capacity {
            return Err(EngineError::invalid_param(
                "capacity",
                format!(
                    "fixed at {} for a mounted field, got {}",
                    self.config.capacity, config.capacity
                ),
            ));
        }
        self.clock.set_max_dt(config.max_dt);
        self.config = config;
        Ok(())
    }

    /// Spawns one particle around `(x, y)` with inherited velocity
    /// `(vx, vy)` px/s. `None` when the pool is full.
    pub fn spawn_at(&mut self, x: f64, y: f64, vx: f64, vy: f64) -> Option<usize> {
        self.pool.try_spawn(
            DVec2::new(x, y),
            DVec2::new(vx, vy),
            &self.config,
            &mut self.rng,
        )
    }

    /// Runs one frame from a host timestamp (s): clamps `dt` through the
    /// frame clock, spawns and updates, clears the surface and draws.
    pub fn frame(&mut self, timestamp: f64, surface: &mut dyn Surface) -> FrameStats {
        let dt = self.clock.advance(timestamp);
        let mut stats = self.tick(dt, timestamp);
        surface.clear();
        stats.drawn = self.draw(surface);
        stats
    }

    /// Spawn and update phases for a step of `dt` seconds at time `time`.
    ///
    /// `dt` is clamped to `[0, max_dt]`; non-finite values count as 0.
    pub fn tick(&mut self, dt: f64, time: f64) -> FrameStats {
        let dt = if dt.is_finite() { dt.clamp(0.0, self.config.max_dt) } else { 0.0 };
        if time.is_finite() {
            self.time = time;
        }
        let mut stats = FrameStats {
            dt,
            ..FrameStats::default()
        };

        let pointer = self.pointer.sample_frame();
        if let Some(sample) = pointer {
            let requested = self.config.spawn_count(sample.speed, dt);
            // Pointer velocity is per frame; particles move in px/s.
            let origin_velocity = sample.velocity * self.config.reference_frame_rate;
            for _ in 0..requested {
                let spawned = self.pool.try_spawn(
                    sample.position,
                    origin_velocity,
                    &self.config,
                    &mut self.rng,
                );
                if spawned.is_none() {
                    break;
                }
                stats.spawned += 1;
            }
            stats.requested = requested;
            stats.dropped = requested - stats.spawned;
            if stats.dropped > 0 {
                trace!(
                    "pool saturated: dropped {} of {} spawns",
                    stats.dropped,
                    requested
                );
            }
        }

        stats.expired = self.update(dt, pointer.map(|s| s.position));
        stats.alive = self.pool.alive_count();
        stats
    }

    /// Ages, moves and fades every live particle. Returns how many expired.
    fn update(&mut self, dt: f64, repulsor: Option<DVec2>) -> usize {
        let cfg = &self.config;
        let noise = &self.noise;
        let pool = &mut self.pool;

        let damping = cfg.damping_factor(dt);
        let noise_time = self.time * cfg.noise_time_scale;
        let radius_sq = cfg.repulsion_radius * cfg.repulsion_radius;
        let mut expired = 0;

        for i in 0..pool.capacity() {
            if !pool.alive[i] {
                continue;
            }

            pool.age[i] += dt;
            if pool.age[i] >= pool.lifespan[i] {
                pool.free(i);
                expired += 1;
                continue;
            }
            let t = pool.age[i] / pool.lifespan[i];

            let nx = pool.x[i] * cfg.noise_scale;
            let ny = pool.y[i] * cfg.noise_scale;
            let nt = noise_time + pool.noise_offset[i];
            let drift_x = noise.sample(nx + cfg.noise_axis_offset, ny, nt);
            let drift_y = noise.sample(nx, ny + cfg.noise_axis_offset, nt);
            pool.vx[i] += drift_x * cfg.drift_force * dt;
            pool.vy[i] += drift_y * cfg.drift_force * dt;

            pool.vx[i] *= damping;
            pool.vy[i] *= damping;

            if let Some(center) = repulsor {
                let away = DVec2::new(pool.x[i], pool.y[i]) - center;
                let dist_sq = away.length_squared();
                if dist_sq < radius_sq && dist_sq > cfg.repulsion_epsilon {
                    let dist = dist_sq.sqrt();
                    let push =
                        (1.0 - dist / cfg.repulsion_radius) * cfg.repulsion_strength * dt;
                    pool.vx[i] += away.x / dist * push;
                    pool.vy[i] += away.y / dist * push;
                }
            }

            pool.x[i] += pool.vx[i] * dt;
            pool.y[i] += pool.vy[i] * dt;
            pool.rotation[i] += pool.rotation_speed[i] * dt;

            pool.alpha[i] = alpha_envelope(t, cfg.fade_in_fraction, cfg.max_opacity);
        }

        expired
    }

    /// Draw phase: every live particle, translated and rotated into place.
    /// Returns the number of glyphs drawn.
    pub fn draw(&self, surface: &mut dyn Surface) -> usize {
        let pool = &self.pool;
        let mut drawn = 0;
        for i in pool.alive_slots() {
            surface.save();
            surface.translate(pool.x[i], pool.y[i]);
            surface.rotate(pool.rotation[i]);
            surface.draw_glyph(
                glyph(pool.glyph[i] as usize),
                pool.size[i],
                self.config.colors.get(pool.color[i] as usize),
                pool.alpha[i],
            );
            surface.restore();
            drawn += 1;
        }
        drawn
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("pool", &self.pool)
            .field("viewport", &self.viewport)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}
