//! Fixed-capacity structure-of-arrays particle store.
//!
//! Every attribute lives in its own boxed slice, allocated once in
//! [`ParticlePool::new`] and indexed by slot. Slots are never added or
//! removed: spawning overwrites a dead slot, freeing clears its alive flag.
//! Attribute values of dead slots are stale and are only reachable through
//! [`ParticlePool::particle`], which hides them.

use crate::config::FieldConfig;
use crate::glyph::GLYPHS;
use crate::prng::Xorshift64;
use glam::DVec2;

/// Half-width of the random jitter applied to the launch angle (radians).
const LAUNCH_JITTER: f64 = 0.5;
/// Range of the per-particle noise time offset.
const NOISE_OFFSET_RANGE: f64 = 1000.0;

/// Copy of one live particle's attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub age: f64,
    pub lifespan: f64,
    pub rotation: f64,
    pub rotation_speed: f64,
    pub size: f64,
    pub glyph_index: u8,
    pub color_index: u8,
    pub noise_offset: f64,
    pub alpha: f64,
}

/// Particle attributes, one slice per attribute.
///
/// The simulation mutates the slices in place through crate-visible fields;
/// everyone else reads through the accessors.
pub struct ParticlePool {
    pub(crate) x: Box<[f64]>,
    pub(crate) y: Box<[f64]>,
    pub(crate) vx: Box<[f64]>,
    pub(crate) vy: Box<[f64]>,
    pub(crate) age: Box<[f64]>,
    pub(crate) lifespan: Box<[f64]>,
    pub(crate) rotation: Box<[f64]>,
    pub(crate) rotation_speed: Box<[f64]>,
    pub(crate) size: Box<[f64]>,
    pub(crate) noise_offset: Box<[f64]>,
    /// Draw opacity computed by the latest update.
    pub(crate) alpha: Box<[f64]>,
    pub(crate) glyph: Box<[u8]>,
    pub(crate) color: Box<[u8]>,
    pub(crate) alive: Box<[bool]>,
    alive_count: usize,
}

fn zeroed<T: Copy + Default>(capacity: usize) -> Box<[T]> {
    vec![T::default(); capacity].into_boxed_slice()
}

impl ParticlePool {
    /// Allocates `capacity` dead slots. This is the pool's only allocation.
    pub fn new(capacity: usize) -> Self {
        Self {
            x: zeroed(capacity),
            y: zeroed(capacity),
            vx: zeroed(capacity),
            vy: zeroed(capacity),
            age: zeroed(capacity),
            lifespan: zeroed(capacity),
            rotation: zeroed(capacity),
            rotation_speed: zeroed(capacity),
            size: zeroed(capacity),
            noise_offset: zeroed(capacity),
            alpha: zeroed(capacity),
            glyph: zeroed(capacity),
            color: zeroed(capacity),
            alive: zeroed(capacity),
            alive_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.alive.len()
    }

    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    pub fn is_full(&self) -> bool {
        self.alive_count == self.capacity()
    }

    /// Whether `slot` holds a live particle. Out-of-range slots are dead.
    pub fn is_alive(&self, slot: usize) -> bool {
        self.alive.get(slot).copied().unwrap_or(false)
    }

    /// Lowest-index dead slot, or `None` when the pool is saturated.
    pub fn find_free_slot(&self) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        self.alive.iter().position(|&alive| !alive)
    }

    /// Indices of live slots in ascending order.
    pub fn alive_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter_map(|(i, &alive)| alive.then_some(i))
    }

    /// Attributes of a live slot; `None` for dead or out-of-range slots.
    pub fn particle(&self, slot: usize) -> Option<Particle> {
        if !self.is_alive(slot) {
            return None;
        }
        Some(Particle {
            x: self.x[slot],
            y: self.y[slot],
            vx: self.vx[slot],
            vy: self.vy[slot],
            age: self.age[slot],
            lifespan: self.lifespan[slot],
            rotation: self.rotation[slot],
            rotation_speed: self.rotation_speed[slot],
            size: self.size[slot],
            glyph_index: self.glyph[slot],
            color_index: self.color[slot],
            noise_offset: self.noise_offset[slot],
            alpha: self.alpha[slot],
        })
    }

    /// Fills `slot` with a fresh particle launched from the pointer.
    ///
    /// The particle appears at a random angle θ and a radius drawn from the
    /// spawn annulus around `origin`. It moves at a random speed along
    /// `θ ± 0.5` rad plus `momentum_transfer · origin_velocity` (px/s).
    /// Lifespan, size, glyph and color are drawn from their ranges; age,
    /// rotation and rotation speed start at 0.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= capacity()`.
    pub fn spawn(
        &mut self,
        slot: usize,
        origin: DVec2,
        origin_velocity: DVec2,
        config: &FieldConfig,
        rng: &mut Xorshift64,
    ) {
        let angle = rng.next_angle();
        let radius = rng.next_range(config.spawn_radius_min, config.spawn_radius_max);
        let position = origin + DVec2::from_angle(angle) * radius;

        let speed = rng.next_range(config.spawn_speed_min, config.spawn_speed_max);
        let heading = angle + rng.next_range(-LAUNCH_JITTER, LAUNCH_JITTER);
        let velocity =
            DVec2::from_angle(heading) * speed + origin_velocity * config.momentum_transfer;

        let lifespan = rng.next_range(config.min_lifespan, config.max_lifespan);
        let size = rng.next_range(config.min_size, config.max_size);
        let glyph = rng.next_index(GLYPHS.len()) as u8;
        let color = rng.next_index(config.colors.len()) as u8;
        let noise_offset = rng.next_range(0.0, NOISE_OFFSET_RANGE);

        self.x[slot] = position.x;
        self.y[slot] = position.y;
        self.vx[slot] = velocity.x;
        self.vy[slot] = velocity.y;
        self.age[slot] = 0.0;
        self.lifespan[slot] = lifespan;
        self.rotation[slot] = 0.0;
        self.rotation_speed[slot] = 0.0;
        self.size[slot] = size;
        self.glyph[slot] = glyph;
        self.color[slot] = color;
        self.noise_offset[slot] = noise_offset;
        self.alpha[slot] = 0.0;
        if !self.alive[slot] {
            self.alive[slot] = true;
            self.alive_count += 1;
        }
    }

    /// Finds the lowest free slot and spawns into it. `None` when saturated;
    /// the request is then dropped.
    pub fn try_spawn(
        &mut self,
        origin: DVec2,
        origin_velocity: DVec2,
        config: &FieldConfig,
        rng: &mut Xorshift64,
    ) -> Option<usize> {
        let slot = self.find_free_slot()?;
        self.spawn(slot, origin, origin_velocity, config, rng);
        Some(slot)
    }

    /// Marks `slot` dead. Its attribute values stay stale until respawn.
    pub fn free(&mut self, slot: usize) {
        if let Some(alive) = self.alive.get_mut(slot) {
            if *alive {
                *alive = false;
                self.alive_count -= 1;
            }
        }
    }
}

impl std::fmt::Debug for ParticlePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticlePool")
            .field("capacity", &self.capacity())
            .field("alive", &self.alive_count)
            .finish()
    }
}
