//! The drawing surface the simulation renders onto.
//!
//! [`Surface`] mirrors the small slice of a 2D canvas API the glyph field
//! needs: a save/restore transform stack, translate, rotate and a single
//! glyph primitive. Hosts implement it over a browser canvas or a CPU raster;
//! [`RecordingSurface`] captures the draw list for inspection.
//!
//! The trait is object-safe so the simulation can draw through
//! `&mut dyn Surface`.

use crate::color::Srgb;

/// A 2D drawing target with a transform stack.
pub trait Surface {
    /// Erases the whole surface and resets the transform to identity.
    fn clear(&mut self);

    /// Pushes the current transform.
    fn save(&mut self);

    /// Pops the transform pushed by the matching [`save`](Surface::save).
    fn restore(&mut self);

    /// Moves the origin by `(x, y)` in the current coordinate system.
    fn translate(&mut self, x: f64, y: f64);

    /// Rotates the coordinate system by `radians`.
    fn rotate(&mut self, radians: f64);

    /// Draws `glyph` centered on the current origin.
    fn draw_glyph(&mut self, glyph: &str, size: f64, color: Srgb, alpha: f64);
}

/// One glyph as it reached the surface, in surface coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub glyph: String,
    pub size: f64,
    pub color: Srgb,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Transform {
    x: f64,
    y: f64,
    rotation: f64,
}

/// [`Surface`] that records every glyph drawn since the last `clear`.
///
/// Only translate-then-rotate chains are tracked exactly, which is all the
/// simulation emits.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    current: Transform,
    stack: Vec<Transform>,
    clears: usize,
    unbalanced_restores: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw list since the last `clear`.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of `clear` calls so far.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Current depth of the save stack; 0 when every save was restored.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of `restore` calls made with an empty stack.
    pub fn unbalanced_restores(&self) -> usize {
        self.unbalanced_restores
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.clear();
        self.current = Transform::default();
        self.clears += 1;
    }

    fn save(&mut self) {
        self.stack.push(self.current);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(t) => self.current = t,
            None => self.unbalanced_restores += 1,
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        let (sin, cos) = self.current.rotation.sin_cos();
        self.current.x += x * cos - y * sin;
        self.current.y += x * sin + y * cos;
    }

    fn rotate(&mut self, radians: f64) {
        self.current.rotation += radians;
    }

    fn draw_glyph(&mut self, glyph: &str, size: f64, color: Srgb, alpha: f64) {
        self.commands.push(DrawCommand {
            x: self.current.x,
            y: self.current.y,
            rotation: self.current.rotation,
            glyph: glyph.to_string(),
            size,
            color,
            alpha,
        });
    }
}
