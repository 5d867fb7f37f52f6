//! CPU raster [`Surface`] for headless rendering.
//!
//! Pixels are premultiplied linear-light RGBA at the viewport's backing
//! resolution. Glyphs are stamped from 5×5 bitmasks through the current
//! affine transform and composited source-over. There is no antialiasing;
//! snapshots are for inspection, not for matching a browser pixel for pixel.

use glam::{DAffine2, DVec2};
use glyph_field_core::{EngineError, Srgb, Surface, Viewport, GLYPHS};

/// Largest backing store a surface will allocate (8192 × 8192).
pub const MAX_PIXELS: usize = 1 << 26;

/// Rows of a 5×5 glyph mask, top to bottom; bit 4 is the leftmost column.
type Mask = [u8; 5];

const MASKS: [Mask; 6] = [
    // +
    [0b00100, 0b00100, 0b11111, 0b00100, 0b00100],
    // ×
    [0b10001, 0b01010, 0b00100, 0b01010, 0b10001],
    // ·
    [0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
    // *
    [0b00100, 0b10101, 0b01110, 0b10101, 0b00100],
    // ◦
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
    // ✦
    [0b00100, 0b01110, 0b11111, 0b01110, 0b00100],
];

/// Stamp for glyphs outside the table.
const FALLBACK_MASK: Mask = [0b11111; 5];

fn mask_for(glyph: &str) -> &'static Mask {
    GLYPHS
        .iter()
        .position(|&g| g == glyph)
        .and_then(|i| MASKS.get(i))
        .unwrap_or(&FALLBACK_MASK)
}

fn mask_hit(mask: &Mask, col: usize, row: usize) -> bool {
    (mask[row] >> (4 - col)) & 1 == 1
}

/// Premultiplied linear RGBA pixel buffer with a canvas-style transform stack.
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<[f64; 4]>,
    /// CSS pixels to device pixels.
    base: DAffine2,
    transform: DAffine2,
    stack: Vec<DAffine2>,
    background: Option<Srgb>,
}

impl RasterSurface {
    /// Allocates a transparent surface at the viewport's backing resolution.
    ///
    /// Returns `EngineError::InvalidDimensions` if the pixel count overflows
    /// `usize` or exceeds [`MAX_PIXELS`].
    pub fn new(viewport: Viewport) -> Result<Self, EngineError> {
        let width = viewport.backing_width();
        let height = viewport.backing_height();
        let len = (width as usize)
            .checked_mul(height as usize)
            .filter(|&len| len <= MAX_PIXELS)
            .ok_or(EngineError::InvalidDimensions)?;
        let base = DAffine2::from_scale(DVec2::splat(viewport.device_pixel_ratio()));
        Ok(Self {
            width,
            height,
            pixels: vec![[0.0; 4]; len],
            base,
            transform: base,
            stack: Vec::new(),
            background: None,
        })
    }

    /// Makes `clear` fill with an opaque color instead of transparency.
    pub fn with_background(mut self, color: Srgb) -> Self {
        self.background = Some(color);
        self.clear();
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Straight-alpha RGBA of the pixel at `(x, y)` in sRGB, or `None`
    /// outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<(Srgb, f64)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let [r, g, b, a] = self.pixels[y as usize * self.width as usize + x as usize];
        if a <= 0.0 {
            return Some((Srgb { r: 0.0, g: 0.0, b: 0.0 }, 0.0));
        }
        Some((Srgb::from_linear([r / a, g / a, b / a]), a))
    }

    /// Encodes the buffer as straight-alpha sRGB RGBA8, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&[r, g, b, a]| {
                if a <= 0.0 {
                    return [0, 0, 0, 0];
                }
                let [sr, sg, sb] = Srgb::from_linear([r / a, g / a, b / a]).to_rgb8();
                [sr, sg, sb, (a.clamp(0.0, 1.0) * 255.0).round() as u8]
            })
            .collect()
    }

    fn blend(&mut self, index: usize, src: [f64; 3], alpha: f64) {
        let dst = &mut self.pixels[index];
        let keep = 1.0 - alpha;
        dst[0] = src[0] * alpha + dst[0] * keep;
        dst[1] = src[1] * alpha + dst[1] * keep;
        dst[2] = src[2] * alpha + dst[2] * keep;
        dst[3] = alpha + dst[3] * keep;
    }
}

impl Surface for RasterSurface {
    fn clear(&mut self) {
        let fill = match self.background {
            Some(color) => {
                let [r, g, b] = color.to_linear();
                [r, g, b, 1.0]
            }
            None => [0.0; 4],
        };
        self.pixels.fill(fill);
        self.transform = self.base;
        self.stack.clear();
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform = self.transform * DAffine2::from_translation(DVec2::new(x, y));
    }

    fn rotate(&mut self, radians: f64) {
        self.transform = self.transform * DAffine2::from_angle(radians);
    }

    fn draw_glyph(&mut self, glyph: &str, size: f64, color: Srgb, alpha: f64) {
        let alpha = alpha.clamp(0.0, 1.0);
        if !(size.is_finite() && size > 0.0) || alpha.is_nan() || alpha == 0.0 {
            return;
        }
        let half = size * 0.5;
        let cell = size / 5.0;
        let mask = mask_for(glyph);
        let src = color.to_linear();

        let corners = [
            DVec2::new(-half, -half),
            DVec2::new(half, -half),
            DVec2::new(half, half),
            DVec2::new(-half, half),
        ]
        .map(|c| self.transform.transform_point2(c));
        let lo = corners.iter().fold(DVec2::INFINITY, |m, &c| m.min(c));
        let hi = corners.iter().fold(DVec2::NEG_INFINITY, |m, &c| m.max(c));
        if !lo.is_finite() || !hi.is_finite() {
            return;
        }
        let x0 = lo.x.floor().max(0.0) as u32;
        let y0 = lo.y.floor().max(0.0) as u32;
        let x1 = hi.x.ceil().min(self.width as f64).max(0.0) as u32;
        let y1 = hi.y.ceil().min(self.height as f64).max(0.0) as u32;

        let inverse = self.transform.inverse();
        for py in y0..y1 {
            for px in x0..x1 {
                let local =
                    inverse.transform_point2(DVec2::new(px as f64 + 0.5, py as f64 + 0.5));
                let u = local + DVec2::splat(half);
                if u.x < 0.0 || u.y < 0.0 || u.x >= size || u.y >= size {
                    continue;
                }
                let col = ((u.x / cell) as usize).min(4);
                let row = ((u.y / cell) as usize).min(4);
                if mask_hit(mask, col, row) {
                    let index = py as usize * self.width as usize + px as usize;
                    self.blend(index, src, alpha);
                }
            }
        }
    }
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Srgb = Srgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    fn surface(w: f64, h: f64, dpr: f64) -> RasterSurface {
        RasterSurface::new(Viewport::new(w, h, dpr).unwrap()).unwrap()
    }

    fn alpha_at(s: &RasterSurface, x: u32, y: u32) -> f64 {
        s.pixel(x, y).unwrap().1
    }

    fn stamp(s: &mut RasterSurface, x: f64, y: f64, glyph: &str, size: f64, alpha: f64) {
        s.save();
        s.translate(x, y);
        s.draw_glyph(glyph, size, WHITE, alpha);
        s.restore();
    }

    #[test]
    fn new_surface_is_transparent_at_backing_size() {
        let s = surface(40.0, 30.0, 2.0);
        assert_eq!((s.width(), s.height()), (80, 60));
        assert_eq!(s.to_rgba8().len(), 80 * 60 * 4);
        assert!(s.to_rgba8().iter().all(|&b| b == 0));
    }

    #[test]
    fn oversized_viewport_is_rejected() {
        let huge = Viewport::new(1e10, 1e10, 1.0).unwrap();
        assert!(matches!(
            RasterSurface::new(huge),
            Err(EngineError::InvalidDimensions)
        ));
        let wide = Viewport::new(MAX_PIXELS as f64 + 1.0, 1.0, 1.0).unwrap();
        assert!(RasterSurface::new(wide).is_err());
    }

    #[test]
    fn plus_covers_center_and_arms_but_not_corners() {
        let mut s = surface(20.0, 20.0, 1.0);
        stamp(&mut s, 10.0, 10.0, "+", 10.0, 1.0);
        assert_eq!(alpha_at(&s, 10, 10), 1.0);
        assert_eq!(alpha_at(&s, 6, 10), 1.0);
        assert_eq!(alpha_at(&s, 10, 6), 1.0);
        assert_eq!(alpha_at(&s, 6, 6), 0.0);
        assert_eq!(alpha_at(&s, 0, 0), 0.0);
    }

    #[test]
    fn rotation_turns_plus_into_cross() {
        let mut s = surface(20.0, 20.0, 1.0);
        s.translate(10.0, 10.0);
        s.rotate(std::f64::consts::FRAC_PI_4);
        s.draw_glyph("+", 10.0, WHITE, 1.0);
        // The arm that pointed right now points down-right.
        assert_eq!(alpha_at(&s, 12, 12), 1.0);
        assert_eq!(alpha_at(&s, 14, 10), 0.0);
    }

    #[test]
    fn source_over_accumulates_alpha() {
        let mut s = surface(10.0, 10.0, 1.0);
        stamp(&mut s, 5.0, 5.0, "·", 10.0, 0.5);
        stamp(&mut s, 5.0, 5.0, "·", 10.0, 0.5);
        assert!((alpha_at(&s, 5, 5) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn blended_color_keeps_its_hue() {
        let mut s = surface(10.0, 10.0, 1.0);
        let violet = Srgb::from_hex("#a78bfa").unwrap();
        s.translate(5.0, 5.0);
        s.draw_glyph("·", 10.0, violet, 0.35);
        let (color, alpha) = s.pixel(5, 5).unwrap();
        assert!((alpha - 0.35).abs() < 1e-12);
        assert_eq!(color.to_hex(), "#a78bfa");
    }

    #[test]
    fn background_fills_opaque() {
        let bg = Srgb::from_hex("#101018").unwrap();
        let s = surface(4.0, 4.0, 1.0).with_background(bg);
        let (color, alpha) = s.pixel(2, 2).unwrap();
        assert_eq!(alpha, 1.0);
        assert_eq!(color.to_hex(), "#101018");
    }

    #[test]
    fn device_pixel_ratio_scales_glyphs() {
        let mut s = surface(20.0, 20.0, 2.0);
        stamp(&mut s, 10.0, 10.0, "+", 10.0, 1.0);
        assert_eq!(alpha_at(&s, 20, 20), 1.0);
        // Arm tip at CSS (14, 10) lands at device (28, 20).
        assert_eq!(alpha_at(&s, 28, 20), 1.0);
    }

    #[test]
    fn glyphs_off_surface_are_clipped() {
        let mut s = surface(10.0, 10.0, 1.0);
        stamp(&mut s, -50.0, -50.0, "✦", 12.0, 1.0);
        stamp(&mut s, 500.0, 5.0, "✦", 12.0, 1.0);
        stamp(&mut s, 0.0, 0.0, "✦", 12.0, 1.0);
        assert_eq!(alpha_at(&s, 0, 0), 1.0);
        assert_eq!(alpha_at(&s, 9, 9), 0.0);
    }

    #[test]
    fn degenerate_draws_are_ignored() {
        let mut s = surface(10.0, 10.0, 1.0);
        stamp(&mut s, 5.0, 5.0, "+", 0.0, 1.0);
        stamp(&mut s, 5.0, 5.0, "+", f64::NAN, 1.0);
        stamp(&mut s, 5.0, 5.0, "+", 5.0, 0.0);
        assert!(s.to_rgba8().iter().all(|&b| b == 0));
    }

    #[test]
    fn clear_resets_pixels_and_transform() {
        let mut s = surface(10.0, 10.0, 1.0);
        s.translate(100.0, 100.0);
        s.save();
        s.clear();
        s.translate(5.0, 5.0);
        s.draw_glyph("·", 10.0, WHITE, 1.0);
        assert_eq!(alpha_at(&s, 5, 5), 1.0);
    }

    #[test]
    fn unknown_glyph_uses_solid_fallback() {
        let mut s = surface(10.0, 10.0, 1.0);
        stamp(&mut s, 5.0, 5.0, "@", 5.0, 1.0);
        assert_eq!(alpha_at(&s, 3, 3), 1.0);
    }

    #[test]
    fn every_table_glyph_has_a_mask() {
        assert_eq!(MASKS.len(), GLYPHS.len());
        for (glyph, mask) in GLYPHS.iter().zip(MASKS.iter()) {
            assert_eq!(mask_for(glyph), mask);
            assert!(mask.iter().any(|&row| row != 0));
        }
    }
}
