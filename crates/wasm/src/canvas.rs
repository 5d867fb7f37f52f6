//! [`Surface`] over a browser `CanvasRenderingContext2d`.

use glyph_field_core::{Srgb, Surface, Viewport};
use std::fmt::Write;
use web_sys::CanvasRenderingContext2d;

/// Font size the context font is set to; glyphs scale from it.
const BASE_FONT_PX: f64 = 16.0;
const FONT: &str = "16px sans-serif";

/// Draws glyphs with `fillText`, scaling a fixed base font instead of
/// rebuilding the font string per glyph.
pub struct Canvas2dSurface {
    ctx: CanvasRenderingContext2d,
    dpr: f64,
    backing: (f64, f64),
    fill: String,
    fill_rgb: Option<[u8; 3]>,
}

impl Canvas2dSurface {
    pub fn new(ctx: CanvasRenderingContext2d, viewport: Viewport) -> Self {
        let mut surface = Self {
            ctx,
            dpr: 1.0,
            backing: (0.0, 0.0),
            fill: String::with_capacity(7),
            fill_rgb: None,
        };
        surface.resize(viewport);
        surface
    }

    /// Re-applies context state after the canvas backing store was resized,
    /// which resets it.
    pub fn resize(&mut self, viewport: Viewport) {
        self.dpr = viewport.device_pixel_ratio();
        self.backing = (
            f64::from(viewport.backing_width()),
            f64::from(viewport.backing_height()),
        );
        self.ctx.set_font(FONT);
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.fill_rgb = None;
    }

    fn set_color(&mut self, color: Srgb) {
        let rgb = color.to_rgb8();
        if self.fill_rgb != Some(rgb) {
            write_hex(&mut self.fill, rgb);
            self.fill_rgb = Some(rgb);
        }
        // save/restore around each glyph resets the fill style.
        self.ctx.set_fill_style_str(&self.fill);
    }
}

/// Rewrites `out` as `#rrggbb` in place.
fn write_hex(out: &mut String, [r, g, b]: [u8; 3]) {
    out.clear();
    // Writing into a String cannot fail.
    let _ = write!(out, "#{r:02x}{g:02x}{b:02x}");
}

impl Surface for Canvas2dSurface {
    fn clear(&mut self) {
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.clear_rect(0.0, 0.0, self.backing.0, self.backing.1);
        let _ = self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        let _ = self.ctx.translate(x, y);
    }

    fn rotate(&mut self, radians: f64) {
        let _ = self.ctx.rotate(radians);
    }

    fn draw_glyph(&mut self, glyph: &str, size: f64, color: Srgb, alpha: f64) {
        if !(size.is_finite() && size > 0.0) {
            return;
        }
        self.set_color(color);
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0));
        let k = size / BASE_FONT_PX;
        let _ = self.ctx.scale(k, k);
        let _ = self.ctx.fill_text(glyph, 0.0, 0.0);
        let _ = self.ctx.scale(1.0 / k, 1.0 / k);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_hex_reuses_buffer() {
        let mut s = String::with_capacity(7);
        write_hex(&mut s, [0xa7, 0x8b, 0xfa]);
        assert_eq!(s, "#a78bfa");
        let cap = s.capacity();
        write_hex(&mut s, [0, 1, 255]);
        assert_eq!(s, "#0001ff");
        assert_eq!(s.capacity(), cap);
    }

    #[test]
    fn base_font_matches_font_string() {
        assert!(FONT.starts_with(&format!("{}px", BASE_FONT_PX as u32)));
    }
}
