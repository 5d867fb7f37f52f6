//! Static glyph table addressed by `glyphIndex`.

/// Glyphs a particle may be drawn as, picked uniformly at spawn.
pub const GLYPHS: &[&str] = &["+", "×", "·", "*", "◦", "✦"];

/// Glyph for `index`, wrapping out-of-range indices.
pub fn glyph(index: usize) -> &'static str {
    GLYPHS[index % GLYPHS.len()]
}
