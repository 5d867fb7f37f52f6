//! Scripted pointer paths that stand in for a user's mouse.

use glyph_field_core::error::EngineError;
use glyph_field_core::Viewport;
use std::f64::consts::TAU;

/// All available script names.
const SCRIPT_NAMES: &[&str] = &["orbit", "sweep", "idle", "none"];

/// Seconds per lap of the orbit.
const ORBIT_PERIOD: f64 = 4.0;
/// Seconds per left-right pass of the sweep.
const SWEEP_PERIOD: f64 = 3.0;
/// Seconds per top-bottom drift of the sweep.
const SWEEP_DRIFT_PERIOD: f64 = 7.0;
/// Fraction of the surface kept clear at the sweep's edges.
const SWEEP_MARGIN: f64 = 0.1;

/// A deterministic pointer path over time.
///
/// Use [`PointerScript::from_name`] for string-based construction (CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerScript {
    /// Circles the surface center.
    Orbit,
    /// Zigzags left and right while drifting up and down.
    Sweep,
    /// Enters at the center and never moves again.
    Idle,
    /// Never enters the surface.
    Absent,
}

impl PointerScript {
    /// Looks up a script by name.
    ///
    /// Returns `EngineError::UnknownScript` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "orbit" => Ok(PointerScript::Orbit),
            "sweep" => Ok(PointerScript::Sweep),
            "idle" => Ok(PointerScript::Idle),
            "none" => Ok(PointerScript::Absent),
            _ => Err(EngineError::UnknownScript(name.to_string())),
        }
    }

    pub fn list_scripts() -> &'static [&'static str] {
        SCRIPT_NAMES
    }

    pub fn name(self) -> &'static str {
        match self {
            PointerScript::Orbit => "orbit",
            PointerScript::Sweep => "sweep",
            PointerScript::Idle => "idle",
            PointerScript::Absent => "none",
        }
    }

    /// Pointer position at `t` seconds in CSS pixels, or `None` while the
    /// pointer is outside the surface.
    pub fn position(self, t: f64, viewport: Viewport) -> Option<(f64, f64)> {
        let (cx, cy) = viewport.center();
        let (w, h) = (viewport.width(), viewport.height());
        match self {
            PointerScript::Orbit => {
                let radius = 0.35 * w.min(h);
                let (sin, cos) = (t / ORBIT_PERIOD * TAU).sin_cos();
                Some((cx + radius * cos, cy + radius * sin))
            }
            PointerScript::Sweep => {
                let x = w * (SWEEP_MARGIN + (1.0 - 2.0 * SWEEP_MARGIN) * triangle(t / SWEEP_PERIOD));
                let y = h
                    * (SWEEP_MARGIN
                        + (1.0 - 2.0 * SWEEP_MARGIN) * triangle(t / SWEEP_DRIFT_PERIOD));
                Some((x, y))
            }
            PointerScript::Idle => Some((cx, cy)),
            PointerScript::Absent => None,
        }
    }
}

/// Triangle wave in [0, 1] with period 1, starting at 0.
fn triangle(phase: f64) -> f64 {
    let p = phase.rem_euclid(1.0);
    if p < 0.5 {
        2.0 * p
    } else {
        2.0 - 2.0 * p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0, 1.0).unwrap()
    }

    #[test]
    fn from_name_knows_every_listed_script() {
        for name in PointerScript::list_scripts() {
            let script = PointerScript::from_name(name).unwrap();
            assert_eq!(script.name(), *name);
        }
    }

    #[test]
    fn from_name_unknown_returns_error() {
        let result = PointerScript::from_name("wander");
        assert!(matches!(result, Err(EngineError::UnknownScript(_))));
    }

    #[test]
    fn orbit_stays_on_its_circle() {
        let vp = viewport();
        for i in 0..100 {
            let (x, y) = PointerScript::Orbit.position(i as f64 * 0.07, vp).unwrap();
            let r = ((x - 400.0).powi(2) + (y - 300.0).powi(2)).sqrt();
            assert!((r - 210.0).abs() < 1e-9);
        }
    }

    #[test]
    fn sweep_stays_inside_margins() {
        let vp = viewport();
        for i in 0..500 {
            let (x, y) = PointerScript::Sweep.position(i as f64 * 0.05, vp).unwrap();
            assert!((80.0 - 1e-9..=720.0 + 1e-9).contains(&x));
            assert!((60.0 - 1e-9..=540.0 + 1e-9).contains(&y));
        }
    }

    #[test]
    fn idle_rests_at_center() {
        let vp = viewport();
        assert_eq!(PointerScript::Idle.position(0.0, vp), Some((400.0, 300.0)));
        assert_eq!(PointerScript::Idle.position(9.0, vp), Some((400.0, 300.0)));
    }

    #[test]
    fn absent_never_enters() {
        assert_eq!(PointerScript::Absent.position(1.0, viewport()), None);
    }

    #[test]
    fn triangle_wave_shape() {
        assert_eq!(triangle(0.0), 0.0);
        assert_eq!(triangle(0.25), 0.5);
        assert_eq!(triangle(0.5), 1.0);
        assert_eq!(triangle(1.0), 0.0);
        assert_eq!(triangle(-0.25), 0.5);
    }
}
