//! Coherent 2D simplex noise driving the particle drift.
//!
//! A [`NoiseField`] is built once from a seed and is a pure function after
//! that: the permutation table inside [`Simplex`] is fixed at construction,
//! so sampling every particle every frame needs no synchronization. Two
//! fields built from different seeds are unrelated.

use crate::prng::Xorshift64;
use ::noise::{NoiseFn, Simplex};

/// Seeded simplex noise field returning values in [-1, 1].
#[derive(Clone, Debug)]
pub struct NoiseField {
    noise: Simplex,
}

impl NoiseField {
    /// Builds a field whose permutation table is seeded from the core PRNG.
    pub fn new(seed: u64) -> Self {
        let mut rng = Xorshift64::new(seed);
        Self {
            noise: Simplex::new(rng.next_u64() as u32),
        }
    }

    /// Samples the field at `(x, y)` with a time-like third coordinate.
    ///
    /// Time translates the sampling point along the diagonal, so the pattern
    /// drifts smoothly as `t` advances. Output is in [-1, 1] and finite for
    /// any input, including NaN and infinities (which yield 0).
    pub fn sample(&self, x: f64, y: f64, t: f64) -> f64 {
        self.simplex(x + t, y + t)
    }

    /// Plain 2D simplex noise in [-1, 1].
    pub fn simplex(&self, x: f64, y: f64) -> f64 {
        let v = self.noise.get([x, y]);
        if v.is_finite() {
            v.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = (f64, f64)> {
        (0..64).flat_map(|y| (0..64).map(move |x| (x as f64 * 0.173, y as f64 * 0.219)))
    }

    #[test]
    fn same_instance_same_output() {
        let field = NoiseField::new(7);
        for (x, y) in grid() {
            let a = field.sample(x, y, 1.25);
            let b = field.sample(x, y, 1.25);
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = NoiseField::new(99);
        let b = NoiseField::new(99);
        assert!(grid().all(|(x, y)| a.simplex(x, y).to_bits() == b.simplex(x, y).to_bits()));
    }

    #[test]
    fn different_seeds_differ_somewhere() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);
        assert!(grid().any(|(x, y)| a.simplex(x, y) != b.simplex(x, y)));
    }

    #[test]
    fn output_stays_in_range() {
        let field = NoiseField::new(3);
        for (x, y) in grid() {
            let v = field.sample(x * 10.0, y * 10.0, 0.5);
            assert!((-1.0..=1.0).contains(&v), "sample = {v}");
        }
    }

    #[test]
    fn nearby_inputs_give_nearby_outputs() {
        let field = NoiseField::new(11);
        for (x, y) in grid() {
            let a = field.simplex(x, y);
            let b = field.simplex(x + 1e-4, y - 1e-4);
            assert!((a - b).abs() < 1e-2, "jump of {} at ({x}, {y})", (a - b).abs());
        }
    }

    #[test]
    fn time_coordinate_moves_the_field_smoothly() {
        let field = NoiseField::new(5);
        let a = field.sample(3.3, 4.4, 0.0);
        let b = field.sample(3.3, 4.4, 1e-4);
        assert!((a - b).abs() < 1e-2);
    }

    #[test]
    fn field_is_not_flat() {
        let field = NoiseField::new(8);
        let values: Vec<f64> = grid().map(|(x, y)| field.simplex(x, y)).collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        assert!(var > 0.001, "variance too small: {var}");
    }

    #[test]
    fn non_finite_input_yields_finite_output() {
        let field = NoiseField::new(17);
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(field.sample(v, 1.0, 0.0).is_finite());
            assert!(field.sample(1.0, v, 0.0).is_finite());
            assert!(field.sample(1.0, 1.0, v).is_finite());
        }
    }

    #[test]
    fn huge_coordinates_stay_in_range() {
        let field = NoiseField::new(19);
        let v = field.simplex(1e15, -3e14);
        assert!((-1.0..=1.0).contains(&v));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn bounded_and_pure_for_any_seed(
                seed: u64,
                x in -1e4_f64..1e4,
                y in -1e4_f64..1e4,
                t in 0.0_f64..1e3,
            ) {
                let field = NoiseField::new(seed);
                let a = field.sample(x, y, t);
                prop_assert!((-1.0..=1.0).contains(&a), "sample = {a}");
                prop_assert_eq!(a.to_bits(), field.sample(x, y, t).to_bits());
            }
        }
    }
}
