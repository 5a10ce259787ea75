//! Fibonacci lattice on the unit sphere
//!
//! Points are placed along the golden spiral and nudged by a small random
//! tangential jitter. The spiral alone is highly structured, which produces
//! many cospherical configurations; the jitter breaks them up.

use std::f64::consts::PI;

use glam::DVec3;
use rand::Rng;

/// Golden ratio φ = (1 + √5) / 2
const PHI: f64 = 1.618033988749895;

/// Jitter as a fraction of the average point spacing
const JITTER_STRENGTH: f64 = 0.5;

/// Pole offset for a given point count
fn epsilon(n: usize) -> f64 {
    match n {
        0..=23 => 0.33,
        24..=176 => 1.33,
        177..=889 => 3.33,
        890..=10999 => 10.0,
        _ => 27.5,
    }
}

/// Generate `count` jittered lattice points on the unit sphere
pub fn fibonacci_sphere<R: Rng>(count: usize, rng: &mut R) -> Vec<DVec3> {
    if count == 0 {
        return Vec::new();
    }

    let eps = epsilon(count);
    let n = count as f64;
    let jitter_amount = (4.0 * PI / n).sqrt() * JITTER_STRENGTH;
    // Keeps the latitude formula finite for a single point
    let denominator = (n - 1.0 + 2.0 * eps).max(f64::EPSILON);

    (0..count)
        .map(|i| {
            let i = i as f64;
            let theta = 2.0 * PI * i / PHI;
            let cos_phi = (1.0 - 2.0 * (i + eps) / denominator).clamp(-1.0, 1.0);
            let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();
            let base = DVec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi);

            let jitter_theta: f64 = rng.gen_range(0.0..2.0 * PI);
            let jitter_mag: f64 = rng.gen_range(0.0..jitter_amount);

            let up = if base.z.abs() < 0.9 { DVec3::Z } else { DVec3::X };
            let tangent1 = base.cross(up).normalize();
            let tangent2 = base.cross(tangent1).normalize();

            (base
                + tangent1 * jitter_mag * jitter_theta.cos()
                + tangent2 * jitter_mag * jitter_theta.sin())
            .normalize()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_points_on_unit_sphere() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for p in fibonacci_sphere(500, &mut rng) {
            assert!((p.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_has_poles() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let points = fibonacci_sphere(1000, &mut rng);

        assert!(points[0].z > 0.9, "first z={}", points[0].z);
        assert!(points[999].z < -0.9, "last z={}", points[999].z);
    }

    #[test]
    fn test_single_point() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let points = fibonacci_sphere(1, &mut rng);
        assert_eq!(points.len(), 1);
        assert!(points[0].is_finite());
    }

    #[test]
    fn test_epsilon_ranges() {
        assert_eq!(epsilon(23), 0.33);
        assert_eq!(epsilon(24), 1.33);
        assert_eq!(epsilon(889), 3.33);
        assert_eq!(epsilon(890), 10.0);
        assert_eq!(epsilon(11000), 27.5);
    }
}
