//! Synthetic weighted point clouds
//!
//! Seeded generators for each [`Distribution`], used by the demos and tests
//! to produce engine input without an external data set.

mod fibonacci;

pub use fibonacci::fibonacci_sphere;

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{Distribution, EngineConfig};
use crate::loader::RawPoint;

/// Half-thickness of the shell used by [`Distribution::ThinSphere`]
const THIN_SHELL: f64 = 0.05;

/// Generate `config.point_num` weighted points
///
/// Positions follow `config.distribution` inside the unit cube (or unit
/// ball); weights are uniform in `[0, weight_max)`. The same seed always
/// yields the same cloud.
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::*;
///
/// let config = EngineConfigBuilder::new()
///     .point_num(1000)
///     .distribution(Distribution::Ball)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let points = generate_points(&config);
/// assert_eq!(points.len(), 1000);
/// assert!(points.iter().all(|p| p.x * p.x + p.y * p.y + p.z * p.z <= 1.0));
/// ```
pub fn generate_points(config: &EngineConfig) -> Vec<RawPoint> {
    let count = config.point_num;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let positions: Vec<DVec3> = match config.distribution {
        Distribution::Uniform => (0..count)
            .map(|_| DVec3::new(rng.gen(), rng.gen(), rng.gen()))
            .collect(),
        Distribution::Ball => (0..count).map(|_| sample_ball(&mut rng)).collect(),
        Distribution::Sphere => fibonacci_sphere(count, &mut rng),
        Distribution::ThinSphere => fibonacci_sphere(count, &mut rng)
            .into_iter()
            .map(|p| p * (1.0 + rng.gen_range(-THIN_SHELL..THIN_SHELL)))
            .collect(),
    };

    let weight_max = f64::from(config.weight_max);
    positions
        .into_iter()
        .map(|p| {
            let w = if weight_max > 0.0 {
                rng.gen_range(0.0..weight_max)
            } else {
                0.0
            };
            RawPoint::new(p.x, p.y, p.z, w)
        })
        .collect()
}

/// Uniform sample from the unit ball by rejection
fn sample_ball(rng: &mut ChaCha8Rng) -> DVec3 {
    loop {
        let p = DVec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfigBuilder;

    fn config(distribution: Distribution, count: usize, seed: u64) -> EngineConfig {
        EngineConfigBuilder::new()
            .point_num(count)
            .distribution(distribution)
            .seed(seed)
            .build()
            .unwrap()
    }

    #[test]
    fn test_point_count() {
        for distribution in [
            Distribution::Uniform,
            Distribution::Ball,
            Distribution::Sphere,
            Distribution::ThinSphere,
        ] {
            assert_eq!(generate_points(&config(distribution, 257, 1)).len(), 257);
            assert!(generate_points(&config(distribution, 0, 1)).is_empty());
        }
    }

    #[test]
    fn test_uniform_in_unit_cube() {
        for p in generate_points(&config(Distribution::Uniform, 500, 3)) {
            for c in [p.x, p.y, p.z] {
                assert!((0.0..1.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_shell_distributions() {
        for p in generate_points(&config(Distribution::Sphere, 300, 4)) {
            let r = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
            assert!((r - 1.0).abs() < 1e-9, "radius {}", r);
        }
        for p in generate_points(&config(Distribution::ThinSphere, 300, 4)) {
            let r = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
            assert!((r - 1.0).abs() <= THIN_SHELL + 1e-9, "radius {}", r);
        }
    }

    #[test]
    fn test_weights_within_ceiling() {
        let config = EngineConfigBuilder::new()
            .point_num(400)
            .weight_max(0.25)
            .unwrap()
            .build()
            .unwrap();
        for p in generate_points(&config) {
            assert!((0.0..0.25).contains(&p.w));
        }

        let unweighted = EngineConfigBuilder::new()
            .point_num(10)
            .weight_max(0.0)
            .unwrap()
            .build()
            .unwrap();
        assert!(generate_points(&unweighted).iter().all(|p| p.w == 0.0));
    }

    #[test]
    fn test_determinism() {
        let a = generate_points(&config(Distribution::Ball, 100, 42));
        let b = generate_points(&config(Distribution::Ball, 100, 42));
        let c = generate_points(&config(Distribution::Ball, 100, 43));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
