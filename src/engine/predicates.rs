//! Geometric predicates for weighted points
//!
//! Every predicate first evaluates its determinant in f64 together with a
//! forward error bound. When the value clears the bound its sign is certain
//! and the f64 value is returned as is. Otherwise the determinant is
//! recomputed in exact expansion arithmetic, so the sign of the result is
//! always exact, including exact zeros for coplanar and cospherical input.
//! Only the sign is exact on the slow path; the magnitude is rounded.

use glam::DVec3;

use super::expansion::Expansion;

/// Relative error factor of the f64 filters
///
/// Generous against the worst-case analysis of both determinants, including
/// the rounding of the initial coordinate differences.
const FILTER_FACTOR: f64 = 64.0 * f64::EPSILON;

/// Outcome of the f64 filter
enum Filtered {
    Certain(f64),
    Uncertain,
}

#[inline]
fn filter(value: f64, permanent: f64) -> Filtered {
    let bound = FILTER_FACTOR * permanent;
    if value.is_finite() && bound.is_finite() && value.abs() > bound {
        Filtered::Certain(value)
    } else {
        Filtered::Uncertain
    }
}

type ExactVec = [Expansion; 3];

fn exact_difference(a: DVec3, b: DVec3) -> ExactVec {
    [
        Expansion::difference(a.x, b.x),
        Expansion::difference(a.y, b.y),
        Expansion::difference(a.z, b.z),
    ]
}

fn exact_cross(a: &ExactVec, b: &ExactVec) -> ExactVec {
    [
        a[1].mul(&b[2]).sub(&a[2].mul(&b[1])),
        a[2].mul(&b[0]).sub(&a[0].mul(&b[2])),
        a[0].mul(&b[1]).sub(&a[1].mul(&b[0])),
    ]
}

fn exact_dot(a: &ExactVec, b: &ExactVec) -> Expansion {
    a[0].mul(&b[0]).add(&a[1].mul(&b[1])).add(&a[2].mul(&b[2]))
}

/// Sum of the absolute terms of `a · (b × c)`
#[inline]
fn triple_permanent(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let (a, b, c) = (a.abs(), b.abs(), c.abs());
    a.x * (b.y * c.z + b.z * c.y) + a.y * (b.z * c.x + b.x * c.z) + a.z * (b.x * c.y + b.y * c.x)
}

/// Signed volume (times six) of the tetrahedron `abcd`
///
/// Positive when `d` lies on the side of plane `abc` that makes
/// `(b - a, c - a, d - a)` a right-handed frame. The sign is exact.
pub fn orient3d(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> f64 {
    let (ba, ca, da) = (b - a, c - a, d - a);
    let value = ba.dot(ca.cross(da));

    match filter(value, triple_permanent(ba, ca, da)) {
        Filtered::Certain(value) => value,
        Filtered::Uncertain => orient3d_exact(a, b, c, d).estimate(),
    }
}

fn orient3d_exact(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> Expansion {
    let ba = exact_difference(b, a);
    let ca = exact_difference(c, a);
    let da = exact_difference(d, a);
    exact_dot(&ba, &exact_cross(&ca, &da))
}

/// True if the three points lie on one line, coincident points included
pub fn collinear(a: DVec3, b: DVec3, c: DVec3) -> bool {
    let (ba, ca) = (b - a, c - a);
    let cross = ba.cross(ca);
    let (u, v) = (ba.abs(), ca.abs());
    let permanent = DVec3::new(u.y * v.z + u.z * v.y, u.z * v.x + u.x * v.z, u.x * v.y + u.y * v.x);

    // One certainly nonzero component settles it
    let certain = (0..3).any(|i| matches!(filter(cross[i], permanent[i]), Filtered::Certain(_)));
    if certain {
        return false;
    }

    exact_cross(&exact_difference(b, a), &exact_difference(c, a))
        .iter()
        .all(Expansion::is_zero)
}

/// Power test of a weighted point against a positively oriented tetrahedron
///
/// Negative when `p` lies strictly inside the orthosphere of the cell, i.e.
/// the cell is in conflict with `p` and cannot survive its insertion. Zero on
/// the orthosphere, positive outside. The sign is exact.
pub fn power_test(cell: [DVec3; 4], weights: [f64; 4], p: DVec3, wp: f64) -> f64 {
    let r = cell.map(|q| q - p);
    let lift: [f64; 4] = std::array::from_fn(|i| r[i].length_squared() - weights[i] + wp);
    let minor = |i: usize, j: usize, k: usize| r[i].dot(r[j].cross(r[k]));
    let value = -lift[0] * minor(1, 2, 3) + lift[1] * minor(0, 2, 3) - lift[2] * minor(0, 1, 3)
        + lift[3] * minor(0, 1, 2);

    let lift_abs: [f64; 4] =
        std::array::from_fn(|i| r[i].length_squared() + weights[i].abs() + wp.abs());
    let minor_abs = |i: usize, j: usize, k: usize| triple_permanent(r[i], r[j], r[k]);
    let permanent = lift_abs[0] * minor_abs(1, 2, 3)
        + lift_abs[1] * minor_abs(0, 2, 3)
        + lift_abs[2] * minor_abs(0, 1, 3)
        + lift_abs[3] * minor_abs(0, 1, 2);

    match filter(value, permanent) {
        Filtered::Certain(value) => value,
        Filtered::Uncertain => power_test_exact(cell, weights, p, wp).estimate(),
    }
}

fn power_test_exact(cell: [DVec3; 4], weights: [f64; 4], p: DVec3, wp: f64) -> Expansion {
    let r = cell.map(|q| exact_difference(q, p));
    let lift: Vec<Expansion> = r
        .iter()
        .zip(weights)
        .map(|(ri, wi)| exact_dot(ri, ri).add(&Expansion::difference(wp, wi)))
        .collect();
    let minor = |i: usize, j: usize, k: usize| exact_dot(&r[i], &exact_cross(&r[j], &r[k]));

    lift[1]
        .mul(&minor(0, 2, 3))
        .add(&lift[3].mul(&minor(0, 1, 2)))
        .sub(&lift[0].mul(&minor(1, 2, 3)))
        .sub(&lift[2].mul(&minor(0, 1, 3)))
}
