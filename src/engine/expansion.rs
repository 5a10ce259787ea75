//! Exact floating-point expansion arithmetic
//!
//! An expansion is a sum of f64 components that are nonoverlapping and sorted
//! by increasing magnitude. It represents a real number exactly, and sums and
//! products of expansions stay exact as long as no component overflows or
//! underflows. The largest component carries the sign of the whole value.

use std::cmp::Ordering;

/// Exact sum of `a` and `b` as `(rounded, error)`
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let x = a + b;
    let b_virtual = x - a;
    let a_virtual = x - b_virtual;
    (x, (a - a_virtual) + (b - b_virtual))
}

/// Exact product of `a` and `b` as `(rounded, error)`
#[inline]
fn two_product(a: f64, b: f64) -> (f64, f64) {
    let x = a * b;
    (x, a.mul_add(b, -x))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Expansion(Vec<f64>);

impl Expansion {
    fn from_pair(high: f64, low: f64) -> Self {
        let mut parts = Vec::with_capacity(2);
        if low != 0.0 {
            parts.push(low);
        }
        if high != 0.0 {
            parts.push(high);
        }
        Self(parts)
    }

    /// `a - b`, exactly
    pub fn difference(a: f64, b: f64) -> Self {
        let (high, low) = two_sum(a, -b);
        Self::from_pair(high, low)
    }

    /// Add one f64 component
    fn grow(&self, b: f64) -> Self {
        let mut parts = Vec::with_capacity(self.0.len() + 1);
        let mut q = b;
        for &e in &self.0 {
            let (sum, err) = two_sum(q, e);
            if err != 0.0 {
                parts.push(err);
            }
            q = sum;
        }
        if q != 0.0 {
            parts.push(q);
        }
        Self(parts)
    }

    pub fn add(&self, other: &Self) -> Self {
        let (mut acc, rest) = if self.0.len() >= other.0.len() {
            (self.clone(), other)
        } else {
            (other.clone(), self)
        };
        for &b in &rest.0 {
            acc = acc.grow(b);
        }
        acc
    }

    pub fn neg(&self) -> Self {
        Self(self.0.iter().map(|&e| -e).collect())
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Multiply by one f64 value
    fn scale(&self, b: f64) -> Self {
        let Some((&first, rest)) = self.0.split_first() else {
            return Self::default();
        };
        if b == 0.0 {
            return Self::default();
        }

        let mut parts = Vec::with_capacity(self.0.len() * 2);
        let (mut q, err) = two_product(first, b);
        if err != 0.0 {
            parts.push(err);
        }
        for &e in rest {
            let (high, low) = two_product(e, b);
            let (sum, err) = two_sum(q, low);
            if err != 0.0 {
                parts.push(err);
            }
            let (next, err) = two_sum(high, sum);
            if err != 0.0 {
                parts.push(err);
            }
            q = next;
        }
        if q != 0.0 {
            parts.push(q);
        }
        Self(parts)
    }

    pub fn mul(&self, other: &Self) -> Self {
        let (long, short) = if self.0.len() >= other.0.len() {
            (self, other)
        } else {
            (other, self)
        };
        short
            .0
            .iter()
            .fold(Self::default(), |acc, &b| acc.add(&long.scale(b)))
    }

    /// Exact sign
    pub fn sign(&self) -> Ordering {
        match self.0.last() {
            Some(&top) if top > 0.0 => Ordering::Greater,
            Some(_) => Ordering::Less,
            None => Ordering::Equal,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Rounded value; has the exact sign
    pub fn estimate(&self) -> f64 {
        self.0.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difference_keeps_lost_bits() {
        let e = Expansion::difference(1.0e16, -1.0);
        assert_eq!(e.0, vec![1.0, 1.0e16]);
        assert_eq!(e.sign(), Ordering::Greater);
    }

    #[test]
    fn test_cancellation_is_exact() {
        // (1e16 + 1) - 1e16 - 1 is zero only in exact arithmetic
        let a = Expansion::difference(1.0e16, -1.0);
        let b = Expansion::difference(1.0e16, 0.0);
        let one = Expansion::difference(1.0, 0.0);

        assert_eq!(a.sub(&b).sign(), Ordering::Greater);
        assert!(a.sub(&b).sub(&one).is_zero());
    }

    #[test]
    fn test_product_sign_beyond_f64() {
        // (2^30 + 1)^2 - (2^60 + 2^31) = 1, lost entirely in f64
        let x = Expansion::difference(1073741825.0, 0.0);
        let square = x.mul(&x);
        let rest = Expansion::difference(1152921504606846976.0, -2147483648.0);

        let diff = square.sub(&rest);
        assert_eq!(diff.sign(), Ordering::Greater);
        assert_eq!(diff.estimate(), 1.0);
    }

    #[test]
    fn test_negative_and_zero() {
        let a = Expansion::difference(0.1, 0.3);
        assert_eq!(a.sign(), Ordering::Less);
        assert_eq!(a.neg().sign(), Ordering::Greater);
        assert_eq!(Expansion::difference(0.5, 0.5).sign(), Ordering::Equal);
        assert!(a.mul(&Expansion::default()).is_zero());
    }
}
