// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Arbitrary precision integer helpers.
//!
//! Normal form computations rely on a few arithmetic primitives
//! with precise sign conventions: Bézout coefficients are normalized
//! so that elimination steps always make progress, and remainders
//! are always non-negative.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul};

use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::Int;

/// Returns (d, u, v) such that `d = gcd(a, b) >= 0` and `u*a + v*b = d`.
///
/// The coefficients are normalized: if both inputs are nonzero,
/// `1 <= u*sign(a) <= |b|/d` and `-|a|/d < v*sign(b) <= 0`.
/// If a is zero, `u = 0, v = sign(b)`, and if b is zero `u = sign(a), v = 0`.
pub fn gcd_with_coeffs(a: &Int, b: &Int) -> (Int, Int, Int) {
    if a.is_zero() {
        return (b.abs(), Int::zero(), b.signum());
    }
    if b.is_zero() {
        return (a.abs(), a.signum(), Int::zero());
    }
    let e = Integer::extended_gcd(a, b);
    let (d, x) = if e.gcd.is_negative() {
        (-e.gcd, -e.x)
    } else {
        (e.gcd, e.x)
    };
    // All solutions are u = x + k*(b/d): pick the one in range.
    let sa = a.signum();
    let bd = b.abs() / &d;
    let w = (&x * &sa - Int::one()).mod_floor(&bd) + Int::one();
    let u = w * &sa;
    let v = (&d - &u * a) / b;
    (d, u, v)
}

pub fn gcd(a: &Int, b: &Int) -> Int {
    Integer::gcd(a, b)
}

/// Least common multiple, always non-negative.
pub fn lcm(a: &Int, b: &Int) -> Int {
    Integer::lcm(a, b)
}

/// Division where the caller knows that b divides a.
pub fn div_exact(a: &Int, b: &Int) -> Int {
    debug_assert!((a % b).is_zero(), "{a} is not divisible by {b}");
    a / b
}

/// Euclidean division: returns (q, r) with n = q*d + r and 0 <= r < |d|.
/// Division by zero returns (0, n).
pub fn division_alg(n: &Int, d: &Int) -> (Int, Int) {
    if d.is_zero() {
        return (Int::zero(), n.clone());
    }
    let r = n.mod_floor(&d.abs());
    let q = (n - &r) / d;
    (q, r)
}

/// Representative of x modulo m in [0, m), or x itself if m is zero.
pub fn reduce_mod(x: &Int, m: &Int) -> Int {
    if m.is_zero() {
        x.clone()
    } else {
        x.mod_floor(&m.abs())
    }
}

/// An integer or positive infinity.
///
/// Infinity compares greater than every integer. It is used for
/// the order of abelian groups with positive rank.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LargeInteger {
    Finite(Int),
    Infinity,
}

impl LargeInteger {
    pub fn is_infinite(&self) -> bool {
        matches!(self, LargeInteger::Infinity)
    }

    pub fn finite(&self) -> Option<&Int> {
        match self {
            LargeInteger::Finite(n) => Some(n),
            LargeInteger::Infinity => None,
        }
    }

    pub fn one() -> Self {
        LargeInteger::Finite(Int::one())
    }
}

impl From<Int> for LargeInteger {
    fn from(n: Int) -> Self {
        LargeInteger::Finite(n)
    }
}

impl From<i64> for LargeInteger {
    fn from(n: i64) -> Self {
        LargeInteger::Finite(Int::from(n))
    }
}

impl PartialOrd for LargeInteger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LargeInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        use LargeInteger::*;
        match (self, other) {
            (Finite(a), Finite(b)) => a.cmp(b),
            (Finite(_), Infinity) => Ordering::Less,
            (Infinity, Finite(_)) => Ordering::Greater,
            (Infinity, Infinity) => Ordering::Equal,
        }
    }
}

impl Add for LargeInteger {
    type Output = LargeInteger;

    fn add(self, other: Self) -> Self {
        match (self, other) {
            (LargeInteger::Finite(a), LargeInteger::Finite(b)) => LargeInteger::Finite(a + b),
            _ => LargeInteger::Infinity,
        }
    }
}

impl Mul for LargeInteger {
    type Output = LargeInteger;

    fn mul(self, other: Self) -> Self {
        match (self, other) {
            (LargeInteger::Finite(a), LargeInteger::Finite(b)) => LargeInteger::Finite(a * b),
            _ => LargeInteger::Infinity,
        }
    }
}

impl fmt::Display for LargeInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LargeInteger::Finite(n) => write!(f, "{n}"),
            LargeInteger::Infinity => write!(f, "inf"),
        }
    }
}

#[cfg(test)]
fn int(n: i64) -> Int {
    Int::from(n)
}

#[test]
fn test_gcd_with_coeffs() {
    let check = |a: i64, b: i64, expect: (i64, i64, i64)| {
        let (d, u, v) = gcd_with_coeffs(&int(a), &int(b));
        assert_eq!((d.clone(), u.clone(), v.clone()), (int(expect.0), int(expect.1), int(expect.2)));
        assert_eq!(u * a + v * b, d);
    };
    check(12, 18, (6, 2, -1));
    check(-4, 6, (2, -2, -1));
    check(7, 7, (7, 1, 0));
    check(5, 0, (5, 1, 0));
    check(-5, 0, (5, -1, 0));
    check(0, -3, (3, 0, -1));
    check(0, 0, (0, 0, 0));
}

#[test]
fn test_gcd_with_coeffs_bounds() {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    for _ in 0..1000 {
        let a: i64 = rng.gen_range(-1000..1000);
        let b: i64 = rng.gen_range(-1000..1000);
        if a == 0 || b == 0 {
            continue;
        }
        let (d, u, v) = gcd_with_coeffs(&int(a), &int(b));
        assert_eq!(d, int(num_integer::gcd(a, b)));
        assert_eq!(&u * a + &v * b, d);
        let us = &u * a.signum();
        assert!(us >= int(1) && us <= int(b.abs()) / &d, "a={a} b={b} u={u}");
        let vs = &v * b.signum();
        assert!(vs <= int(0) && vs > -(int(a.abs()) / &d), "a={a} b={b} v={v}");
    }
}

#[test]
fn test_division_alg() {
    assert_eq!(division_alg(&int(7), &int(3)), (int(2), int(1)));
    assert_eq!(division_alg(&int(-7), &int(3)), (int(-3), int(2)));
    assert_eq!(division_alg(&int(7), &int(-3)), (int(-2), int(1)));
    assert_eq!(division_alg(&int(-7), &int(-3)), (int(3), int(2)));
    assert_eq!(division_alg(&int(-7), &int(0)), (int(0), int(-7)));
    assert_eq!(reduce_mod(&int(-7), &int(4)), int(1));
    assert_eq!(lcm(&int(-4), &int(6)), int(12));
    assert_eq!(div_exact(&int(-12), &int(4)), int(-3));
}

#[test]
fn test_large_integer() {
    let inf = LargeInteger::Infinity;
    let big = LargeInteger::from(int(1) << 200);
    assert!(inf > big);
    assert!(big > LargeInteger::from(-5));
    assert_eq!(big.clone() + inf.clone(), LargeInteger::Infinity);
    assert_eq!(LargeInteger::from(6) * LargeInteger::from(7), LargeInteger::from(42));
    assert_eq!(inf.to_string(), "inf");
    assert_eq!(LargeInteger::one().finite(), Some(&int(1)));
}
