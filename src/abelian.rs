// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Finitely generated abelian groups, described up to isomorphism.
//!
//! A group is ℤʳ ⊕ ℤ_{d₁} ⊕ … ⊕ ℤ_{dₖ} where every dᵢ > 1 divides dᵢ₊₁.

use std::fmt;

use num_traits::{One, Zero};

use crate::arith::LargeInteger;
use crate::matrixint::{smith_normal_form, MatrixInt};
use crate::{Error, Int, MarkedAbelianGroup, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AbelianGroup {
    rank: usize,
    inv_factors: Vec<Int>,
}

impl AbelianGroup {
    /// The trivial group.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn free(rank: usize) -> Self {
        AbelianGroup {
            rank,
            inv_factors: vec![],
        }
    }

    /// Builds ℤ^rank ⊕ ℤ_{d₁} ⊕ … from invariant factors, which
    /// must be greater than 1 and each divide the next.
    pub fn with_invariant_factors(rank: usize, inv_factors: Vec<Int>) -> Result<Self> {
        for (i, d) in inv_factors.iter().enumerate() {
            if d <= &Int::one() {
                return Err(Error::invalid(format!("invariant factor {d} is not > 1")));
            }
            if i + 1 < inv_factors.len() && !(&inv_factors[i + 1] % d).is_zero() {
                return Err(Error::invalid(format!(
                    "invariant factor {d} does not divide {}",
                    inv_factors[i + 1]
                )));
            }
        }
        Ok(AbelianGroup { rank, inv_factors })
    }

    /// The group presented by a relation matrix: columns are
    /// generators and rows are relations.
    pub fn from_presentation(mut m: MatrixInt) -> Self {
        let gens = m.columns();
        smith_normal_form(&mut m);
        let mut g = AbelianGroup::free(gens);
        for i in 0..m.rows().min(gens) {
            let d = &m[(i, i)];
            if d.is_zero() {
                break;
            }
            g.rank -= 1;
            if !d.is_one() {
                g.inv_factors.push(d.clone());
            }
        }
        g
    }

    // Caller guarantees the invariant factor conditions.
    pub(crate) fn from_parts(rank: usize, inv_factors: Vec<Int>) -> Self {
        AbelianGroup { rank, inv_factors }
    }

    /// The homology group ker M / img N of a chain complex.
    pub fn from_chain_complex(m: MatrixInt, n: MatrixInt) -> Result<Self> {
        Ok(MarkedAbelianGroup::new(m, n)?.unmarked())
    }

    /// The homology group ker M / img N with ℤ_p coefficients.
    pub fn from_chain_complex_mod(m: MatrixInt, n: MatrixInt, p: Int) -> Result<Self> {
        Ok(MarkedAbelianGroup::with_coefficients(m, n, p)?.unmarked())
    }

    pub fn add_rank(&mut self, extra: usize) {
        self.rank += extra;
    }

    /// Adds a summand ℤ_d. Values 0 and 1 are invalid.
    pub fn add_torsion(&mut self, d: Int) -> Result<()> {
        if d <= Int::one() {
            return Err(Error::invalid(format!("torsion degree {d} is not > 1")));
        }
        let mut diag = self.inv_factors.clone();
        diag.push(d);
        self.set_torsion(diag);
        Ok(())
    }

    /// Replaces this group with its direct sum with another one.
    pub fn add_group(&mut self, other: &AbelianGroup) {
        self.rank += other.rank;
        if other.inv_factors.is_empty() {
            return;
        }
        let mut diag = self.inv_factors.clone();
        diag.extend(other.inv_factors.iter().cloned());
        self.set_torsion(diag);
    }

    // Recompute invariant factors of a direct sum of cyclic groups.
    fn set_torsion(&mut self, orders: Vec<Int>) {
        let k = orders.len();
        let g = AbelianGroup::from_presentation(MatrixInt::diagonal(k, k, &orders));
        self.inv_factors = g.inv_factors;
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of invariant factors divisible by d: for a prime d
    /// this is the rank of the d-torsion subgroup.
    pub fn torsion_rank(&self, d: &Int) -> usize {
        self.inv_factors
            .iter()
            .filter(|&f| (f % d).is_zero())
            .count()
    }

    pub fn count_invariant_factors(&self) -> usize {
        self.inv_factors.len()
    }

    pub fn invariant_factor(&self, i: usize) -> &Int {
        &self.inv_factors[i]
    }

    pub fn invariant_factors(&self) -> &[Int] {
        &self.inv_factors
    }

    pub fn is_trivial(&self) -> bool {
        self.rank == 0 && self.inv_factors.is_empty()
    }

    pub fn is_z(&self) -> bool {
        self.is_free(1)
    }

    pub fn is_free(&self, rank: usize) -> bool {
        self.rank == rank && self.inv_factors.is_empty()
    }

    pub fn is_z_n(&self, n: &Int) -> bool {
        if n.is_zero() {
            return self.is_z();
        }
        if n.is_one() {
            return self.is_trivial();
        }
        self.rank == 0 && self.inv_factors.len() == 1 && &self.inv_factors[0] == n
    }

    /// The number of elements, infinite for a group of positive rank.
    pub fn order(&self) -> LargeInteger {
        if self.rank > 0 {
            return LargeInteger::Infinity;
        }
        LargeInteger::Finite(self.inv_factors.iter().product())
    }
}

impl fmt::Display for AbelianGroup {
    // Factors are grouped: "2 Z + Z_2 + 3 Z_6".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_trivial() {
            return write!(f, "0");
        }
        let mut parts = vec![];
        match self.rank {
            0 => {}
            1 => parts.push("Z".to_string()),
            r => parts.push(format!("{r} Z")),
        }
        let mut i = 0;
        while i < self.inv_factors.len() {
            let d = &self.inv_factors[i];
            let mut j = i;
            while j < self.inv_factors.len() && &self.inv_factors[j] == d {
                j += 1;
            }
            match j - i {
                1 => parts.push(format!("Z_{d}")),
                mult => parts.push(format!("{mult} Z_{d}")),
            }
            i = j;
        }
        write!(f, "{}", parts.join(" + "))
    }
}

#[cfg(test)]
fn ints(v: &[i64]) -> Vec<Int> {
    v.iter().map(|&x| Int::from(x)).collect()
}

#[test]
fn test_abelian_group() {
    let g = AbelianGroup::with_invariant_factors(2, ints(&[2, 6, 6])).unwrap();
    assert_eq!(g.to_string(), "2 Z + Z_2 + 2 Z_6");
    assert_eq!(g.torsion_rank(&Int::from(2)), 3);
    assert_eq!(g.torsion_rank(&Int::from(3)), 2);
    assert_eq!(g.order(), LargeInteger::Infinity);
    assert!(AbelianGroup::with_invariant_factors(0, ints(&[4, 6])).is_err());
    assert!(AbelianGroup::with_invariant_factors(0, ints(&[1])).is_err());

    let t = AbelianGroup::new();
    assert!(t.is_trivial());
    assert_eq!(t.to_string(), "0");
    assert_eq!(t.order(), LargeInteger::from(1));
    assert!(AbelianGroup::free(1).is_z());
    assert_eq!(AbelianGroup::free(1).to_string(), "Z");
}

#[test]
fn test_abelian_sums() {
    let mut g = AbelianGroup::free(1);
    g.add_torsion(Int::from(4)).unwrap();
    g.add_torsion(Int::from(6)).unwrap();
    assert_eq!(g.invariant_factors(), &ints(&[2, 12])[..]);
    assert!(g.add_torsion(Int::one()).is_err());

    let mut h = AbelianGroup::with_invariant_factors(0, ints(&[3])).unwrap();
    assert!(h.is_z_n(&Int::from(3)));
    h.add_group(&g);
    assert_eq!(h.rank(), 1);
    assert_eq!(h.invariant_factors(), &ints(&[6, 12])[..]);
    assert_eq!(h.to_string(), "Z + Z_6 + Z_12");
    h.add_rank(2);
    assert!(!h.is_free(3));
    let finite = AbelianGroup::with_invariant_factors(0, ints(&[6, 12])).unwrap();
    assert_eq!(finite.order(), LargeInteger::from(72));
}

#[test]
fn test_abelian_presentation() {
    use crate::matrixint::mat;
    // <a, b, c | 2a + 4b + 6c, 3a + 5b + 7c> = Z_2 + Z
    let g = AbelianGroup::from_presentation(mat(&[&[2, 4, 6], &[3, 5, 7]]));
    assert_eq!(g.rank(), 1);
    assert_eq!(g.invariant_factors(), &ints(&[2])[..]);
    let g = AbelianGroup::from_presentation(MatrixInt::new(0, 2));
    assert!(g.is_free(2));
}
