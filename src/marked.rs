// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Homology groups of chain complexes, with chain-level coordinates.
//!
//! Given matrices M (c×b) and N (b×a) with M·N = 0, the group
//! H = ker M / img N is computed together with the change of basis
//! matrices needed to move between chain coordinates (vectors of
//! length b) and Smith normal form coordinates (torsion coordinates
//! first, one per invariant factor, then free coordinates).
//!
//! With ℤ_p coefficients, H = ker(M mod p) / img(N mod p). Writing
//! SNF(M) = diag(s₀, …), coordinates where gcd(sᵢ, p) > 1 (the TOR
//! coordinates) contribute ℤ_{gcd(sᵢ, p)} summands, and the cokernel
//! of [N | p·I] restricted to the kernel of M contributes the rest.

use std::fmt;

use num_traits::{One, Signed, Zero};

use crate::abelian::AbelianGroup;
use crate::arith::{self, div_exact, reduce_mod};
use crate::hom::HomMarkedAbelianGroup;
use crate::matrixint::{metrical_smith_normal_form_with_bases, MatrixInt, SnfBasis};
use crate::{Error, Int, Result};

#[derive(Clone, Debug)]
pub struct MarkedAbelianGroup {
    pub(crate) om: MatrixInt,
    pub(crate) on: MatrixInt,
    // SNF(M) = col * M * row
    pub(crate) m_basis: SnfBasis,
    pub(crate) rank_m: usize,
    // Bases of the final diagonal presentation.
    pub(crate) pres_basis: SnfBasis,
    pub(crate) inv_fac: Vec<Int>,
    pub(crate) snf_free_rank: usize,
    pub(crate) snf_free_index: usize,
    // Number of unit entries on the diagonal of the presentation.
    pub(crate) if_loc: usize,
    pub(crate) coeff: Int,
    // TOR coordinates are tor_loc..rank_m.
    pub(crate) tor_loc: usize,
    pub(crate) tor_vec: Vec<Int>,
    // Bases of [N | p·I] restricted to ker M (identity if coeff is 0).
    pub(crate) tensor_basis: SnfBasis,
    pub(crate) tensor_if_loc: usize,
    pub(crate) tensor_inv_fac: Vec<Int>,
}

// Splits a Smith normal form diagonal into unit entries, invariant
// factors (> 1) and zero entries.
fn split_diagonal(s: &MatrixInt) -> (usize, Vec<Int>, usize) {
    let k = s.rows().min(s.columns());
    let mut ones = 0;
    let mut inv = vec![];
    let mut zeros = 0;
    for i in 0..k {
        let d = &s[(i, i)];
        if d.is_one() {
            ones += 1;
        } else if d.is_zero() {
            zeros += 1;
        } else {
            inv.push(d.clone());
        }
    }
    // Rows beyond the diagonal are zero relations.
    zeros += s.rows() - k;
    (ones, inv, zeros)
}

fn dot(row: &[Int], v: &[Int]) -> Int {
    let mut acc = Int::zero();
    for (x, y) in row.iter().zip(v) {
        if !x.is_zero() && !y.is_zero() {
            acc += x * y;
        }
    }
    acc
}

impl MarkedAbelianGroup {
    /// The homology group ker M / img N with integer coefficients.
    ///
    /// M·N is expected to be zero; the number of columns of M
    /// must equal the number of rows of N.
    pub fn new(m: MatrixInt, n: MatrixInt) -> Result<Self> {
        Self::with_coefficients(m, n, Int::zero())
    }

    /// The homology group with ℤ_p coefficients (p = 0 means ℤ).
    pub fn with_coefficients(m: MatrixInt, n: MatrixInt, p: Int) -> Result<Self> {
        if m.columns() != n.rows() {
            return Err(Error::invalid(format!(
                "M has {} columns but N has {} rows",
                m.columns(),
                n.rows()
            )));
        }
        if p.is_negative() {
            return Err(Error::invalid(format!("negative coefficient modulus {p}")));
        }
        Ok(Self::build(m, n, p))
    }

    /// The group (ℤ_p)^rank, or ℤ^rank if p is zero, presented by
    /// the chain complex ℤ^rank --p·I--> ℤ^rank --0--> ℤ^rank.
    pub fn from_rank(rank: usize, p: Int) -> Result<Self> {
        if p.is_negative() {
            return Err(Error::invalid(format!("negative coefficient modulus {p}")));
        }
        let n = MatrixInt::diagonal(rank, rank, &vec![p; rank]);
        Ok(Self::build(MatrixInt::new(rank, rank), n, Int::zero()))
    }

    pub(crate) fn build(m: MatrixInt, n: MatrixInt, coeff: Int) -> Self {
        let b = m.columns();
        let a = n.columns();
        let mut snf_m = m.clone();
        let m_basis = metrical_smith_normal_form_with_bases(&mut snf_m);
        let rank_m = (0..b.min(snf_m.rows()))
            .take_while(|&i| !snf_m[(i, i)].is_zero())
            .count();
        let mri_n = &m_basis.row_inv * &n;

        if coeff.is_zero() {
            let mut pres = mri_n.submatrix(rank_m, b, 0, a);
            let pres_basis = metrical_smith_normal_form_with_bases(&mut pres);
            let (if_loc, inv_fac, snf_free_rank) = split_diagonal(&pres);
            let snf_free_index = if_loc + inv_fac.len();
            return MarkedAbelianGroup {
                om: m,
                on: n,
                m_basis,
                rank_m,
                pres_basis,
                inv_fac,
                snf_free_rank,
                snf_free_index,
                if_loc,
                coeff,
                tor_loc: rank_m,
                tor_vec: vec![],
                tensor_basis: SnfBasis::identity(0, 0),
                tensor_if_loc: 0,
                tensor_inv_fac: vec![],
            };
        }

        let tor_vec: Vec<Int> = (0..rank_m)
            .map(|i| snf_m[(i, i)].clone())
            .filter(|d| !arith::gcd(d, &coeff).is_one())
            .collect();
        let tor_loc = rank_m - tor_vec.len();

        // Presentation of (ker M) ⊗ ℤ_p modulo the image of N.
        let rows = b - rank_m;
        let mut tensor = MatrixInt::new(rows, a + rows);
        tensor.set_block(0, 0, &mri_n.submatrix(rank_m, b, 0, a));
        for i in 0..rows {
            tensor[(i, a + i)] = coeff.clone();
        }
        let tensor_basis = metrical_smith_normal_form_with_bases(&mut tensor);
        let (tensor_if_loc, tensor_inv_fac, tensor_zeros) = split_diagonal(&tensor);
        if cfg!(test) {
            assert_eq!(tensor_zeros, 0, "p·I block has full rank");
        } else if crate::DEBUG && tensor_zeros > 0 {
            eprintln!("unexpected zero on the diagonal of the tensor presentation");
        }

        // Diagonal presentation: TOR summands then tensor summands.
        let t = tor_vec.len();
        let k = t + rows - tensor_if_loc;
        let mut diag = Vec::with_capacity(k);
        for d in &tor_vec {
            diag.push(arith::gcd(d, &coeff));
        }
        for i in tensor_if_loc..rows {
            diag.push(tensor[(i, i)].clone());
        }
        let mut pres = MatrixInt::diagonal(k, k, &diag);
        let pres_basis = metrical_smith_normal_form_with_bases(&mut pres);
        let (if_loc, inv_fac, snf_free_rank) = split_diagonal(&pres);
        let snf_free_index = if_loc + inv_fac.len();
        MarkedAbelianGroup {
            om: m,
            on: n,
            m_basis,
            rank_m,
            pres_basis,
            inv_fac,
            snf_free_rank,
            snf_free_index,
            if_loc,
            coeff,
            tor_loc,
            tor_vec,
            tensor_basis,
            tensor_if_loc,
            tensor_inv_fac,
        }
    }

    pub fn m(&self) -> &MatrixInt {
        &self.om
    }

    pub fn n(&self) -> &MatrixInt {
        &self.on
    }

    pub fn coefficients(&self) -> &Int {
        &self.coeff
    }

    /// Free rank of the group.
    pub fn rank(&self) -> usize {
        self.snf_free_rank
    }

    /// Number of generators in Smith normal form coordinates.
    pub fn snf_rank(&self) -> usize {
        self.snf_free_rank + self.inv_fac.len()
    }

    /// Number of chain coordinates (columns of M).
    pub fn cc_rank(&self) -> usize {
        self.om.columns()
    }

    /// Rank of the group of cycles.
    pub fn cycle_rank(&self) -> usize {
        self.om.columns() - self.tor_loc
    }

    pub fn count_invariant_factors(&self) -> usize {
        self.inv_fac.len()
    }

    pub fn invariant_factor(&self, i: usize) -> &Int {
        &self.inv_fac[i]
    }

    pub fn invariant_factors(&self) -> &[Int] {
        &self.inv_fac
    }

    /// Number of invariant factors divisible by d.
    pub fn torsion_rank(&self, d: &Int) -> usize {
        self.inv_fac.iter().filter(|&f| (f % d).is_zero()).count()
    }

    pub fn is_trivial(&self) -> bool {
        self.snf_rank() == 0
    }

    pub fn is_z(&self) -> bool {
        self.snf_free_rank == 1 && self.inv_fac.is_empty()
    }

    /// Whether both groups are defined by the same chain complex.
    pub fn equal_to(&self, other: &Self) -> bool {
        self.om == other.om && self.on == other.on && self.coeff == other.coeff
    }

    pub fn is_isomorphic_to(&self, other: &Self) -> bool {
        self.inv_fac == other.inv_fac && self.snf_free_rank == other.snf_free_rank
    }

    /// Whether M·N = 0.
    pub fn is_chain_complex(&self) -> bool {
        (&self.om * &self.on).is_zero()
    }

    pub fn unmarked(&self) -> AbelianGroup {
        AbelianGroup::from_parts(self.snf_free_rank, self.inv_fac.clone())
    }

    /// The bases such that `col * M * row` is the Smith normal form of M.
    pub fn m_bases(&self) -> &SnfBasis {
        &self.m_basis
    }

    /// A cycle representing the i-th free generator.
    pub fn free_rep(&self, i: usize) -> Result<Vec<Int>> {
        if i >= self.snf_free_rank {
            return Err(Error::invalid(format!(
                "free generator {i} out of range (rank {})",
                self.snf_free_rank
            )));
        }
        Ok(self.cc_rep_generator_unchecked(self.inv_fac.len() + i))
    }

    /// A cycle representing the i-th torsion generator, of order
    /// invariant_factor(i).
    pub fn torsion_rep(&self, i: usize) -> Result<Vec<Int>> {
        if i >= self.inv_fac.len() {
            return Err(Error::invalid(format!(
                "torsion generator {i} out of range ({} invariant factors)",
                self.inv_fac.len()
            )));
        }
        Ok(self.cc_rep_generator_unchecked(i))
    }

    /// A cycle representing the j-th Smith normal form generator.
    pub fn cc_rep_generator(&self, j: usize) -> Result<Vec<Int>> {
        if j >= self.snf_rank() {
            return Err(Error::invalid(format!(
                "generator {j} out of range ({} generators)",
                self.snf_rank()
            )));
        }
        Ok(self.cc_rep_generator_unchecked(j))
    }

    pub(crate) fn cc_rep_generator_unchecked(&self, j: usize) -> Vec<Int> {
        let mut e = vec![Int::zero(); self.snf_rank()];
        e[j] = Int::one();
        self.cc_rep_unchecked(&e)
    }

    /// A cycle representing the element with the given Smith normal
    /// form coordinates.
    pub fn cc_rep(&self, snf: &[Int]) -> Result<Vec<Int>> {
        if snf.len() != self.snf_rank() {
            return Err(Error::invalid(format!(
                "expected {} Smith normal form coordinates, got {}",
                self.snf_rank(),
                snf.len()
            )));
        }
        Ok(self.cc_rep_unchecked(snf))
    }

    fn cc_rep_unchecked(&self, snf: &[Int]) -> Vec<Int> {
        let ci = &self.pres_basis.col_inv;
        // Coordinates in the diagonal presentation.
        let mut y = vec![Int::zero(); ci.rows()];
        for (j, x) in snf.iter().enumerate() {
            if x.is_zero() {
                continue;
            }
            for (i, yi) in y.iter_mut().enumerate() {
                *yi += &ci[(i, j + self.if_loc)] * x;
            }
        }
        let mut temp = vec![Int::zero(); self.om.columns()];
        if self.coeff.is_zero() {
            for (i, v) in y.into_iter().enumerate() {
                temp[self.rank_m + i] = v;
            }
        } else {
            let t = self.tor_vec.len();
            for i in 0..t {
                temp[self.tor_loc + i] = &y[i] * self.tor_scale(i);
            }
            let ot_ci = &self.tensor_basis.col_inv;
            for i in 0..ot_ci.rows() {
                let mut acc = Int::zero();
                for j in self.tensor_if_loc..ot_ci.columns() {
                    acc += &ot_ci[(i, j)] * &y[t + j - self.tensor_if_loc];
                }
                temp[self.rank_m + i] = acc;
            }
        }
        self.m_basis.row.mul_vec(&temp)
    }

    // p / gcd(p, TORVec[i]): the TOR cycles are multiples of this.
    fn tor_scale(&self, i: usize) -> Int {
        div_exact(&self.coeff, &arith::gcd(&self.coeff, &self.tor_vec[i]))
    }

    /// Smith normal form coordinates of a cycle. Torsion coordinates
    /// are reduced into [0, invariant factor).
    pub fn snf_rep(&self, v: &[Int]) -> Result<Vec<Int>> {
        if v.len() != self.om.columns() {
            return Err(Error::invalid(format!(
                "expected a chain of length {}, got {}",
                self.om.columns(),
                v.len()
            )));
        }
        let not_cycle = || Error::invalid("vector is not a cycle");
        let mut temp = self.m_basis.row_inv.mul_vec(v);
        let pc = &self.pres_basis.col;
        let diag_v: Vec<Int> = if self.coeff.is_zero() {
            if temp[..self.rank_m].iter().any(|x| !x.is_zero()) {
                return Err(not_cycle());
            }
            temp.split_off(self.rank_m)
        } else {
            let p = &self.coeff;
            for i in 0..self.rank_m {
                if i < self.tor_loc {
                    if !(&temp[i] % p).is_zero() {
                        return Err(not_cycle());
                    }
                } else {
                    let d = &self.tor_vec[i - self.tor_loc];
                    if !((&temp[i] * d) % p).is_zero() {
                        return Err(not_cycle());
                    }
                    temp[i] = div_exact(&temp[i], &self.tor_scale(i - self.tor_loc));
                }
            }
            let t = self.tor_vec.len();
            let ot_c = &self.tensor_basis.col;
            let tail = &temp[self.rank_m..];
            (0..pc.columns())
                .map(|i| {
                    if i < t {
                        temp[i + self.tor_loc].clone()
                    } else {
                        dot(ot_c.row(i - t + self.tensor_if_loc), tail)
                    }
                })
                .collect()
        };
        let mut res: Vec<Int> = (0..self.snf_rank())
            .map(|i| dot(pc.row(i + self.if_loc), &diag_v))
            .collect();
        for (x, d) in res.iter_mut().zip(&self.inv_fac) {
            *x = reduce_mod(x, d);
        }
        Ok(res)
    }

    /// Whether v is a cycle: M·v = 0 (or ≡ 0 mod p).
    /// Vectors of the wrong length are not cycles.
    pub fn is_cycle(&self, v: &[Int]) -> bool {
        if v.len() != self.om.columns() {
            return false;
        }
        self.om
            .mul_vec(v)
            .iter()
            .all(|x| reduce_mod(x, &self.coeff).is_zero())
    }

    /// Whether v is a boundary (v must be a cycle).
    pub fn is_boundary(&self, v: &[Int]) -> bool {
        match self.snf_rep(v) {
            Ok(s) => s.iter().all(|x| x.is_zero()),
            Err(_) => false,
        }
    }

    /// The image M·v of a chain, reduced mod p for ℤ_p coefficients.
    pub fn boundary_of(&self, v: &[Int]) -> Result<Vec<Int>> {
        if v.len() != self.om.columns() {
            return Err(Error::invalid(format!(
                "expected a chain of length {}, got {}",
                self.om.columns(),
                v.len()
            )));
        }
        let mut w = self.om.mul_vec(v);
        if !self.coeff.is_zero() {
            for x in w.iter_mut() {
                *x = reduce_mod(x, &self.coeff);
            }
        }
        Ok(w)
    }

    /// Returns w such that N·w = v (N·w ≡ v mod p for ℤ_p coefficients),
    /// failing if v is not a boundary.
    pub fn as_boundary(&self, v: &[Int]) -> Result<Vec<Int>> {
        if !self.is_cycle(v) {
            return Err(Error::invalid("vector is not a cycle"));
        }
        let not_boundary = || Error::invalid("vector is not a boundary");
        let temp = self.m_basis.row_inv.mul_vec(v);
        for i in 0..self.tor_vec.len() {
            if !(&temp[self.tor_loc + i] % &self.coeff).is_zero() {
                return Err(not_boundary());
            }
        }
        let tail = &temp[self.rank_m..];
        let a = self.on.columns();
        if self.coeff.is_zero() {
            let pc = &self.pres_basis.col;
            let mut snf_v: Vec<Int> = (0..pc.rows()).map(|i| dot(pc.row(i), tail)).collect();
            for (i, d) in self.inv_fac.iter().enumerate() {
                let x = &mut snf_v[i + self.if_loc];
                if !(&*x % d).is_zero() {
                    return Err(not_boundary());
                }
                *x = div_exact(x, d);
            }
            if snf_v[self.snf_free_index..].iter().any(|x| !x.is_zero()) {
                return Err(not_boundary());
            }
            let pr = &self.pres_basis.row;
            Ok((0..a)
                .map(|i| dot(&pr.row(i)[..self.snf_free_index], &snf_v))
                .collect())
        } else {
            let ot_c = &self.tensor_basis.col;
            let mut tv: Vec<Int> = (0..ot_c.rows()).map(|i| dot(ot_c.row(i), tail)).collect();
            for (i, d) in self.tensor_inv_fac.iter().enumerate() {
                let x = &mut tv[i + self.tensor_if_loc];
                if !(&*x % d).is_zero() {
                    return Err(not_boundary());
                }
                *x = div_exact(x, d);
            }
            let diag_end = self.tensor_if_loc + self.tensor_inv_fac.len();
            if tv[diag_end..].iter().any(|x| !x.is_zero()) {
                return Err(not_boundary());
            }
            let ot_r = &self.tensor_basis.row;
            Ok((0..a).map(|i| dot(ot_r.row(i), &tv)).collect())
        }
    }

    /// The j-th generator of the group of cycles.
    pub fn cycle_gen(&self, j: usize) -> Result<Vec<Int>> {
        if j >= self.cycle_rank() {
            return Err(Error::invalid(format!(
                "cycle generator {j} out of range (rank {})",
                self.cycle_rank()
            )));
        }
        let mut v = self.m_basis.row.column(j + self.tor_loc);
        if j < self.tor_vec.len() {
            let scale = self.tor_scale(j);
            for x in v.iter_mut() {
                *x *= &scale;
            }
        }
        Ok(v)
    }

    /// Projection of a chain onto the kernel of M, along the
    /// complement spanned by the first columns of the row basis.
    pub fn cycle_projection(&self, v: &[Int]) -> Result<Vec<Int>> {
        if v.len() != self.om.columns() {
            return Err(Error::invalid(format!(
                "expected a chain of length {}, got {}",
                self.om.columns(),
                v.len()
            )));
        }
        let mut temp = self.m_basis.row_inv.mul_vec(v);
        Ok(self.project_coords(&mut temp))
    }

    /// Projection of the i-th chain generator onto the kernel of M.
    pub fn cycle_projection_of_generator(&self, i: usize) -> Result<Vec<Int>> {
        if i >= self.om.columns() {
            return Err(Error::invalid(format!("chain index {i} out of range")));
        }
        let mut temp = self.m_basis.row_inv.column(i);
        Ok(self.project_coords(&mut temp))
    }

    fn project_coords(&self, temp: &mut [Int]) -> Vec<Int> {
        for x in temp[..self.rank_m].iter_mut() {
            *x = Int::zero();
        }
        self.m_basis.row.mul_vec(temp)
    }

    /// The torsion subgroup, presented by ℤᵏ --diag(invFac)--> ℤᵏ --0--> ℤ.
    pub fn torsion_subgroup(&self) -> MarkedAbelianGroup {
        let k = self.inv_fac.len();
        Self::build(
            MatrixInt::new(1, k),
            MatrixInt::diagonal(k, k, &self.inv_fac),
            Int::zero(),
        )
    }

    /// The inclusion of the torsion subgroup: column j is torsion_rep(j).
    pub fn torsion_inclusion(&self) -> HomMarkedAbelianGroup {
        let k = self.inv_fac.len();
        let mut mat = MatrixInt::new(self.om.columns(), k);
        for j in 0..k {
            for (i, x) in self.cc_rep_generator_unchecked(j).into_iter().enumerate() {
                mat[(i, j)] = x;
            }
        }
        HomMarkedAbelianGroup::from_parts(self.torsion_subgroup(), self.clone(), mat)
    }
}

impl fmt::Display for MarkedAbelianGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unmarked())
    }
}

#[cfg(test)]
use crate::matrixint::mat;

#[cfg(test)]
fn ints(v: &[i64]) -> Vec<Int> {
    v.iter().map(|&x| Int::from(x)).collect()
}

#[cfg(test)]
fn unit(n: usize, j: usize) -> Vec<Int> {
    let mut e = vec![Int::zero(); n];
    e[j] = Int::one();
    e
}

// A random chain complex Z^a --N--> Z^b --M--> Z^c with M·N = 0.
#[cfg(test)]
pub(crate) fn random_chain_complex(rng: &mut impl rand::Rng) -> (MatrixInt, MatrixInt) {
    use crate::matrixint::{random_matrix, row_basis_and_orth_comp};
    let a = rng.gen_range(1..5);
    let b = rng.gen_range(1..6);
    let c = rng.gen_range(1..4);
    let n = random_matrix(rng, b, a, 6);
    let mut nt = n.transpose();
    let (rank, comp) = row_basis_and_orth_comp(&mut nt);
    let kernel = comp.submatrix(rank, b, 0, b);
    let coeffs = random_matrix(rng, c, b - rank, 3);
    let m = &coeffs * &kernel;
    (m, n)
}

#[test]
fn test_marked_basic() {
    // Z^3 modulo 2Z + 3Z + 0 is Z_6 + Z.
    let g = MarkedAbelianGroup::new(MatrixInt::new(1, 3), mat(&[&[2, 0], &[0, 3], &[0, 0]])).unwrap();
    assert_eq!(g.invariant_factors(), &ints(&[6])[..]);
    assert_eq!(g.rank(), 1);
    assert_eq!(g.snf_rank(), 2);
    assert_eq!(g.to_string(), "Z + Z_6");
    for j in 0..2 {
        let v = g.cc_rep_generator(j).unwrap();
        assert!(g.is_cycle(&v));
        assert_eq!(g.snf_rep(&v).unwrap(), unit(2, j));
    }
    let t = g.torsion_rep(0).unwrap();
    let six: Vec<Int> = t.iter().map(|x| x * Int::from(6)).collect();
    assert!(g.is_boundary(&six));
    assert!(!g.is_boundary(&t));
    assert!(g.torsion_rep(1).is_err());
    assert!(g.free_rep(1).is_err());
    assert!(g.is_chain_complex());
    assert!(MarkedAbelianGroup::new(MatrixInt::new(1, 2), MatrixInt::new(3, 1)).is_err());
}

#[test]
fn test_marked_trivial_presentation() {
    let g = MarkedAbelianGroup::from_rank(3, Int::zero()).unwrap();
    assert_eq!(g.rank(), 3);
    for i in 0..3 {
        assert_eq!(g.free_rep(i).unwrap(), unit(3, i));
    }
    let g = MarkedAbelianGroup::from_rank(2, Int::from(5)).unwrap();
    assert_eq!(g.invariant_factors(), &ints(&[5, 5])[..]);
    assert_eq!(g.rank(), 0);
    assert_eq!(g.coefficients(), &Int::zero());
    let g = MarkedAbelianGroup::from_rank(2, Int::one()).unwrap();
    assert!(g.is_trivial());
    assert!(MarkedAbelianGroup::from_rank(2, Int::from(-1)).is_err());
}

#[test]
fn test_marked_kernel_only() {
    // ker [2 0] = {(0, y)} is infinite cyclic.
    let g = MarkedAbelianGroup::new(mat(&[&[2, 0]]), MatrixInt::new(2, 1)).unwrap();
    assert!(g.invariant_factors().is_empty());
    assert!(g.is_z());
    let v = g.free_rep(0).unwrap();
    assert!(g.is_cycle(&v));
    assert_eq!(g.snf_rep(&v).unwrap(), ints(&[1]));
    assert!(g.snf_rep(&ints(&[1, 0])).is_err());
    assert_eq!(g.cycle_rank(), 1);
    assert_eq!(g.cycle_projection(&ints(&[3, 4])).unwrap(), ints(&[0, 4]));
}

#[test]
fn test_marked_boundaries() {
    // ker 0 / img 2 = Z_2
    let g = MarkedAbelianGroup::new(mat(&[&[0]]), mat(&[&[2]])).unwrap();
    assert_eq!(g.invariant_factors(), &ints(&[2])[..]);
    assert!(g.is_cycle(&ints(&[3])));
    assert!(!g.is_boundary(&ints(&[3])));
    assert!(g.is_boundary(&ints(&[4])));
    assert_eq!(g.as_boundary(&ints(&[4])).unwrap(), ints(&[2]));
    assert!(g.as_boundary(&ints(&[3])).is_err());
    assert_eq!(g.snf_rep(&ints(&[3])).unwrap(), ints(&[1]));
    assert_eq!(g.boundary_of(&ints(&[5])).unwrap(), ints(&[0]));
    assert!(!g.is_cycle(&ints(&[1, 2])));
    assert!(g.snf_rep(&ints(&[1, 2])).is_err());
}

#[test]
fn test_marked_mod_p() {
    // H_2 of RP^2 with Z_2 coefficients.
    let g = MarkedAbelianGroup::with_coefficients(mat(&[&[2]]), MatrixInt::new(1, 1), Int::from(2)).unwrap();
    assert_eq!(g.invariant_factors(), &ints(&[2])[..]);
    let v = g.torsion_rep(0).unwrap();
    assert!(g.is_cycle(&v));
    assert!(!g.is_boundary(&v));
    assert_eq!(g.snf_rep(&v).unwrap(), ints(&[1]));
    assert_eq!(g.cycle_rank(), 1);
    assert!(g.is_cycle(&g.cycle_gen(0).unwrap()));
    assert!(g.cycle_gen(1).is_err());
    assert_eq!(g.boundary_of(&ints(&[3])).unwrap(), ints(&[0]));

    // Z with Z_4 coefficients, N = 2: Z_2.
    let g = MarkedAbelianGroup::with_coefficients(mat(&[&[0]]), mat(&[&[2]]), Int::from(4)).unwrap();
    assert_eq!(g.invariant_factors(), &ints(&[2])[..]);
    assert!(g.is_boundary(&ints(&[6])));
    let w = g.as_boundary(&ints(&[6])).unwrap();
    assert!(reduce_mod(&(&w[0] * Int::from(2) - Int::from(6)), &Int::from(4)).is_zero());
}

#[test]
fn test_marked_random() {
    use rand::{Rng, SeedableRng};
    use crate::matrixint::row_basis;
    let mut rng = rand::rngs::StdRng::seed_from_u64(2024);
    for _ in 0..60 {
        let (m, n) = random_chain_complex(&mut rng);
        for p in [0, 2, 3, 4, 6] {
            let p = Int::from(p);
            let g = MarkedAbelianGroup::with_coefficients(m.clone(), n.clone(), p.clone()).unwrap();
            assert!(g.is_chain_complex());
            assert_eq!(g.snf_free_index, g.if_loc + g.inv_fac.len());
            let k = g.snf_rank();
            for j in 0..k {
                let v = g.cc_rep_generator(j).unwrap();
                assert!(g.is_cycle(&v), "p={p} M=\n{m}N=\n{n}");
                assert_eq!(g.snf_rep(&v).unwrap(), unit(k, j), "p={p} M=\n{m}N=\n{n}");
                if j < g.count_invariant_factors() {
                    assert!(!g.is_boundary(&v));
                    let d = g.invariant_factor(j);
                    let dv: Vec<Int> = v.iter().map(|x| x * d).collect();
                    assert!(g.is_boundary(&dv));
                    let w = g.as_boundary(&dv).unwrap();
                    let nw = g.n().mul_vec(&w);
                    for (x, y) in nw.iter().zip(&dv) {
                        assert!(reduce_mod(&(x - y), &p).is_zero());
                    }
                }
            }
            for j in 0..g.cycle_rank() {
                assert!(g.is_cycle(&g.cycle_gen(j).unwrap()));
            }
            // Boundaries map to zero.
            let x: Vec<Int> = (0..n.columns()).map(|_| Int::from(rng.gen_range(-3..4))).collect();
            let bx = n.mul_vec(&x);
            assert!(g.is_boundary(&bx));
            if p.is_zero() {
                assert_eq!(n.mul_vec(&g.as_boundary(&bx).unwrap()), bx);
                // rank H = dim ker M - rank N
                let mut mm = m.clone();
                let mut nn = n.transpose();
                let rm = row_basis(&mut mm);
                let rn = row_basis(&mut nn);
                assert_eq!(g.rank(), m.columns() - rm - rn);
            }
        }
    }
}

#[test]
fn test_torsion_subgroup() {
    let g = MarkedAbelianGroup::new(MatrixInt::new(1, 3), mat(&[&[2, 0], &[0, 4], &[0, 0]])).unwrap();
    let t = g.torsion_subgroup();
    assert_eq!(t.invariant_factors(), g.invariant_factors());
    assert_eq!(t.rank(), 0);
    let inc = g.torsion_inclusion();
    assert!(inc.is_monic());
    assert!(inc.is_cycle_map());
    assert_eq!(inc.cokernel().rank(), 1);
}
