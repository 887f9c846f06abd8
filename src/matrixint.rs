// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Linear algebra routines for matrices over the ring of integers.
//!
//! This module provides Smith normal forms (with optional tracking
//! of change of basis matrices), rational row bases, column echelon
//! forms and preimages of lattices. Entries are arbitrary precision
//! integers: reductions can produce large intermediate values.
//!
//! Change of basis conventions: if M is the input and S its normal form,
//! the row space basis R and column space basis C satisfy `C * M * R = S`
//! and their inverses satisfy `Ci * S * Ri = M`.

use num_traits::{One, Signed, Zero};

use crate::arith::{self, div_exact, division_alg, gcd_with_coeffs};
use crate::matrix::Matrix;
use crate::Int;

pub type MatrixInt = Matrix<Int>;

/// Change of basis matrices produced by a normal form computation.
#[derive(Clone, Debug)]
pub struct SnfBasis {
    pub row: MatrixInt,
    pub row_inv: MatrixInt,
    pub col: MatrixInt,
    pub col_inv: MatrixInt,
}

impl SnfBasis {
    /// Identity bases for a matrix of the given size.
    pub fn identity(rows: usize, cols: usize) -> Self {
        SnfBasis {
            row: MatrixInt::identity(cols),
            row_inv: MatrixInt::identity(cols),
            col: MatrixInt::identity(rows),
            col_inv: MatrixInt::identity(rows),
        }
    }

    fn tracker(&mut self) -> Tracker<'_> {
        Tracker {
            row: Some(&mut self.row),
            row_inv: Some(&mut self.row_inv),
            col: Some(&mut self.col),
            col_inv: Some(&mut self.col_inv),
        }
    }
}

/// Selects which change of basis matrices are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnfFlags {
    pub row: bool,
    pub row_inv: bool,
    pub col: bool,
    pub col_inv: bool,
}

impl SnfFlags {
    pub const NONE: SnfFlags = SnfFlags {
        row: false,
        row_inv: false,
        col: false,
        col_inv: false,
    };
    pub const ALL: SnfFlags = SnfFlags {
        row: true,
        row_inv: true,
        col: true,
        col_inv: true,
    };
}

/// The change of basis matrices requested by a `SnfFlags` value.
#[derive(Clone, Debug, Default)]
pub struct SnfTransforms {
    pub row: Option<MatrixInt>,
    pub row_inv: Option<MatrixInt>,
    pub col: Option<MatrixInt>,
    pub col_inv: Option<MatrixInt>,
}

// Replays elementary operations on the (optional) change of basis
// matrices. A row operation G on M (M <- G M) is applied as C <- G C
// and Ci <- Ci G^-1, a column operation E (M <- M E) as R <- R E
// and Ri <- E^-1 Ri. All 2x2 operations have determinant 1.
#[derive(Default)]
struct Tracker<'a> {
    row: Option<&'a mut MatrixInt>,
    row_inv: Option<&'a mut MatrixInt>,
    col: Option<&'a mut MatrixInt>,
    col_inv: Option<&'a mut MatrixInt>,
}

impl Tracker<'_> {
    fn row_op(&mut self, i: usize, j: usize, a: &Int, b: &Int, c: &Int, d: &Int) {
        if let Some(m) = self.col.as_deref_mut() {
            m.comb_rows(i, j, a, b, c, d);
        }
        if let Some(m) = self.col_inv.as_deref_mut() {
            m.comb_cols(i, j, d, &-c, &-b, a);
        }
    }

    fn col_op(&mut self, i: usize, j: usize, a: &Int, b: &Int, c: &Int, d: &Int) {
        if let Some(m) = self.row.as_deref_mut() {
            m.comb_cols(i, j, a, b, c, d);
        }
        if let Some(m) = self.row_inv.as_deref_mut() {
            m.comb_rows(i, j, d, &-c, &-b, a);
        }
    }

    fn swap_rows(&mut self, i: usize, j: usize) {
        if let Some(m) = self.col.as_deref_mut() {
            m.swap_rows(i, j);
        }
        if let Some(m) = self.col_inv.as_deref_mut() {
            m.swap_cols(i, j);
        }
    }

    fn swap_cols(&mut self, i: usize, j: usize) {
        if let Some(m) = self.row.as_deref_mut() {
            m.swap_cols(i, j);
        }
        if let Some(m) = self.row_inv.as_deref_mut() {
            m.swap_rows(i, j);
        }
    }

    // Row dest += row src.
    fn add_row(&mut self, src: usize, dest: usize) {
        if let Some(m) = self.col.as_deref_mut() {
            m.add_row(src, dest, &Int::one());
        }
        if let Some(m) = self.col_inv.as_deref_mut() {
            m.add_col(dest, src, &-Int::one());
        }
    }

    fn negate_row(&mut self, k: usize) {
        if let Some(m) = self.col.as_deref_mut() {
            m.negate_row(k);
        }
        if let Some(m) = self.col_inv.as_deref_mut() {
            m.negate_col(k);
        }
    }

    fn negate_col(&mut self, k: usize) {
        if let Some(m) = self.row.as_deref_mut() {
            m.negate_col(k);
        }
        if let Some(m) = self.row_inv.as_deref_mut() {
            m.negate_row(k);
        }
    }
}

// Coefficients (u, v, -b/d, a/d) of the unimodular transformation
// sending (a, b) to (gcd(a, b), 0).
fn elimination(a: &Int, b: &Int) -> (Int, Int, Int, Int) {
    let (d, u, v) = gcd_with_coeffs(a, b);
    let a = div_exact(a, &d);
    let b = div_exact(b, &d);
    (u, v, -b, a)
}

/// Reduces M to Smith normal form in place.
///
/// The result is diagonal, with non-negative entries such that
/// each diagonal entry divides the next one, and zero entries last.
pub fn smith_normal_form(m: &mut MatrixInt) {
    snf_reduce(m, &mut Tracker::default())
}

/// Same as smith_normal_form, also returning the change of basis matrices.
pub fn smith_normal_form_with_bases(m: &mut MatrixInt) -> SnfBasis {
    let mut basis = SnfBasis::identity(m.rows(), m.columns());
    snf_reduce(m, &mut basis.tracker());
    basis
}

// Stage k works on the submatrix of rows k..rows_left and columns
// k..cols_left: empty rows and columns are moved past these bounds.
fn snf_reduce(m: &mut MatrixInt, t: &mut Tracker) {
    let mut rows_left = m.rows();
    let mut cols_left = m.columns();
    let mut k = 0;
    while k < rows_left && k < cols_left {
        if (k..cols_left).all(|j| m[(k, j)].is_zero()) {
            rows_left -= 1;
            if k < rows_left {
                m.swap_rows(k, rows_left);
                t.swap_rows(k, rows_left);
            }
            continue;
        }
        if (k..rows_left).all(|i| m[(i, k)].is_zero()) {
            cols_left -= 1;
            if k < cols_left {
                m.swap_cols(k, cols_left);
                t.swap_cols(k, cols_left);
            }
            continue;
        }
        // Clear row k.
        for j in k + 1..cols_left {
            if m[(k, j)].is_zero() {
                continue;
            }
            let (a, b, c, d) = elimination(&m[(k, k)], &m[(k, j)]);
            m.comb_cols(k, j, &a, &b, &c, &d);
            t.col_op(k, j, &a, &b, &c, &d);
        }
        // Clear column k, which may disturb row k again.
        let mut changed = false;
        for i in k + 1..rows_left {
            if m[(i, k)].is_zero() {
                continue;
            }
            let (a, b, c, d) = elimination(&m[(k, k)], &m[(i, k)]);
            m.comb_rows(k, i, &a, &b, &c, &d);
            t.row_op(k, i, &a, &b, &c, &d);
            changed = true;
        }
        if changed && (k + 1..cols_left).any(|j| !m[(k, j)].is_zero()) {
            continue;
        }
        // The pivot must divide every remaining entry.
        let pivot = m[(k, k)].clone();
        let bad_row = (k + 1..rows_left)
            .find(|&i| (k + 1..cols_left).any(|j| !(&m[(i, j)] % &pivot).is_zero()));
        if let Some(i) = bad_row {
            m.add_row(i, k, &Int::one());
            t.add_row(i, k);
            continue;
        }
        if pivot.is_negative() {
            m.negate_row(k);
            t.negate_row(k);
        }
        k += 1;
    }
}

/// Reduces M to Smith normal form using a pivoting strategy that
/// limits the growth of entries, computing the requested change
/// of basis matrices.
pub fn metrical_smith_normal_form(m: &mut MatrixInt, flags: SnfFlags) -> SnfTransforms {
    let mut row = flags.row.then(|| MatrixInt::identity(m.columns()));
    let mut row_inv = flags.row_inv.then(|| MatrixInt::identity(m.columns()));
    let mut col = flags.col.then(|| MatrixInt::identity(m.rows()));
    let mut col_inv = flags.col_inv.then(|| MatrixInt::identity(m.rows()));
    let mut t = Tracker {
        row: row.as_mut(),
        row_inv: row_inv.as_mut(),
        col: col.as_mut(),
        col_inv: col_inv.as_mut(),
    };
    metrical_reduce(m, &mut t);
    SnfTransforms {
        row,
        row_inv,
        col,
        col_inv,
    }
}

/// Metrical Smith normal form, with all change of basis matrices.
pub fn metrical_smith_normal_form_with_bases(m: &mut MatrixInt) -> SnfBasis {
    let mut basis = SnfBasis::identity(m.rows(), m.columns());
    metrical_reduce(m, &mut basis.tracker());
    basis
}

fn metrical_reduce(m: &mut MatrixInt, t: &mut Tracker) {
    let (rows, cols) = (m.rows(), m.columns());
    let mut row_norm = vec![Int::zero(); rows];
    let mut col_norm = vec![Int::zero(); cols];
    let mut row_gcd = vec![Int::zero(); rows];
    for i in 0..rows {
        for j in 0..cols {
            let x = m[(i, j)].abs();
            row_norm[i] += &x;
            col_norm[j] += &x;
            row_gcd[i] = arith::gcd(&row_gcd[i], &x);
        }
    }
    let mut snf = MetricalSnf {
        m,
        t,
        stage: 0,
        row_norm,
        col_norm,
        row_gcd,
    };
    while let Some((pr, pc)) = snf.find_pivot() {
        let k = snf.stage;
        if pr != k {
            snf.swap_rows(pr, k);
        }
        if pc != k {
            snf.swap_cols(pc, k);
        }
        snf.reduce_stage();
        snf.stage += 1;
    }
}

// State of the metrical reduction. Norms and gcds are only maintained
// for rows and columns at or after the current stage.
struct MetricalSnf<'a, 'b> {
    m: &'a mut MatrixInt,
    t: &'a mut Tracker<'b>,
    stage: usize,
    row_norm: Vec<Int>,
    col_norm: Vec<Int>,
    row_gcd: Vec<Int>,
}

impl MetricalSnf<'_, '_> {
    // Among rows with the smallest positive gcd, choose the smallest
    // entry, breaking ties using row and column norms.
    fn find_pivot(&self) -> Option<(usize, usize)> {
        let k = self.stage;
        let (rows, cols) = (self.m.rows(), self.m.columns());
        if k >= rows || k >= cols {
            return None;
        }
        let smallest = (k..rows)
            .map(|i| &self.row_gcd[i])
            .filter(|g| !g.is_zero())
            .min()?;
        let mut best: Option<(usize, usize)> = None;
        for i in k..rows {
            if &self.row_gcd[i] != smallest {
                continue;
            }
            for j in k..cols {
                if self.m[(i, j)].is_zero() {
                    continue;
                }
                best = match best {
                    Some((pr, pc)) if !self.better_pivot(i, j, pr, pc) => Some((pr, pc)),
                    _ => Some((i, j)),
                };
            }
        }
        best
    }

    fn better_pivot(&self, i: usize, j: usize, pr: usize, pc: usize) -> bool {
        let x = self.m[(i, j)].abs();
        let y = self.m[(pr, pc)].abs();
        if x != y {
            return x < y;
        }
        if x.is_one() {
            let w1 = (&self.row_norm[i] - Int::one()) * (&self.col_norm[j] - Int::one());
            let w2 = (&self.row_norm[pr] - Int::one()) * (&self.col_norm[pc] - Int::one());
            w1 < w2
        } else if i == pr {
            self.col_norm[j] < self.col_norm[pc]
        } else {
            self.row_norm[i] < self.row_norm[pr]
        }
    }

    fn reduce_stage(&mut self) {
        let k = self.stage;
        let (rows, cols) = (self.m.rows(), self.m.columns());
        loop {
            for j in k + 1..cols {
                if self.m[(k, j)].is_zero() {
                    continue;
                }
                let (a, b, c, d) = elimination(&self.m[(k, k)], &self.m[(k, j)]);
                self.col_op(k, j, &a, &b, &c, &d);
            }
            for i in k + 1..rows {
                if self.m[(i, k)].is_zero() {
                    continue;
                }
                let (a, b, c, d) = elimination(&self.m[(k, k)], &self.m[(i, k)]);
                self.row_op(k, i, &a, &b, &c, &d);
            }
            if (k + 1..cols).any(|j| !self.m[(k, j)].is_zero()) {
                continue;
            }
            if self.m[(k, k)].is_negative() {
                self.m.negate_col(k);
                self.t.negate_col(k);
            }
            // Look for a row whose gcd with the pivot is smaller than the pivot.
            let pivot = self.m[(k, k)].clone();
            let mut best = pivot.clone();
            let mut row_t = k;
            for i in k + 1..rows {
                let g = arith::gcd(&pivot, &self.row_gcd[i]);
                if g < best {
                    best = g;
                    row_t = i;
                }
            }
            if row_t == k {
                return;
            }
            let (one, zero) = (Int::one(), Int::zero());
            self.row_op(k, row_t, &one, &one, &zero, &one);
        }
    }

    fn col_op(&mut self, i: usize, j: usize, a: &Int, b: &Int, c: &Int, d: &Int) {
        self.col_norm[i] = Int::zero();
        self.col_norm[j] = Int::zero();
        for r in self.stage..self.m.rows() {
            let x = self.m[(r, i)].clone();
            let y = self.m[(r, j)].clone();
            let t1 = a * &x + b * &y;
            let t2 = c * &x + d * &y;
            self.row_norm[r] += t1.abs() + t2.abs();
            self.row_norm[r] -= x.abs() + y.abs();
            self.col_norm[i] += t1.abs();
            self.col_norm[j] += t2.abs();
            self.m[(r, i)] = t1;
            self.m[(r, j)] = t2;
        }
        self.t.col_op(i, j, a, b, c, d);
    }

    fn row_op(&mut self, i: usize, j: usize, a: &Int, b: &Int, c: &Int, d: &Int) {
        let k = self.stage;
        for col in k..self.m.columns() {
            let x = self.m[(i, col)].clone();
            let y = self.m[(j, col)].clone();
            let t1 = a * &x + b * &y;
            let t2 = c * &x + d * &y;
            self.col_norm[col] += t1.abs() + t2.abs();
            self.col_norm[col] -= x.abs() + y.abs();
            self.m[(i, col)] = t1;
            self.m[(j, col)] = t2;
        }
        for r in [i, j] {
            let mut norm = Int::zero();
            let mut g = Int::zero();
            for col in k..self.m.columns() {
                let x = self.m[(r, col)].abs();
                g = arith::gcd(&g, &x);
                norm += x;
            }
            self.row_norm[r] = norm;
            self.row_gcd[r] = g;
        }
        self.t.row_op(i, j, a, b, c, d);
    }

    fn swap_rows(&mut self, i: usize, j: usize) {
        self.m.swap_rows(i, j);
        self.row_norm.swap(i, j);
        self.row_gcd.swap(i, j);
        self.t.swap_rows(i, j);
    }

    fn swap_cols(&mut self, i: usize, j: usize) {
        self.m.swap_cols(i, j);
        self.col_norm.swap(i, j);
        self.t.swap_cols(i, j);
    }
}

/// Divides a row by the gcd of its entries.
pub fn reduce_row(m: &mut MatrixInt, r: usize) {
    let g = m.row(r).iter().fold(Int::zero(), |g, x| arith::gcd(&g, x));
    if g.is_zero() || g.is_one() {
        return;
    }
    let row: Vec<Int> = m.row(r).iter().map(|x| div_exact(x, &g)).collect();
    for (k, x) in row.into_iter().enumerate() {
        m[(r, k)] = x;
    }
}

// Gaussian elimination with integer arithmetic: `echelon` is reduced
// to row echelon form, rows found to be dependent are swapped to the
// bottom of both `echelon` and `m`. Returns the rank and the leading
// column permutation.
fn row_echelon(m: &mut MatrixInt, echelon: &mut MatrixInt) -> (usize, Vec<usize>) {
    let n = m.columns();
    let mut lead: Vec<usize> = (0..n).collect();
    let mut rank = echelon.rows();
    let mut done = 0;
    while done < rank {
        // For i < done, echelon[i, lead[i]] is nonzero and
        // echelon[j, lead[i]] is zero for j > i.
        match (done..n).find(|&c| !echelon[(done, lead[c])].is_zero()) {
            None => {
                rank -= 1;
                if done < rank {
                    echelon.swap_rows(done, rank);
                    m.swap_rows(done, rank);
                }
            }
            Some(c) => {
                lead.swap(done, c);
                let coeff1 = echelon[(done, lead[done])].clone();
                for r in done + 1..rank {
                    let coeff2 = echelon[(r, lead[done])].clone();
                    if coeff2.is_zero() {
                        continue;
                    }
                    echelon.mult_row(r, &coeff1);
                    echelon.add_row(done, r, &-coeff2);
                    reduce_row(echelon, r);
                }
                done += 1;
            }
        }
    }
    (rank, lead)
}

/// Computes the rank of M over the rationals, permuting the rows
/// of M so that the first `rank` rows form a basis of its row space.
pub fn row_basis(m: &mut MatrixInt) -> usize {
    let mut echelon = m.clone();
    row_echelon(m, &mut echelon).0
}

/// Same as row_basis, also returning a square matrix whose rows
/// `rank..` form a basis of the orthogonal complement of the rational
/// row space of M.
pub fn row_basis_and_orth_comp(m: &mut MatrixInt) -> (usize, MatrixInt) {
    let n = m.columns();
    let mut echelon = m.clone();
    let (rank, lead) = row_echelon(m, &mut echelon);

    let mut comp = MatrixInt::new(n, n);
    let mut lcm_lead = Int::one();
    for r in 0..n {
        comp[(r, lead[r])] = -lcm_lead.clone();
        for c in 0..r.min(rank) {
            let x = &echelon[(c, lead[r])] * &lcm_lead;
            comp[(r, lead[c])] = div_exact(&x, &echelon[(c, lead[c])]);
        }
        reduce_row(&mut comp, r);

        if r < rank {
            // Back substitution: clear column lead[r] above row r.
            let coeff1 = echelon[(r, lead[r])].clone();
            lcm_lead = arith::lcm(&lcm_lead, &coeff1);
            for tmp in 0..r {
                let coeff2 = echelon[(tmp, lead[r])].clone();
                if !coeff2.is_zero() {
                    echelon.mult_row(tmp, &coeff1);
                    echelon.add_row(r, tmp, &-coeff2);
                    reduce_row(&mut echelon, tmp);
                }
                lcm_lead = arith::lcm(&lcm_lead, &echelon[(tmp, lead[tmp])]);
            }
        }
    }
    (rank, comp)
}

/// Column operations reducing the rows `row_list` of M (in that order)
/// to echelon form: in each processed row, the pivot is positive, the
/// entries to its right are zero and the entries to its left are
/// reduced modulo the pivot.
///
/// The same column operations are applied to R, and the inverse
/// row operations to Ri (if present), so that `M * R` and `Ri * M`
/// relations are preserved.
pub fn column_echelon_form(
    m: &mut MatrixInt,
    r: &mut MatrixInt,
    mut ri: Option<&mut MatrixInt>,
    row_list: &[usize],
) {
    let mut cr = 0;
    let mut cc = 0;
    while cr < row_list.len() && cc < m.columns() {
        let row = row_list[cr];
        let mut nonzero: Vec<usize> = (cc..m.columns())
            .filter(|&j| !m[(row, j)].is_zero())
            .collect();
        match nonzero.len() {
            0 => cr += 1,
            1 if nonzero[0] == cc => {
                if m[(row, cc)].is_negative() {
                    m.negate_col(cc);
                    r.negate_col(cc);
                    if let Some(ri) = ri.as_deref_mut() {
                        ri.negate_row(cc);
                    }
                }
                for i in 0..cc {
                    let (d, _) = division_alg(&m[(row, i)], &m[(row, cc)]);
                    if d.is_zero() {
                        continue;
                    }
                    m.add_col(cc, i, &-d.clone());
                    r.add_col(cc, i, &-d.clone());
                    if let Some(ri) = ri.as_deref_mut() {
                        ri.add_row(i, cc, &d);
                    }
                }
                cc += 1;
                cr += 1;
            }
            1 => {
                let j = nonzero[0];
                m.swap_cols(cc, j);
                r.swap_cols(cc, j);
                if let Some(ri) = ri.as_deref_mut() {
                    ri.swap_rows(cc, j);
                }
            }
            _ => {
                while nonzero.len() > 1 {
                    let (c0, c1) = (nonzero[0], nonzero[1]);
                    let (a, b, c, d) = elimination(&m[(row, c0)], &m[(row, c1)]);
                    m.comb_cols(c0, c1, &a, &b, &c, &d);
                    r.comb_cols(c0, c1, &a, &b, &c, &d);
                    if let Some(ri) = ri.as_deref_mut() {
                        ri.comb_rows(c0, c1, &d, &-c.clone(), &-b.clone(), &a);
                    }
                    nonzero.remove(1);
                }
            }
        }
    }
}

/// Given a homomorphism from ℤ^n to ℤ^m and a lattice L = ⊕ lᵢℤ
/// (with lᵢ = 0 meaning the zero subgroup), returns a matrix whose
/// columns form a basis of the preimage of L.
pub fn pre_image_of_lattice(hom: &MatrixInt, moduli: &[Int]) -> MatrixInt {
    assert_eq!(hom.rows(), moduli.len());
    let n = hom.columns();
    let mut basis = MatrixInt::identity(n);
    let mut hom_mod_l = hom.clone();

    let free_list: Vec<usize> = (0..moduli.len()).filter(|&i| moduli[i].is_zero()).collect();
    let tor_list: Vec<usize> = (0..moduli.len()).filter(|&i| !moduli[i].is_zero()).collect();

    // Columns sent into the primitive subspace spanned by the lattice.
    column_echelon_form(&mut hom_mod_l, &mut basis, None, &free_list);
    let tor_cols: Vec<usize> = (0..n)
        .filter(|&j| free_list.iter().all(|&i| hom_mod_l[(i, j)].is_zero()))
        .collect();

    let mut t_hom = MatrixInt::new(hom.rows(), tor_cols.len());
    let mut t_basis = MatrixInt::new(n, tor_cols.len());
    for (jj, &j) in tor_cols.iter().enumerate() {
        for i in 0..hom.rows() {
            t_hom[(i, jj)] = hom_mod_l[(i, j)].clone();
        }
        for i in 0..n {
            t_basis[(i, jj)] = basis[(i, j)].clone();
        }
    }
    column_echelon_form(&mut t_hom, &mut t_basis, None, &tor_list);

    // Row by row, combine columns until a single one is nonzero,
    // then scale it just enough to land in the lattice.
    let mut cr = 0;
    while cr < tor_list.len() {
        let row = tor_list[cr];
        let mut nonzero: Vec<usize> = (0..t_hom.columns())
            .filter(|&j| !t_hom[(row, j)].is_zero())
            .collect();
        match nonzero.len() {
            0 => cr += 1,
            1 => {
                let j = nonzero[0];
                let g = arith::gcd(&t_hom[(row, j)], &moduli[row]);
                let d = div_exact(&moduli[row], &g);
                for &pos in &tor_list {
                    t_hom[(pos, j)] *= &d;
                }
                t_basis.mult_col(j, &d);
                cr += 1;
            }
            _ => {
                while nonzero.len() > 1 {
                    let (c0, c1) = (nonzero[0], nonzero[1]);
                    let (a, b, c, d) = elimination(&t_hom[(row, c0)], &t_hom[(row, c1)]);
                    t_hom.comb_cols(c0, c1, &a, &b, &c, &d);
                    t_basis.comb_cols(c0, c1, &a, &b, &c, &d);
                    nonzero.remove(1);
                }
            }
        }
    }
    t_basis
}

/// Given a square matrix A representing an automorphism of
/// ℤ_{p₁} ⊕ … ⊕ ℤ_{pₖ} (p₁ | p₂ | … | pₖ), returns a matrix
/// representing its inverse, with row i reduced into [0, pᵢ).
///
/// If A is not an automorphism the result is meaningless.
pub fn torsion_aut_inverse(a: &MatrixInt, inv_f: &[Int]) -> MatrixInt {
    let n = a.rows();
    assert_eq!(n, a.columns());
    assert_eq!(n, inv_f.len());
    let mut work = a.clone();
    let mut col_ops = MatrixInt::identity(n);

    // Bottom-up, reduce the working matrix to upper triangular form
    // with unit diagonal.
    for w_row in (0..n).rev() {
        let mut piv = 0;
        for i in 0..=w_row {
            let (_, r) = division_alg(&work[(w_row, i)], &inv_f[w_row]);
            if !r.is_zero() {
                piv = i;
            }
            work[(w_row, i)] = r;
        }
        if piv != w_row {
            work.swap_cols(w_row, piv);
            col_ops.swap_cols(w_row, piv);
        }
        let piv = w_row;
        for w_col in (0..piv).rev() {
            let (g, l1, l2) = gcd_with_coeffs(&work[(w_row, w_col)], &work[(w_row, piv)]);
            if g.is_zero() {
                continue;
            }
            let u1 = div_exact(&work[(w_row, w_col)], &g);
            let u2 = div_exact(&work[(w_row, piv)], &g);
            // (wCol, piv) <- (u2 wCol - u1 piv, l1 wCol + l2 piv)
            work.comb_cols(w_col, piv, &u2, &-u1.clone(), &l1, &l2);
            col_ops.comb_cols(w_col, piv, &u2, &-u1, &l1, &l2);
        }
        // The pivot is now a unit modulo inv_f[piv].
        let (_, a1, _) = gcd_with_coeffs(&work[(w_row, piv)], &inv_f[piv]);
        work.mult_col(piv, &a1);
        col_ops.mult_col(piv, &a1);
        let (_, r) = division_alg(&work[(w_row, piv)], &inv_f[w_row]);
        work[(w_row, piv)] = r;
    }

    // Clear entries above the diagonal with row operations.
    let mut row_ops = MatrixInt::identity(n);
    for i in 1..n {
        for j in 0..i {
            let x = work[(j, i)].clone();
            if x.is_zero() {
                continue;
            }
            row_ops.add_row(i, j, &-x.clone());
            work.add_row(i, j, &-x);
        }
    }

    let mut res = &col_ops * &row_ops;
    for i in 0..n {
        for j in 0..n {
            res[(i, j)] = arith::reduce_mod(&res[(i, j)], &inv_f[i]);
        }
    }
    res
}

#[cfg(test)]
pub(crate) fn mat(rows: &[&[i64]]) -> MatrixInt {
    Matrix::from_rows(
        rows.iter()
            .map(|r| r.iter().map(|&x| Int::from(x)).collect())
            .collect(),
    )
}

#[cfg(test)]
pub(crate) fn random_matrix(rng: &mut impl rand::Rng, rows: usize, cols: usize, bound: i64) -> MatrixInt {
    let mut m = MatrixInt::new(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            // Sparse enough to produce interesting ranks and torsion.
            if rng.gen_bool(0.6) {
                m[(i, j)] = Int::from(rng.gen_range(-bound..=bound));
            }
        }
    }
    m
}

#[cfg(test)]
fn assert_smith_form(s: &MatrixInt) {
    let k = s.rows().min(s.columns());
    for i in 0..s.rows() {
        for j in 0..s.columns() {
            if i != j {
                assert!(s[(i, j)].is_zero(), "not diagonal:\n{s}");
            }
        }
    }
    for i in 0..k {
        assert!(!s[(i, i)].is_negative(), "negative entry:\n{s}");
        if i + 1 < k {
            let (x, y) = (&s[(i, i)], &s[(i + 1, i + 1)]);
            if x.is_zero() {
                assert!(y.is_zero(), "zeros must come last:\n{s}");
            } else {
                assert!((y % x).is_zero(), "divisibility fails:\n{s}");
            }
        }
    }
}

#[cfg(test)]
fn assert_bases(orig: &MatrixInt, s: &MatrixInt, b: &SnfBasis) {
    assert_eq!(&(&b.col * orig) * &b.row, *s);
    assert_eq!(&(&b.col_inv * s) * &b.row_inv, *orig);
    assert!((&b.row * &b.row_inv).is_identity());
    assert!((&b.col * &b.col_inv).is_identity());
}

#[test]
fn test_snf_small() {
    let orig = mat(&[&[2, 4, 6], &[3, 5, 7]]);
    let mut m = orig.clone();
    let b = smith_normal_form_with_bases(&mut m);
    assert_eq!(m, mat(&[&[1, 0, 0], &[0, 2, 0]]));
    assert_bases(&orig, &m, &b);

    let mut m = orig.clone();
    let b = metrical_smith_normal_form_with_bases(&mut m);
    assert_eq!(m, mat(&[&[1, 0, 0], &[0, 2, 0]]));
    assert_bases(&orig, &m, &b);

    // Zero rows and columns move to the end.
    let mut m = mat(&[&[0, 0, 0], &[0, 0, 4], &[0, 6, 0]]);
    smith_normal_form(&mut m);
    assert_eq!(m, mat(&[&[2, 0, 0], &[0, 12, 0], &[0, 0, 0]]));

    let mut m = mat(&[&[0, 0], &[0, 0]]);
    smith_normal_form(&mut m);
    assert!(m.is_zero());
    let mut m = MatrixInt::new(3, 0);
    let b = smith_normal_form_with_bases(&mut m);
    assert_eq!(b.col, MatrixInt::identity(3));
    assert_eq!(b.row.rows(), 0);
}

#[test]
fn test_snf_random() {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(1234);
    for _ in 0..100 {
        let rows = rng.gen_range(1..7);
        let cols = rng.gen_range(1..7);
        let orig = random_matrix(&mut rng, rows, cols, 12);

        let mut s1 = orig.clone();
        let b1 = smith_normal_form_with_bases(&mut s1);
        assert_smith_form(&s1);
        assert_bases(&orig, &s1, &b1);

        let mut s2 = orig.clone();
        let b2 = metrical_smith_normal_form_with_bases(&mut s2);
        assert_smith_form(&s2);
        assert_bases(&orig, &s2, &b2);
        // The Smith normal form is unique.
        assert_eq!(s1, s2);

        let mut s3 = orig.clone();
        smith_normal_form(&mut s3);
        assert_eq!(s1, s3);
    }
}

#[test]
fn test_metrical_flags() {
    let orig = mat(&[&[4, 6, 0], &[2, 10, 8], &[0, 0, 3]]);
    let mut m = orig.clone();
    let t = metrical_smith_normal_form(
        &mut m,
        SnfFlags {
            row: true,
            col: true,
            ..SnfFlags::NONE
        },
    );
    assert!(t.row_inv.is_none() && t.col_inv.is_none());
    let (Some(row), Some(col)) = (t.row, t.col) else {
        panic!("missing bases")
    };
    assert_eq!(&(&col * &orig) * &row, m);
    assert_smith_form(&m);

    let mut m2 = orig.clone();
    let t = metrical_smith_normal_form(&mut m2, SnfFlags::NONE);
    assert!(t.row.is_none());
    assert_eq!(m, m2);
}

#[test]
fn test_row_basis() {
    let mut m = mat(&[&[1, 2, 3], &[2, 4, 6], &[0, 1, 1]]);
    let mut m2 = m.clone();
    assert_eq!(row_basis(&mut m), 2);
    assert_eq!(m, mat(&[&[1, 2, 3], &[0, 1, 1], &[2, 4, 6]]));

    let (rank, comp) = row_basis_and_orth_comp(&mut m2);
    assert_eq!(rank, 2);
    assert_eq!(m2, m);
    let last: Vec<Int> = comp.row(2).to_vec();
    assert!(last.iter().any(|x| !x.is_zero()));
    assert_eq!(m2.mul_vec(&last), vec![Int::zero(); 3]);
}

#[test]
fn test_orth_comp_random() {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(77);
    for _ in 0..50 {
        let rows = rng.gen_range(1..5);
        let cols = rng.gen_range(1..6);
        let orig = random_matrix(&mut rng, rows, cols, 5);
        let mut m = orig.clone();
        let (rank, comp) = row_basis_and_orth_comp(&mut m);
        // The first rank rows are independent.
        let mut head = m.submatrix(0, rank, 0, cols);
        assert_eq!(row_basis(&mut head), rank);
        // The complement rows are orthogonal to the input and independent.
        let mut tail = comp.submatrix(rank, cols, 0, cols);
        assert_eq!(row_basis(&mut tail), cols - rank);
        for r in rank..cols {
            assert!(orig.mul_vec(comp.row(r)).iter().all(|x| x.is_zero()));
        }
    }
}

#[test]
fn test_column_echelon_form() {
    let orig = mat(&[&[4, 6, 2], &[1, 0, 3]]);
    let mut m = orig.clone();
    let mut r = MatrixInt::identity(3);
    let mut ri = MatrixInt::identity(3);
    column_echelon_form(&mut m, &mut r, Some(&mut ri), &[0, 1]);
    assert_eq!(&orig * &r, m);
    assert!((&r * &ri).is_identity());
    // First row has a single positive pivot in column 0.
    assert_eq!(m.row(0), &[Int::from(2), Int::zero(), Int::zero()]);
    // Second row: pivot in column 1, entry to the left reduced.
    assert!(m[(1, 1)].is_positive());
    assert!(!m[(1, 0)].is_negative() && m[(1, 0)] < m[(1, 1)]);
    assert!(m[(1, 2)].is_zero());
}

#[test]
fn test_pre_image_of_lattice() {
    let p = pre_image_of_lattice(&mat(&[&[2]]), &[Int::from(4)]);
    assert_eq!(p, mat(&[&[2]]));

    // x -> (x, 3x) meets 0 + 6Z only at 0.
    let p = pre_image_of_lattice(&mat(&[&[1], &[3]]), &[Int::zero(), Int::from(6)]);
    assert_eq!((p.rows(), p.columns()), (1, 0));

    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let rows = rng.gen_range(1..5);
        let cols = rng.gen_range(1..5);
        let hom = random_matrix(&mut rng, rows, cols, 9);
        let moduli: Vec<Int> = (0..rows).map(|_| Int::from(rng.gen_range(0..7))).collect();
        let p = pre_image_of_lattice(&hom, &moduli);
        let img = &hom * &p;
        for i in 0..rows {
            for j in 0..img.columns() {
                let x = &img[(i, j)];
                if moduli[i].is_zero() {
                    assert!(x.is_zero());
                } else {
                    assert!((x % &moduli[i]).is_zero());
                }
            }
        }
        // The preimage contains moduli-scaled kernel vectors: its rank
        // is the rank of the kernel of the free part.
        let mut pc = p.transpose();
        let prank = row_basis(&mut pc);
        assert_eq!(prank, p.columns());
        // Every small vector of the preimage is an integer combination
        // of the columns.
        let mut s = p.clone();
        let b = smith_normal_form_with_bases(&mut s);
        for code in 0..5usize.pow(cols as u32) {
            let x: Vec<Int> = (0..cols)
                .map(|k| Int::from((code / 5usize.pow(k as u32) % 5) as i64 - 2))
                .collect();
            let hx = hom.mul_vec(&x);
            let inside = hx.iter().zip(&moduli).all(|(y, l)| {
                if l.is_zero() {
                    y.is_zero()
                } else {
                    (y % l).is_zero()
                }
            });
            if !inside {
                continue;
            }
            // x = p·y iff col·x = S·(row⁻¹·y)
            let z = b.col.mul_vec(&x);
            for (i, zi) in z.iter().enumerate() {
                let d = if i < s.columns() { s[(i, i)].clone() } else { Int::zero() };
                let ok = if d.is_zero() { zi.is_zero() } else { (zi % &d).is_zero() };
                assert!(ok, "{x:?} is not spanned by\n{p}hom=\n{hom}moduli={moduli:?}");
            }
        }
    }
}

#[test]
fn test_torsion_aut_inverse() {
    let inv = torsion_aut_inverse(&mat(&[&[2]]), &[Int::from(5)]);
    assert_eq!(inv, mat(&[&[3]]));

    let invf = [Int::from(3), Int::from(9)];
    let inv = torsion_aut_inverse(&mat(&[&[1, 2], &[0, 1]]), &invf);
    assert_eq!(inv, mat(&[&[1, 1], &[0, 1]]));

    let a = mat(&[&[1, 0], &[3, 2]]);
    let inv = torsion_aut_inverse(&a, &invf);
    let prod = &inv * &a;
    for i in 0..2 {
        for j in 0..2 {
            let x = arith::reduce_mod(&prod[(i, j)], &invf[i]);
            assert_eq!(x, if i == j { Int::one() } else { Int::zero() });
        }
    }
}
