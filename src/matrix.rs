// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Dense matrices over a commutative ring.
//!
//! Matrices are stored in row-major order. Elementary row and column
//! operations are the building blocks of all normal form algorithms
//! in this crate: the convention for combinations is that
//! `comb_rows(i, j, a, b, c, d)` replaces `(row i, row j)` by
//! `(a*row i + b*row j, c*row i + d*row j)`.

use std::fmt;
use std::ops::{AddAssign, Index, IndexMut, Mul, MulAssign, Neg, SubAssign};

use num_traits::{One, Zero};

/// The operations needed for matrix arithmetic.
pub trait Ring:
    Clone
    + fmt::Debug
    + PartialEq
    + Zero
    + One
    + Neg<Output = Self>
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
{
}

impl<T> Ring for T where
    T: Clone
        + fmt::Debug
        + PartialEq
        + Zero
        + One
        + Neg<Output = T>
        + for<'a> AddAssign<&'a T>
        + for<'a> SubAssign<&'a T>
        + for<'a> MulAssign<&'a T>
{
}

// a*x + b*y
fn lincomb<T: Ring>(a: &T, x: &T, b: &T, y: &T) -> T {
    let mut t = a.clone();
    t *= x;
    let mut s = b.clone();
    s *= y;
    t += &s;
    t
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.cols
    }

    pub fn entry(&self, i: usize, j: usize) -> &T {
        assert!(i < self.rows && j < self.cols);
        &self.data[i * self.cols + j]
    }

    pub fn entry_mut(&mut self, i: usize, j: usize) -> &mut T {
        assert!(i < self.rows && j < self.cols);
        &mut self.data[i * self.cols + j]
    }

    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        for k in 0..self.cols {
            self.data.swap(i * self.cols + k, j * self.cols + k);
        }
    }

    pub fn swap_cols(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        for k in 0..self.rows {
            self.data.swap(k * self.cols + i, k * self.cols + j);
        }
    }
}

impl<T: Ring> Matrix<T> {
    /// A zero matrix. Empty dimensions are allowed.
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        m
    }

    /// Builds a matrix from a list of rows, which must have equal lengths.
    /// The number of columns of an empty list is zero.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        let nrows = rows.len();
        let mut data = Vec::with_capacity(nrows * cols);
        for r in rows {
            assert_eq!(r.len(), cols, "rows must have equal lengths");
            data.extend(r);
        }
        Matrix {
            rows: nrows,
            cols,
            data,
        }
    }

    pub fn diagonal(rows: usize, cols: usize, diag: &[T]) -> Self {
        let mut m = Self::new(rows, cols);
        for (i, d) in diag.iter().enumerate() {
            m[(i, i)] = d.clone();
        }
        m
    }

    pub fn column(&self, j: usize) -> Vec<T> {
        (0..self.rows).map(|i| self[(i, j)].clone()).collect()
    }

    pub fn make_identity(&mut self) {
        assert_eq!(self.rows, self.cols);
        for i in 0..self.rows {
            for j in 0..self.cols {
                self[(i, j)] = if i == j { T::one() } else { T::zero() };
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|x| x.is_zero())
    }

    pub fn is_identity(&self) -> bool {
        self.rows == self.cols
            && (0..self.rows).all(|i| {
                (0..self.cols).all(|j| {
                    let x = &self[(i, j)];
                    if i == j {
                        x.is_one()
                    } else {
                        x.is_zero()
                    }
                })
            })
    }

    /// Copy of the block of rows `r0..r1` and columns `c0..c1`.
    pub fn submatrix(&self, r0: usize, r1: usize, c0: usize, c1: usize) -> Self {
        assert!(r0 <= r1 && r1 <= self.rows && c0 <= c1 && c1 <= self.cols);
        let mut m = Self::new(r1 - r0, c1 - c0);
        for i in r0..r1 {
            for j in c0..c1 {
                m[(i - r0, j - c0)] = self[(i, j)].clone();
            }
        }
        m
    }

    /// Overwrites the block starting at (r0, c0) with the contents of `block`.
    pub fn set_block(&mut self, r0: usize, c0: usize, block: &Self) {
        assert!(r0 + block.rows <= self.rows && c0 + block.cols <= self.cols);
        for i in 0..block.rows {
            for j in 0..block.cols {
                self[(r0 + i, c0 + j)] = block[(i, j)].clone();
            }
        }
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::new(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t[(j, i)] = self[(i, j)].clone();
            }
        }
        t
    }

    pub fn negate(&mut self) {
        for x in self.data.iter_mut() {
            *x = -x.clone();
        }
    }

    /// Row dest += coeff * row src.
    pub fn add_row(&mut self, src: usize, dest: usize, coeff: &T) {
        self.add_row_from(src, dest, coeff, 0)
    }

    /// Row dest += coeff * row src, only for columns from `from` onwards.
    pub fn add_row_from(&mut self, src: usize, dest: usize, coeff: &T, from: usize) {
        for k in from..self.cols {
            let mut t = coeff.clone();
            t *= &self[(src, k)];
            self[(dest, k)] += &t;
        }
    }

    /// Column dest += coeff * column src.
    pub fn add_col(&mut self, src: usize, dest: usize, coeff: &T) {
        for k in 0..self.rows {
            let mut t = coeff.clone();
            t *= &self[(k, src)];
            self[(k, dest)] += &t;
        }
    }

    pub fn mult_row(&mut self, r: usize, coeff: &T) {
        for k in 0..self.cols {
            self[(r, k)] *= coeff;
        }
    }

    pub fn mult_col(&mut self, c: usize, coeff: &T) {
        for k in 0..self.rows {
            self[(k, c)] *= coeff;
        }
    }

    pub fn negate_row(&mut self, r: usize) {
        for k in 0..self.cols {
            let x = -self[(r, k)].clone();
            self[(r, k)] = x;
        }
    }

    pub fn negate_col(&mut self, c: usize) {
        for k in 0..self.rows {
            let x = -self[(k, c)].clone();
            self[(k, c)] = x;
        }
    }

    /// Replaces (row i, row j) by (a*row i + b*row j, c*row i + d*row j).
    pub fn comb_rows(&mut self, i: usize, j: usize, a: &T, b: &T, c: &T, d: &T) {
        self.comb_rows_from(i, j, a, b, c, d, 0)
    }

    /// Same as comb_rows, only for columns from `from` onwards.
    #[allow(clippy::too_many_arguments)]
    pub fn comb_rows_from(&mut self, i: usize, j: usize, a: &T, b: &T, c: &T, d: &T, from: usize) {
        assert!(i != j);
        for k in from..self.cols {
            let x = self[(i, k)].clone();
            let y = self[(j, k)].clone();
            self[(i, k)] = lincomb(a, &x, b, &y);
            self[(j, k)] = lincomb(c, &x, d, &y);
        }
    }

    /// Replaces (col i, col j) by (a*col i + b*col j, c*col i + d*col j).
    pub fn comb_cols(&mut self, i: usize, j: usize, a: &T, b: &T, c: &T, d: &T) {
        self.comb_cols_from(i, j, a, b, c, d, 0)
    }

    /// Same as comb_cols, only for rows from `from` onwards.
    #[allow(clippy::too_many_arguments)]
    pub fn comb_cols_from(&mut self, i: usize, j: usize, a: &T, b: &T, c: &T, d: &T, from: usize) {
        assert!(i != j);
        for k in from..self.rows {
            let x = self[(k, i)].clone();
            let y = self[(k, j)].clone();
            self[(k, i)] = lincomb(a, &x, b, &y);
            self[(k, j)] = lincomb(c, &x, d, &y);
        }
    }

    pub fn mul_vec(&self, v: &[T]) -> Vec<T> {
        assert_eq!(v.len(), self.cols, "vector length mismatch");
        (0..self.rows)
            .map(|i| {
                let mut acc = T::zero();
                for (x, y) in self.row(i).iter().zip(v) {
                    if x.is_zero() {
                        continue;
                    }
                    let mut t = x.clone();
                    t *= y;
                    acc += &t;
                }
                acc
            })
            .collect()
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        self.entry(i, j)
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        self.entry_mut(i, j)
    }
}

impl<'a, T: Ring> Mul<&'a Matrix<T>> for &'a Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: &'a Matrix<T>) -> Matrix<T> {
        assert_eq!(self.cols, rhs.rows, "matrix product dimension mismatch");
        let mut res = Matrix::new(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let x = &self[(i, k)];
                if x.is_zero() {
                    continue;
                }
                for j in 0..rhs.cols {
                    let mut t = x.clone();
                    t *= &rhs[(k, j)];
                    res[(i, j)] += &t;
                }
            }
        }
        res
    }
}

impl<T: Ring> Mul<Matrix<T>> for Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: Matrix<T>) -> Matrix<T> {
        &self * &rhs
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            write!(f, "[")?;
            for (j, x) in self.row(i).iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{x}")?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
fn mat(rows: &[&[i64]]) -> Matrix<i64> {
    Matrix::from_rows(rows.iter().map(|r| r.to_vec()).collect())
}

#[test]
fn test_matrix_ops() {
    let mut m = mat(&[&[1, 2, 3], &[4, 5, 6]]);
    assert_eq!((m.rows(), m.columns()), (2, 3));
    m.swap_rows(0, 1);
    assert_eq!(m, mat(&[&[4, 5, 6], &[1, 2, 3]]));
    m.swap_cols(0, 2);
    assert_eq!(m, mat(&[&[6, 5, 4], &[3, 2, 1]]));
    m.add_row(1, 0, &-2);
    assert_eq!(m, mat(&[&[0, 1, 2], &[3, 2, 1]]));
    m.add_col(0, 2, &1);
    assert_eq!(m, mat(&[&[0, 1, 2], &[3, 2, 4]]));
    m.mult_row(0, &3);
    m.mult_col(1, &-1);
    assert_eq!(m, mat(&[&[0, -3, 6], &[3, -2, 4]]));
    assert_eq!(m.transpose(), mat(&[&[0, 3], &[-3, -2], &[6, 4]]));
    assert_eq!(m.column(2), vec![6, 4]);
    assert_eq!(m.submatrix(0, 2, 1, 3), mat(&[&[-3, 6], &[-2, 4]]));
}

#[test]
fn test_matrix_comb() {
    // Unimodular combinations are reversible.
    let orig = mat(&[&[1, 2], &[3, 4], &[5, 6]]);
    let mut m = orig.clone();
    m.comb_rows(0, 2, &2, &1, &1, &1);
    assert_eq!(m, mat(&[&[7, 10], &[3, 4], &[6, 8]]));
    m.comb_rows(0, 2, &1, &-1, &-1, &2);
    assert_eq!(m, orig);
    m.comb_cols(0, 1, &0, &1, &-1, &0);
    assert_eq!(m, mat(&[&[2, -1], &[4, -3], &[6, -5]]));
}

#[test]
fn test_matrix_product() {
    let a = mat(&[&[1, 2], &[3, 4]]);
    let b = mat(&[&[0, 1, 1], &[1, 0, -1]]);
    assert_eq!(&a * &b, mat(&[&[2, 1, -1], &[4, 3, -1]]));
    assert_eq!(a.mul_vec(&[1, -1]), vec![-1, -1]);
    assert!((&Matrix::<i64>::identity(2) * &a) == a);
    assert!(Matrix::<i64>::identity(3).is_identity());
    assert!(!a.is_identity());
    assert!(Matrix::<i64>::new(2, 0).is_zero());
    let e = Matrix::<i64>::new(2, 0);
    let f = Matrix::<i64>::new(0, 3);
    assert_eq!(&e * &f, Matrix::new(2, 3));
    assert_eq!(a.to_string(), "[1 2]\n[3 4]\n");
}
