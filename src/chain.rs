// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Finite chain complexes of free abelian groups.
//!
//! A complex 0 → C_n → … → C_1 → C_0 → 0 is given by its boundary
//! matrices d_k : C_k → C_{k-1}, of size dim C_{k-1} × dim C_k.
//!
//! The text format lists boundary matrices as blocks:
//!
//! ```text
//! # RP^2
//! d 1 1 1
//! 0
//! d 2 1 1
//! 2
//! ```
//!
//! A block starts with `d K ROWS COLS` followed by ROWS lines of COLS
//! integers. Lines starting with `#` and blank lines are ignored.

use std::path::Path;
use std::str::FromStr;

use rayon::prelude::*;

use crate::abelian::AbelianGroup;
use crate::marked::MarkedAbelianGroup;
use crate::matrixint::MatrixInt;
use crate::{Error, Int, Preferences, Result, Verbosity};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainComplex {
    // boundaries[k - 1] is d_k
    boundaries: Vec<MatrixInt>,
}

impl ChainComplex {
    /// Builds a complex from d_1, d_2, …, checking that consecutive
    /// matrices have compatible shapes and compose to zero.
    pub fn new(boundaries: Vec<MatrixInt>) -> Result<Self> {
        if boundaries.is_empty() {
            return Err(Error::invalid("a chain complex needs at least one boundary map"));
        }
        let c = ChainComplex { boundaries };
        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        for (i, w) in self.boundaries.windows(2).enumerate() {
            let k = i + 1;
            if w[0].columns() != w[1].rows() {
                return Err(Error::invalid(format!(
                    "d_{k} has {} columns but d_{} has {} rows",
                    w[0].columns(),
                    k + 1,
                    w[1].rows()
                )));
            }
            if !(&w[0] * &w[1]).is_zero() {
                return Err(Error::invalid(format!("d_{k} d_{} is not zero", k + 1)));
            }
        }
        Ok(())
    }

    /// Highest degree with a nonzero chain group.
    pub fn top_degree(&self) -> usize {
        self.boundaries.len()
    }

    /// Rank of the chain group C_k.
    pub fn dimension(&self, k: usize) -> usize {
        match k {
            0 => self.boundaries[0].rows(),
            k if k <= self.boundaries.len() => self.boundaries[k - 1].columns(),
            _ => 0,
        }
    }

    /// The boundary map d_k, for 1 ≤ k ≤ top degree.
    pub fn boundary(&self, k: usize) -> Option<&MatrixInt> {
        if k == 0 {
            return None;
        }
        self.boundaries.get(k - 1)
    }

    /// The homology group in degree k, as ker d_k / img d_{k+1},
    /// with coefficients ℤ_p (p = 0 meaning ℤ).
    pub fn marked_group(&self, k: usize, p: &Int) -> Result<MarkedAbelianGroup> {
        if k > self.top_degree() {
            return Err(Error::invalid(format!(
                "degree {k} exceeds top degree {}",
                self.top_degree()
            )));
        }
        let dim = self.dimension(k);
        let m = match self.boundary(k) {
            Some(d) => d.clone(),
            None => MatrixInt::new(1, dim),
        };
        let n = match self.boundary(k + 1) {
            Some(d) => d.clone(),
            None => MatrixInt::new(dim, 1),
        };
        MarkedAbelianGroup::with_coefficients(m, n, p.clone())
    }

    pub fn homology(&self, k: usize, p: &Int) -> Result<AbelianGroup> {
        Ok(self.marked_group(k, p)?.unmarked())
    }

    /// Homology groups in every degree, computed in parallel if a
    /// thread pool is given.
    pub fn all_homology(
        &self,
        prefs: &Preferences,
        tpool: Option<&rayon::ThreadPool>,
    ) -> Result<Vec<MarkedAbelianGroup>> {
        let p = prefs.modulus();
        let degrees: Vec<usize> = (0..=self.top_degree()).collect();
        let compute = |&k: &usize| {
            let g = self.marked_group(k, &p);
            if prefs.verbose(Verbosity::Verbose) {
                if let Ok(g) = &g {
                    eprintln!("H_{k}: computed {g} (chain rank {})", g.cc_rank());
                }
            }
            g
        };
        if let Some(pool) = tpool {
            pool.install(|| degrees.par_iter().map(compute).collect())
        } else {
            degrees.iter().map(compute).collect()
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        text.parse()
    }
}

fn parse_err(line: usize, msg: impl Into<String>) -> Error {
    Error::Parse {
        line,
        msg: msg.into(),
    }
}

impl FromStr for ChainComplex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut lines = s
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));
        let mut blocks: Vec<(usize, MatrixInt)> = vec![];
        while let Some((lineno, header)) = lines.next() {
            let words: Vec<&str> = header.split_whitespace().collect();
            if words.len() != 4 || words[0] != "d" {
                return Err(parse_err(lineno, "expected 'd K ROWS COLS'"));
            }
            let mut nums = [0usize; 3];
            for (x, w) in nums.iter_mut().zip(&words[1..]) {
                *x = w
                    .parse()
                    .map_err(|_| parse_err(lineno, format!("invalid number {w}")))?;
            }
            let [k, rows, cols] = nums;
            if k == 0 {
                return Err(parse_err(lineno, "boundary degrees start at 1"));
            }
            if blocks.iter().any(|(j, _)| *j == k) {
                return Err(parse_err(lineno, format!("duplicate boundary map d {k}")));
            }
            let mut m = MatrixInt::new(rows, cols);
            for i in 0..rows {
                let Some((rowno, row)) = lines.next() else {
                    return Err(parse_err(lineno, format!("d {k}: missing row {i}")));
                };
                let entries: Vec<&str> = row.split_whitespace().collect();
                if entries.len() != cols {
                    return Err(parse_err(
                        rowno,
                        format!("expected {cols} entries, got {}", entries.len()),
                    ));
                }
                for (j, e) in entries.into_iter().enumerate() {
                    m[(i, j)] = Int::from_str(e)
                        .map_err(|_| parse_err(rowno, format!("invalid integer {e}")))?;
                }
            }
            blocks.push((k, m));
        }
        blocks.sort_by_key(|(k, _)| *k);
        let end = s.lines().count();
        for (i, (k, _)) in blocks.iter().enumerate() {
            if *k != i + 1 {
                return Err(parse_err(end, format!("boundary map d {} is missing", i + 1)));
            }
        }
        ChainComplex::new(blocks.into_iter().map(|(_, m)| m).collect())
    }
}

#[cfg(test)]
use crate::matrixint::mat;

#[test]
fn test_projective_plane() {
    let c = ChainComplex::new(vec![mat(&[&[0]]), mat(&[&[2]])]).unwrap();
    assert_eq!(c.top_degree(), 2);
    assert_eq!(c.dimension(0), 1);
    assert_eq!(c.dimension(2), 1);
    let z = Int::from(0);
    assert!(c.homology(0, &z).unwrap().is_z());
    assert!(c.homology(1, &z).unwrap().is_z_n(&Int::from(2)));
    assert!(c.homology(2, &z).unwrap().is_trivial());
    let two = Int::from(2);
    for k in 0..=2 {
        assert!(c.homology(k, &two).unwrap().is_z_n(&two), "degree {k}");
    }
    let three = Int::from(3);
    assert!(c.homology(0, &three).unwrap().is_z_n(&three));
    assert!(c.homology(1, &three).unwrap().is_trivial());
    assert!(c.homology(3, &z).is_err());
}

#[test]
fn test_torus() {
    // One vertex, three edges a, b, c and two triangles.
    let d1 = mat(&[&[0, 0, 0]]);
    let d2 = mat(&[&[1, -1], &[1, -1], &[-1, 1]]);
    let c = ChainComplex::new(vec![d1, d2]).unwrap();
    let mut prefs = Preferences::default();
    prefs.verbosity = Verbosity::Silent;
    let h = c.all_homology(&prefs, None).unwrap();
    let ranks: Vec<usize> = h.iter().map(|g| g.rank()).collect();
    assert_eq!(ranks, vec![1, 2, 1]);
    assert!(h.iter().all(|g| g.count_invariant_factors() == 0));

    let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
    let hp = c.all_homology(&prefs, Some(&pool)).unwrap();
    let same = h.iter().zip(&hp).all(|(a, b)| a.is_isomorphic_to(b));
    assert!(same);
}

#[test]
fn test_parse() {
    let text = "# RP^2\n\nd 2 1 1\n2\nd 1 1 1\n0\n";
    let c: ChainComplex = text.parse().unwrap();
    assert_eq!(c, ChainComplex::new(vec![mat(&[&[0]]), mat(&[&[2]])]).unwrap());
    assert_eq!(c.boundary(2), Some(&mat(&[&[2]])));
    assert_eq!(c.boundary(0), None);

    let err = |s: &str| s.parse::<ChainComplex>().unwrap_err();
    assert!(matches!(err("d 1 1 2\n1 2 3\n"), Error::Parse { line: 2, .. }));
    assert!(matches!(err("x 1 1 1\n0\n"), Error::Parse { line: 1, .. }));
    assert!(matches!(err("d 1 1 1\nz\n"), Error::Parse { line: 2, .. }));
    assert!(matches!(err("d 1 2 1\n1\n"), Error::Parse { line: 1, .. }));
    // Missing blocks are reported at the end of input.
    assert!(matches!(err("d 2 1 1\n0\n"), Error::Parse { line: 2, .. }));
    assert!(matches!(err("d 1 1 1\n0\n\nd 3 1 1\n0\n"), Error::Parse { line: 5, .. }));
    // d_1 d_2 must vanish.
    assert!(matches!(err("d 1 1 1\n1\nd 2 1 1\n1\n"), Error::InvalidArgument(_)));
    assert!(matches!(err(""), Error::InvalidArgument(_)));
}
