// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Random homology testing.
//!
//! This program generates random chain complexes of the requested size
//! and checks the coordinate conversions of the resulting homology
//! groups, with integer and modular coefficients.

use std::time::Instant;

use num_traits::{One, Zero};
use rand::{Rng, SeedableRng};

use abelhom::arith::reduce_mod;
use abelhom::matrixint::{row_basis, row_basis_and_orth_comp, MatrixInt};
use abelhom::{HomMarkedAbelianGroup, Int, MarkedAbelianGroup};

fn main() {
    let arg = arguments::parse(std::env::args()).unwrap();
    if arg.get::<bool>("help").is_some() {
        eprintln!("Usage: abhom-test [OPTIONS]");
        eprintln!("");
        eprintln!("Options:");
        eprintln!("  --help                    show this help");
        eprintln!("  --size B:                 rank of the middle chain group");
        eprintln!("  --seed S:                 random seed");
        eprintln!("  --count N:                number of complexes (default: unlimited)");
        return;
    }
    let size = arg.get::<usize>("size").unwrap_or(8);
    let seed = arg.get::<u64>("seed").unwrap_or(0);
    let count = arg.get::<usize>("count");
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let t0 = Instant::now();
    let mut i = 0;
    while count.map_or(true, |c| i < c) {
        let a = rng.gen_range(1..=size);
        let c = rng.gen_range(1..=size);
        let (m, n) = random_complex(&mut rng, c, size, a);
        for p in [0, 2, 3, 4, 6, 9] {
            let p = Int::from(p);
            let g = MarkedAbelianGroup::with_coefficients(m.clone(), n.clone(), p.clone())
                .expect("shapes are compatible");
            if let Err(msg) = check_group(&g, &mut rng) {
                eprintln!("ERROR coefficients {p}: {msg}");
                eprintln!("M=\n{m}N=\n{n}");
                std::process::exit(1);
            }
        }
        i += 1;
        let elapsed = t0.elapsed().as_secs_f64();
        if i % 100 == 0 {
            let avg = elapsed / (i as f64) * 1000.;
            eprintln!("Checked {i} complexes in {elapsed:.3}s (average {avg:.3}ms)");
        }
    }
}

// A chain complex Z^a --N--> Z^b --M--> Z^c with M N = 0:
// the rows of M are combinations of the orthogonal complement
// of the columns of N.
fn random_complex(rng: &mut impl Rng, c: usize, b: usize, a: usize) -> (MatrixInt, MatrixInt) {
    let mut n = MatrixInt::new(b, a);
    for i in 0..b {
        for j in 0..a {
            if rng.gen_bool(0.4) {
                n[(i, j)] = Int::from(rng.gen_range(-6..=6));
            }
        }
    }
    let mut nt = n.transpose();
    let (rank, comp) = row_basis_and_orth_comp(&mut nt);
    let kernel = comp.submatrix(rank, b, 0, b);
    let mut coeffs = MatrixInt::new(c, b - rank);
    for i in 0..c {
        for j in 0..b - rank {
            if rng.gen_bool(0.5) {
                coeffs[(i, j)] = Int::from(rng.gen_range(-3..=3));
            }
        }
    }
    (&coeffs * &kernel, n)
}

fn check_group(g: &MarkedAbelianGroup, rng: &mut impl Rng) -> Result<(), String> {
    if !g.is_chain_complex() {
        return Err("M N is not zero".into());
    }
    let p = g.coefficients().clone();
    let k = g.snf_rank();
    for j in 0..k {
        let v = g.cc_rep_generator(j).map_err(|e| e.to_string())?;
        if !g.is_cycle(&v) {
            return Err(format!("generator {j} is not a cycle"));
        }
        let s = g.snf_rep(&v).map_err(|e| e.to_string())?;
        if s.iter().enumerate().any(|(i, x)| *x != Int::from((i == j) as i64)) {
            return Err(format!("generator {j} has coordinates {s:?}"));
        }
        if j < g.count_invariant_factors() {
            let d = g.invariant_factor(j);
            let dv: Vec<Int> = v.iter().map(|x| x * d).collect();
            let w = g.as_boundary(&dv).map_err(|e| format!("generator {j}: {e}"))?;
            let nw = g.n().mul_vec(&w);
            if nw.iter().zip(&dv).any(|(x, y)| !reduce_mod(&(x - y), &p).is_zero()) {
                return Err(format!("as_boundary of {d} times generator {j}"));
            }
        }
    }
    // Random boundaries have zero coordinates.
    let x: Vec<Int> = (0..g.n().columns())
        .map(|_| Int::from(rng.gen_range(-5..=5)))
        .collect();
    if !g.is_boundary(&g.n().mul_vec(&x)) {
        return Err("image of N is not a boundary".into());
    }
    if p.is_zero() {
        let mut m = g.m().clone();
        let mut nt = g.n().transpose();
        let rank = g.cc_rank() - row_basis(&mut m) - row_basis(&mut nt);
        if g.rank() != rank {
            return Err(format!("rank {} instead of {rank}", g.rank()));
        }
    }
    // Multiplication by an invertible scalar is an automorphism.
    let u = if p.is_zero() { Int::from(-1) } else { &p - Int::one() };
    let b = g.cc_rank();
    let f = MatrixInt::diagonal(b, b, &vec![u.clone(); b]);
    let hom = HomMarkedAbelianGroup::new(g.clone(), g.clone(), f).map_err(|e| e.to_string())?;
    if !hom.is_isomorphism() {
        return Err(format!("multiplication by {u} is not an isomorphism: {hom}"));
    }
    if !(&hom.inverse_hom() * &hom).is_identity() {
        return Err(format!("inverse of multiplication by {u}"));
    }
    Ok(())
}
