// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Homomorphisms between homology groups.
//!
//! A homomorphism is given by a chain-level matrix (mapping chains of
//! the domain to chains of the codomain) or by its reduced matrix,
//! which acts on Smith normal form coordinates. Either representation
//! is derived from the other when needed, and kernel, cokernel and
//! image are computed lazily from the reduced matrix.

use std::cell::OnceCell;
use std::fmt;
use std::ops::Mul;

use num_traits::Zero;

use crate::abelian::AbelianGroup;
use crate::arith::reduce_mod;
use crate::marked::MarkedAbelianGroup;
use crate::matrixint::{
    column_echelon_form, metrical_smith_normal_form_with_bases, pre_image_of_lattice,
    torsion_aut_inverse, MatrixInt,
};
use crate::{Error, Int, Result};

#[derive(Clone, Debug)]
pub struct HomMarkedAbelianGroup {
    domain: MarkedAbelianGroup,
    codomain: MarkedAbelianGroup,
    matrix: MatrixInt,
    reduced_matrix: OnceCell<MatrixInt>,
    reduced_kernel_lattice: OnceCell<MatrixInt>,
    kernel: OnceCell<AbelianGroup>,
    cokernel: OnceCell<AbelianGroup>,
    image: OnceCell<AbelianGroup>,
}

impl HomMarkedAbelianGroup {
    /// A homomorphism defined by a chain-level matrix, with one row per
    /// chain coordinate of the codomain and one column per chain
    /// coordinate of the domain. The matrix must map cycles to cycles,
    /// and should map boundaries to boundaries.
    pub fn new(
        domain: MarkedAbelianGroup,
        codomain: MarkedAbelianGroup,
        matrix: MatrixInt,
    ) -> Result<Self> {
        if matrix.rows() != codomain.cc_rank() || matrix.columns() != domain.cc_rank() {
            return Err(Error::invalid(format!(
                "matrix is {}x{}, expected {}x{}",
                matrix.rows(),
                matrix.columns(),
                codomain.cc_rank(),
                domain.cc_rank()
            )));
        }
        let hom = Self::from_parts(domain, codomain, matrix);
        if !hom.is_cycle_map() {
            return Err(Error::invalid("matrix does not map cycles to cycles"));
        }
        Ok(hom)
    }

    pub(crate) fn from_parts(
        domain: MarkedAbelianGroup,
        codomain: MarkedAbelianGroup,
        matrix: MatrixInt,
    ) -> Self {
        HomMarkedAbelianGroup {
            domain,
            codomain,
            matrix,
            reduced_matrix: OnceCell::new(),
            reduced_kernel_lattice: OnceCell::new(),
            kernel: OnceCell::new(),
            cokernel: OnceCell::new(),
            image: OnceCell::new(),
        }
    }

    /// A homomorphism defined by its action on Smith normal form
    /// coordinates. A chain-level matrix is built by undoing the
    /// changes of basis used to compute both groups.
    pub fn from_reduced_matrix(
        reduced: MatrixInt,
        domain: MarkedAbelianGroup,
        codomain: MarkedAbelianGroup,
    ) -> Result<Self> {
        if reduced.rows() != codomain.snf_rank() || reduced.columns() != domain.snf_rank() {
            return Err(Error::invalid(format!(
                "reduced matrix is {}x{}, expected {}x{}",
                reduced.rows(),
                reduced.columns(),
                codomain.snf_rank(),
                domain.snf_rank()
            )));
        }
        let matrix = chain_matrix(&reduced, &domain, &codomain);
        let hom = Self::from_parts(domain, codomain, matrix);
        let _ = hom.reduced_matrix.set(reduced);
        Ok(hom)
    }

    pub fn domain(&self) -> &MarkedAbelianGroup {
        &self.domain
    }

    pub fn codomain(&self) -> &MarkedAbelianGroup {
        &self.codomain
    }

    /// The chain-level matrix.
    pub fn defining_matrix(&self) -> &MatrixInt {
        &self.matrix
    }

    /// The matrix of the homomorphism in Smith normal form coordinates,
    /// torsion coordinates first.
    pub fn reduced_matrix(&self) -> &MatrixInt {
        self.reduced_matrix
            .get_or_init(|| self.compute_reduced_matrix())
    }

    // Every constructor guarantees that cycles are mapped to cycles,
    // so snf_rep cannot fail here.
    fn compute_reduced_matrix(&self) -> MatrixInt {
        let (dom, cod) = (&self.domain, &self.codomain);
        let mut red = MatrixInt::new(cod.snf_rank(), dom.snf_rank());
        for j in 0..dom.snf_rank() {
            let v = self.matrix.mul_vec(&dom.cc_rep_generator_unchecked(j));
            match cod.snf_rep(&v) {
                Ok(col) => {
                    for (i, x) in col.into_iter().enumerate() {
                        red[(i, j)] = x;
                    }
                }
                Err(e) => unreachable!("generator {j} is not mapped to a cycle: {e}"),
            }
        }
        red
    }

    /// A basis (as columns) of the preimage under the reduced matrix
    /// of the lattice spanned by the codomain relations.
    pub fn reduced_kernel_lattice(&self) -> &MatrixInt {
        self.reduced_kernel_lattice.get_or_init(|| {
            let cod = &self.codomain;
            let mut moduli = cod.invariant_factors().to_vec();
            moduli.resize(cod.snf_rank(), Int::zero());
            pre_image_of_lattice(self.reduced_matrix(), &moduli)
        })
    }

    pub fn kernel(&self) -> &AbelianGroup {
        self.kernel.get_or_init(|| {
            let lattice = self.reduced_kernel_lattice();
            let inv = self.domain.invariant_factors();
            let q = lattice.columns();
            // Express the domain relations in the basis of the lattice.
            let mut snf = lattice.clone();
            let basis = metrical_smith_normal_form_with_bases(&mut snf);
            let mut work = MatrixInt::new(q, inv.len());
            for i in 0..q {
                for (j, d) in inv.iter().enumerate() {
                    let mut acc = Int::zero();
                    for k in 0..q {
                        if snf[(k, k)].is_zero() {
                            continue;
                        }
                        acc += d * &basis.row[(i, k)] * &basis.col[(k, j)] / &snf[(k, k)];
                    }
                    work[(i, j)] = acc;
                }
            }
            MarkedAbelianGroup::build(MatrixInt::new(1, q), work, Int::zero()).unmarked()
        })
    }

    pub fn cokernel(&self) -> &AbelianGroup {
        self.cokernel.get_or_init(|| {
            let red = self.reduced_matrix();
            let inv = self.codomain.invariant_factors();
            let mut rel = MatrixInt::new(red.rows(), red.columns() + inv.len());
            rel.set_block(0, 0, red);
            for (i, d) in inv.iter().enumerate() {
                rel[(i, red.columns() + i)] = d.clone();
            }
            MarkedAbelianGroup::build(MatrixInt::new(1, red.rows()), rel, Int::zero()).unmarked()
        })
    }

    pub fn image(&self) -> &AbelianGroup {
        self.image.get_or_init(|| {
            let lattice = self.reduced_kernel_lattice();
            let inv = self.domain.invariant_factors();
            let n = lattice.rows();
            let mut rel = MatrixInt::new(n, inv.len() + lattice.columns());
            for (i, d) in inv.iter().enumerate() {
                rel[(i, i)] = d.clone();
            }
            rel.set_block(0, inv.len(), lattice);
            MarkedAbelianGroup::build(MatrixInt::new(1, n), rel, Int::zero()).unmarked()
        })
    }

    pub fn is_monic(&self) -> bool {
        self.kernel().is_trivial()
    }

    pub fn is_epic(&self) -> bool {
        self.cokernel().is_trivial()
    }

    pub fn is_isomorphism(&self) -> bool {
        self.is_monic() && self.is_epic()
    }

    /// Whether every column of the reduced matrix vanishes modulo the
    /// invariant factors of the codomain.
    pub fn is_zero(&self) -> bool {
        let red = self.reduced_matrix();
        let inv = self.codomain.invariant_factors();
        (0..red.rows()).all(|i| {
            let d = inv.get(i);
            (0..red.columns()).all(|j| match d {
                Some(d) => reduce_mod(&red[(i, j)], d).is_zero(),
                None => red[(i, j)].is_zero(),
            })
        })
    }

    /// Whether the homomorphism is the identity of a group defined
    /// by a single chain complex.
    pub fn is_identity(&self) -> bool {
        self.domain.equal_to(&self.codomain) && self.reduced_matrix().is_identity()
    }

    /// Whether cycles of the domain are sent to cycles of the codomain.
    pub fn is_cycle_map(&self) -> bool {
        (0..self.domain.cycle_rank()).all(|j| match self.domain.cycle_gen(j) {
            Ok(v) => self.codomain.is_cycle(&self.matrix.mul_vec(&v)),
            Err(_) => false,
        })
    }

    /// Whether this map and `other`, a map between the groups of the
    /// previous degree, form a commutative square:
    /// the M matrices here are the N matrices of `other`, and
    /// `M_cod · self = other · M_dom`.
    pub fn is_chain_map(&self, other: &HomMarkedAbelianGroup) -> bool {
        if self.codomain.m() != other.codomain.n() || self.domain.m() != other.domain.n() {
            return false;
        }
        let lhs = self.codomain.m() * &self.matrix;
        let rhs = &other.matrix * self.domain.m();
        lhs == rhs
    }

    /// Image of a chain of the domain.
    pub fn eval_cc(&self, v: &[Int]) -> Result<Vec<Int>> {
        if v.len() != self.matrix.columns() {
            return Err(Error::invalid(format!(
                "expected a chain of length {}, got {}",
                self.matrix.columns(),
                v.len()
            )));
        }
        Ok(self.matrix.mul_vec(v))
    }

    /// Image of an element given by its Smith normal form coordinates.
    pub fn eval_snf(&self, v: &[Int]) -> Result<Vec<Int>> {
        let red = self.reduced_matrix();
        if v.len() != red.columns() {
            return Err(Error::invalid(format!(
                "expected {} Smith normal form coordinates, got {}",
                red.columns(),
                v.len()
            )));
        }
        let mut w = red.mul_vec(v);
        for (x, d) in w.iter_mut().zip(self.codomain.invariant_factors()) {
            *x = reduce_mod(x, d);
        }
        Ok(w)
    }

    /// The composition `self ∘ other`.
    pub fn compose(&self, other: &HomMarkedAbelianGroup) -> HomMarkedAbelianGroup {
        assert_eq!(
            self.matrix.columns(),
            other.matrix.rows(),
            "incompatible homomorphisms"
        );
        Self::from_parts(
            other.domain.clone(),
            self.codomain.clone(),
            &self.matrix * &other.matrix,
        )
    }

    /// The inverse isomorphism, or the zero map (from the codomain to
    /// the domain) if this is not an isomorphism.
    pub fn inverse_hom(&self) -> HomMarkedAbelianGroup {
        let (dom, cod) = (&self.domain, &self.codomain);
        let red = self.reduced_matrix();
        let mut inv_mat = MatrixInt::new(red.columns(), red.rows());
        if self.is_isomorphism() {
            let t = dom.count_invariant_factors();
            let r = dom.rank();
            let a = red.submatrix(0, t, 0, t);
            let b = red.submatrix(0, t, t, t + r);
            let mut d = red.submatrix(t, t + r, t, t + r);
            let mut di = MatrixInt::identity(r);
            let rows: Vec<usize> = (0..r).collect();
            column_echelon_form(&mut d, &mut di, None, &rows);
            let ai = torsion_aut_inverse(&a, dom.invariant_factors());
            let mut bd = &b * &di;
            bd.negate();
            let mut bi = &ai * &bd;
            for i in 0..t {
                let f = dom.invariant_factor(i);
                for j in 0..r {
                    bi[(i, j)] = reduce_mod(&bi[(i, j)], f);
                }
            }
            inv_mat.set_block(0, 0, &ai);
            inv_mat.set_block(0, t, &bi);
            inv_mat.set_block(t, t, &di);
        }
        let matrix = chain_matrix(&inv_mat, cod, dom);
        let hom = Self::from_parts(cod.clone(), dom.clone(), matrix);
        let _ = hom.reduced_matrix.set(inv_mat);
        hom
    }

    /// The induced map between torsion subgroups.
    pub fn torsion_subgroup(&self) -> HomMarkedAbelianGroup {
        let (dom, cod) = (&self.domain, &self.codomain);
        let mut mat = MatrixInt::new(cod.count_invariant_factors(), dom.count_invariant_factors());
        let red = self.reduced_matrix();
        for i in 0..mat.rows() {
            for j in 0..mat.columns() {
                mat[(i, j)] = red[(i, j)].clone();
            }
        }
        let (tdom, tcod) = (dom.torsion_subgroup(), cod.torsion_subgroup());
        // Chain coordinates of torsion subgroups are their Smith
        // normal form coordinates.
        let matrix = chain_matrix(&mat, &tdom, &tcod);
        Self::from_parts(tdom, tcod, matrix)
    }

    /// A multi-line description including the reduced matrix.
    pub fn describe(&self) -> String {
        let mut s = format!("Hom: {} --> {}\n", self.domain, self.codomain);
        if self.is_isomorphism() {
            s += "Isomorphism\n";
        } else if self.is_zero() {
            s += "Zero map\n";
        } else if self.is_monic() {
            s += &format!("Monic, cokernel: {}\n", self.cokernel());
        } else if self.is_epic() {
            s += &format!("Epic, kernel: {}\n", self.kernel());
        } else {
            s += &format!("Kernel: {}\n", self.kernel());
            s += &format!("Cokernel: {}\n", self.cokernel());
            s += &format!("Image: {}\n", self.image());
        }
        s += "Reduced matrix (torsion coordinates first):\n";
        s += &self.reduced_matrix().to_string();
        s
    }
}

// Lifts a reduced matrix to chain coordinates:
// diagonal presentation, then (ker M) ⊗ ℤ_p coordinates for ℤ_p
// coefficients, then chain coordinates.
fn chain_matrix(
    reduced: &MatrixInt,
    dom: &MarkedAbelianGroup,
    cod: &MarkedAbelianGroup,
) -> MatrixInt {
    let cod_ci = &cod.pres_basis.col_inv;
    let dom_c = &dom.pres_basis.col;
    let lift = cod_ci.submatrix(0, cod_ci.rows(), cod.if_loc, cod_ci.columns());
    let proj = dom_c.submatrix(dom.if_loc, dom_c.rows(), 0, dom_c.columns());
    let step1 = &(&lift * reduced) * &proj;

    let left = tensor_lift(cod, false);
    let right = tensor_lift(dom, true);
    let mut step2 = &(&left * &step1) * &right;
    // TOR cycles are multiples of p / gcd(p, s).
    for (i, s) in cod.tor_vec.iter().enumerate() {
        let scale = &cod.coeff / crate::arith::gcd(&cod.coeff, s);
        step2.mult_row(i, &scale);
    }
    for (j, s) in dom.tor_vec.iter().enumerate() {
        let scale = &dom.coeff / crate::arith::gcd(&dom.coeff, s);
        for i in 0..step2.rows() {
            step2[(i, j)] = &step2[(i, j)] / &scale;
        }
    }

    let cod_r = &cod.m_basis.row;
    let dom_ri = &dom.m_basis.row_inv;
    let up = cod_r.submatrix(0, cod_r.rows(), cod.tor_loc, cod_r.columns());
    let down = dom_ri.submatrix(dom.tor_loc, dom_ri.rows(), 0, dom_ri.columns());
    &(&up * &step2) * &down
}

// Block diagonal change of basis between diagonal presentation
// coordinates and (ker M) ⊗ ℤ_p coordinates: identity on TOR
// coordinates, truncated tensor bases elsewhere. Identity for
// integer coefficients.
fn tensor_lift(g: &MarkedAbelianGroup, domain: bool) -> MatrixInt {
    let k = g.pres_basis.col.rows();
    if g.coeff.is_zero() {
        return MatrixInt::identity(k);
    }
    let t = g.tor_vec.len();
    let rows = g.tensor_basis.col.rows();
    if domain {
        let c = &g.tensor_basis.col;
        let mut out = MatrixInt::new(k, t + rows);
        out.set_block(0, 0, &MatrixInt::identity(t));
        out.set_block(t, t, &c.submatrix(g.tensor_if_loc, rows, 0, rows));
        out
    } else {
        let ci = &g.tensor_basis.col_inv;
        let mut out = MatrixInt::new(t + rows, k);
        out.set_block(0, 0, &MatrixInt::identity(t));
        out.set_block(t, t, &ci.submatrix(0, rows, g.tensor_if_loc, rows));
        out
    }
}

impl<'a> Mul for &'a HomMarkedAbelianGroup {
    type Output = HomMarkedAbelianGroup;

    fn mul(self, other: Self) -> HomMarkedAbelianGroup {
        self.compose(other)
    }
}

impl fmt::Display for HomMarkedAbelianGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_isomorphism() {
            write!(f, "isomorphism")
        } else if self.is_zero() {
            write!(f, "zero map")
        } else if self.is_monic() {
            write!(f, "monic, with cokernel {}", self.cokernel())
        } else if self.is_epic() {
            write!(f, "epic, with kernel {}", self.kernel())
        } else {
            write!(
                f,
                "kernel {} | cokernel {} | image {}",
                self.kernel(),
                self.cokernel(),
                self.image()
            )
        }
    }
}

#[cfg(test)]
use crate::matrixint::mat;

#[cfg(test)]
fn ints(v: &[i64]) -> Vec<Int> {
    v.iter().map(|&x| Int::from(x)).collect()
}

// Z^rank with trivial boundaries.
#[cfg(test)]
fn free_group(rank: usize) -> MarkedAbelianGroup {
    MarkedAbelianGroup::new(MatrixInt::new(1, rank), MatrixInt::new(rank, 1)).unwrap()
}

#[test]
fn test_hom_multiplication() {
    let z = free_group(1);
    let f = HomMarkedAbelianGroup::new(z.clone(), z.clone(), mat(&[&[2]])).unwrap();
    assert_eq!(f.reduced_matrix(), &mat(&[&[2]]));
    assert!(f.kernel().is_trivial());
    assert!(f.cokernel().is_z_n(&Int::from(2)));
    assert!(f.image().is_z());
    assert!(f.is_monic());
    assert!(!f.is_epic());
    assert!(!f.is_zero());
    assert!(!f.is_identity());
    assert!(f.is_cycle_map());
    assert_eq!(f.to_string(), "monic, with cokernel Z_2");
    assert_eq!(f.eval_cc(&ints(&[3])).unwrap(), ints(&[6]));
    assert!(f.eval_cc(&ints(&[3, 1])).is_err());

    // The inverse of a non-isomorphism is zero.
    let g = f.inverse_hom();
    assert!(g.reduced_matrix().is_zero());
    assert!(HomMarkedAbelianGroup::new(z.clone(), z, mat(&[&[1, 1]])).is_err());
}

#[test]
fn test_hom_kernel_image() {
    // Z^2 -> Z^2, (x, y) -> (x + y, 2x + 2y)
    let z2 = free_group(2);
    let f = HomMarkedAbelianGroup::new(z2.clone(), z2, mat(&[&[1, 1], &[2, 2]])).unwrap();
    assert!(f.kernel().is_z());
    assert!(f.image().is_z());
    assert!(f.cokernel().is_z());
    assert_eq!(f.to_string(), "kernel Z | cokernel Z | image Z");
    assert_eq!(f.reduced_kernel_lattice().columns(), 1);

    // Z_6 -> Z_6, x -> 2x: kernel Z_2, image Z_3.
    let z6 = MarkedAbelianGroup::new(MatrixInt::new(1, 1), mat(&[&[6]])).unwrap();
    let g = HomMarkedAbelianGroup::new(z6.clone(), z6.clone(), mat(&[&[2]])).unwrap();
    assert!(g.kernel().is_z_n(&Int::from(2)));
    assert!(g.image().is_z_n(&Int::from(3)));
    assert!(g.cokernel().is_z_n(&Int::from(2)));
    assert_eq!(g.eval_snf(&ints(&[5])).unwrap(), ints(&[4]));

    // x -> 6x is zero on Z_6.
    let h = HomMarkedAbelianGroup::new(z6.clone(), z6, mat(&[&[6]])).unwrap();
    assert!(h.is_zero());
    assert_eq!(h.to_string(), "zero map");
}

#[test]
fn test_hom_inverse() {
    // Z_2 + Z with the automorphism (x, y) -> (x + y, y).
    let g = MarkedAbelianGroup::new(MatrixInt::new(1, 2), mat(&[&[2], &[0]])).unwrap();
    assert_eq!(g.to_string(), "Z + Z_2");
    let f = HomMarkedAbelianGroup::new(g.clone(), g.clone(), mat(&[&[1, 1], &[0, 1]])).unwrap();
    assert!(f.is_isomorphism());
    assert_eq!(f.to_string(), "isomorphism");
    let fi = f.inverse_hom();
    assert!((&fi * &f).is_identity());
    assert!((&f * &fi).is_identity());

    // Z_6 + Z, (x, y) -> (5x + 3y, -y)
    let g = MarkedAbelianGroup::new(MatrixInt::new(1, 2), mat(&[&[6], &[0]])).unwrap();
    let f = HomMarkedAbelianGroup::new(g.clone(), g, mat(&[&[5, 3], &[0, -1]])).unwrap();
    assert!(f.is_isomorphism());
    let fi = f.inverse_hom();
    assert!((&fi * &f).is_identity());
    let x = ints(&[1, 2]);
    let y = f.eval_snf(&x).unwrap();
    assert_eq!(fi.eval_snf(&y).unwrap(), x);
}

#[test]
fn test_hom_from_reduced_matrix() {
    // H_1 of a chain complex with a nontrivial change of basis.
    let m = mat(&[&[1, -1, 0]]);
    let n = mat(&[&[3], &[3], &[6]]);
    let g = MarkedAbelianGroup::new(m, n).unwrap();
    assert_eq!(g.to_string(), "Z + Z_3");
    let red = mat(&[&[2, 1], &[0, 1]]);
    let f = HomMarkedAbelianGroup::from_reduced_matrix(red.clone(), g.clone(), g.clone()).unwrap();
    assert!(f.is_cycle_map());
    // Recomputing from the chain-level matrix gives the same action.
    let f2 = HomMarkedAbelianGroup::new(g.clone(), g.clone(), f.defining_matrix().clone()).unwrap();
    assert_eq!(f2.reduced_matrix(), &red);
    assert!(f2.is_isomorphism());
    assert!(HomMarkedAbelianGroup::from_reduced_matrix(mat(&[&[1]]), g.clone(), g).is_err());
}

#[test]
fn test_hom_chain_map() {
    // Identity maps on 0 -> Z --2--> Z -> 0, in degrees 1 and 0.
    let d = mat(&[&[2]]);
    let h1 = MarkedAbelianGroup::new(d.clone(), MatrixInt::new(1, 1)).unwrap();
    let h0 = MarkedAbelianGroup::new(MatrixInt::new(1, 1), d).unwrap();
    let f1 = HomMarkedAbelianGroup::new(h1.clone(), h1, mat(&[&[1]])).unwrap();
    let f0 = HomMarkedAbelianGroup::new(h0.clone(), h0, mat(&[&[1]])).unwrap();
    assert!(f1.is_chain_map(&f0));
    assert!(f0.is_identity());
    let f1x = HomMarkedAbelianGroup::new(f1.domain().clone(), f1.codomain().clone(), mat(&[&[3]])).unwrap();
    assert!(!f1x.is_chain_map(&f0));
    let f0x = HomMarkedAbelianGroup::new(f0.domain().clone(), f0.codomain().clone(), mat(&[&[3]])).unwrap();
    assert!(!f1.is_chain_map(&f0x));
    assert!(!f0.is_chain_map(&f0x));
    assert!(f0.torsion_subgroup().is_identity());
}

#[test]
fn test_hom_describe() {
    let z6 = MarkedAbelianGroup::new(MatrixInt::new(1, 1), mat(&[&[6]])).unwrap();
    let g = HomMarkedAbelianGroup::new(z6.clone(), z6, mat(&[&[2]])).unwrap();
    let s = g.describe();
    assert!(s.starts_with("Hom: Z_6 --> Z_6\nKernel: Z_2\n"));
    assert!(s.ends_with("[2]\n"));
}

#[test]
fn test_hom_inverse_mod_p() {
    use crate::arith::LargeInteger;
    // Z^2 --(2 0)--> Z with boundaries (0, 3), coefficients Z_6:
    // the cycle 3e_1 comes from 2-torsion of M, and Z_6 e_2 / 3 gives Z_3.
    let six = Int::from(6);
    let m = mat(&[&[2, 0]]);
    let n = mat(&[&[0], &[3]]);
    let g = MarkedAbelianGroup::with_coefficients(m, n, six.clone()).unwrap();
    assert_eq!(g.unmarked().order(), LargeInteger::from(6));
    let f = HomMarkedAbelianGroup::new(g.clone(), g.clone(), MatrixInt::diagonal(2, 2, &ints(&[5, 5]))).unwrap();
    assert!(f.is_isomorphism());
    let fi = f.inverse_hom();
    assert!((&fi * &f).is_identity());
    assert!((&f * &fi).is_identity());
    let h = HomMarkedAbelianGroup::new(g.clone(), g, MatrixInt::diagonal(2, 2, &ints(&[6, 6]))).unwrap();
    assert!(h.is_zero());
    assert!(!f.is_zero());
}

#[test]
fn test_hom_inverse_random() {
    use crate::marked::random_chain_complex;
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(77);
    for _ in 0..50 {
        let (m, n) = random_chain_complex(&mut rng);
        for p in [0, 2, 3, 4, 6, 9] {
            let p = Int::from(p);
            let g = MarkedAbelianGroup::with_coefficients(m.clone(), n.clone(), p.clone()).unwrap();
            let u = if p.is_zero() { Int::from(-1) } else { &p - Int::from(1) };
            let b = g.cc_rank();
            let f = HomMarkedAbelianGroup::new(g.clone(), g.clone(), MatrixInt::diagonal(b, b, &vec![u; b])).unwrap();
            assert!(f.is_isomorphism(), "p={p} M=\n{m}N=\n{n}");
            assert!((&f.inverse_hom() * &f).is_identity(), "p={p} M=\n{m}N=\n{n}");
        }
    }
}

#[test]
fn test_hom_not_cycle_map() {
    // Z -> (0 -> Z --2--> Z): the generator is not sent to a cycle.
    let z = free_group(1);
    let h1 = MarkedAbelianGroup::new(mat(&[&[2]]), MatrixInt::new(1, 1)).unwrap();
    assert!(HomMarkedAbelianGroup::new(z.clone(), h1.clone(), mat(&[&[1]])).is_err());
    // The zero chain map is fine.
    let f = HomMarkedAbelianGroup::new(z, h1, mat(&[&[0]])).unwrap();
    assert!(f.is_zero());
    assert!(f.is_epic());
}
