use brunch::Bench;
use rand::{Rng, SeedableRng};

use abelhom::matrixint::{row_basis_and_orth_comp, MatrixInt};
use abelhom::{HomMarkedAbelianGroup, Int, MarkedAbelianGroup};

fn main() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    let (m, n) = random_complex(&mut rng, 12, 20, 8);
    let (m2, n2) = random_complex(&mut rng, 25, 40, 15);
    let g = MarkedAbelianGroup::new(m.clone(), n.clone()).unwrap();
    // Multiplication by 2.
    let b = g.cc_rank();
    let f = MatrixInt::diagonal(b, b, &vec![Int::from(2); b]);

    brunch::benches! {
        inline:
        Bench::new("homology Z (12x20x8)")
        .run_seeded((m.clone(), n.clone()), |(m, n)| MarkedAbelianGroup::new(m, n)),
        Bench::new("homology Z/2 (12x20x8)")
        .run_seeded((m.clone(), n.clone()), |(m, n)| MarkedAbelianGroup::with_coefficients(m, n, Int::from(2))),
        Bench::new("homology Z/12 (12x20x8)")
        .run_seeded((m.clone(), n.clone()), |(m, n)| MarkedAbelianGroup::with_coefficients(m, n, Int::from(12))),
        Bench::new("homology Z (25x40x15)")
        .run_seeded((m2.clone(), n2.clone()), |(m, n)| MarkedAbelianGroup::new(m, n)),
        {
            Bench::new("round trip of all generators (12x20x8)")
            .run_seeded(&g, |g| {
                for j in 0..g.snf_rank() {
                    let v = g.cc_rep_generator(j).unwrap();
                    g.snf_rep(&v).unwrap();
                }
            })
        },
        {
            Bench::new("kernel and cokernel of doubling (12x20x8)")
            .run_seeded((&g, &f), |(g, f)| {
                let h = HomMarkedAbelianGroup::new(g.clone(), g.clone(), f.clone()).unwrap();
                (h.kernel().rank(), h.cokernel().rank())
            })
        },
    }
}

// A chain complex Z^a --N--> Z^b --M--> Z^c with M N = 0.
fn random_complex(rng: &mut impl Rng, c: usize, b: usize, a: usize) -> (MatrixInt, MatrixInt) {
    let mut n = MatrixInt::new(b, a);
    for i in 0..b {
        for j in 0..a {
            if rng.gen_bool(0.3) {
                n[(i, j)] = Int::from(rng.gen_range(-4..=4));
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
                coeffs[(i, j)] = Int::from(rng.gen_range(-2..=2));
            }
        }
    }
    (&coeffs * &kernel, n)
}
