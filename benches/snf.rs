use brunch::Bench;
use rand::{Rng, SeedableRng};

use abelhom::matrixint::{self, MatrixInt, SnfFlags};
use abelhom::Int;

fn main() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    let m20 = random_matrix(&mut rng, 20, 20, 0.5);
    let m40 = random_matrix(&mut rng, 40, 40, 0.2);
    let m30x60 = random_matrix(&mut rng, 30, 60, 0.3);

    brunch::benches! {
        inline:
        // Plain elimination against metrical pivoting
        Bench::new("snf (20x20)")
        .run_seeded(m20.clone(), |mut m| { matrixint::smith_normal_form(&mut m); m }),
        Bench::new("metrical snf (20x20)")
        .run_seeded(m20.clone(), |mut m| { matrixint::metrical_smith_normal_form(&mut m, SnfFlags::NONE); m }),
        Bench::new("snf with bases (20x20)")
        .run_seeded(m20.clone(), |mut m| matrixint::smith_normal_form_with_bases(&mut m)),
        Bench::new("metrical snf with bases (20x20)")
        .run_seeded(m20.clone(), |mut m| matrixint::metrical_smith_normal_form_with_bases(&mut m)),
        Bench::new("snf (40x40 sparse)")
        .run_seeded(m40.clone(), |mut m| { matrixint::smith_normal_form(&mut m); m }),
        Bench::new("metrical snf (40x40 sparse)")
        .run_seeded(m40.clone(), |mut m| { matrixint::metrical_smith_normal_form(&mut m, SnfFlags::NONE); m }),
        // Echelon forms
        Bench::new("row basis (30x60)")
        .run_seeded(m30x60.clone(), |mut m| matrixint::row_basis(&mut m)),
        Bench::new("row basis and orthogonal complement (30x60)")
        .run_seeded(m30x60.clone(), |mut m| matrixint::row_basis_and_orth_comp(&mut m)),
    }
}

fn random_matrix(rng: &mut impl Rng, rows: usize, cols: usize, density: f64) -> MatrixInt {
    let mut m = MatrixInt::new(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            if rng.gen_bool(density) {
                m[(i, j)] = Int::from(rng.gen_range(-9..=9));
            }
        }
    }
    m
}
