// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Homology of integer chain complexes.
//!
//! The crate computes chain complex homology groups together with
//! their relationship to chains: a group `ker M / img N` is presented
//! by its invariant factors, and cycles can be converted back and
//! forth between chain coordinates and Smith normal form coordinates.
//! Homomorphisms between such groups are described by chain-level
//! matrices and expose their kernel, image and cokernel.

use std::str::FromStr;

pub mod arith;
pub mod error;
pub mod matrix;
pub mod matrixint;

// Groups
pub mod abelian;
pub mod chain;
pub mod hom;
pub mod marked;

pub use abelian::AbelianGroup;
pub use error::{Error, Result};
pub use hom::HomMarkedAbelianGroup;
pub use marked::MarkedAbelianGroup;

// Entries of chain complex matrices can grow without bound during
// normal form computations.
pub type Int = num_bigint::BigInt;

const DEBUG: bool = false;

#[derive(Clone, Debug, Default)]
pub struct Preferences {
    /// Coefficient modulus (None means integer coefficients).
    pub coefficients: Option<Int>,
    pub threads: Option<usize>,
    pub verbosity: Verbosity,
    /// Also print a representative cycle for each generator.
    pub maps: bool,
}

impl Preferences {
    pub fn verbose(&self, v: Verbosity) -> bool {
        self.verbosity >= v
    }

    /// The coefficient modulus as an integer, 0 meaning ℤ.
    pub fn modulus(&self) -> Int {
        self.coefficients.clone().unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    #[default]
    Info,
    Verbose,
    Debug,
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "silent" => Ok(Self::Silent),
            "info" => Ok(Self::Info),
            "verbose" => Ok(Self::Verbose),
            "debug" => Ok(Self::Debug),
            _ => Err(format!("invalid verbosity level {s}")),
        }
    }
}

#[test]
fn test_verbosity() {
    let mut prefs = Preferences::default();
    assert!(prefs.verbose(Verbosity::Info));
    assert!(!prefs.verbose(Verbosity::Verbose));
    prefs.verbosity = Verbosity::from_str("debug").unwrap();
    assert!(prefs.verbose(Verbosity::Verbose));
    assert!(Verbosity::from_str("loud").is_err());
    assert_eq!(prefs.modulus(), Int::from(0));
}
