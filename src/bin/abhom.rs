// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Homology of a chain complex read from a file.

use std::str::FromStr;
use std::time::Instant;

use abelhom::chain::ChainComplex;
use abelhom::{Int, Preferences, Verbosity};

fn main() {
    let arg = arguments::parse(std::env::args()).unwrap();
    if arg.get::<bool>("help").is_some() || arg.orphans.len() != 1 {
        eprintln!("Usage: abhom [OPTIONS] FILE");
        eprintln!("");
        eprintln!("Options:");
        eprintln!("  --help                    show this help");
        eprintln!("  --verbose silent|info|verbose|debug");
        eprintln!("  --threads N:              compute up to N degrees in parallel");
        eprintln!("  --coeff P:                use Z/P coefficients");
        eprintln!("  --maps:                   print a cycle representing each generator");
        return;
    }
    let threads = arg.get::<usize>("threads");
    let coeff = arg.get::<String>("coeff");
    let maps = arg.get::<bool>("maps").is_some();
    let v = arg.get::<String>("verbose").unwrap_or("info".into());
    let path = &arg.orphans[0];

    let mut prefs = Preferences::default();
    prefs.threads = threads;
    prefs.maps = maps;
    prefs.verbosity = Verbosity::from_str(&v).unwrap();
    if let Some(c) = coeff {
        let p = Int::from_str(&c).expect("could not read coefficient modulus");
        prefs.coefficients = Some(p);
    }

    let complex = match ChainComplex::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    };
    if prefs.verbose(Verbosity::Info) {
        let dims: Vec<String> = (0..=complex.top_degree())
            .map(|k| complex.dimension(k).to_string())
            .collect();
        eprintln!("Chain complex with ranks {}", dims.join(" "));
        if let Some(p) = &prefs.coefficients {
            eprintln!("Using Z/{p} coefficients");
        }
    }

    // Create thread pool
    let tpool: Option<rayon::ThreadPool> = match prefs.threads {
        None | Some(1) => None,
        Some(t) => {
            if prefs.verbose(Verbosity::Verbose) {
                eprintln!("Using a pool of {t} threads");
            }
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(t)
                    .build()
                    .expect("cannot create thread pool"),
            )
        }
    };
    let tpool = tpool.as_ref();

    let start = Instant::now();
    let groups = match complex.all_homology(&prefs, tpool) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if prefs.verbose(Verbosity::Info) {
        eprintln!(
            "Computed homology in {:.3}s",
            start.elapsed().as_secs_f64()
        );
    }
    for (k, g) in groups.iter().enumerate() {
        println!("H_{k} = {g}");
        if !prefs.maps {
            continue;
        }
        for j in 0..g.snf_rank() {
            let Ok(v) = g.cc_rep_generator(j) else {
                continue;
            };
            let order = if j < g.count_invariant_factors() {
                g.invariant_factor(j).to_string()
            } else {
                "inf".to_string()
            };
            let coords: Vec<String> = v.iter().map(|x| x.to_string()).collect();
            println!("  generator {j} (order {order}): [{}]", coords.join(" "));
        }
    }
}
