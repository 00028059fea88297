//! Benchmarks for `DynamicPermutation` using Divan.
//!
//! Run with: `cargo bench --bench permutation`


use divan::{Bencher, black_box};
use dynperm::{DynamicPermutation, DynamicPermutationBuilder};

use bench_utils::{growth_args, indices, scrambled};

fn main() {
    divan::main();
}

const SIZES: &[usize] = &[1_000, 100_000];

// =============================================================================
// Construction
// =============================================================================

#[divan::bench_group]
mod construction {
    use super::{
        Bencher, DynamicPermutation, DynamicPermutationBuilder, SIZES, black_box, growth_args,
        scrambled,
    };

    #[divan::bench(args = SIZES)]
    fn build(bencher: Bencher, n: usize) {
        let values = scrambled(n, 1);
        bencher.bench_local(|| {
            DynamicPermutation::<64>::from_slice(black_box(&values)).unwrap_or_default()
        });
    }

    #[divan::bench(args = SIZES)]
    fn builder_push_front(bencher: Bencher, n: usize) {
        let values = scrambled(n, 1);
        bencher.bench_local(|| {
            let mut builder: DynamicPermutationBuilder = DynamicPermutationBuilder::new_inverse();
            for &pos in values.iter().rev() {
                builder.push_front(pos);
            }
            builder.finish().unwrap_or_default()
        });
    }

    #[divan::bench(args = SIZES)]
    fn sequential_inserts(bencher: Bencher, n: usize) {
        let args = growth_args(n, 2);
        bencher
            .with_inputs(DynamicPermutation::<64>::new)
            .bench_local_values(|mut perm| {
                for &(i, v) in &args {
                    let _ = perm.insert(i, v);
                }
                perm
            });
    }

    #[divan::bench(args = SIZES)]
    fn sequential_inserts_degree_16(bencher: Bencher, n: usize) {
        let args = growth_args(n, 2);
        bencher
            .with_inputs(DynamicPermutation::<16>::new)
            .bench_local_values(|mut perm| {
                for &(i, v) in &args {
                    let _ = perm.insert(i, v);
                }
                perm
            });
    }
}

// =============================================================================
// Queries
// =============================================================================

#[divan::bench_group]
mod queries {
    use super::{Bencher, DynamicPermutation, SIZES, black_box, indices, scrambled};

    #[divan::bench(args = SIZES)]
    fn access(bencher: Bencher, n: usize) {
        let perm: DynamicPermutation = DynamicPermutation::from_slice(&scrambled(n, 3)).unwrap_or_default();
        let probes = indices(1024, n, 4);
        bencher.bench_local(|| {
            let mut acc = 0usize;
            for &i in &probes {
                acc ^= black_box(&perm).access(i).unwrap_or(0);
            }
            acc
        });
    }

    #[divan::bench(args = SIZES)]
    fn inverse(bencher: Bencher, n: usize) {
        let perm: DynamicPermutation = DynamicPermutation::from_slice(&scrambled(n, 3)).unwrap_or_default();
        let probes = indices(1024, n, 5);
        bencher.bench_local(|| {
            let mut acc = 0usize;
            for &v in &probes {
                acc ^= black_box(&perm).inverse(v).unwrap_or(0);
            }
            acc
        });
    }

    #[divan::bench(args = SIZES)]
    fn to_pi_vector(bencher: Bencher, n: usize) {
        let perm: DynamicPermutation = DynamicPermutation::from_slice(&scrambled(n, 3)).unwrap_or_default();
        bencher.bench_local(|| black_box(&perm).to_pi_vector());
    }

    #[divan::bench(args = SIZES)]
    fn iter_sum(bencher: Bencher, n: usize) {
        let perm: DynamicPermutation = DynamicPermutation::from_slice(&scrambled(n, 3)).unwrap_or_default();
        bencher.bench_local(|| black_box(&perm).iter().sum::<usize>());
    }
}

// =============================================================================
// Mutation
// =============================================================================

#[divan::bench_group]
mod mutation {
    use super::{Bencher, DynamicPermutation, SIZES, indices, scrambled};

    #[divan::bench(args = SIZES)]
    fn insert_then_erase(bencher: Bencher, n: usize) {
        let mut perm: DynamicPermutation = DynamicPermutation::from_slice(&scrambled(n, 6)).unwrap_or_default();
        let positions = indices(256, n, 7);
        bencher.bench_local(|| {
            for &i in &positions {
                let _ = perm.insert(i, (i * 7) % n);
                let _ = perm.erase(i);
            }
        });
    }

    #[divan::bench(args = SIZES)]
    fn move_pi_index(bencher: Bencher, n: usize) {
        let mut perm: DynamicPermutation = DynamicPermutation::from_slice(&scrambled(n, 8)).unwrap_or_default();
        let from = indices(256, n, 9);
        let to = indices(256, n, 10);
        bencher.bench_local(|| {
            for (&a, &b) in from.iter().zip(&to) {
                let _ = perm.move_pi_index(a, b);
            }
        });
    }

    #[divan::bench(args = SIZES)]
    fn drain(bencher: Bencher, n: usize) {
        let values = scrambled(n, 11);
        let positions: Vec<usize> = indices(n, usize::MAX, 12);
        bencher
            .with_inputs(|| DynamicPermutation::<64>::from_slice(&values).unwrap_or_default())
            .bench_local_values(|mut perm| {
                for &p in &positions {
                    let _ = perm.erase(p % perm.len().max(1));
                }
                perm
            });
    }
}

// =============================================================================
// Maintenance
// =============================================================================

#[divan::bench_group]
mod maintenance {
    use super::{Bencher, DynamicPermutation, SIZES, black_box, scrambled};

    #[divan::bench(args = SIZES)]
    fn verify(bencher: Bencher, n: usize) {
        let perm: DynamicPermutation = DynamicPermutation::from_slice(&scrambled(n, 13)).unwrap_or_default();
        bencher.bench_local(|| black_box(&perm).verify().is_ok());
    }

    #[divan::bench(args = SIZES)]
    fn sort_leaf_containers(bencher: Bencher, n: usize) {
        let values = scrambled(n, 14);
        bencher
            .with_inputs(|| {
                let mut perm: DynamicPermutation = DynamicPermutation::from_slice(&values).unwrap_or_default();
                for i in (0..perm.len()).step_by(5).rev() {
                    let _ = perm.erase(i);
                }
                perm
            })
            .bench_local_values(|mut perm| {
                perm.sort_leaf_containers();
                perm
            });
    }

    #[divan::bench(args = SIZES)]
    fn memory_usage(bencher: Bencher, n: usize) {
        let perm: DynamicPermutation = DynamicPermutation::from_slice(&scrambled(n, 15)).unwrap_or_default();
        bencher.bench_local(|| black_box(&perm).size_in_bytes());
    }
}
