//! Benchmarks for a single count-indexed `BpTree` using Divan.
//!
//! Isolates the per-tree cost of descents, splits and rebalancing from the
//! cross-tree rank lookups done by `DynamicPermutation`.
//!
//! Run with: `cargo bench --bench tree`


use divan::{Bencher, black_box};
use dynperm::item::{ItemId, PermutationItem};
use dynperm::link::{LinkTable, Side};
use dynperm::tree::BpTree;

use bench_utils::indices;

fn main() {
    divan::main();
}

const SIZES: &[usize] = &[1_000, 100_000];

/// A pi-side tree holding `n` dense ids in order.
fn loaded<const D: usize>(n: usize) -> (BpTree<D>, LinkTable) {
    let mut links = LinkTable::with_dense(n);
    let mut tree: BpTree<D> = BpTree::new(Side::Pi);
    let ids: Vec<ItemId> = (0..n).map(ItemId::dense).collect();
    tree.bulk_load(&ids, &mut links);
    (tree, links)
}

// =============================================================================
// Construction
// =============================================================================

#[divan::bench_group]
mod construction {
    use super::{Bencher, BpTree, ItemId, LinkTable, SIZES, Side, black_box};

    #[divan::bench]
    fn new_tree() -> BpTree {
        BpTree::new(Side::Pi)
    }

    #[divan::bench(args = SIZES)]
    fn bulk_load(bencher: Bencher, n: usize) {
        let ids: Vec<ItemId> = (0..n).map(ItemId::dense).collect();
        bencher
            .with_inputs(|| (BpTree::<64>::new(Side::Pi), LinkTable::with_dense(n)))
            .bench_local_values(|(mut tree, mut links)| {
                tree.bulk_load(black_box(&ids), &mut links);
                (tree, links)
            });
    }
}

// =============================================================================
// Descents
// =============================================================================

#[divan::bench_group]
mod descents {
    use super::{Bencher, SIZES, black_box, indices, loaded};

    #[divan::bench(args = SIZES)]
    fn access(bencher: Bencher, n: usize) {
        let (tree, _links) = loaded::<64>(n);
        let probes = indices(1024, n, 1);
        bencher.bench_local(|| {
            for &i in &probes {
                black_box(tree.access(i));
            }
        });
    }

    #[divan::bench(args = SIZES)]
    fn rank_of(bencher: Bencher, n: usize) {
        let (tree, links) = loaded::<64>(n);
        let probes = indices(1024, n, 2);
        let ids: Vec<_> = probes.iter().filter_map(|&i| tree.access(i)).collect();
        bencher.bench_local(|| {
            for item in &ids {
                black_box(tree.rank_of(&links, item.link));
            }
        });
    }

    #[divan::bench(args = SIZES)]
    fn rank_of_degree_8(bencher: Bencher, n: usize) {
        let (tree, links) = loaded::<8>(n);
        let probes = indices(1024, n, 2);
        let ids: Vec<_> = probes.iter().filter_map(|&i| tree.access(i)).collect();
        bencher.bench_local(|| {
            for item in &ids {
                black_box(tree.rank_of(&links, item.link));
            }
        });
    }

    #[divan::bench(args = SIZES)]
    fn items_scan(bencher: Bencher, n: usize) {
        let (tree, _links) = loaded::<64>(n);
        bencher.bench_local(|| black_box(&tree).items().count());
    }
}

// =============================================================================
// Restructuring
// =============================================================================

#[divan::bench_group]
mod restructuring {
    use super::{Bencher, PermutationItem, SIZES, indices, loaded};

    #[divan::bench(args = SIZES)]
    fn insert_erase(bencher: Bencher, n: usize) {
        let (mut tree, mut links) = loaded::<64>(n);
        let positions = indices(256, n, 3);
        bencher.bench_local(|| {
            for &i in &positions {
                let id = links.allocate();
                tree.insert(i, PermutationItem::new(id), &mut links);
                let removed = tree.erase(i, &mut links);
                links.release(removed.link);
            }
        });
    }

    #[divan::bench(args = SIZES)]
    fn move_item(bencher: Bencher, n: usize) {
        let (mut tree, mut links) = loaded::<16>(n);
        let from = indices(256, n, 4);
        let to = indices(256, n, 5);
        bencher.bench_local(|| {
            for (&a, &b) in from.iter().zip(&to) {
                tree.move_item(a, b, &mut links);
            }
        });
    }

    #[divan::bench(args = SIZES)]
    fn sort_leaf_containers(bencher: Bencher, n: usize) {
        bencher
            .with_inputs(|| {
                let (mut tree, mut links) = loaded::<16>(n);
                for i in (0..n).step_by(3).rev() {
                    let removed = tree.erase(i, &mut links);
                    links.release(removed.link);
                }
                (tree, links)
            })
            .bench_local_values(|(mut tree, mut links)| {
                tree.sort_leaf_containers(&mut links);
                (tree, links)
            });
    }
}
