use crate::bounding_volume::Aabb;
use crate::math::{Real, Vector};
use crate::partitioning::HierarchyTree;

fn make_test_aabb(i: usize) -> Aabb {
    Aabb::from_half_extents(Vector::repeat(i as Real).into(), Vector::repeat(1.0))
}

#[test]
fn tree_build_and_removal() {
    // Check various combinations of building pattern and removal pattern.
    // The tree consistency is asserted at every step.
    #[derive(Copy, Clone, Debug)]
    enum BuildPattern {
        Insert,
        Init,
    }

    #[derive(Copy, Clone, Debug)]
    enum RemovalPattern {
        InOrder,
        RevOrder,
        EvenOdd,
    }

    for build_pattern in [BuildPattern::Insert, BuildPattern::Init] {
        for removal_pattern in [
            RemovalPattern::InOrder,
            RemovalPattern::RevOrder,
            RemovalPattern::EvenOdd,
        ] {
            for len in 1..=64usize {
                let mut tree = HierarchyTree::new();
                let handles = match build_pattern {
                    BuildPattern::Insert => {
                        let mut handles = Vec::new();
                        for i in 0..len {
                            handles.push(tree.insert(make_test_aabb(i), i as u32));
                            tree.assert_consistent();
                        }
                        handles
                    }
                    BuildPattern::Init => {
                        let handles: Vec<_> = (0..len)
                            .map(|i| tree.new_leaf(make_test_aabb(i), i as u32))
                            .collect();
                        tree.init(handles.clone(), 0);
                        handles
                    }
                };

                tree.assert_consistent();
                assert_eq!(tree.size(), len);

                let order: Vec<usize> = match removal_pattern {
                    RemovalPattern::InOrder => (0..len).collect(),
                    RemovalPattern::RevOrder => (0..len).rev().collect(),
                    RemovalPattern::EvenOdd => (0..len)
                        .filter(|i| i % 2 == 0)
                        .chain((0..len).filter(|i| i % 2 == 1))
                        .collect(),
                };

                for (k, i) in order.into_iter().enumerate() {
                    tree.remove(handles[i]);
                    tree.assert_consistent();
                    assert_eq!(tree.size(), len - k - 1);
                }

                assert!(tree.is_empty());
            }
        }
    }
}

#[test]
fn tree_update_keeps_indices_stable() {
    let mut tree = HierarchyTree::new();
    let handles: Vec<_> = (0..32).map(|i| tree.insert(make_test_aabb(i), i as u32)).collect();

    for (i, handle) in handles.iter().enumerate() {
        let moved = make_test_aabb(i + 100);
        tree.update(*handle, moved);
        tree.assert_consistent();
        assert_eq!(tree.node(*handle).data, i as u32);
        assert_eq!(tree.node(*handle).bv, moved);
    }

    assert_eq!(tree.size(), 32);
}

#[test]
fn tree_balance_preserves_leaves() {
    let mut tree = HierarchyTree::new();
    let handles: Vec<_> = (0..128).map(|i| tree.insert(make_test_aabb(i), i as u32)).collect();

    tree.balance_incremental(10);
    tree.assert_consistent();
    assert_eq!(tree.size(), 128);

    tree.balance_topdown();
    tree.assert_consistent();
    assert_eq!(tree.size(), 128);

    for (i, handle) in handles.iter().enumerate() {
        assert_eq!(tree.node(*handle).data, i as u32);
    }
}

#[test]
fn tree_refit_restores_tightness() {
    let mut tree = HierarchyTree::new();
    let handles: Vec<_> = (0..16).map(|i| tree.insert(make_test_aabb(i), i as u32)).collect();

    // Grow one leaf way out of its parent volume, then refit.
    tree.node_mut(handles[3]).bv = make_test_aabb(1000);
    tree.refit();
    tree.assert_consistent();
}

#[test]
fn topdown_rebuild_lowers_degenerate_height() {
    let mut tree = HierarchyTree::new();
    // Sorted insertions tend to produce a skewed tree.
    for i in 0..256 {
        let _ = tree.insert(make_test_aabb(i), i as u32);
    }
    let height_before = tree.max_height();

    tree.balance_topdown();
    tree.assert_consistent();
    assert!(tree.max_height() <= height_before);
}
