//! Duplicate-block merging.
//!
//! The sub-builders create one join/end node each for the same source
//! line; without this pass the rendered graph is littered with
//! degree-1 phantom blocks. Two nodes are duplicates iff they share
//! the `(kind, first-token-line)` key. Every mutation here preserves
//! the reciprocal parents/children invariant, and the pass is
//! idempotent.

use indexmap::IndexMap;

use super::{DecompKind, NodeArena, NodeId};

type NodeKey = (Option<DecompKind>, Option<u32>);

/// Merge duplicate nodes in `order`, relinking adjacency onto the
/// first member of each duplicate cluster and dropping the rest from
/// the master list. Arena storage is untouched.
pub(crate) fn minimize(arena: &mut NodeArena, order: &mut Vec<NodeId>) {
    let mut buckets: IndexMap<NodeKey, Vec<NodeId>> = IndexMap::new();
    for &id in order.iter() {
        let node = &arena[id];
        buckets
            .entry((node.kind, node.first_line()))
            .or_default()
            .push(id);
    }

    for (_, bucket) in buckets {
        if bucket.len() < 2 {
            continue;
        }

        let root = bucket[0];
        for &dup in &bucket[1..] {
            let parents = arena[dup].parents.clone();
            for parent in parents {
                if parent != root && !arena[root].parents.contains(&parent) {
                    arena[root].parents.push(parent);
                    arena[parent].children.push(root);
                    remove_first(&mut arena[parent].children, dup);
                }
            }

            let children = arena[dup].children.clone();
            for child in children {
                if child != root && !arena[root].children.contains(&child) {
                    arena[root].children.push(child);
                    arena[child].parents.push(root);
                    remove_first(&mut arena[child].parents, dup);
                }
            }

            remove_first(order, dup);
            remove_first(&mut arena[root].children, dup);
        }
    }
}

fn remove_first(list: &mut Vec<NodeId>, id: NodeId) {
    if let Some(ix) = list.iter().position(|&n| n == id) {
        list.remove(ix);
    }
}
