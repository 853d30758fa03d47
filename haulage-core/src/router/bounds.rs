//! Lower bounds on the cost and time still needed to reach the target.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::network::{Edge, NetworkSnapshot};

/// Per-facility lower bounds towards one target facility.
///
/// Bounds ignore which facilities a partial route has already used, so they
/// never overestimate. `None` marks facilities that cannot reach the target.
#[derive(Debug)]
pub(super) struct Bounds {
    minutes: Vec<Option<u64>>,
    cost: Vec<Option<u64>>,
}

impl Bounds {
    pub(super) fn towards(snapshot: &NetworkSnapshot, target: usize) -> Self {
        Self {
            minutes: shortest_to(snapshot, target, |edge| edge.minutes),
            cost: shortest_to(snapshot, target, |edge| edge.cost),
        }
    }

    /// Minimum `(cost, minutes)` still required from `node`.
    pub(super) fn remaining(&self, node: usize) -> Option<(u64, u64)> {
        let cost = self.cost.get(node).copied().flatten()?;
        let minutes = self.minutes.get(node).copied().flatten()?;
        Some((cost, minutes))
    }
}

fn shortest_to(
    snapshot: &NetworkSnapshot,
    target: usize,
    weight: impl Fn(&Edge) -> u64,
) -> Vec<Option<u64>> {
    let mut distance = vec![None; snapshot.len()];
    let mut heap = BinaryHeap::new();
    if let Some(slot) = distance.get_mut(target) {
        *slot = Some(0);
        heap.push(Reverse((0_u64, target)));
    }

    while let Some(Reverse((reached, node))) = heap.pop() {
        if distance.get(node).copied().flatten() != Some(reached) {
            continue;
        }
        for edge in snapshot.incoming(node) {
            let candidate = reached.saturating_add(weight(edge));
            if let Some(slot) = distance.get_mut(edge.from) {
                if slot.is_none_or(|current| candidate < current) {
                    *slot = Some(candidate);
                    heap.push(Reverse((candidate, edge.from)));
                }
            }
        }
    }

    distance
}
