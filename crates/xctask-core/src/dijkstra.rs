//! Label-correcting shortest-path search over implicit graphs.
//!
//! Edges are supplied on demand by the caller: pop a node, then [`Dijkstra::link`]
//! its successors. Superseded queue entries are left in place and skipped
//! when they surface instead of being decreased in the heap.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

#[derive(Debug, Clone, Copy)]
struct Label<N> {
    distance: u64,
    parent: Option<N>,
    settled: bool,
}

/// Shortest-path state for one search. Longest paths are obtained by the
/// caller complementing its edge weights.
#[derive(Debug, Clone)]
pub struct Dijkstra<N> {
    labels: BTreeMap<N, Label<N>>,
    queue: BinaryHeap<Reverse<(u64, N)>>,
    current: Option<(N, u64)>,
}

impl<N: Copy + Ord> Default for Dijkstra<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Copy + Ord> Dijkstra<N> {
    pub fn new() -> Self {
        Self {
            labels: BTreeMap::new(),
            queue: BinaryHeap::new(),
            current: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            labels: BTreeMap::new(),
            queue: BinaryHeap::with_capacity(capacity),
            current: None,
        }
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        self.queue.clear();
        self.current = None;
    }

    /// Clear all state and seed the frontier with `start` at distance 0.
    pub fn reset(&mut self, start: N) {
        self.clear();
        self.link_start(start);
    }

    /// Add another zero-distance source.
    pub fn link_start(&mut self, node: N) -> bool {
        self.push(node, None, 0)
    }

    /// Record `distance` for `node` if it improves on what is known.
    ///
    /// Returns whether the frontier changed. Settled nodes never change.
    pub fn push(&mut self, node: N, parent: Option<N>, distance: u64) -> bool {
        if let Some(label) = self.labels.get_mut(&node) {
            if label.settled || label.distance <= distance {
                return false;
            }
            label.distance = distance;
            label.parent = parent;
        } else {
            self.labels.insert(
                node,
                Label {
                    distance,
                    parent,
                    settled: false,
                },
            );
        }
        self.queue.push(Reverse((distance, node)));
        true
    }

    /// Relax an edge of `weight` from the current node to `node`.
    pub fn link(&mut self, node: N, weight: u64) -> bool {
        let (parent, base) = match self.current {
            Some((current, distance)) => (Some(current), distance),
            None => (None, 0),
        };
        self.push(node, parent, base.saturating_add(weight))
    }

    /// Settle and return the closest live node, or `None` once the frontier
    /// is exhausted.
    pub fn pop(&mut self) -> Option<N> {
        while let Some(Reverse((distance, node))) = self.queue.pop() {
            let Some(label) = self.labels.get_mut(&node) else {
                continue;
            };
            if label.settled || label.distance != distance {
                continue;
            }
            label.settled = true;
            self.current = Some((node, distance));
            return Some(node);
        }
        None
    }

    /// Distance of the most recently popped node.
    pub fn dist(&self) -> u64 {
        self.current.map(|(_, distance)| distance).unwrap_or(0)
    }

    /// True when no live entry remains; drops stale entries at the head.
    pub fn is_empty(&mut self) -> bool {
        while let Some(Reverse((distance, node))) = self.queue.peek().copied() {
            let live = self
                .labels
                .get(&node)
                .map(|label| !label.settled && label.distance == distance)
                .unwrap_or(false);
            if live {
                return false;
            }
            self.queue.pop();
        }
        true
    }

    /// Best distance recorded so far, final once the node is settled.
    pub fn distance_of(&self, node: &N) -> Option<u64> {
        self.labels.get(node).map(|label| label.distance)
    }

    pub fn is_settled(&self, node: &N) -> bool {
        self.labels.get(node).map(|label| label.settled).unwrap_or(false)
    }

    pub fn parent_of(&self, node: &N) -> Option<N> {
        self.labels.get(node).and_then(|label| label.parent)
    }

    /// Nodes from the source to `node` following parent links.
    pub fn path_to(&self, node: N) -> Vec<N> {
        if !self.labels.contains_key(&node) {
            return Vec::new();
        }
        let mut path = vec![node];
        let mut cursor = node;
        while let Some(parent) = self.parent_of(&cursor) {
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        path
    }

    /// Number of queue entries, live or stale.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}
