//! s-t flow network with Dinic's max-flow
//!
//! Edges live in flat arrays; edge `e` and its residual twin are `e` and
//! `e ^ 1`. Adjacency is an intrusive singly linked list per node so a
//! million-node grid costs no per-node allocation. Blocking flows are found
//! with an explicit path stack instead of recursion.

use std::collections::VecDeque;

/// Residual capacities at or below this are treated as saturated
const EPSILON: f64 = 1e-9;

const NO_EDGE: usize = usize::MAX;
const UNREACHED: u32 = u32::MAX;

#[derive(Debug)]
pub(crate) struct FlowGraph {
    head: Vec<usize>,
    next: Vec<usize>,
    to: Vec<usize>,
    capacity: Vec<f64>,
    level: Vec<u32>,
    cursor: Vec<usize>,
}

impl FlowGraph {
    pub(crate) fn new(nodes: usize, edge_hint: usize) -> Self {
        Self {
            head: vec![NO_EDGE; nodes],
            next: Vec::with_capacity(edge_hint * 2),
            to: Vec::with_capacity(edge_hint * 2),
            capacity: Vec::with_capacity(edge_hint * 2),
            level: vec![UNREACHED; nodes],
            cursor: vec![NO_EDGE; nodes],
        }
    }

    /// Add `from -> to` with `capacity` and the reverse direction with `reverse`
    pub(crate) fn add_edge(&mut self, from: usize, to: usize, capacity: f64, reverse: f64) {
        let e = self.to.len();
        self.to.push(to);
        self.capacity.push(capacity);
        self.next.push(self.head[from]);
        self.head[from] = e;

        self.to.push(from);
        self.capacity.push(reverse);
        self.next.push(self.head[to]);
        self.head[to] = e + 1;
    }

    /// Push as much flow as possible from `source` to `sink`
    pub(crate) fn max_flow(&mut self, source: usize, sink: usize) -> f64 {
        let mut total = 0.0;
        while self.build_levels(source, sink) {
            self.cursor.copy_from_slice(&self.head);
            total += self.blocking_flow(source, sink);
        }
        total
    }

    /// Nodes reachable from `source` in the residual graph
    pub(crate) fn source_side(&self, source: usize) -> Vec<bool> {
        let mut reached = vec![false; self.head.len()];
        let mut queue = VecDeque::from([source]);
        reached[source] = true;
        while let Some(v) = queue.pop_front() {
            let mut e = self.head[v];
            while e != NO_EDGE {
                let w = self.to[e];
                if self.capacity[e] > EPSILON && !reached[w] {
                    reached[w] = true;
                    queue.push_back(w);
                }
                e = self.next[e];
            }
        }
        reached
    }

    /// BFS level graph; returns whether `sink` is reachable
    fn build_levels(&mut self, source: usize, sink: usize) -> bool {
        self.level.fill(UNREACHED);
        self.level[source] = 0;
        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            let mut e = self.head[v];
            while e != NO_EDGE {
                let w = self.to[e];
                if self.capacity[e] > EPSILON && self.level[w] == UNREACHED {
                    self.level[w] = self.level[v] + 1;
                    queue.push_back(w);
                }
                e = self.next[e];
            }
        }
        self.level[sink] != UNREACHED
    }

    fn blocking_flow(&mut self, source: usize, sink: usize) -> f64 {
        let mut flow = 0.0;
        let mut path: Vec<usize> = Vec::new();
        let mut v = source;

        loop {
            if v == sink {
                let bottleneck = path
                    .iter()
                    .map(|&e| self.capacity[e])
                    .fold(f64::INFINITY, f64::min);
                for &e in &path {
                    self.capacity[e] -= bottleneck;
                    self.capacity[e ^ 1] += bottleneck;
                }
                flow += bottleneck;

                // Retreat to the tail of the first saturated edge
                let saturated = path
                    .iter()
                    .position(|&e| self.capacity[e] <= EPSILON)
                    .unwrap_or(0);
                path.truncate(saturated);
                v = path.last().map_or(source, |&e| self.to[e]);
                continue;
            }

            let mut e = self.cursor[v];
            while e != NO_EDGE {
                let w = self.to[e];
                if self.capacity[e] > EPSILON && self.level[w] == self.level[v] + 1 {
                    break;
                }
                e = self.next[e];
            }
            self.cursor[v] = e;

            if e != NO_EDGE {
                path.push(e);
                v = self.to[e];
                continue;
            }

            // Dead end: drop `v` from this phase and back up one edge
            self.level[v] = UNREACHED;
            match path.pop() {
                None => break,
                Some(back) => {
                    v = self.to[back ^ 1];
                    self.cursor[v] = self.next[back];
                }
            }
        }

        flow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_edge() {
        let mut graph = FlowGraph::new(2, 1);
        graph.add_edge(0, 1, 3.5, 0.0);
        assert!((graph.max_flow(0, 1) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_classic_network() {
        // CLRS flow network, max flow 23
        let mut graph = FlowGraph::new(6, 9);
        graph.add_edge(0, 1, 16.0, 0.0);
        graph.add_edge(0, 2, 13.0, 0.0);
        graph.add_edge(1, 2, 10.0, 0.0);
        graph.add_edge(2, 1, 4.0, 0.0);
        graph.add_edge(1, 3, 12.0, 0.0);
        graph.add_edge(3, 2, 9.0, 0.0);
        graph.add_edge(2, 4, 14.0, 0.0);
        graph.add_edge(4, 3, 7.0, 0.0);
        graph.add_edge(3, 5, 20.0, 0.0);
        graph.add_edge(4, 5, 4.0, 0.0);

        assert!((graph.max_flow(0, 5) - 23.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_cut_partition() {
        // 0 -> 1 (10) -> 2 (1) -> 3 (10): the cut is the middle edge
        let mut graph = FlowGraph::new(4, 3);
        graph.add_edge(0, 1, 10.0, 0.0);
        graph.add_edge(1, 2, 1.0, 1.0);
        graph.add_edge(2, 3, 10.0, 0.0);

        assert!((graph.max_flow(0, 3) - 1.0).abs() < 1e-12);
        let side = graph.source_side(0);
        assert_eq!(side, vec![true, true, false, false]);
    }

    #[test]
    fn test_disconnected_sink() {
        let mut graph = FlowGraph::new(3, 1);
        graph.add_edge(0, 1, 5.0, 0.0);
        assert_eq!(graph.max_flow(0, 2), 0.0);
        assert_eq!(graph.source_side(0), vec![true, true, false]);
    }
}
