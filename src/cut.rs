//! K-feasible cut enumeration with truth-table propagation.
//!
//! A cut of a node is a set of at most k leaves that fully determines the
//! cone rooted at the node. Cuts of an AND node are the pairwise unions of
//! its fanin cuts, filtered by dominance and capped per node. Each cut
//! carries the truth table of the node (plain polarity) over its leaves.
//!
//! The index is pass-scoped: it is created at pass entry and caches per-node
//! cut sets lazily, recomputing them when a substitution rewires a cone.

use crate::edge::NodeId;
use crate::network::Network;
use crate::truth::{self, expand};

pub const MAX_CUT_SIZE: usize = 4;

#[derive(Debug, Copy, Clone)]
pub struct CutParams {
    /// Maximum number of leaves per cut ("k" of the k-feasible cuts).
    pub cut_size: usize,
    /// Maximum number of cuts retained per node, the trivial cut aside.
    pub max_cuts: usize,
}

impl Default for CutParams {
    fn default() -> Self {
        Self {
            cut_size: 4,
            max_cuts: 64,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Cut {
    leaves: [NodeId; MAX_CUT_SIZE],
    len: u8,
    /// Truth table of the node over `leaves`, as a full 4-variable table.
    pub truth: u16,
}

impl Cut {
    fn from_leaves(leaves: [NodeId; MAX_CUT_SIZE], len: u8, truth: u16) -> Self {
        Self { leaves, len, truth }
    }

    /// The single-leaf cut of a node: the node itself.
    pub fn trivial(id: NodeId) -> Self {
        Self {
            leaves: [id, 0, 0, 0],
            len: 1,
            truth: truth::VARS[0],
        }
    }

    /// The leaf-free cut of the constant node.
    pub fn constant() -> Self {
        Self {
            leaves: [0; MAX_CUT_SIZE],
            len: 0,
            truth: truth::ONES,
        }
    }

    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when every leaf of `self` is also a leaf of `other`.
    ///
    /// A dominated cut (a strict superset of another cut's leaves) carries no
    /// extra information and is discarded.
    pub fn dominates(&self, other: &Cut) -> bool {
        self.leaves().iter().all(|l| other.leaves().contains(l))
    }

    /// Merge two sorted leaf sets, or `None` if the union exceeds `k` leaves.
    fn merge_leaves(a: &[NodeId], b: &[NodeId], k: usize) -> Option<([NodeId; MAX_CUT_SIZE], u8)> {
        let mut out = [0 as NodeId; MAX_CUT_SIZE];
        let mut n = 0usize;
        let (mut i, mut j) = (0usize, 0usize);
        while i < a.len() || j < b.len() {
            let next = match (a.get(i), b.get(j)) {
                (Some(&x), Some(&y)) if x == y => {
                    i += 1;
                    j += 1;
                    x
                }
                (Some(&x), Some(&y)) if x < y => {
                    i += 1;
                    x
                }
                (Some(_), Some(&y)) => {
                    j += 1;
                    y
                }
                (Some(&x), None) => {
                    i += 1;
                    x
                }
                (None, Some(&y)) => {
                    j += 1;
                    y
                }
                (None, None) => unreachable!(),
            };
            if n == k {
                return None;
            }
            out[n] = next;
            n += 1;
        }
        Some((out, n as u8))
    }
}

pub struct CutIndex {
    params: CutParams,
    cuts: Vec<Option<Vec<Cut>>>,
}

impl CutIndex {
    pub fn new(params: CutParams) -> Self {
        debug_assert!((2..=MAX_CUT_SIZE).contains(&params.cut_size));
        Self {
            params,
            cuts: Vec::new(),
        }
    }

    /// The cut set of a node, computed on demand against the current
    /// structure of the network. The trivial cut is always first.
    pub fn cuts_of(&mut self, network: &Network, id: NodeId) -> &[Cut] {
        self.ensure(id);
        if self.cuts[id as usize].is_none() {
            self.compute(network, id);
        }
        self.cuts[id as usize]
            .as_deref()
            .expect("cuts computed above")
    }

    /// Forget the cached cuts of every node whose cone contains one of the
    /// seeds. Called after a substitution rewired part of the network.
    pub fn invalidate_up(&mut self, network: &Network, seeds: &[NodeId]) {
        let mut stack: Vec<NodeId> = seeds.to_vec();
        while let Some(id) = stack.pop() {
            match self.cuts.get_mut(id as usize) {
                Some(slot) if slot.is_some() => *slot = None,
                // Never computed: no reader holds cuts derived from it.
                _ => continue,
            }
            for &reader in network.fanouts(id) {
                stack.push(reader);
            }
        }
    }

    fn ensure(&mut self, id: NodeId) {
        if self.cuts.len() <= id as usize {
            self.cuts.resize(id as usize + 1, None);
        }
    }

    /// Compute cut sets bottom-up for the cone of `root`, iteratively.
    fn compute(&mut self, network: &Network, root: NodeId) {
        let mut stack = vec![root];
        while let Some(&id) = stack.last() {
            self.ensure(id);
            if self.cuts[id as usize].is_some() {
                stack.pop();
                continue;
            }
            match network.fanins(id) {
                None => {
                    // Input or constant.
                    let cut = if network.is_input(id) {
                        Cut::trivial(id)
                    } else {
                        Cut::constant()
                    };
                    self.cuts[id as usize] = Some(vec![cut]);
                    stack.pop();
                }
                Some((f0, f1)) => {
                    let mut ready = true;
                    for fanin in [f0.index(), f1.index()] {
                        self.ensure(fanin);
                        if self.cuts[fanin as usize].is_none() {
                            stack.push(fanin);
                            ready = false;
                        }
                    }
                    if ready {
                        let cuts = self.merge_node(network, id);
                        self.cuts[id as usize] = Some(cuts);
                        stack.pop();
                    }
                }
            }
        }
    }

    fn merge_node(&self, network: &Network, id: NodeId) -> Vec<Cut> {
        let (e0, e1) = network.fanins(id).expect("merge_node on an AND node");
        let cuts0 = self.cuts[e0.index() as usize].as_deref().expect("fanin cuts ready");
        let cuts1 = self.cuts[e1.index() as usize].as_deref().expect("fanin cuts ready");

        let mut result = vec![Cut::trivial(id)];
        for c0 in cuts0 {
            for c1 in cuts1 {
                let Some((leaves, len)) =
                    Cut::merge_leaves(c0.leaves(), c1.leaves(), self.params.cut_size)
                else {
                    continue;
                };
                let merged = &leaves[..len as usize];
                let mut t0 = expand(c0.truth, c0.leaves(), merged);
                if e0.is_complement() {
                    t0 = !t0;
                }
                let mut t1 = expand(c1.truth, c1.leaves(), merged);
                if e1.is_complement() {
                    t1 = !t1;
                }
                let cut = Cut::from_leaves(leaves, len, t0 & t1);

                if result.iter().any(|c| c.dominates(&cut)) {
                    continue;
                }
                result.retain(|c| !cut.dominates(c) || c.len() == 1);
                result.push(cut);
            }
        }

        // Rank by leaf count, then by depth of the deepest leaf.
        result[1..].sort_by_key(|c| {
            let depth = c.leaves().iter().map(|&l| network.level(l)).max().unwrap_or(0);
            (c.len(), depth)
        });
        result.truncate(1 + self.params.max_cuts);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;
    use crate::truth::VARS;

    fn xor_network() -> (Network, Edge, Edge, Edge) {
        // xor(a, b) = !(!(a & !b) & !(!a & b)), four AND nodes.
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let p = network.mk_and(a, -b).unwrap();
        let q = network.mk_and(-a, b).unwrap();
        let f = network.mk_and(-p, -q).unwrap();
        network.add_output(-f);
        (network, a, b, -f)
    }

    #[test]
    fn test_input_cut() {
        let mut network = Network::new();
        let a = network.add_input();
        let mut index = CutIndex::new(CutParams::default());
        let cuts = index.cuts_of(&network, a.index());
        assert_eq!(cuts.len(), 1);
        assert_eq!(cuts[0].leaves(), &[a.index()]);
        assert_eq!(cuts[0].truth, VARS[0]);
    }

    #[test]
    fn test_and_cut_truth() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let f = network.mk_and(a, -b).unwrap();
        let mut index = CutIndex::new(CutParams::default());
        let cuts = index.cuts_of(&network, f.index());
        // Trivial cut plus {a, b}.
        assert_eq!(cuts.len(), 2);
        assert_eq!(cuts[1].leaves(), &[a.index(), b.index()]);
        assert_eq!(cuts[1].truth, VARS[0] & !VARS[1]);
    }

    #[test]
    fn test_xor_cone_cut() {
        let (network, a, b, root) = xor_network();
        let mut index = CutIndex::new(CutParams::default());
        let cuts = index.cuts_of(&network, root.index());
        // The two-leaf cut over the inputs carries xnor (the root node is the
        // complement of the output edge).
        let cut = cuts
            .iter()
            .find(|c| c.leaves() == [a.index(), b.index()])
            .expect("two-leaf cut over the inputs");
        assert_eq!(cut.truth, !(VARS[0] ^ VARS[1]));
    }

    #[test]
    fn test_dominated_cuts_are_dropped() {
        // f = (a & b) & b: the cut {ab-node, b} is dominated by {a, b} only
        // when subset-wise applicable; at minimum no cut's leaf set contains
        // another's as a subset.
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let g = network.mk_and(a, b).unwrap();
        let f = network.mk_and(g, b).unwrap();
        let mut index = CutIndex::new(CutParams::default());
        let cuts: Vec<Cut> = index.cuts_of(&network, f.index()).to_vec();
        for (i, c) in cuts.iter().enumerate() {
            for (j, d) in cuts.iter().enumerate() {
                if i != j && c.len() > 1 && d.len() > 1 {
                    assert!(!c.dominates(d), "cut {:?} dominates {:?}", c, d);
                }
            }
        }
    }

    #[test]
    fn test_cut_size_limit() {
        let mut network = Network::new();
        let inputs: Vec<Edge> = (0..6).map(|_| network.add_input()).collect();
        let mut acc = inputs[0];
        for &input in &inputs[1..] {
            acc = network.mk_and(acc, input).unwrap();
        }
        let mut index = CutIndex::new(CutParams::default());
        for cut in index.cuts_of(&network, acc.index()) {
            assert!(cut.len() <= MAX_CUT_SIZE);
        }
    }

    #[test]
    fn test_invalidate_up() {
        let (network, _, _, root) = xor_network();
        let mut index = CutIndex::new(CutParams::default());
        let before = index.cuts_of(&network, root.index()).to_vec();
        let (f0, _) = network.fanins(root.index()).unwrap();
        index.invalidate_up(&network, &[f0.index()]);
        assert!(index.cuts[root.index() as usize].is_none());
        let after = index.cuts_of(&network, root.index()).to_vec();
        assert_eq!(before, after);
    }
}
