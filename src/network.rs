//! The And-Inverter network: a dense arena of nodes with stable ids,
//! fanin/fanout adjacency, and structural-hash deduplicated construction.
//!
//! The arena layout follows the manager convention: index 0 is an unused
//! sentry, index 1 is the constant-one node, then inputs and AND nodes in
//! creation order. Node ids are stable across a rewriting pass; [`Network::compact`]
//! renumbers them depth-first afterwards so that every fanin id is smaller
//! than its node's id.
//!
//! The network is always acyclic: [`Network::mk_and`] either returns an
//! existing node through the structural hash or appends a strictly
//! forward-referencing node at the end of the arena.

use log::debug;
use thiserror::Error;

use crate::edge::{Edge, NodeId};
use crate::strash::Strash;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("node arena limit of {limit} nodes exhausted")]
    ArenaFull { limit: usize },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NodeKind {
    /// The constant-one node (always id 1).
    Const,
    /// Primary input with its ordinal.
    Input(u32),
    /// Two-input AND over the given fanin edges.
    And(Edge, Edge),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    /// Ids of nodes reading this one, one entry per reading fanin edge.
    fanouts: Vec<NodeId>,
    /// Number of primary-output edges referencing this node.
    out_refs: u32,
    level: u32,
    rlevel: u32,
    persistent: bool,
    dead: bool,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            fanouts: Vec::new(),
            out_refs: 0,
            level: 0,
            rlevel: 0,
            persistent: false,
            dead: false,
        }
    }
}

pub struct Network {
    nodes: Vec<Node>,
    strash: Strash,
    inputs: Vec<NodeId>,
    outputs: Vec<Edge>,
    num_ands: usize,
    /// Optional cap on the arena size; exceeding it is the hard failure of a
    /// substitution commit.
    node_limit: Option<usize>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        let mut sentry = Node::new(NodeKind::Const);
        sentry.dead = true;
        let constant = Node::new(NodeKind::Const);
        Self {
            nodes: vec![sentry, constant],
            strash: Strash::new(16),
            inputs: Vec::new(),
            outputs: Vec::new(),
            num_ands: 0,
            node_limit: None,
        }
    }

    /// Create a network whose arena may not grow past `limit` nodes.
    pub fn with_node_limit(limit: usize) -> Self {
        let mut network = Self::new();
        network.node_limit = Some(limit);
        network
    }

    pub fn set_node_limit(&mut self, limit: Option<usize>) {
        self.node_limit = limit;
    }

    // -- Construction --------------------------------------------------------

    pub fn add_input(&mut self) -> Edge {
        let ordinal = self.inputs.len() as u32;
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::new(NodeKind::Input(ordinal)));
        self.inputs.push(id);
        Edge::positive(id)
    }

    /// Fold an AND of two edges down to an existing value, if possible.
    ///
    /// Handles `x & 1`, `x & 0`, `x & x`, `x & !x`, and the structural-hash
    /// lookup. Returns `None` when a new node would have to be constructed.
    /// This is a pure query and never mutates the network.
    pub fn try_and(&self, a: Edge, b: Edge) -> Option<Edge> {
        if a == Edge::one() {
            return Some(b);
        }
        if b == Edge::one() {
            return Some(a);
        }
        if a == Edge::zero() || b == Edge::zero() {
            return Some(Edge::zero());
        }
        if a == b {
            return Some(a);
        }
        if a == -b {
            return Some(Edge::zero());
        }
        let key = Self::ordered(a, b);
        self.strash.lookup(key).map(Edge::positive)
    }

    /// Look up or construct the AND of two edges.
    pub fn mk_and(&mut self, a: Edge, b: Edge) -> Result<Edge, NetworkError> {
        if let Some(e) = self.try_and(a, b) {
            return Ok(e);
        }

        if let Some(limit) = self.node_limit {
            if self.nodes.len() >= limit {
                return Err(NetworkError::ArenaFull { limit });
            }
        }

        let (a, b) = Self::ordered(a, b);
        let id = self.nodes.len() as NodeId;
        debug!("mk_and: new node {} = and({}, {})", id, a, b);

        let mut node = Node::new(NodeKind::And(a, b));
        node.level = 1 + self.level(a.index()).max(self.level(b.index()));
        self.nodes.push(node);
        self.nodes[a.index() as usize].fanouts.push(id);
        self.nodes[b.index() as usize].fanouts.push(id);
        self.strash.insert((a, b), id);
        self.num_ands += 1;

        Ok(Edge::positive(id))
    }

    pub fn add_output(&mut self, e: Edge) {
        self.outputs.push(e);
        self.nodes[e.index() as usize].out_refs += 1;
    }

    fn ordered(a: Edge, b: Edge) -> (Edge, Edge) {
        if a.code() <= b.code() {
            (a, b)
        } else {
            (b, a)
        }
    }

    // -- Accessors -----------------------------------------------------------

    /// Current arena size; the basis for a pass's visitation bound.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live AND nodes.
    pub fn num_ands(&self) -> usize {
        self.num_ands
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Edge] {
        &self.outputs
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id as usize].kind
    }

    pub fn is_and(&self, id: NodeId) -> bool {
        matches!(self.nodes[id as usize].kind, NodeKind::And(..))
    }

    pub fn is_input(&self, id: NodeId) -> bool {
        matches!(self.nodes[id as usize].kind, NodeKind::Input(_))
    }

    pub fn is_dead(&self, id: NodeId) -> bool {
        self.nodes[id as usize].dead
    }

    /// Fanins of an AND node, `None` for inputs and the constant.
    pub fn fanins(&self, id: NodeId) -> Option<(Edge, Edge)> {
        match self.nodes[id as usize].kind {
            NodeKind::And(a, b) => Some((a, b)),
            _ => None,
        }
    }

    pub fn fanouts(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id as usize].fanouts
    }

    pub fn out_refs(&self, id: NodeId) -> u32 {
        self.nodes[id as usize].out_refs
    }

    /// Total number of readers: fanout edges plus primary-output references.
    pub fn fanout_count(&self, id: NodeId) -> usize {
        let node = &self.nodes[id as usize];
        node.fanouts.len() + node.out_refs as usize
    }

    /// Number of keys in the structural hash; equals the live AND count.
    pub fn strash_len(&self) -> usize {
        self.strash.len()
    }

    pub fn level(&self, id: NodeId) -> u32 {
        self.nodes[id as usize].level
    }

    pub fn set_level(&mut self, id: NodeId, level: u32) {
        self.nodes[id as usize].level = level;
    }

    pub fn rlevel(&self, id: NodeId) -> u32 {
        self.nodes[id as usize].rlevel
    }

    pub fn set_rlevel(&mut self, id: NodeId, rlevel: u32) {
        self.nodes[id as usize].rlevel = rlevel;
    }

    pub fn is_persistent(&self, id: NodeId) -> bool {
        self.nodes[id as usize].persistent
    }

    /// Exclude a node from rewriting regardless of candidate quality.
    pub fn set_persistent(&mut self, id: NodeId, persistent: bool) {
        self.nodes[id as usize].persistent = persistent;
    }

    // -- Mutation used by the substitution protocol --------------------------

    /// Redirect every fanin edge of `reader` that points at `old` to the
    /// functionally-equal `new` edge.
    ///
    /// Re-registers the reader in the structural hash under its new key. When
    /// the new fanin pair folds to a trivial function, or collides with an
    /// existing node, the reader itself has become redundant: its replacement
    /// edge is returned and the caller is expected to merge it away. In that
    /// case the reader is left out of the structural hash.
    pub(crate) fn redirect_fanin(&mut self, reader: NodeId, old: NodeId, new: Edge) -> Option<Edge> {
        let (f0, f1) = match self.nodes[reader as usize].kind {
            NodeKind::And(f0, f1) => (f0, f1),
            _ => unreachable!("redirect_fanin on a non-AND node"),
        };
        debug_assert!(f0.index() == old || f1.index() == old);

        // Drop the old strash registration. It may be absent, or the key may
        // belong to the surviving node by now, if a previous redirect left
        // the reader pending a merge; the id check keeps such entries intact.
        self.strash.remove((f0, f1), reader);

        let mut rewire = |this: &mut Self, e: Edge| -> Edge {
            if e.index() != old {
                return e;
            }
            this.remove_fanout(old, reader);
            this.nodes[new.index() as usize].fanouts.push(reader);
            new.complement_if(e.is_complement())
        };
        let g0 = rewire(self, f0);
        let g1 = rewire(self, f1);

        // The rewired pair may fold to a constant, a copy, or an existing node.
        if let Some(e) = self.try_and(g0, g1) {
            debug_assert_ne!(e.index(), reader);
            let (g0, g1) = Self::ordered(g0, g1);
            self.nodes[reader as usize].kind = NodeKind::And(g0, g1);
            return Some(e);
        }

        let (g0, g1) = Self::ordered(g0, g1);
        self.nodes[reader as usize].kind = NodeKind::And(g0, g1);
        self.strash.insert((g0, g1), reader);
        None
    }

    /// Redirect every primary-output edge referencing `old` to `new`.
    pub(crate) fn redirect_outputs(&mut self, old: NodeId, new: Edge) {
        let moved = self.nodes[old as usize].out_refs;
        if moved == 0 {
            return;
        }
        for output in &mut self.outputs {
            if output.index() == old {
                *output = new.complement_if(output.is_complement());
            }
        }
        self.nodes[old as usize].out_refs = 0;
        self.nodes[new.index() as usize].out_refs += moved;
    }

    fn remove_fanout(&mut self, id: NodeId, reader: NodeId) {
        let fanouts = &mut self.nodes[id as usize].fanouts;
        let pos = fanouts
            .iter()
            .position(|&f| f == reader)
            .expect("fanout bookkeeping out of sync");
        fanouts.swap_remove(pos);
    }

    /// Remove a node whose fanout became empty, cascading into fanins that
    /// become unreferenced in turn. Bounded by the cone actually rewired.
    ///
    /// Returns the removed ids.
    pub(crate) fn remove_dead_recursive(&mut self, id: NodeId) -> Vec<NodeId> {
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if self.is_dead(id) || !self.is_and(id) || self.fanout_count(id) != 0 {
                continue;
            }
            let (f0, f1) = self.fanins(id).expect("AND node has fanins");
            debug!("removing dead node {} = and({}, {})", id, f0, f1);
            // A merged-away reader shares its key with the node it merged
            // into; only an entry still mapping to `id` may leave the table.
            self.strash.remove(Self::ordered(f0, f1), id);
            self.nodes[id as usize].dead = true;
            self.num_ands -= 1;
            removed.push(id);
            for fanin in [f0, f1] {
                self.remove_fanout(fanin.index(), id);
                stack.push(fanin.index());
            }
        }
        removed
    }

    /// Undo node creation back to a snapshot of the arena length.
    ///
    /// Only valid while the nodes above the snapshot are unreferenced, i.e.
    /// between the construction phase of a substitution and its rewiring
    /// phase. Unregisters the nodes from the structural hash and from their
    /// fanins' fanout lists, then truncates the arena.
    pub(crate) fn truncate_to(&mut self, len: usize) {
        debug_assert!(len >= 2 && len <= self.nodes.len());
        for id in (len..self.nodes.len()).rev() {
            let id = id as NodeId;
            let (f0, f1) = self.fanins(id).expect("only AND nodes are created mid-pass");
            debug_assert!(self.fanout_count(id) == 0);
            let removed = self.strash.remove(Self::ordered(f0, f1), id);
            debug_assert!(removed, "freshly created node owns its strash key");
            self.remove_fanout(f0.index(), id);
            self.remove_fanout(f1.index(), id);
            self.num_ands -= 1;
        }
        self.nodes.truncate(len);
    }

    /// Remove every AND node with no readers. Run before a pass so that
    /// leftovers from earlier transformations are not visited.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for id in 0..self.nodes.len() as NodeId {
            if self.is_and(id) && !self.is_dead(id) && self.fanout_count(id) == 0 {
                removed += self.remove_dead_recursive(id).len();
            }
        }
        if removed > 0 {
            debug!("cleanup removed {} dangling nodes", removed);
        }
        removed
    }

    // -- Post-pass canonicalization ------------------------------------------

    /// Renumber nodes depth-first from the outputs and drop dead slots.
    ///
    /// After this, ids are dense, inputs keep their order, and every fanin id
    /// is numerically smaller than its node's id. Live AND nodes unreachable
    /// from the outputs are appended in creation order.
    pub fn compact(&mut self) {
        let old_len = self.nodes.len();
        let mut order: Vec<NodeId> = Vec::with_capacity(old_len);

        // Depth-first post-order over the cones of the outputs.
        let mut visited = vec![false; old_len];
        visited[0] = true;
        visited[1] = true;
        for &id in &self.inputs {
            visited[id as usize] = true;
        }
        for output in self.outputs.clone() {
            self.collect_cone(output.index(), &mut visited, &mut order);
        }
        // Keep unreachable live nodes, in creation order.
        for id in 0..old_len as NodeId {
            if !visited[id as usize] && !self.is_dead(id) {
                debug_assert!(self.is_and(id));
                self.collect_cone(id, &mut visited, &mut order);
            }
        }

        let mut remap = vec![0 as NodeId; old_len];
        remap[1] = 1;
        let mut next = 2 as NodeId;
        for &id in &self.inputs {
            remap[id as usize] = next;
            next += 1;
        }
        for &id in &order {
            remap[id as usize] = next;
            next += 1;
        }

        // Rebuild the arena in the new order.
        let mut nodes = Vec::with_capacity(next as usize);
        let mut sentry = Node::new(NodeKind::Const);
        sentry.dead = true;
        nodes.push(sentry);
        nodes.push(Node::new(NodeKind::Const));
        for (ordinal, &id) in self.inputs.iter().enumerate() {
            let mut node = Node::new(NodeKind::Input(ordinal as u32));
            node.level = self.nodes[id as usize].level;
            node.persistent = self.nodes[id as usize].persistent;
            nodes.push(node);
        }
        self.strash.clear();
        for &id in &order {
            let old = &self.nodes[id as usize];
            let (f0, f1) = match old.kind {
                NodeKind::And(f0, f1) => (f0, f1),
                _ => unreachable!("only AND nodes are renumbered"),
            };
            let g0 = Edge::new(remap[f0.index() as usize], f0.is_complement());
            let g1 = Edge::new(remap[f1.index() as usize], f1.is_complement());
            let (g0, g1) = Self::ordered(g0, g1);
            let new_id = nodes.len() as NodeId;
            debug_assert!(g0.index() < new_id && g1.index() < new_id);
            let mut node = Node::new(NodeKind::And(g0, g1));
            node.level = old.level;
            node.persistent = old.persistent;
            nodes.push(node);
            self.strash.insert((g0, g1), new_id);
        }

        // Rebuild adjacency and output references.
        self.nodes = nodes;
        self.inputs = (2..2 + self.inputs.len() as NodeId).collect();
        for id in 0..self.nodes.len() as NodeId {
            if let NodeKind::And(f0, f1) = self.nodes[id as usize].kind {
                self.nodes[f0.index() as usize].fanouts.push(id);
                self.nodes[f1.index() as usize].fanouts.push(id);
            }
        }
        for i in 0..self.outputs.len() {
            let output = self.outputs[i];
            let new = Edge::new(remap[output.index() as usize], output.is_complement());
            self.outputs[i] = new;
            self.nodes[new.index() as usize].out_refs += 1;
        }

        debug!(
            "compact: {} slots -> {} nodes ({} ANDs)",
            old_len,
            self.nodes.len(),
            self.num_ands
        );
    }

    /// Post-order DFS over the AND cone above inputs, pushing ids into `order`.
    fn collect_cone(&self, root: NodeId, visited: &mut [bool], order: &mut Vec<NodeId>) {
        if visited[root as usize] {
            return;
        }
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if visited[id as usize] {
                continue;
            }
            visited[id as usize] = true;
            if let NodeKind::And(f0, f1) = self.nodes[id as usize].kind {
                stack.push((id, true));
                // fanin0 first: it ends up with the smaller id.
                stack.push((f1.index(), false));
                stack.push((f0.index(), false));
            }
        }
    }

    // -- Levels --------------------------------------------------------------

    /// Recompute every level in one topological sweep from the inputs.
    pub fn recompute_levels(&mut self) {
        for node in self.nodes.iter_mut() {
            node.level = 0;
        }
        let mut done = vec![false; self.nodes.len()];
        for id in 0..self.nodes.len() as NodeId {
            if !self.is_and(id) || self.is_dead(id) {
                done[id as usize] = true;
            }
        }
        for root in 0..self.nodes.len() as NodeId {
            if done[root as usize] {
                continue;
            }
            let mut stack = vec![(root, false)];
            while let Some((id, expanded)) = stack.pop() {
                let (f0, f1) = match self.nodes[id as usize].kind {
                    NodeKind::And(f0, f1) => (f0, f1),
                    _ => continue,
                };
                if expanded {
                    let level = 1 + self.level(f0.index()).max(self.level(f1.index()));
                    self.nodes[id as usize].level = level;
                    done[id as usize] = true;
                    continue;
                }
                if done[id as usize] {
                    continue;
                }
                done[id as usize] = true;
                stack.push((id, true));
                for fanin in [f0, f1] {
                    if !done[fanin.index() as usize] {
                        stack.push((fanin.index(), false));
                    }
                }
            }
        }
        debug_assert!(self.levels_consistent());
    }

    pub(crate) fn levels_consistent(&self) -> bool {
        (0..self.nodes.len() as NodeId).all(|id| {
            match (self.is_dead(id), self.fanins(id)) {
                (false, Some((f0, f1))) => {
                    self.level(id) == 1 + self.level(f0.index()).max(self.level(f1.index()))
                }
                _ => true,
            }
        })
    }

    /// The depth of the network: maximum level over the output cones.
    pub fn max_level(&self) -> u32 {
        self.outputs
            .iter()
            .map(|e| self.level(e.index()))
            .max()
            .unwrap_or(0)
    }
}
