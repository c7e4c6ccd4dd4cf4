//! Transactional replacement of a node's cone by a candidate template.
//!
//! A substitution runs in three phases. First a dry run prices the candidate
//! without touching the network. Then the template is realized bottom-up
//! through the structural hash; this is the only phase that can fail, and it
//! rolls the arena back to its entry snapshot when it does. Finally the
//! readers of the target are rewired to the replacement root, re-hashed
//! readers that became redundant are merged away, and the disconnected cone
//! is removed. After the rewiring phase the network is structurally sound
//! again: no partial state survives an error.

use thiserror::Error;

use crate::dgraph::{DecisionGraph, TEdge, TRef};
use crate::edge::{Edge, NodeId};
use crate::network::{Network, NetworkError};

#[derive(Debug, Error)]
pub enum SubstitutionError {
    /// The arena limit was hit while realizing the template. The pass cannot
    /// continue: construction capacity is gone.
    #[error(transparent)]
    ArenaFull(#[from] NetworkError),
    /// The realized cone closed over the target node itself, which rewiring
    /// would turn into a cycle. The target is skipped.
    #[error("replacement cone closed over the rewritten node")]
    SelfReference,
}

/// A priced replacement shape: a template plus the network edges bound to
/// its leaf slots and the polarity of its output.
pub struct Candidate<'a> {
    pub graph: &'a DecisionGraph,
    /// Edge bound to each canonical leaf slot. Slots the template does not
    /// reference may carry anything.
    pub leaves: [Edge; 4],
    /// Complement the realized root.
    pub compl: bool,
}

/// Outcome of the dry run: what committing the candidate would cost.
#[derive(Debug, Copy, Clone)]
pub struct DryRun {
    /// Number of genuinely new AND nodes the realization would create.
    pub added: usize,
    /// Level of the replacement root after realization.
    pub root_level: u32,
}

/// The record of a committed substitution, for index invalidation, level
/// repair, and statistics.
#[derive(Debug)]
pub struct Substitution {
    pub new_root: Edge,
    /// Nodes created by the realization, in creation order.
    pub added: Vec<NodeId>,
    /// Surviving readers whose fanin edges were rewired.
    pub updated: Vec<NodeId>,
    /// Nodes removed: the target's freed cone plus merged-away readers.
    pub deleted: Vec<NodeId>,
}

/// The maximum fanout-free cone of `target` above the cut `leaves`: the
/// nodes that become unreferenced once every reader of `target` is rewired.
///
/// A node belongs to the cone when all of its readers do and no primary
/// output references it; the target belongs unconditionally.
pub fn mffc(network: &Network, target: NodeId, leaves: &[NodeId]) -> Vec<NodeId> {
    let mut freed = vec![target];
    let mut read_count = std::collections::HashMap::new();
    let mut stack = vec![target];
    while let Some(id) = stack.pop() {
        let (f0, f1) = network.fanins(id).expect("cone nodes are AND nodes");
        for fanin in [f0.index(), f1.index()] {
            if !network.is_and(fanin) || leaves.contains(&fanin) || freed.contains(&fanin) {
                continue;
            }
            let seen = read_count.entry(fanin).or_insert(0usize);
            *seen += 1;
            if *seen == network.fanout_count(fanin) {
                freed.push(fanin);
                stack.push(fanin);
            }
        }
    }
    freed
}

#[derive(Debug, Copy, Clone)]
enum Dry {
    /// Resolves to an existing edge.
    Known(Edge),
    /// Would be a new node of the given level.
    Fresh(u32),
}

impl Dry {
    fn level(&self, network: &Network) -> u32 {
        match *self {
            Dry::Known(e) => network.level(e.index()),
            Dry::Fresh(level) => level,
        }
    }

    fn complement(self) -> Self {
        match self {
            Dry::Known(e) => Dry::Known(-e),
            fresh => fresh,
        }
    }
}

/// Price a candidate without mutating the network.
///
/// Walks the template through the same folding and structural-hash lookups
/// the realization would perform. A hash hit on a node of the freed cone is
/// counted as an addition, since committing would resurrect it. Returns
/// `None` when the realized cone would reach the target itself.
pub fn count_added(
    network: &Network,
    candidate: &Candidate,
    target: NodeId,
    freed: &[NodeId],
) -> Option<DryRun> {
    let mut added = 0usize;
    let mut values: Vec<Dry> = Vec::with_capacity(candidate.graph.num_ops());

    let resolve = |values: &Vec<Dry>, e: TEdge| -> Dry {
        let value = match e.target {
            TRef::Const1 => Dry::Known(Edge::one()),
            TRef::Leaf(i) => Dry::Known(candidate.leaves[i as usize]),
            TRef::Op(i) => values[i as usize],
        };
        if e.compl {
            value.complement()
        } else {
            value
        }
    };

    for &(a, b) in candidate.graph.ops() {
        let x = resolve(&values, a);
        let y = resolve(&values, b);
        let fresh_level = 1 + x.level(network).max(y.level(network));
        let value = match (x, y) {
            (Dry::Known(x), Dry::Known(y)) => match network.try_and(x, y) {
                Some(e) if e.index() == target => return None,
                Some(e) if freed.contains(&e.index()) => {
                    added += 1;
                    Dry::Fresh(fresh_level)
                }
                Some(e) => Dry::Known(e),
                None => {
                    added += 1;
                    Dry::Fresh(fresh_level)
                }
            },
            _ => {
                added += 1;
                Dry::Fresh(fresh_level)
            }
        };
        values.push(value);
    }

    let root = resolve(&values, candidate.graph.root());
    let root = if candidate.compl {
        root.complement()
    } else {
        root
    };
    if let Dry::Known(e) = root {
        if e.index() == target {
            return None;
        }
    }
    Some(DryRun {
        added,
        root_level: root.level(network),
    })
}

/// Commit a candidate: realize its cone, rewire every reader of `target` to
/// the replacement root, merge readers that became redundant, and remove the
/// disconnected cone.
pub fn apply(
    network: &mut Network,
    candidate: &Candidate,
    target: NodeId,
) -> Result<Substitution, SubstitutionError> {
    let snapshot = network.num_nodes();

    // Phase 1: realize the template bottom-up. All node creation happens
    // here; any failure rolls back to the snapshot.
    let mut values: Vec<Edge> = Vec::with_capacity(candidate.graph.num_ops());
    let resolve = |values: &Vec<Edge>, e: TEdge| -> Edge {
        let edge = match e.target {
            TRef::Const1 => Edge::one(),
            TRef::Leaf(i) => candidate.leaves[i as usize],
            TRef::Op(i) => values[i as usize],
        };
        edge.complement_if(e.compl)
    };
    for &(a, b) in candidate.graph.ops() {
        let x = resolve(&values, a);
        let y = resolve(&values, b);
        match network.mk_and(x, y) {
            Ok(e) if e.index() == target => {
                network.truncate_to(snapshot);
                return Err(SubstitutionError::SelfReference);
            }
            Ok(e) => values.push(e),
            Err(err) => {
                network.truncate_to(snapshot);
                return Err(err.into());
            }
        }
    }
    let new_root = resolve(&values, candidate.graph.root()).complement_if(candidate.compl);
    if new_root.index() == target {
        network.truncate_to(snapshot);
        return Err(SubstitutionError::SelfReference);
    }
    let added: Vec<NodeId> = (snapshot as NodeId..network.num_nodes() as NodeId).collect();

    // Phase 2: rewire. Readers whose rewired fanin pair folds or collides
    // with an existing node are queued and merged away in turn.
    let mut updated = Vec::new();
    let mut merged = Vec::new();
    let mut queue: Vec<(NodeId, Edge)> = Vec::new();

    for reader in network.fanouts(target).to_vec() {
        match network.redirect_fanin(reader, target, new_root) {
            Some(into) => queue.push((reader, into)),
            None => updated.push(reader),
        }
    }
    network.redirect_outputs(target, new_root);

    while let Some((old, into)) = queue.pop() {
        for reader in network.fanouts(old).to_vec() {
            match network.redirect_fanin(reader, old, into) {
                Some(next) => queue.push((reader, next)),
                None => updated.push(reader),
            }
        }
        network.redirect_outputs(old, into);
        merged.push(old);
    }

    // Phase 3: drop the disconnected cones.
    let mut deleted = Vec::new();
    for old in merged {
        deleted.extend(network.remove_dead_recursive(old));
    }
    deleted.extend(network.remove_dead_recursive(target));

    updated.sort_unstable();
    updated.dedup();
    updated.retain(|&id| !network.is_dead(id));

    Ok(Substitution {
        new_root,
        added,
        updated,
        deleted,
    })
}
