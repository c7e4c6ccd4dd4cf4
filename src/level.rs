//! Depth accounting across a rewriting pass.
//!
//! In the update-aware mode the pass must not increase the depth of the
//! network: every node gets a required level (the pass-entry depth minus its
//! reverse level), replacement roots deeper than that are rejected, and
//! accepted substitutions trigger an incremental forward repair of the
//! levels above the rewired readers. The static mode skips all of this and
//! recomputes levels once at the end of the pass.

use crate::edge::NodeId;
use crate::network::Network;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum LevelMode {
    /// Ignore depth during the pass; recompute levels afterwards.
    Static,
    /// Enforce the pass-entry depth as an upper bound and keep levels exact.
    #[default]
    UpdateAware,
}

pub struct LevelTracker {
    mode: LevelMode,
    /// Depth of the network at pass entry; the bound enforced in the
    /// update-aware mode.
    required: u32,
}

impl LevelTracker {
    /// Snapshot the depth bound and, in the update-aware mode, compute the
    /// reverse level of every node.
    ///
    /// The reverse sweep walks the arena in descending creation order, which
    /// is topological at pass entry: every fanout has a larger id than its
    /// fanin then.
    pub fn start(network: &mut Network, mode: LevelMode) -> Self {
        let required = network.max_level();
        if mode == LevelMode::UpdateAware {
            for id in (0..network.num_nodes() as NodeId).rev() {
                if network.is_dead(id) {
                    continue;
                }
                let mut rlevel = 0;
                for &reader in network.fanouts(id) {
                    rlevel = rlevel.max(network.rlevel(reader) + 1);
                }
                network.set_rlevel(id, rlevel);
            }
        }
        Self { mode, required }
    }

    /// The deepest a replacement root for `id` may become.
    pub fn allowed_level(&self, network: &Network, id: NodeId) -> u32 {
        match self.mode {
            LevelMode::Static => u32::MAX,
            LevelMode::UpdateAware => self.required.saturating_sub(network.rlevel(id)),
        }
    }

    /// Repair the levels above rewired readers after a substitution.
    ///
    /// Nodes created by the substitution got exact levels at construction;
    /// only the rewired readers and their transitive fanouts can be stale.
    pub fn repair(&self, network: &mut Network, updated: &[NodeId]) {
        if self.mode == LevelMode::Static {
            return;
        }
        let mut queue: Vec<NodeId> = updated.to_vec();
        while let Some(id) = queue.pop() {
            if network.is_dead(id) {
                continue;
            }
            let Some((f0, f1)) = network.fanins(id) else {
                continue;
            };
            let level = 1 + network.level(f0.index()).max(network.level(f1.index()));
            if level != network.level(id) {
                network.set_level(id, level);
                queue.extend_from_slice(network.fanouts(id));
            }
        }
    }

    /// Tear down pass-local state. `clean` is false when the pass aborted
    /// mid-substitution and the levels may be arbitrary.
    pub fn finish(self, network: &mut Network, clean: bool) {
        match self.mode {
            LevelMode::Static => network.recompute_levels(),
            LevelMode::UpdateAware => {
                if !clean {
                    network.recompute_levels();
                }
                for id in 0..network.num_nodes() as NodeId {
                    network.set_rlevel(id, 0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_levels() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let c = network.add_input();
        let f = network.mk_and(a, b).unwrap();
        let g = network.mk_and(f, c).unwrap();
        network.add_output(g);
        let tracker = LevelTracker::start(&mut network, LevelMode::UpdateAware);
        assert_eq!(network.rlevel(g.index()), 0);
        assert_eq!(network.rlevel(f.index()), 1);
        assert_eq!(network.rlevel(a.index()), 2);
        // c only feeds the root.
        assert_eq!(network.rlevel(c.index()), 1);
        assert_eq!(tracker.allowed_level(&network, g.index()), 2);
        assert_eq!(tracker.allowed_level(&network, f.index()), 1);
    }

    #[test]
    fn test_static_mode_is_unbounded() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let f = network.mk_and(a, b).unwrap();
        network.add_output(f);
        let tracker = LevelTracker::start(&mut network, LevelMode::Static);
        assert_eq!(tracker.allowed_level(&network, f.index()), u32::MAX);
    }

    #[test]
    fn test_repair_propagates_upward() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let c = network.add_input();
        let f = network.mk_and(a, b).unwrap();
        let g = network.mk_and(f, c).unwrap();
        let h = network.mk_and(g, b).unwrap();
        network.add_output(h);
        let tracker = LevelTracker::start(&mut network, LevelMode::UpdateAware);
        // Scramble and repair from the bottom of the damage.
        network.set_level(f.index(), 9);
        network.set_level(g.index(), 9);
        network.set_level(h.index(), 9);
        tracker.repair(&mut network, &[f.index()]);
        assert_eq!(network.level(f.index()), 1);
        assert_eq!(network.level(g.index()), 2);
        assert_eq!(network.level(h.index()), 3);
    }

    #[test]
    fn test_finish_recomputes_in_static_mode() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let f = network.mk_and(a, b).unwrap();
        network.add_output(f);
        let tracker = LevelTracker::start(&mut network, LevelMode::Static);
        network.set_level(f.index(), 42);
        tracker.finish(&mut network, true);
        assert_eq!(network.level(f.index()), 1);
    }
}
