//! Structural integrity check of a network, run after a rewriting pass.
//!
//! Verifies the invariants the rest of the crate relies on: acyclicity,
//! fanin/fanout symmetry, output reference counts, level consistency,
//! structural-hash agreement, and dead-slot hygiene.

use thiserror::Error;

use crate::edge::NodeId;
use crate::network::{Network, NodeKind};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("cycle through node {id}")]
    Cycle { id: NodeId },
    #[error("node {id} reads {fanin} but is missing from its fanout list")]
    FanoutMissing { id: NodeId, fanin: NodeId },
    #[error("node {id} has {stored} stale fanout entries")]
    FanoutStale { id: NodeId, stored: usize },
    #[error("node {id} records {stored} output references, outputs hold {actual}")]
    OutRefsMismatch { id: NodeId, stored: u32, actual: u32 },
    #[error("node {id} has level {stored}, fanins require {required}")]
    LevelMismatch { id: NodeId, stored: u32, required: u32 },
    #[error("node {id} disagrees with the structural hash")]
    StrashMismatch { id: NodeId },
    #[error("structural hash holds {stored} keys for {live} live AND nodes")]
    StrashSize { stored: usize, live: usize },
    #[error("node {id} references the dead node {fanin}")]
    DeadFanin { id: NodeId, fanin: NodeId },
    #[error("node {id} has a constant or duplicated fanin")]
    MalformedFanins { id: NodeId },
}

/// Check every structural invariant; the first violation is returned.
pub fn check(network: &Network) -> Result<(), CheckError> {
    let n = network.num_nodes();

    // Acyclicity, by iterative DFS with an on-stack color.
    let mut color = vec![0u8; n]; // 0 = white, 1 = on stack, 2 = done
    for root in 0..n as NodeId {
        if color[root as usize] != 0 || !network.is_and(root) || network.is_dead(root) {
            continue;
        }
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                color[id as usize] = 2;
                continue;
            }
            match color[id as usize] {
                1 => return Err(CheckError::Cycle { id }),
                2 => continue,
                _ => {}
            }
            color[id as usize] = 1;
            stack.push((id, true));
            if let Some((f0, f1)) = network.fanins(id) {
                for fanin in [f0.index(), f1.index()] {
                    match color[fanin as usize] {
                        1 => return Err(CheckError::Cycle { id: fanin }),
                        0 => stack.push((fanin, false)),
                        _ => {}
                    }
                }
            }
        }
    }

    // Fanin/fanout symmetry: reading edges and fanout entries must agree as
    // multisets, per (node, reader) pair.
    let mut expected = vec![0usize; n];
    for id in 0..n as NodeId {
        if network.is_dead(id) {
            continue;
        }
        if let Some((f0, f1)) = network.fanins(id) {
            if f0.is_const() || f1.is_const() || f0.index() == f1.index() {
                return Err(CheckError::MalformedFanins { id });
            }
            for fanin in [f0.index(), f1.index()] {
                if network.is_dead(fanin) {
                    return Err(CheckError::DeadFanin { id, fanin });
                }
                if !network.fanouts(fanin).contains(&id) {
                    return Err(CheckError::FanoutMissing { id, fanin });
                }
                expected[fanin as usize] += 1;
            }
        }
    }
    for id in 0..n as NodeId {
        let stored = network.fanouts(id).len();
        if stored != expected[id as usize] {
            return Err(CheckError::FanoutStale { id, stored });
        }
    }

    // Output reference counts.
    let mut out_refs = vec![0u32; n];
    for output in network.outputs() {
        if network.is_dead(output.index()) {
            return Err(CheckError::DeadFanin {
                id: output.index(),
                fanin: output.index(),
            });
        }
        out_refs[output.index() as usize] += 1;
    }
    for id in 0..n as NodeId {
        let stored = network.out_refs(id);
        let actual = out_refs[id as usize];
        if stored != actual {
            return Err(CheckError::OutRefsMismatch { id, stored, actual });
        }
    }

    // Levels.
    for id in 0..n as NodeId {
        if network.is_dead(id) {
            continue;
        }
        if let Some((f0, f1)) = network.fanins(id) {
            let required = 1 + network.level(f0.index()).max(network.level(f1.index()));
            let stored = network.level(id);
            if stored != required {
                return Err(CheckError::LevelMismatch { id, stored, required });
            }
        }
    }

    // Structural-hash agreement.
    let mut live = 0usize;
    for id in 0..n as NodeId {
        if network.is_dead(id) {
            continue;
        }
        if let NodeKind::And(f0, f1) = network.kind(id) {
            live += 1;
            if network.try_and(f0, f1) != Some(crate::edge::Edge::positive(id)) {
                return Err(CheckError::StrashMismatch { id });
            }
        }
    }
    if network.strash_len() != live {
        return Err(CheckError::StrashSize {
            stored: network.strash_len(),
            live,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_network_checks() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let f = network.mk_and(a, b).unwrap();
        let g = network.mk_and(f, -b).unwrap();
        network.add_output(g);
        network.add_output(-f);
        check(&network).unwrap();
    }

    #[test]
    fn test_detects_scrambled_level() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let f = network.mk_and(a, b).unwrap();
        network.add_output(f);
        network.set_level(f.index(), 5);
        assert!(matches!(
            check(&network),
            Err(CheckError::LevelMismatch { .. })
        ));
    }

    #[test]
    fn test_network_checks_after_removal() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let f = network.mk_and(a, b).unwrap();
        let dangling = network.mk_and(a, -b).unwrap();
        network.add_output(f);
        network.remove_dead_recursive(dangling.index());
        check(&network).unwrap();
    }

    #[test]
    fn test_network_checks_after_compact() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let c = network.add_input();
        let f = network.mk_and(a, b).unwrap();
        let g = network.mk_and(-f, c).unwrap();
        network.add_output(g);
        network.compact();
        check(&network).unwrap();
    }
}
