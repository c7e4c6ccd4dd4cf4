//! Bit-parallel simulation: 64 input patterns per pass, one bit per lane.
//!
//! The simulator is the functional oracle of the test suite: a rewritten
//! network must produce the same output words as the original on the same
//! input words.

use crate::edge::{Edge, NodeId};
use crate::network::{Network, NodeKind};

/// Evaluate every output on the given input words (one word per primary
/// input, bit `i` of each word forming pattern `i`).
pub fn simulate(network: &Network, inputs: &[u64]) -> Vec<u64> {
    assert_eq!(inputs.len(), network.num_inputs());
    let mut values: Vec<Option<u64>> = vec![None; network.num_nodes()];
    network
        .outputs()
        .iter()
        .map(|&e| eval_edge(network, &mut values, inputs, e))
        .collect()
}

fn eval_edge(network: &Network, values: &mut Vec<Option<u64>>, inputs: &[u64], e: Edge) -> u64 {
    let value = eval_node(network, values, inputs, e.index());
    if e.is_complement() {
        !value
    } else {
        value
    }
}

fn eval_node(network: &Network, values: &mut Vec<Option<u64>>, inputs: &[u64], root: NodeId) -> u64 {
    if let Some(value) = values[root as usize] {
        return value;
    }
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if values[id as usize].is_some() {
            continue;
        }
        let value = match network.kind(id) {
            NodeKind::Const => Some(!0u64),
            NodeKind::Input(ordinal) => Some(inputs[ordinal as usize]),
            NodeKind::And(f0, f1) => {
                if expanded {
                    let v0 = values[f0.index() as usize].expect("fanin evaluated");
                    let v0 = if f0.is_complement() { !v0 } else { v0 };
                    let v1 = values[f1.index() as usize].expect("fanin evaluated");
                    let v1 = if f1.is_complement() { !v1 } else { v1 };
                    Some(v0 & v1)
                } else {
                    stack.push((id, true));
                    stack.push((f1.index(), false));
                    stack.push((f0.index(), false));
                    None
                }
            }
        };
        if let Some(value) = value {
            values[id as usize] = Some(value);
        }
    }
    values[root as usize].expect("root evaluated")
}
